//! `curhat doctor`: Diagnose configuration and upstream reachability.

use std::time::Duration;

use curhat_config::AppConfig;
use curhat_core::knowledge::KnowledgeSource;
use curhat_knowledge::HttpKnowledgeSource;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 curhat doctor — System Diagnostics");
    println!("=====================================\n");

    let mut issues = 0;

    // Check config
    let config_path = AppConfig::config_dir().join("config.toml");
    let config = if config_path.exists() {
        match AppConfig::load() {
            Ok(config) => {
                println!("  ✅ Config file valid");
                config
            }
            Err(e) => {
                println!("  ❌ Config file invalid: {e}");
                println!("\n  ⚠️  Fix the config file and re-run doctor.");
                return Ok(());
            }
        }
    } else {
        println!("  ⚠️  No config file, using defaults (run `curhat init`)");
        issues += 1;
        AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?
    };

    // Check API key and provider
    if config.has_api_key() {
        println!("  ✅ API key configured");
    } else {
        println!("  ⚠️  No API key configured (set DEEPSEEK_API_KEY or CURHAT_API_KEY)");
        issues += 1;
    }

    match curhat_providers::build_from_config(&config) {
        Ok(provider) => match provider.health_check().await {
            Ok(true) => println!("  ✅ Provider '{}' reachable", provider.name()),
            Ok(false) => {
                println!("  ⚠️  Provider '{}' answered but reported unhealthy", provider.name());
                issues += 1;
            }
            Err(e) => {
                println!("  ❌ Provider '{}' unreachable: {e}", provider.name());
                issues += 1;
            }
        },
        Err(e) => {
            println!("  ❌ Provider not usable: {e}");
            issues += 1;
        }
    }

    // Check knowledge sources
    let source = HttpKnowledgeSource::new(
        &config.knowledge.user_agent,
        Duration::from_secs(config.timeouts.knowledge_fetch_secs),
    )?;
    for id in &config.knowledge.sources {
        match source.fetch(id).await {
            Ok(doc) => {
                let paragraphs = curhat_knowledge::paragraphs(&doc).len();
                println!("  ✅ {id} ({paragraphs} paragraphs)");
            }
            Err(e) => {
                println!("  ⚠️  {e}");
                issues += 1;
            }
        }
    }

    // Summary
    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
