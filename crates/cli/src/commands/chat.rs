//! `curhat chat`: Interactive or single-message chat through the pipeline.
//!
//! Runs the same [`ReasoningEngine`] the gateway uses, with a fixed local
//! client identity.

use std::time::Instant;

use curhat_agent::ReasoningEngine;
use curhat_config::AppConfig;
use curhat_core::error::{Error, ProviderError};
use curhat_core::ClientId;
use tokio::io::{AsyncBufReadExt, BufReader};

const LOCAL_CLIENT: &str = "local";

pub async fn run(message: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let engine = match ReasoningEngine::from_config(&config) {
        Ok(engine) => engine,
        Err(Error::Provider(ProviderError::NotConfigured(reason))) => {
            eprintln!();
            eprintln!("  ERROR: No API key configured!");
            eprintln!();
            eprintln!("  Set one of these environment variables:");
            eprintln!("    CURHAT_API_KEY    (generic)");
            eprintln!("    DEEPSEEK_API_KEY  (DeepSeek)");
            eprintln!("    OPENAI_API_KEY    (OpenAI-compatible)");
            eprintln!();
            eprintln!("  Or add it to your config file:");
            eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
            eprintln!();
            return Err(format!("Provider not configured: {reason}").into());
        }
        Err(e) => return Err(e.into()),
    };
    let client = ClientId::new(LOCAL_CLIENT);

    if let Some(msg) = message {
        // Single message mode
        eprint!("  Thinking...");
        let reply = engine.respond(&client, &msg, Instant::now()).await;
        eprint!("\r              \r");
        println!("{}", reply.text);
        return Ok(());
    }

    // Interactive mode
    println!();
    println!("  curhat — Interactive Mode");
    println!();
    println!("  Provider:  {}", engine.provider_name());
    println!("  Model:     {}", config.provider.model);
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print!("  You > ");
    use std::io::Write;
    std::io::stdout().flush()?;

    while let Some(line) = lines.next_line().await? {
        if matches!(line.trim(), "exit" | "quit") {
            break;
        }

        eprint!("  ...");
        let reply = engine.respond(&client, &line, Instant::now()).await;
        eprint!("\r     \r");
        println!();
        for text in reply.text.lines() {
            println!("  curhat > {text}");
        }
        println!();

        print!("  You > ");
        std::io::stdout().flush()?;
    }

    println!();
    println!("  Take care. 👋");
    println!();

    Ok(())
}
