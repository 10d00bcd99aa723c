//! Configuration loading, validation, and management for curhat.
//!
//! Loads configuration from `~/.curhat/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use curhat_core::Language;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The root configuration structure.
///
/// Maps directly to `~/.curhat/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the Generation Service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Generation Service endpoint and sampling defaults
    #[serde(default)]
    pub provider: ProviderConfig,

    /// HTTP gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Language used when no lexical cue matches
    #[serde(default)]
    pub language: LanguageConfig,

    /// Crisis keyword detection
    #[serde(default)]
    pub safety: SafetyConfig,

    /// External reference sources
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Reply cache bounds
    #[serde(default)]
    pub cache: CacheConfig,

    /// Per-client admission control
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Session history compaction
    #[serde(default)]
    pub session: SessionConfig,

    /// Quality gate and auxiliary generation settings
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Per-call timeouts
    #[serde(default)]
    pub timeouts: TimeoutConfig,

    /// Background sweeps of idle state
    #[serde(default)]
    pub maintenance: MaintenanceConfig,
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("provider", &self.provider)
            .field("gateway", &self.gateway)
            .field("language", &self.language)
            .field("safety", &self.safety)
            .field("knowledge", &self.knowledge)
            .field("cache", &self.cache)
            .field("rate_limit", &self.rate_limit)
            .field("session", &self.session)
            .field("generation", &self.generation)
            .field("timeouts", &self.timeouts)
            .field("maintenance", &self.maintenance)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_provider_name")]
    pub name: String,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// System message sent with every generation call
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_provider_name() -> String {
    "deepseek".into()
}
fn default_api_url() -> String {
    "https://api.deepseek.com/v1".into()
}
fn default_model() -> String {
    "deepseek-chat".into()
}
fn default_system_prompt() -> String {
    "You are a professional psychology counselor.".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    512
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: default_provider_name(),
            api_url: default_api_url(),
            model: default_model(),
            system_prompt: default_system_prompt(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,

    /// CORS origins. `["*"]` allows any origin.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_port() -> u16 {
    8000
}
fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_body_limit() -> usize {
    64 * 1024
}
fn default_allowed_origins() -> Vec<String> {
    vec!["*".into()]
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            body_limit_bytes: default_body_limit(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LanguageConfig {
    #[serde(default)]
    pub default: Language,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyConfig {
    /// Matched case-insensitively as substrings of the message
    #[serde(default = "default_crisis_keywords")]
    pub crisis_keywords: Vec<String>,
}

fn default_crisis_keywords() -> Vec<String> {
    [
        // Indonesian
        "bunuh diri",
        "ingin mati",
        "pengen mati",
        "pingin mati",
        "mau mati",
        "akhiri hidup",
        "mengakhiri hidup",
        "menyakiti diri",
        "melukai diri",
        "sayat tangan",
        // English
        "suicide",
        "suicidal",
        "kill myself",
        "want to die",
        "end my life",
        "self-harm",
        "self harm",
        "hurt myself",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            crisis_keywords: default_crisis_keywords(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Ordered list of source identifiers (URLs)
    #[serde(default = "default_knowledge_sources")]
    pub sources: Vec<String>,

    /// Stop querying further sources once this many snippets are collected
    #[serde(default = "default_min_snippets")]
    pub min_snippets: usize,

    /// At most this many snippets are returned
    #[serde(default = "default_max_snippets")]
    pub max_snippets: usize,

    /// Paragraphs shorter than this are ignored
    #[serde(default = "default_min_paragraph_chars")]
    pub min_paragraph_chars: usize,

    /// Fetches in flight at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_knowledge_sources() -> Vec<String> {
    [
        "https://en.wikipedia.org/wiki/Emotional_self-regulation",
        "https://en.wikipedia.org/wiki/Psychological_resilience",
        "https://en.wikipedia.org/wiki/Coping",
        "https://en.wikipedia.org/wiki/Betrayal",
        "https://en.wikipedia.org/wiki/Fatigue",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
fn default_min_snippets() -> usize {
    2
}
fn default_max_snippets() -> usize {
    3
}
fn default_min_paragraph_chars() -> usize {
    80
}
fn default_concurrency() -> usize {
    4
}
fn default_user_agent() -> String {
    concat!("curhat/", env!("CARGO_PKG_VERSION")).into()
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            sources: default_knowledge_sources(),
            min_snippets: default_min_snippets(),
            max_snippets: default_max_snippets(),
            min_paragraph_chars: default_min_paragraph_chars(),
            concurrency: default_concurrency(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_entries")]
    pub max_entries: usize,

    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

fn default_cache_entries() -> usize {
    1000
}
fn default_cache_ttl() -> u64 {
    600
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: default_cache_entries(),
            ttl_secs: default_cache_ttl(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    #[serde(default = "default_max_requests")]
    pub max_requests: usize,
}

fn default_window_secs() -> u64 {
    60
}
fn default_max_requests() -> usize {
    20
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            max_requests: default_max_requests(),
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// History length (in turns) that triggers compaction once exceeded
    #[serde(default = "default_history_threshold")]
    pub history_threshold: usize,

    #[serde(default = "default_summary_max_chars")]
    pub summary_max_chars: usize,

    /// Sessions untouched for this long are dropped
    #[serde(default = "default_idle_ttl")]
    pub idle_ttl_secs: u64,
}

fn default_history_threshold() -> usize {
    10
}
fn default_summary_max_chars() -> usize {
    1200
}
fn default_idle_ttl() -> u64 {
    3600
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            history_threshold: default_history_threshold(),
            summary_max_chars: default_summary_max_chars(),
            idle_ttl_secs: default_idle_ttl(),
        }
    }
}

impl SessionConfig {
    pub fn idle_ttl(&self) -> Duration {
        Duration::from_secs(self.idle_ttl_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Replies shorter than this (in characters) are replaced by the fallback
    #[serde(default = "default_min_reply_chars")]
    pub min_reply_chars: usize,

    #[serde(default = "default_fact_temperature")]
    pub fact_temperature: f32,

    #[serde(default = "default_fact_max_tokens")]
    pub fact_max_tokens: u32,

    #[serde(default = "default_summary_temperature")]
    pub summary_temperature: f32,

    #[serde(default = "default_summary_max_tokens")]
    pub summary_max_tokens: u32,
}

fn default_min_reply_chars() -> usize {
    40
}
fn default_fact_temperature() -> f32 {
    0.2
}
fn default_fact_max_tokens() -> u32 {
    256
}
fn default_summary_temperature() -> f32 {
    0.3
}
fn default_summary_max_tokens() -> u32 {
    384
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            min_reply_chars: default_min_reply_chars(),
            fact_temperature: default_fact_temperature(),
            fact_max_tokens: default_fact_max_tokens(),
            summary_temperature: default_summary_temperature(),
            summary_max_tokens: default_summary_max_tokens(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_fact_timeout")]
    pub fact_extraction_secs: u64,

    #[serde(default = "default_generation_timeout")]
    pub generation_secs: u64,

    #[serde(default = "default_summary_timeout")]
    pub summarization_secs: u64,

    #[serde(default = "default_fetch_timeout")]
    pub knowledge_fetch_secs: u64,

    /// Covers classification through main generation
    #[serde(default = "default_request_deadline")]
    pub request_deadline_secs: u64,
}

fn default_fact_timeout() -> u64 {
    15
}
fn default_generation_timeout() -> u64 {
    30
}
fn default_summary_timeout() -> u64 {
    20
}
fn default_fetch_timeout() -> u64 {
    5
}
fn default_request_deadline() -> u64 {
    60
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            fact_extraction_secs: default_fact_timeout(),
            generation_secs: default_generation_timeout(),
            summarization_secs: default_summary_timeout(),
            knowledge_fetch_secs: default_fetch_timeout(),
            request_deadline_secs: default_request_deadline(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceConfig {
    /// How often expired cache entries, idle sessions, and idle rate-limit
    /// windows are swept by the gateway
    #[serde(default = "default_maintenance_interval")]
    pub interval_secs: u64,
}

fn default_maintenance_interval() -> u64 {
    60
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_maintenance_interval(),
        }
    }
}

impl MaintenanceConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.curhat/config.toml).
    ///
    /// Also checks environment variables for the API key:
    /// - `CURHAT_API_KEY` (highest priority)
    /// - `DEEPSEEK_API_KEY`
    /// - `OPENAI_API_KEY`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        // Environment variable overrides (highest priority)
        if self.api_key.is_none() {
            self.api_key = std::env::var("CURHAT_API_KEY")
                .ok()
                .or_else(|| std::env::var("DEEPSEEK_API_KEY").ok())
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }

        if let Ok(model) = std::env::var("CURHAT_MODEL") {
            self.provider.model = model;
        }

        if let Ok(url) = std::env::var("CURHAT_API_URL") {
            self.provider.api_url = url;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".curhat")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, t) in [
            ("provider.temperature", self.provider.temperature),
            ("generation.fact_temperature", self.generation.fact_temperature),
            ("generation.summary_temperature", self.generation.summary_temperature),
        ] {
            if !(0.0..=2.0).contains(&t) {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be between 0.0 and 2.0"
                )));
            }
        }

        if self.rate_limit.max_requests == 0 || self.rate_limit.window_secs == 0 {
            return Err(ConfigError::ValidationError(
                "rate_limit.max_requests and rate_limit.window_secs must be > 0".into(),
            ));
        }

        if self.cache.max_entries == 0 {
            return Err(ConfigError::ValidationError(
                "cache.max_entries must be > 0".into(),
            ));
        }

        if self.session.history_threshold == 0 {
            return Err(ConfigError::ValidationError(
                "session.history_threshold must be > 0".into(),
            ));
        }

        if self.session.idle_ttl_secs == 0 || self.maintenance.interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "session.idle_ttl_secs and maintenance.interval_secs must be > 0".into(),
            ));
        }

        if self.knowledge.min_snippets > self.knowledge.max_snippets {
            return Err(ConfigError::ValidationError(
                "knowledge.min_snippets must not exceed knowledge.max_snippets".into(),
            ));
        }

        let t = &self.timeouts;
        if [
            t.fact_extraction_secs,
            t.generation_secs,
            t.summarization_secs,
            t.knowledge_fetch_secs,
            t.request_deadline_secs,
        ]
        .contains(&0)
        {
            return Err(ConfigError::ValidationError(
                "all timeouts must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string (for `init` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            provider: ProviderConfig::default(),
            gateway: GatewayConfig::default(),
            language: LanguageConfig::default(),
            safety: SafetyConfig::default(),
            knowledge: KnowledgeConfig::default(),
            cache: CacheConfig::default(),
            rate_limit: RateLimitConfig::default(),
            session: SessionConfig::default(),
            generation: GenerationConfig::default(),
            timeouts: TimeoutConfig::default(),
            maintenance: MaintenanceConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.provider.name, "deepseek");
        assert_eq!(config.rate_limit.max_requests, 20);
        assert_eq!(config.rate_limit.window_secs, 60);
        assert_eq!(config.generation.min_reply_chars, 40);
        assert_eq!(config.language.default, Language::En);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.provider.model, config.provider.model);
        assert_eq!(parsed.knowledge.sources, config.knowledge.sources);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let mut config = AppConfig::default();
        config.provider.temperature = 5.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn snippet_bounds_must_be_ordered() {
        let mut config = AppConfig::default();
        config.knowledge.min_snippets = 5;
        config.knowledge.max_snippets = 2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_timeout_rejected() {
        let mut config = AppConfig::default();
        config.timeouts.knowledge_fetch_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_idle_ttl_rejected() {
        let mut config = AppConfig::default();
        config.session.idle_ttl_secs = 0;
        assert!(config.validate().is_err());
        assert_eq!(AppConfig::default().maintenance.interval(), Duration::from_secs(60));
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.provider.name, "deepseek");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[language]
default = "id"

[rate_limit]
max_requests = 5

[safety]
crisis_keywords = ["bunuh diri"]
"#
        )
        .unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.language.default, Language::Id);
        assert_eq!(config.rate_limit.max_requests, 5);
        assert_eq!(config.rate_limit.window_secs, 60);
        assert_eq!(config.safety.crisis_keywords, vec!["bunuh diri".to_string()]);
        assert_eq!(config.cache.ttl(), Duration::from_secs(600));
    }

    #[test]
    fn invalid_file_reports_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "rate_limit = [[[").unwrap();
        let err = AppConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = AppConfig {
            api_key: Some("sk-secret".into()),
            ..AppConfig::default()
        };
        let dbg = format!("{config:?}");
        assert!(!dbg.contains("sk-secret"));
        assert!(dbg.contains("[REDACTED]"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("deepseek-chat"));
        assert!(toml_str.contains("bunuh diri"));
    }
}
