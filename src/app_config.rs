use anyhow::{anyhow, Context, Result};
use log::{info, warn, LevelFilter};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use url::Url;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Emotion and sentiment detection vendor
    #[serde(default)]
    pub emotion: EmotionProviderConfig,

    /// Supportive response generation vendor
    #[serde(default)]
    pub generation: GenerationProviderConfig,

    /// Administrator credentials and session lifetime
    #[serde(default)]
    pub admin: AdminConfig,

    /// Entries and sessions older than this are removed by `cleanup`
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// HTTP server configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind
    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed by CORS; empty allows any origin
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Socket address string the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct DatabaseConfig {
    /// Path to the SQLite file; empty means the platform data directory
    #[serde(default)]
    pub path: String,
}

impl DatabaseConfig {
    /// Resolved database path, if one is configured explicitly
    pub fn explicit_path(&self) -> Option<PathBuf> {
        if self.path.trim().is_empty() {
            None
        } else {
            Some(PathBuf::from(&self.path))
        }
    }
}

/// Replicate-style prediction API used for sentiment and emotion models
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EmotionProviderConfig {
    // @field: API token
    #[serde(default = "String::new")]
    pub api_token: String,

    // @field: Service URL
    #[serde(default = "default_replicate_endpoint")]
    pub endpoint: String,

    // @field: Sentiment model version
    #[serde(default = "default_sentiment_model")]
    pub sentiment_model: String,

    // @field: Emotion classification model version
    #[serde(default = "default_emotion_model")]
    pub emotion_model: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmotionProviderConfig {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            endpoint: default_replicate_endpoint(),
            sentiment_model: default_sentiment_model(),
            emotion_model: default_emotion_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// OpenAI-compatible chat completion API (Together by default)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GenerationProviderConfig {
    /// API key for the service
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Service endpoint URL, up to and including the version segment
    #[serde(default = "default_together_endpoint")]
    pub endpoint: String,

    /// Chat model name
    #[serde(default = "default_generation_model")]
    pub model: String,

    /// Maximum number of tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Temperature parameter for text generation
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Nucleus sampling mass
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GenerationProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_together_endpoint(),
            model: default_generation_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Single administrator account
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AdminConfig {
    #[serde(default = "default_admin_email")]
    pub email: String,

    #[serde(default = "default_admin_password")]
    pub password: String,

    /// How long an issued admin token stays valid
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: i64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            email: default_admin_email(),
            password: default_admin_password(),
            session_ttl_hours: default_session_ttl_hours(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_retention_days() -> u32 {
    90
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_replicate_endpoint() -> String {
    "https://api.replicate.com".to_string()
}

fn default_together_endpoint() -> String {
    "https://api.together.xyz/v1".to_string()
}

fn default_sentiment_model() -> String {
    "daanelson/sentiment-analysis:2f6bcc9d0c1244b5c9e6e9b80b2a3b6c8c7e3b7f8e7e2c3b1e8f9c2d4e6f8a1b3c5".to_string()
}

fn default_emotion_model() -> String {
    "replicate/emotion-detection:1f2b3c4d5e6f7a8b9c0d1e2f3a4b5c6d7e8f9a0b1c2d3e4f5a6b7c8d9e0f1a2b3c4".to_string()
}

fn default_generation_model() -> String {
    "meta-llama/Llama-2-7b-chat-hf".to_string()
}

fn default_max_tokens() -> u32 {
    800
}

fn default_temperature() -> f32 {
    0.7
}

fn default_top_p() -> f32 {
    0.9
}

fn default_admin_email() -> String {
    "admin@mindmosaic.app".to_string()
}

fn default_admin_password() -> String {
    "mindmosaic2024".to_string()
}

fn default_session_ttl_hours() -> i64 {
    24
}

impl Config {
    /// Load configuration from `path`, writing a default file if none exists
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            info!("Loaded configuration from {}", path.display());
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;

        Ok(config)
    }

    /// Apply secrets and deployment settings from the environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = non_empty("REPLICATE_API_TOKEN") {
            self.emotion.api_token = token;
        }
        if let Some(key) = non_empty("TOGETHER_API_KEY") {
            self.generation.api_key = key;
        }
        if let Some(email) = non_empty("ADMIN_EMAIL") {
            self.admin.email = email;
        }
        if let Some(password) = non_empty("ADMIN_PASSWORD") {
            self.admin.password = password;
        }
        if let Some(path) = non_empty("MINDMOSAIC_DB") {
            self.database.path = path;
        }
        if let Some(port) = non_empty("MINDMOSAIC_PORT") {
            match port.trim().parse() {
                Ok(port) => self.server.port = port,
                Err(e) => warn!("Ignoring invalid MINDMOSAIC_PORT '{}': {}", port, e),
            }
        }
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow!("Server port must be non-zero"));
        }

        Url::parse(&self.emotion.endpoint)
            .with_context(|| format!("Invalid emotion endpoint: {}", self.emotion.endpoint))?;
        Url::parse(&self.generation.endpoint)
            .with_context(|| format!("Invalid generation endpoint: {}", self.generation.endpoint))?;

        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(anyhow!(
                "Generation temperature must be between 0.0 and 2.0, got {}",
                self.generation.temperature
            ));
        }
        if !(0.0..=1.0).contains(&self.generation.top_p) {
            return Err(anyhow!("Generation top_p must be between 0.0 and 1.0, got {}", self.generation.top_p));
        }
        if self.generation.max_tokens == 0 {
            return Err(anyhow!("Generation max_tokens must be greater than zero"));
        }

        if self.admin.email.trim().is_empty() || self.admin.password.is_empty() {
            return Err(anyhow!("Admin email and password are required"));
        }
        if self.admin.session_ttl_hours <= 0 {
            return Err(anyhow!("Admin session TTL must be positive"));
        }

        if self.retention_days == 0 {
            return Err(anyhow!("Retention must be at least one day"));
        }

        if self.emotion.api_token.is_empty() {
            warn!("No emotion API token configured, keyword analysis will be used");
        }
        if self.generation.api_key.is_empty() {
            warn!("No generation API key configured, fallback responses will be used");
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            emotion: EmotionProviderConfig::default(),
            generation: GenerationProviderConfig::default(),
            admin: AdminConfig::default(),
            retention_days: default_retention_days(),
            log_level: LogLevel::default(),
        }
    }
}
