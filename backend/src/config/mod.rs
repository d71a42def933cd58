//! Configuration management for the Aphid backend
//!
//! Configuration is loaded hierarchically:
//! 1. Default values (in code)
//! 2. TOML config files (config/development.toml or config/production.toml)
//! 3. Environment variables (prefix: APHID__)
//! 4. The conventional `DATABASE_URL`, `JWT_SECRET` and `OPENAI_API_KEY`
//!
//! The token secret and database URL have no usable default. Startup fails
//! when either is missing.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

/// Lifetime of a session token: 24 hours
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Token signing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub token_ttl_secs: i64,
}

/// AI responder configuration (OpenAI-compatible chat completions)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    pub enabled: bool,
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 20,
        }
    }
}

/// Local file storage for uploads and avatars
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub upload_dir: String,
    pub profile_pic_dir: String,
    pub max_upload_bytes: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: "uploads".to_string(),
            profile_pic_dir: "profile_pics".to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 10,
            },
            jwt: JwtConfig {
                secret: String::new(),
                token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            },
            ai: AiConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    ///
    /// Loading order (later sources override earlier):
    /// 1. Default values
    /// 2. Config file based on RUST_ENV (development.toml or production.toml)
    /// 3. Environment variables with APHID__ prefix
    /// 4. DATABASE_URL / JWT_SECRET / OPENAI_API_KEY
    pub fn load() -> Result<Self> {
        let env = env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string());
        let config_file = format!("config/{}.toml", env);

        let config = config::Config::builder()
            // Start with defaults
            .add_source(config::Config::try_from(&AppConfig::default())?)
            // Load from environment-specific config file
            .add_source(config::File::with_name(&config_file).required(false))
            // e.g., APHID__SERVER__PORT=9000 sets server.port
            .add_source(config::Environment::with_prefix("APHID").separator("__"))
            .set_override_option("database.url", env::var("DATABASE_URL").ok())?
            .set_override_option("jwt.secret", env::var("JWT_SECRET").ok())?
            .set_override_option("ai.api_key", env::var("OPENAI_API_KEY").ok())?
            .build()?;

        let config: AppConfig = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the service cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.jwt.secret.trim().is_empty() {
            anyhow::bail!("token secret is not configured (set JWT_SECRET or APHID__JWT__SECRET)");
        }
        if self.database.url.trim().is_empty() {
            anyhow::bail!("database URL is not configured (set DATABASE_URL or APHID__DATABASE__URL)");
        }
        if self.jwt.token_ttl_secs <= 0 {
            anyhow::bail!("jwt.token_ttl_secs must be positive");
        }
        if self.ai.enabled && self.ai.api_key.trim().is_empty() {
            anyhow::bail!("ai.enabled is set but no API key is configured");
        }
        Ok(())
    }

    /// Check if running in production mode
    pub fn is_production() -> bool {
        env::var("RUST_ENV")
            .map(|v| v == "production")
            .unwrap_or(false)
    }
}
