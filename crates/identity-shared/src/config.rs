//! Configuration management

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::constants::{
    DEFAULT_ARGON2_ITERATIONS, DEFAULT_ARGON2_MEMORY_KIB, DEFAULT_ARGON2_PARALLELISM,
    DEFAULT_LICENCED_SEATS, MAX_FAILED_LOGIN_ATTEMPTS,
};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub security: SecuritySettings,
    pub policy: PolicySettings,
    pub log: LogSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub env: String,
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    /// Empty means "no database": binaries fall back to the in-memory store.
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SecuritySettings {
    pub argon2_memory_kib: u32,
    pub argon2_iterations: u32,
    pub argon2_parallelism: u32,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            argon2_memory_kib: DEFAULT_ARGON2_MEMORY_KIB,
            argon2_iterations: DEFAULT_ARGON2_ITERATIONS,
            argon2_parallelism: DEFAULT_ARGON2_PARALLELISM,
        }
    }
}

/// How "user already exists" is decided on registration.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserUniqueness {
    /// Any active user sharing the registrant's email domain blocks it.
    #[default]
    EmailDomain,
    /// Only an active user with the identical address blocks it.
    EmailAddress,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PolicySettings {
    pub default_licenced_seats: i32,
    pub max_failed_login_attempts: i32,
    #[serde(default)]
    pub user_uniqueness: UserUniqueness,
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            default_licenced_seats: DEFAULT_LICENCED_SEATS,
            max_failed_login_attempts: MAX_FAILED_LOGIN_ATTEMPTS,
            user_uniqueness: UserUniqueness::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    pub json: bool,
    /// When set, logs are also written to a daily-rolling file here.
    pub directory: Option<String>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            directory: None,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let config = Config::builder()
            .set_default("app.env", env.clone())?
            .set_default("app.name", "identity")?
            .set_default("database.url", "")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.acquire_timeout_secs", 3)?
            .set_default("security.argon2_memory_kib", DEFAULT_ARGON2_MEMORY_KIB)?
            .set_default("security.argon2_iterations", DEFAULT_ARGON2_ITERATIONS)?
            .set_default("security.argon2_parallelism", DEFAULT_ARGON2_PARALLELISM)?
            .set_default("policy.default_licenced_seats", DEFAULT_LICENCED_SEATS)?
            .set_default("policy.max_failed_login_attempts", MAX_FAILED_LOGIN_ATTEMPTS)?
            .set_default("policy.user_uniqueness", "email_domain")?
            .set_default("log.level", "info")?
            .set_default("log.json", false)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::default().separator("__").try_parsing(true))
            .build()?;
        config.try_deserialize()
    }
}
