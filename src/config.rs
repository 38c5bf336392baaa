//! Runtime configuration read from the environment (and `.env` via dotenvy).

use std::time::Duration;

use crate::db::DbConfig;
use crate::routes::editor::DEFAULT_IDLE_TIMEOUT;

pub const DEFAULT_JWT_SECRET: &str = "default-jwt-secret-change-in-production";
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@example.com";
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set to a secure, unique value in production")]
    InsecureJwtSecret,
    #[error("invalid bind address {0}")]
    BindAddress(String),
    #[error("failed to hash admin password: {0}")]
    AdminPassword(#[from] bcrypt::BcryptError),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub jwt_secret: String,
    pub admin_email: String,
    /// Bcrypt hash (`ADMIN_HASH_PASSWORD`) or plain password (`ADMIN_PASSWORD`).
    pub admin_password: AdminPassword,
    pub allowed_origins: Vec<String>,
    pub maps_api_key: Option<String>,
    pub database: Option<DbConfig>,
    /// Idle time after which an open editor draft is dropped.
    pub editor_idle_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminPassword {
    Hashed(String),
    Plain(String),
    Default,
}

fn var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            environment: "development".to_string(),
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            admin_email: DEFAULT_ADMIN_EMAIL.to_string(),
            admin_password: AdminPassword::Default,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            maps_api_key: None,
            database: None,
            editor_idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let admin_password = match (var("ADMIN_HASH_PASSWORD"), var("ADMIN_PASSWORD")) {
            (Some(hash), _) => AdminPassword::Hashed(hash),
            (None, Some(plain)) => AdminPassword::Plain(plain),
            (None, None) => AdminPassword::Default,
        };

        // ALLOWED_ORIGINS (comma-separated) wins over FRONTEND_ORIGIN
        let allowed_origins = var("ALLOWED_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|origins| !origins.is_empty())
            .or_else(|| var("FRONTEND_ORIGIN").map(|o| vec![o]))
            .unwrap_or(defaults.allowed_origins);

        Self {
            host: var("HOST").unwrap_or(defaults.host),
            port: var("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            environment: var("ENVIRONMENT").unwrap_or(defaults.environment),
            jwt_secret: var("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            admin_email: var("ADMIN_EMAIL").unwrap_or(defaults.admin_email),
            admin_password,
            allowed_origins,
            maps_api_key: var("GOOGLE_MAPS_API_KEY"),
            database: DbConfig::from_env(),
            editor_idle_timeout: var("EDITOR_IDLE_MINUTES")
                .and_then(|m| m.parse::<u64>().ok())
                .filter(|m| *m > 0)
                .map(|m| Duration::from_secs(m * 60))
                .unwrap_or(defaults.editor_idle_timeout),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Refuse insecure settings in production; warn about weaker ones.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.is_production() {
            return Ok(());
        }
        if self.jwt_secret.is_empty() || self.jwt_secret == DEFAULT_JWT_SECRET {
            return Err(ConfigError::InsecureJwtSecret);
        }
        if self.admin_email == DEFAULT_ADMIN_EMAIL {
            tracing::warn!(
                "SECURITY: ADMIN_EMAIL is using an insecure default. \
                 Set ADMIN_EMAIL to a real address."
            );
        }
        if self.admin_password == AdminPassword::Default {
            tracing::warn!(
                "SECURITY: Neither ADMIN_HASH_PASSWORD nor ADMIN_PASSWORD is set. \
                 The fallback default password is insecure."
            );
        }
        Ok(())
    }

    pub fn bind_address(&self) -> Result<std::net::SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse().map_err(|_| ConfigError::BindAddress(raw))
    }

    /// Bcrypt hash for the seeded admin account.
    pub fn admin_password_hash(&self) -> Result<String, ConfigError> {
        let plain = match &self.admin_password {
            AdminPassword::Hashed(hash) => return Ok(hash.clone()),
            AdminPassword::Plain(plain) => plain.as_str(),
            AdminPassword::Default => DEFAULT_ADMIN_PASSWORD,
        };
        Ok(bcrypt::hash(plain, bcrypt::DEFAULT_COST)?)
    }
}
