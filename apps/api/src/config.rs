//! API server configuration.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. A `.env` file in the working directory is read first, if present.

use std::env;
use std::path::PathBuf;

use axum::http::HeaderValue;
use depot_core::DEFAULT_ACTOR;
use depot_db::DbConfig;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// HTTP port
    pub port: u16,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub db_max_connections: u32,

    /// HMAC secret for verifying bearer tokens
    pub jwt_secret: String,

    /// Access token lifetime in seconds (used when minting tokens)
    pub jwt_access_lifetime_secs: i64,

    /// Allowed CORS origins. Empty means any origin.
    pub cors_allowed_origins: Vec<HeaderValue>,

    /// Actor recorded when neither the line nor the caller names one
    pub default_actor: String,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// `JWT_SECRET_KEY` is required and has no default.
    pub fn load() -> Result<Self, ConfigError> {
        // Missing .env is fine
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let jwt_secret = lookup("JWT_SECRET_KEY")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::MissingRequired("JWT_SECRET_KEY".to_string()))?;

        let config = ApiConfig {
            port: var("PORT", "5000")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PORT".to_string()))?,

            database_path: var("DATABASE_PATH", "./depot.db").into(),

            db_max_connections: var("DB_MAX_CONNECTIONS", "5")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()))?,

            jwt_secret,

            jwt_access_lifetime_secs: var("JWT_ACCESS_LIFETIME_SECS", "3600")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("JWT_ACCESS_LIFETIME_SECS".to_string()))?,

            cors_allowed_origins: parse_origins(&var("CORS_ALLOWED_ORIGINS", ""))?,

            default_actor: lookup("DEFAULT_ACTOR")
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_ACTOR.to_string()),
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()));
        }

        Ok(config)
    }

    /// Configuration for tests: in-memory database, fixed secret.
    pub fn for_tests() -> Self {
        ApiConfig {
            port: 0,
            database_path: PathBuf::from(":memory:"),
            db_max_connections: 1,
            jwt_secret: "test-secret".to_string(),
            jwt_access_lifetime_secs: 3600,
            cors_allowed_origins: Vec::new(),
            default_actor: DEFAULT_ACTOR.to_string(),
        }
    }

    /// Database settings derived from this configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path).max_connections(self.db_max_connections)
    }
}

/// Parses a comma separated origin list, skipping blanks.
fn parse_origins(raw: &str) -> Result<Vec<HeaderValue>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|_| ConfigError::InvalidValue(format!("CORS_ALLOWED_ORIGINS ({origin})")))
        })
        .collect()
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
