//! Gateway configuration.
//!
//! Configuration is loaded from environment variables with fallback to
//! development defaults. The token secrets MUST be set in production.

use std::env;

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port.
    pub http_port: u16,

    /// Path to the SQLite credential store.
    pub database_path: String,

    /// Secret for signing access tokens.
    pub access_token_secret: String,

    /// Secret for signing refresh tokens (distinct from the access secret).
    pub refresh_token_secret: String,

    /// Access token lifetime in seconds.
    pub access_token_ttl_secs: i64,

    /// Refresh token lifetime in seconds.
    pub refresh_token_ttl_secs: i64,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ServerConfig {
            http_port: env::var("QUILL_HTTP_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("QUILL_HTTP_PORT".to_string()))?,

            database_path: env::var("QUILL_DATABASE_PATH")
                .unwrap_or_else(|_| "quillsync.db".to_string()),

            access_token_secret: env::var("QUILL_ACCESS_TOKEN_SECRET").unwrap_or_else(|_| {
                // Development fallback; in production this MUST be set.
                "quill-access-dev-secret-change-in-production".to_string()
            }),

            refresh_token_secret: env::var("QUILL_REFRESH_TOKEN_SECRET").unwrap_or_else(|_| {
                "quill-refresh-dev-secret-change-in-production".to_string()
            }),

            access_token_ttl_secs: env::var("QUILL_ACCESS_TOKEN_TTL_SECS")
                .unwrap_or_else(|_| "900".to_string()) // 15 minutes
                .parse()
                .map_err(|_| ConfigError::InvalidValue("QUILL_ACCESS_TOKEN_TTL_SECS".to_string()))?,

            refresh_token_ttl_secs: env::var("QUILL_REFRESH_TOKEN_TTL_SECS")
                .unwrap_or_else(|_| "604800".to_string()) // 7 days
                .parse()
                .map_err(|_| {
                    ConfigError::InvalidValue("QUILL_REFRESH_TOKEN_TTL_SECS".to_string())
                })?,
        };

        if config.access_token_secret == config.refresh_token_secret {
            return Err(ConfigError::SharedSecret);
        }

        Ok(config)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Access and refresh token secrets must differ")]
    SharedSecret,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_load() {
        // No relevant env vars set in the test environment.
        let config = ServerConfig::load().unwrap();
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.access_token_ttl_secs, 900);
        assert_eq!(config.refresh_token_ttl_secs, 604_800);
        assert_ne!(config.access_token_secret, config.refresh_token_secret);
    }
}
