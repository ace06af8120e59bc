// Process-wide configuration loaded once at startup
//
// The signing secret and database URL are required; startup aborts when they
// are missing instead of falling back to defaults.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set in the environment")]
    Missing(&'static str),
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("invalid PORT value: {0}")]
    InvalidPort(String),
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    /// Read configuration from the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = require_var("DATABASE_URL")?;
        let jwt_secret = require_var("JWT_SECRET")?;

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            Err(_) => 8080,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            host,
            port,
        })
    }
}

fn require_var(name: &'static str) -> Result<String, ConfigError> {
    let value = std::env::var(name).map_err(|_| ConfigError::Missing(name))?;
    if value.trim().is_empty() {
        return Err(ConfigError::Empty(name));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env-var tests mutate process state; keep them in one test so they
    // cannot race each other.
    #[test]
    fn missing_or_empty_secret_is_fatal() {
        std::env::set_var("DATABASE_URL", "postgresql://localhost/marketplace");

        std::env::remove_var("JWT_SECRET");
        assert!(matches!(
            AppConfig::from_env(),
            Err(ConfigError::Missing("JWT_SECRET"))
        ));

        std::env::set_var("JWT_SECRET", "   ");
        assert!(matches!(
            AppConfig::from_env(),
            Err(ConfigError::Empty("JWT_SECRET"))
        ));

        std::env::set_var("JWT_SECRET", "a-real-secret");
        std::env::remove_var("PORT");
        std::env::remove_var("HOST");
        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.jwt_secret, "a-real-secret");
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "0.0.0.0");

        std::env::set_var("PORT", "not-a-port");
        assert!(matches!(
            AppConfig::from_env(),
            Err(ConfigError::InvalidPort(_))
        ));
        std::env::remove_var("PORT");
    }
}
