//! Application configuration

use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub bind_address: String,

    // Database
    pub database_url: String,
    pub database_max_connections: u32,

    // Authentication
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub super_token_expiry_minutes: i64,

    // Email
    pub smtp_from: Option<String>,
    pub resend_api_key: String,
    pub resend_base_url: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // Server
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),

            // Database
            database_url: env::var("DATABASE_URL")
                .map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
            database_max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 5)?,

            // Authentication
            jwt_secret: {
                let secret =
                    env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;
                if secret.len() < 32 {
                    return Err(ConfigError::WeakSecret(
                        "JWT_SECRET must be at least 32 characters",
                    ));
                }
                secret
            },
            jwt_expiry_hours: parse_or("JWT_EXPIRY_HOURS", 24)?,
            super_token_expiry_minutes: parse_or("SUPER_TOKEN_EXPIRY_MINUTES", 60)?,

            // Email
            smtp_from: env::var("SMTP_FROM").ok().filter(|from| !from.trim().is_empty()),
            resend_api_key: env::var("RESEND_API_KEY").unwrap_or_default(),
            resend_base_url: env::var("RESEND_BASE_URL")
                .unwrap_or_else(|_| "https://api.resend.com".to_string()),
        })
    }
}

fn parse_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(default),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
    #[error("Weak secret: {0}")]
    WeakSecret(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "BIND_ADDRESS",
        "DATABASE_URL",
        "DATABASE_MAX_CONNECTIONS",
        "JWT_SECRET",
        "JWT_EXPIRY_HOURS",
        "SUPER_TOKEN_EXPIRY_MINUTES",
        "SMTP_FROM",
        "RESEND_API_KEY",
        "RESEND_BASE_URL",
    ];

    /// Helper to set required env vars for testing
    fn setup_minimal_config() {
        cleanup_config();
        env::set_var("DATABASE_URL", "postgres://test");
        env::set_var(
            "JWT_SECRET",
            "test-jwt-secret-must-be-at-least-32-characters-long",
        );
    }

    fn cleanup_config() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        setup_minimal_config();

        let config = Config::from_env().unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:8080");
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.jwt_expiry_hours, 24);
        assert_eq!(config.super_token_expiry_minutes, 60);
        assert_eq!(config.smtp_from, None);
        assert_eq!(config.resend_base_url, "https://api.resend.com");

        cleanup_config();
    }

    #[test]
    #[serial]
    fn test_missing_required_vars() {
        cleanup_config();
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Missing("DATABASE_URL"))
        ));

        env::set_var("DATABASE_URL", "postgres://test");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Missing("JWT_SECRET"))
        ));

        cleanup_config();
    }

    #[test]
    #[serial]
    fn test_short_jwt_secret_rejected() {
        setup_minimal_config();
        env::set_var("JWT_SECRET", "short");

        assert!(matches!(Config::from_env(), Err(ConfigError::WeakSecret(_))));

        cleanup_config();
    }

    #[test]
    #[serial]
    fn test_invalid_number_rejected() {
        setup_minimal_config();
        env::set_var("JWT_EXPIRY_HOURS", "a day");

        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid("JWT_EXPIRY_HOURS"))
        ));

        cleanup_config();
    }

    #[test]
    #[serial]
    fn test_blank_sender_address_is_unset() {
        setup_minimal_config();
        env::set_var("SMTP_FROM", "   ");
        assert_eq!(Config::from_env().unwrap().smtp_from, None);

        env::set_var("SMTP_FROM", "Glossa <no-reply@glossa.dev>");
        assert_eq!(
            Config::from_env().unwrap().smtp_from.as_deref(),
            Some("Glossa <no-reply@glossa.dev>")
        );

        cleanup_config();
    }
}
