//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

const DEFAULT_TUTOR_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// The generation-provider credential, validated once at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GenerationCredential {
    Configured(String),
    /// No usable key; every generation call fails fast.
    Missing,
}

impl GenerationCredential {
    /// Blank values are treated the same as an absent variable.
    pub fn from_value(value: Option<String>) -> Self {
        match value {
            Some(key) if !key.trim().is_empty() => Self::Configured(key.trim().to_string()),
            _ => Self::Missing,
        }
    }
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// `None` runs the service on the in-memory store.
    pub database_url: Option<String>,
    pub log_level: Level,
    pub credential: GenerationCredential,
    pub tutor_model: String,
    pub tutor_api_base: String,
    pub generation_deadline: Duration,
    pub cors_origin: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Server and Database Settings ---
        let bind_address_str = lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Generation Settings ---
        let credential = GenerationCredential::from_value(lookup("GEMINI_API_KEY"));
        let tutor_model = lookup("TUTOR_MODEL").unwrap_or_else(|| "gemini-2.0-flash".to_string());
        let tutor_api_base =
            lookup("TUTOR_API_BASE").unwrap_or_else(|| DEFAULT_TUTOR_API_BASE.to_string());

        let generation_deadline = match lookup("GENERATION_DEADLINE_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidValue(
                        "GENERATION_DEADLINE_SECS".to_string(),
                        format!("'{}' is not a positive number of seconds", raw),
                    ))
                }
            },
            None => brainbytes_core::DEFAULT_DEADLINE,
        };

        let cors_origin =
            lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:3001".to_string());

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            credential,
            tutor_model,
            tutor_api_base,
            generation_deadline,
            cors_origin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = load(&[]).unwrap();
        assert_eq!(config.bind_address.port(), 3000);
        assert_eq!(config.database_url, None);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.credential, GenerationCredential::Missing);
        assert_eq!(config.tutor_model, "gemini-2.0-flash");
        assert_eq!(config.generation_deadline, Duration::from_secs(15));
    }

    #[test]
    fn blank_key_is_missing() {
        let config = load(&[("GEMINI_API_KEY", "   ")]).unwrap();
        assert_eq!(config.credential, GenerationCredential::Missing);
    }

    #[test]
    fn key_is_captured() {
        let config = load(&[("GEMINI_API_KEY", "secret")]).unwrap();
        assert_eq!(
            config.credential,
            GenerationCredential::Configured("secret".to_string())
        );
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            load(&[("BIND_ADDRESS", "nowhere")]),
            Err(ConfigError::InvalidValue(name, _)) if name == "BIND_ADDRESS"
        ));
        assert!(matches!(
            load(&[("GENERATION_DEADLINE_SECS", "0")]),
            Err(ConfigError::InvalidValue(name, _)) if name == "GENERATION_DEADLINE_SECS"
        ));
        assert!(load(&[("RUST_LOG", "chatty")]).is_err());
    }

    #[test]
    fn deadline_override() {
        let config = load(&[("GENERATION_DEADLINE_SECS", "30")]).unwrap();
        assert_eq!(config.generation_deadline, Duration::from_secs(30));
    }
}
