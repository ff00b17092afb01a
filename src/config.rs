//! Process configuration.
//!
//! Everything is read from environment variables (after `dotenvy` has loaded
//! a `.env` file, if any). Parsing goes through a lookup closure so the
//! rules can be tested without touching the real environment.
//!
//! # Environment Variables
//!
//! - `HOST`: bind address (default: `0.0.0.0`)
//! - `PORT`: bind port (default: `5000`)
//! - `BODY_LIMIT_BYTES`: maximum request body size (default: 50 MiB)
//! - `JWT_SECRET`: token signing key, at least 16 bytes (required)
//! - `JWT_EXPIRE_DAYS`: token lifetime in days, 1 to 3650 (default: `30`)
//! - `LOG_FORMAT`: `text` (default) | `json`
//! - `ENABLE_CLEAR_DATABASE`: `true` | `1` | `yes` to mount the reset endpoint
//! - storage variables, see [`RepositoryConfig`]

use std::str::FromStr;

use thiserror::Error;

use crate::infrastructure::RepositoryConfig;

/// Minimum accepted length of `JWT_SECRET`, in bytes.
pub const MIN_SECRET_LENGTH: usize = 16;

/// Longest accepted token lifetime, in days.
pub const MAX_EXPIRE_DAYS: i64 = 3650;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_BODY_LIMIT_BYTES: usize = 50 * 1024 * 1024;
const DEFAULT_EXPIRE_DAYS: i64 = 30;

// =============================================================================
// Error Types
// =============================================================================

/// Errors raised while reading configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Invalid storage mode value.
    #[error("Invalid storage mode: '{0}'. Expected 'in_memory' or 'postgres'")]
    InvalidStorageMode(String),

    /// Missing `DATABASE_URL` when storage mode is Postgres.
    #[error("DATABASE_URL environment variable is required when STORAGE_MODE=postgres")]
    MissingDatabaseUrl,

    /// `JWT_SECRET` is not set.
    #[error("JWT_SECRET environment variable is required")]
    MissingJwtSecret,

    /// `JWT_SECRET` is too short to sign with.
    #[error("JWT_SECRET must be at least {MIN_SECRET_LENGTH} bytes long")]
    WeakJwtSecret,

    /// A variable holds a value that cannot be parsed.
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue {
        /// Variable name.
        key: &'static str,
        /// Raw value.
        value: String,
    },
}

// =============================================================================
// Configuration Types
// =============================================================================

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "text" | "pretty" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(ConfigurationError::InvalidValue {
                key: "LOG_FORMAT",
                value: value.to_string(),
            }),
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Maximum accepted request body, in bytes.
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
        }
    }
}

impl ServerConfig {
    /// Returns the `host:port` string to bind.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Token signing settings.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthConfig {
    /// HMAC signing key.
    pub secret: Vec<u8>,
    /// Token lifetime in days.
    pub expire_days: i64,
}

impl AuthConfig {
    /// Creates an auth configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::WeakJwtSecret` if the secret is shorter
    /// than [`MIN_SECRET_LENGTH`], and `ConfigurationError::InvalidValue` if
    /// `expire_days` is outside `1..=MAX_EXPIRE_DAYS`.
    pub fn new(secret: impl Into<Vec<u8>>, expire_days: i64) -> Result<Self, ConfigurationError> {
        let secret = secret.into();
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(ConfigurationError::WeakJwtSecret);
        }
        if !(1..=MAX_EXPIRE_DAYS).contains(&expire_days) {
            return Err(ConfigurationError::InvalidValue {
                key: "JWT_EXPIRE_DAYS",
                value: expire_days.to_string(),
            });
        }
        Ok(Self {
            secret,
            expire_days,
        })
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("AuthConfig")
            .field("secret", &"<redacted>")
            .field("expire_days", &self.expire_days)
            .finish()
    }
}

/// Complete process configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    /// HTTP listener.
    pub server: ServerConfig,
    /// Token signing.
    pub auth: AuthConfig,
    /// Storage backend.
    pub repository: RepositoryConfig,
    /// Log output format.
    pub log_format: LogFormat,
    /// Whether `DELETE /api/clear-database` is mounted (needs the
    /// `maintenance` feature as well).
    pub enable_clear_database: bool,
}

impl Settings {
    /// Reads settings from the process environment.
    ///
    /// # Errors
    ///
    /// See [`Settings::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if a required variable is missing or a
    /// value cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let server = ServerConfig {
            host: non_empty("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or("PORT", non_empty("PORT"), DEFAULT_PORT)?,
            body_limit_bytes: parse_or(
                "BODY_LIMIT_BYTES",
                non_empty("BODY_LIMIT_BYTES"),
                DEFAULT_BODY_LIMIT_BYTES,
            )?,
        };

        let secret = non_empty("JWT_SECRET").ok_or(ConfigurationError::MissingJwtSecret)?;
        let expire_days = parse_or(
            "JWT_EXPIRE_DAYS",
            non_empty("JWT_EXPIRE_DAYS"),
            DEFAULT_EXPIRE_DAYS,
        )?;
        let auth = AuthConfig::new(secret, expire_days)?;

        let log_format = non_empty("LOG_FORMAT")
            .map(|value| value.parse())
            .transpose()?
            .unwrap_or_default();

        let enable_clear_database = non_empty("ENABLE_CLEAR_DATABASE")
            .is_some_and(|value| is_truthy(&value));

        Ok(Self {
            server,
            auth,
            repository: RepositoryConfig::from_lookup(&lookup)?,
            log_format,
            enable_clear_database,
        })
    }
}

/// Returns `true` for `true`, `1` or `yes`, in any case.
#[must_use]
pub fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "yes")
}

fn parse_or<T: FromStr>(
    key: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigurationError> {
    match value {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigurationError::InvalidValue { key, value }),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::StorageMode;
    use rstest::rstest;
    use std::collections::HashMap;

    const SECRET: &str = "0123456789abcdef0123";

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[rstest]
    fn test_settings_defaults() {
        let settings = Settings::from_lookup(lookup_from(&[("JWT_SECRET", SECRET)])).unwrap();

        assert_eq!(settings.server, ServerConfig::default());
        assert_eq!(settings.server.bind_address(), "0.0.0.0:5000");
        assert_eq!(settings.auth.expire_days, 30);
        assert_eq!(settings.log_format, LogFormat::Text);
        assert_eq!(settings.repository.storage_mode, StorageMode::InMemory);
        assert!(!settings.enable_clear_database);
    }

    #[rstest]
    fn test_settings_overrides() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("JWT_SECRET", SECRET),
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("BODY_LIMIT_BYTES", "1024"),
            ("JWT_EXPIRE_DAYS", "7"),
            ("LOG_FORMAT", "JSON"),
            ("ENABLE_CLEAR_DATABASE", "yes"),
        ]))
        .unwrap();

        assert_eq!(settings.server.bind_address(), "127.0.0.1:8080");
        assert_eq!(settings.server.body_limit_bytes, 1024);
        assert_eq!(settings.auth.expire_days, 7);
        assert_eq!(settings.log_format, LogFormat::Json);
        assert!(settings.enable_clear_database);
    }

    #[rstest]
    fn test_settings_requires_secret() {
        let result = Settings::from_lookup(lookup_from(&[]));
        assert_eq!(result.unwrap_err(), ConfigurationError::MissingJwtSecret);
    }

    #[rstest]
    fn test_settings_rejects_short_secret() {
        let result = Settings::from_lookup(lookup_from(&[("JWT_SECRET", "short")]));
        assert_eq!(result.unwrap_err(), ConfigurationError::WeakJwtSecret);
    }

    #[rstest]
    #[case("PORT", "http")]
    #[case("PORT", "70000")]
    #[case("JWT_EXPIRE_DAYS", "0")]
    #[case("JWT_EXPIRE_DAYS", "3651")]
    #[case("JWT_EXPIRE_DAYS", "100000000")]
    #[case("LOG_FORMAT", "xml")]
    fn test_settings_rejects_invalid_values(#[case] key: &str, #[case] value: &str) {
        let result = Settings::from_lookup(lookup_from(&[("JWT_SECRET", SECRET), (key, value)]));
        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidValue { key: reported, .. }) if reported == key
        ));
    }

    #[rstest]
    #[case("true", true)]
    #[case("1", true)]
    #[case("YES", true)]
    #[case("false", false)]
    #[case("on", false)]
    fn test_is_truthy(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(is_truthy(input), expected);
    }

    #[rstest]
    #[case(-1)]
    #[case(0)]
    #[case(MAX_EXPIRE_DAYS + 1)]
    #[case(i64::MAX)]
    fn test_auth_config_rejects_out_of_range_lifetime(#[case] days: i64) {
        assert!(matches!(
            AuthConfig::new(SECRET, days),
            Err(ConfigurationError::InvalidValue { key: "JWT_EXPIRE_DAYS", .. })
        ));
    }

    #[rstest]
    fn test_auth_config_accepts_longest_lifetime() {
        assert_eq!(
            AuthConfig::new(SECRET, MAX_EXPIRE_DAYS).unwrap().expire_days,
            MAX_EXPIRE_DAYS
        );
    }

    #[rstest]
    fn test_auth_config_debug_redacts_secret() {
        let auth = AuthConfig::new(SECRET, 30).unwrap();
        let rendered = format!("{auth:?}");
        assert!(!rendered.contains(SECRET));
        assert!(rendered.contains("redacted"));
    }
}
