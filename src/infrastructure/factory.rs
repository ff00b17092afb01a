//! Repository factory for runtime backend selection.
//!
//! Chooses between the in-memory store and `PostgreSQL` based on
//! configuration, and hands the server one [`Repositories`] bundle either way.
//!
//! # Environment Variables
//!
//! - `STORAGE_MODE`: `in_memory` (default) | `postgres`
//! - `DATABASE_URL`: `PostgreSQL` connection URL (required when `STORAGE_MODE=postgres`)
//! - `DATABASE_MAX_CONNECTIONS`: pool size, default 10
//!
//! # Example
//!
//! ```ignore
//! let config = RepositoryConfig::from_env()?;
//! let repositories = RepositoryFactory::new(config).create().await?;
//! let tasks = repositories.task_repository.list_by_owner(&user_id).await?;
//! ```

use std::str::FromStr;
use std::sync::Arc;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use super::{
    InMemoryProjectRepository, InMemoryTagRepository, InMemoryTaskRepository,
    InMemoryUserRepository, PostgresProjectRepository, PostgresTagRepository,
    PostgresTaskRepository, PostgresUserRepository, ProjectRepository, TagRepository,
    TaskRepository, UserRepository, apply_schema,
};
use crate::config::ConfigurationError;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;

// =============================================================================
// Configuration Types
// =============================================================================

/// Storage backend for every collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    /// Process-local maps. Data is lost on restart.
    #[default]
    InMemory,
    /// `PostgreSQL` JSONB document tables.
    Postgres,
}

impl FromStr for StorageMode {
    type Err = ConfigurationError;

    /// Parses a storage mode from a string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidStorageMode` if the string is not recognized.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(Self::InMemory),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            _ => Err(ConfigurationError::InvalidStorageMode(value.to_string())),
        }
    }
}

/// Configuration for the repository factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryConfig {
    /// Selected backend.
    pub storage_mode: StorageMode,
    /// `PostgreSQL` connection URL (required when `storage_mode` is `Postgres`).
    pub database_url: Option<String>,
    /// Maximum pool size for `PostgreSQL`.
    pub max_connections: u32,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            storage_mode: StorageMode::default(),
            database_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl RepositoryConfig {
    /// Creates a configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// See [`RepositoryConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates a configuration from an arbitrary variable source.
    ///
    /// Empty or whitespace-only values count as unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if:
    /// - `STORAGE_MODE` contains an invalid value
    /// - `DATABASE_MAX_CONNECTIONS` is not a positive integer
    /// - `DATABASE_URL` is missing when `STORAGE_MODE=postgres`
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let storage_mode = non_empty("STORAGE_MODE")
            .map(|value| value.parse())
            .transpose()?
            .unwrap_or_default();

        let max_connections = match non_empty("DATABASE_MAX_CONNECTIONS") {
            Some(value) => value
                .parse::<u32>()
                .ok()
                .filter(|count| *count > 0)
                .ok_or_else(|| ConfigurationError::InvalidValue {
                    key: "DATABASE_MAX_CONNECTIONS",
                    value,
                })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let config = Self {
            storage_mode,
            database_url: non_empty("DATABASE_URL"),
            max_connections,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::MissingDatabaseUrl` if Postgres is selected without a URL.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.storage_mode == StorageMode::Postgres && self.database_url.is_none() {
            return Err(ConfigurationError::MissingDatabaseUrl);
        }
        Ok(())
    }
}

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during factory initialization.
#[derive(Debug, Error)]
pub enum FactoryError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    DatabaseConnection(String),

    /// Schema creation failed.
    #[error("Schema setup error: {0}")]
    Schema(String),
}

// =============================================================================
// Repository Factory
// =============================================================================

/// Collection of initialized repositories, shareable across threads.
#[derive(Clone)]
pub struct Repositories {
    /// Registered users.
    pub user_repository: Arc<dyn UserRepository + Send + Sync>,
    /// Projects.
    pub project_repository: Arc<dyn ProjectRepository + Send + Sync>,
    /// Tags.
    pub tag_repository: Arc<dyn TagRepository + Send + Sync>,
    /// Tasks.
    pub task_repository: Arc<dyn TaskRepository + Send + Sync>,
}

impl Repositories {
    /// Creates a fresh set of in-memory repositories.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            user_repository: Arc::new(InMemoryUserRepository::new()),
            project_repository: Arc::new(InMemoryProjectRepository::new()),
            tag_repository: Arc::new(InMemoryTagRepository::new()),
            task_repository: Arc::new(InMemoryTaskRepository::new()),
        }
    }

    /// Creates `PostgreSQL`-backed repositories sharing one pool.
    #[must_use]
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            user_repository: Arc::new(PostgresUserRepository::new(pool.clone())),
            project_repository: Arc::new(PostgresProjectRepository::new(pool.clone())),
            tag_repository: Arc::new(PostgresTagRepository::new(pool.clone())),
            task_repository: Arc::new(PostgresTaskRepository::new(pool.clone())),
        }
    }
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Repositories")
            .field("user_repository", &"Arc<dyn UserRepository>")
            .field("project_repository", &"Arc<dyn ProjectRepository>")
            .field("tag_repository", &"Arc<dyn TagRepository>")
            .field("task_repository", &"Arc<dyn TaskRepository>")
            .finish()
    }
}

/// Factory for creating repository instances based on configuration.
#[derive(Debug, Clone)]
pub struct RepositoryFactory {
    config: RepositoryConfig,
}

impl RepositoryFactory {
    /// Creates a new repository factory with the given configuration.
    #[must_use]
    pub const fn new(config: RepositoryConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration used by this factory.
    #[must_use]
    pub const fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// Creates all repositories based on the configuration.
    ///
    /// For `PostgreSQL` this connects the pool and applies the schema.
    ///
    /// # Errors
    ///
    /// Returns `FactoryError` if the database cannot be reached or the
    /// schema cannot be created.
    pub async fn create(&self) -> Result<Repositories, FactoryError> {
        match self.config.storage_mode {
            StorageMode::InMemory => Ok(Repositories::in_memory()),
            StorageMode::Postgres => {
                let pool = self.create_postgres_pool().await?;
                apply_schema(&pool)
                    .await
                    .map_err(|error| FactoryError::Schema(error.to_string()))?;
                Ok(Repositories::postgres(&pool))
            }
        }
    }

    /// Creates a `PostgreSQL` connection pool.
    async fn create_postgres_pool(&self) -> Result<PgPool, FactoryError> {
        let database_url = self
            .config
            .database_url
            .as_ref()
            .ok_or(ConfigurationError::MissingDatabaseUrl)?;

        PgPoolOptions::new()
            .max_connections(self.config.max_connections)
            .connect(database_url)
            .await
            .map_err(|error| FactoryError::DatabaseConnection(error.to_string()))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    // -------------------------------------------------------------------------
    // StorageMode Tests
    // -------------------------------------------------------------------------

    #[rstest]
    #[case("in_memory", StorageMode::InMemory)]
    #[case("inmemory", StorageMode::InMemory)]
    #[case("memory", StorageMode::InMemory)]
    #[case("IN_MEMORY", StorageMode::InMemory)]
    #[case("postgres", StorageMode::Postgres)]
    #[case("postgresql", StorageMode::Postgres)]
    #[case("pg", StorageMode::Postgres)]
    #[case(" POSTGRES ", StorageMode::Postgres)]
    fn test_storage_mode_from_str_valid(#[case] input: &str, #[case] expected: StorageMode) {
        assert_eq!(input.parse::<StorageMode>().unwrap(), expected);
    }

    #[rstest]
    #[case("mongodb")]
    #[case("")]
    fn test_storage_mode_from_str_invalid(#[case] input: &str) {
        let result = input.parse::<StorageMode>();
        assert_eq!(
            result.unwrap_err(),
            ConfigurationError::InvalidStorageMode(input.to_string())
        );
    }

    // -------------------------------------------------------------------------
    // RepositoryConfig Tests
    // -------------------------------------------------------------------------

    #[rstest]
    fn test_repository_config_defaults_to_in_memory() {
        let config = RepositoryConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, RepositoryConfig::default());
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
    }

    #[rstest]
    fn test_repository_config_postgres_requires_url() {
        let result = RepositoryConfig::from_lookup(lookup_from(&[("STORAGE_MODE", "postgres")]));
        assert_eq!(result.unwrap_err(), ConfigurationError::MissingDatabaseUrl);
    }

    #[rstest]
    fn test_repository_config_blank_url_counts_as_missing() {
        let result = RepositoryConfig::from_lookup(lookup_from(&[
            ("STORAGE_MODE", "postgres"),
            ("DATABASE_URL", "   "),
        ]));
        assert_eq!(result.unwrap_err(), ConfigurationError::MissingDatabaseUrl);
    }

    #[rstest]
    fn test_repository_config_postgres_with_url() {
        let config = RepositoryConfig::from_lookup(lookup_from(&[
            ("STORAGE_MODE", "postgres"),
            ("DATABASE_URL", "postgres://localhost/tasker"),
            ("DATABASE_MAX_CONNECTIONS", "4"),
        ]))
        .unwrap();
        assert_eq!(config.storage_mode, StorageMode::Postgres);
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/tasker")
        );
        assert_eq!(config.max_connections, 4);
    }

    #[rstest]
    #[case("0")]
    #[case("many")]
    fn test_repository_config_rejects_bad_pool_size(#[case] value: &str) {
        let result =
            RepositoryConfig::from_lookup(lookup_from(&[("DATABASE_MAX_CONNECTIONS", value)]));
        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidValue {
                key: "DATABASE_MAX_CONNECTIONS",
                ..
            })
        ));
    }

    // -------------------------------------------------------------------------
    // RepositoryFactory Tests
    // -------------------------------------------------------------------------

    #[rstest]
    #[tokio::test]
    async fn test_repository_factory_create_in_memory_repositories_are_functional() {
        let factory = RepositoryFactory::new(RepositoryConfig::default());
        let repositories = factory.create().await.unwrap();

        let owner = UserId::generate();
        let tasks = repositories.task_repository.list_by_owner(&owner).await;
        assert_eq!(tasks.unwrap().len(), 0);

        let cleared = repositories.user_repository.clear().await;
        assert_eq!(cleared.unwrap(), 0);
    }

    #[rstest]
    fn test_repositories_debug() {
        let debug_string = format!("{:?}", Repositories::in_memory());
        assert!(debug_string.contains("Repositories"));
        assert!(debug_string.contains("tag_repository"));
    }

    #[rstest]
    fn test_factory_error_display() {
        let error = FactoryError::Configuration(ConfigurationError::MissingDatabaseUrl);
        assert!(error.to_string().contains("Configuration"));

        let error = FactoryError::DatabaseConnection("connection refused".to_string());
        assert!(error.to_string().contains("connection refused"));
    }

    #[rstest]
    #[tokio::test]
    #[ignore = "Requires PostgreSQL instance"]
    async fn test_repository_factory_create_postgres() {
        let config = RepositoryConfig {
            storage_mode: StorageMode::Postgres,
            database_url: Some("postgres://localhost/tasker_test".to_string()),
            ..RepositoryConfig::default()
        };
        assert!(RepositoryFactory::new(config).create().await.is_ok());
    }
}
