//! Infrastructure module for storage backends.
//!
//! This module contains the repository traits, their in-memory and
//! `PostgreSQL` implementations, and the factory that picks one at startup.

pub mod factory;
pub mod in_memory;
pub mod postgres;
pub mod repository;

pub use factory::{FactoryError, Repositories, RepositoryConfig, RepositoryFactory, StorageMode};
pub use in_memory::{
    InMemoryProjectRepository, InMemoryTagRepository, InMemoryTaskRepository,
    InMemoryUserRepository,
};
pub use postgres::{
    PostgresProjectRepository, PostgresTagRepository, PostgresTaskRepository,
    PostgresUserRepository, apply_schema,
};
pub use repository::{
    ProjectRepository, RepositoryError, RepositoryFuture, TagRepository, TaskRepository,
    UserRepository,
};
