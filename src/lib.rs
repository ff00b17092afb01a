//! Tasker: a personal task-management API.
//!
//! Users sign up, then organize their tasks into projects, label them with
//! tags, and move them across `pending`, `in-progress` and `completed`
//! columns. Every record is private to the user who created it.
//!
//! # Layout
//!
//! - [`domain`]: records, identifiers and ownership rules
//! - [`filter`]: task filtering and status-board planning
//! - [`auth`]: password hashing, session tokens, the `CurrentUser` guard
//! - [`infrastructure`]: repositories (in-memory and `PostgreSQL`)
//! - [`api`]: HTTP handlers, DTOs and the router
//! - [`config`]: environment configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod filter;
pub mod infrastructure;
