//! Repository pattern helpers
//!
//! A CRUD façade over pluggable model stores, a small service container for
//! binding stores by name, and the `setup:repository` scaffolding command.

pub mod config;
pub mod container;
pub mod database;
pub mod errors;
pub mod generator;
pub mod repositories;

pub use container::Container;
pub use errors::{GeneratorError, RepositoryError};
pub use repositories::{BaseRepository, ModelStore, Parameters, QueryScope, ScopeHooks};
