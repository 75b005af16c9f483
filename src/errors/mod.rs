//! Centralized error handling for the repository helpers
//!
//! # Error Categories
//!
//! - **Binding Errors**: a repository could not be wired to a valid model
//! - **Generator Errors**: the scaffolding command refused or failed
//!
//! Store errors raised while executing a CRUD verb are not part of this
//! taxonomy. They reach the caller as the store's own error type.

pub mod types;

pub use types::*;

/// Convenience type alias for binding Results
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Convenience type alias for scaffolding Results
pub type GeneratorResult<T> = Result<T, GeneratorError>;
