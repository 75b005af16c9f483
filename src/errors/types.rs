//! Error type definitions for the repository helpers
//!
//! Store failures are deliberately absent here: CRUD verbs hand back the
//! store's own error type untouched.

use std::path::PathBuf;
use thiserror::Error;

/// Binding errors raised while wiring a repository to its model
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// The identifier resolved to something that is not the expected model type
    #[error("Class {model} must be an instance of {expected}")]
    Binding { model: String, expected: String },

    /// Nothing was registered under the identifier
    #[error("Model not found: nothing is bound to {model}")]
    Unbound { model: String },
}

/// Errors raised by the `setup:repository` scaffolding command
#[derive(Error, Debug)]
pub enum GeneratorError {
    /// The repository directory already exists
    #[error("Repository {name} already exist ! ({})", .path.display())]
    AlreadyExists { name: String, path: PathBuf },

    /// The name argument cannot be turned into a type name
    #[error("Invalid repository name: {name:?} - {message}")]
    InvalidName { name: String, message: String },

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    /// File system failures while writing generated files
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RepositoryError {
    /// Create a binding error for `model` that failed the type check
    pub fn binding<M: Into<String>, E: Into<String>>(model: M, expected: E) -> Self {
        Self::Binding {
            model: model.into(),
            expected: expected.into(),
        }
    }

    /// Create an unbound error for `model`
    pub fn unbound<M: Into<String>>(model: M) -> Self {
        Self::Unbound {
            model: model.into(),
        }
    }
}

impl GeneratorError {
    /// Create an invalid name error
    pub fn invalid_name<N: Into<String>, M: Into<String>>(name: N, message: M) -> Self {
        Self::InvalidName {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl From<figment::Error> for GeneratorError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_error_names_model_and_expected_type() {
        let err = RepositoryError::binding("articles", "SeaOrmStore<articles::Entity>");
        let message = err.to_string();
        assert!(message.contains("articles"));
        assert!(message.contains("must be an instance of"));
    }

    #[test]
    fn already_exists_mentions_name() {
        let err = GeneratorError::AlreadyExists {
            name: "User".to_string(),
            path: PathBuf::from("src/repositories/user"),
        };
        assert!(err.to_string().starts_with("Repository User already exist"));
    }
}
