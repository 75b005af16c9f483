//! Dependency resolver
//!
//! A string-keyed registry of shared singletons. Repositories ask it for their
//! bound model once, at construction, and resolution checks the concrete type
//! so a mis-bound identifier fails loudly instead of producing a repository
//! with nothing behind it.

use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::errors::{RepositoryError, RepositoryResult};

type Shared = Arc<dyn Any + Send + Sync>;

struct Binding {
    value: Shared,
    type_name: &'static str,
}

/// Registry of singletons keyed by identifier
#[derive(Default)]
pub struct Container {
    bindings: HashMap<String, Binding>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `value` under `id`, replacing any previous binding
    pub fn singleton<T: Any + Send + Sync>(&mut self, id: impl Into<String>, value: T) -> &mut Self {
        self.bind_shared(id, Arc::new(value))
    }

    /// Register an already shared value under `id`
    pub fn bind_shared<T: Any + Send + Sync>(&mut self, id: impl Into<String>, value: Arc<T>) -> &mut Self {
        let id = id.into();
        debug!("Binding {} to {}", id, type_name::<T>());
        self.bindings.insert(
            id,
            Binding {
                value,
                type_name: type_name::<T>(),
            },
        );
        self
    }

    pub fn contains(&self, id: &str) -> bool {
        self.bindings.contains_key(id)
    }

    /// Registered identifiers, sorted
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.bindings.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Resolve `id` as a `T`
    ///
    /// # Errors
    /// - `Unbound` when nothing is registered under `id`
    /// - `Binding` when the registered value is not a `T`
    pub fn resolve<T: Any + Send + Sync>(&self, id: &str) -> RepositoryResult<Arc<T>> {
        let binding = self
            .bindings
            .get(id)
            .ok_or_else(|| RepositoryError::unbound(id))?;

        Arc::clone(&binding.value).downcast::<T>().map_err(|_| {
            RepositoryError::binding(
                format!("{id} ({})", binding.type_name),
                type_name::<T>(),
            )
        })
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for id in self.ids() {
            map.entry(&id, &self.bindings[id].type_name);
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Mailer(&'static str);

    #[test]
    fn resolves_registered_singleton() {
        let mut container = Container::new();
        container.singleton("mailer", Mailer("smtp"));

        let first = container.resolve::<Mailer>("mailer").unwrap();
        let second = container.resolve::<Mailer>("mailer").unwrap();
        assert_eq!(*first, Mailer("smtp"));
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn wrong_type_is_a_binding_error() {
        let mut container = Container::new();
        container.singleton("mailer", "not a mailer".to_string());

        let err = container.resolve::<Mailer>("mailer").unwrap_err();
        assert!(matches!(err, RepositoryError::Binding { .. }));
        assert!(err.to_string().contains("Mailer"));
    }

    #[test]
    fn missing_id_is_unbound() {
        let container = Container::new();
        let err = container.resolve::<Mailer>("mailer").unwrap_err();
        assert!(matches!(err, RepositoryError::Unbound { .. }));
    }

    #[test]
    fn ids_are_sorted() {
        let mut container = Container::new();
        container.singleton("b", 1u8).singleton("a", 2u8);
        assert_eq!(container.ids(), vec!["a", "b"]);
        assert!(container.contains("a"));
    }
}
