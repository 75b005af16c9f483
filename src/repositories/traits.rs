//! Repository trait definitions
//!
//! [`ModelStore`] is the data-model / query-builder collaborator every
//! repository forwards to. [`ScopeHooks`] is the narrowing strategy a
//! repository applies before reads and writes.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use super::params::{Fields, Parameters};
use super::scope::QueryScope;

/// Query-builder surface a repository needs from its bound model
///
/// Implementations decide how a [`QueryScope`] maps onto their backend. Errors
/// are reported with the store's own error type and travel to the caller
/// unchanged.
#[async_trait]
pub trait ModelStore: Send + Sync {
    /// Row type returned by reads and creates
    type Record: Send;
    /// Error raised by the backend
    type Error: std::error::Error + Send + Sync + 'static;

    /// Human readable model name used in logs
    fn name(&self) -> &str;

    /// Fresh query scope for this model
    fn new_query(&self) -> QueryScope {
        QueryScope::new()
    }

    /// Every row matching `scope`
    async fn get(&self, scope: &QueryScope) -> Result<Vec<Self::Record>, Self::Error>;

    /// One page of rows matching `scope`; `page` is one-based
    async fn paginate(
        &self,
        scope: &QueryScope,
        per_page: u64,
        page: u64,
    ) -> Result<PaginatedResult<Self::Record>, Self::Error>;

    /// Row whose primary key equals `id`
    async fn find(&self, id: &Value) -> Result<Option<Self::Record>, Self::Error>;

    /// First row matching `scope`
    async fn first(&self, scope: &QueryScope) -> Result<Option<Self::Record>, Self::Error>;

    /// Insert a row built from `fields`
    async fn create(&self, fields: &Fields) -> Result<Self::Record, Self::Error>;

    /// Write `fields` to every row matching `scope`, returning rows affected
    async fn update(&self, scope: &QueryScope, fields: &Fields) -> Result<u64, Self::Error>;

    /// Update the first row matching `matching` with `values`, or insert both merged
    async fn update_or_create(
        &self,
        matching: &Fields,
        values: &Fields,
    ) -> Result<Self::Record, Self::Error>;

    /// Delete every row matching `scope`, returning rows affected
    async fn delete(&self, scope: &QueryScope) -> Result<u64, Self::Error>;
}

/// Scope narrowing applied by a repository before it calls the store
///
/// `filter` runs before `all`, `get_list`, `first` and `destroy`; `mark` runs
/// before `update`. Both receive the normalized parameters of the call and
/// return the scope to execute against. The defaults return it unchanged.
pub trait ScopeHooks: Send + Sync {
    fn filter(&self, scope: QueryScope, _params: &Parameters) -> QueryScope {
        scope
    }

    fn mark(&self, scope: QueryScope, _params: &Parameters) -> QueryScope {
        scope
    }
}

/// Hooks that never narrow
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl ScopeHooks for NoHooks {}

impl<H: ScopeHooks + ?Sized> ScopeHooks for Box<H> {
    fn filter(&self, scope: QueryScope, params: &Parameters) -> QueryScope {
        (**self).filter(scope, params)
    }

    fn mark(&self, scope: QueryScope, params: &Parameters) -> QueryScope {
        (**self).mark(scope, params)
    }
}

/// Standard paginated result structure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginatedResult<T> {
    /// The items for this page
    pub items: Vec<T>,
    /// Current page number (1-based)
    pub page: u64,
    /// Items per page
    pub per_page: u64,
    /// Total number of items across all pages
    pub total_count: u64,
    /// Total number of pages
    pub total_pages: u64,
    /// Whether there is a next page
    pub has_next: bool,
    /// Whether there is a previous page
    pub has_previous: bool,
}

impl<T> PaginatedResult<T> {
    /// Create a new paginated result
    pub fn new(items: Vec<T>, page: u64, per_page: u64, total_count: u64) -> Self {
        let total_pages = if per_page == 0 {
            0
        } else {
            total_count.div_ceil(per_page)
        };

        Self {
            items,
            page,
            per_page,
            total_count,
            total_pages,
            has_next: page < total_pages,
            has_previous: page > 1,
        }
    }
}
