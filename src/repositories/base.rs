//! CRUD façade over a bound [`ModelStore`]
//!
//! Every verb normalizes its input into [`Parameters`], lets the
//! [`ScopeHooks`] narrow a copy of the held scope where the verb calls for it,
//! then forwards to the store. Results and store errors come back untouched.

use serde::Serialize;
use serde_json::Value;
use std::any::{Any, type_name};
use std::sync::Arc;
use tracing::{debug, trace};

use super::method::{QueryMethod, QueryOutput};
use super::params::{DEFAULT_PAGE_SIZE, Parameters};
use super::scope::QueryScope;
use super::traits::{ModelStore, NoHooks, PaginatedResult, ScopeHooks};
use crate::container::Container;
use crate::errors::RepositoryResult;

type StoreResult<T, S> = Result<T, <S as ModelStore>::Error>;

/// Repository bound to one model store and one narrowing strategy
///
/// One instance serves one logical call context: scope builders issued
/// through [`method`](Self::method) need `&mut self` and persist until
/// [`reset_model`](Self::reset_model).
pub struct BaseRepository<S: ModelStore, H: ScopeHooks = NoHooks> {
    store: Arc<S>,
    hooks: H,
    scope: QueryScope,
}

impl<S: ModelStore> BaseRepository<S, NoHooks> {
    /// Repository without narrowing hooks
    pub fn plain(store: Arc<S>) -> Self {
        Self::new(store, NoHooks)
    }
}

impl<S: ModelStore, H: ScopeHooks> BaseRepository<S, H> {
    pub fn new(store: Arc<S>, hooks: H) -> Self {
        let scope = store.new_query();
        Self { store, hooks, scope }
    }

    /// Resolve the model bound under `model` and wrap it
    ///
    /// # Errors
    /// Returns a binding error when nothing, or something other than an `S`,
    /// is registered under `model`.
    pub fn from_container(container: &Container, model: &str, hooks: H) -> RepositoryResult<Self>
    where
        S: Any,
    {
        let store = container.resolve::<S>(model)?;
        debug!("Repository bound to model {} ({})", model, type_name::<S>());
        Ok(Self::new(store, hooks))
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    /// Scope every verb starts from
    pub fn scope(&self) -> &QueryScope {
        &self.scope
    }

    /// Replace the held scope with a fresh one from the store
    pub fn reset_model(&mut self) -> &QueryScope {
        trace!("Resetting scope for {}", self.store.name());
        self.scope = self.store.new_query();
        &self.scope
    }

    /// Normalize raw input into parameters
    pub fn build_params<D: Serialize, O: Serialize>(&self, data: D, options: O) -> Parameters {
        Parameters::new(data, options)
    }

    /// Forward an operation to the store
    ///
    /// Scope builders narrow the held scope and return [`QueryOutput::Scoped`];
    /// terminals run against the held scope without hooks.
    pub async fn method(&mut self, method: QueryMethod) -> StoreResult<QueryOutput<S::Record>, S> {
        trace!("{}::{} on [{}]", self.store.name(), method.name(), self.scope);
        let store = &self.store;
        let scope = &mut self.scope;
        Ok(match method {
            QueryMethod::Where(criterion) => {
                *scope = std::mem::take(scope).push(criterion);
                QueryOutput::Scoped
            }
            QueryMethod::OrderBy(column, direction) => {
                *scope = std::mem::take(scope).order_by(column, direction);
                QueryOutput::Scoped
            }
            QueryMethod::Limit(limit) => {
                *scope = std::mem::take(scope).limit(limit);
                QueryOutput::Scoped
            }
            QueryMethod::Get => QueryOutput::Records(store.get(scope).await?),
            QueryMethod::Paginate { per_page, page } => {
                QueryOutput::Page(store.paginate(scope, per_page, page).await?)
            }
            QueryMethod::Find(id) => QueryOutput::Record(store.find(&id).await?),
            QueryMethod::First => QueryOutput::Record(store.first(scope).await?),
            QueryMethod::Create(fields) => QueryOutput::Created(store.create(&fields).await?),
            QueryMethod::Update(fields) => QueryOutput::Affected(store.update(scope, &fields).await?),
            QueryMethod::UpdateOrCreate { matching, values } => {
                QueryOutput::Created(store.update_or_create(&matching, &values).await?)
            }
            QueryMethod::Delete => QueryOutput::Affected(store.delete(scope).await?),
        })
    }

    fn filtered(&self, params: &Parameters) -> QueryScope {
        self.hooks.filter(self.scope.clone(), params)
    }

    fn marked(&self, params: &Parameters) -> QueryScope {
        self.hooks.mark(self.scope.clone(), params)
    }

    /// Every row in the filtered scope
    pub async fn all<D: Serialize, O: Serialize>(&self, data: D, options: O) -> StoreResult<Vec<S::Record>, S> {
        let params = self.build_params(data, options);
        let scope = self.filtered(&params);
        debug!("{}::all [{}]", self.store.name(), scope);
        self.store.get(&scope).await
    }

    /// One page of the filtered scope
    ///
    /// Page size comes from `options.paginate` (default 20), the page number
    /// from `options.page` (default 1).
    pub async fn get_list<D: Serialize, O: Serialize>(
        &self,
        data: D,
        options: O,
    ) -> StoreResult<PaginatedResult<S::Record>, S> {
        let params = self.build_params(data, options);
        let scope = self.filtered(&params);
        let per_page = params.page_size(DEFAULT_PAGE_SIZE);
        let page = params.page();
        debug!(
            "{}::get_list [{}] per_page={} page={}",
            self.store.name(),
            scope,
            per_page,
            page
        );
        self.store.paginate(&scope, per_page, page).await
    }

    /// Row whose primary key is `data.id`
    pub async fn find<D: Serialize>(&self, data: D) -> StoreResult<Option<S::Record>, S> {
        let params = self.build_params(data, ());
        let id = params.get("id").cloned().unwrap_or(Value::Null);
        debug!("{}::find id={}", self.store.name(), id);
        self.store.find(&id).await
    }

    /// First row in the filtered scope
    pub async fn first<D: Serialize, O: Serialize>(&self, data: D, options: O) -> StoreResult<Option<S::Record>, S> {
        let params = self.build_params(data, options);
        let scope = self.filtered(&params);
        debug!("{}::first [{}]", self.store.name(), scope);
        self.store.first(&scope).await
    }

    /// Insert a row from the whole data mapping
    pub async fn create<D: Serialize>(&self, data: D) -> StoreResult<S::Record, S> {
        let params = self.build_params(data, ());
        debug!("{}::create fields={}", self.store.name(), params.data_or_empty().len());
        self.store.create(params.data_or_empty()).await
    }

    /// Write the whole data mapping to every row in the marked scope
    pub async fn update<D: Serialize, O: Serialize>(&self, data: D, options: O) -> StoreResult<u64, S> {
        let params = self.build_params(data, options);
        let scope = self.marked(&params);
        debug!("{}::update [{}]", self.store.name(), scope);
        self.store.update(&scope, params.data_or_empty()).await
    }

    /// Update the row matching the options mapping, or create it
    pub async fn update_or_create<D: Serialize, O: Serialize>(
        &self,
        data: D,
        options: O,
    ) -> StoreResult<S::Record, S> {
        let params = self.build_params(data, options);
        debug!(
            "{}::update_or_create match_fields={}",
            self.store.name(),
            params.options_or_empty().len()
        );
        self.store
            .update_or_create(params.options_or_empty(), params.data_or_empty())
            .await
    }

    /// Delete every row in the filtered scope
    pub async fn destroy<D: Serialize, O: Serialize>(&self, data: D, options: O) -> StoreResult<u64, S> {
        let params = self.build_params(data, options);
        let scope = self.filtered(&params);
        debug!("{}::destroy [{}]", self.store.name(), scope);
        self.store.delete(&scope).await
    }
}

impl<S: ModelStore, H: ScopeHooks + Clone> Clone for BaseRepository<S, H> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            hooks: self.hooks.clone(),
            scope: self.scope.clone(),
        }
    }
}

