//! Repository pattern implementation for data access
//!
//! This module provides the conventional CRUD façade that sits between
//! business logic and a model store.
//!
//! # Architecture
//!
//! - [`Parameters`] normalizes whatever the caller passes into `{data, options}`
//! - [`ScopeHooks`] narrows the query scope before reads (`filter`) and
//!   writes (`mark`)
//! - [`BaseRepository`] forwards each verb to its [`ModelStore`]
//!
//! # Usage
//!
//! ```rust,ignore
//! use repository_pattern::repositories::{BaseRepository, Parameters, QueryScope, ScopeHooks};
//! use repository_pattern::database::SeaOrmStore;
//! use crate::entities::article;
//!
//! struct PublishedOnly;
//!
//! impl ScopeHooks for PublishedOnly {
//!     fn filter(&self, scope: QueryScope, _params: &Parameters) -> QueryScope {
//!         scope.where_eq("status", "published")
//!     }
//! }
//!
//! async fn example(store: std::sync::Arc<SeaOrmStore<article::Entity>>) -> Result<(), sea_orm::DbErr> {
//!     let repo = BaseRepository::new(store, PublishedOnly);
//!     let page = repo.get_list((), serde_json::json!({"paginate": 10})).await?;
//!     println!("{} published articles", page.total_count);
//!     Ok(())
//! }
//! ```

pub mod base;
pub mod method;
pub mod params;
pub mod scope;
pub mod traits;

// Re-export main traits and types
pub use base::BaseRepository;
pub use method::{QueryMethod, QueryOutput};
pub use params::{DEFAULT_PAGE_SIZE, Fields, Parameters, is_blank, normalize};
pub use scope::{Criterion, Direction, Operator, QueryScope};
pub use traits::*;
