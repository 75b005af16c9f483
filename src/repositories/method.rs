//! Low-level access to the bound query scope
//!
//! [`QueryMethod`] lists every operation a repository may forward to its
//! store. Scope builders narrow the repository's held scope until the next
//! `reset_model()`; terminals execute against it.

use serde_json::Value;

use super::params::Fields;
use super::scope::{Criterion, Direction};
use super::traits::PaginatedResult;

/// Operation forwarded by `BaseRepository::method`
#[derive(Debug, Clone, PartialEq)]
pub enum QueryMethod {
    /// Narrow the held scope with a criterion
    Where(Criterion),
    /// Append an ordering to the held scope
    OrderBy(String, Direction),
    /// Cap the number of rows the held scope returns
    Limit(u64),
    Get,
    Paginate { per_page: u64, page: u64 },
    Find(Value),
    First,
    Create(Fields),
    Update(Fields),
    UpdateOrCreate { matching: Fields, values: Fields },
    Delete,
}

impl QueryMethod {
    pub fn name(&self) -> &'static str {
        match self {
            QueryMethod::Where(_) => "where",
            QueryMethod::OrderBy(..) => "orderBy",
            QueryMethod::Limit(_) => "limit",
            QueryMethod::Get => "get",
            QueryMethod::Paginate { .. } => "paginate",
            QueryMethod::Find(_) => "find",
            QueryMethod::First => "first",
            QueryMethod::Create(_) => "create",
            QueryMethod::Update(_) => "update",
            QueryMethod::UpdateOrCreate { .. } => "updateOrCreate",
            QueryMethod::Delete => "delete",
        }
    }
}

/// Result of a forwarded [`QueryMethod`]
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutput<R> {
    /// A scope builder ran; nothing was executed
    Scoped,
    Records(Vec<R>),
    Page(PaginatedResult<R>),
    Record(Option<R>),
    Created(R),
    Affected(u64),
}

impl<R> QueryOutput<R> {
    pub fn into_records(self) -> Option<Vec<R>> {
        match self {
            QueryOutput::Records(records) => Some(records),
            QueryOutput::Page(page) => Some(page.items),
            _ => None,
        }
    }

    pub fn into_record(self) -> Option<R> {
        match self {
            QueryOutput::Record(record) => record,
            QueryOutput::Created(record) => Some(record),
            _ => None,
        }
    }

    pub fn rows_affected(&self) -> Option<u64> {
        match self {
            QueryOutput::Affected(rows) => Some(*rows),
            _ => None,
        }
    }
}
