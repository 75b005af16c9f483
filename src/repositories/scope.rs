//! Store-agnostic query scope
//!
//! A [`QueryScope`] describes "which rows" a verb applies to: a conjunction of
//! criteria, an ordering and an optional limit. It is a plain value: builder
//! methods consume the scope and hand back the narrowed one, so hooks and
//! callers thread it explicitly instead of mutating shared state.

use serde_json::Value;
use std::fmt;

use super::params::Fields;

/// Comparison applied by a [`Criterion`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    In,
    IsNull,
    IsNotNull,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "<>",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Like => "LIKE",
            Operator::In => "IN",
            Operator::IsNull => "IS NULL",
            Operator::IsNotNull => "IS NOT NULL",
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// Single `column <op> value` condition
#[derive(Debug, Clone, PartialEq)]
pub struct Criterion {
    pub column: String,
    pub operator: Operator,
    /// Ignored for `IsNull`/`IsNotNull`; an array for `In`
    pub value: Value,
}

/// Conditions, ordering and limit for one query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryScope {
    criteria: Vec<Criterion>,
    orders: Vec<(String, Direction)>,
    limit: Option<u64>,
}

impl QueryScope {
    /// Unscoped query: every row, natural order
    pub fn new() -> Self {
        Self::default()
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    pub fn orders(&self) -> &[(String, Direction)] {
        &self.orders
    }

    pub fn limit_value(&self) -> Option<u64> {
        self.limit
    }

    /// True when nothing narrows or orders the query
    pub fn is_unscoped(&self) -> bool {
        self.criteria.is_empty() && self.orders.is_empty() && self.limit.is_none()
    }

    /// Add an arbitrary criterion
    pub fn push(mut self, criterion: Criterion) -> Self {
        self.criteria.push(criterion);
        self
    }

    fn with<C: Into<String>>(self, column: C, operator: Operator, value: Value) -> Self {
        self.push(Criterion {
            column: column.into(),
            operator,
            value,
        })
    }

    pub fn where_eq<C: Into<String>, V: Into<Value>>(self, column: C, value: V) -> Self {
        self.with(column, Operator::Eq, value.into())
    }

    pub fn where_ne<C: Into<String>, V: Into<Value>>(self, column: C, value: V) -> Self {
        self.with(column, Operator::Ne, value.into())
    }

    pub fn where_gt<C: Into<String>, V: Into<Value>>(self, column: C, value: V) -> Self {
        self.with(column, Operator::Gt, value.into())
    }

    pub fn where_gte<C: Into<String>, V: Into<Value>>(self, column: C, value: V) -> Self {
        self.with(column, Operator::Gte, value.into())
    }

    pub fn where_lt<C: Into<String>, V: Into<Value>>(self, column: C, value: V) -> Self {
        self.with(column, Operator::Lt, value.into())
    }

    pub fn where_lte<C: Into<String>, V: Into<Value>>(self, column: C, value: V) -> Self {
        self.with(column, Operator::Lte, value.into())
    }

    /// SQL `LIKE` match; `pattern` carries its own `%` wildcards
    pub fn where_like<C: Into<String>, P: Into<String>>(self, column: C, pattern: P) -> Self {
        self.with(column, Operator::Like, Value::String(pattern.into()))
    }

    pub fn where_in<C, I, V>(self, column: C, values: I) -> Self
    where
        C: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.with(column, Operator::In, Value::Array(values))
    }

    pub fn where_null<C: Into<String>>(self, column: C) -> Self {
        self.with(column, Operator::IsNull, Value::Null)
    }

    pub fn where_not_null<C: Into<String>>(self, column: C) -> Self {
        self.with(column, Operator::IsNotNull, Value::Null)
    }

    /// Equality on every entry of `fields`
    pub fn where_fields(self, fields: &Fields) -> Self {
        fields
            .iter()
            .fold(self, |scope, (column, value)| scope.where_eq(column.as_str(), value.clone()))
    }

    pub fn order_by<C: Into<String>>(mut self, column: C, direction: Direction) -> Self {
        self.orders.push((column.into(), direction));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl fmt::Display for QueryScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unscoped() {
            return f.write_str("unscoped");
        }
        let mut parts = Vec::new();
        for criterion in &self.criteria {
            match criterion.operator {
                Operator::IsNull | Operator::IsNotNull => {
                    parts.push(format!("{} {}", criterion.column, criterion.operator.as_str()))
                }
                op => parts.push(format!("{} {} {}", criterion.column, op.as_str(), criterion.value)),
            }
        }
        for (column, direction) in &self.orders {
            let dir = match direction {
                Direction::Asc => "asc",
                Direction::Desc => "desc",
            };
            parts.push(format!("order {column} {dir}"));
        }
        if let Some(limit) = self.limit {
            parts.push(format!("limit {limit}"));
        }
        f.write_str(&parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builders_return_narrowed_copies() {
        let base = QueryScope::new();
        let narrowed = base.clone().where_eq("id", 7).order_by("name", Direction::Asc);

        assert!(base.is_unscoped());
        assert_eq!(narrowed.criteria().len(), 1);
        assert_eq!(narrowed.criteria()[0].value, json!(7));
        assert_eq!(narrowed.orders(), &[("name".to_string(), Direction::Asc)]);
    }

    #[test]
    fn where_fields_adds_one_equality_per_entry() {
        let fields = json!({"email": "a@b.c", "team": 3});
        let scope = QueryScope::new().where_fields(fields.as_object().unwrap());
        assert_eq!(scope.criteria().len(), 2);
        assert!(scope.criteria().iter().all(|c| c.operator == Operator::Eq));
    }

    #[test]
    fn where_in_collects_values() {
        let scope = QueryScope::new().where_in("id", [1, 2, 3]);
        assert_eq!(scope.criteria()[0].value, json!([1, 2, 3]));
    }

    #[test]
    fn display_summarizes_scope() {
        assert_eq!(QueryScope::new().to_string(), "unscoped");
        let scope = QueryScope::new()
            .where_eq("status", "open")
            .where_null("deleted_at")
            .limit(5);
        assert_eq!(
            scope.to_string(),
            "status = \"open\", deleted_at IS NULL, limit 5"
        );
    }
}
