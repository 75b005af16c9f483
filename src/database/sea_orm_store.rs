//! SeaORM model store
//!
//! [`SeaOrmStore`] binds one SeaORM entity to the [`ModelStore`] surface so a
//! [`BaseRepository`](crate::repositories::BaseRepository) can drive it. Field
//! mappings are turned into active models through the entity's serde
//! implementation, and scope criteria become typed conditions on the entity's
//! columns. Works across SQLite, PostgreSQL and MySQL.

use async_trait::async_trait;
use sea_orm::sea_query::SimpleExpr;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ActiveValue, ColumnTrait, Condition, DatabaseConnection,
    DbErr, EntityTrait, IdenStatic, IntoActiveModel, Iterable, Order, PaginatorTrait,
    PrimaryKeyToColumn, QueryFilter, QueryOrder, QuerySelect, Select, TryIntoModel,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::trace;

use crate::container::Container;
use crate::repositories::{
    Criterion, Direction, Fields, ModelStore, Operator, PaginatedResult, QueryScope,
};

/// SeaORM-backed store for entity `E`
pub struct SeaOrmStore<E: EntityTrait> {
    connection: Arc<DatabaseConnection>,
    name: String,
    _entity: PhantomData<fn() -> E>,
}

impl<E: EntityTrait> Clone for SeaOrmStore<E> {
    fn clone(&self) -> Self {
        Self {
            connection: Arc::clone(&self.connection),
            name: self.name.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: EntityTrait> SeaOrmStore<E> {
    /// Create a new store named after the entity's table
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        let name = E::default().table_name().to_string();
        Self {
            connection,
            name,
            _entity: PhantomData,
        }
    }

    /// Register a store for `E` in `container` under its table name
    pub fn bind(container: &mut Container, connection: Arc<DatabaseConnection>) -> Arc<Self> {
        let store = Arc::new(Self::new(connection));
        container.bind_shared(store.name.clone(), Arc::clone(&store));
        store
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }

    fn column(&self, name: &str) -> Result<E::Column, DbErr> {
        E::Column::iter()
            .find(|column| column.as_str() == name)
            .ok_or_else(|| DbErr::Custom(format!("Unknown column {} on {}", name, self.name)))
    }
}

impl<E> SeaOrmStore<E>
where
    E: EntityTrait,
    E::Model: Serialize + DeserializeOwned + IntoActiveModel<E::ActiveModel> + Send + Sync,
    E::ActiveModel: ActiveModelBehavior + TryIntoModel<E::Model> + Send + Sync,
{
    /// Active model with exactly the columns present in `fields` set
    fn active_model(&self, fields: &Fields) -> Result<E::ActiveModel, DbErr> {
        let mut accepted = Fields::new();
        for (key, value) in fields {
            let (value, _) = self.accepted_value(self.column(key)?, value)?;
            accepted.insert(key.clone(), value);
        }
        <E::ActiveModel as ActiveModelTrait>::from_json(Value::Object(accepted))
    }

    fn probe(&self, column: E::Column, value: &Value) -> Result<E::ActiveModel, DbErr> {
        let mut probe = Fields::new();
        probe.insert(column.as_str().to_string(), value.clone());
        <E::ActiveModel as ActiveModelTrait>::from_json(Value::Object(probe))
    }

    /// JSON value the column deserializes, with the active model it produced
    ///
    /// Request input often carries numbers as strings and the reverse, so a
    /// rejected value is retried once in its other textual form.
    fn accepted_value(
        &self,
        column: E::Column,
        value: &Value,
    ) -> Result<(Value, E::ActiveModel), DbErr> {
        match self.probe(column, value) {
            Ok(model) => Ok((value.clone(), model)),
            Err(err) => {
                let Some(retry) = reinterpret(value) else {
                    return Err(err);
                };
                trace!("Retrying {} on {}.{} as {}", value, self.name, column.as_str(), retry);
                match self.probe(column, &retry) {
                    Ok(model) => Ok((retry, model)),
                    Err(_) => Err(err),
                }
            }
        }
    }

    /// Convert a JSON value into the column's own value type
    fn typed_value(&self, column: E::Column, value: &Value) -> Result<sea_orm::Value, DbErr> {
        let (_, model) = self.accepted_value(column, value)?;
        match model.get(column) {
            ActiveValue::Set(typed) | ActiveValue::Unchanged(typed) => Ok(typed),
            ActiveValue::NotSet => Err(DbErr::Custom(format!(
                "Cannot convert {} for column {} on {}",
                value,
                column.as_str(),
                self.name
            ))),
        }
    }

    fn expression(&self, criterion: &Criterion) -> Result<SimpleExpr, DbErr> {
        let column = self.column(&criterion.column)?;
        let value = &criterion.value;

        Ok(match criterion.operator {
            Operator::IsNull => column.is_null(),
            Operator::IsNotNull => column.is_not_null(),
            Operator::Eq if value.is_null() => column.is_null(),
            Operator::Ne if value.is_null() => column.is_not_null(),
            Operator::Like => {
                let pattern = match value {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                };
                column.like(pattern.as_str())
            }
            Operator::In => {
                let values = match value {
                    Value::Array(items) => items
                        .iter()
                        .map(|item| self.typed_value(column, item))
                        .collect::<Result<Vec<_>, _>>()?,
                    single => vec![self.typed_value(column, single)?],
                };
                column.is_in(values)
            }
            Operator::Eq => column.eq(self.typed_value(column, value)?),
            Operator::Ne => column.ne(self.typed_value(column, value)?),
            Operator::Gt => column.gt(self.typed_value(column, value)?),
            Operator::Gte => column.gte(self.typed_value(column, value)?),
            Operator::Lt => column.lt(self.typed_value(column, value)?),
            Operator::Lte => column.lte(self.typed_value(column, value)?),
        })
    }

    fn condition(&self, scope: &QueryScope) -> Result<Condition, DbErr> {
        scope
            .criteria()
            .iter()
            .try_fold(Condition::all(), |condition, criterion| {
                Ok(condition.add(self.expression(criterion)?))
            })
    }

    fn select(&self, scope: &QueryScope) -> Result<Select<E>, DbErr> {
        let mut select = E::find().filter(self.condition(scope)?);
        for (column, direction) in scope.orders() {
            let order = match direction {
                Direction::Asc => Order::Asc,
                Direction::Desc => Order::Desc,
            };
            select = select.order_by(self.column(column)?, order);
        }
        if let Some(limit) = scope.limit_value() {
            select = select.limit(limit);
        }
        Ok(select)
    }

    fn primary_key_condition(&self, id: &Value) -> Result<Condition, DbErr> {
        let keys: Vec<E::Column> = E::PrimaryKey::iter().map(|key| key.into_column()).collect();
        let parts: Vec<&Value> = match id {
            Value::Array(parts) if keys.len() > 1 => parts.iter().collect(),
            single => vec![single],
        };
        if parts.len() != keys.len() {
            return Err(DbErr::Custom(format!(
                "{} expects {} primary key value(s), got {}",
                self.name,
                keys.len(),
                parts.len()
            )));
        }

        keys.into_iter()
            .zip(parts)
            .try_fold(Condition::all(), |condition, (column, part)| {
                Ok(condition.add(column.eq(self.typed_value(column, part)?)))
            })
    }
}

#[async_trait]
impl<E> ModelStore for SeaOrmStore<E>
where
    E: EntityTrait,
    E::Model: Serialize + DeserializeOwned + IntoActiveModel<E::ActiveModel> + Send + Sync,
    E::ActiveModel: ActiveModelBehavior + TryIntoModel<E::Model> + Send + Sync,
{
    type Record = E::Model;
    type Error = DbErr;

    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, scope: &QueryScope) -> Result<Vec<E::Model>, DbErr> {
        trace!("SELECT {} [{}]", self.name, scope);
        self.select(scope)?.all(self.connection()).await
    }

    async fn paginate(
        &self,
        scope: &QueryScope,
        per_page: u64,
        page: u64,
    ) -> Result<PaginatedResult<E::Model>, DbErr> {
        let per_page = per_page.max(1);
        let page = page.max(1);
        trace!("PAGINATE {} [{}] per_page={} page={}", self.name, scope, per_page, page);

        let paginator = self.select(scope)?.paginate(self.connection(), per_page);
        let total_count = paginator.num_items().await?;
        let items = paginator.fetch_page(page - 1).await?;
        Ok(PaginatedResult::new(items, page, per_page, total_count))
    }

    async fn find(&self, id: &Value) -> Result<Option<E::Model>, DbErr> {
        if id.is_null() {
            return Ok(None);
        }
        trace!("FIND {} id={}", self.name, id);
        E::find()
            .filter(self.primary_key_condition(id)?)
            .one(self.connection())
            .await
    }

    async fn first(&self, scope: &QueryScope) -> Result<Option<E::Model>, DbErr> {
        trace!("FIRST {} [{}]", self.name, scope);
        self.select(scope)?.one(self.connection()).await
    }

    async fn create(&self, fields: &Fields) -> Result<E::Model, DbErr> {
        trace!("INSERT {} fields={}", self.name, fields.len());
        self.active_model(fields)?.insert(self.connection()).await
    }

    async fn update(&self, scope: &QueryScope, fields: &Fields) -> Result<u64, DbErr> {
        if fields.is_empty() {
            return Ok(0);
        }
        trace!("UPDATE {} [{}] fields={}", self.name, scope, fields.len());
        let result = E::update_many()
            .set(self.active_model(fields)?)
            .filter(self.condition(scope)?)
            .exec(self.connection())
            .await?;
        Ok(result.rows_affected)
    }

    async fn update_or_create(&self, matching: &Fields, values: &Fields) -> Result<E::Model, DbErr> {
        let lookup = QueryScope::new().where_fields(matching);
        let existing = self.select(&lookup)?.one(self.connection()).await?;

        match existing {
            Some(model) if values.is_empty() => Ok(model),
            Some(model) => {
                trace!("UPDATE-OR-CREATE {} [{}] -> update", self.name, lookup);
                let changes = self.active_model(values)?;
                let mut active = model.into_active_model();
                for column in E::Column::iter() {
                    if let ActiveValue::Set(value) = changes.get(column) {
                        active.set(column, value);
                    }
                }
                active.update(self.connection()).await
            }
            None => {
                trace!("UPDATE-OR-CREATE {} [{}] -> insert", self.name, lookup);
                let mut merged = matching.clone();
                merged.extend(values.clone());
                self.active_model(&merged)?.insert(self.connection()).await
            }
        }
    }

    async fn delete(&self, scope: &QueryScope) -> Result<u64, DbErr> {
        trace!("DELETE {} [{}]", self.name, scope);
        let result = E::delete_many()
            .filter(self.condition(scope)?)
            .exec(self.connection())
            .await?;
        Ok(result.rows_affected)
    }
}

/// Alternate reading of a scalar: numeric or boolean text as the value it
/// spells, numbers and booleans as text
fn reinterpret(value: &Value) -> Option<Value> {
    match value {
        Value::String(text) => {
            let text = text.trim();
            if let Ok(int) = text.parse::<i64>() {
                Some(Value::from(int))
            } else if let Ok(uint) = text.parse::<u64>() {
                Some(Value::from(uint))
            } else if let Ok(flag) = text.parse::<bool>() {
                Some(Value::Bool(flag))
            } else {
                text.parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
            }
        }
        Value::Number(number) => Some(Value::String(number.to_string())),
        Value::Bool(flag) => Some(Value::String(flag.to_string())),
        _ => None,
    }
}
