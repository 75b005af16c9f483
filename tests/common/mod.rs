//! Shared fixtures for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;

use repository_pattern::repositories::{Fields, ModelStore, PaginatedResult, QueryScope};

/// Store operation observed by [`RecordingStore`]
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    Get(QueryScope),
    Paginate {
        scope: QueryScope,
        per_page: u64,
        page: u64,
    },
    Find(Value),
    First(QueryScope),
    Create(Fields),
    Update {
        scope: QueryScope,
        fields: Fields,
    },
    UpdateOrCreate {
        matching: Fields,
        values: Fields,
    },
    Delete(QueryScope),
}

#[derive(Debug, thiserror::Error)]
#[error("store failure: {0}")]
pub struct StoreFailure(pub String);

/// Store that records every call and answers with canned rows
#[derive(Default)]
pub struct RecordingStore {
    calls: Mutex<Vec<StoreCall>>,
    rows: Vec<Value>,
    failure: Option<String>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<Value>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    /// Store whose every operation fails with `message`
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_call(&self) -> Option<StoreCall> {
        self.calls.lock().unwrap().last().cloned()
    }

    fn record(&self, call: StoreCall) -> Result<(), StoreFailure> {
        self.calls.lock().unwrap().push(call);
        match &self.failure {
            Some(message) => Err(StoreFailure(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ModelStore for RecordingStore {
    type Record = Value;
    type Error = StoreFailure;

    fn name(&self) -> &str {
        "recording"
    }

    async fn get(&self, scope: &QueryScope) -> Result<Vec<Value>, StoreFailure> {
        self.record(StoreCall::Get(scope.clone()))?;
        Ok(self.rows.clone())
    }

    async fn paginate(
        &self,
        scope: &QueryScope,
        per_page: u64,
        page: u64,
    ) -> Result<PaginatedResult<Value>, StoreFailure> {
        self.record(StoreCall::Paginate {
            scope: scope.clone(),
            per_page,
            page,
        })?;
        let items = self
            .rows
            .iter()
            .skip(((page.max(1) - 1) * per_page) as usize)
            .take(per_page as usize)
            .cloned()
            .collect();
        Ok(PaginatedResult::new(items, page, per_page, self.rows.len() as u64))
    }

    async fn find(&self, id: &Value) -> Result<Option<Value>, StoreFailure> {
        self.record(StoreCall::Find(id.clone()))?;
        Ok(self.rows.iter().find(|row| row.get("id") == Some(id)).cloned())
    }

    async fn first(&self, scope: &QueryScope) -> Result<Option<Value>, StoreFailure> {
        self.record(StoreCall::First(scope.clone()))?;
        Ok(self.rows.first().cloned())
    }

    async fn create(&self, fields: &Fields) -> Result<Value, StoreFailure> {
        self.record(StoreCall::Create(fields.clone()))?;
        Ok(Value::Object(fields.clone()))
    }

    async fn update(&self, scope: &QueryScope, fields: &Fields) -> Result<u64, StoreFailure> {
        self.record(StoreCall::Update {
            scope: scope.clone(),
            fields: fields.clone(),
        })?;
        Ok(1)
    }

    async fn update_or_create(&self, matching: &Fields, values: &Fields) -> Result<Value, StoreFailure> {
        self.record(StoreCall::UpdateOrCreate {
            matching: matching.clone(),
            values: values.clone(),
        })?;
        let mut merged = matching.clone();
        merged.extend(values.clone());
        Ok(Value::Object(merged))
    }

    async fn delete(&self, scope: &QueryScope) -> Result<u64, StoreFailure> {
        self.record(StoreCall::Delete(scope.clone()))?;
        Ok(self.rows.len() as u64)
    }
}

/// Build a [`Fields`] mapping from a JSON object literal
pub fn fields(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

pub mod article {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, Default, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "articles")]
    #[serde(default)]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub title: String,
        pub status: String,
        pub views: i32,
        pub author: Option<String>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}
