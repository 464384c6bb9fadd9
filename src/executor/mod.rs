//! Query executor
//!
//! Interprets a [`Plan`] against the storage engine and index manager. One
//! executor-wide mutex serializes every statement; the storage engine's own
//! lock is never contended internally because each statement acquires the
//! executor lock first (lock order: Executor before Storage, see the crate's
//! concurrency notes).

mod ddl;
mod dml;
mod query;

use crate::error::Result;
use crate::index::IndexManager;
use crate::parser::{Plan, QueryType};
use crate::storage::StorageEngine;
use crate::types::Row;
use serde::Serialize;
use std::sync::{Arc, Mutex};

/// The outward result of executing one statement.
#[derive(Debug, Clone, Serialize, Default)]
pub struct QueryResult {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<Row>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows_affected: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inserted_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_leader: Option<bool>,
}

impl QueryResult {
    pub fn success() -> Self {
        Self {
            status: "success".to_string(),
            ..Default::default()
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn selected(rows: Vec<Row>) -> Self {
        let row_count = rows.len();
        Self {
            status: "success".to_string(),
            rows: Some(rows),
            row_count: Some(row_count),
            ..Default::default()
        }
    }

    pub fn modified(rows_affected: usize) -> Self {
        Self {
            status: "success".to_string(),
            rows_affected: Some(rows_affected),
            ..Default::default()
        }
    }

    pub fn inserted(key: String) -> Self {
        Self {
            status: "success".to_string(),
            inserted_key: Some(key),
            ..Default::default()
        }
    }
}

pub struct Executor {
    storage: Arc<StorageEngine>,
    index_manager: Mutex<IndexManager>,
}

impl Executor {
    pub fn new(storage: Arc<StorageEngine>) -> Self {
        Self {
            storage,
            index_manager: Mutex::new(IndexManager::new()),
        }
    }

    pub fn storage(&self) -> &Arc<StorageEngine> {
        &self.storage
    }

    /// Dispatch on the plan's query type and run it under the executor lock.
    pub fn execute(&self, plan: Plan) -> Result<QueryResult> {
        let mut indexes = self.index_manager.lock().expect("index manager mutex poisoned");
        match plan.query_type {
            QueryType::CreateTable => ddl::create_table(&self.storage, &plan),
            QueryType::DropTable => ddl::drop_table(&self.storage, &mut indexes, &plan),
            QueryType::CreateIndex => ddl::create_index(&self.storage, &mut indexes, &plan),
            QueryType::DropIndex => ddl::drop_index(&mut indexes, &plan),
            QueryType::Insert => dml::insert(&self.storage, &mut indexes, &plan),
            QueryType::Update => dml::update(&self.storage, &mut indexes, &plan),
            QueryType::Delete => dml::delete(&self.storage, &mut indexes, &plan),
            QueryType::Select => query::select(&self.storage, &indexes, &plan),
        }
    }
}
