use super::Index;
use crate::error::{DbError, Result};
use crate::types::{Row, Value};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Maps the tuple formed from the indexed columns to the set of row keys
/// whose row produces that tuple. Equality lookup only.
pub struct HashIndex {
    columns: Vec<String>,
    buckets: HashMap<Vec<Value>, HashSet<String>>,
}

impl HashIndex {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            buckets: HashMap::new(),
        }
    }

    /// Derive the tuple key for `row`. A missing column is represented by an
    /// explicit `Value::Null` in its tuple position. Returns `None` when
    /// every position would be null (an all-null key carries no selectivity
    /// and is not indexed).
    fn tuple_key(&self, row: &Row) -> Option<Vec<Value>> {
        let tuple: Vec<Value> = self
            .columns
            .iter()
            .map(|c| row.get(c).cloned().unwrap_or(Value::Null))
            .collect();
        if tuple.iter().all(Value::is_null) {
            None
        } else {
            Some(tuple)
        }
    }

    fn tuple_key_from_conditions(&self, conditions: &BTreeMap<String, Value>) -> Vec<Value> {
        self.columns
            .iter()
            .map(|c| conditions.get(c).cloned().unwrap_or(Value::Null))
            .collect()
    }
}

impl Index for HashIndex {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn insert(&mut self, key: &str, row: &Row) {
        if let Some(tuple) = self.tuple_key(row) {
            self.buckets.entry(tuple).or_default().insert(key.to_string());
        }
    }

    fn remove(&mut self, key: &str, row: &Row) {
        if let Some(tuple) = self.tuple_key(row) {
            if let Some(bucket) = self.buckets.get_mut(&tuple) {
                bucket.remove(key);
                if bucket.is_empty() {
                    self.buckets.remove(&tuple);
                }
            }
        }
    }

    fn lookup(&self, conditions: &BTreeMap<String, Value>) -> HashSet<String> {
        let tuple = self.tuple_key_from_conditions(conditions);
        self.buckets.get(&tuple).cloned().unwrap_or_default()
    }

    fn range_scan(&self, _lo: Option<&Value>, _hi: Option<&Value>) -> Result<HashSet<String>> {
        Err(DbError::RangeNotSupported(
            "range scan is not supported on a hash index".to_string(),
        ))
    }
}
