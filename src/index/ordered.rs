use super::Index;
use crate::error::Result;
use crate::types::{Row, Value};
use std::collections::{BTreeMap, HashSet};
use std::ops::Bound;

/// Single-column index maintained in sorted key order. Supports equality
/// lookup and inclusive range scans.
pub struct OrderedIndex {
    columns: Vec<String>,
    entries: BTreeMap<Value, HashSet<String>>,
}

impl OrderedIndex {
    /// `columns` must have exactly one element; the caller ([`super::IndexManager`])
    /// enforces this before construction.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            entries: BTreeMap::new(),
        }
    }

    fn column(&self) -> &str {
        &self.columns[0]
    }
}

impl Index for OrderedIndex {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn insert(&mut self, key: &str, row: &Row) {
        match row.get(self.column()) {
            Some(v) if !v.is_null() => {
                self.entries.entry(v.clone()).or_default().insert(key.to_string());
            }
            _ => {}
        }
    }

    fn remove(&mut self, key: &str, row: &Row) {
        if let Some(v) = row.get(self.column()) {
            if let Some(bucket) = self.entries.get_mut(v) {
                bucket.remove(key);
                if bucket.is_empty() {
                    self.entries.remove(v);
                }
            }
        }
    }

    fn lookup(&self, conditions: &BTreeMap<String, Value>) -> HashSet<String> {
        match conditions.get(self.column()) {
            Some(v) => self.entries.get(v).cloned().unwrap_or_default(),
            None => HashSet::new(),
        }
    }

    fn range_scan(&self, lo: Option<&Value>, hi: Option<&Value>) -> Result<HashSet<String>> {
        let lower = lo.map(|v| Bound::Included(v.clone())).unwrap_or(Bound::Unbounded);
        let upper = hi.map(|v| Bound::Included(v.clone())).unwrap_or(Bound::Unbounded);
        let mut result = HashSet::new();
        for (_, bucket) in self.entries.range((lower, upper)) {
            result.extend(bucket.iter().cloned());
        }
        Ok(result)
    }
}
