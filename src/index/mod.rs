//! Secondary indexes and the per-table index registry
//!
//! Indexes keep a derived view of a table's rows and are maintained
//! incrementally by the executor as rows are inserted, updated, and deleted.

mod hash;
mod ordered;

pub use hash::HashIndex;
pub use ordered::OrderedIndex;

use crate::error::{DbError, Result};
use crate::types::{Row, Value};
use std::collections::{BTreeMap, HashSet};

/// The two supported secondary index flavors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Hash,
    Btree,
}

/// Common behavior shared by every index implementation.
pub trait Index: Send + Sync {
    fn columns(&self) -> &[String];

    /// Index `row` under `key`. A row missing every indexed column is dropped
    /// rather than indexed.
    fn insert(&mut self, key: &str, row: &Row);

    /// Remove `key` from wherever `row` would have placed it.
    fn remove(&mut self, key: &str, row: &Row);

    /// Equality lookup: `conditions` must bind every indexed column for a
    /// hash index to match; returns the empty set on any mismatch.
    fn lookup(&self, conditions: &BTreeMap<String, Value>) -> HashSet<String>;

    /// Inclusive range scan `[lo, hi]`, either bound optional. Only ordered
    /// indexes support this.
    fn range_scan(&self, lo: Option<&Value>, hi: Option<&Value>) -> Result<HashSet<String>>;
}

struct NamedIndex {
    index: Box<dyn Index>,
    kind: IndexKind,
}

/// Per-table registry of named secondary indexes.
#[derive(Default)]
pub struct IndexManager {
    // table -> (insertion-ordered) index name -> index
    tables: BTreeMap<String, Vec<(String, NamedIndex)>>,
}

impl IndexManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new, empty index. The caller is responsible for
    /// back-filling it from existing rows.
    pub fn create_index(
        &mut self,
        table: &str,
        name: &str,
        columns: Vec<String>,
        kind: IndexKind,
    ) -> Result<()> {
        let entries = self.tables.entry(table.to_string()).or_default();
        if entries.iter().any(|(n, _)| n == name) {
            return Err(DbError::index_exists(table, name));
        }

        let index: Box<dyn Index> = match kind {
            IndexKind::Hash => Box::new(HashIndex::new(columns)),
            IndexKind::Btree => {
                if columns.len() != 1 {
                    return Err(DbError::IndexKindInvalid(format!(
                        "ordered index '{}' on table '{}' must have exactly one column",
                        name, table
                    )));
                }
                Box::new(OrderedIndex::new(columns))
            }
        };

        entries.push((name.to_string(), NamedIndex { index, kind }));
        log::info!("created index '{}' on table '{}'", name, table);
        Ok(())
    }

    /// Remove a named index. No-op if absent.
    pub fn drop_index(&mut self, table: &str, name: &str) {
        if let Some(entries) = self.tables.get_mut(table) {
            entries.retain(|(n, _)| n != name);
        }
    }

    /// Drop every index registered on a table (used when the table itself is dropped).
    pub fn drop_table_indexes(&mut self, table: &str) {
        self.tables.remove(table);
    }

    pub fn insert_row(&mut self, table: &str, key: &str, row: &Row) {
        if let Some(entries) = self.tables.get_mut(table) {
            for (_, named) in entries.iter_mut() {
                named.index.insert(key, row);
            }
        }
    }

    pub fn delete_row(&mut self, table: &str, key: &str, row: &Row) {
        if let Some(entries) = self.tables.get_mut(table) {
            for (_, named) in entries.iter_mut() {
                named.index.remove(key, row);
            }
        }
    }

    /// Score every index on `table` by the count of its columns present in
    /// `conditions`; return the highest-scoring index with score >= 1,
    /// breaking ties by insertion (first-registered) order.
    pub fn find_best_index(
        &self,
        table: &str,
        conditions: &BTreeMap<String, Value>,
    ) -> Option<(&str, &dyn Index)> {
        let entries = self.tables.get(table)?;
        let mut best: Option<(usize, &str, &dyn Index)> = None;
        for (name, named) in entries.iter() {
            let score = named
                .index
                .columns()
                .iter()
                .filter(|c| conditions.contains_key(*c))
                .count();
            if score == 0 {
                continue;
            }
            if best.as_ref().map(|(s, ..)| score > *s).unwrap_or(true) {
                best = Some((score, name.as_str(), named.index.as_ref()));
            }
        }
        best.map(|(_, name, index)| (name, index))
    }

    /// Insert every given (key, row) pair into exactly the named index.
    /// Used to back-fill a freshly created index from a table's existing rows.
    pub fn backfill(&mut self, table: &str, name: &str, rows: &[(String, Row)]) {
        if let Some(entries) = self.tables.get_mut(table) {
            if let Some((_, named)) = entries.iter_mut().find(|(n, _)| n == name) {
                for (key, row) in rows {
                    named.index.insert(key, row);
                }
            }
        }
    }

    /// Look up an index by name (used for range scans, which need the
    /// caller to have asserted an ordered index was requested).
    pub fn get_index(&self, table: &str, name: &str) -> Option<(&dyn Index, IndexKind)> {
        let entries = self.tables.get(table)?;
        entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, named)| (named.index.as_ref(), named.kind))
    }
}
