//! Storage engine
//!
//! Owns the schema registry and table/row maps, the WAL, and the snapshot
//! threshold. All public operations serialize under one engine-wide lock.

mod snapshot;
mod wal;

pub use snapshot::Snapshot;
pub use wal::{WalOp, WalRecord};

use crate::error::{DbError, Result};
use crate::types::{validate_row_against_schema, Row, Schema};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

struct State {
    schemas: BTreeMap<String, Schema>,
    tables: BTreeMap<String, BTreeMap<String, Row>>,
    mutations_since_snapshot: u64,
}

pub struct StorageEngine {
    data_dir: PathBuf,
    wal: wal::Wal,
    snapshot_interval: u64,
    state: Mutex<State>,
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl StorageEngine {
    /// Open the engine at `data_dir`, loading the snapshot (if any) and
    /// replaying every WAL record on top of it. The WAL is never truncated
    /// here: a crash between replay and the next snapshot must still see
    /// the same records replayed again.
    pub fn open(data_dir: impl Into<PathBuf>, wal_dir: impl Into<PathBuf>, snapshot_interval: u64) -> Result<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        let wal = wal::Wal::open(wal_dir)?;

        let mut schemas = BTreeMap::new();
        let mut tables: BTreeMap<String, BTreeMap<String, Row>> = BTreeMap::new();

        if let Some(snap) = snapshot::load(&data_dir)? {
            log::info!("loaded snapshot from {:?}", snapshot::snapshot_path(&data_dir));
            schemas = snap.schemas;
            tables = snap.tables;
        }

        let mut replayed = 0u64;
        for record in wal.read_all()? {
            replayed += 1;
            match record.op {
                WalOp::Put { table, key, row } => {
                    tables.entry(table).or_default().insert(key, row);
                }
                WalOp::Delete { table, key } => {
                    if let Some(t) = tables.get_mut(&table) {
                        t.remove(&key);
                    }
                }
                WalOp::CreateTable { table, schema } => {
                    schemas.insert(table.clone(), schema);
                    tables.entry(table).or_default();
                }
                WalOp::DropTable { table } => {
                    schemas.remove(&table);
                    tables.remove(&table);
                }
            }
        }
        if replayed > 0 {
            log::info!("replayed {} WAL records during recovery", replayed);
        }

        Ok(Self {
            data_dir,
            wal,
            snapshot_interval,
            state: Mutex::new(State {
                schemas,
                tables,
                mutations_since_snapshot: 0,
            }),
        })
    }

    /// Append `op` to the WAL. Callers apply the in-memory mutation
    /// afterward and then call [`StorageEngine::maybe_snapshot`] so a
    /// threshold-crossing snapshot always reflects the triggering mutation.
    fn record_mutation(&self, state: &mut State, op: WalOp) -> Result<()> {
        self.wal.append(&WalRecord {
            timestamp: now_unix(),
            op,
        })?;
        state.mutations_since_snapshot += 1;
        Ok(())
    }

    /// Snapshot and truncate the WAL if the mutation count has crossed the
    /// threshold. Must be called after the in-memory state already reflects
    /// the mutation that was just recorded.
    fn maybe_snapshot(&self, state: &mut State) -> Result<()> {
        if state.mutations_since_snapshot >= self.snapshot_interval {
            self.write_snapshot_locked(state)?;
        }
        Ok(())
    }

    fn write_snapshot_locked(&self, state: &mut State) -> Result<()> {
        let snap = Snapshot {
            tables: state.tables.clone(),
            schemas: state.schemas.clone(),
            timestamp: now_unix(),
        };
        snapshot::write(&self.data_dir, &snap)?;
        self.wal.truncate()?;
        state.mutations_since_snapshot = 0;
        Ok(())
    }

    /// Force an immediate snapshot regardless of the mutation counter.
    pub fn snapshot(&self) -> Result<()> {
        let mut state = self.state.lock().expect("storage mutex poisoned");
        self.write_snapshot_locked(&mut state)
    }

    pub fn create_table(&self, table: &str, schema: Schema) -> Result<()> {
        let mut state = self.state.lock().expect("storage mutex poisoned");
        if state.schemas.contains_key(table) {
            return Err(DbError::table_exists(table));
        }
        self.record_mutation(
            &mut state,
            WalOp::CreateTable {
                table: table.to_string(),
                schema: schema.clone(),
            },
        )?;
        state.schemas.insert(table.to_string(), schema);
        state.tables.entry(table.to_string()).or_default();
        self.maybe_snapshot(&mut state)
    }

    pub fn drop_table(&self, table: &str) -> Result<()> {
        let mut state = self.state.lock().expect("storage mutex poisoned");
        if !state.schemas.contains_key(table) {
            return Err(DbError::no_such_table(table));
        }
        self.record_mutation(
            &mut state,
            WalOp::DropTable {
                table: table.to_string(),
            },
        )?;
        state.schemas.remove(table);
        state.tables.remove(table);
        self.maybe_snapshot(&mut state)
    }

    pub fn put(&self, table: &str, key: &str, row: Row) -> Result<()> {
        let mut state = self.state.lock().expect("storage mutex poisoned");
        let schema = state
            .schemas
            .get(table)
            .cloned()
            .ok_or_else(|| DbError::no_such_table(table))?;
        validate_row_against_schema(table, &schema, &row)?;
        self.record_mutation(
            &mut state,
            WalOp::Put {
                table: table.to_string(),
                key: key.to_string(),
                row: row.clone(),
            },
        )?;
        state
            .tables
            .entry(table.to_string())
            .or_default()
            .insert(key.to_string(), row);
        self.maybe_snapshot(&mut state)
    }

    pub fn get(&self, table: &str, key: &str) -> Option<Row> {
        let state = self.state.lock().expect("storage mutex poisoned");
        state.tables.get(table).and_then(|t| t.get(key)).cloned()
    }

    /// Remove a row if present; returns whether it was removed.
    pub fn delete(&self, table: &str, key: &str) -> Result<bool> {
        let mut state = self.state.lock().expect("storage mutex poisoned");
        let existed = state.tables.get(table).map(|t| t.contains_key(key)).unwrap_or(false);
        if existed {
            self.record_mutation(
                &mut state,
                WalOp::Delete {
                    table: table.to_string(),
                    key: key.to_string(),
                },
            )?;
            state.tables.get_mut(table).unwrap().remove(key);
            self.maybe_snapshot(&mut state)?;
        }
        Ok(existed)
    }

    /// All (key, row) pairs of a table; empty if the table does not exist.
    pub fn scan(&self, table: &str) -> Vec<(String, Row)> {
        let state = self.state.lock().expect("storage mutex poisoned");
        state
            .tables
            .get(table)
            .map(|t| t.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    }

    pub fn table_exists(&self, table: &str) -> bool {
        let state = self.state.lock().expect("storage mutex poisoned");
        state.schemas.contains_key(table)
    }

    pub fn schema(&self, table: &str) -> Option<Schema> {
        let state = self.state.lock().expect("storage mutex poisoned");
        state.schemas.get(table).cloned()
    }

    /// Flush a final snapshot and stop accepting new writes. Callers must
    /// not reuse the engine after this returns.
    pub fn close(&self) -> Result<()> {
        self.snapshot()
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;
    use tempfile::tempdir;

    fn schema() -> Schema {
        let mut s = Schema::new();
        s.insert("id".to_string(), "INTEGER".to_string());
        s.insert("name".to_string(), "TEXT".to_string());
        s
    }

    fn row(id: i64, name: &str) -> Row {
        let mut r = Row::new();
        r.insert("id".to_string(), Value::Integer(id));
        r.insert("name".to_string(), Value::String(name.to_string()));
        r
    }

    #[test]
    fn create_put_get_round_trips() {
        let dir = tempdir().unwrap();
        let engine = StorageEngine::open(dir.path().join("data"), dir.path().join("wal"), 1000).unwrap();
        engine.create_table("users", schema()).unwrap();
        engine.put("users", "k1", row(1, "Alice")).unwrap();
        assert_eq!(engine.get("users", "k1"), Some(row(1, "Alice")));
    }

    #[test]
    fn put_rejects_unknown_column() {
        let dir = tempdir().unwrap();
        let engine = StorageEngine::open(dir.path().join("data"), dir.path().join("wal"), 1000).unwrap();
        engine.create_table("users", schema()).unwrap();
        let mut bad_row = row(1, "Alice");
        bad_row.insert("age".to_string(), Value::Integer(30));
        assert!(engine.put("users", "k1", bad_row).is_err());
    }

    #[test]
    fn recovers_from_wal_without_snapshot() {
        let dir = tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let wal_dir = dir.path().join("wal");
        {
            let engine = StorageEngine::open(&data_dir, &wal_dir, 1000).unwrap();
            engine.create_table("users", schema()).unwrap();
            engine.put("users", "k1", row(1, "Alice")).unwrap();
            engine.put("users", "k2", row(2, "Bob")).unwrap();
        }
        let engine = StorageEngine::open(&data_dir, &wal_dir, 1000).unwrap();
        assert_eq!(engine.get("users", "k1"), Some(row(1, "Alice")));
        assert_eq!(engine.get("users", "k2"), Some(row(2, "Bob")));
    }

    #[test]
    fn recovers_from_snapshot_plus_empty_wal() {
        let dir = tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let wal_dir = dir.path().join("wal");
        {
            let engine = StorageEngine::open(&data_dir, &wal_dir, 1000).unwrap();
            engine.create_table("users", schema()).unwrap();
            engine.put("users", "k1", row(1, "Alice")).unwrap();
            engine.put("users", "k2", row(2, "Bob")).unwrap();
            engine.snapshot().unwrap();
        }
        let engine = StorageEngine::open(&data_dir, &wal_dir, 1000).unwrap();
        assert_eq!(engine.get("users", "k1"), Some(row(1, "Alice")));
        assert_eq!(engine.get("users", "k2"), Some(row(2, "Bob")));
        assert!(engine.wal.read_all().unwrap().is_empty());
    }

    #[test]
    fn automatic_snapshot_on_threshold() {
        let dir = tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let wal_dir = dir.path().join("wal");
        let engine = StorageEngine::open(&data_dir, &wal_dir, 2).unwrap();
        engine.create_table("users", schema()).unwrap(); // mutation 1
        engine.put("users", "k1", row(1, "Alice")).unwrap(); // mutation 2 -> snapshot
        assert!(snapshot::snapshot_path(&data_dir).exists());
        assert!(engine.wal.read_all().unwrap().is_empty());
    }

    #[test]
    fn threshold_crossing_snapshot_includes_triggering_mutation() {
        let dir = tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let wal_dir = dir.path().join("wal");
        {
            let engine = StorageEngine::open(&data_dir, &wal_dir, 2).unwrap();
            engine.create_table("users", schema()).unwrap(); // mutation 1
            engine.put("users", "k1", row(1, "Alice")).unwrap(); // mutation 2 -> snapshot
        }
        // The snapshot taken on crossing the threshold must already contain
        // the row from the mutation that triggered it, and the WAL must be
        // empty (not re-containing a record the snapshot also has).
        let engine = StorageEngine::open(&data_dir, &wal_dir, 2).unwrap();
        assert_eq!(engine.get("users", "k1"), Some(row(1, "Alice")));
    }

    #[test]
    fn deleted_row_does_not_resurrect_after_threshold_snapshot() {
        let dir = tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let wal_dir = dir.path().join("wal");
        {
            let engine = StorageEngine::open(&data_dir, &wal_dir, 3).unwrap();
            engine.create_table("users", schema()).unwrap(); // mutation 1
            engine.put("users", "k1", row(1, "Alice")).unwrap(); // mutation 2
            engine.delete("users", "k1").unwrap(); // mutation 3 -> snapshot
        }
        let engine = StorageEngine::open(&data_dir, &wal_dir, 3).unwrap();
        assert_eq!(engine.get("users", "k1"), None);
    }

    #[test]
    fn drop_table_removes_rows_and_schema() {
        let dir = tempdir().unwrap();
        let engine = StorageEngine::open(dir.path().join("data"), dir.path().join("wal"), 1000).unwrap();
        engine.create_table("users", schema()).unwrap();
        engine.put("users", "k1", row(1, "Alice")).unwrap();
        engine.drop_table("users").unwrap();
        assert!(!engine.table_exists("users"));
        assert!(engine.scan("users").is_empty());
    }
}
