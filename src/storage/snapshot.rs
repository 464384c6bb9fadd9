//! Full-state snapshots
//!
//! A snapshot is a self-describing dump of every table and schema, written
//! atomically so a crash mid-write never corrupts the canonical file.

use crate::error::Result;
use crate::types::{Row, Schema};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const SNAPSHOT_FILE_NAME: &str = "snapshot.json";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Snapshot {
    pub tables: BTreeMap<String, BTreeMap<String, Row>>,
    pub schemas: BTreeMap<String, Schema>,
    pub timestamp: u64,
}

pub fn snapshot_path(data_dir: &Path) -> PathBuf {
    data_dir.join(SNAPSHOT_FILE_NAME)
}

/// Load the snapshot at `<data_dir>/snapshot.json`, if one exists.
pub fn load(data_dir: &Path) -> Result<Option<Snapshot>> {
    let path = snapshot_path(data_dir);
    if !path.exists() {
        return Ok(None);
    }
    let bytes = fs::read(&path)?;
    let snapshot: Snapshot = serde_json::from_slice(&bytes)?;
    Ok(Some(snapshot))
}

/// Write `snapshot` to a temporary sibling file in `data_dir`, fsync it, then
/// atomically rename it over the canonical snapshot path. The temp file is
/// created in `data_dir` itself (not the system temp dir) so the rename is
/// guaranteed to stay on the same filesystem.
pub fn write(data_dir: &Path, snapshot: &Snapshot) -> Result<()> {
    let final_path = snapshot_path(data_dir);

    let bytes = serde_json::to_vec(snapshot)?;
    let mut tmp = NamedTempFile::new_in(data_dir)?;
    tmp.write_all(&bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(&final_path).map_err(|e| e.error)?;
    log::info!("wrote snapshot to {:?}", final_path);
    Ok(())
}
