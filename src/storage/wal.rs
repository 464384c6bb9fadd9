//! Write-ahead log
//!
//! Records are framed as a 4-byte big-endian length prefix followed by a
//! `bincode`-encoded [`WalRecord`]. Segments are named `wal_<10-digit
//! zero-padded index>.log` so that lexicographic filename order equals
//! creation order.

use crate::error::{DbError, Result};
use crate::types::{Row, Schema};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const SEGMENT_PREFIX: &str = "wal_";
const SEGMENT_SUFFIX: &str = ".log";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WalOp {
    Put { table: String, key: String, row: Row },
    Delete { table: String, key: String },
    CreateTable { table: String, schema: Schema },
    DropTable { table: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalRecord {
    pub timestamp: u64,
    pub op: WalOp,
}

fn segment_name(index: u64) -> String {
    format!("{}{:010}{}", SEGMENT_PREFIX, index, SEGMENT_SUFFIX)
}

fn segment_path(dir: &Path, index: u64) -> PathBuf {
    dir.join(segment_name(index))
}

/// Enumerate existing segment files in the WAL directory, sorted by filename
/// (equivalently, by creation order).
fn list_segments(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    if !dir.exists() {
        return Ok(paths);
    }
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(SEGMENT_PREFIX) && name.ends_with(SEGMENT_SUFFIX) {
            paths.push(entry.path());
        }
    }
    paths.sort();
    Ok(paths)
}

fn highest_existing_index(dir: &Path) -> Result<u64> {
    let mut max_index = 0u64;
    for path in list_segments(dir)? {
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            let digits = name
                .trim_start_matches(SEGMENT_PREFIX)
                .trim_end_matches(SEGMENT_SUFFIX);
            if let Ok(index) = digits.parse::<u64>() {
                max_index = max_index.max(index);
            }
        }
    }
    Ok(max_index)
}

struct Inner {
    file: File,
    index: u64,
}

/// Append-only durable log of storage mutations.
pub struct Wal {
    dir: PathBuf,
    inner: Mutex<Inner>,
}

impl Wal {
    /// Open (creating if necessary) the WAL directory and its current
    /// segment, continuing from the highest existing segment index.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        let index = highest_existing_index(&dir)?.max(1);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(segment_path(&dir, index))?;
        Ok(Self {
            dir,
            inner: Mutex::new(Inner { file, index }),
        })
    }

    /// Durably append `record`: serialize, write length + payload, flush, fsync.
    pub fn append(&self, record: &WalRecord) -> Result<()> {
        let payload = bincode::serialize(record)?;
        let len = payload.len() as u32;

        let mut inner = self.inner.lock().expect("wal mutex poisoned");
        inner.file.write_all(&len.to_be_bytes())?;
        inner
            .file
            .write_all(&payload)
            .map_err(|e| DbError::DurableWriteFailed(e.to_string()))?;
        inner
            .file
            .flush()
            .map_err(|e| DbError::DurableWriteFailed(e.to_string()))?;
        inner
            .file
            .sync_data()
            .map_err(|e| DbError::DurableWriteFailed(e.to_string()))?;
        Ok(())
    }

    /// Read every record from every segment, in creation order. A truncated
    /// tail (a short read mid-length-prefix or mid-payload) is tolerated and
    /// silently dropped rather than failing recovery.
    pub fn read_all(&self) -> Result<Vec<WalRecord>> {
        let mut records = Vec::new();
        for path in list_segments(&self.dir)? {
            let mut file = File::open(&path)?;
            loop {
                let mut len_buf = [0u8; 4];
                match file.read_exact(&mut len_buf) {
                    Ok(()) => {}
                    Err(_) => break, // EOF or short read mid-prefix: truncated tail
                }
                let len = u32::from_be_bytes(len_buf) as usize;
                let mut payload = vec![0u8; len];
                if file.read_exact(&mut payload).is_err() {
                    break; // truncated tail mid-payload
                }
                match bincode::deserialize::<WalRecord>(&payload) {
                    Ok(record) => records.push(record),
                    Err(_) => break,
                }
            }
        }
        Ok(records)
    }

    /// Remove every existing segment and start fresh at index 1. Callers
    /// invoke this only after a successful snapshot.
    pub fn truncate(&self) -> Result<()> {
        let mut inner = self.inner.lock().expect("wal mutex poisoned");
        for path in list_segments(&self.dir)? {
            fs::remove_file(path)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(segment_path(&self.dir, 1))?;
        inner.file = file;
        inner.index = 1;
        log::info!("truncated WAL directory {:?}", self.dir);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn put(table: &str, key: &str) -> WalRecord {
        WalRecord {
            timestamp: 0,
            op: WalOp::Put {
                table: table.to_string(),
                key: key.to_string(),
                row: Row::new(),
            },
        }
    }

    #[test]
    fn append_and_read_all_round_trips() {
        let dir = tempdir().unwrap();
        let wal = Wal::open(dir.path()).unwrap();
        wal.append(&put("t", "k1")).unwrap();
        wal.append(&put("t", "k2")).unwrap();

        let records = wal.read_all().unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn reopening_continues_from_highest_segment() {
        let dir = tempdir().unwrap();
        {
            let wal = Wal::open(dir.path()).unwrap();
            wal.append(&put("t", "k1")).unwrap();
        }
        let wal = Wal::open(dir.path()).unwrap();
        wal.append(&put("t", "k2")).unwrap();
        assert_eq!(wal.read_all().unwrap().len(), 2);
    }

    #[test]
    fn truncate_removes_segments_and_resets() {
        let dir = tempdir().unwrap();
        let wal = Wal::open(dir.path()).unwrap();
        wal.append(&put("t", "k1")).unwrap();
        wal.truncate().unwrap();
        assert!(wal.read_all().unwrap().is_empty());

        wal.append(&put("t", "k2")).unwrap();
        assert_eq!(wal.read_all().unwrap().len(), 1);
    }

    #[test]
    fn truncated_tail_is_tolerated() {
        let dir = tempdir().unwrap();
        let wal = Wal::open(dir.path()).unwrap();
        wal.append(&put("t", "k1")).unwrap();

        // Corrupt the segment by appending a partial length prefix.
        let path = segment_path(dir.path(), 1);
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(&[0, 0]).unwrap();

        let records = wal.read_all().unwrap();
        assert_eq!(records.len(), 1);
    }
}
