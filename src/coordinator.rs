//! Node configuration and the composition root that wires the consensus
//! log, executor, index manager, and storage engine together.

use crate::consensus::SingleNodeConsensus;
use crate::error::Result;
use crate::executor::{Executor, QueryResult};
use crate::parser::{Parser, QueryType};
use crate::storage::StorageEngine;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Node configuration, modeled on the configuration this system composes
/// around: identity, networking, replication, and storage tuning.
#[derive(Debug, Clone)]
pub struct Config {
    pub node_id: String,
    pub host: String,
    pub port: u16,
    /// Peer entries in `id@host:port` form. Unused by the single-node
    /// consensus implementation but carried for contract fidelity.
    pub cluster_nodes: Vec<String>,
    pub replication_factor: usize,
    pub data_dir: PathBuf,
    pub wal_dir: PathBuf,
    pub snapshot_interval: u64,
    pub heartbeat_interval_secs: f64,
    pub election_timeout_min_secs: f64,
    pub election_timeout_max_secs: f64,
    pub max_batch_size: usize,
    pub enable_auto_index: bool,
    pub max_index_memory_bytes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            node_id: "node-1".to_string(),
            host: "127.0.0.1".to_string(),
            port: 7878,
            cluster_nodes: Vec::new(),
            replication_factor: 1,
            data_dir: PathBuf::from("./data"),
            wal_dir: PathBuf::from("./data/wal"),
            snapshot_interval: 1000,
            heartbeat_interval_secs: 0.05,
            election_timeout_min_secs: 0.05,
            election_timeout_max_secs: 0.1,
            max_batch_size: 100,
            enable_auto_index: false,
            max_index_memory_bytes: 64 * 1024 * 1024,
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Read `DISTDB_*` environment variables, falling back to
    /// [`Config::default`] for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let cluster_nodes = std::env::var("DISTDB_CLUSTER_NODES")
            .ok()
            .map(|v| v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
            .unwrap_or_else(|| defaults.cluster_nodes.clone());
        let node_id = std::env::var("DISTDB_NODE_ID").unwrap_or_else(|_| defaults.node_id.clone());
        let host = std::env::var("DISTDB_HOST").unwrap_or_else(|_| defaults.host.clone());
        let port = env_or("DISTDB_PORT", defaults.port);
        let replication_factor = env_or("DISTDB_REPLICATION_FACTOR", defaults.replication_factor);
        let data_dir = std::env::var("DISTDB_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| defaults.data_dir.clone());
        let wal_dir = std::env::var("DISTDB_WAL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| defaults.wal_dir.clone());

        Self {
            node_id,
            host,
            port,
            cluster_nodes,
            replication_factor,
            data_dir,
            wal_dir,
            ..defaults
        }
    }
}

fn is_write(query_type: QueryType) -> bool {
    !matches!(query_type, QueryType::Select)
}

/// Composes the consensus log, executor, and storage engine behind a single
/// entry point. Writes are gated on leadership and go through the
/// consensus log; reads bypass it and call the executor directly.
pub struct Coordinator {
    config: Config,
    executor: Arc<Executor>,
    consensus: Arc<SingleNodeConsensus>,
}

impl Coordinator {
    pub fn new(config: Config) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;
        let storage = StorageEngine::open(&config.data_dir, &config.wal_dir, config.snapshot_interval)?;
        let executor = Arc::new(Executor::new(Arc::new(storage)));

        let consensus = SingleNodeConsensus::new(
            config.node_id.clone(),
            Duration::from_secs_f64(config.election_timeout_min_secs),
            Duration::from_secs_f64(config.election_timeout_max_secs),
        );

        let callback_executor = Arc::clone(&executor);
        consensus.set_apply_callback(move |sql| match Parser::parse(sql) {
            Ok(plan) => callback_executor.execute(plan).unwrap_or_else(|e| QueryResult::error(e.to_string())),
            Err(e) => QueryResult::error(e.to_string()),
        });

        // A lone node always wins; this just avoids racing the startup timer.
        consensus.await_leadership(Duration::from_secs(5));

        Ok(Self {
            config,
            executor,
            consensus,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_leader(&self) -> bool {
        self.consensus.is_leader()
    }

    /// Parse and execute one SQL statement. Writes are submitted to the
    /// consensus log and applied by its callback — the coordinator never
    /// calls the executor directly for a write, avoiding double execution.
    /// Reads bypass the log and call the executor directly.
    pub fn execute(&self, sql: &str) -> QueryResult {
        let plan = match Parser::parse(sql) {
            Ok(plan) => plan,
            Err(e) => return QueryResult::error(e.to_string()),
        };

        if is_write(plan.query_type) {
            if !self.consensus.is_leader() {
                let mut result = QueryResult::error(format!("node '{}' is not the leader", self.config.node_id));
                result.is_leader = Some(false);
                result.node_id = Some(self.config.node_id.clone());
                return result;
            }
            match self.consensus.replicate_write(sql) {
                Ok(result) => result,
                Err(e) => QueryResult::error(e.to_string()),
            }
        } else {
            match self.executor.execute(plan) {
                Ok(result) => result,
                Err(e) => QueryResult::error(e.to_string()),
            }
        }
    }

    /// Flush a final snapshot and release the underlying consensus timer.
    pub fn shutdown(&self) -> Result<()> {
        self.consensus.shutdown();
        self.executor.storage().close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn coordinator() -> (Coordinator, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let config = Config {
            data_dir: dir.path().join("data"),
            wal_dir: dir.path().join("wal"),
            ..Config::default()
        };
        (Coordinator::new(config).unwrap(), dir)
    }

    #[test]
    fn lone_node_becomes_leader_and_accepts_writes() {
        let (coordinator, _dir) = coordinator();
        assert!(coordinator.is_leader());

        let result = coordinator.execute("CREATE TABLE users (id INTEGER, name TEXT)");
        assert_eq!(result.status, "success");

        let result = coordinator.execute("INSERT INTO users (id, name) VALUES (1, 'Alice')");
        assert_eq!(result.status, "success");
        assert!(result.inserted_key.is_some());

        let result = coordinator.execute("SELECT * FROM users WHERE id = 1");
        assert_eq!(result.row_count, Some(1));
    }

    #[test]
    fn reads_do_not_require_a_separate_write_path() {
        let (coordinator, _dir) = coordinator();
        coordinator.execute("CREATE TABLE t (id INTEGER)");
        let result = coordinator.execute("SELECT * FROM t");
        assert_eq!(result.status, "success");
        assert_eq!(result.row_count, Some(0));
    }
}
