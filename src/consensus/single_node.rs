use super::{LogEntry, Role};
use crate::error::{DbError, Result};
use crate::executor::QueryResult;
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

type ApplyCallback = dyn Fn(&str) -> QueryResult + Send + Sync;

struct State {
    role: Role,
    current_term: u64,
    voted_for: Option<String>,
    log: Vec<LogEntry>,
    commit_index: u64,
    last_applied: u64,
}

/// Single-node auto-commit consensus log.
///
/// Runs a real election timer for contract fidelity, but since there are no
/// peers the node always wins: the timer fires once, flips the role to
/// leader, and every subsequent `append` commits inline.
pub struct SingleNodeConsensus {
    node_id: String,
    state: Mutex<State>,
    apply_callback: Mutex<Option<Arc<ApplyCallback>>>,
    shutdown: Arc<AtomicBool>,
}

impl SingleNodeConsensus {
    pub fn new(node_id: impl Into<String>, election_timeout_min: Duration, election_timeout_max: Duration) -> Arc<Self> {
        let consensus = Arc::new(Self {
            node_id: node_id.into(),
            state: Mutex::new(State {
                role: Role::Follower,
                current_term: 0,
                voted_for: None,
                log: Vec::new(),
                commit_index: 0,
                last_applied: 0,
            }),
            apply_callback: Mutex::new(None),
            shutdown: Arc::new(AtomicBool::new(false)),
        });

        let worker = Arc::clone(&consensus);
        let min = election_timeout_min;
        let max = election_timeout_max.max(min);
        thread::spawn(move || {
            let jitter = if max > min {
                let extra = rand::thread_rng().gen_range(0..=(max - min).as_millis() as u64);
                min + Duration::from_millis(extra)
            } else {
                min
            };
            thread::sleep(jitter);
            if !worker.shutdown.load(Ordering::SeqCst) {
                worker.become_leader();
            }
        });

        consensus
    }

    fn become_leader(&self) {
        let mut state = self.state.lock().expect("consensus mutex poisoned");
        if state.role == Role::Leader {
            return;
        }
        state.role = Role::Leader;
        state.current_term += 1;
        state.voted_for = Some(self.node_id.clone());
        log::info!(
            "node '{}' became leader for term {} (lone node, no peers to contact)",
            self.node_id,
            state.current_term
        );
    }

    /// Block (with a generous bound) until this node has won its first
    /// election. Single-node elections always succeed; this just lets
    /// callers avoid racing the startup timer.
    pub fn await_leadership(&self, timeout: Duration) {
        let deadline = std::time::Instant::now() + timeout;
        loop {
            if self.is_leader() {
                return;
            }
            if std::time::Instant::now() >= deadline {
                log::warn!("node '{}' did not reach leadership within {:?}", self.node_id, timeout);
                return;
            }
            thread::sleep(Duration::from_millis(2));
        }
    }

    pub fn is_leader(&self) -> bool {
        self.state.lock().expect("consensus mutex poisoned").role == Role::Leader
    }

    pub fn set_apply_callback<F>(&self, callback: F)
    where
        F: Fn(&str) -> QueryResult + Send + Sync + 'static,
    {
        *self.apply_callback.lock().expect("apply callback mutex poisoned") = Some(Arc::new(callback));
    }

    /// Submit `command` to the log. Refused on a non-leader. On success,
    /// the entry is committed inline (no peers to wait on) and the apply
    /// callback is invoked exactly once, synchronously, before this returns.
    pub fn replicate_write(&self, command: &str) -> Result<QueryResult> {
        let entry_and_term = {
            let mut state = self.state.lock().expect("consensus mutex poisoned");
            if state.role != Role::Leader {
                return Err(DbError::NotLeader(format!(
                    "node '{}' is not the leader",
                    self.node_id
                )));
            }
            let index = state.log.len() as u64 + 1;
            let term = state.current_term;
            state.log.push(LogEntry {
                term,
                index,
                command: command.to_string(),
            });
            state.commit_index = index;
            index
        };

        let callback = self
            .apply_callback
            .lock()
            .expect("apply callback mutex poisoned")
            .clone()
            .ok_or_else(|| DbError::ReplicationFailed("no apply callback installed".to_string()))?;

        let result = callback(command);

        let mut state = self.state.lock().expect("consensus mutex poisoned");
        state.last_applied = entry_and_term;
        Ok(result)
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Cancel the pending election timer. Idempotent.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }
}
