//! Replicated log / consensus state machine
//!
//! A leader-elected log that gates writes behind leadership. The only
//! implementation built here is [`single_node::SingleNodeConsensus`]: it runs
//! the same election/heartbeat timing machinery a multi-node Raft would, but
//! with no peers to contact, so a lone node always wins its first election.
//! The goal is contract fidelity — a future multi-node implementation can
//! replace this module without changing any caller.

pub mod single_node;

pub use single_node::SingleNodeConsensus;

/// The three roles a consensus node can occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Follower,
    Candidate,
    Leader,
}

/// One entry of the replicated log.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub term: u64,
    pub index: u64,
    pub command: String,
}
