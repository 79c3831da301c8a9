//! Running operation counters.

use std::time::Duration;

/// Counters accumulated by the engine.
///
/// All counters are plain fields mutated from the single engine thread;
/// no atomicity is guaranteed across them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Insert operations that reached a leaf.
    pub inserts: u64,
    /// Search operations that reached a leaf.
    pub searches: u64,
    /// Delete operations (present for parity; never bumped).
    pub deletes: u64,
    /// One-sided reads issued.
    pub remote_reads: u64,
    /// One-sided writes issued.
    pub remote_writes: u64,
    /// Sum of per-operation completion latencies.
    pub total_latency: Duration,
    /// Operations fully completed.
    pub ops_completed: u64,
}

impl EngineStats {
    /// Mean latency over completed operations.
    pub fn mean_latency(&self) -> Duration {
        if self.ops_completed == 0 {
            Duration::ZERO
        } else {
            self.total_latency / self.ops_completed as u32
        }
    }
}

impl std::fmt::Display for EngineStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "operations completed: {}", self.ops_completed)?;
        writeln!(
            f,
            "  inserts: {}, searches: {}, deletes: {}",
            self.inserts, self.searches, self.deletes
        )?;
        writeln!(
            f,
            "  remote reads: {}, remote writes: {}",
            self.remote_reads, self.remote_writes
        )?;
        write!(f, "  mean latency: {:?}", self.mean_latency())
    }
}
