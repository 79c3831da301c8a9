//! Workload generation: a schedule of keyed operations for the engine.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::time::Duration;
use tether_common::{KeyDistribution, WorkloadConfig};

/// Kind of generated operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadKind {
    /// Insert `key -> value`.
    Insert,
    /// Search for `key`.
    Search,
}

/// One scheduled operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkloadOp {
    /// Operation kind.
    pub kind: WorkloadKind,
    /// Target key.
    pub key: u64,
    /// Value for inserts; derived as `key * 1000 + node_id`.
    pub value: u64,
    /// Offset from simulation start when the operation becomes due.
    pub scheduled_at: Duration,
}

/// Draws keys and operation kinds from the configured distribution.
///
/// The RNG is seeded from the compute-node id, so distinct nodes draw
/// distinct streams and a given configuration replays identically.
pub struct WorkloadGenerator {
    node_id: u32,
    key_range: u64,
    config: WorkloadConfig,
    rng: StdRng,
}

impl WorkloadGenerator {
    /// Creates a generator for one compute node.
    pub fn new(node_id: u32, key_range: u64, config: WorkloadConfig) -> Self {
        Self {
            node_id,
            key_range: key_range.max(1),
            config,
            rng: StdRng::seed_from_u64(u64::from(node_id)),
        }
    }

    /// Draws one key from the configured distribution.
    pub fn draw_key(&mut self) -> u64 {
        match self.config.key_distribution {
            KeyDistribution::Uniform => self.rng.gen_range(0..self.key_range),
            KeyDistribution::Zipfian => {
                // Inverse power method; clamp away from 0 so the pow stays finite
                let u: f64 = self.rng.gen::<f64>().max(1e-10);
                let skewed = u.powf(-1.0 / self.config.zipfian_alpha);
                (skewed as u64) % self.key_range
            }
        }
    }

    /// Generates the full schedule for the simulation horizon.
    ///
    /// Operations are spaced `1s / ops_per_second` apart starting at time
    /// zero, in scheduled order.
    pub fn generate(&mut self) -> VecDeque<WorkloadOp> {
        let interval = Duration::from_nanos(1_000_000_000 / u64::from(self.config.ops_per_second.max(1)));
        let horizon = Duration::from_micros(self.config.simulation_duration_us);

        let mut ops = VecDeque::new();
        let mut at = Duration::ZERO;
        while at < horizon {
            let kind = if self.rng.gen::<f64>() < self.config.read_ratio {
                WorkloadKind::Search
            } else {
                WorkloadKind::Insert
            };
            let key = self.draw_key();
            ops.push_back(WorkloadOp {
                kind,
                key,
                value: key * 1000 + u64::from(self.node_id),
                scheduled_at: at,
            });
            at += interval;
        }
        ops
    }
}
