//! Configuration structures for TetherDB.

use serde::{Deserialize, Serialize};

/// Base of the remote address space; memory node 0's slab starts here.
pub const MEMORY_BASE: u64 = 0x1000_0000;

/// Default slab size owned by each memory node (16 MiB).
pub const DEFAULT_SLAB_SIZE: u64 = 0x100_0000;

/// Length of the advisory lock region at the tail of each slab (64 KiB).
pub const LOCK_REGION_LEN: u64 = 0x1_0000;

/// Compute-side engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Identity of this compute node.
    pub node_id: u32,
    /// Number of memory nodes the tree is spread across.
    pub num_memory_nodes: u32,
    /// Maximum keys per tree node.
    pub btree_fanout: u32,
    /// Upper bound of the key domain.
    pub key_range: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            node_id: 0,
            num_memory_nodes: 4,
            btree_fanout: 16,
            key_range: 1_000_000,
        }
    }
}

impl EngineConfig {
    /// Validates the parameters a running engine depends on.
    pub fn validate(&self) -> crate::Result<()> {
        if self.num_memory_nodes == 0 {
            return Err(crate::TetherError::InvalidParameter {
                name: "num_memory_nodes".to_string(),
                value: "0".to_string(),
            });
        }
        if self.btree_fanout < 2 {
            return Err(crate::TetherError::InvalidParameter {
                name: "btree_fanout".to_string(),
                value: self.btree_fanout.to_string(),
            });
        }
        Ok(())
    }
}

/// Memory-node configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Bytes of remote memory owned by each memory node.
    pub slab_size: u64,
    /// Interpret writes into the lock region as lock requests.
    pub enable_locking: bool,
    /// Length of the lock region at the tail of the slab.
    pub lock_region_len: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            slab_size: DEFAULT_SLAB_SIZE,
            enable_locking: true,
            lock_region_len: LOCK_REGION_LEN,
        }
    }
}

impl MemoryConfig {
    /// Returns the slab-relative offset where the lock region begins.
    pub fn lock_region_start(&self) -> u64 {
        self.slab_size.saturating_sub(self.lock_region_len)
    }
}

/// Key distribution drawn by the workload generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyDistribution {
    /// Skewed access following an inverse power law.
    #[default]
    Zipfian,
    /// Every key equally likely.
    Uniform,
}

/// Workload generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadConfig {
    /// Target operations per second.
    pub ops_per_second: u32,
    /// Simulation horizon in microseconds.
    pub simulation_duration_us: u64,
    /// Fraction of operations that are searches (0.0-1.0).
    pub read_ratio: f64,
    /// Zipfian skew parameter; ignored for uniform draws.
    pub zipfian_alpha: f64,
    /// Key distribution to draw from.
    pub key_distribution: KeyDistribution,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            ops_per_second: 10_000,
            simulation_duration_us: 1_000_000,
            read_ratio: 0.95,
            zipfian_alpha: 0.9,
            key_distribution: KeyDistribution::Zipfian,
        }
    }
}

/// Top-level configuration for the simulation driver.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Compute-side engine parameters.
    pub engine: EngineConfig,
    /// Memory-node parameters.
    pub memory: MemoryConfig,
    /// Workload parameters.
    pub workload: WorkloadConfig,
    /// Most operations launched per tick.
    pub max_ops_per_tick: usize,
}

impl SimConfig {
    /// Default bound on operations launched per tick.
    pub const DEFAULT_MAX_OPS_PER_TICK: usize = 32;

    /// Returns the per-tick launch bound, applying the default when unset.
    pub fn ops_per_tick(&self) -> usize {
        if self.max_ops_per_tick == 0 {
            Self::DEFAULT_MAX_OPS_PER_TICK
        } else {
            self.max_ops_per_tick
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_config_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.node_id, 0);
        assert_eq!(config.num_memory_nodes, 4);
        assert_eq!(config.btree_fanout, 16);
        assert_eq!(config.key_range, 1_000_000);
    }

    #[test]
    fn test_engine_config_validate() {
        assert!(EngineConfig::default().validate().is_ok());

        let config = EngineConfig {
            num_memory_nodes: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = EngineConfig {
            btree_fanout: 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_engine_config_serde_roundtrip() {
        let original = EngineConfig {
            node_id: 3,
            num_memory_nodes: 2,
            btree_fanout: 4,
            key_range: 1_000,
        };
        let serialized = serde_json::to_string(&original).unwrap();
        let deserialized: EngineConfig = serde_json::from_str(&serialized).unwrap();

        assert_eq!(original.node_id, deserialized.node_id);
        assert_eq!(original.num_memory_nodes, deserialized.num_memory_nodes);
        assert_eq!(original.btree_fanout, deserialized.btree_fanout);
        assert_eq!(original.key_range, deserialized.key_range);
    }

    #[test]
    fn test_memory_config_defaults() {
        let config = MemoryConfig::default();
        assert_eq!(config.slab_size, 16 * 1024 * 1024);
        assert!(config.enable_locking);
        assert_eq!(config.lock_region_len, 64 * 1024);
    }

    #[test]
    fn test_memory_config_lock_region_start() {
        let config = MemoryConfig::default();
        assert_eq!(
            config.lock_region_start(),
            config.slab_size - config.lock_region_len
        );

        // Degenerate slab smaller than the lock region saturates to 0
        let config = MemoryConfig {
            slab_size: 1024,
            lock_region_len: 4096,
            ..Default::default()
        };
        assert_eq!(config.lock_region_start(), 0);
    }

    #[test]
    fn test_workload_config_defaults() {
        let config = WorkloadConfig::default();
        assert_eq!(config.ops_per_second, 10_000);
        assert_eq!(config.simulation_duration_us, 1_000_000);
        assert!((config.read_ratio - 0.95).abs() < f64::EPSILON);
        assert!((config.zipfian_alpha - 0.9).abs() < f64::EPSILON);
        assert_eq!(config.key_distribution, KeyDistribution::Zipfian);
    }

    #[test]
    fn test_key_distribution_serde() {
        let serialized = serde_json::to_string(&KeyDistribution::Uniform).unwrap();
        assert_eq!(serialized, "\"uniform\"");

        let deserialized: KeyDistribution = serde_json::from_str("\"zipfian\"").unwrap();
        assert_eq!(deserialized, KeyDistribution::Zipfian);
    }

    #[test]
    fn test_sim_config_from_partial_json() {
        let config: SimConfig =
            serde_json::from_str(r#"{"engine": {"node_id": 1, "num_memory_nodes": 2, "btree_fanout": 4, "key_range": 100}}"#)
                .unwrap();
        assert_eq!(config.engine.node_id, 1);
        // Omitted sections fall back to defaults
        assert_eq!(config.memory.slab_size, DEFAULT_SLAB_SIZE);
        assert_eq!(config.workload.ops_per_second, 10_000);
        assert_eq!(config.ops_per_tick(), SimConfig::DEFAULT_MAX_OPS_PER_TICK);
    }

    #[test]
    fn test_sim_config_ops_per_tick_override() {
        let config = SimConfig {
            max_ops_per_tick: 8,
            ..Default::default()
        };
        assert_eq!(config.ops_per_tick(), 8);
    }

    #[test]
    fn test_layout_constants() {
        assert_eq!(MEMORY_BASE, 0x1000_0000);
        assert_eq!(DEFAULT_SLAB_SIZE, 0x100_0000);
        assert_eq!(LOCK_REGION_LEN, 0x1_0000);
    }
}
