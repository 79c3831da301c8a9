//! TetherDB common types, errors, and configuration.
//!
//! This crate provides shared definitions used across all TetherDB components.

pub mod config;
pub mod error;
pub mod node;

pub use config::{
    EngineConfig, KeyDistribution, MemoryConfig, SimConfig, WorkloadConfig, DEFAULT_SLAB_SIZE,
    LOCK_REGION_LEN, MEMORY_BASE,
};
pub use error::{Result, TetherError};
pub use node::{LeafInsert, TreeNode};
