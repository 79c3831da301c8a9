//! Compute-side B+tree engine for TetherDB.
//!
//! This crate provides:
//! - Address map translating node identity into remote addresses
//! - Per-operation state machine records and results
//! - The event-driven engine: traversal, insert, search, splits, and
//!   root promotion as continuations over remote-I/O completions
//! - Workload generation and running statistics

pub mod addrmap;
pub mod engine;
pub mod op;
pub mod stats;
pub mod workload;

pub use addrmap::AddressMap;
pub use engine::BTreeEngine;
pub use op::{OpKind, OpResult, Operation, Outcome, SplitPhase};
pub use stats::EngineStats;
pub use workload::{WorkloadGenerator, WorkloadKind, WorkloadOp};
