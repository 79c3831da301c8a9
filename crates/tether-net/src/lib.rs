//! Transport layer for TetherDB.
//!
//! This crate provides:
//! - Request/completion message types for one-sided remote reads and writes
//! - One logical channel per (compute-node, memory-node) pair
//! - The remote I/O gateway that allocates per-compute-node request ids

pub mod gateway;
pub mod message;

pub use gateway::{open_channels, CompletionStream, Gateway, MemoryEndpoint};
pub use message::{Completion, Request, RequestId};
