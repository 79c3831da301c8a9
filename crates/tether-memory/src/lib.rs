//! Memory-node side of TetherDB.
//!
//! A memory node is a passive byte store: it owns one fixed slab of the
//! remote address space and answers one-sided reads and writes. The only
//! active behavior is the advisory lock region, which interprets write
//! payloads as lock requests. All tree logic lives on the compute side.

mod server;
mod store;

pub use server::MemoryServer;
pub use store::{LockStats, MemoryStore, SharedStore};
