//! Passive slab byte store with an advisory lock region.

use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tether_common::{MemoryConfig, MEMORY_BASE};

/// A store shared between a server task and test inspection.
pub type SharedStore = Arc<Mutex<MemoryStore>>;

/// Counters for advisory lock traffic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LockStats {
    /// Locks granted (including re-acquisition by the current owner).
    pub acquisitions: u64,
    /// Locks released.
    pub releases: u64,
    /// Acquisition attempts denied because another owner held the lock.
    pub conflicts: u64,
}

/// One memory node's slab of remote memory.
///
/// The slab covers `[base, base + slab_size)` where
/// `base = MEMORY_BASE + memory_node * slab_size`. Reads of unwritten
/// bytes return zeros; accesses outside the slab warn and are not
/// required to succeed. Writes into the lock region are interpreted as
/// lock requests rather than stores: payload 0 releases, any other value
/// acquires on behalf of that requester id.
pub struct MemoryStore {
    /// Identity of this memory node.
    memory_node: u32,
    /// Configuration.
    config: MemoryConfig,
    /// First address owned by this slab.
    base: u64,
    /// Slab contents, zero-initialized.
    data: Vec<u8>,
    /// Lock owners keyed by lock-region address.
    locks: HashMap<u64, u64>,
    /// Lock traffic counters.
    lock_stats: LockStats,
    /// Read requests served.
    reads_served: u64,
    /// Write requests served (lock operations included).
    writes_served: u64,
}

impl MemoryStore {
    /// Creates the slab for the given memory node.
    pub fn new(memory_node: u32, config: MemoryConfig) -> Self {
        let base = MEMORY_BASE + memory_node as u64 * config.slab_size;
        let data = vec![0u8; config.slab_size as usize];
        Self {
            memory_node,
            config,
            base,
            data,
            locks: HashMap::new(),
            lock_stats: LockStats::default(),
            reads_served: 0,
            writes_served: 0,
        }
    }

    /// Creates a store already wrapped for sharing with a server task.
    pub fn shared(memory_node: u32, config: MemoryConfig) -> SharedStore {
        Arc::new(Mutex::new(Self::new(memory_node, config)))
    }

    /// Returns the first address owned by this slab.
    pub fn base(&self) -> u64 {
        self.base
    }

    /// Returns the lock counters.
    pub fn lock_stats(&self) -> LockStats {
        self.lock_stats
    }

    /// Returns true if `addr` holds a currently-acquired lock.
    pub fn is_locked(&self, addr: u64) -> bool {
        self.locks.contains_key(&addr)
    }

    /// Read requests served so far.
    pub fn reads_served(&self) -> u64 {
        self.reads_served
    }

    /// Write requests served so far.
    pub fn writes_served(&self) -> u64 {
        self.writes_served
    }

    fn in_slab(&self, addr: u64, len: u64) -> bool {
        addr >= self.base && addr + len <= self.base + self.config.slab_size
    }

    fn in_lock_region(&self, addr: u64) -> bool {
        addr >= self.base && {
            let offset = addr - self.base;
            offset >= self.config.lock_region_start() && offset < self.config.slab_size
        }
    }

    /// Reads exactly `size` bytes at `addr`.
    ///
    /// Unwritten regions read as zeros. Out-of-slab reads warn and return
    /// zeros so a misrouted request still produces a well-formed response.
    pub fn read(&mut self, addr: u64, size: usize) -> Bytes {
        self.reads_served += 1;
        if !self.in_slab(addr, size as u64) {
            tracing::warn!(
                "memory node {}: read of {size} bytes at {addr:#x} outside slab, returning zeros",
                self.memory_node
            );
            return Bytes::from(vec![0u8; size]);
        }
        let offset = (addr - self.base) as usize;
        Bytes::copy_from_slice(&self.data[offset..offset + size])
    }

    /// Stores `payload` at `addr`; persists until overwritten.
    ///
    /// Out-of-slab writes warn and are dropped. Writes into the lock
    /// region are diverted to the lock protocol when locking is enabled.
    pub fn write(&mut self, addr: u64, payload: &[u8]) {
        self.writes_served += 1;
        if self.config.enable_locking && self.in_lock_region(addr) {
            self.apply_lock_op(addr, payload);
            return;
        }
        if !self.in_slab(addr, payload.len() as u64) {
            tracing::warn!(
                "memory node {}: write of {} bytes at {addr:#x} outside slab, dropping",
                self.memory_node,
                payload.len()
            );
            return;
        }
        let offset = (addr - self.base) as usize;
        self.data[offset..offset + payload.len()].copy_from_slice(payload);
    }

    /// Interprets a lock-region write: payload 0 releases, nonzero
    /// acquires for that requester id.
    fn apply_lock_op(&mut self, addr: u64, payload: &[u8]) {
        let mut raw = [0u8; 8];
        let n = payload.len().min(8);
        raw[..n].copy_from_slice(&payload[..n]);
        let requester = u64::from_le_bytes(raw);

        if requester == 0 {
            if self.locks.remove(&addr).is_some() {
                self.lock_stats.releases += 1;
            }
            return;
        }

        match self.locks.get(&addr) {
            Some(&owner) if owner != requester => {
                tracing::debug!(
                    "memory node {}: lock at {addr:#x} held by {owner}, denied to {requester}",
                    self.memory_node
                );
                self.lock_stats.conflicts += 1;
            }
            _ => {
                self.locks.insert(addr, requester);
                self.lock_stats.acquisitions += 1;
            }
        }
    }
}
