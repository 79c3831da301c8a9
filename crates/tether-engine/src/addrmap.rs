//! Translation of tree-node identity into remote addresses.
//!
//! The remote address space begins at `MEMORY_BASE`; memory node `m` owns
//! the slab `[MEMORY_BASE + m*S, MEMORY_BASE + (m+1)*S)`. Within a slab,
//! nodes are placed by tree level into disjoint bands:
//!
//! ```text
//! +---------------------+ 0x000000
//! | level 0 (root slot) |
//! +---------------------+ 0x010000
//! | level 1 internal    |
//! +---------------------+ 0x020000
//! | level 2 internal    |
//! +---------------------+ ... 0x10000 per internal level
//! | leaves              | 0x200000 .. slab end (minus lock region)
//! +---------------------+
//! ```
//!
//! Level 0 always resolves to offset 0; only one root node ever exists.

use tether_common::{LOCK_REGION_LEN, MEMORY_BASE};

/// Byte offset of each internal level's band within a slab (64 KiB per level).
const INTERNAL_BAND_STRIDE: u64 = 0x1_0000;

/// Byte offset where the leaf band begins (2 MiB).
const LEAF_BAND_OFFSET: u64 = 0x20_0000;

/// Maps (node id, level) to remote addresses and addresses to channels.
#[derive(Debug, Clone)]
pub struct AddressMap {
    /// Base of the remote address space.
    base: u64,
    /// Slab size per memory node.
    slab_size: u64,
    /// Number of memory nodes.
    num_memory_nodes: u32,
    /// Constant on-wire node size.
    node_size: u64,
    /// Node slots per internal band.
    internal_slots: u64,
    /// Node slots in the leaf band.
    leaf_slots: u64,
}

impl AddressMap {
    /// Creates an address map for the given fleet and node size.
    pub fn new(num_memory_nodes: u32, slab_size: u64, node_size: u64) -> Self {
        let internal_slots = (INTERNAL_BAND_STRIDE / node_size).max(1);
        let leaf_band = slab_size
            .saturating_sub(LEAF_BAND_OFFSET)
            .saturating_sub(LOCK_REGION_LEN);
        let leaf_slots = (leaf_band / node_size).max(1);
        Self {
            base: MEMORY_BASE,
            slab_size,
            num_memory_nodes,
            node_size,
            internal_slots,
            leaf_slots,
        }
    }

    /// Returns the remote address for a node.
    ///
    /// The memory node is chosen by `node_id mod N` for load balance; the
    /// band within its slab follows from the node's level in a tree of
    /// `tree_height` levels.
    pub fn allocate(&self, node_id: u64, level: u32, tree_height: u32) -> u64 {
        let memory_node = node_id % self.num_memory_nodes as u64;
        let slab = self.base + memory_node * self.slab_size;

        let offset = if level == 0 {
            // The single root slot
            0
        } else if level + 1 < tree_height {
            let band = INTERNAL_BAND_STRIDE * level as u64;
            band + (node_id % self.internal_slots) * self.node_size
        } else {
            LEAF_BAND_OFFSET + (node_id % self.leaf_slots) * self.node_size
        };

        slab + offset
    }

    /// Returns the memory node (and so the channel) owning `addr`.
    ///
    /// Out-of-range addresses fall back to channel 0 with a warning so a
    /// misrouted request still makes progress.
    pub fn memory_node(&self, addr: u64) -> u32 {
        if addr < self.base {
            tracing::warn!("address {addr:#x} below memory base, falling back to channel 0");
            return 0;
        }
        let index = (addr - self.base) / self.slab_size;
        if index >= self.num_memory_nodes as u64 {
            tracing::warn!(
                "address {addr:#x} maps to memory node {index} beyond the fleet, falling back to channel 0"
            );
            return 0;
        }
        index as u32
    }
}
