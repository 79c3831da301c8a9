//! Event-driven B+tree engine over one-sided remote memory.
//!
//! The engine owns no tree state beyond three metadata words
//! (`root_addr`, `tree_height`, `next_node_id`); every node lives in
//! remote memory and is re-read on each traversal. Each client operation
//! is an [`Operation`] record keyed by the id of its outstanding remote
//! request. A completion looks the record up, advances its state machine,
//! and either finishes it or re-inserts it under the id of the next
//! request. The engine never blocks: its only suspension points are
//! `send_read` and `send_write`.
//!
//! Split sequences run as ordered write phases. A leaf split writes the
//! truncated old leaf, then the new right sibling, then either promotes a
//! new root or inserts the separator into the parent. The parent comes
//! from the traversal path; if the path is too short the engine
//! re-traverses from the root guided by the separator key.

use crate::addrmap::AddressMap;
use crate::op::{OpKind, OpResult, Operation, Outcome, SplitPhase};
use crate::stats::EngineStats;
use bytes::Bytes;
use std::collections::{HashMap, VecDeque};
use tether_common::{EngineConfig, MemoryConfig, Result, TetherError, TreeNode};
use tether_net::{Completion, CompletionStream, Gateway, RequestId};

/// Compute-side B+tree engine.
pub struct BTreeEngine {
    /// Engine configuration.
    config: EngineConfig,
    /// Node-id/level to remote-address translation.
    addrmap: AddressMap,
    /// Outgoing one-sided request sender.
    gateway: Gateway,
    /// Constant on-wire node size.
    node_size: usize,
    /// Remote address of the root node.
    root_addr: u64,
    /// Number of levels; leaves sit at `tree_height - 1`.
    tree_height: u32,
    /// Counter handing out unique node ids.
    next_node_id: u64,
    /// In-flight operations keyed by their outstanding request id.
    pending: HashMap<RequestId, Operation>,
    /// child address -> parent address hints recorded during traversal.
    /// Convenience only; the traversal path is authoritative.
    parent_hints: HashMap<u64, u64>,
    /// Running counters.
    stats: EngineStats,
    /// Completed-operation results awaiting the caller.
    results: VecDeque<OpResult>,
}

impl BTreeEngine {
    /// Creates an engine; `bootstrap` must run before operations launch.
    pub fn new(config: EngineConfig, memory: &MemoryConfig, gateway: Gateway) -> Result<Self> {
        config.validate()?;
        let node_size = TreeNode::wire_size(config.btree_fanout);
        let addrmap = AddressMap::new(
            config.num_memory_nodes,
            memory.slab_size,
            node_size as u64,
        );
        Ok(Self {
            config,
            addrmap,
            gateway,
            node_size,
            root_addr: 0,
            tree_height: 1,
            next_node_id: 0,
            pending: HashMap::new(),
            parent_hints: HashMap::new(),
            stats: EngineStats::default(),
            results: VecDeque::new(),
        })
    }

    /// Writes the initial empty root leaf to remote memory and waits for
    /// the write to land.
    pub async fn bootstrap(&mut self, completions: &mut CompletionStream) -> Result<()> {
        let node_id = self.alloc_node_id();
        let mut root = TreeNode::new(self.config.btree_fanout);
        root.addr = self.addrmap.allocate(node_id, 0, 1);
        self.root_addr = root.addr;
        self.tree_height = 1;

        tracing::debug!("bootstrapping empty tree, root at {:#x}", root.addr);
        let op = Operation::new(OpKind::InitRoot, root.addr);
        let payload = root.serialize();
        self.send_write(op, root.addr, payload)?;
        self.run_until_quiescent(completions).await
    }

    /// Launches an insert; the result surfaces via [`drain_results`].
    ///
    /// [`drain_results`]: BTreeEngine::drain_results
    pub fn insert(&mut self, key: u64, value: u64) -> Result<()> {
        self.start(OpKind::Insert { key, value })
    }

    /// Launches a search; the result surfaces via [`drain_results`].
    ///
    /// [`drain_results`]: BTreeEngine::drain_results
    pub fn search(&mut self, key: u64) -> Result<()> {
        self.start(OpKind::Search { key })
    }

    /// Drives completions until no request is outstanding.
    pub async fn run_until_quiescent(
        &mut self,
        completions: &mut CompletionStream,
    ) -> Result<()> {
        while !self.pending.is_empty() {
            match completions.recv().await {
                Some(completion) => self.handle_completion(completion)?,
                None => {
                    return Err(TetherError::CompletionStreamClosed {
                        outstanding: self.pending.len(),
                    })
                }
            }
        }
        Ok(())
    }

    /// Advances the operation waiting on `completion`.
    ///
    /// A completion with no matching operation is a late response and is
    /// dropped.
    pub fn handle_completion(&mut self, completion: Completion) -> Result<()> {
        let id = completion.id();
        let Some(op) = self.pending.remove(&id) else {
            tracing::debug!(%id, "completion for unknown request, dropping");
            return Ok(());
        };
        match completion {
            Completion::ReadDone { payload, .. } => self.on_read_complete(op, payload),
            Completion::WriteDone { .. } => self.on_write_complete(op),
        }
    }

    /// Number of requests currently in flight.
    pub fn outstanding(&self) -> usize {
        self.pending.len()
    }

    /// Takes all results completed since the last call.
    pub fn drain_results(&mut self) -> Vec<OpResult> {
        self.results.drain(..).collect()
    }

    /// Running counters.
    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    /// Remote address of the root.
    pub fn root_addr(&self) -> u64 {
        self.root_addr
    }

    /// Current number of tree levels.
    pub fn tree_height(&self) -> u32 {
        self.tree_height
    }

    /// Constant on-wire node size.
    pub fn node_size(&self) -> usize {
        self.node_size
    }

    fn start(&mut self, kind: OpKind) -> Result<()> {
        let op = Operation::new(kind, self.root_addr);
        let root = self.root_addr;
        self.send_read(op, root)
    }

    fn alloc_node_id(&mut self) -> u64 {
        let id = self.next_node_id;
        self.next_node_id += 1;
        id
    }

    fn send_read(&mut self, op: Operation, addr: u64) -> Result<()> {
        let channel = self.addrmap.memory_node(addr);
        let id = self.gateway.send_read(channel, addr, self.node_size as u32)?;
        self.stats.remote_reads += 1;
        self.pending.insert(id, op);
        Ok(())
    }

    fn send_write(&mut self, op: Operation, addr: u64, payload: Bytes) -> Result<()> {
        let channel = self.addrmap.memory_node(addr);
        let id = self.gateway.send_write(channel, addr, payload)?;
        self.stats.remote_writes += 1;
        self.pending.insert(id, op);
        Ok(())
    }

    fn on_read_complete(&mut self, op: Operation, payload: Bytes) -> Result<()> {
        if payload.len() < self.node_size {
            tracing::debug!(
                "short read payload at {:#x} ({} of {} bytes), treating node as empty",
                op.current_addr,
                payload.len(),
                self.node_size
            );
        }
        let node = TreeNode::deserialize(&payload, self.config.btree_fanout);
        match op.split {
            SplitPhase::None => self.step_traversal(op, node),
            SplitPhase::ReadParent => self.apply_parent(op, node),
            SplitPhase::FindParent => self.step_find_parent(op, node),
            phase => {
                tracing::error!(?phase, "read completion in a write phase, dropping operation");
                Ok(())
            }
        }
    }

    fn on_write_complete(&mut self, mut op: Operation) -> Result<()> {
        match op.split {
            SplitPhase::None => match op.kind {
                OpKind::InitRoot => Ok(()),
                OpKind::Insert { key, .. } => {
                    self.finish_insert(op, key);
                    Ok(())
                }
                OpKind::Search { .. } => {
                    tracing::error!("write completion for a search, dropping");
                    Ok(())
                }
            },
            SplitPhase::WriteOld => {
                let Some(new) = op.new_node.clone() else {
                    tracing::error!("split lost its new node, dropping operation");
                    return Ok(());
                };
                op.split = SplitPhase::WriteNew;
                let payload = new.serialize();
                self.send_write(op, new.addr, payload)
            }
            SplitPhase::WriteNew => {
                if op.is_root_split {
                    self.begin_root_promotion(op)
                } else {
                    self.advance_to_parent(op)
                }
            }
            SplitPhase::WriteRoot => {
                // The new root landed; the tree is one level taller
                self.tree_height += 1;
                tracing::debug!(
                    "root promoted at {:#x}, height now {}",
                    self.root_addr,
                    self.tree_height
                );
                let key = op.key();
                self.finish_insert(op, key);
                Ok(())
            }
            SplitPhase::UpdateParent => {
                let key = op.key();
                self.finish_insert(op, key);
                Ok(())
            }
            SplitPhase::ReadParent | SplitPhase::FindParent => {
                tracing::error!("write completion in a read phase, dropping operation");
                Ok(())
            }
        }
    }

    /// One traversal step: descend, or hand off to the leaf handler.
    fn step_traversal(&mut self, mut op: Operation, node: TreeNode) -> Result<()> {
        op.path.push(node.clone());

        if node.is_leaf || op.current_level >= self.tree_height - 1 {
            return self.handle_leaf(op, node);
        }

        let index = node.child_index(op.key());
        let child = node.children[index];
        self.parent_hints.insert(child, node.addr);
        op.current_level += 1;
        op.current_addr = child;
        self.send_read(op, child)
    }

    fn handle_leaf(&mut self, mut op: Operation, mut leaf: TreeNode) -> Result<()> {
        match op.kind {
            OpKind::Search { key } => {
                self.stats.searches += 1;
                let value = leaf.search(key);
                self.finish_search(op, key, value);
                Ok(())
            }
            OpKind::Insert { key, value } => {
                self.stats.inserts += 1;
                if leaf.position_of(key).is_some() {
                    // Update in place; a full leaf never splits on a duplicate
                    leaf.leaf_insert(key, value);
                    op.updated = true;
                    let addr = leaf.addr;
                    let payload = leaf.serialize();
                    self.send_write(op, addr, payload)
                } else if !leaf.is_full() {
                    leaf.leaf_insert(key, value);
                    let addr = leaf.addr;
                    let payload = leaf.serialize();
                    self.send_write(op, addr, payload)
                } else {
                    self.begin_leaf_split(op, leaf, key, value)
                }
            }
            OpKind::InitRoot => {
                tracing::error!("bootstrap operation reached the leaf handler, dropping");
                Ok(())
            }
        }
    }

    /// Splits a full leaf around an incoming pair and starts the write
    /// phase sequence.
    fn begin_leaf_split(
        &mut self,
        mut op: Operation,
        leaf: TreeNode,
        key: u64,
        value: u64,
    ) -> Result<()> {
        op.split_happened = true;
        let fanout = self.config.btree_fanout;

        // Materialize fanout + 1 sorted pairs
        let n = leaf.num_keys as usize;
        let mut pairs: Vec<(u64, u64)> = (0..n).map(|i| (leaf.keys[i], leaf.values[i])).collect();
        let pos = pairs.partition_point(|&(k, _)| k < key);
        pairs.insert(pos, (key, value));

        // Old keeps the first fanout / 2 pairs, new takes the rest
        let keep = (fanout / 2) as usize;
        let mut old = TreeNode::new(fanout);
        old.addr = leaf.addr;
        old.num_keys = keep as u32;
        for (i, &(k, v)) in pairs[..keep].iter().enumerate() {
            old.keys[i] = k;
            old.values[i] = v;
        }

        let mut new = TreeNode::new(fanout);
        new.num_keys = (pairs.len() - keep) as u32;
        for (i, &(k, v)) in pairs[keep..].iter().enumerate() {
            new.keys[i] = k;
            new.values[i] = v;
        }

        op.separator_key = new.keys[0];
        op.split_depth = op.path.len().saturating_sub(1);

        if leaf.addr == self.root_addr {
            // The root slot is being repurposed for a new internal root;
            // the old content moves to a fresh leaf slot
            op.is_root_split = true;
            op.parent_addr = 0;
            let id = self.alloc_node_id();
            old.addr = self
                .addrmap
                .allocate(id, op.current_level + 1, self.tree_height + 1);
            let id = self.alloc_node_id();
            new.addr = self
                .addrmap
                .allocate(id, op.current_level + 1, self.tree_height + 1);
        } else {
            op.is_root_split = false;
            op.parent_addr = self.resolve_parent_addr(&op, leaf.addr);
            let id = self.alloc_node_id();
            new.addr = self
                .addrmap
                .allocate(id, op.current_level, self.tree_height);
        }

        tracing::debug!(
            "leaf split for key {key}: old {:#x}, new {:#x}, separator {}, root split {}",
            old.addr,
            new.addr,
            op.separator_key,
            op.is_root_split
        );

        let payload = old.serialize();
        let old_addr = old.addr;
        op.old_node = Some(old);
        op.new_node = Some(new);
        op.split = SplitPhase::WriteOld;
        self.send_write(op, old_addr, payload)
    }

    /// Splits a full internal node around the separator/child about to be
    /// inserted into it, restarting the write phases one level up.
    fn begin_internal_split(&mut self, mut op: Operation, internal: TreeNode) -> Result<()> {
        let Some(right_sibling) = op.new_node.as_ref() else {
            tracing::error!("internal split lost its incoming child, dropping operation");
            return Ok(());
        };
        let incoming_child = right_sibling.addr;
        let fanout = self.config.btree_fanout;

        // The split now targets the node one level up the path
        op.split_depth = op.split_depth.saturating_sub(1);
        let level = op.split_depth as u32;

        // Materialize fanout + 1 keys and fanout + 2 children
        let n = internal.num_keys as usize;
        let mut keys = internal.keys[..n].to_vec();
        let mut children = internal.children[..=n].to_vec();
        let pos = keys.partition_point(|&k| k < op.separator_key);
        keys.insert(pos, op.separator_key);
        children.insert(pos + 1, incoming_child);

        // The middle key is promoted, not duplicated into the right half
        let mid = keys.len() / 2;
        let promoted = keys[mid];

        let mut old = TreeNode::new_internal(fanout);
        old.addr = internal.addr;
        old.num_keys = mid as u32;
        old.keys[..mid].copy_from_slice(&keys[..mid]);
        old.children[..=mid].copy_from_slice(&children[..=mid]);

        let right_len = keys.len() - mid - 1;
        let mut new = TreeNode::new_internal(fanout);
        new.num_keys = right_len as u32;
        new.keys[..right_len].copy_from_slice(&keys[mid + 1..]);
        new.children[..=right_len].copy_from_slice(&children[mid + 1..]);

        op.separator_key = promoted;

        if internal.addr == self.root_addr {
            op.is_root_split = true;
            op.parent_addr = 0;
            let id = self.alloc_node_id();
            old.addr = self
                .addrmap
                .allocate(id, level + 1, self.tree_height + 1);
            let id = self.alloc_node_id();
            new.addr = self
                .addrmap
                .allocate(id, level + 1, self.tree_height + 1);
        } else {
            op.is_root_split = false;
            op.parent_addr = self.resolve_parent_addr(&op, internal.addr);
            let id = self.alloc_node_id();
            new.addr = self.addrmap.allocate(id, level, self.tree_height);
        }

        tracing::debug!(
            "internal split: old {:#x}, new {:#x}, promoted {promoted}, root split {}",
            old.addr,
            new.addr,
            op.is_root_split
        );

        let payload = old.serialize();
        let old_addr = old.addr;
        op.old_node = Some(old);
        op.new_node = Some(new);
        op.split = SplitPhase::WriteOld;
        self.send_write(op, old_addr, payload)
    }

    /// Writes the fresh internal root of a root split.
    fn begin_root_promotion(&mut self, mut op: Operation) -> Result<()> {
        let (Some(old), Some(new)) = (op.old_node.as_ref(), op.new_node.as_ref()) else {
            tracing::error!("root promotion lost its split halves, dropping operation");
            return Ok(());
        };

        let mut root = TreeNode::new_internal(self.config.btree_fanout);
        root.addr = self.root_addr;
        root.num_keys = 1;
        root.keys[0] = op.separator_key;
        root.children[0] = old.addr;
        root.children[1] = new.addr;

        op.split = SplitPhase::WriteRoot;
        let payload = root.serialize();
        self.send_write(op, root.addr, payload)
    }

    /// Reads the split node's parent, re-traversing from the root when
    /// the parent is unknown.
    fn advance_to_parent(&mut self, mut op: Operation) -> Result<()> {
        if op.parent_addr == 0 {
            op.split = SplitPhase::FindParent;
            op.path.clear();
            op.current_level = 0;
            op.current_addr = self.root_addr;
            let root = self.root_addr;
            return self.send_read(op, root);
        }
        op.split = SplitPhase::ReadParent;
        let parent = op.parent_addr;
        self.send_read(op, parent)
    }

    /// Inserts the separator and right sibling into a freshly-read
    /// parent, or escalates into an internal split.
    fn apply_parent(&mut self, mut op: Operation, mut parent: TreeNode) -> Result<()> {
        let (Some(old), Some(new)) = (op.old_node.as_ref(), op.new_node.as_ref()) else {
            tracing::error!("parent update lost its split halves, dropping operation");
            return Ok(());
        };
        let (old_addr, new_addr) = (old.addr, new.addr);

        if !parent.references_child(old_addr) && !parent.references_child(new_addr) {
            // Stale hint or stale path snapshot; find the real parent
            tracing::warn!(
                "parent {:#x} does not reference split node {old_addr:#x}, re-traversing",
                parent.addr
            );
            op.parent_addr = 0;
            return self.advance_to_parent(op);
        }

        if parent.is_full() {
            return self.begin_internal_split(op, parent);
        }

        let pos = parent.child_index(op.separator_key);
        let n = parent.num_keys as usize;
        for i in (pos..n).rev() {
            parent.keys[i + 1] = parent.keys[i];
        }
        for i in (pos + 1..=n).rev() {
            parent.children[i + 1] = parent.children[i];
        }
        parent.keys[pos] = op.separator_key;
        parent.children[pos + 1] = new_addr;
        parent.num_keys += 1;

        op.split = SplitPhase::UpdateParent;
        let addr = parent.addr;
        let payload = parent.serialize();
        self.send_write(op, addr, payload)
    }

    /// One step of the parent re-traversal: stop at the node referencing
    /// either split half, otherwise descend by the separator key.
    fn step_find_parent(&mut self, mut op: Operation, node: TreeNode) -> Result<()> {
        let (Some(old), Some(new)) = (op.old_node.as_ref(), op.new_node.as_ref()) else {
            tracing::error!("parent search lost its split halves, dropping operation");
            return Ok(());
        };
        let (old_addr, new_addr) = (old.addr, new.addr);

        op.path.push(node.clone());

        if node.references_child(old_addr) || node.references_child(new_addr) {
            // Rebase the split bookkeeping on the freshly-built path
            op.split_depth = op.path.len();
            return self.apply_parent(op, node);
        }

        if node.is_leaf || op.current_level >= self.tree_height - 1 {
            tracing::error!(
                "re-traversal hit the leaf level without finding the parent of {old_addr:#x}, completing degraded"
            );
            let key = op.key();
            self.finish_insert(op, key);
            return Ok(());
        }

        let index = node.child_index(op.separator_key);
        let child = node.children[index];
        op.current_level += 1;
        op.current_addr = child;
        self.send_read(op, child)
    }

    fn resolve_parent_addr(&self, op: &Operation, child_addr: u64) -> u64 {
        if op.split_depth >= 1 {
            if let Some(parent) = op.path.get(op.split_depth - 1) {
                return parent.addr;
            }
        }
        if let Some(&hint) = self.parent_hints.get(&child_addr) {
            tracing::debug!("parent of {child_addr:#x} resolved from hint map");
            return hint;
        }
        tracing::error!(
            "traversal path too short to locate parent of {child_addr:#x}, will re-traverse"
        );
        0
    }

    fn finish_search(&mut self, op: Operation, key: u64, value: Option<u64>) {
        let latency = op.started_at.elapsed();
        self.stats.total_latency += latency;
        self.stats.ops_completed += 1;
        self.results.push_back(OpResult {
            outcome: Outcome::Searched { key, value },
            latency,
        });
    }

    fn finish_insert(&mut self, op: Operation, key: u64) {
        let latency = op.started_at.elapsed();
        self.stats.total_latency += latency;
        self.stats.ops_completed += 1;
        self.results.push_back(OpResult {
            outcome: Outcome::Inserted {
                key,
                inserted: !op.updated,
                updated: op.updated,
                split_happened: op.split_happened,
            },
            latency,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use tether_memory::{MemoryServer, MemoryStore};
    use tether_net::open_channels;

    fn test_config() -> (EngineConfig, MemoryConfig) {
        (
            EngineConfig {
                node_id: 0,
                num_memory_nodes: 2,
                btree_fanout: 4,
                key_range: 1_000,
            },
            MemoryConfig::default(),
        )
    }

    async fn engine_with_servers() -> (BTreeEngine, CompletionStream) {
        let (engine_config, memory_config) = test_config();
        let (gateway, completions, endpoints) =
            open_channels(engine_config.node_id, engine_config.num_memory_nodes).unwrap();
        for (memory_node, endpoint) in endpoints.into_iter().enumerate() {
            let store = MemoryStore::shared(memory_node as u32, memory_config.clone());
            MemoryServer::spawn(store, endpoint);
        }
        let engine = BTreeEngine::new(engine_config, &memory_config, gateway).unwrap();
        (engine, completions)
    }

    #[test]
    fn test_new_rejects_bad_config() {
        let (_, memory_config) = test_config();
        let (gateway, _completions, _endpoints) = open_channels(0, 1).unwrap();
        let bad = EngineConfig {
            btree_fanout: 1,
            ..EngineConfig::default()
        };
        assert!(BTreeEngine::new(bad, &memory_config, gateway).is_err());
    }

    #[tokio::test]
    async fn test_bootstrap_writes_empty_root() {
        let (mut engine, mut completions) = engine_with_servers().await;
        engine.bootstrap(&mut completions).await.unwrap();

        assert_eq!(engine.root_addr(), 0x1000_0000);
        assert_eq!(engine.tree_height(), 1);
        assert_eq!(engine.outstanding(), 0);
        assert_eq!(engine.stats().remote_writes, 1);
        // Bootstrap is not a client operation
        assert_eq!(engine.stats().ops_completed, 0);
        assert!(engine.drain_results().is_empty());
    }

    #[tokio::test]
    async fn test_insert_then_search_roundtrip() {
        let (mut engine, mut completions) = engine_with_servers().await;
        engine.bootstrap(&mut completions).await.unwrap();

        engine.insert(10, 1000).unwrap();
        engine.run_until_quiescent(&mut completions).await.unwrap();
        engine.search(10).unwrap();
        engine.search(11).unwrap();
        engine.run_until_quiescent(&mut completions).await.unwrap();

        let results = engine.drain_results();
        assert_eq!(results.len(), 3);
        assert!(matches!(
            results[0].outcome,
            Outcome::Inserted {
                key: 10,
                inserted: true,
                updated: false,
                split_happened: false,
            }
        ));
        assert!(matches!(
            results[1].outcome,
            Outcome::Searched {
                key: 10,
                value: Some(1000)
            }
        ));
        assert!(matches!(
            results[2].outcome,
            Outcome::Searched {
                key: 11,
                value: None
            }
        ));
    }

    #[tokio::test]
    async fn test_late_completion_is_dropped() {
        let (mut engine, mut completions) = engine_with_servers().await;
        engine.bootstrap(&mut completions).await.unwrap();

        let stale = Completion::ReadDone {
            id: tether_net::RequestId::new(0, 0xDEAD),
            payload: Bytes::new(),
        };
        engine.handle_completion(stale).unwrap();
        assert_eq!(engine.outstanding(), 0);
        assert!(engine.drain_results().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_insert_updates_in_place() {
        let (mut engine, mut completions) = engine_with_servers().await;
        engine.bootstrap(&mut completions).await.unwrap();

        engine.insert(7, 70).unwrap();
        engine.run_until_quiescent(&mut completions).await.unwrap();
        engine.insert(7, 77).unwrap();
        engine.run_until_quiescent(&mut completions).await.unwrap();

        let results = engine.drain_results();
        assert!(matches!(
            results[1].outcome,
            Outcome::Inserted {
                key: 7,
                inserted: false,
                updated: true,
                split_happened: false,
            }
        ));

        engine.search(7).unwrap();
        engine.run_until_quiescent(&mut completions).await.unwrap();
        assert!(matches!(
            engine.drain_results()[0].outcome,
            Outcome::Searched {
                key: 7,
                value: Some(77)
            }
        ));
    }

    #[tokio::test]
    async fn test_stats_track_remote_traffic() {
        let (mut engine, mut completions) = engine_with_servers().await;
        engine.bootstrap(&mut completions).await.unwrap();

        engine.insert(1, 10).unwrap();
        engine.run_until_quiescent(&mut completions).await.unwrap();
        engine.search(1).unwrap();
        engine.run_until_quiescent(&mut completions).await.unwrap();

        let stats = engine.stats();
        assert_eq!(stats.inserts, 1);
        assert_eq!(stats.searches, 1);
        assert_eq!(stats.deletes, 0);
        // bootstrap write + leaf write
        assert_eq!(stats.remote_writes, 2);
        // one root read per operation
        assert_eq!(stats.remote_reads, 2);
        assert_eq!(stats.ops_completed, 2);
        assert!(stats.total_latency > std::time::Duration::ZERO);
    }
}
