//! Per-in-flight-operation state.
//!
//! Every client operation is carried forward through its remote-request
//! continuations as an [`Operation`] record. The record is keyed by the
//! id of its outstanding request: on each completion it is looked up,
//! advanced, and re-inserted under the id of the next request it issues.

use std::time::{Duration, Instant};
use tether_common::TreeNode;

/// What a pending operation is trying to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    /// Insert or update a key/value pair.
    Insert {
        /// Key to insert.
        key: u64,
        /// Value to store.
        value: u64,
    },
    /// Look up a key.
    Search {
        /// Key to find.
        key: u64,
    },
    /// Write the initial empty root during tree bootstrap.
    InitRoot,
}

impl OpKind {
    /// The key this operation targets (0 for bootstrap).
    pub fn key(&self) -> u64 {
        match self {
            OpKind::Insert { key, .. } | OpKind::Search { key } => *key,
            OpKind::InitRoot => 0,
        }
    }
}

/// Phase of an in-flight split sequence.
///
/// Phases are totally ordered within one split:
/// `WriteOld` then `WriteNew`, then either `WriteRoot` (root promotion)
/// or `ReadParent`/`FindParent` then `UpdateParent`. A parent that turns
/// out to be full restarts the sequence one level up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitPhase {
    /// No split in progress; reads advance the traversal.
    None,
    /// Writing the truncated left half back.
    WriteOld,
    /// Writing the freshly allocated right sibling.
    WriteNew,
    /// Writing the new internal root of a root split.
    WriteRoot,
    /// Reading the parent recorded on the traversal path.
    ReadParent,
    /// Re-traversing from the root to locate a lost parent.
    FindParent,
    /// Writing the parent with the separator inserted.
    UpdateParent,
}

/// State of one in-flight operation.
#[derive(Debug, Clone)]
pub struct Operation {
    /// What the operation does.
    pub kind: OpKind,
    /// Tree level of the node the cursor is on (root = 0).
    pub current_level: u32,
    /// Remote address the cursor is on.
    pub current_addr: u64,
    /// Snapshots of every node read on the way down, oldest first.
    /// The parent of a split node is the entry just above it.
    pub path: Vec<TreeNode>,
    /// Current split phase.
    pub split: SplitPhase,
    /// Index in `path` of the node currently being split.
    pub split_depth: usize,
    /// Truncated left half of the split.
    pub old_node: Option<TreeNode>,
    /// Freshly allocated right sibling.
    pub new_node: Option<TreeNode>,
    /// Key promoted (or copied up, for leaves) into the parent.
    pub separator_key: u64,
    /// Parent address, 0 while unknown.
    pub parent_addr: u64,
    /// The node being split is the root.
    pub is_root_split: bool,
    /// An existing key's value was overwritten.
    pub updated: bool,
    /// At least one split ran while serving this operation.
    pub split_happened: bool,
    /// When the operation was launched.
    pub started_at: Instant,
}

impl Operation {
    /// Creates a fresh operation about to read the root.
    pub fn new(kind: OpKind, root_addr: u64) -> Self {
        Self {
            kind,
            current_level: 0,
            current_addr: root_addr,
            path: Vec::new(),
            split: SplitPhase::None,
            split_depth: 0,
            old_node: None,
            new_node: None,
            separator_key: 0,
            parent_addr: 0,
            is_root_split: false,
            updated: false,
            split_happened: false,
            started_at: Instant::now(),
        }
    }

    /// The key this operation targets.
    pub fn key(&self) -> u64 {
        self.kind.key()
    }
}

/// Completed-operation outcome surfaced to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A search resolved; `value` is `None` when the key was absent.
    Searched {
        /// Key looked up.
        key: u64,
        /// Stored value, if found.
        value: Option<u64>,
    },
    /// An insert committed.
    Inserted {
        /// Key written.
        key: u64,
        /// A new key was added (false when an existing value was replaced).
        inserted: bool,
        /// An existing value was overwritten in place.
        updated: bool,
        /// The insert triggered at least one node split.
        split_happened: bool,
    },
}

/// A finished operation with its observed latency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpResult {
    /// What happened.
    pub outcome: Outcome,
    /// Completion time minus start time.
    pub latency: Duration,
}
