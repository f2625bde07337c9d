//! Identity-keyed memo for derived key lists.
//!
//! Nodes are owned by the caller and the memo must never extend their
//! lifetime, so entries hold a [`Weak`] handle next to the computed list.
//! Entries are keyed by the node's allocation address; the weak handle
//! disambiguates an address that gets reused after the original node died.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde_json::Value;
use tracing::trace;

use crate::table::KeyList;

/// Prune no earlier than this many entries.
const PRUNE_FLOOR: usize = 16;

struct MemoEntry {
    node: Weak<Value>,
    keys: KeyList,
}

/// Weak association from node identity to its derived key list.
///
/// A recorded entry is never recomputed for the same node instance; it is
/// only dropped once the node itself is gone. Dead entries are swept when
/// the map grows past twice its size at the previous sweep.
pub(crate) struct NodeMemo {
    inner: Mutex<MemoInner>,
}

struct MemoInner {
    entries: HashMap<usize, MemoEntry>,
    prune_at: usize,
}

impl NodeMemo {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(MemoInner {
                entries: HashMap::new(),
                prune_at: PRUNE_FLOOR,
            }),
        }
    }

    /// Looks up the memoized key list for this exact node instance.
    pub(crate) fn get(&self, node: &Arc<Value>) -> Option<KeyList> {
        let addr = Arc::as_ptr(node) as usize;
        let mut inner = self.inner.lock();
        if let Some(entry) = inner.entries.get(&addr) {
            if let Some(live) = entry.node.upgrade()
                && Arc::ptr_eq(&live, node)
            {
                return Some(entry.keys.clone());
            }
            // Stale entry from a dead node whose address was reused.
            inner.entries.remove(&addr);
        }
        None
    }

    /// Records the key list computed for this node instance.
    pub(crate) fn insert(&self, node: &Arc<Value>, keys: KeyList) {
        let mut inner = self.inner.lock();
        if inner.entries.len() >= inner.prune_at {
            inner.entries.retain(|_, entry| entry.node.strong_count() > 0);
            inner.prune_at = (inner.entries.len() * 2).max(PRUNE_FLOOR);
            trace!(live = inner.entries.len(), "pruned dead node memo entries");
        }
        inner.entries.insert(
            Arc::as_ptr(node) as usize,
            MemoEntry {
                node: Arc::downgrade(node),
                keys,
            },
        );
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }
}
