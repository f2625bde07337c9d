//! Key table union and its content-keyed result memo.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::table::KeyTable;

/// Extra child field names per node type, as supplied by a caller.
///
/// Typically built from plugin or rule configuration to teach the resolver
/// about node types the bundled grammar data does not cover.
pub type AdditionalKeys = BTreeMap<String, Vec<String>>;

/// Memo from input content to the merged table built from it.
///
/// Entries live for the owning resolver's lifetime. Growth is bounded by the
/// number of distinct configurations a process loads, not by node volume.
pub(crate) struct MergeMemo {
    results: Mutex<HashMap<String, Arc<KeyTable>>>,
}

impl MergeMemo {
    pub(crate) fn new() -> Self {
        Self {
            results: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the memoized merge result for `additional`, computing and
    /// recording it on first use.
    pub(crate) fn get_or_compute(
        &self,
        additional: &AdditionalKeys,
        compute: impl FnOnce(&AdditionalKeys) -> KeyTable,
    ) -> Arc<KeyTable> {
        let key = content_key(additional);
        if let Some(merged) = self.results.lock().get(&key) {
            return Arc::clone(merged);
        }
        debug!(types = additional.len(), "merging additional visitor keys");
        let merged = Arc::new(compute(additional));
        // A racing caller may have inserted the same key meanwhile; both
        // computed the same table, keep whichever landed first.
        Arc::clone(self.results.lock().entry(key).or_insert(merged))
    }
}

/// Canonical content key for a caller-supplied table.
///
/// Type names iterate in sorted order (the input is a `BTreeMap`) and field
/// names are sorted and deduplicated before hashing, so two inputs that are
/// equal as sets of fields hash to the same key regardless of spelling order.
///
/// The serialization is injective: every string is length-prefixed and each
/// type records its field count, so no byte sequence inside a name can fake
/// a boundary between names or entries. Distinct inputs therefore never
/// share a memo entry.
fn content_key(additional: &AdditionalKeys) -> String {
    let mut hasher = blake3::Hasher::new();
    for (node_type, keys) in additional {
        hash_string(&mut hasher, node_type);
        let mut sorted: Vec<&str> = keys.iter().map(String::as_str).collect();
        sorted.sort_unstable();
        sorted.dedup();
        hasher.update(&(sorted.len() as u64).to_le_bytes());
        for key in sorted {
            hash_string(&mut hasher, key);
        }
    }
    hasher.finalize().to_hex().to_string()
}

fn hash_string(hasher: &mut blake3::Hasher, value: &str) {
    hasher.update(&(value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}

/// Builds the union of `base` and the supplied entries.
///
/// For each node type named in `additional` the result maps it to the
/// deduplicated union of the supplied fields and the base entry, supplied
/// fields first. Every other base entry carries over unchanged (the lists
/// are shared, not copied).
pub(crate) fn merge_tables(base: &KeyTable, additional: &AdditionalKeys) -> KeyTable {
    let mut merged = base.clone();
    for (node_type, extra) in additional {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut union: Vec<String> = Vec::new();
        for key in extra {
            if seen.insert(key.as_str()) {
                union.push(key.clone());
            }
        }
        if let Some(existing) = base.get(node_type) {
            for key in existing.iter() {
                if seen.insert(key.as_str()) {
                    union.push(key.clone());
                }
            }
        }
        merged.insert(node_type.clone(), union.into());
    }
    merged
}
