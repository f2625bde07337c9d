//! # treekeys
//!
//! Child field lookup for tools that walk ESTree-style syntax trees.
//!
//! Given a tree node, which of its fields are child-node references a
//! visitor should recurse into? This crate answers that question two ways:
//!
//! - [`get_keys`] resolves one node's child field names, preferring the
//!   authoritative grammar data and falling back to deriving the answer from
//!   the node's own fields for unknown shapes.
//! - [`union_with`] extends the authoritative table with caller-supplied
//!   entries, producing a new immutable table for custom node types.
//! - [`KEYS`] exposes the authoritative table itself.
//!
//! Nodes are [`serde_json::Value`] objects shared as [`SharedNode`] — the
//! interchange shape parsers and plugins already exchange. The crate never
//! traverses children and never validates node shape; it only reports which
//! field names a caller should follow.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use serde_json::json;
//!
//! let node = Arc::new(json!({
//!     "type": "IfStatement",
//!     "test": { "type": "Identifier", "name": "ready" },
//!     "consequent": { "type": "BlockStatement", "body": [] },
//!     "alternate": null,
//! }));
//!
//! let keys = treekeys::get_keys(&node);
//! assert_eq!(keys.as_ref(), ["test", "consequent", "alternate"]);
//! ```
//!
//! ## Caching
//!
//! Resolution results are cached two ways: a per-node memo holds derived
//! lists behind weak handles (nodes stay caller-owned and reclaimable), and
//! merged tables are memoized by input content, so repeated [`union_with`]
//! calls with equal configuration return the same table instance. Callers
//! needing isolated caches construct their own [`KeyResolver`]; the free
//! functions here share one process-wide default instance.

mod data;
mod filter;
mod memo;
mod merge;
mod resolver;
mod table;

pub use merge::AdditionalKeys;
pub use resolver::{KeyResolver, SharedNode};
pub use table::{KEYS, KeyList, KeyTable};

use std::sync::{Arc, LazyLock};

static SHARED: LazyLock<KeyResolver> = LazyLock::new(KeyResolver::new);

/// Returns the child field names a traversal should follow from `node`.
///
/// Resolves through the shared default [`KeyResolver`]. See
/// [`KeyResolver::get_keys`].
pub fn get_keys(node: &SharedNode) -> KeyList {
    SHARED.get_keys(node)
}

/// Returns the bundled authoritative table extended with `additional`.
///
/// Resolves through the shared default [`KeyResolver`]. See
/// [`KeyResolver::union_with`].
pub fn union_with(additional: &AdditionalKeys) -> Arc<KeyTable> {
    SHARED.union_with(additional)
}
