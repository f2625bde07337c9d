//! Key list and key table types, plus the authoritative static table.

use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use crate::data;

/// An ordered, deduplicated list of child field names.
///
/// Lists are immutable once built and shared by reference; callers can hold
/// on to a returned list and rely on it never changing.
pub type KeyList = Arc<[String]>;

/// A mapping from node type name to the node's child field names.
pub type KeyTable = BTreeMap<String, KeyList>;

/// The authoritative key table for the bundled ESTree/JSX grammar data.
///
/// Materialized once on first access and read-only for the lifetime of the
/// process. This is the table [`KeyResolver::new`](crate::KeyResolver::new)
/// resolves against and the base that [`union_with`](crate::union_with)
/// extends.
pub static KEYS: LazyLock<Arc<KeyTable>> = LazyLock::new(|| {
    let table = data::VISITOR_KEYS
        .iter()
        .map(|(node_type, keys)| {
            let list: KeyList = keys
                .iter()
                .map(|key| (*key).to_string())
                .collect::<Vec<_>>()
                .into();
            ((*node_type).to_string(), list)
        })
        .collect();
    Arc::new(table)
});
