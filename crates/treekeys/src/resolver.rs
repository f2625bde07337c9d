//! Three-tier key resolution for AST nodes.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::trace;

use crate::data;
use crate::filter;
use crate::memo::NodeMemo;
use crate::merge::{self, AdditionalKeys, MergeMemo};
use crate::table::{KEYS, KeyList, KeyTable};

/// A node shared with the resolver.
///
/// Nodes stay owned by the caller; the resolver records at most a weak
/// handle, so dropping the last caller reference reclaims the node and its
/// memo entry.
pub type SharedNode = Arc<Value>;

/// Resolves the child field names of AST nodes.
///
/// Lookups run through three tiers: an O(1) fast-path table for the node
/// types that dominate real traversals, a per-node memo for everything asked
/// about before, and derivation from the node's own fields as the fallback
/// that handles arbitrary shapes.
///
/// Each resolver owns its caches, so independent configurations in one
/// process do not contaminate each other. The crate-level
/// [`get_keys`](crate::get_keys) and [`union_with`](crate::union_with)
/// functions wrap a shared default instance.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use serde_json::json;
/// use treekeys::KeyResolver;
///
/// let resolver = KeyResolver::new();
/// let node = Arc::new(json!({
///     "type": "BinaryExpression",
///     "operator": "+",
///     "left": { "type": "Literal", "value": 1 },
///     "right": { "type": "Literal", "value": 2 },
/// }));
///
/// assert_eq!(resolver.get_keys(&node).as_ref(), ["left", "right"]);
/// ```
pub struct KeyResolver {
    table: Arc<KeyTable>,
    fast_path: HashMap<String, KeyList>,
    node_memo: NodeMemo,
    merge_memo: MergeMemo,
}

impl KeyResolver {
    /// Creates a resolver over the bundled authoritative table.
    pub fn new() -> Self {
        Self::with_table(Arc::clone(&KEYS))
    }

    /// Creates a resolver over a caller-supplied authoritative table.
    ///
    /// The fast path is populated from `table` for the high-frequency node
    /// types present in it; types the table does not cover resolve through
    /// the memo and derivation tiers.
    pub fn with_table(table: Arc<KeyTable>) -> Self {
        let fast_path = data::FAST_PATH_TYPES
            .iter()
            .filter_map(|node_type| {
                table
                    .get(*node_type)
                    .map(|keys| ((*node_type).to_string(), keys.clone()))
            })
            .collect();
        Self {
            table,
            fast_path,
            node_memo: NodeMemo::new(),
            merge_memo: MergeMemo::new(),
        }
    }

    /// The authoritative table this resolver resolves against.
    pub fn table(&self) -> &Arc<KeyTable> {
        &self.table
    }

    /// Returns the child field names a traversal should follow from `node`.
    ///
    /// Never fails: a node without a recognized `type`, or a value that is
    /// not an object at all, falls through to derivation, which yields an
    /// empty list for non-objects. Repeated calls for the same node instance
    /// return the same list.
    pub fn get_keys(&self, node: &SharedNode) -> KeyList {
        if let Some(keys) = node
            .get("type")
            .and_then(Value::as_str)
            .and_then(|node_type| self.fast_path.get(node_type))
        {
            return keys.clone();
        }
        if let Some(keys) = self.node_memo.get(node) {
            return keys;
        }
        let keys = derive_keys(node);
        if node.is_object() {
            self.node_memo.insert(node, keys.clone());
        }
        keys
    }

    /// Returns the authoritative table extended with `additional`.
    ///
    /// For every node type named in `additional`, the result maps it to the
    /// deduplicated union of the supplied fields and the authoritative entry
    /// (if any); every other entry is unchanged. The result is immutable and
    /// memoized by input content: structurally identical inputs return the
    /// same table instance, in any field order.
    pub fn union_with(&self, additional: &AdditionalKeys) -> Arc<KeyTable> {
        self.merge_memo
            .get_or_compute(additional, |additional| {
                merge::merge_tables(&self.table, additional)
            })
    }
}

impl Default for KeyResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Derives a key list from the node's own fields (the tier-3 fallback).
///
/// Field order follows the node's own field order. Non-objects derive to an
/// empty list.
fn derive_keys(node: &Value) -> KeyList {
    match node.as_object() {
        Some(fields) => {
            trace!(field_count = fields.len(), "deriving keys from node fields");
            fields
                .keys()
                .filter(|name| filter::is_child_field(name))
                .cloned()
                .collect::<Vec<_>>()
                .into()
        }
        None => Vec::new().into(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_fast_path_serves_table_entries() {
        let resolver = KeyResolver::new();
        let node = Arc::new(json!({
            "type": "Program",
            "body": [],
            "sourceType": "module",
        }));

        assert_eq!(resolver.get_keys(&node).as_ref(), ["body"]);
    }

    #[test]
    fn test_fast_path_ignores_extraneous_fields() {
        // A fast-path type resolves from the table, not from node shape, so
        // bookkeeping fields a tool bolted on do not leak into the answer.
        let resolver = KeyResolver::new();
        let node = Arc::new(json!({
            "type": "Identifier",
            "name": "x",
            "decorated": true,
        }));

        assert!(resolver.get_keys(&node).is_empty());
    }

    #[test]
    fn test_derivation_filters_bookkeeping_fields() {
        let resolver = KeyResolver::new();
        let node = Arc::new(json!({
            "parent": null,
            "leadingComments": [],
            "trailingComments": [],
            "_private": 1,
            "type": "Custom",
            "foo": {},
            "bar": {},
        }));

        assert_eq!(resolver.get_keys(&node).as_ref(), ["foo", "bar"]);
    }

    #[test]
    fn test_repeated_queries_return_the_memoized_list() {
        let resolver = KeyResolver::new();
        let node = Arc::new(json!({ "type": "Custom", "foo": {} }));

        let first = resolver.get_keys(&node);
        let second = resolver.get_keys(&node);

        assert_eq!(first, second);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_distinct_instances_derive_independently() {
        let resolver = KeyResolver::new();
        let one = Arc::new(json!({ "type": "Custom", "foo": {} }));
        let other = Arc::new(json!({ "type": "Custom", "foo": {} }));

        let first = resolver.get_keys(&one);
        let second = resolver.get_keys(&other);

        assert_eq!(first, second);
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_node_without_type_derives_from_fields() {
        let resolver = KeyResolver::new();
        let node = Arc::new(json!({ "foo": {}, "_hidden": {} }));

        assert_eq!(resolver.get_keys(&node).as_ref(), ["foo"]);
    }

    #[test]
    fn test_non_object_input_yields_an_empty_list() {
        let resolver = KeyResolver::new();
        for node in [json!(null), json!(42), json!("Program"), json!([1, 2])] {
            let node = Arc::new(node);
            assert!(resolver.get_keys(&node).is_empty());
        }
    }

    #[test]
    fn test_fast_path_agrees_with_derivation() {
        // For every fast-path type, a well-formed node carrying exactly the
        // declared child fields must derive to the same list the fast path
        // serves.
        let resolver = KeyResolver::new();
        let derive_only = KeyResolver::with_table(Arc::new(KeyTable::new()));

        for node_type in data::FAST_PATH_TYPES {
            let declared = KEYS.get(*node_type).expect("fast-path entry");
            let mut fields = serde_json::Map::new();
            fields.insert("type".to_string(), json!(node_type));
            for field in declared.iter() {
                fields.insert(field.clone(), json!(null));
            }
            let node = Arc::new(Value::Object(fields));

            assert_eq!(
                resolver.get_keys(&node),
                derive_only.get_keys(&node),
                "fast path and derivation disagree for {node_type}"
            );
        }
    }

    #[test]
    fn test_custom_table_resolver() {
        let mut table = KeyTable::new();
        table.insert("Program".to_string(), vec!["body".to_string()].into());
        let resolver = KeyResolver::with_table(Arc::new(table));

        let node = Arc::new(json!({ "type": "Program", "body": [] }));
        assert_eq!(resolver.get_keys(&node).as_ref(), ["body"]);

        // Types outside the custom table still resolve via derivation.
        let unknown = Arc::new(json!({ "type": "IfStatement", "test": {} }));
        assert_eq!(resolver.get_keys(&unknown).as_ref(), ["test"]);
    }

    #[test]
    fn test_union_with_returns_the_same_instance_for_equal_inputs() {
        let resolver = KeyResolver::new();
        let spelled_one_way =
            AdditionalKeys::from([("Custom".to_string(), vec!["a".to_string(), "b".to_string()])]);
        let spelled_another =
            AdditionalKeys::from([("Custom".to_string(), vec!["b".to_string(), "a".to_string()])]);

        let first = resolver.union_with(&spelled_one_way);
        let second = resolver.union_with(&spelled_another);

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_resolvers_do_not_share_caches() {
        let one = KeyResolver::new();
        let other = KeyResolver::new();
        let input = AdditionalKeys::from([("Custom".to_string(), vec!["a".to_string()])]);

        let first = one.union_with(&input);
        let second = other.union_with(&input);

        assert_eq!(first, second);
        assert!(!Arc::ptr_eq(&first, &second));
    }
}
