//! Field filter for the derivation path.
//!
//! Decides which of a node's own fields count as child references. This is
//! a heuristic over field names, not values: a grammar-relevant field that
//! happens to start with an underscore is dropped, and a cosmetically public
//! bookkeeping field added by some other tool is kept. That trade-off is
//! accepted; inspecting values would make the answer depend on node contents.

/// Bookkeeping fields that never reference children. `type` is the node's
/// own tag, the rest are attachments a parser or walker hangs on a node.
const RESERVED_FIELDS: &[&str] = &["type", "parent", "leadingComments", "trailingComments"];

/// Returns true if `name` denotes a child-reference field.
///
/// A leading underscore marks a field as private/internal by convention.
pub(crate) fn is_child_field(name: &str) -> bool {
    !name.starts_with('_') && !RESERVED_FIELDS.contains(&name)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("body", true)]
    #[case("elements", true)]
    #[case("leadingComments", false)]
    #[case("trailingComments", false)]
    #[case("parent", false)]
    #[case("type", false)]
    #[case("_private", false)]
    #[case("_", false)]
    #[case("", true)]
    #[case("typeAnnotation", true)]
    #[case("parentheses", true)]
    fn test_is_child_field(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_child_field(name), expected);
    }
}
