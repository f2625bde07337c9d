//! Bundled visitor key data for the ESTree grammar (plus JSX).
//!
//! Each entry maps a node type name to the node's child-reference fields,
//! in the order a traversal should follow them. The values come from the
//! ESTree specification and cannot be changed; other fields a node carries
//! (`name`, `value`, `operator`, ranges) are plain data, not children, and
//! are deliberately absent here.

/// Child field names per node type.
pub(crate) static VISITOR_KEYS: &[(&str, &[&str])] = &[
    ("ArrayExpression", &["elements"]),
    ("ArrayPattern", &["elements"]),
    ("ArrowFunctionExpression", &["params", "body"]),
    ("AssignmentExpression", &["left", "right"]),
    ("AssignmentPattern", &["left", "right"]),
    ("AwaitExpression", &["argument"]),
    ("BinaryExpression", &["left", "right"]),
    ("BlockStatement", &["body"]),
    ("BreakStatement", &["label"]),
    ("CallExpression", &["callee", "arguments"]),
    ("CatchClause", &["param", "body"]),
    ("ChainExpression", &["expression"]),
    ("ClassBody", &["body"]),
    ("ClassDeclaration", &["id", "superClass", "body"]),
    ("ClassExpression", &["id", "superClass", "body"]),
    ("ConditionalExpression", &["test", "consequent", "alternate"]),
    ("ContinueStatement", &["label"]),
    ("DebuggerStatement", &[]),
    ("DoWhileStatement", &["body", "test"]),
    ("EmptyStatement", &[]),
    ("ExportAllDeclaration", &["exported", "source"]),
    ("ExportDefaultDeclaration", &["declaration"]),
    ("ExportNamedDeclaration", &["declaration", "specifiers", "source"]),
    ("ExportSpecifier", &["exported", "local"]),
    ("ExpressionStatement", &["expression"]),
    ("ForInStatement", &["left", "right", "body"]),
    ("ForOfStatement", &["left", "right", "body"]),
    ("ForStatement", &["init", "test", "update", "body"]),
    ("FunctionDeclaration", &["id", "params", "body"]),
    ("FunctionExpression", &["id", "params", "body"]),
    ("Identifier", &[]),
    ("IfStatement", &["test", "consequent", "alternate"]),
    ("ImportDeclaration", &["specifiers", "source"]),
    ("ImportDefaultSpecifier", &["local"]),
    ("ImportExpression", &["source"]),
    ("ImportNamespaceSpecifier", &["local"]),
    ("ImportSpecifier", &["imported", "local"]),
    ("JSXAttribute", &["name", "value"]),
    ("JSXClosingElement", &["name"]),
    ("JSXClosingFragment", &[]),
    ("JSXElement", &["openingElement", "children", "closingElement"]),
    ("JSXEmptyExpression", &[]),
    ("JSXExpressionContainer", &["expression"]),
    ("JSXFragment", &["openingFragment", "children", "closingFragment"]),
    ("JSXIdentifier", &[]),
    ("JSXMemberExpression", &["object", "property"]),
    ("JSXNamespacedName", &["namespace", "name"]),
    ("JSXOpeningElement", &["name", "attributes"]),
    ("JSXOpeningFragment", &[]),
    ("JSXSpreadAttribute", &["argument"]),
    ("JSXSpreadChild", &["expression"]),
    ("JSXText", &[]),
    ("LabeledStatement", &["label", "body"]),
    ("Literal", &[]),
    ("LogicalExpression", &["left", "right"]),
    ("MemberExpression", &["object", "property"]),
    ("MetaProperty", &["meta", "property"]),
    ("MethodDefinition", &["key", "value"]),
    ("NewExpression", &["callee", "arguments"]),
    ("ObjectExpression", &["properties"]),
    ("ObjectPattern", &["properties"]),
    ("PrivateIdentifier", &[]),
    ("Program", &["body"]),
    ("Property", &["key", "value"]),
    ("PropertyDefinition", &["key", "value"]),
    ("RestElement", &["argument"]),
    ("ReturnStatement", &["argument"]),
    ("SequenceExpression", &["expressions"]),
    ("SpreadElement", &["argument"]),
    ("StaticBlock", &["body"]),
    ("Super", &[]),
    ("SwitchCase", &["test", "consequent"]),
    ("SwitchStatement", &["discriminant", "cases"]),
    ("TaggedTemplateExpression", &["tag", "quasi"]),
    ("TemplateElement", &[]),
    ("TemplateLiteral", &["quasis", "expressions"]),
    ("ThisExpression", &[]),
    ("ThrowStatement", &["argument"]),
    ("TryStatement", &["block", "handler", "finalizer"]),
    ("UnaryExpression", &["argument"]),
    ("UpdateExpression", &["argument"]),
    ("VariableDeclaration", &["declarations"]),
    ("VariableDeclarator", &["id", "init"]),
    ("WhileStatement", &["test", "body"]),
    ("WithStatement", &["object", "body"]),
    ("YieldExpression", &["argument"]),
];

/// Node types served by the resolver's fast path.
///
/// These are the types that dominate real traversals. The fast-path table is
/// populated from [`VISITOR_KEYS`] at construction time, so this list only
/// selects entries; it can never diverge from the authoritative data.
pub(crate) static FAST_PATH_TYPES: &[&str] = &[
    "ArrayExpression",
    "ArrowFunctionExpression",
    "AssignmentExpression",
    "BinaryExpression",
    "BlockStatement",
    "CallExpression",
    "ExpressionStatement",
    "FunctionDeclaration",
    "FunctionExpression",
    "Identifier",
    "IfStatement",
    "Literal",
    "LogicalExpression",
    "MemberExpression",
    "ObjectExpression",
    "Program",
    "Property",
    "ReturnStatement",
    "TemplateLiteral",
    "VariableDeclaration",
    "VariableDeclarator",
];
