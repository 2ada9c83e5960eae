//! Uniform syntax tree for the host language.
//!
//! Every node is a [`SyntaxKind`] plus an ordered list of [`Field`]s. The
//! per-kind field layout lives in one table ([`SyntaxKind::schema`]) that the
//! parser, the factories, the printer and the builder-call synthesizer all
//! read. Nothing outside this module needs a hand-written case per kind to
//! walk or rebuild a tree.
//!
//! Kind names follow TypeScript's `SyntaxKind` so that generated factory
//! calls read like `ts.createStringLiteral(...)`.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

// =============================================================================
// Identity and spans
// =============================================================================

static NEXT_NODE_ID: AtomicU32 = AtomicU32::new(1);

/// Process-unique node identity.
///
/// Semantic tables are keyed by `NodeId`, so ids are never reused, even
/// across files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// Allocates a new id.
    pub fn fresh() -> Self {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Byte range in the source a node was parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// Span of synthesized nodes.
    pub const DUMMY: Span = Span {
        start: usize::MAX,
        end: usize::MAX,
    };

    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn is_dummy(&self) -> bool {
        *self == Self::DUMMY
    }

    /// Joins two spans. A dummy side yields the other side.
    pub fn to(self, other: Span) -> Span {
        if self.is_dummy() {
            return other;
        }
        if other.is_dummy() {
            return self;
        }
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::DUMMY
    }
}

// =============================================================================
// Schema
// =============================================================================

/// The shape a field of a node kind takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldShape {
    /// A required child node.
    Node,
    /// An optional child node.
    OptNode,
    /// A sequence of child nodes.
    List,
    /// A literal string scalar (identifier text, literal text, operator).
    Str,
    /// A literal boolean scalar (modifiers, flags).
    Bool,
}

impl FieldShape {
    pub fn name(self) -> &'static str {
        match self {
            FieldShape::Node => "node",
            FieldShape::OptNode => "optional node",
            FieldShape::List => "node list",
            FieldShape::Str => "string",
            FieldShape::Bool => "boolean",
        }
    }
}

/// One entry of a kind's field layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub shape: FieldShape,
}

macro_rules! syntax_kinds {
    ($( $(#[$doc:meta])* $kind:ident { $($field:literal : $shape:ident),* $(,)? } )*) => {
        /// All node kinds of the host language.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(u16)]
        pub enum SyntaxKind {
            $( $(#[$doc])* $kind, )*
        }

        impl SyntaxKind {
            /// Every kind, in declaration order.
            pub const ALL: &'static [SyntaxKind] = &[$(SyntaxKind::$kind),*];

            /// The kind's name, e.g. `"StringLiteral"`.
            pub fn name(self) -> &'static str {
                match self {
                    $(SyntaxKind::$kind => stringify!($kind),)*
                }
            }

            /// Ordered field layout of this kind.
            pub fn schema(self) -> &'static [FieldSpec] {
                match self {
                    $(SyntaxKind::$kind => &[
                        $(FieldSpec { name: $field, shape: FieldShape::$shape }),*
                    ],)*
                }
            }

            pub fn from_name(name: &str) -> Option<SyntaxKind> {
                match name {
                    $(stringify!($kind) => Some(SyntaxKind::$kind),)*
                    _ => None,
                }
            }
        }
    };
}

syntax_kinds! {
    // Module structure
    SourceFile { "statements": List }
    ImportDeclaration { "importClause": OptNode, "moduleSpecifier": Node }
    ImportClause { "name": OptNode, "namedBindings": OptNode }
    NamespaceImport { "name": Node }
    NamedImports { "elements": List }
    ImportSpecifier { "propertyName": OptNode, "name": Node }

    // Declarations and statements
    VariableStatement { "exported": Bool, "declarationList": Node }
    /// `keyword` is one of `const`, `let`, `var`.
    VariableDeclarationList { "keyword": Str, "declarations": List }
    VariableDeclaration { "name": Node, "type": OptNode, "initializer": OptNode }
    FunctionDeclaration {
        "exported": Bool,
        "async": Bool,
        "name": OptNode,
        "typeParameters": List,
        "parameters": List,
        "type": OptNode,
        "body": OptNode,
    }
    Parameter {
        "dotDotDotToken": Bool,
        "name": Node,
        "questionToken": Bool,
        "type": OptNode,
        "initializer": OptNode,
    }
    TypeParameter { "name": Node, "constraint": OptNode, "default": OptNode }
    Block { "statements": List }
    ExpressionStatement { "expression": Node }
    ReturnStatement { "expression": OptNode }
    IfStatement { "expression": Node, "thenStatement": Node, "elseStatement": OptNode }
    ThrowStatement { "expression": Node }
    EmptyStatement {}

    // Expressions
    Identifier { "text": Str }
    StringLiteral { "text": Str, "singleQuote": Bool }
    NumericLiteral { "text": Str }
    TrueKeyword {}
    FalseKeyword {}
    NullKeyword {}
    ThisKeyword {}
    NoSubstitutionTemplateLiteral { "text": Str }
    TemplateExpression { "head": Str, "templateSpans": List }
    TemplateSpan { "expression": Node, "literal": Str }
    TaggedTemplateExpression { "tag": Node, "typeArguments": List, "template": Node }
    ArrowFunction {
        "async": Bool,
        "typeParameters": List,
        "parameters": List,
        "type": OptNode,
        "body": Node,
    }
    FunctionExpression {
        "async": Bool,
        "name": OptNode,
        "typeParameters": List,
        "parameters": List,
        "type": OptNode,
        "body": Node,
    }
    CallExpression { "expression": Node, "typeArguments": List, "arguments": List }
    NewExpression { "expression": Node, "typeArguments": List, "arguments": List }
    PropertyAccessExpression { "expression": Node, "name": Node }
    ElementAccessExpression { "expression": Node, "argumentExpression": Node }
    ParenthesizedExpression { "expression": Node }
    ArrayLiteralExpression { "elements": List }
    ObjectLiteralExpression { "properties": List }
    PropertyAssignment { "name": Node, "initializer": Node }
    ShorthandPropertyAssignment { "name": Node }
    SpreadAssignment { "expression": Node }
    SpreadElement { "expression": Node }
    BinaryExpression { "left": Node, "operator": Str, "right": Node }
    PrefixUnaryExpression { "operator": Str, "operand": Node }
    ConditionalExpression { "condition": Node, "whenTrue": Node, "whenFalse": Node }
    AsExpression { "expression": Node, "type": Node }

    // Types
    TypeReference { "typeName": Node, "typeArguments": List }
    QualifiedName { "left": Node, "right": Node }
    /// `keyword` is the keyword text, e.g. `string` or `void`.
    KeywordType { "keyword": Str }
    TypeLiteral { "members": List }
    PropertySignature { "name": Node, "questionToken": Bool, "type": OptNode }
    ArrayType { "elementType": Node }
    UnionType { "types": List }
    LiteralType { "literal": Node }
    FunctionType { "typeParameters": List, "parameters": List, "type": Node }
}

impl SyntaxKind {
    /// Position of a named field in this kind's schema.
    pub fn field_index(self, name: &str) -> Option<usize> {
        self.schema().iter().position(|spec| spec.name == name)
    }

    /// Kinds that introduce a function scope.
    pub fn is_function_like(self) -> bool {
        matches!(
            self,
            SyntaxKind::FunctionDeclaration
                | SyntaxKind::FunctionExpression
                | SyntaxKind::ArrowFunction
        )
    }

    pub fn is_statement(self) -> bool {
        matches!(
            self,
            SyntaxKind::ImportDeclaration
                | SyntaxKind::VariableStatement
                | SyntaxKind::FunctionDeclaration
                | SyntaxKind::Block
                | SyntaxKind::ExpressionStatement
                | SyntaxKind::ReturnStatement
                | SyntaxKind::IfStatement
                | SyntaxKind::ThrowStatement
                | SyntaxKind::EmptyStatement
        )
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Fields and nodes
// =============================================================================

/// A field value of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Node(Box<Node>),
    List(Vec<Node>),
    Str(String),
    Bool(bool),
    /// An absent optional child.
    Absent,
}

impl Field {
    pub fn node(node: Node) -> Field {
        Field::Node(Box::new(node))
    }

    pub fn opt(node: Option<Node>) -> Field {
        match node {
            Some(node) => Field::node(node),
            None => Field::Absent,
        }
    }

    pub fn str(text: impl Into<String>) -> Field {
        Field::Str(text.into())
    }

    /// Whether this value is acceptable for a field of the given shape.
    pub fn fits(&self, shape: FieldShape) -> bool {
        matches!(
            (self, shape),
            (Field::Node(_), FieldShape::Node)
                | (Field::Node(_), FieldShape::OptNode)
                | (Field::Absent, FieldShape::OptNode)
                | (Field::List(_), FieldShape::List)
                | (Field::Str(_), FieldShape::Str)
                | (Field::Bool(_), FieldShape::Bool)
        )
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Field::Node(node) => Some(node),
            _ => None,
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Field::Node(_) => "node",
            Field::List(_) => "node list",
            Field::Str(_) => "string",
            Field::Bool(_) => "boolean",
            Field::Absent => "absent",
        }
    }
}

/// A field list that does not match a kind's schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    Arity {
        kind: SyntaxKind,
        expected: usize,
        found: usize,
    },
    Shape {
        kind: SyntaxKind,
        field: &'static str,
        expected: FieldShape,
        found: &'static str,
    },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::Arity {
                kind,
                expected,
                found,
            } => write!(f, "{kind} takes {expected} fields, got {found}"),
            SchemaError::Shape {
                kind,
                field,
                expected,
                found,
            } => write!(
                f,
                "field `{field}` of {kind} expects a {}, got {found}",
                expected.name()
            ),
        }
    }
}

impl std::error::Error for SchemaError {}

/// Checks a field list against a kind's schema.
pub fn check_fields(kind: SyntaxKind, fields: &[Field]) -> Result<(), SchemaError> {
    let schema = kind.schema();
    if schema.len() != fields.len() {
        return Err(SchemaError::Arity {
            kind,
            expected: schema.len(),
            found: fields.len(),
        });
    }
    for (spec, field) in schema.iter().zip(fields) {
        if !field.fits(spec.shape) {
            return Err(SchemaError::Shape {
                kind,
                field: spec.name,
                expected: spec.shape,
                found: field.describe(),
            });
        }
    }
    Ok(())
}

/// An immutable tree node.
///
/// Equality is structural: kind and fields are compared, ids and spans are
/// not.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    kind: SyntaxKind,
    span: Span,
    fields: Vec<Field>,
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.fields == other.fields
    }
}

impl Node {
    /// Creates a node. The field list must follow the kind's schema; the
    /// parser and factories guarantee this, so it is only debug-checked here.
    pub fn new(kind: SyntaxKind, fields: Vec<Field>) -> Node {
        debug_assert_eq!(check_fields(kind, &fields), Ok(()));
        Node {
            id: NodeId::fresh(),
            kind,
            span: Span::DUMMY,
            fields,
        }
    }

    /// Creates a node after validating the field list.
    pub fn try_new(kind: SyntaxKind, fields: Vec<Field>) -> Result<Node, SchemaError> {
        check_fields(kind, &fields)?;
        Ok(Node::new(kind, fields))
    }

    pub fn with_span(mut self, span: Span) -> Node {
        self.span = span;
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn is(&self, kind: SyntaxKind) -> bool {
        self.kind == kind
    }

    /// Field values in schema order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Field values paired with their schema entries.
    pub fn named_fields(&self) -> impl Iterator<Item = (&'static FieldSpec, &Field)> + '_ {
        self.kind.schema().iter().zip(self.fields.iter())
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.kind
            .field_index(name)
            .and_then(|index| self.fields.get(index))
    }

    /// A present child node.
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.field(name).and_then(Field::as_node)
    }

    /// A node list; empty when the field is not a list.
    pub fn list(&self, name: &str) -> &[Node] {
        match self.field(name) {
            Some(Field::List(nodes)) => nodes,
            _ => &[],
        }
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        match self.field(name) {
            Some(Field::Str(text)) => Some(text),
            _ => None,
        }
    }

    pub fn flag(&self, name: &str) -> bool {
        matches!(self.field(name), Some(Field::Bool(true)))
    }

    /// Text of an `Identifier` node.
    pub fn ident_text(&self) -> Option<&str> {
        if self.kind == SyntaxKind::Identifier {
            self.str("text")
        } else {
            None
        }
    }

    /// All child nodes in field order, list elements flattened.
    pub fn children(&self) -> Vec<&Node> {
        let mut out = Vec::new();
        for field in &self.fields {
            match field {
                Field::Node(node) => out.push(&**node),
                Field::List(nodes) => out.extend(nodes.iter()),
                _ => {}
            }
        }
        out
    }

    /// Rebuilds this node with every child node mapped through `f`.
    ///
    /// The result keeps this node's id and span: it is the same logical node
    /// with new children.
    pub fn map_children(&self, f: &mut dyn FnMut(&Node) -> Node) -> Node {
        let fields = self
            .fields
            .iter()
            .map(|field| match field {
                Field::Node(node) => Field::node(f(node)),
                Field::List(nodes) => Field::List(nodes.iter().map(&mut *f).collect()),
                other => other.clone(),
            })
            .collect();
        Node {
            id: self.id,
            kind: self.kind,
            span: self.span,
            fields,
        }
    }

    /// Fallible [`map_children`](Node::map_children); stops at the first
    /// error.
    pub fn try_map_children<E>(
        &self,
        mut f: impl FnMut(&Node) -> Result<Node, E>,
    ) -> Result<Node, E> {
        let mut fields = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            fields.push(match field {
                Field::Node(node) => Field::node(f(node)?),
                Field::List(nodes) => Field::List(nodes.iter().map(&mut f).collect::<Result<_, E>>()?),
                other => other.clone(),
            });
        }
        Ok(Node {
            id: self.id,
            kind: self.kind,
            span: self.span,
            fields,
        })
    }

    /// Builds a new node of the same kind from this node's fields mapped
    /// through `f`, in schema order. The result has a fresh id and no span.
    pub fn rebuild(&self, mut f: impl FnMut(&Field) -> Field) -> Node {
        Node::new(self.kind, self.fields.iter().map(&mut f).collect())
    }

    /// Replaces one named field, keeping id and span.
    pub fn with_field(&self, name: &str, value: Field) -> Node {
        let mut fields = self.fields.clone();
        if let Some(index) = self.kind.field_index(name) {
            fields[index] = value;
        }
        debug_assert_eq!(check_fields(self.kind, &fields), Ok(()));
        Node {
            id: self.id,
            kind: self.kind,
            span: self.span,
            fields,
        }
    }

    /// Visits this node and its descendants in pre-order.
    pub fn walk<'a>(&'a self, f: &mut dyn FnMut(&'a Node)) {
        f(self);
        for child in self.children() {
            child.walk(f);
        }
    }

    /// Whether any node in this subtree satisfies `pred`.
    pub fn any(&self, pred: &dyn Fn(&Node) -> bool) -> bool {
        pred(self) || self.children().into_iter().any(|child| child.any(pred))
    }

    /// Number of nodes in this subtree.
    pub fn size(&self) -> usize {
        1 + self
            .children()
            .into_iter()
            .map(Node::size)
            .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(text: &str) -> Node {
        Node::new(SyntaxKind::Identifier, vec![Field::str(text)])
    }

    #[test]
    fn test_schema_names_are_unique_per_kind() {
        for kind in SyntaxKind::ALL {
            let schema = kind.schema();
            for (i, spec) in schema.iter().enumerate() {
                assert!(
                    schema[i + 1..].iter().all(|other| other.name != spec.name),
                    "duplicate field `{}` in {}",
                    spec.name,
                    kind
                );
            }
        }
    }

    #[test]
    fn test_from_name_round_trips_every_kind() {
        for kind in SyntaxKind::ALL {
            assert_eq!(SyntaxKind::from_name(kind.name()), Some(*kind));
        }
        assert_eq!(SyntaxKind::from_name("NotAKind"), None);
    }

    #[test]
    fn test_structural_equality_ignores_ids_and_spans() {
        let a = ident("x").with_span(Span::new(0, 1));
        let b = ident("x");
        assert_ne!(a.id(), b.id());
        assert_eq!(a, b);
        assert_ne!(a, ident("y"));
    }

    #[test]
    fn test_check_fields_reports_arity_and_shape() {
        assert_eq!(
            check_fields(SyntaxKind::Identifier, &[]),
            Err(SchemaError::Arity {
                kind: SyntaxKind::Identifier,
                expected: 1,
                found: 0
            })
        );
        let err = check_fields(SyntaxKind::ReturnStatement, &[Field::Bool(true)]).unwrap_err();
        assert!(err.to_string().contains("`expression`"));
        assert!(check_fields(SyntaxKind::ReturnStatement, &[Field::Absent]).is_ok());
        assert!(check_fields(SyntaxKind::ExpressionStatement, &[Field::Absent]).is_err());
    }

    #[test]
    fn test_accessors() {
        let call = Node::new(
            SyntaxKind::CallExpression,
            vec![
                Field::node(ident("f")),
                Field::List(vec![]),
                Field::List(vec![ident("a"), ident("b")]),
            ],
        );
        assert_eq!(call.child("expression").and_then(Node::ident_text), Some("f"));
        assert_eq!(call.list("arguments").len(), 2);
        assert!(call.list("typeArguments").is_empty());
        assert_eq!(call.children().len(), 3);
        assert_eq!(call.size(), 4);
    }

    #[test]
    fn test_rebuild_makes_a_new_node() {
        let stmt = Node::new(SyntaxKind::ExpressionStatement, vec![Field::node(ident("a"))])
            .with_span(Span::new(0, 2));
        let rebuilt = stmt.rebuild(|field| match field {
            Field::Node(_) => Field::node(ident("b")),
            other => other.clone(),
        });
        assert_ne!(rebuilt.id(), stmt.id());
        assert!(rebuilt.span().is_dummy());
        assert_eq!(
            rebuilt.child("expression").and_then(Node::ident_text),
            Some("b")
        );
    }

    #[test]
    fn test_try_map_children_stops_at_error() {
        let call = Node::new(
            SyntaxKind::CallExpression,
            vec![
                Field::node(ident("f")),
                Field::List(vec![]),
                Field::List(vec![ident("a"), ident("bad")]),
            ],
        );
        let result = call.try_map_children(|child| match child.ident_text() {
            Some("bad") => Err("bad child"),
            _ => Ok(child.clone()),
        });
        assert_eq!(result.unwrap_err(), "bad child");
        let same = call.try_map_children(|child| Ok::<_, ()>(child.clone())).unwrap();
        assert_eq!(same.id(), call.id());
    }

    #[test]
    fn test_map_children_keeps_identity() {
        let stmt = Node::new(SyntaxKind::ExpressionStatement, vec![Field::node(ident("a"))]);
        let mapped = stmt.map_children(&mut |_| ident("b"));
        assert_eq!(mapped.id(), stmt.id());
        assert_eq!(
            mapped.child("expression").and_then(Node::ident_text),
            Some("b")
        );
        // The original is untouched.
        assert_eq!(
            stmt.child("expression").and_then(Node::ident_text),
            Some("a")
        );
    }
}
