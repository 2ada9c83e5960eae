//! Factory functions for every node kind.
//!
//! The factory for kind `K` is named `create{K}` and takes the kind's schema
//! fields as positional arguments. [`create`] is the one generic
//! implementation behind all of them; [`evaluate`] runs a builder-call
//! expression against it.
//!
//! The second half of this module holds small constructors for the handful
//! of nodes the transform itself writes (calls, arrays, arrows, imports).

use std::fmt;

use crate::compiler::print;
use crate::syntax::{Field, Node, SchemaError, SyntaxKind};

const FACTORY_PREFIX: &str = "create";

/// `createStringLiteral` for [`SyntaxKind::StringLiteral`].
pub fn factory_name(kind: SyntaxKind) -> String {
    format!("{FACTORY_PREFIX}{}", kind.name())
}

/// The kind a factory function builds, if `name` is one.
pub fn kind_for_factory(name: &str) -> Option<SyntaxKind> {
    name.strip_prefix(FACTORY_PREFIX)
        .and_then(SyntaxKind::from_name)
}

/// A factory called with arguments that do not fit the kind's schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactoryError {
    pub kind: SyntaxKind,
    pub error: SchemaError,
}

impl fmt::Display for FactoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", factory_name(self.kind), self.error)
    }
}

impl std::error::Error for FactoryError {}

/// Builds a fresh node of `kind` from positional factory arguments.
pub fn create(kind: SyntaxKind, args: Vec<Field>) -> Result<Node, FactoryError> {
    Node::try_new(kind, args).map_err(|error| FactoryError { kind, error })
}

// =============================================================================
// Evaluation
// =============================================================================

/// Why a builder-call expression could not be evaluated.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// A call to something other than a factory, e.g. a spliced substitution.
    Foreign { callee: String },
    /// `ns.createX` where `X` is not a node kind.
    UnknownFactory { name: String },
    /// An expression form builder calls never contain.
    Unsupported { kind: SyntaxKind },
    /// An array element that is not a node.
    NotANode { found: &'static str },
    Factory(FactoryError),
}

impl EvalError {
    pub fn description(&self) -> &'static str {
        match self {
            EvalError::Foreign { .. } => "call to a non-factory function",
            EvalError::UnknownFactory { .. } => "unknown factory function",
            EvalError::Unsupported { .. } => "unsupported expression in builder call",
            EvalError::NotANode { .. } => "array element is not a node",
            EvalError::Factory(_) => "factory arguments do not fit the schema",
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::Foreign { callee } => write!(f, "{}: `{callee}`", self.description()),
            EvalError::UnknownFactory { name } => write!(f, "{}: `{name}`", self.description()),
            EvalError::Unsupported { kind } => write!(f, "{}: {kind}", self.description()),
            EvalError::NotANode { found } => write!(f, "{}: found {found}", self.description()),
            EvalError::Factory(err) => write!(f, "{}: {err}", self.description()),
        }
    }
}

impl std::error::Error for EvalError {}

impl From<FactoryError> for EvalError {
    fn from(err: FactoryError) -> Self {
        EvalError::Factory(err)
    }
}

/// Evaluates a builder-call expression that produces a single node.
///
/// `namespace` is the identifier the factories are reached through (`ts` in
/// `ts.createIdentifier(...)`).
pub fn evaluate(expr: &Node, namespace: &str) -> Result<Node, EvalError> {
    match evaluate_field(expr, namespace)? {
        Field::Node(node) => Ok(*node),
        other => Err(EvalError::NotANode {
            found: describe(&other),
        }),
    }
}

/// Evaluates a builder-call expression to a factory argument value.
pub fn evaluate_field(expr: &Node, namespace: &str) -> Result<Field, EvalError> {
    match expr.kind() {
        SyntaxKind::CallExpression => {
            let callee = expr.child("expression");
            let Some(kind) = callee.and_then(|c| factory_callee(c, namespace)) else {
                return Err(match callee.and_then(|c| factory_method_name(c, namespace)) {
                    Some(name) => EvalError::UnknownFactory {
                        name: name.to_string(),
                    },
                    None => EvalError::Foreign {
                        callee: callee.map(print).unwrap_or_default(),
                    },
                });
            };
            let args = expr
                .list("arguments")
                .iter()
                .map(|arg| evaluate_field(arg, namespace))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Field::node(create(kind, args)?))
        }
        SyntaxKind::StringLiteral => Ok(Field::str(expr.str("text").unwrap_or_default())),
        SyntaxKind::TrueKeyword => Ok(Field::Bool(true)),
        SyntaxKind::FalseKeyword => Ok(Field::Bool(false)),
        SyntaxKind::Identifier if expr.ident_text() == Some("undefined") => Ok(Field::Absent),
        SyntaxKind::ArrayLiteralExpression => {
            let mut nodes = Vec::new();
            for element in expr.list("elements") {
                match evaluate_field(element, namespace)? {
                    Field::Node(node) => nodes.push(*node),
                    other => {
                        return Err(EvalError::NotANode {
                            found: describe(&other),
                        });
                    }
                }
            }
            Ok(Field::List(nodes))
        }
        kind => Err(EvalError::Unsupported { kind }),
    }
}

fn describe(field: &Field) -> &'static str {
    match field {
        Field::Node(_) => "node",
        Field::List(_) => "node list",
        Field::Str(_) => "string",
        Field::Bool(_) => "boolean",
        Field::Absent => "undefined",
    }
}

/// `name` in `namespace.name`.
fn factory_method_name<'a>(callee: &'a Node, namespace: &str) -> Option<&'a str> {
    if !callee.is(SyntaxKind::PropertyAccessExpression) {
        return None;
    }
    let object = callee.child("expression")?;
    if object.ident_text() != Some(namespace) {
        return None;
    }
    callee.child("name")?.ident_text()
}

/// The kind a `namespace.createK` callee builds.
pub fn factory_callee(callee: &Node, namespace: &str) -> Option<SyntaxKind> {
    factory_method_name(callee, namespace).and_then(kind_for_factory)
}

/// Recognizes `namespace.createK(args...)` for a specific `kind`, returning
/// the arguments.
pub fn match_factory_call<'a>(node: &'a Node, namespace: &str, kind: SyntaxKind) -> Option<&'a [Node]> {
    if !node.is(SyntaxKind::CallExpression) {
        return None;
    }
    let callee = node.child("expression")?;
    (factory_callee(callee, namespace)? == kind).then(|| node.list("arguments"))
}

// =============================================================================
// Node helpers
// =============================================================================

pub fn identifier(text: impl Into<String>) -> Node {
    Node::new(SyntaxKind::Identifier, vec![Field::str(text)])
}

/// A double-quoted string literal.
pub fn string_literal(text: impl Into<String>) -> Node {
    Node::new(
        SyntaxKind::StringLiteral,
        vec![Field::str(text), Field::Bool(false)],
    )
}

pub fn boolean(value: bool) -> Node {
    let kind = if value {
        SyntaxKind::TrueKeyword
    } else {
        SyntaxKind::FalseKeyword
    };
    Node::new(kind, vec![])
}

pub fn undefined() -> Node {
    identifier("undefined")
}

pub fn array(elements: Vec<Node>) -> Node {
    Node::new(SyntaxKind::ArrayLiteralExpression, vec![Field::List(elements)])
}

pub fn property_access(object: Node, name: impl Into<String>) -> Node {
    Node::new(
        SyntaxKind::PropertyAccessExpression,
        vec![Field::node(object), Field::node(identifier(name))],
    )
}

pub fn call(callee: Node, args: Vec<Node>) -> Node {
    Node::new(
        SyntaxKind::CallExpression,
        vec![Field::node(callee), Field::List(vec![]), Field::List(args)],
    )
}

/// `namespace.createK(args...)`
pub fn factory_call(namespace: &str, kind: SyntaxKind, args: Vec<Node>) -> Node {
    call(
        property_access(identifier(namespace), factory_name(kind)),
        args,
    )
}

pub fn parameter(name: impl Into<String>) -> Node {
    Node::new(
        SyntaxKind::Parameter,
        vec![
            Field::Bool(false),
            Field::node(identifier(name)),
            Field::Bool(false),
            Field::Absent,
            Field::Absent,
        ],
    )
}

/// `(params) => body`, where `body` is an expression or a block.
pub fn arrow_function(parameters: Vec<Node>, body: Node) -> Node {
    Node::new(
        SyntaxKind::ArrowFunction,
        vec![
            Field::Bool(false),
            Field::List(vec![]),
            Field::List(parameters),
            Field::Absent,
            Field::node(body),
        ],
    )
}

pub fn block(statements: Vec<Node>) -> Node {
    Node::new(SyntaxKind::Block, vec![Field::List(statements)])
}

pub fn return_statement(expression: Option<Node>) -> Node {
    Node::new(SyntaxKind::ReturnStatement, vec![Field::opt(expression)])
}

/// `const name = initializer;`
pub fn const_statement(name: impl Into<String>, initializer: Node) -> Node {
    let declaration = Node::new(
        SyntaxKind::VariableDeclaration,
        vec![
            Field::node(identifier(name)),
            Field::Absent,
            Field::node(initializer),
        ],
    );
    let list = Node::new(
        SyntaxKind::VariableDeclarationList,
        vec![Field::str("const"), Field::List(vec![declaration])],
    );
    Node::new(
        SyntaxKind::VariableStatement,
        vec![Field::Bool(false), Field::node(list)],
    )
}

/// `import name from "module";`
pub fn default_import(name: impl Into<String>, module: impl Into<String>) -> Node {
    let clause = Node::new(
        SyntaxKind::ImportClause,
        vec![Field::node(identifier(name)), Field::Absent],
    );
    Node::new(
        SyntaxKind::ImportDeclaration,
        vec![Field::node(clause), Field::node(string_literal(module))],
    )
}
