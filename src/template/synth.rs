//! Builder-call synthesis: one generic rule over the schema table turns any
//! tree into the calls that rebuild it.

use crate::factory::{array, boolean, factory_call, string_literal, undefined};
use crate::syntax::{Field, Node, SyntaxKind};

/// Synthesizes the builder-call expression for a parsed fragment.
///
/// One expression statement yields the expression's builder call and one
/// other statement that statement's; several statements yield an array of
/// statement builder calls. An empty fragment builds an empty statement.
pub fn synthesize(fragment: &Node, namespace: &str) -> Node {
    match fragment.list("statements") {
        [] => factory_call(namespace, SyntaxKind::EmptyStatement, vec![]),
        [statement] => match statement.child("expression") {
            Some(expression) if statement.is(SyntaxKind::ExpressionStatement) => {
                builder_call(expression, namespace)
            }
            _ => builder_call(statement, namespace),
        },
        statements => array(
            statements
                .iter()
                .map(|statement| builder_call(statement, namespace))
                .collect(),
        ),
    }
}

/// `namespace.createK(...)` with one argument per schema field of `node`.
pub fn builder_call(node: &Node, namespace: &str) -> Node {
    let args = node
        .fields()
        .iter()
        .map(|field| encode_field(field, namespace))
        .collect();
    factory_call(namespace, node.kind(), args)
}

fn encode_field(field: &Field, namespace: &str) -> Node {
    match field {
        Field::Node(child) => builder_call(child, namespace),
        Field::List(children) => array(
            children
                .iter()
                .map(|child| builder_call(child, namespace))
                .collect(),
        ),
        Field::Str(text) => string_literal(text.as_str()),
        Field::Bool(value) => boolean(*value),
        Field::Absent => undefined(),
    }
}
