//! Splicing substitutions back into a builder-call tree.

use super::contract::{contract_for, patterns};
use super::placeholder::PlaceholderRegistry;
use crate::ctxt::StructuralRole;
use crate::syntax::{Field, Node, Span};

/// A registered placeholder no builder call matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unspliced {
    pub token: String,
    pub role: StructuralRole,
    pub span: Span,
}

#[derive(Debug)]
pub struct Spliced {
    pub tree: Node,
    pub mismatches: Vec<Unspliced>,
}

/// Replaces every builder call that encodes a registered token, in the shape
/// its role's contract row prescribes, with the token's payload.
///
/// Calls carrying unknown tokens, or a known token in the wrong shape, are
/// left as they are. Registered entries that were never taken are returned
/// as mismatches and stay in the registry.
pub fn splice(tree: &Node, registry: &mut PlaceholderRegistry, namespace: &str) -> Spliced {
    let tree = splice_node(tree, registry, namespace);
    let mismatches = registry
        .remaining()
        .into_iter()
        .map(|(token, placeholder)| Unspliced {
            token: token.to_string(),
            role: placeholder.role,
            span: placeholder.span,
        })
        .collect();
    Spliced { tree, mismatches }
}

fn splice_node(node: &Node, registry: &mut PlaceholderRegistry, namespace: &str) -> Node {
    for pattern in patterns() {
        if let Some(token) = pattern.match_token(node, namespace)
            && registry
                .get(token)
                .is_some_and(|placeholder| contract_for(placeholder.role).pattern == *pattern)
            && let Some(placeholder) = registry.take(token)
        {
            return placeholder.payload;
        }
    }
    node.rebuild(|field| match field {
        Field::Node(child) => Field::node(splice_node(child, registry, namespace)),
        Field::List(children) => Field::List(
            children
                .iter()
                .map(|child| splice_node(child, registry, namespace))
                .collect(),
        ),
        other => other.clone(),
    })
}
