//! How each role's placeholder is written into fragment text, and the
//! builder-call shape that text synthesizes to.
//!
//! The compiler encodes through [`RoleContract::encoding`] and the splicer
//! matches through [`RoleContract::pattern`], so the two can only change
//! together. Version 1 knew string literals only and is superseded.

use crate::ctxt::StructuralRole;
use crate::factory::match_factory_call;
use crate::syntax::{Node, SyntaxKind};

pub const WIRE_CONTRACT_VERSION: u32 = 2;

/// Textual form of a placeholder token in the fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// `"token"`
    Quoted,
    /// `token`
    Bare,
    /// `{token}`
    Braced,
    /// `return token;`
    Return,
}

impl Encoding {
    pub fn encode(self, token: &str) -> String {
        match self {
            Encoding::Quoted => format!("\"{token}\""),
            Encoding::Bare => token.to_string(),
            Encoding::Braced => format!("{{{token}}}"),
            Encoding::Return => format!("return {token};"),
        }
    }
}

/// Builder-call shape an encoded token synthesizes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// `ns.createStringLiteral("token", ...)`
    StringLiteral,
    /// `ns.createIdentifier("token")`
    Identifier,
    /// `ns.createBlock([ns.createExpressionStatement(ns.createIdentifier("token"))])`
    BlockOfIdentifier,
    /// `ns.createReturnStatement(ns.createIdentifier("token"))`
    ReturnOfIdentifier,
}

impl Pattern {
    /// The token `node` carries if it has this shape.
    pub fn match_token<'n>(self, node: &'n Node, namespace: &str) -> Option<&'n str> {
        match self {
            Pattern::StringLiteral => {
                let args = match_factory_call(node, namespace, SyntaxKind::StringLiteral)?;
                string_argument(args.first()?)
            }
            Pattern::Identifier => identifier_token(node, namespace),
            Pattern::BlockOfIdentifier => {
                let args = match_factory_call(node, namespace, SyntaxKind::Block)?;
                let [statements] = args else {
                    return None;
                };
                if !statements.is(SyntaxKind::ArrayLiteralExpression) {
                    return None;
                }
                let [statement] = statements.list("elements") else {
                    return None;
                };
                let args =
                    match_factory_call(statement, namespace, SyntaxKind::ExpressionStatement)?;
                let [expression] = args else {
                    return None;
                };
                identifier_token(expression, namespace)
            }
            Pattern::ReturnOfIdentifier => {
                let args = match_factory_call(node, namespace, SyntaxKind::ReturnStatement)?;
                let [expression] = args else {
                    return None;
                };
                identifier_token(expression, namespace)
            }
        }
    }
}

fn identifier_token<'n>(node: &'n Node, namespace: &str) -> Option<&'n str> {
    let [text] = match_factory_call(node, namespace, SyntaxKind::Identifier)? else {
        return None;
    };
    string_argument(text)
}

fn string_argument(node: &Node) -> Option<&str> {
    if node.is(SyntaxKind::StringLiteral) {
        node.str("text")
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleContract {
    pub role: StructuralRole,
    pub encoding: Encoding,
    pub pattern: Pattern,
}

pub static CONTRACT: [RoleContract; 5] = [
    RoleContract {
        role: StructuralRole::Expression,
        encoding: Encoding::Bare,
        pattern: Pattern::Identifier,
    },
    RoleContract {
        role: StructuralRole::Identifier,
        encoding: Encoding::Bare,
        pattern: Pattern::Identifier,
    },
    RoleContract {
        role: StructuralRole::Block,
        encoding: Encoding::Braced,
        pattern: Pattern::BlockOfIdentifier,
    },
    RoleContract {
        role: StructuralRole::ReturnStatement,
        encoding: Encoding::Return,
        pattern: Pattern::ReturnOfIdentifier,
    },
    RoleContract {
        role: StructuralRole::StringLiteralLike,
        encoding: Encoding::Quoted,
        pattern: Pattern::StringLiteral,
    },
];

pub fn contract_for(role: StructuralRole) -> &'static RoleContract {
    // Every role has exactly one row.
    CONTRACT
        .iter()
        .find(|row| row.role == role)
        .unwrap_or(&CONTRACT[0])
}

/// Distinct patterns, in the order the splicer tries them.
pub fn patterns() -> &'static [Pattern] {
    &[
        Pattern::BlockOfIdentifier,
        Pattern::ReturnOfIdentifier,
        Pattern::StringLiteral,
        Pattern::Identifier,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::parse_fragment;
    use crate::template::synth::synthesize;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_version() {
        assert_eq!(WIRE_CONTRACT_VERSION, 2);
    }

    #[test]
    fn test_every_role_has_one_row() {
        for role in StructuralRole::ALL {
            assert_eq!(CONTRACT.iter().filter(|row| row.role == role).count(), 1);
            assert_eq!(contract_for(role).role, role);
        }
    }

    #[test]
    fn test_patterns_cover_the_contract() {
        for row in &CONTRACT {
            assert!(patterns().contains(&row.pattern));
        }
    }

    /// Each role's encoding, parsed and synthesized on its own, must produce
    /// exactly the shape its pattern recognizes.
    #[test]
    fn test_encodings_synthesize_to_their_patterns() {
        let token = "__tsc0";
        for row in &CONTRACT {
            let source = row.encoding.encode(token);
            let fragment = parse_fragment(&source).unwrap();
            let tree = synthesize(&fragment, "ts");
            assert_eq!(
                row.pattern.match_token(&tree, "ts"),
                Some(token),
                "{:?} encoded as {source}",
                row.role
            );
        }
    }

    #[test]
    fn test_encodings_inside_larger_fragments() {
        let token = "__tsc0";
        let cases = [
            (Encoding::Quoted, "console.log({});"),
            (Encoding::Bare, "f({});"),
            (Encoding::Braced, "function f() {}"),
            (Encoding::Return, "function f() { {} }"),
        ];
        for (encoding, wrapper) in cases {
            let source = wrapper.replacen("{}", &encoding.encode(token), 1);
            assert!(parse_fragment(&source).is_ok(), "{source}");
        }
    }

    #[test]
    fn test_patterns_reject_other_shapes() {
        let fragment = parse_fragment("{ a; b; }").unwrap();
        let tree = synthesize(&fragment, "ts");
        assert_eq!(Pattern::BlockOfIdentifier.match_token(&tree, "ts"), None);
        let fragment = parse_fragment("x;").unwrap();
        let tree = synthesize(&fragment, "ts");
        assert_eq!(Pattern::Identifier.match_token(&tree, "other"), None);
        assert_eq!(Pattern::StringLiteral.match_token(&tree, "ts"), None);
    }
}
