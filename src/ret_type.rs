//! Role inference from a substitution's declared return type.

use std::fmt;

use crate::ctxt::StructuralRole;
use crate::syntax::Node;
use crate::types::{Type, TypeOracle};

/// Why a substitution fell back to [`StructuralRole::Expression`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Degradation {
    /// No symbol, an unknown type, or a return type without a nominal name.
    UnresolvedSubstitutionType,
    /// The substitution's type has no call signature.
    MissingReturnTypeSignature { found: String },
}

impl Degradation {
    pub fn description(&self) -> &'static str {
        match self {
            Self::UnresolvedSubstitutionType => "could not resolve the substitution's return type",
            Self::MissingReturnTypeSignature { .. } => "substitution is not callable",
        }
    }
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())?;
        if let Self::MissingReturnTypeSignature { found } = self {
            write!(f, " (its type is `{found}`)")?;
        }
        f.write_str("; treating it as an expression")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleInference {
    pub role: StructuralRole,
    pub degraded: Option<Degradation>,
}

impl RoleInference {
    fn resolved(role: StructuralRole) -> Self {
        Self {
            role,
            degraded: None,
        }
    }

    fn degraded(reason: Degradation) -> Self {
        Self {
            role: StructuralRole::Expression,
            degraded: Some(reason),
        }
    }
}

/// Maps a nominal return type name to the role its values take.
pub fn role_for_type_name(name: &str) -> StructuralRole {
    match name {
        "StringLiteral" | "StringLiteralLike" | "NoSubstitutionTemplateLiteral" => {
            StructuralRole::StringLiteralLike
        }
        "Identifier" => StructuralRole::Identifier,
        "Block" => StructuralRole::Block,
        "ReturnStatement" => StructuralRole::ReturnStatement,
        _ => StructuralRole::Expression,
    }
}

/// Infers the role of a substitution expression from the return type of its
/// call signature.
pub fn infer_role(expr: &Node, oracle: &dyn TypeOracle) -> RoleInference {
    let ty = match oracle.resolve_symbol(expr) {
        Some(symbol) => oracle.type_of_symbol(symbol),
        None => oracle.type_of_expression(expr),
    };
    if ty == Type::Unknown {
        return RoleInference::degraded(Degradation::UnresolvedSubstitutionType);
    }
    let Some(ret) = oracle.call_signature_return_type(&ty) else {
        return RoleInference::degraded(Degradation::MissingReturnTypeSignature {
            found: describe(&ty),
        });
    };
    match oracle.symbol_name(&ret) {
        Some(name) => RoleInference::resolved(role_for_type_name(name)),
        None => RoleInference::degraded(Degradation::UnresolvedSubstitutionType),
    }
}

fn describe(ty: &Type) -> String {
    match ty {
        Type::Named(name) => name.clone(),
        Type::Primitive(name) => (*name).to_string(),
        Type::Function(ret) => format!("() => {}", describe(ret)),
        Type::Unknown => "unknown".to_string(),
    }
}
