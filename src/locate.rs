//! Finding use sites of the facility.
//!
//! A tagged template is a use site when its tag resolves to a symbol with a
//! declaration inside one of the facility's import declarations. Aliased
//! imports therefore count, and local bindings that shadow the import, or
//! happen to share its name, do not.

use crate::query::{SelectorError, query, quote_value};
use crate::semantic::SemanticModel;
use crate::syntax::{Node, SyntaxKind};
use crate::types::TypeOracle;

/// Import declarations of `module` in `file`.
pub fn facility_imports<'t>(file: &'t Node, module: &str) -> Result<Vec<&'t Node>, SelectorError> {
    query(
        file,
        &format!(
            "ImportDeclaration[moduleSpecifier.text={}]",
            quote_value(module)
        ),
    )
}

/// Whether `node` is a tagged template whose tag was imported by one of
/// `imports`.
pub fn is_use_site(
    node: &Node,
    imports: &[&Node],
    model: &SemanticModel<'_>,
    oracle: &dyn TypeOracle,
) -> bool {
    if !node.is(SyntaxKind::TaggedTemplateExpression) {
        return false;
    }
    let Some(symbol) = node.child("tag").and_then(|tag| oracle.resolve_symbol(tag)) else {
        return false;
    };
    oracle.declarations(symbol).iter().any(|declaration| {
        imports
            .iter()
            .any(|import| model.is_ancestor(import.id(), *declaration))
    })
}
