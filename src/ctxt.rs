use std::fmt;

use crate::config::TransformOptions;
use crate::semantic::SemanticModel;
use crate::template::IdGenerator;
use crate::types::TypeOracle;

/// Read-only state shared by every invocation of one pass.
pub struct TransformContext<'c, 'a> {
    pub model: &'c SemanticModel<'a>,
    pub oracle: &'c dyn TypeOracle,
    pub options: &'c TransformOptions,
    pub ids: &'c dyn IdGenerator,
}

impl<'c, 'a> TransformContext<'c, 'a> {
    pub fn new(
        model: &'c SemanticModel<'a>,
        oracle: &'c dyn TypeOracle,
        options: &'c TransformOptions,
        ids: &'c dyn IdGenerator,
    ) -> Self {
        Self {
            model,
            oracle,
            options,
            ids,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.options.factory_namespace
    }
}

/// The structural position a substitution's result takes in the fragment.
///
/// Decides how its placeholder is written into fragment text and which
/// builder-call shape the splicer looks for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StructuralRole {
    #[default]
    Expression,
    Identifier,
    Block,
    ReturnStatement,
    StringLiteralLike,
}

impl StructuralRole {
    pub const ALL: [StructuralRole; 5] = [
        StructuralRole::Expression,
        StructuralRole::Identifier,
        StructuralRole::Block,
        StructuralRole::ReturnStatement,
        StructuralRole::StringLiteralLike,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StructuralRole::Expression => "expression",
            StructuralRole::Identifier => "identifier",
            StructuralRole::Block => "block",
            StructuralRole::ReturnStatement => "return statement",
            StructuralRole::StringLiteralLike => "string literal",
        }
    }
}

impl fmt::Display for StructuralRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_role_is_expression() {
        assert_eq!(StructuralRole::default(), StructuralRole::Expression);
    }

    #[test]
    fn test_role_names_are_distinct() {
        let mut names: Vec<_> = StructuralRole::ALL.iter().map(|r| r.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), StructuralRole::ALL.len());
        assert_eq!(StructuralRole::ReturnStatement.to_string(), "return statement");
    }
}
