//! Type oracle: the little type information role inference needs.
//!
//! Types are nominal and shallow. A function type only remembers its return
//! type, and object types only remember their name, which is all that
//! decides a substitution's structural role.

use crate::compiler::parser::KEYWORD_TYPES;
use crate::config::TransformOptions;
use crate::factory::kind_for_factory;
use crate::semantic::{ANONYMOUS_FUNCTION, SemanticModel, SymbolId, SymbolKind};
use crate::syntax::{Node, NodeId, SyntaxKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    /// A nominal type, e.g. `StringLiteral` for `ts.StringLiteral`.
    Named(String),
    Primitive(&'static str),
    /// A callable; holds the return type of its call signature.
    Function(Box<Type>),
    Unknown,
}

impl Type {
    pub fn named(name: impl Into<String>) -> Type {
        Type::Named(name.into())
    }

    pub fn function(ret: Type) -> Type {
        Type::Function(Box::new(ret))
    }

    /// `NodeFactory<T>`: a function from props to a node.
    pub fn node_factory() -> Type {
        Type::function(Type::named(NODE))
    }
}

/// Type and symbol queries the transform makes. Passed explicitly as
/// `&dyn TypeOracle`.
pub trait TypeOracle {
    fn resolve_symbol(&self, node: &Node) -> Option<SymbolId>;
    fn type_of_symbol(&self, symbol: SymbolId) -> Type;
    fn type_of_expression(&self, expr: &Node) -> Type;
    fn call_signature_return_type(&self, ty: &Type) -> Option<Type>;
    fn symbol_name<'t>(&self, ty: &'t Type) -> Option<&'t str>;
    fn declarations(&self, symbol: SymbolId) -> &[NodeId];
}

const NODE: &str = "Node";
const NODE_FACTORY: &str = "NodeFactory";
const MAX_DEPTH: u32 = 32;

/// [`TypeOracle`] over a bound program.
pub struct ProgramTypes<'m, 'a> {
    model: &'m SemanticModel<'a>,
    facility_module: &'m str,
    factory_module: &'m str,
}

impl<'m, 'a> ProgramTypes<'m, 'a> {
    pub fn new(model: &'m SemanticModel<'a>, options: &'m TransformOptions) -> Self {
        Self {
            model,
            facility_module: &options.module_specifier,
            factory_module: &options.factory_module,
        }
    }

    fn symbol_type(&self, symbol: SymbolId, depth: u32) -> Type {
        if depth > MAX_DEPTH {
            return Type::Unknown;
        }
        if let Some(ty) = self.import_type(symbol) {
            return ty;
        }
        let target = self.model.symbol(self.model.aliased(symbol));
        let Some(declaration) = target
            .declarations
            .first()
            .and_then(|id| self.model.declaration(*id))
        else {
            return Type::Unknown;
        };
        match declaration.kind() {
            SyntaxKind::VariableDeclaration | SyntaxKind::Parameter => {
                if let Some(annotation) = declaration.child("type") {
                    annotation_type(annotation)
                } else if let Some(initializer) = declaration.child("initializer") {
                    self.expr_type(initializer, depth + 1)
                } else {
                    Type::Unknown
                }
            }
            kind if kind.is_function_like() => self.function_type(declaration, depth + 1),
            _ => Type::Unknown,
        }
    }

    /// Types of bindings imported from the facility or factory modules.
    fn import_type(&self, symbol: SymbolId) -> Option<Type> {
        let symbol = self.model.symbol(symbol);
        if symbol.kind != SymbolKind::Import {
            return None;
        }
        let declaration = self.model.declaration(*symbol.declarations.first()?)?;
        if !declaration.is(SyntaxKind::ImportSpecifier) {
            return None;
        }
        let module = self.model.import_module(declaration.id())?;
        if module == self.facility_module {
            return Some(Type::function(Type::node_factory()));
        }
        if module == self.factory_module {
            let imported = declaration
                .child("propertyName")
                .or_else(|| declaration.child("name"))?
                .ident_text()?;
            let kind = kind_for_factory(imported)?;
            return Some(Type::function(Type::named(kind.name())));
        }
        None
    }

    /// Whether `expr` names the factory module's namespace (a default or
    /// namespace import of it).
    fn is_factory_namespace(&self, expr: &Node) -> bool {
        let Some(symbol) = self.model.resolve(expr) else {
            return false;
        };
        let symbol = self.model.symbol(symbol);
        let Some(declaration) = symbol
            .declarations
            .first()
            .and_then(|id| self.model.declaration(*id))
        else {
            return false;
        };
        matches!(
            declaration.kind(),
            SyntaxKind::ImportClause | SyntaxKind::NamespaceImport
        ) && self.model.import_module(declaration.id()) == Some(self.factory_module)
    }

    /// `ts.createK` or `ts.factory.createK`.
    fn factory_member_type(&self, access: &Node) -> Option<Type> {
        let kind = kind_for_factory(access.child("name")?.ident_text()?)?;
        let mut object = access.child("expression")?;
        if object.is(SyntaxKind::PropertyAccessExpression)
            && object.child("name").and_then(Node::ident_text) == Some("factory")
        {
            object = object.child("expression")?;
        }
        self.is_factory_namespace(object)
            .then(|| Type::function(Type::named(kind.name())))
    }

    fn function_type(&self, function: &Node, depth: u32) -> Type {
        if let Some(annotation) = function.child("type") {
            return Type::function(annotation_type(annotation));
        }
        let ret = match function.child("body") {
            Some(body) if body.is(SyntaxKind::Block) => match first_return(body) {
                Some(expr) => self.expr_type(expr, depth + 1),
                None => Type::Primitive("void"),
            },
            Some(body) => self.expr_type(body, depth + 1),
            None => Type::Unknown,
        };
        Type::function(ret)
    }

    fn expr_type(&self, expr: &Node, depth: u32) -> Type {
        if depth > MAX_DEPTH {
            return Type::Unknown;
        }
        match expr.kind() {
            SyntaxKind::Identifier => match self.model.resolve(expr) {
                Some(symbol) => self.symbol_type(symbol, depth + 1),
                None => Type::Unknown,
            },
            kind if kind.is_function_like() => self.function_type(expr, depth + 1),
            SyntaxKind::CallExpression | SyntaxKind::TaggedTemplateExpression => {
                let callee = if expr.is(SyntaxKind::CallExpression) {
                    expr.child("expression")
                } else {
                    expr.child("tag")
                };
                callee
                    .map(|callee| self.expr_type(callee, depth + 1))
                    .and_then(|ty| return_type(&ty))
                    .unwrap_or(Type::Unknown)
            }
            SyntaxKind::ConditionalExpression => {
                let branch = |field| {
                    expr.child(field)
                        .map_or(Type::Unknown, |branch| self.expr_type(branch, depth + 1))
                };
                let when_true = branch("whenTrue");
                if when_true == branch("whenFalse") {
                    when_true
                } else {
                    Type::Unknown
                }
            }
            SyntaxKind::ParenthesizedExpression => expr
                .child("expression")
                .map_or(Type::Unknown, |inner| self.expr_type(inner, depth + 1)),
            SyntaxKind::AsExpression => expr.child("type").map_or(Type::Unknown, annotation_type),
            SyntaxKind::PropertyAccessExpression => {
                self.factory_member_type(expr).unwrap_or(Type::Unknown)
            }
            SyntaxKind::StringLiteral
            | SyntaxKind::NoSubstitutionTemplateLiteral
            | SyntaxKind::TemplateExpression => Type::Primitive("string"),
            SyntaxKind::NumericLiteral => Type::Primitive("number"),
            SyntaxKind::TrueKeyword | SyntaxKind::FalseKeyword => Type::Primitive("boolean"),
            SyntaxKind::NullKeyword => Type::Primitive("null"),
            _ => Type::Unknown,
        }
    }
}

impl TypeOracle for ProgramTypes<'_, '_> {
    fn resolve_symbol(&self, node: &Node) -> Option<SymbolId> {
        self.model.resolve(node)
    }

    fn type_of_symbol(&self, symbol: SymbolId) -> Type {
        self.symbol_type(symbol, 0)
    }

    fn type_of_expression(&self, expr: &Node) -> Type {
        self.expr_type(expr, 0)
    }

    fn call_signature_return_type(&self, ty: &Type) -> Option<Type> {
        return_type(ty)
    }

    fn symbol_name<'t>(&self, ty: &'t Type) -> Option<&'t str> {
        match ty {
            Type::Named(name) => Some(name),
            Type::Function(_) => Some(ANONYMOUS_FUNCTION),
            Type::Primitive(_) | Type::Unknown => None,
        }
    }

    fn declarations(&self, symbol: SymbolId) -> &[NodeId] {
        &self.model.symbol(symbol).declarations
    }
}

fn return_type(ty: &Type) -> Option<Type> {
    match ty {
        Type::Function(ret) => Some((**ret).clone()),
        _ => None,
    }
}

/// Reads a type annotation.
pub fn annotation_type(annotation: &Node) -> Type {
    match annotation.kind() {
        SyntaxKind::TypeReference => {
            let Some(name) = annotation.child("typeName").and_then(rightmost_name) else {
                return Type::Unknown;
            };
            if name == NODE_FACTORY {
                Type::node_factory()
            } else {
                Type::named(name)
            }
        }
        SyntaxKind::KeywordType => annotation
            .str("keyword")
            .and_then(|keyword| KEYWORD_TYPES.iter().find(|k| **k == keyword))
            .map_or(Type::Unknown, |keyword| Type::Primitive(*keyword)),
        SyntaxKind::FunctionType => {
            Type::function(annotation.child("type").map_or(Type::Unknown, annotation_type))
        }
        SyntaxKind::TypeLiteral => Type::named("__type"),
        SyntaxKind::ArrayType => Type::named("Array"),
        SyntaxKind::LiteralType => match annotation.child("literal").map(Node::kind) {
            Some(SyntaxKind::StringLiteral) => Type::Primitive("string"),
            Some(SyntaxKind::NumericLiteral) => Type::Primitive("number"),
            Some(SyntaxKind::TrueKeyword | SyntaxKind::FalseKeyword) => {
                Type::Primitive("boolean")
            }
            _ => Type::Unknown,
        },
        _ => Type::Unknown,
    }
}

fn rightmost_name(name: &Node) -> Option<&str> {
    match name.kind() {
        SyntaxKind::Identifier => name.ident_text(),
        SyntaxKind::QualifiedName => name.child("right").and_then(Node::ident_text),
        _ => None,
    }
}

/// The first `return` expression of a function body, not counting returns
/// of nested functions.
fn first_return(body: &Node) -> Option<&Node> {
    for statement in body.list("statements") {
        let found = match statement.kind() {
            SyntaxKind::ReturnStatement => return statement.child("expression"),
            SyntaxKind::Block => first_return(statement),
            SyntaxKind::IfStatement => ["thenStatement", "elseStatement"]
                .into_iter()
                .filter_map(|branch| statement.child(branch))
                .find_map(|branch| {
                    if branch.is(SyntaxKind::ReturnStatement) {
                        branch.child("expression")
                    } else {
                        first_return(branch)
                    }
                }),
            _ => None,
        };
        if found.is_some() {
            return found;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::query;
    use crate::semantic::Program;
    use pretty_assertions::assert_eq;

    /// Type of the initializer of `f` in `source`.
    fn initializer_type_of_f(source: &str) -> Type {
        let program = Program::single("a.ts", source).unwrap();
        let model = program.bind();
        let options = TransformOptions::default();
        let types = ProgramTypes::new(&model, &options);
        let tree = &program.files()[0].tree;
        let declaration = query(tree, r#"VariableDeclaration[name.text="f"]"#).unwrap()[0];
        let init = declaration.child("initializer").unwrap();
        types.type_of_expression(init)
    }

    #[test]
    fn test_annotated_arrow_returns_annotation() {
        assert_eq!(
            initializer_type_of_f(
                "import ts from 'typescript'; const f = (p: any): ts.StringLiteral => x;"
            ),
            Type::function(Type::named("StringLiteral"))
        );
    }

    #[test]
    fn test_inferred_from_factory_namespace() {
        assert_eq!(
            initializer_type_of_f(
                "import ts from 'typescript'; const f = (p) => ts.createIdentifier('a');"
            ),
            Type::function(Type::named("Identifier"))
        );
        assert_eq!(
            initializer_type_of_f(
                "import * as ts from 'typescript'; const f = (p) => { if (p) { return ts.factory.createBlock([]); } };"
            ),
            Type::function(Type::named("Block"))
        );
    }

    #[test]
    fn test_factory_namespace_must_be_imported() {
        assert_eq!(
            initializer_type_of_f("const ts = {}; const f = () => ts.createIdentifier('a');"),
            Type::function(Type::Unknown)
        );
    }

    #[test]
    fn test_named_factory_import() {
        assert_eq!(
            initializer_type_of_f(
                "import { createReturnStatement as r } from 'typescript'; const f = () => r();"
            ),
            Type::function(Type::named("ReturnStatement"))
        );
    }

    #[test]
    fn test_through_variables_and_calls() {
        assert_eq!(
            initializer_type_of_f(
                "function make(): Identifier { return x; } const g = () => make(); const f = g;"
            ),
            Type::function(Type::named("Identifier"))
        );
    }

    #[test]
    fn test_node_factory_and_tags() {
        assert_eq!(
            initializer_type_of_f(
                "const tsc = <T = {}>(s: TemplateStringsArray): NodeFactory<T> => s; const f = tsc`a`;"
            ),
            Type::node_factory()
        );
        assert_eq!(
            initializer_type_of_f("import { tsc } from 'ts-transform-creator'; const f = tsc`a`;"),
            Type::node_factory()
        );
    }

    #[test]
    fn test_bodies_without_return_are_void() {
        assert_eq!(
            initializer_type_of_f("const f = () => { const g = () => { return 1; }; };"),
            Type::function(Type::Primitive("void"))
        );
    }

    #[test]
    fn test_cyclic_initializers_terminate() {
        assert_eq!(initializer_type_of_f("const b = f; const f = b;"), Type::Unknown);
    }

    #[test]
    fn test_annotation_kinds() {
        let program = Program::single(
            "a.ts",
            "let a: string; let b: { x: 1 }; let c: A | B; let d: (n: N) => ts.Block; let e: 'x';",
        )
        .unwrap();
        let tree = &program.files()[0].tree;
        let types: Vec<_> = query(tree, "VariableDeclaration")
            .unwrap()
            .into_iter()
            .map(|d| annotation_type(d.child("type").unwrap()))
            .collect();
        assert_eq!(
            types,
            vec![
                Type::Primitive("string"),
                Type::named("__type"),
                Type::Unknown,
                Type::function(Type::named("Block")),
                Type::Primitive("string"),
            ]
        );
    }
}
