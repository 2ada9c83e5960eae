//! Binder: scopes, symbols and reference resolution over a [`Program`].
//!
//! Binding is a single pass per file. Each scope hoists its declarations
//! before its body is walked, so references resolve regardless of textual
//! order and inner declarations shadow outer ones. Relative imports are then
//! linked to the exporting file's symbols.

use rustc_hash::FxHashMap;

use crate::compiler::parse_module;
use crate::compiler::parser::errors::ParseResult;
use crate::syntax::{Field, Node, NodeId, SyntaxKind};

/// A parsed source file.
#[derive(Debug, Clone)]
pub struct ProgramFile {
    pub name: String,
    pub source: String,
    pub tree: Node,
}

impl ProgramFile {
    pub fn parse(name: impl Into<String>, source: impl Into<String>) -> ParseResult<ProgramFile> {
        let source = source.into();
        let tree = parse_module(&source)?;
        Ok(ProgramFile {
            name: name.into(),
            source,
            tree,
        })
    }
}

/// The files of one compilation.
#[derive(Debug, Clone, Default)]
pub struct Program {
    files: Vec<ProgramFile>,
}

impl Program {
    pub fn new(files: Vec<ProgramFile>) -> Program {
        Program { files }
    }

    /// A program of one file.
    pub fn single(name: impl Into<String>, source: impl Into<String>) -> ParseResult<Program> {
        Ok(Program::new(vec![ProgramFile::parse(name, source)?]))
    }

    pub fn files(&self) -> &[ProgramFile] {
        &self.files
    }

    pub fn file(&self, name: &str) -> Option<&ProgramFile> {
        self.files.iter().find(|file| file.name == name)
    }

    /// Binds every file. The model borrows the trees.
    pub fn bind(&self) -> SemanticModel<'_> {
        let mut model = SemanticModel::default();
        for file in &self.files {
            model.index(&file.tree, None);
        }
        let mut pending = Vec::new();
        for file in &self.files {
            let mut binder = Binder {
                model: &mut model,
                file: &file.name,
                scopes: Vec::new(),
                pending: &mut pending,
            };
            let scope = binder.bind_source_file(&file.tree);
            model.exports.insert(file.name.clone(), exports_of(&file.tree, &model));
            model.module_scopes.insert(file.name.clone(), scope);
        }
        model.link_imports(pending);
        model
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolId(u32);

impl SymbolId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// Default import or import specifier.
    Import,
    NamespaceImport,
    Variable,
    Function,
    Parameter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// Declaration nodes, in source order. Overloads and `var` redeclarations
    /// add to the same symbol.
    pub declarations: Vec<NodeId>,
}

/// Name given to the self-symbol of an anonymous function-like expression.
pub const ANONYMOUS_FUNCTION: &str = "__function";

type Scope = FxHashMap<String, SymbolId>;

/// The result of binding a [`Program`].
#[derive(Debug, Default)]
pub struct SemanticModel<'a> {
    nodes: FxHashMap<NodeId, &'a Node>,
    parents: FxHashMap<NodeId, NodeId>,
    symbols: Vec<Symbol>,
    resolutions: FxHashMap<NodeId, SymbolId>,
    module_scopes: FxHashMap<String, Scope>,
    exports: FxHashMap<String, Scope>,
    aliases: FxHashMap<SymbolId, SymbolId>,
}

impl<'a> SemanticModel<'a> {
    fn index(&mut self, node: &'a Node, parent: Option<NodeId>) {
        self.nodes.insert(node.id(), node);
        if let Some(parent) = parent {
            self.parents.insert(node.id(), parent);
        }
        for child in node.children() {
            self.index(child, Some(node.id()));
        }
    }

    /// The symbol a node refers to or declares.
    ///
    /// Identifiers in reference position resolve to the binding they name;
    /// declaration names and function-like nodes resolve to the symbol they
    /// declare. Unbound names (globals) resolve to nothing.
    pub fn resolve(&self, node: &Node) -> Option<SymbolId> {
        self.resolutions.get(&node.id()).copied()
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    /// Looks up a bound node by id. Declaration ids of a [`Symbol`] always
    /// resolve.
    pub fn declaration(&self, id: NodeId) -> Option<&'a Node> {
        self.nodes.get(&id).copied()
    }

    pub fn parent(&self, id: NodeId) -> Option<&'a Node> {
        self.parents.get(&id).and_then(|parent| self.declaration(*parent))
    }

    /// Proper ancestors of a node, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = &'a Node> + '_ {
        std::iter::successors(self.parent(id), |node| self.parent(node.id()))
    }

    /// Whether `node` lies within the subtree rooted at `ancestor`
    /// (inclusive).
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        node == ancestor || self.ancestors(node).any(|a| a.id() == ancestor)
    }

    /// Follows import aliases to the exported symbol they name.
    pub fn aliased(&self, mut id: SymbolId) -> SymbolId {
        // Import cycles cannot be longer than the number of aliases.
        for _ in 0..=self.aliases.len() {
            match self.aliases.get(&id) {
                Some(target) => id = *target,
                None => break,
            }
        }
        id
    }

    /// A binding declared at module scope of `file`.
    pub fn module_binding(&self, file: &str, name: &str) -> Option<SymbolId> {
        self.module_scopes.get(file)?.get(name).copied()
    }

    /// Module specifier text of the import declaration containing
    /// `declaration`.
    pub fn import_module(&self, declaration: NodeId) -> Option<&'a str> {
        self.ancestors(declaration)
            .find(|node| node.is(SyntaxKind::ImportDeclaration))?
            .child("moduleSpecifier")?
            .str("text")
    }

    pub fn export(&self, file: &str, name: &str) -> Option<SymbolId> {
        self.exports.get(file)?.get(name).copied()
    }

    fn new_symbol(&mut self, name: &str, kind: SymbolKind, declaration: NodeId) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(Symbol {
            name: name.to_string(),
            kind,
            declarations: vec![declaration],
        });
        id
    }

    fn link_imports(&mut self, pending: Vec<PendingImport>) {
        for import in pending {
            let Some(target) = resolve_module_path(&import.importer, &import.specifier)
                .into_iter()
                .flat_map(module_candidates)
                .find(|candidate| self.exports.contains_key(candidate))
            else {
                continue;
            };
            if let Some(export) = self.export(&target, &import.exported) {
                self.aliases.insert(import.symbol, export);
            }
        }
    }
}

struct PendingImport {
    importer: String,
    specifier: String,
    exported: String,
    symbol: SymbolId,
}

struct Binder<'m, 'a> {
    model: &'m mut SemanticModel<'a>,
    file: &'m str,
    scopes: Vec<Scope>,
    pending: &'m mut Vec<PendingImport>,
}

impl<'a> Binder<'_, 'a> {
    fn bind_source_file(&mut self, file: &'a Node) -> Scope {
        self.scopes.push(Scope::default());
        let statements = file.list("statements");
        self.hoist(statements, true);
        for statement in statements {
            self.visit(statement);
        }
        self.scopes.pop().unwrap_or_default()
    }

    fn declare(&mut self, name: &'a Node, declaration: &'a Node, kind: SymbolKind) -> Option<SymbolId> {
        let text = name.ident_text()?;
        let existing = self.scopes.last().and_then(|scope| scope.get(text)).copied();
        let id = match existing {
            Some(id) => {
                let symbol = &mut self.model.symbols[id.index()];
                if !symbol.declarations.contains(&declaration.id()) {
                    symbol.declarations.push(declaration.id());
                }
                id
            }
            None => {
                let id = self.model.new_symbol(text, kind, declaration.id());
                if let Some(scope) = self.scopes.last_mut() {
                    scope.insert(text.to_string(), id);
                }
                id
            }
        };
        self.model.resolutions.insert(name.id(), id);
        Some(id)
    }

    /// Declares the bindings `statements` introduce into the current scope.
    /// At function level `var` declarations nested in blocks are hoisted too.
    fn hoist(&mut self, statements: &'a [Node], function_level: bool) {
        for statement in statements {
            match statement.kind() {
                SyntaxKind::ImportDeclaration => self.declare_import(statement),
                SyntaxKind::VariableStatement => {
                    if let Some(list) = statement.child("declarationList")
                        && list.str("keyword") != Some("var")
                    {
                        self.declare_variables(list);
                    }
                }
                SyntaxKind::FunctionDeclaration => {
                    if let Some(name) = statement.child("name")
                        && let Some(id) = self.declare(name, statement, SymbolKind::Function)
                    {
                        self.model.resolutions.insert(statement.id(), id);
                    }
                }
                _ => {}
            }
            if function_level {
                self.hoist_vars(statement);
            }
        }
    }

    fn hoist_vars(&mut self, statement: &'a Node) {
        match statement.kind() {
            SyntaxKind::VariableStatement => {
                if let Some(list) = statement.child("declarationList")
                    && list.str("keyword") == Some("var")
                {
                    self.declare_variables(list);
                }
            }
            SyntaxKind::Block => {
                for inner in statement.list("statements") {
                    self.hoist_vars(inner);
                }
            }
            SyntaxKind::IfStatement => {
                for branch in ["thenStatement", "elseStatement"] {
                    if let Some(inner) = statement.child(branch) {
                        self.hoist_vars(inner);
                    }
                }
            }
            _ => {}
        }
    }

    fn declare_variables(&mut self, list: &'a Node) {
        for declaration in list.list("declarations") {
            if let Some(name) = declaration.child("name") {
                self.declare(name, declaration, SymbolKind::Variable);
            }
        }
    }

    fn declare_import(&mut self, import: &'a Node) {
        let Some(clause) = import.child("importClause") else {
            return;
        };
        let specifier = import
            .child("moduleSpecifier")
            .and_then(|m| m.str("text"))
            .unwrap_or_default();
        if let Some(name) = clause.child("name") {
            self.declare(name, clause, SymbolKind::Import);
        }
        let Some(bindings) = clause.child("namedBindings") else {
            return;
        };
        if bindings.is(SyntaxKind::NamespaceImport) {
            if let Some(name) = bindings.child("name") {
                self.declare(name, bindings, SymbolKind::NamespaceImport);
            }
            return;
        }
        for element in bindings.list("elements") {
            let Some(name) = element.child("name") else {
                continue;
            };
            let Some(symbol) = self.declare(name, element, SymbolKind::Import) else {
                continue;
            };
            let exported = element
                .child("propertyName")
                .unwrap_or(name)
                .ident_text()
                .unwrap_or_default();
            if is_relative(specifier) {
                self.pending.push(PendingImport {
                    importer: self.file.to_string(),
                    specifier: specifier.to_string(),
                    exported: exported.to_string(),
                    symbol,
                });
            }
        }
    }

    fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).copied())
    }

    fn visit(&mut self, node: &'a Node) {
        match node.kind() {
            SyntaxKind::ImportDeclaration => {}
            SyntaxKind::Identifier => {
                if let Some(id) = node.ident_text().and_then(|text| self.lookup(text)) {
                    self.model.resolutions.insert(node.id(), id);
                }
            }
            SyntaxKind::Block => {
                self.scopes.push(Scope::default());
                let statements = node.list("statements");
                self.hoist(statements, false);
                for statement in statements {
                    self.visit(statement);
                }
                self.scopes.pop();
            }
            kind if kind.is_function_like() => self.visit_function(node),
            _ => self.visit_children(node),
        }
    }

    fn visit_children(&mut self, node: &'a Node) {
        for (spec, field) in node.named_fields() {
            if !is_reference_field(node.kind(), spec.name) {
                continue;
            }
            match field {
                Field::Node(child) => self.visit(child),
                Field::List(children) => {
                    for child in children {
                        self.visit(child);
                    }
                }
                _ => {}
            }
        }
    }

    fn visit_function(&mut self, function: &'a Node) {
        self.scopes.push(Scope::default());
        if !function.is(SyntaxKind::FunctionDeclaration) {
            let name = function.child("name");
            let text = name.and_then(Node::ident_text).unwrap_or(ANONYMOUS_FUNCTION);
            let id = self.model.new_symbol(text, SymbolKind::Function, function.id());
            self.model.resolutions.insert(function.id(), id);
            if let Some(name) = name {
                self.model.resolutions.insert(name.id(), id);
                if let Some(scope) = self.scopes.last_mut() {
                    scope.insert(text.to_string(), id);
                }
            }
        }
        let parameters = function.list("parameters");
        for parameter in parameters {
            if let Some(name) = parameter.child("name") {
                self.declare(name, parameter, SymbolKind::Parameter);
            }
        }
        for parameter in parameters {
            if let Some(initializer) = parameter.child("initializer") {
                self.visit(initializer);
            }
        }
        match function.child("body") {
            Some(body) if body.is(SyntaxKind::Block) => {
                let statements = body.list("statements");
                self.hoist(statements, true);
                for statement in statements {
                    self.visit(statement);
                }
            }
            Some(body) => self.visit(body),
            None => {}
        }
        self.scopes.pop();
    }
}

/// Whether identifiers under this field are references. Type positions,
/// property names and declaration names are not.
fn is_reference_field(kind: SyntaxKind, field: &str) -> bool {
    if matches!(
        field,
        "type" | "typeArguments" | "typeParameters" | "constraint" | "default"
    ) {
        return false;
    }
    !matches!(
        (kind, field),
        (SyntaxKind::PropertyAccessExpression, "name")
            | (SyntaxKind::PropertyAssignment, "name")
            | (SyntaxKind::PropertySignature, "name")
            | (SyntaxKind::VariableDeclaration, "name")
            | (SyntaxKind::Parameter, "name")
            | (SyntaxKind::ImportSpecifier, _)
            | (SyntaxKind::ImportClause, _)
            | (SyntaxKind::NamespaceImport, _)
    )
}

fn exports_of(file: &Node, model: &SemanticModel<'_>) -> Scope {
    let mut exports = Scope::default();
    let mut export = |name: Option<&Node>| {
        if let Some(name) = name
            && let (Some(text), Some(id)) = (name.ident_text(), model.resolve(name))
        {
            exports.insert(text.to_string(), id);
        }
    };
    for statement in file.list("statements") {
        if !statement.flag("exported") {
            continue;
        }
        match statement.kind() {
            SyntaxKind::VariableStatement => {
                if let Some(list) = statement.child("declarationList") {
                    for declaration in list.list("declarations") {
                        export(declaration.child("name"));
                    }
                }
            }
            SyntaxKind::FunctionDeclaration => export(statement.child("name")),
            _ => {}
        }
    }
    exports
}

fn is_relative(specifier: &str) -> bool {
    specifier.starts_with("./") || specifier.starts_with("../")
}

/// Joins a relative specifier onto the importing file's directory.
fn resolve_module_path(importer: &str, specifier: &str) -> Option<String> {
    let mut parts: Vec<&str> = importer.split('/').collect();
    parts.pop();
    for segment in specifier.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            segment => parts.push(segment),
        }
    }
    Some(parts.join("/"))
}

fn module_candidates(base: String) -> Vec<String> {
    vec![
        format!("{base}.ts"),
        format!("{base}.tsx"),
        format!("{base}/index.ts"),
        base,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::query;

    fn identifiers<'a>(tree: &'a Node, name: &str) -> Vec<&'a Node> {
        query(tree, &format!("Identifier[text=\"{name}\"]")).unwrap()
    }

    #[test]
    fn test_shadowing_and_hoisting() {
        let program = Program::single(
            "a.ts",
            "use(x); const x = 1; function f(x) { return x; } { let x = 2; x; }",
        )
        .unwrap();
        let model = program.bind();
        let tree = &program.files()[0].tree;
        let xs = identifiers(tree, "x");
        // use(x), decl, param, return x, block decl, block use
        assert_eq!(xs.len(), 6);
        let outer = model.resolve(xs[0]).unwrap();
        assert_eq!(model.resolve(xs[1]), Some(outer));
        let param = model.resolve(xs[2]).unwrap();
        assert_ne!(param, outer);
        assert_eq!(model.resolve(xs[3]), Some(param));
        assert_eq!(model.symbol(param).kind, SymbolKind::Parameter);
        let inner = model.resolve(xs[5]).unwrap();
        assert_eq!(model.resolve(xs[4]), Some(inner));
        assert_ne!(inner, outer);
    }

    #[test]
    fn test_var_is_hoisted_out_of_blocks() {
        let program =
            Program::single("a.ts", "function f() { g(v); if (c) { var v = 1; } }").unwrap();
        let model = program.bind();
        let vs = identifiers(&program.files()[0].tree, "v");
        assert_eq!(model.resolve(vs[0]), model.resolve(vs[1]));
        assert!(model.resolve(vs[0]).is_some());
    }

    #[test]
    fn test_overloads_share_a_symbol() {
        let program = Program::single(
            "a.ts",
            "function f(a: string): X;\nfunction f(a: any): X { return a; }\nf(1);",
        )
        .unwrap();
        let model = program.bind();
        let fs = identifiers(&program.files()[0].tree, "f");
        let id = model.resolve(fs[2]).unwrap();
        assert_eq!(model.symbol(id).declarations.len(), 2);
    }

    #[test]
    fn test_non_reference_positions_are_skipped() {
        let program = Program::single(
            "a.ts",
            "const name = 1; const o = { name: 2 }; o.name; let t: name;",
        )
        .unwrap();
        let model = program.bind();
        let names = identifiers(&program.files()[0].tree, "name");
        assert_eq!(names.len(), 4);
        assert!(model.resolve(names[0]).is_some());
        assert!(names[1..].iter().all(|n| model.resolve(n).is_none()));
    }

    #[test]
    fn test_function_expressions_get_self_symbols() {
        let program = Program::single(
            "a.ts",
            "const a = () => 1; const b = function named() { return named; };",
        )
        .unwrap();
        let model = program.bind();
        let tree = &program.files()[0].tree;
        let arrow = query(tree, "ArrowFunction").unwrap()[0];
        let id = model.resolve(arrow).unwrap();
        assert_eq!(model.symbol(id).name, ANONYMOUS_FUNCTION);
        let named = identifiers(tree, "named");
        assert_eq!(model.resolve(named[0]), model.resolve(named[1]));
        assert!(model.module_binding("a.ts", "named").is_none());
    }

    #[test]
    fn test_import_declarations_are_ancestors() {
        let program =
            Program::single("a.ts", r#"import { tsc as q } from "ts-transform-creator"; q``;"#)
                .unwrap();
        let model = program.bind();
        let tree = &program.files()[0].tree;
        let import = query(tree, "ImportDeclaration").unwrap()[0];
        let tag = query(tree, "TaggedTemplateExpression").unwrap()[0]
            .child("tag")
            .unwrap();
        let symbol = model.symbol(model.resolve(tag).unwrap());
        assert_eq!(symbol.kind, SymbolKind::Import);
        assert!(model.is_ancestor(import.id(), symbol.declarations[0]));
        assert!(!model.is_ancestor(tag.id(), import.id()));
    }

    #[test]
    fn test_relative_imports_link_to_exports() {
        let program = Program::new(vec![
            ProgramFile::parse("src/lib/ids.ts", "export const make = 1;").unwrap(),
            ProgramFile::parse("src/main.ts", "import { make as m } from './lib/ids'; m;")
                .unwrap(),
        ]);
        let model = program.bind();
        let tree = &program.files()[1].tree;
        let m = identifiers(tree, "m");
        let local = model.resolve(m[1]).unwrap();
        let exported = model.export("src/lib/ids.ts", "make").unwrap();
        assert_ne!(local, exported);
        assert_eq!(model.aliased(local), exported);
    }

    #[test]
    fn test_resolve_module_path() {
        assert_eq!(
            resolve_module_path("src/a/b.ts", "../c/d").as_deref(),
            Some("src/c/d")
        );
        assert_eq!(resolve_module_path("b.ts", "./x").as_deref(), Some("x"));
        assert_eq!(resolve_module_path("b.ts", "../../x"), None);
    }
}
