//! The pass: finds use sites, expands them and assembles the replacements.
//!
//! Files are independent. A file without a facility import is returned as
//! is, without walking its tree. Otherwise the tree is rebuilt depth-first;
//! each use site is replaced by a one-parameter arrow function, which is
//! then walked in turn so that invocations carried in through substitutions
//! are expanded before the outer walk moves on.

use std::fmt;

use tracing::{debug, debug_span, warn};

use crate::compiler::parser::errors::ParseError;
use crate::compiler::print;
use crate::config::{ModuleFormat, TransformOptions};
use crate::ctxt::TransformContext;
use crate::diagnostics::{Diagnostic, DiagnosticKind, Location};
use crate::factory::{
    arrow_function, block, call, const_statement, default_import, identifier, parameter,
    return_statement, string_literal,
};
use crate::locate::{facility_imports, is_use_site};
use crate::query::SelectorError;
use crate::semantic::{Program, ProgramFile};
use crate::syntax::{Field, Node, SyntaxKind};
use crate::template::{Cuid2Ids, Expansion, FragmentError, IdGenerator, expand_template};
use crate::types::ProgramTypes;

/// A transformed file.
#[derive(Debug, Clone)]
pub struct FileOutput {
    pub tree: Node,
    pub diagnostics: Vec<Diagnostic>,
    /// Number of tagged templates replaced, nested ones included.
    pub expansions: usize,
}

impl FileOutput {
    pub fn print(&self) -> String {
        print(&self.tree)
    }
}

/// The result for one file of a program.
#[derive(Debug)]
pub struct FileOutcome {
    pub file: String,
    pub result: Result<FileOutput, TransformError>,
}

#[derive(Debug, Clone)]
pub enum TransformErrorKind {
    /// The text of a template is not valid host syntax.
    FragmentParseFailure { fragment: String, error: ParseError },
    /// The import selector for the configured module specifier is invalid.
    InvalidModuleSpecifier(SelectorError),
}

/// A fatal error for one file.
#[derive(Debug, Clone)]
pub struct TransformError {
    pub kind: TransformErrorKind,
    pub file: String,
    /// The originating template, when there is one.
    pub location: Option<Location>,
}

impl TransformError {
    pub fn description(&self) -> &'static str {
        match self.kind {
            TransformErrorKind::FragmentParseFailure { .. } => "template is not valid syntax",
            TransformErrorKind::InvalidModuleSpecifier(_) => "invalid module specifier",
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let kind = match self.kind {
            TransformErrorKind::FragmentParseFailure { .. } => DiagnosticKind::FragmentParseFailure,
            TransformErrorKind::InvalidModuleSpecifier(_) => DiagnosticKind::InvalidModuleSpecifier,
        };
        Diagnostic::error(kind, self.to_string(), self.location.clone())
    }
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())?;
        if let Some(location) = &self.location {
            write!(f, " at {location}")?;
        } else {
            write!(f, " in {}", self.file)?;
        }
        match &self.kind {
            TransformErrorKind::FragmentParseFailure { fragment, error } => {
                let line_offset = self.location.as_ref().map_or(0, |location| location.line - 1);
                write!(f, "\n{}", error.render_in(fragment, &self.file, line_offset))
            }
            TransformErrorKind::InvalidModuleSpecifier(error) => write!(f, ": {error}"),
        }
    }
}

impl std::error::Error for TransformError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            TransformErrorKind::FragmentParseFailure { error, .. } => Some(error),
            TransformErrorKind::InvalidModuleSpecifier(error) => Some(error),
        }
    }
}

/// Transforms every file of `program`, drawing placeholder tokens from
/// `cuid2`.
pub fn transform_program(program: &Program, options: &TransformOptions) -> Vec<FileOutcome> {
    transform_program_with_ids(program, options, &Cuid2Ids)
}

pub fn transform_program_with_ids(
    program: &Program,
    options: &TransformOptions,
    ids: &dyn IdGenerator,
) -> Vec<FileOutcome> {
    let model = program.bind();
    let types = ProgramTypes::new(&model, options);
    let ctx = TransformContext::new(&model, &types, options, ids);
    program
        .files()
        .iter()
        .map(|file| FileOutcome {
            file: file.name.clone(),
            result: transform_file(file, &ctx),
        })
        .collect()
}

/// Transforms one file of the program `ctx` was built for.
pub fn transform_file(
    file: &ProgramFile,
    ctx: &TransformContext<'_, '_>,
) -> Result<FileOutput, TransformError> {
    let _span = debug_span!("transform_file", file = %file.name).entered();

    let imports = facility_imports(&file.tree, &ctx.options.module_specifier).map_err(|error| {
        TransformError {
            kind: TransformErrorKind::InvalidModuleSpecifier(error),
            file: file.name.clone(),
            location: None,
        }
    })?;
    if imports.is_empty() {
        debug!("no facility import");
        return Ok(FileOutput {
            tree: file.tree.clone(),
            diagnostics: Vec::new(),
            expansions: 0,
        });
    }

    let mut expander = Expander {
        ctx,
        file,
        imports,
        diagnostics: Vec::new(),
        expansions: 0,
    };
    let mut tree = expander.visit(&file.tree)?;
    if expander.needs_factory_import() {
        tree = prepend_statement(
            &tree,
            default_import(
                ctx.options.factory_namespace.as_str(),
                ctx.options.factory_module.as_str(),
            ),
        );
    }
    debug!(expansions = expander.expansions, "transformed file");
    Ok(FileOutput {
        tree,
        diagnostics: expander.diagnostics,
        expansions: expander.expansions,
    })
}

struct Expander<'x, 'c, 'a> {
    ctx: &'x TransformContext<'c, 'a>,
    file: &'x ProgramFile,
    imports: Vec<&'x Node>,
    diagnostics: Vec<Diagnostic>,
    expansions: usize,
}

impl Expander<'_, '_, '_> {
    fn location(&self, offset: usize) -> Location {
        Location::at(&self.file.name, &self.file.source, offset)
    }

    fn visit(&mut self, node: &Node) -> Result<Node, TransformError> {
        if is_use_site(node, &self.imports, self.ctx.model, self.ctx.oracle) {
            let replacement = self.expand(node)?;
            return self.visit(&replacement);
        }
        node.try_map_children(|child| self.visit(child))
    }

    fn expand(&mut self, invocation: &Node) -> Result<Node, TransformError> {
        let Some(template) = invocation.child("template") else {
            return Ok(invocation.clone());
        };
        let location = self.location(invocation.span().start);
        let expansion = expand_template(template, self.ctx).map_err(
            |FragmentError { fragment, error }| TransformError {
                kind: TransformErrorKind::FragmentParseFailure { fragment, error },
                file: self.file.name.clone(),
                location: Some(location.clone()),
            },
        )?;
        debug!(
            line = location.line,
            placeholders = expansion.placeholders,
            "expanded tagged template"
        );
        self.expansions += 1;
        self.report(&expansion);
        Ok(self.assemble(expansion.tree).with_span(invocation.span()))
    }

    fn report(&mut self, expansion: &Expansion) {
        for warning in &expansion.warnings {
            let location = self.location(warning.span.start);
            warn!(%location, "{}", warning.reason);
            self.diagnostics.push(Diagnostic::warning(
                DiagnosticKind::from(&warning.reason),
                warning.reason.to_string(),
                location,
            ));
        }
        for mismatch in &expansion.mismatches {
            let location = self.location(mismatch.span.start);
            let message = format!(
                "{} substitution was not spliced into the template; its placeholder `{}` remains",
                mismatch.role, mismatch.token
            );
            warn!(%location, "{message}");
            self.diagnostics.push(Diagnostic::warning(
                DiagnosticKind::SplicePatternMismatch,
                message,
                location,
            ));
        }
    }

    /// `(props) => spliced`, or for CommonJS
    /// `(props) => { const ts = require("typescript"); return spliced; }`.
    fn assemble(&self, spliced: Node) -> Node {
        let options = self.ctx.options;
        let body = match options.module_format {
            ModuleFormat::EsModule => spliced,
            ModuleFormat::CommonJs => block(vec![
                const_statement(
                    options.factory_namespace.as_str(),
                    call(
                        identifier("require"),
                        vec![string_literal(options.factory_module.as_str())],
                    ),
                ),
                return_statement(Some(spliced)),
            ]),
        };
        arrow_function(vec![parameter(options.parameter_name.as_str())], body)
    }

    /// A module-scope binding of the namespace suppresses the import. One that
    /// is not a namespace or default import of the factory module is reported.
    fn needs_factory_import(&mut self) -> bool {
        let options = self.ctx.options;
        if self.expansions == 0
            || !options.insert_factory_import
            || options.module_format != ModuleFormat::EsModule
        {
            return false;
        }
        let model = self.ctx.model;
        let Some(binding) = model.module_binding(&self.file.name, &options.factory_namespace) else {
            return true;
        };
        let Some(declaration) = model
            .symbol(binding)
            .declarations
            .first()
            .and_then(|id| model.declaration(*id))
        else {
            return false;
        };
        let imports_factory = matches!(
            declaration.kind(),
            SyntaxKind::ImportClause | SyntaxKind::NamespaceImport
        ) && model.import_module(declaration.id()) == Some(options.factory_module.as_str());
        if !imports_factory {
            let location = self.location(declaration.span().start);
            let message = format!(
                "`{}` is bound to something other than an import of \"{}\"; the factory import was not inserted",
                options.factory_namespace, options.factory_module
            );
            warn!(%location, "{message}");
            self.diagnostics.push(Diagnostic::warning(
                DiagnosticKind::FactoryNamespaceShadowed,
                message,
                location,
            ));
        }
        false
    }
}

fn prepend_statement(file: &Node, statement: Node) -> Node {
    debug_assert!(file.is(SyntaxKind::SourceFile));
    let mut statements = Vec::with_capacity(file.list("statements").len() + 1);
    statements.push(statement);
    statements.extend(file.list("statements").iter().cloned());
    file.with_field("statements", Field::List(statements))
}
