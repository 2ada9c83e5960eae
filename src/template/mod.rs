//! Quasiquote templates: from a tagged template's literal to the builder-call
//! tree that rebuilds it.
//!
//! The pipeline for one invocation:
//!
//! 1. [`compile_template`] infers each substitution's role, draws a
//!    placeholder token for it and writes the token into the fragment text
//!    in the role's encoding.
//! 2. The fragment is parsed with the ordinary front end and
//!    [`synthesize`]d into builder calls.
//! 3. [`splice`] swaps the builder calls that encode a token for the
//!    substitution, invoked with the implicit parameter.
//!
//! Steps 1 and 3 agree through the table in [`contract`].

pub mod contract;
pub mod placeholder;
pub mod splice;
pub mod synth;


pub use contract::WIRE_CONTRACT_VERSION;
pub use placeholder::{Cuid2Ids, IdGenerator, Placeholder, PlaceholderRegistry, SequentialIds};
pub use splice::{Spliced, Unspliced, splice};
pub use synth::synthesize;

use tracing::debug;

use crate::compiler::parse_fragment;
use crate::compiler::parser::errors::ParseError;
use crate::ctxt::TransformContext;
use crate::factory::{call, factory_call, identifier};
use crate::ret_type::{Degradation, infer_role};
use crate::syntax::{Node, Span, SyntaxKind};
use contract::contract_for;

/// A substitution whose role could not be inferred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleWarning {
    pub span: Span,
    pub reason: Degradation,
}

#[derive(Debug)]
pub enum CompiledTemplate {
    /// An empty literal without substitutions; builds an empty statement
    /// without parsing.
    Empty,
    Fragment {
        source: String,
        registry: PlaceholderRegistry,
        warnings: Vec<RoleWarning>,
    },
}

/// Literal chunks and substitutions of a template literal.
/// `chunks.len() == substitutions.len() + 1`.
fn parts(template: &Node) -> (Vec<&str>, Vec<&Node>) {
    match template.kind() {
        SyntaxKind::TemplateExpression => {
            let mut chunks = vec![template.str("head").unwrap_or_default()];
            let mut substitutions = Vec::new();
            for span in template.list("templateSpans") {
                if let Some(expression) = span.child("expression") {
                    substitutions.push(expression);
                    chunks.push(span.str("literal").unwrap_or_default());
                }
            }
            (chunks, substitutions)
        }
        _ => (vec![template.str("text").unwrap_or_default()], Vec::new()),
    }
}

/// Turns a template literal into fragment text plus the registry of its
/// placeholders.
pub fn compile_template(template: &Node, ctx: &TransformContext<'_, '_>) -> CompiledTemplate {
    let (chunks, substitutions) = parts(template);
    let literal_text = chunks.concat();
    if substitutions.is_empty() && literal_text.is_empty() {
        return CompiledTemplate::Empty;
    }

    let mut registry = PlaceholderRegistry::new();
    let mut warnings = Vec::new();
    let mut source = chunks[0].to_string();
    for (substitution, chunk) in substitutions.iter().zip(&chunks[1..]) {
        let inference = infer_role(substitution, ctx.oracle);
        if let Some(reason) = inference.degraded {
            warnings.push(RoleWarning {
                span: substitution.span(),
                reason,
            });
        }
        let token = registry.fresh_token(ctx.ids, &literal_text);
        source.push_str(&contract_for(inference.role).encoding.encode(&token));
        source.push_str(chunk);
        registry.insert(
            token,
            Placeholder {
                payload: call(
                    (*substitution).clone(),
                    vec![identifier(ctx.options.parameter_name.as_str())],
                ),
                role: inference.role,
                span: substitution.span(),
            },
        );
    }
    CompiledTemplate::Fragment {
        source,
        registry,
        warnings,
    }
}

/// The fragment text of a template did not parse.
#[derive(Debug, Clone)]
pub struct FragmentError {
    pub fragment: String,
    pub error: ParseError,
}

/// A template turned into its spliced builder-call tree.
#[derive(Debug)]
pub struct Expansion {
    pub tree: Node,
    /// `None` for the empty template.
    pub fragment: Option<String>,
    pub placeholders: usize,
    pub warnings: Vec<RoleWarning>,
    pub mismatches: Vec<Unspliced>,
}

/// Runs compile, parse, synthesize and splice for one template literal.
pub fn expand_template(
    template: &Node,
    ctx: &TransformContext<'_, '_>,
) -> Result<Expansion, FragmentError> {
    let namespace = ctx.namespace();
    let (source, mut registry, warnings) = match compile_template(template, ctx) {
        CompiledTemplate::Empty => {
            return Ok(Expansion {
                tree: factory_call(namespace, SyntaxKind::EmptyStatement, vec![]),
                fragment: None,
                placeholders: 0,
                warnings: Vec::new(),
                mismatches: Vec::new(),
            });
        }
        CompiledTemplate::Fragment {
            source,
            registry,
            warnings,
        } => (source, registry, warnings),
    };
    debug!(fragment = %source, placeholders = registry.len(), "compiled template");

    let fragment = match parse_fragment(&source) {
        Ok(fragment) => fragment,
        Err(error) => {
            return Err(FragmentError {
                fragment: source,
                error,
            });
        }
    };
    let placeholders = registry.len();
    let builder = synthesize(&fragment, namespace);
    let Spliced { tree, mismatches } = splice(&builder, &mut registry, namespace);
    Ok(Expansion {
        tree,
        fragment: Some(source),
        placeholders,
        warnings,
        mismatches,
    })
}
