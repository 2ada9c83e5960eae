//! Front end for the host language.
//!
//! - Lexer: tokenizes source text, splitting template literals the way the
//!   TypeScript scanner does
//! - Parser: builds the uniform [`Node`] tree directly from tokens
//! - Printer: turns a tree back into source text
//!
//! The same front end reads user files and template fragments, so a template
//! is legal exactly when the same text would be legal in a file.

pub mod error_fmt;
pub mod lexer;
pub mod parser;
pub mod printer;

use crate::syntax::{Node, SyntaxKind};
use parser::Parser;
use parser::errors::ParseResult;

pub use printer::print;

/// Parses a whole module into a `SourceFile` node.
pub fn parse_module(source: &str) -> ParseResult<Node> {
    Parser::new(source)?.parse_module()
}

/// Parses a template fragment into a `SourceFile` node.
///
/// Fragments follow module grammar; the distinction is only in how callers
/// treat the statements.
pub fn parse_fragment(text: &str) -> ParseResult<Node> {
    let file = parse_module(text)?;
    debug_assert!(file.is(SyntaxKind::SourceFile));
    Ok(file)
}
