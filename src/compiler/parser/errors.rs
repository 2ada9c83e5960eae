//! Error types for the parser.
//!
//! Provides context-rich parse errors; every error carries the byte position
//! it was raised at so callers can render it against the source.

use crate::compiler::lexer::{LexError, LexErrorKind};
use std::fmt;

/// The kind of parse error that occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The lexer rejected the input.
    Lex(LexErrorKind),
    /// Encountered an unexpected token.
    UnexpectedToken,
    /// Reached end of input unexpectedly.
    UnexpectedEof,
    /// Expected an expression.
    ExpectedExpression,
    /// Expected an identifier.
    ExpectedIdentifier,
    /// Expected a type annotation.
    ExpectedType,
    /// Expected a specific token.
    ExpectedToken,
    /// Missing a statement terminator.
    MissingSemicolon,
    /// Reserved word used as identifier.
    ReservedWordAsIdentifier,
    /// Malformed import declaration.
    InvalidImport,
    /// Missing closing brace `}`.
    MissingClosingBrace,
    /// Missing closing parenthesis `)`.
    MissingClosingParen,
}

impl ParseErrorKind {
    /// Returns a human-readable description of this error kind.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Lex(kind) => kind.description(),
            Self::UnexpectedToken => "unexpected token",
            Self::UnexpectedEof => "unexpected end of input",
            Self::ExpectedExpression => "expected expression",
            Self::ExpectedIdentifier => "expected identifier",
            Self::ExpectedType => "expected type",
            Self::ExpectedToken => "expected token",
            Self::MissingSemicolon => "missing ';' after statement",
            Self::ReservedWordAsIdentifier => "reserved word cannot be used as identifier",
            Self::InvalidImport => "invalid import declaration",
            Self::MissingClosingBrace => "missing closing brace '}'",
            Self::MissingClosingParen => "missing closing parenthesis ')'",
        }
    }
}

/// A detailed parse error with context information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// Byte position in the input where the error occurred.
    pub position: usize,
    /// What was being parsed.
    pub context: String,
    /// What would have been accepted.
    pub expected: Vec<String>,
    /// What was actually found.
    pub found: Option<String>,
}

/// Result type for parser operations.
pub type ParseResult<T> = Result<T, ParseError>;

impl ParseError {
    pub fn new(kind: ParseErrorKind, position: usize) -> Self {
        Self {
            kind,
            position,
            context: String::new(),
            expected: Vec::new(),
            found: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    pub fn with_expected(mut self, expected: &[&str]) -> Self {
        self.expected = expected.iter().map(|s| (*s).to_string()).collect();
        self
    }

    pub fn with_found(mut self, found: impl Into<String>) -> Self {
        self.found = Some(found.into());
        self
    }

    /// The one-line message, without position.
    pub fn message(&self) -> String {
        let mut msg = self.kind.description().to_string();
        if !self.context.is_empty() {
            msg.push_str(" in ");
            msg.push_str(&self.context);
        }
        msg
    }

    /// `expected X, found Y` annotation, if any part is known.
    pub fn annotation(&self) -> Option<String> {
        let expected = match self.expected.as_slice() {
            [] => None,
            [one] => Some(format!("expected {one}")),
            many => Some(format!("expected one of {}", many.join(", "))),
        };
        match (expected, &self.found) {
            (Some(e), Some(f)) => Some(format!("{e}, found {f}")),
            (Some(e), None) => Some(e),
            (None, Some(f)) => Some(format!("found {f}")),
            (None, None) => None,
        }
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        let mut out = ParseError::new(ParseErrorKind::Lex(err.kind), err.position);
        out.found = err.found;
        out
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at position {}", self.message(), self.position)?;
        if let Some(annotation) = self.annotation() {
            write!(f, " ({annotation})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}
