//! Error types for the lexer.

use std::fmt;

/// The kind of lexer error that occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexErrorKind {
    /// Unterminated string literal - missing closing quote.
    UnterminatedString,
    /// Unterminated template literal - missing closing backtick.
    UnterminatedTemplateLiteral,
    /// Unterminated block comment - missing `*/`.
    UnterminatedComment,
    /// Invalid escape sequence in a string or template.
    InvalidEscapeSequence,
    /// Character that starts no token.
    InvalidCharacter,
    /// A `}` closing nothing.
    UnbalancedBraces,
}

impl LexErrorKind {
    /// Returns a human-readable description of this error kind.
    pub fn description(&self) -> &'static str {
        match self {
            Self::UnterminatedString => "unterminated string literal",
            Self::UnterminatedTemplateLiteral => "unterminated template literal",
            Self::UnterminatedComment => "unterminated block comment",
            Self::InvalidEscapeSequence => "invalid escape sequence",
            Self::InvalidCharacter => "invalid character",
            Self::UnbalancedBraces => "unbalanced braces",
        }
    }

    /// Returns a suggested fix for this error kind.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::UnterminatedString => Some("add a closing quote \" or '"),
            Self::UnterminatedTemplateLiteral => Some("add a closing backtick `"),
            Self::UnterminatedComment => Some("close the comment with */"),
            Self::InvalidEscapeSequence => {
                Some("use a valid escape: \\n, \\t, \\r, \\\\, \\\", \\', \\`, \\$, \\xHH, \\uHHHH")
            }
            Self::UnbalancedBraces => Some("ensure every } has a matching {"),
            Self::InvalidCharacter => None,
        }
    }
}

/// A lexer error at a byte position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub position: usize,
    /// The offending text, when there is one.
    pub found: Option<String>,
}

impl LexError {
    pub fn new(kind: LexErrorKind, position: usize) -> Self {
        Self {
            kind,
            position,
            found: None,
        }
    }

    pub fn with_found(mut self, found: impl Into<String>) -> Self {
        self.found = Some(found.into());
        self
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at position {}", self.kind.description(), self.position)?;
        if let Some(found) = &self.found {
            write!(f, ", found {found:?}")?;
        }
        if let Some(help) = self.kind.suggestion() {
            write!(f, " (help: {help})")?;
        }
        Ok(())
    }
}

impl std::error::Error for LexError {}
