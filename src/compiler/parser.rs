//! Parser for the host language.
//!
//! Recursive descent for statements and declarations, a Pratt loop for
//! expressions (see [`precedence`]), and a small type-annotation grammar.
//! Arrow functions and explicit type arguments are recognized by
//! speculative parsing with backtracking over the token buffer.
//!
//! Every node is built through [`Node::new`] in its kind's schema order.

pub mod errors;
mod expression;
pub mod precedence;
mod statement;
#[cfg(test)]
mod tests;
mod types;

pub use types::KEYWORD_TYPES;

use crate::compiler::lexer::{Lexer, Token, TokenKind};
use crate::syntax::{Field, Node, Span, SyntaxKind};
use errors::{ParseError, ParseErrorKind, ParseResult};

/// Words that cannot name a binding or start an expression as an identifier.
const RESERVED: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete", "do",
    "else", "enum", "export", "extends", "finally", "for", "function", "if", "import", "in",
    "instanceof", "new", "return", "super", "switch", "throw", "try", "typeof", "var", "void",
    "while", "with", "true", "false", "null", "this",
];

pub fn is_reserved(word: &str) -> bool {
    RESERVED.contains(&word)
}

/// The parser for host source text.
pub struct Parser {
    /// The tokens to parse; always terminated by `Eof`.
    tokens: Vec<Token>,
    /// Current position in the token stream.
    pos: usize,
}

impl Parser {
    /// Lexes the input and creates a parser over it.
    pub fn new(input: &str) -> ParseResult<Self> {
        let tokens = Lexer::new(input).tokenize()?;
        Ok(Self { tokens, pos: 0 })
    }

    /// Parses a whole module into a `SourceFile` node.
    pub fn parse_module(mut self) -> ParseResult<Node> {
        let start = self.current().start;
        let mut statements = Vec::new();
        while !self.at_eof() {
            statements.push(self.parse_statement()?);
        }
        Ok(self.finish(SyntaxKind::SourceFile, vec![Field::List(statements)], start))
    }

    // =========================================================================
    // Token navigation
    // =========================================================================

    fn current(&self) -> &Token {
        // The trailing `Eof` is never consumed.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    fn peek_token(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.pos + n)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    fn at_word(&self, word: &str) -> bool {
        self.current().is_ident(word)
    }

    fn at_eof(&self) -> bool {
        self.at(TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !self.at_eof() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_word(&mut self, word: &str) -> bool {
        if self.at_word(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, display: &str, context: &str) -> ParseResult<Token> {
        if self.at(kind) {
            return Ok(self.advance());
        }
        let error_kind = match kind {
            TokenKind::RBrace => ParseErrorKind::MissingClosingBrace,
            TokenKind::RParen => ParseErrorKind::MissingClosingParen,
            _ => ParseErrorKind::ExpectedToken,
        };
        Err(self.error(error_kind, context).with_expected(&[display]))
    }

    fn expect_word(&mut self, word: &str, context: &str) -> ParseResult<Token> {
        if self.at_word(word) {
            return Ok(self.advance());
        }
        let expected = format!("'{word}'");
        Err(self
            .error(ParseErrorKind::ExpectedToken, context)
            .with_expected(&[expected.as_str()]))
    }

    /// Error at the current token, with the token as `found`.
    fn error(&self, kind: ParseErrorKind, context: &str) -> ParseError {
        let token = self.current();
        let (kind, found) = if token.kind == TokenKind::Eof {
            (
                if kind == ParseErrorKind::ExpectedToken || kind == ParseErrorKind::UnexpectedToken
                {
                    ParseErrorKind::UnexpectedEof
                } else {
                    kind
                },
                "end of input".to_string(),
            )
        } else {
            (kind, format!("'{}'", token.text))
        };
        ParseError::new(kind, token.start)
            .with_context(context)
            .with_found(found)
    }

    /// End offset of the last consumed token.
    fn prev_end(&self) -> usize {
        match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(token) => token.end,
            None => 0,
        }
    }

    /// Builds a node spanning from `start` to the last consumed token.
    fn finish(&self, kind: SyntaxKind, fields: Vec<Field>, start: usize) -> Node {
        let end = self.prev_end().max(start);
        Node::new(kind, fields).with_span(Span::new(start, end))
    }

    /// Runs `f`; on failure rewinds to where it started.
    fn try_parse<T>(&mut self, f: impl FnOnce(&mut Self) -> ParseResult<T>) -> Option<T> {
        let saved = self.pos;
        match f(self) {
            Ok(value) => Some(value),
            Err(_) => {
                self.pos = saved;
                None
            }
        }
    }

    /// Accepts `;`, or an automatic semicolon before `}`, end of input or a
    /// line break.
    fn consume_semicolon(&mut self, context: &str) -> ParseResult<()> {
        if self.eat(TokenKind::Semicolon)
            || self.at(TokenKind::RBrace)
            || self.at_eof()
            || self.current().newline_before
        {
            return Ok(());
        }
        Err(self
            .error(ParseErrorKind::MissingSemicolon, context)
            .with_expected(&["';'"]))
    }

    // =========================================================================
    // Identifiers
    // =========================================================================

    /// Parses a binding or reference identifier.
    fn parse_identifier(&mut self, context: &str) -> ParseResult<Node> {
        let token = self.current();
        if token.kind != TokenKind::Ident {
            return Err(self.error(ParseErrorKind::ExpectedIdentifier, context));
        }
        if is_reserved(&token.text) {
            return Err(self.error(ParseErrorKind::ReservedWordAsIdentifier, context));
        }
        let token = self.advance();
        Ok(self.finish(
            SyntaxKind::Identifier,
            vec![Field::Str(token.text)],
            token.start,
        ))
    }

    /// Parses an identifier name, where reserved words are allowed
    /// (property names).
    fn parse_identifier_name(&mut self, context: &str) -> ParseResult<Node> {
        if !self.at(TokenKind::Ident) {
            return Err(self.error(ParseErrorKind::ExpectedIdentifier, context));
        }
        let token = self.advance();
        Ok(self.finish(
            SyntaxKind::Identifier,
            vec![Field::Str(token.text)],
            token.start,
        ))
    }

    fn string_literal(&mut self) -> Node {
        let token = self.advance();
        self.finish(
            SyntaxKind::StringLiteral,
            vec![Field::Str(token.value), Field::Bool(token.single_quote)],
            token.start,
        )
    }

    fn numeric_literal(&mut self) -> Node {
        let token = self.advance();
        self.finish(
            SyntaxKind::NumericLiteral,
            vec![Field::Str(token.text)],
            token.start,
        )
    }
}
