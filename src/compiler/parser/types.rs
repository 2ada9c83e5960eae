//! Type annotations.
//!
//! Only the annotation forms the transform needs to read are supported:
//! references (possibly qualified and generic), keyword types, literal types,
//! object type literals, arrays, unions and function types.

use super::Parser;
use super::errors::{ParseErrorKind, ParseResult};
use crate::compiler::lexer::TokenKind;
use crate::syntax::{Field, Node, SyntaxKind};

/// Keywords that stand for a type in annotation position.
pub const KEYWORD_TYPES: &[&str] = &[
    "any",
    "bigint",
    "boolean",
    "never",
    "null",
    "number",
    "object",
    "string",
    "symbol",
    "undefined",
    "unknown",
    "void",
];

pub fn is_keyword_type(word: &str) -> bool {
    KEYWORD_TYPES.contains(&word)
}

impl Parser {
    pub(super) fn parse_type(&mut self) -> ParseResult<Node> {
        let start = self.current().start;
        let leading_pipe = self.eat(TokenKind::Pipe);
        let first = self.parse_array_type()?;
        if !self.at(TokenKind::Pipe) && !leading_pipe {
            return Ok(first);
        }
        let mut types = vec![first];
        while self.eat(TokenKind::Pipe) {
            types.push(self.parse_array_type()?);
        }
        if types.len() == 1 {
            return Ok(types.remove(0));
        }
        Ok(self.finish(SyntaxKind::UnionType, vec![Field::List(types)], start))
    }

    fn parse_array_type(&mut self) -> ParseResult<Node> {
        let start = self.current().start;
        let mut ty = self.parse_primary_type()?;
        while self.at(TokenKind::LBracket) && self.peek_kind(1) == TokenKind::RBracket {
            self.advance();
            self.advance();
            ty = self.finish(SyntaxKind::ArrayType, vec![Field::node(ty)], start);
        }
        Ok(ty)
    }

    fn parse_primary_type(&mut self) -> ParseResult<Node> {
        let start = self.current().start;
        match self.current().kind {
            TokenKind::LBrace => self.parse_type_literal(),
            TokenKind::LParen => {
                if let Some(function) = self.try_parse(|p| p.parse_function_type()) {
                    return Ok(function);
                }
                self.advance();
                let inner = self.parse_type()?;
                self.expect(TokenKind::RParen, "')'", "parenthesized type")?;
                Ok(inner)
            }
            TokenKind::Lt => self.parse_function_type(),
            TokenKind::String => {
                let literal = self.string_literal();
                Ok(self.finish(SyntaxKind::LiteralType, vec![Field::node(literal)], start))
            }
            TokenKind::Number => {
                let literal = self.numeric_literal();
                Ok(self.finish(SyntaxKind::LiteralType, vec![Field::node(literal)], start))
            }
            TokenKind::Ident if self.at_word("true") || self.at_word("false") => {
                let kind = if self.at_word("true") {
                    SyntaxKind::TrueKeyword
                } else {
                    SyntaxKind::FalseKeyword
                };
                self.advance();
                let literal = self.finish(kind, vec![], start);
                Ok(self.finish(SyntaxKind::LiteralType, vec![Field::node(literal)], start))
            }
            TokenKind::Ident if is_keyword_type(&self.current().text) => {
                let token = self.advance();
                Ok(self.finish(SyntaxKind::KeywordType, vec![Field::Str(token.text)], start))
            }
            TokenKind::Ident => self.parse_type_reference(),
            _ => Err(self.error(ParseErrorKind::ExpectedType, "type annotation")),
        }
    }

    fn parse_type_reference(&mut self) -> ParseResult<Node> {
        let start = self.current().start;
        let mut name = self.parse_identifier_name("type reference")?;
        while self.eat(TokenKind::Dot) {
            let right = self.parse_identifier_name("qualified name")?;
            name = self.finish(
                SyntaxKind::QualifiedName,
                vec![Field::node(name), Field::node(right)],
                start,
            );
        }
        let type_arguments = if self.at(TokenKind::Lt) {
            self.parse_type_arguments()?
        } else {
            Vec::new()
        };
        Ok(self.finish(
            SyntaxKind::TypeReference,
            vec![Field::node(name), Field::List(type_arguments)],
            start,
        ))
    }

    /// Parses `<A, B>`.
    pub(super) fn parse_type_arguments(&mut self) -> ParseResult<Vec<Node>> {
        self.expect(TokenKind::Lt, "'<'", "type arguments")?;
        let mut arguments = Vec::new();
        while !self.at(TokenKind::Gt) {
            arguments.push(self.parse_type()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::Gt, "'>'", "type arguments")?;
        Ok(arguments)
    }

    /// `<T>(a: A) => R`
    fn parse_function_type(&mut self) -> ParseResult<Node> {
        let start = self.current().start;
        let type_parameters = self.parse_optional_type_parameters()?;
        let parameters = self.parse_parameters()?;
        self.expect(TokenKind::Arrow, "'=>'", "function type")?;
        let ty = self.parse_type()?;
        Ok(self.finish(
            SyntaxKind::FunctionType,
            vec![
                Field::List(type_parameters),
                Field::List(parameters),
                Field::node(ty),
            ],
            start,
        ))
    }

    fn parse_type_literal(&mut self) -> ParseResult<Node> {
        let start = self.current().start;
        self.expect(TokenKind::LBrace, "'{'", "type literal")?;
        let mut members = Vec::new();
        while !self.at(TokenKind::RBrace) {
            if self.at_eof() {
                return Err(self.error(ParseErrorKind::MissingClosingBrace, "type literal"));
            }
            let member_start = self.current().start;
            let name = if self.at(TokenKind::String) {
                self.string_literal()
            } else {
                self.parse_identifier_name("property signature")?
            };
            let question = self.eat(TokenKind::Question);
            let ty = if self.eat(TokenKind::Colon) {
                Some(self.parse_type()?)
            } else {
                None
            };
            members.push(self.finish(
                SyntaxKind::PropertySignature,
                vec![Field::node(name), Field::Bool(question), Field::opt(ty)],
                member_start,
            ));
            let separated = self.eat(TokenKind::Semicolon)
                || self.eat(TokenKind::Comma)
                || self.current().newline_before;
            if !separated {
                break;
            }
        }
        self.expect(TokenKind::RBrace, "'}'", "type literal")?;
        Ok(self.finish(SyntaxKind::TypeLiteral, vec![Field::List(members)], start))
    }
}
