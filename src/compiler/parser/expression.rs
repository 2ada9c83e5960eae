//! Expression parsing.
//!
//! Assignment and conditional expressions are handled by recursive descent;
//! binary operators go through a Pratt loop driven by [`binary_op`].

use super::Parser;
use super::errors::{ParseErrorKind, ParseResult};
use super::precedence::{assignment_op, binary_op, prec};
use crate::compiler::lexer::TokenKind;
use crate::syntax::{Field, Node, SyntaxKind};

impl Parser {
    /// Parses a full expression.
    pub(super) fn parse_expression(&mut self) -> ParseResult<Node> {
        self.parse_assignment()
    }

    pub(super) fn parse_assignment(&mut self) -> ParseResult<Node> {
        if let Some(arrow) = self.try_arrow_function()? {
            return Ok(arrow);
        }

        let start = self.current().start;
        let left = self.parse_conditional()?;
        if let Some(op) = assignment_op(self.current().kind) {
            self.advance();
            let right = self.parse_assignment()?;
            return Ok(self.finish(
                SyntaxKind::BinaryExpression,
                vec![Field::node(left), Field::str(op), Field::node(right)],
                start,
            ));
        }
        Ok(left)
    }

    fn parse_conditional(&mut self) -> ParseResult<Node> {
        let start = self.current().start;
        let condition = self.parse_binary(0)?;
        if !self.eat(TokenKind::Question) {
            return Ok(condition);
        }
        let when_true = self.parse_assignment()?;
        self.expect(TokenKind::Colon, "':'", "conditional expression")?;
        let when_false = self.parse_assignment()?;
        Ok(self.finish(
            SyntaxKind::ConditionalExpression,
            vec![
                Field::node(condition),
                Field::node(when_true),
                Field::node(when_false),
            ],
            start,
        ))
    }

    fn parse_binary(&mut self, min_power: u8) -> ParseResult<Node> {
        let start = self.current().start;
        let mut left = self.parse_unary()?;

        loop {
            if self.at_word("as") && prec::RELATIONAL.left >= min_power {
                self.advance();
                let ty = self.parse_type()?;
                left = self.finish(
                    SyntaxKind::AsExpression,
                    vec![Field::node(left), Field::node(ty)],
                    start,
                );
                continue;
            }

            let Some((op, power)) = binary_op(self.current().kind) else {
                break;
            };
            if power.left < min_power {
                break;
            }
            self.advance();
            let right = self.parse_binary(power.right)?;
            left = self.finish(
                SyntaxKind::BinaryExpression,
                vec![Field::node(left), Field::str(op), Field::node(right)],
                start,
            );
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult<Node> {
        let start = self.current().start;
        let op = match self.current().kind {
            TokenKind::Bang => Some("!"),
            TokenKind::Minus => Some("-"),
            TokenKind::Plus => Some("+"),
            TokenKind::Tilde => Some("~"),
            TokenKind::Ident if self.at_word("typeof") => Some("typeof"),
            TokenKind::Ident if self.at_word("void") => Some("void"),
            _ => None,
        };
        let Some(op) = op else {
            return self.parse_left_hand_side();
        };
        self.advance();
        let operand = self.parse_unary()?;
        Ok(self.finish(
            SyntaxKind::PrefixUnaryExpression,
            vec![Field::str(op), Field::node(operand)],
            start,
        ))
    }

    /// Member accesses, calls and tagged templates.
    fn parse_left_hand_side(&mut self) -> ParseResult<Node> {
        let start = self.current().start;
        let mut expr = if self.at_word("new") {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };

        loop {
            match self.current().kind {
                TokenKind::Dot => {
                    self.advance();
                    let name = self.parse_identifier_name("property access")?;
                    expr = self.finish(
                        SyntaxKind::PropertyAccessExpression,
                        vec![Field::node(expr), Field::node(name)],
                        start,
                    );
                }
                TokenKind::LBracket => {
                    self.advance();
                    let argument = self.parse_expression()?;
                    self.expect(TokenKind::RBracket, "']'", "element access")?;
                    expr = self.finish(
                        SyntaxKind::ElementAccessExpression,
                        vec![Field::node(expr), Field::node(argument)],
                        start,
                    );
                }
                TokenKind::LParen => {
                    let arguments = self.parse_arguments()?;
                    expr = self.finish(
                        SyntaxKind::CallExpression,
                        vec![Field::node(expr), Field::List(vec![]), Field::List(arguments)],
                        start,
                    );
                }
                TokenKind::NoSubstitutionTemplate | TokenKind::TemplateHead => {
                    let template = self.parse_template()?;
                    expr = self.finish(
                        SyntaxKind::TaggedTemplateExpression,
                        vec![Field::node(expr), Field::List(vec![]), Field::node(template)],
                        start,
                    );
                }
                TokenKind::Lt => {
                    // `f<T>(...)` and ``tag<T>`...` ``; otherwise a comparison.
                    let Some(type_arguments) = self.try_parse(|p| {
                        let args = p.parse_type_arguments()?;
                        if p.at(TokenKind::LParen) || p.at_template_start() {
                            Ok(args)
                        } else {
                            Err(p.error(ParseErrorKind::UnexpectedToken, "type arguments"))
                        }
                    }) else {
                        break;
                    };
                    if self.at(TokenKind::LParen) {
                        let arguments = self.parse_arguments()?;
                        expr = self.finish(
                            SyntaxKind::CallExpression,
                            vec![
                                Field::node(expr),
                                Field::List(type_arguments),
                                Field::List(arguments),
                            ],
                            start,
                        );
                    } else {
                        let template = self.parse_template()?;
                        expr = self.finish(
                            SyntaxKind::TaggedTemplateExpression,
                            vec![
                                Field::node(expr),
                                Field::List(type_arguments),
                                Field::node(template),
                            ],
                            start,
                        );
                    }
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    fn at_template_start(&self) -> bool {
        matches!(
            self.current().kind,
            TokenKind::NoSubstitutionTemplate | TokenKind::TemplateHead
        )
    }

    fn parse_new(&mut self) -> ParseResult<Node> {
        let start = self.current().start;
        self.advance();
        let mut callee = self.parse_primary()?;
        loop {
            if self.eat(TokenKind::Dot) {
                let name = self.parse_identifier_name("property access")?;
                callee = self.finish(
                    SyntaxKind::PropertyAccessExpression,
                    vec![Field::node(callee), Field::node(name)],
                    start,
                );
            } else {
                break;
            }
        }
        let type_arguments = if self.at(TokenKind::Lt) {
            self.try_parse(|p| p.parse_type_arguments())
                .unwrap_or_default()
        } else {
            Vec::new()
        };
        let arguments = if self.at(TokenKind::LParen) {
            self.parse_arguments()?
        } else {
            Vec::new()
        };
        Ok(self.finish(
            SyntaxKind::NewExpression,
            vec![
                Field::node(callee),
                Field::List(type_arguments),
                Field::List(arguments),
            ],
            start,
        ))
    }

    fn parse_arguments(&mut self) -> ParseResult<Vec<Node>> {
        self.expect(TokenKind::LParen, "'('", "argument list")?;
        let mut arguments = Vec::new();
        while !self.at(TokenKind::RParen) {
            if self.at_eof() {
                return Err(self.error(ParseErrorKind::MissingClosingParen, "argument list"));
            }
            arguments.push(self.parse_spread_or_assignment()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen, "')'", "argument list")?;
        Ok(arguments)
    }

    fn parse_spread_or_assignment(&mut self) -> ParseResult<Node> {
        let start = self.current().start;
        if self.eat(TokenKind::DotDotDot) {
            let expression = self.parse_assignment()?;
            return Ok(self.finish(
                SyntaxKind::SpreadElement,
                vec![Field::node(expression)],
                start,
            ));
        }
        self.parse_assignment()
    }

    // =========================================================================
    // Primary expressions
    // =========================================================================

    fn parse_primary(&mut self) -> ParseResult<Node> {
        let start = self.current().start;
        match self.current().kind {
            TokenKind::Ident => {
                let word = self.current().text.clone();
                match word.as_str() {
                    "true" | "false" | "null" | "this" => {
                        self.advance();
                        let kind = match word.as_str() {
                            "true" => SyntaxKind::TrueKeyword,
                            "false" => SyntaxKind::FalseKeyword,
                            "null" => SyntaxKind::NullKeyword,
                            _ => SyntaxKind::ThisKeyword,
                        };
                        Ok(self.finish(kind, vec![], start))
                    }
                    "function" => self.parse_function_expression(),
                    "async" if self.peek_token(1).is_some_and(|t| t.is_ident("function")) => {
                        self.parse_function_expression()
                    }
                    _ => self.parse_identifier("expression"),
                }
            }
            TokenKind::Number => Ok(self.numeric_literal()),
            TokenKind::String => Ok(self.string_literal()),
            TokenKind::NoSubstitutionTemplate | TokenKind::TemplateHead => self.parse_template(),
            TokenKind::LParen => {
                self.advance();
                let expression = self.parse_expression()?;
                self.expect(TokenKind::RParen, "')'", "parenthesized expression")?;
                Ok(self.finish(
                    SyntaxKind::ParenthesizedExpression,
                    vec![Field::node(expression)],
                    start,
                ))
            }
            TokenKind::LBracket => self.parse_array_literal(),
            TokenKind::LBrace => self.parse_object_literal(),
            _ => Err(self.error(ParseErrorKind::ExpectedExpression, "expression")),
        }
    }

    /// Parses a template literal, with or without substitutions.
    fn parse_template(&mut self) -> ParseResult<Node> {
        let start = self.current().start;
        if self.at(TokenKind::NoSubstitutionTemplate) {
            let token = self.advance();
            return Ok(self.finish(
                SyntaxKind::NoSubstitutionTemplateLiteral,
                vec![Field::Str(token.value)],
                start,
            ));
        }

        let head = self.expect(TokenKind::TemplateHead, "template", "template literal")?;
        let mut spans = Vec::new();
        loop {
            let span_start = self.current().start;
            let expression = self.parse_expression()?;
            let literal = self.advance();
            match literal.kind {
                TokenKind::TemplateMiddle | TokenKind::TemplateTail => {}
                _ => {
                    return Err(self
                        .error(ParseErrorKind::ExpectedToken, "template literal")
                        .with_expected(&["'}'"]));
                }
            }
            let is_tail = literal.kind == TokenKind::TemplateTail;
            spans.push(self.finish(
                SyntaxKind::TemplateSpan,
                vec![Field::node(expression), Field::Str(literal.value)],
                span_start,
            ));
            if is_tail {
                break;
            }
        }
        Ok(self.finish(
            SyntaxKind::TemplateExpression,
            vec![Field::Str(head.value), Field::List(spans)],
            start,
        ))
    }

    fn parse_array_literal(&mut self) -> ParseResult<Node> {
        let start = self.current().start;
        self.advance();
        let mut elements = Vec::new();
        while !self.at(TokenKind::RBracket) {
            if self.at_eof() {
                return Err(self
                    .error(ParseErrorKind::UnexpectedEof, "array literal")
                    .with_expected(&["']'"]));
            }
            elements.push(self.parse_spread_or_assignment()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBracket, "']'", "array literal")?;
        Ok(self.finish(
            SyntaxKind::ArrayLiteralExpression,
            vec![Field::List(elements)],
            start,
        ))
    }

    fn parse_object_literal(&mut self) -> ParseResult<Node> {
        let start = self.current().start;
        self.advance();
        let mut properties = Vec::new();
        while !self.at(TokenKind::RBrace) {
            if self.at_eof() {
                return Err(self.error(ParseErrorKind::MissingClosingBrace, "object literal"));
            }
            properties.push(self.parse_object_member()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace, "'}'", "object literal")?;
        Ok(self.finish(
            SyntaxKind::ObjectLiteralExpression,
            vec![Field::List(properties)],
            start,
        ))
    }

    fn parse_object_member(&mut self) -> ParseResult<Node> {
        let start = self.current().start;
        if self.eat(TokenKind::DotDotDot) {
            let expression = self.parse_assignment()?;
            return Ok(self.finish(
                SyntaxKind::SpreadAssignment,
                vec![Field::node(expression)],
                start,
            ));
        }

        let name = match self.current().kind {
            TokenKind::String => self.string_literal(),
            TokenKind::Number => self.numeric_literal(),
            _ => self.parse_identifier_name("object literal")?,
        };

        if self.eat(TokenKind::Colon) {
            let initializer = self.parse_assignment()?;
            return Ok(self.finish(
                SyntaxKind::PropertyAssignment,
                vec![Field::node(name), Field::node(initializer)],
                start,
            ));
        }

        if name.is(SyntaxKind::Identifier) {
            return Ok(self.finish(
                SyntaxKind::ShorthandPropertyAssignment,
                vec![Field::node(name)],
                start,
            ));
        }

        Err(self
            .error(ParseErrorKind::ExpectedToken, "object literal")
            .with_expected(&["':'"]))
    }

    // =========================================================================
    // Functions
    // =========================================================================

    fn parse_function_expression(&mut self) -> ParseResult<Node> {
        let start = self.current().start;
        let is_async = self.eat_word("async");
        self.expect_word("function", "function expression")?;
        let name = if self.at(TokenKind::Ident) {
            Some(self.parse_identifier("function expression")?)
        } else {
            None
        };
        let type_parameters = self.parse_optional_type_parameters()?;
        let parameters = self.parse_parameters()?;
        let ty = if self.eat(TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let body = self.parse_block()?;
        Ok(self.finish(
            SyntaxKind::FunctionExpression,
            vec![
                Field::Bool(is_async),
                Field::opt(name),
                Field::List(type_parameters),
                Field::List(parameters),
                Field::opt(ty),
                Field::node(body),
            ],
            start,
        ))
    }

    /// Parses an arrow function if one starts here.
    ///
    /// `x => ...` is recognized by lookahead; parenthesized and generic heads
    /// are parsed speculatively and rewound when no `=>` follows.
    fn try_arrow_function(&mut self) -> ParseResult<Option<Node>> {
        let start = self.current().start;
        let is_async = self.at_word("async")
            // `async => ...` names a parameter `async`.
            && self.peek_kind(1) != TokenKind::Arrow
            && matches!(
                self.peek_kind(1),
                TokenKind::Ident | TokenKind::LParen | TokenKind::Lt
            )
            && !self.peek_token(1).is_some_and(|t| t.newline_before);
        let saved = self.pos;
        if is_async {
            self.advance();
        }

        // `x => ...`
        if self.at(TokenKind::Ident)
            && self.peek_kind(1) == TokenKind::Arrow
            && !super::is_reserved(&self.current().text)
        {
            let param_start = self.current().start;
            let name = self.parse_identifier("arrow function")?;
            let parameter = self.finish(
                SyntaxKind::Parameter,
                vec![
                    Field::Bool(false),
                    Field::node(name),
                    Field::Bool(false),
                    Field::Absent,
                    Field::Absent,
                ],
                param_start,
            );
            self.advance();
            let body = self.parse_arrow_body()?;
            return Ok(Some(self.finish(
                SyntaxKind::ArrowFunction,
                vec![
                    Field::Bool(is_async),
                    Field::List(vec![]),
                    Field::List(vec![parameter]),
                    Field::Absent,
                    Field::node(body),
                ],
                start,
            )));
        }

        if !matches!(self.current().kind, TokenKind::LParen | TokenKind::Lt) {
            self.pos = saved;
            return Ok(None);
        }

        let head = self.try_parse(|p| {
            let type_parameters = p.parse_optional_type_parameters()?;
            let parameters = p.parse_parameters()?;
            let ty = if p.eat(TokenKind::Colon) {
                Some(p.parse_type()?)
            } else {
                None
            };
            p.expect(TokenKind::Arrow, "'=>'", "arrow function")?;
            Ok((type_parameters, parameters, ty))
        });
        let Some((type_parameters, parameters, ty)) = head else {
            self.pos = saved;
            return Ok(None);
        };

        let body = self.parse_arrow_body()?;
        Ok(Some(self.finish(
            SyntaxKind::ArrowFunction,
            vec![
                Field::Bool(is_async),
                Field::List(type_parameters),
                Field::List(parameters),
                Field::opt(ty),
                Field::node(body),
            ],
            start,
        )))
    }

    fn parse_arrow_body(&mut self) -> ParseResult<Node> {
        if self.at(TokenKind::LBrace) {
            self.parse_block()
        } else {
            self.parse_assignment()
        }
    }
}
