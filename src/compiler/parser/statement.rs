//! Statements, declarations and imports.

use super::Parser;
use super::errors::{ParseErrorKind, ParseResult};
use crate::compiler::lexer::TokenKind;
use crate::syntax::{Field, Node, SyntaxKind};

impl Parser {
    pub(super) fn parse_statement(&mut self) -> ParseResult<Node> {
        let start = self.current().start;
        match self.current().kind {
            TokenKind::LBrace => return self.parse_block(),
            TokenKind::Semicolon => {
                self.advance();
                return Ok(self.finish(SyntaxKind::EmptyStatement, vec![], start));
            }
            TokenKind::Ident => {}
            _ => return self.parse_expression_statement(),
        }

        let word = self.current().text.clone();
        match word.as_str() {
            "import"
                if !matches!(self.peek_kind(1), TokenKind::LParen | TokenKind::Dot) =>
            {
                self.parse_import_declaration()
            }
            "export" => self.parse_export(),
            "const" | "let" | "var" => self.parse_variable_statement(false, start),
            "function" => self.parse_function_declaration(false, start),
            "async" if self.peek_token(1).is_some_and(|t| t.is_ident("function")) => {
                self.parse_function_declaration(false, start)
            }
            "return" => self.parse_return_statement(),
            "if" => self.parse_if_statement(),
            "throw" => {
                self.advance();
                let expression = self.parse_expression()?;
                self.consume_semicolon("throw statement")?;
                Ok(self.finish(
                    SyntaxKind::ThrowStatement,
                    vec![Field::node(expression)],
                    start,
                ))
            }
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_expression_statement(&mut self) -> ParseResult<Node> {
        let start = self.current().start;
        let expression = self.parse_expression()?;
        self.consume_semicolon("expression statement")?;
        Ok(self.finish(
            SyntaxKind::ExpressionStatement,
            vec![Field::node(expression)],
            start,
        ))
    }

    pub(super) fn parse_block(&mut self) -> ParseResult<Node> {
        let start = self.current().start;
        self.expect(TokenKind::LBrace, "'{'", "block")?;
        let mut statements = Vec::new();
        while !self.at(TokenKind::RBrace) {
            if self.at_eof() {
                return Err(self.error(ParseErrorKind::MissingClosingBrace, "block"));
            }
            statements.push(self.parse_statement()?);
        }
        self.advance();
        Ok(self.finish(SyntaxKind::Block, vec![Field::List(statements)], start))
    }

    fn parse_return_statement(&mut self) -> ParseResult<Node> {
        let start = self.current().start;
        self.advance();
        let expression = if self.at(TokenKind::Semicolon)
            || self.at(TokenKind::RBrace)
            || self.at_eof()
            || self.current().newline_before
        {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume_semicolon("return statement")?;
        Ok(self.finish(
            SyntaxKind::ReturnStatement,
            vec![Field::opt(expression)],
            start,
        ))
    }

    fn parse_if_statement(&mut self) -> ParseResult<Node> {
        let start = self.current().start;
        self.advance();
        self.expect(TokenKind::LParen, "'('", "if statement")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RParen, "')'", "if statement")?;
        let then_statement = self.parse_statement()?;
        let else_statement = if self.eat_word("else") {
            Some(self.parse_statement()?)
        } else {
            None
        };
        Ok(self.finish(
            SyntaxKind::IfStatement,
            vec![
                Field::node(condition),
                Field::node(then_statement),
                Field::opt(else_statement),
            ],
            start,
        ))
    }

    fn parse_export(&mut self) -> ParseResult<Node> {
        let start = self.current().start;
        self.advance();
        if self.at_word("const") || self.at_word("let") || self.at_word("var") {
            return self.parse_variable_statement(true, start);
        }
        if self.at_word("function") || self.at_word("async") {
            return self.parse_function_declaration(true, start);
        }
        Err(self
            .error(ParseErrorKind::UnexpectedToken, "export declaration")
            .with_expected(&["'const'", "'let'", "'var'", "'function'"]))
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn parse_variable_statement(&mut self, exported: bool, start: usize) -> ParseResult<Node> {
        let list_start = self.current().start;
        let keyword = self.advance().text;
        let mut declarations = Vec::new();
        loop {
            let decl_start = self.current().start;
            let name = self.parse_identifier("variable declaration")?;
            let ty = if self.eat(TokenKind::Colon) {
                Some(self.parse_type()?)
            } else {
                None
            };
            let initializer = if self.eat(TokenKind::Eq) {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            declarations.push(self.finish(
                SyntaxKind::VariableDeclaration,
                vec![Field::node(name), Field::opt(ty), Field::opt(initializer)],
                decl_start,
            ));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        let list = self.finish(
            SyntaxKind::VariableDeclarationList,
            vec![Field::Str(keyword), Field::List(declarations)],
            list_start,
        );
        self.consume_semicolon("variable statement")?;
        Ok(self.finish(
            SyntaxKind::VariableStatement,
            vec![Field::Bool(exported), Field::node(list)],
            start,
        ))
    }

    fn parse_function_declaration(&mut self, exported: bool, start: usize) -> ParseResult<Node> {
        let is_async = self.eat_word("async");
        self.expect_word("function", "function declaration")?;
        let name = self.parse_identifier("function declaration")?;
        let type_parameters = self.parse_optional_type_parameters()?;
        let parameters = self.parse_parameters()?;
        let ty = if self.eat(TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let body = if self.at(TokenKind::LBrace) {
            Some(self.parse_block()?)
        } else {
            // Overload signature.
            self.consume_semicolon("function declaration")?;
            None
        };
        Ok(self.finish(
            SyntaxKind::FunctionDeclaration,
            vec![
                Field::Bool(exported),
                Field::Bool(is_async),
                Field::node(name),
                Field::List(type_parameters),
                Field::List(parameters),
                Field::opt(ty),
                Field::opt(body),
            ],
            start,
        ))
    }

    /// Parses `( param, ... )`.
    pub(super) fn parse_parameters(&mut self) -> ParseResult<Vec<Node>> {
        self.expect(TokenKind::LParen, "'('", "parameter list")?;
        let mut parameters = Vec::new();
        while !self.at(TokenKind::RParen) {
            let start = self.current().start;
            let rest = self.eat(TokenKind::DotDotDot);
            let name = self.parse_identifier("parameter")?;
            let question = self.eat(TokenKind::Question);
            let ty = if self.eat(TokenKind::Colon) {
                Some(self.parse_type()?)
            } else {
                None
            };
            let initializer = if self.eat(TokenKind::Eq) {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            parameters.push(self.finish(
                SyntaxKind::Parameter,
                vec![
                    Field::Bool(rest),
                    Field::node(name),
                    Field::Bool(question),
                    Field::opt(ty),
                    Field::opt(initializer),
                ],
                start,
            ));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen, "')'", "parameter list")?;
        Ok(parameters)
    }

    /// Parses `<T extends C = D, ...>` when present.
    pub(super) fn parse_optional_type_parameters(&mut self) -> ParseResult<Vec<Node>> {
        if !self.eat(TokenKind::Lt) {
            return Ok(Vec::new());
        }
        let mut parameters = Vec::new();
        while !self.at(TokenKind::Gt) {
            let start = self.current().start;
            let name = self.parse_identifier("type parameter")?;
            let constraint = if self.eat_word("extends") {
                Some(self.parse_type()?)
            } else {
                None
            };
            let default = if self.eat(TokenKind::Eq) {
                Some(self.parse_type()?)
            } else {
                None
            };
            parameters.push(self.finish(
                SyntaxKind::TypeParameter,
                vec![Field::node(name), Field::opt(constraint), Field::opt(default)],
                start,
            ));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::Gt, "'>'", "type parameter list")?;
        Ok(parameters)
    }

    // =========================================================================
    // Imports
    // =========================================================================

    fn parse_import_declaration(&mut self) -> ParseResult<Node> {
        let start = self.current().start;
        self.advance();

        if self.at(TokenKind::String) {
            let module = self.string_literal();
            self.consume_semicolon("import declaration")?;
            return Ok(self.finish(
                SyntaxKind::ImportDeclaration,
                vec![Field::Absent, Field::node(module)],
                start,
            ));
        }

        let clause_start = self.current().start;
        let mut default_name = None;
        let mut named_bindings = None;

        if self.at(TokenKind::Ident) && !self.at_word("from") {
            default_name = Some(self.parse_identifier("import clause")?);
            if self.eat(TokenKind::Comma) {
                named_bindings = Some(self.parse_named_bindings()?);
            }
        } else if self.at(TokenKind::LBrace) || self.at(TokenKind::Star) {
            named_bindings = Some(self.parse_named_bindings()?);
        } else {
            return Err(self.error(ParseErrorKind::InvalidImport, "import declaration"));
        }

        let clause = self.finish(
            SyntaxKind::ImportClause,
            vec![Field::opt(default_name), Field::opt(named_bindings)],
            clause_start,
        );

        self.expect_word("from", "import declaration")?;
        if !self.at(TokenKind::String) {
            return Err(self
                .error(ParseErrorKind::InvalidImport, "import declaration")
                .with_expected(&["module specifier string"]));
        }
        let module = self.string_literal();
        self.consume_semicolon("import declaration")?;
        Ok(self.finish(
            SyntaxKind::ImportDeclaration,
            vec![Field::node(clause), Field::node(module)],
            start,
        ))
    }

    /// `{ a, b as c }` or `* as ns`.
    fn parse_named_bindings(&mut self) -> ParseResult<Node> {
        let start = self.current().start;
        if self.eat(TokenKind::Star) {
            self.expect_word("as", "namespace import")?;
            let name = self.parse_identifier("namespace import")?;
            return Ok(self.finish(
                SyntaxKind::NamespaceImport,
                vec![Field::node(name)],
                start,
            ));
        }

        self.expect(TokenKind::LBrace, "'{'", "named imports")?;
        let mut elements = Vec::new();
        while !self.at(TokenKind::RBrace) {
            let spec_start = self.current().start;
            let imported = self.parse_identifier_name("import specifier")?;
            let (property_name, name) = if self.eat_word("as") {
                (Some(imported), self.parse_identifier("import specifier")?)
            } else {
                (None, imported)
            };
            elements.push(self.finish(
                SyntaxKind::ImportSpecifier,
                vec![Field::opt(property_name), Field::node(name)],
                spec_start,
            ));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace, "'}'", "named imports")?;
        Ok(self.finish(
            SyntaxKind::NamedImports,
            vec![Field::List(elements)],
            start,
        ))
    }
}
