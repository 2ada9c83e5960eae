//! Source printer.
//!
//! Prints a tree back to host source. Parentheses are inserted where the
//! tree's shape needs them, so synthesized trees print correctly without
//! explicit `ParenthesizedExpression` nodes; existing parentheses print as
//! written.

use super::parser::precedence::{operator_power, prec};
use crate::syntax::{Node, SyntaxKind};

const INDENT: &str = "    ";

/// Binding strength of printed expressions, loosest first.
mod power {
    pub const ASSIGNMENT: u8 = 2;
    pub const CONDITIONAL: u8 = 4;
    pub const UNARY: u8 = 30;
    pub const POSTFIX: u8 = 40;
    pub const PRIMARY: u8 = 50;
}

/// Prints a node as source text.
///
/// A `SourceFile` prints one statement per line with a trailing newline;
/// anything else prints without one.
pub fn print(node: &Node) -> String {
    let mut printer = Printer::default();
    printer.node(node);
    printer.out
}

#[derive(Default)]
struct Printer {
    out: String,
    depth: usize,
}

impl Printer {
    fn write(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn newline(&mut self) {
        self.out.push('\n');
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
    }

    fn node(&mut self, node: &Node) {
        match node.kind() {
            SyntaxKind::SourceFile => {
                for stmt in node.list("statements") {
                    self.statement(stmt);
                    self.out.push('\n');
                }
            }
            kind if kind.is_statement() => self.statement(node),
            kind if is_type(kind) => self.ty(node),
            SyntaxKind::ImportClause => self.import_clause(node),
            SyntaxKind::NamespaceImport | SyntaxKind::NamedImports => self.named_bindings(node),
            SyntaxKind::ImportSpecifier => self.import_specifier(node),
            SyntaxKind::VariableDeclarationList => self.variable_declaration_list(node),
            SyntaxKind::VariableDeclaration => self.variable_declaration(node),
            SyntaxKind::Parameter => self.parameter(node),
            SyntaxKind::TypeParameter => self.type_parameter(node),
            SyntaxKind::PropertySignature => self.property_signature(node),
            SyntaxKind::TemplateSpan => {
                if let Some(expr) = node.child("expression") {
                    self.expr(expr, 0);
                }
            }
            _ => self.expr(node, 0),
        }
    }

    fn comma_list(&mut self, nodes: &[Node], mut each: impl FnMut(&mut Self, &Node)) {
        for (i, node) in nodes.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            each(self, node);
        }
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn statement(&mut self, node: &Node) {
        match node.kind() {
            SyntaxKind::ImportDeclaration => self.import_declaration(node),
            SyntaxKind::VariableStatement => {
                if node.flag("exported") {
                    self.write("export ");
                }
                if let Some(list) = node.child("declarationList") {
                    self.variable_declaration_list(list);
                }
                self.write(";");
            }
            SyntaxKind::FunctionDeclaration => {
                if node.flag("exported") {
                    self.write("export ");
                }
                self.function_like(node, "function");
                if node.child("body").is_none() {
                    self.write(";");
                }
            }
            SyntaxKind::Block => self.block(node),
            SyntaxKind::ExpressionStatement => {
                if let Some(expr) = node.child("expression") {
                    if starts_ambiguously(expr) {
                        self.write("(");
                        self.expr(expr, 0);
                        self.write(")");
                    } else {
                        self.expr(expr, 0);
                    }
                }
                self.write(";");
            }
            SyntaxKind::ReturnStatement => {
                self.write("return");
                if let Some(expr) = node.child("expression") {
                    self.write(" ");
                    self.expr(expr, 0);
                }
                self.write(";");
            }
            SyntaxKind::IfStatement => {
                self.write("if (");
                if let Some(condition) = node.child("expression") {
                    self.expr(condition, 0);
                }
                self.write(") ");
                if let Some(then) = node.child("thenStatement") {
                    self.statement(then);
                }
                if let Some(otherwise) = node.child("elseStatement") {
                    self.write(" else ");
                    self.statement(otherwise);
                }
            }
            SyntaxKind::ThrowStatement => {
                self.write("throw ");
                if let Some(expr) = node.child("expression") {
                    self.expr(expr, 0);
                }
                self.write(";");
            }
            SyntaxKind::EmptyStatement => self.write(";"),
            _ => self.node(node),
        }
    }

    fn block(&mut self, node: &Node) {
        let statements = node.list("statements");
        if statements.is_empty() {
            self.write("{}");
            return;
        }
        self.write("{");
        self.depth += 1;
        for stmt in statements {
            self.newline();
            self.statement(stmt);
        }
        self.depth -= 1;
        self.newline();
        self.write("}");
    }

    fn import_declaration(&mut self, node: &Node) {
        self.write("import ");
        if let Some(clause) = node.child("importClause") {
            self.import_clause(clause);
            self.write(" from ");
        }
        if let Some(module) = node.child("moduleSpecifier") {
            self.expr(module, 0);
        }
        self.write(";");
    }

    fn import_clause(&mut self, clause: &Node) {
        let name = clause.child("name");
        if let Some(name) = name {
            self.expr(name, 0);
        }
        if let Some(bindings) = clause.child("namedBindings") {
            if name.is_some() {
                self.write(", ");
            }
            self.named_bindings(bindings);
        }
    }

    fn named_bindings(&mut self, bindings: &Node) {
        if bindings.is(SyntaxKind::NamespaceImport) {
            self.write("* as ");
            if let Some(name) = bindings.child("name") {
                self.expr(name, 0);
            }
            return;
        }
        self.write("{ ");
        self.comma_list(bindings.list("elements"), |p, spec| p.import_specifier(spec));
        self.write(" }");
    }

    fn import_specifier(&mut self, spec: &Node) {
        if let Some(property) = spec.child("propertyName") {
            self.expr(property, 0);
            self.write(" as ");
        }
        if let Some(name) = spec.child("name") {
            self.expr(name, 0);
        }
    }

    fn variable_declaration_list(&mut self, list: &Node) {
        self.write(list.str("keyword").unwrap_or("const"));
        self.write(" ");
        self.comma_list(list.list("declarations"), |p, decl| p.variable_declaration(decl));
    }

    fn variable_declaration(&mut self, decl: &Node) {
        if let Some(name) = decl.child("name") {
            self.expr(name, 0);
        }
        self.type_annotation(decl);
        if let Some(init) = decl.child("initializer") {
            self.write(" = ");
            self.expr(init, power::ASSIGNMENT);
        }
    }

    /// Shared by function declarations and function expressions.
    fn function_like(&mut self, node: &Node, keyword: &str) {
        if node.flag("async") {
            self.write("async ");
        }
        self.write(keyword);
        if let Some(name) = node.child("name") {
            self.write(" ");
            self.expr(name, 0);
        }
        self.signature(node);
        if let Some(body) = node.child("body") {
            self.write(" ");
            self.block(body);
        }
    }

    /// Type parameters, parameters and return type.
    fn signature(&mut self, node: &Node) {
        self.type_parameters(node.list("typeParameters"));
        self.write("(");
        self.comma_list(node.list("parameters"), |p, param| p.parameter(param));
        self.write(")");
        self.type_annotation(node);
    }

    fn parameter(&mut self, param: &Node) {
        if param.flag("dotDotDotToken") {
            self.write("...");
        }
        if let Some(name) = param.child("name") {
            self.expr(name, 0);
        }
        if param.flag("questionToken") {
            self.write("?");
        }
        self.type_annotation(param);
        if let Some(init) = param.child("initializer") {
            self.write(" = ");
            self.expr(init, power::ASSIGNMENT);
        }
    }

    fn type_annotation(&mut self, node: &Node) {
        if let Some(ty) = node.child("type") {
            self.write(": ");
            self.ty(ty);
        }
    }

    fn type_parameters(&mut self, params: &[Node]) {
        if params.is_empty() {
            return;
        }
        self.write("<");
        self.comma_list(params, |p, param| p.type_parameter(param));
        self.write(">");
    }

    fn type_parameter(&mut self, param: &Node) {
        if let Some(name) = param.child("name") {
            self.expr(name, 0);
        }
        if let Some(constraint) = param.child("constraint") {
            self.write(" extends ");
            self.ty(constraint);
        }
        if let Some(default) = param.child("default") {
            self.write(" = ");
            self.ty(default);
        }
    }

    fn type_arguments(&mut self, args: &[Node]) {
        if args.is_empty() {
            return;
        }
        self.write("<");
        self.comma_list(args, |p, arg| p.ty(arg));
        self.write(">");
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    /// Prints an expression, parenthesized when it binds looser than
    /// `min_power`.
    fn expr(&mut self, node: &Node, min_power: u8) {
        if expr_power(node) < min_power {
            self.write("(");
            self.expr_inner(node);
            self.write(")");
        } else {
            self.expr_inner(node);
        }
    }

    fn expr_inner(&mut self, node: &Node) {
        match node.kind() {
            SyntaxKind::Identifier | SyntaxKind::NumericLiteral => {
                self.write(node.str("text").unwrap_or_default());
            }
            SyntaxKind::StringLiteral => {
                let quote = if node.flag("singleQuote") { '\'' } else { '"' };
                let text = quote_string(node.str("text").unwrap_or_default(), quote);
                self.write(&text);
            }
            SyntaxKind::TrueKeyword => self.write("true"),
            SyntaxKind::FalseKeyword => self.write("false"),
            SyntaxKind::NullKeyword => self.write("null"),
            SyntaxKind::ThisKeyword => self.write("this"),
            SyntaxKind::NoSubstitutionTemplateLiteral => {
                self.write("`");
                self.write(&escape_template(node.str("text").unwrap_or_default()));
                self.write("`");
            }
            SyntaxKind::TemplateExpression => {
                self.write("`");
                self.write(&escape_template(node.str("head").unwrap_or_default()));
                for span in node.list("templateSpans") {
                    self.write("${");
                    if let Some(expr) = span.child("expression") {
                        self.expr(expr, 0);
                    }
                    self.write("}");
                    self.write(&escape_template(span.str("literal").unwrap_or_default()));
                }
                self.write("`");
            }
            SyntaxKind::TaggedTemplateExpression => {
                if let Some(tag) = node.child("tag") {
                    self.expr(tag, power::POSTFIX);
                }
                self.type_arguments(node.list("typeArguments"));
                if let Some(template) = node.child("template") {
                    self.expr(template, 0);
                }
            }
            SyntaxKind::ArrowFunction => {
                if node.flag("async") {
                    self.write("async ");
                }
                self.signature(node);
                self.write(" => ");
                if let Some(body) = node.child("body") {
                    if body.is(SyntaxKind::Block) {
                        self.block(body);
                    } else if body.is(SyntaxKind::ObjectLiteralExpression) {
                        self.write("(");
                        self.expr(body, 0);
                        self.write(")");
                    } else {
                        self.expr(body, power::ASSIGNMENT);
                    }
                }
            }
            SyntaxKind::FunctionExpression => self.function_like(node, "function"),
            SyntaxKind::CallExpression => {
                if let Some(callee) = node.child("expression") {
                    self.expr(callee, power::POSTFIX);
                }
                self.type_arguments(node.list("typeArguments"));
                self.arguments(node.list("arguments"));
            }
            SyntaxKind::NewExpression => {
                self.write("new ");
                if let Some(callee) = node.child("expression") {
                    if callee.is(SyntaxKind::CallExpression) {
                        self.write("(");
                        self.expr(callee, 0);
                        self.write(")");
                    } else {
                        self.expr(callee, power::POSTFIX);
                    }
                }
                self.type_arguments(node.list("typeArguments"));
                self.arguments(node.list("arguments"));
            }
            SyntaxKind::PropertyAccessExpression => {
                if let Some(object) = node.child("expression") {
                    self.expr(object, power::POSTFIX);
                    // `1.toString()` would lex as a number.
                    if object.is(SyntaxKind::NumericLiteral)
                        && object.str("text").is_some_and(|t| !t.contains('.'))
                    {
                        self.write(".");
                    }
                }
                self.write(".");
                if let Some(name) = node.child("name") {
                    self.expr(name, 0);
                }
            }
            SyntaxKind::ElementAccessExpression => {
                if let Some(object) = node.child("expression") {
                    self.expr(object, power::POSTFIX);
                }
                self.write("[");
                if let Some(arg) = node.child("argumentExpression") {
                    self.expr(arg, 0);
                }
                self.write("]");
            }
            SyntaxKind::ParenthesizedExpression => {
                self.write("(");
                if let Some(expr) = node.child("expression") {
                    self.expr(expr, 0);
                }
                self.write(")");
            }
            SyntaxKind::ArrayLiteralExpression => {
                self.write("[");
                self.comma_list(node.list("elements"), |p, e| p.expr(e, power::ASSIGNMENT));
                self.write("]");
            }
            SyntaxKind::ObjectLiteralExpression => {
                let properties = node.list("properties");
                if properties.is_empty() {
                    self.write("{}");
                    return;
                }
                self.write("{ ");
                self.comma_list(properties, |p, prop| p.expr(prop, 0));
                self.write(" }");
            }
            SyntaxKind::PropertyAssignment => {
                if let Some(name) = node.child("name") {
                    self.expr(name, 0);
                }
                self.write(": ");
                if let Some(init) = node.child("initializer") {
                    self.expr(init, power::ASSIGNMENT);
                }
            }
            SyntaxKind::ShorthandPropertyAssignment => {
                if let Some(name) = node.child("name") {
                    self.expr(name, 0);
                }
            }
            SyntaxKind::SpreadAssignment | SyntaxKind::SpreadElement => {
                self.write("...");
                if let Some(expr) = node.child("expression") {
                    self.expr(expr, power::ASSIGNMENT);
                }
            }
            SyntaxKind::BinaryExpression => {
                let op = node.str("operator").unwrap_or_default();
                let op_power = operator_power(op);
                let (left_min, right_min) = if op_power == power::ASSIGNMENT {
                    (power::POSTFIX, power::ASSIGNMENT)
                } else {
                    (op_power, op_power + 1)
                };
                if let Some(left) = node.child("left") {
                    self.expr(left, left_min);
                }
                self.write(" ");
                self.write(op);
                self.write(" ");
                if let Some(right) = node.child("right") {
                    self.expr(right, right_min);
                }
            }
            SyntaxKind::PrefixUnaryExpression => {
                let op = node.str("operator").unwrap_or_default();
                self.write(op);
                if op.chars().all(char::is_alphabetic) {
                    self.write(" ");
                }
                if let Some(operand) = node.child("operand") {
                    // `- -x` must not print as `--x`.
                    if operand.is(SyntaxKind::PrefixUnaryExpression)
                        && matches!(op, "-" | "+")
                        && operand.str("operator") == Some(op)
                    {
                        self.write(" ");
                    }
                    self.expr(operand, power::UNARY);
                }
            }
            SyntaxKind::ConditionalExpression => {
                if let Some(condition) = node.child("condition") {
                    self.expr(condition, power::CONDITIONAL + 1);
                }
                self.write(" ? ");
                if let Some(when_true) = node.child("whenTrue") {
                    self.expr(when_true, power::ASSIGNMENT);
                }
                self.write(" : ");
                if let Some(when_false) = node.child("whenFalse") {
                    self.expr(when_false, power::ASSIGNMENT);
                }
            }
            SyntaxKind::AsExpression => {
                if let Some(expr) = node.child("expression") {
                    self.expr(expr, prec::RELATIONAL.left);
                }
                self.write(" as ");
                if let Some(ty) = node.child("type") {
                    self.ty(ty);
                }
            }
            _ => self.node(node),
        }
    }

    fn arguments(&mut self, args: &[Node]) {
        self.write("(");
        self.comma_list(args, |p, arg| p.expr(arg, power::ASSIGNMENT));
        self.write(")");
    }

    // =========================================================================
    // Types
    // =========================================================================

    fn ty(&mut self, node: &Node) {
        match node.kind() {
            SyntaxKind::TypeReference => {
                if let Some(name) = node.child("typeName") {
                    self.ty(name);
                }
                self.type_arguments(node.list("typeArguments"));
            }
            SyntaxKind::QualifiedName => {
                if let Some(left) = node.child("left") {
                    self.ty(left);
                }
                self.write(".");
                if let Some(right) = node.child("right") {
                    self.ty(right);
                }
            }
            SyntaxKind::KeywordType => self.write(node.str("keyword").unwrap_or("any")),
            SyntaxKind::TypeLiteral => {
                let members = node.list("members");
                if members.is_empty() {
                    self.write("{}");
                    return;
                }
                self.write("{ ");
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        self.write(" ");
                    }
                    self.property_signature(member);
                    self.write(";");
                }
                self.write(" }");
            }
            SyntaxKind::ArrayType => {
                if let Some(element) = node.child("elementType") {
                    let wrap = matches!(
                        element.kind(),
                        SyntaxKind::UnionType | SyntaxKind::FunctionType
                    );
                    if wrap {
                        self.write("(");
                    }
                    self.ty(element);
                    if wrap {
                        self.write(")");
                    }
                }
                self.write("[]");
            }
            SyntaxKind::UnionType => {
                for (i, member) in node.list("types").iter().enumerate() {
                    if i > 0 {
                        self.write(" | ");
                    }
                    if member.is(SyntaxKind::FunctionType) {
                        self.write("(");
                        self.ty(member);
                        self.write(")");
                    } else {
                        self.ty(member);
                    }
                }
            }
            SyntaxKind::LiteralType => {
                if let Some(literal) = node.child("literal") {
                    self.expr(literal, 0);
                }
            }
            SyntaxKind::FunctionType => {
                self.type_parameters(node.list("typeParameters"));
                self.write("(");
                self.comma_list(node.list("parameters"), |p, param| p.parameter(param));
                self.write(") => ");
                if let Some(ret) = node.child("type") {
                    self.ty(ret);
                }
            }
            SyntaxKind::Identifier => self.expr(node, 0),
            _ => self.node(node),
        }
    }
}

impl Printer {
    fn property_signature(&mut self, member: &Node) {
        if let Some(name) = member.child("name") {
            self.expr(name, 0);
        }
        if member.flag("questionToken") {
            self.write("?");
        }
        self.type_annotation(member);
    }
}

fn is_type(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::TypeReference
            | SyntaxKind::QualifiedName
            | SyntaxKind::KeywordType
            | SyntaxKind::TypeLiteral
            | SyntaxKind::ArrayType
            | SyntaxKind::UnionType
            | SyntaxKind::LiteralType
            | SyntaxKind::FunctionType
    )
}

fn expr_power(node: &Node) -> u8 {
    match node.kind() {
        SyntaxKind::ArrowFunction => power::ASSIGNMENT,
        SyntaxKind::ConditionalExpression => power::CONDITIONAL,
        SyntaxKind::BinaryExpression => operator_power(node.str("operator").unwrap_or_default()),
        SyntaxKind::AsExpression => prec::RELATIONAL.left,
        SyntaxKind::PrefixUnaryExpression => power::UNARY,
        SyntaxKind::CallExpression
        | SyntaxKind::NewExpression
        | SyntaxKind::PropertyAccessExpression
        | SyntaxKind::ElementAccessExpression
        | SyntaxKind::TaggedTemplateExpression => power::POSTFIX,
        _ => power::PRIMARY,
    }
}

/// Whether an expression statement would be misread as a block or a
/// declaration if printed without parentheses.
fn starts_ambiguously(expr: &Node) -> bool {
    let mut leftmost = expr;
    loop {
        let next = match leftmost.kind() {
            SyntaxKind::ObjectLiteralExpression | SyntaxKind::FunctionExpression => return true,
            SyntaxKind::CallExpression
            | SyntaxKind::PropertyAccessExpression
            | SyntaxKind::ElementAccessExpression
            | SyntaxKind::AsExpression => leftmost.child("expression"),
            SyntaxKind::TaggedTemplateExpression => leftmost.child("tag"),
            SyntaxKind::BinaryExpression => leftmost.child("left"),
            SyntaxKind::ConditionalExpression => leftmost.child("condition"),
            _ => None,
        };
        match next {
            // A child that will itself be parenthesized starts with `(`.
            Some(child) if expr_power(child) >= expr_power(leftmost) => leftmost = child,
            _ => return false,
        }
    }
}

/// Quotes and escapes a string literal.
pub fn quote_string(text: &str, quote: char) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push(quote);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

fn escape_template(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '`' => out.push_str("\\`"),
            '$' if chars.peek() == Some(&'{') => out.push_str("\\$"),
            c => out.push(c),
        }
    }
    out
}
