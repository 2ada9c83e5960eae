use super::*;
use crate::compiler::printer::print;
use pretty_assertions::assert_eq;

fn parse(input: &str) -> Node {
    Parser::new(input).unwrap().parse_module().unwrap()
}

fn first_statement(input: &str) -> Node {
    parse(input).list("statements")[0].clone()
}

fn expression(input: &str) -> Node {
    let stmt = first_statement(input);
    assert!(stmt.is(SyntaxKind::ExpressionStatement), "got {}", stmt.kind());
    stmt.child("expression").unwrap().clone()
}

/// Parses and prints, for checking tree shape through its printed form.
fn reprint(input: &str) -> String {
    print(&parse(input))
}

#[test]
fn test_import_forms() {
    let file = parse(
        r#"import ts from "typescript";
import { a, b as c } from './m';
import * as q from "ts-transform-creator";
import d, { e } from "x";
import "side-effect";"#,
    );
    let statements = file.list("statements");
    assert_eq!(statements.len(), 5);

    let clause = statements[0].child("importClause").unwrap();
    assert_eq!(clause.child("name").and_then(Node::ident_text), Some("ts"));
    assert!(clause.child("namedBindings").is_none());

    let named = statements[1]
        .child("importClause")
        .and_then(|c| c.child("namedBindings"))
        .unwrap();
    assert!(named.is(SyntaxKind::NamedImports));
    let elements = named.list("elements");
    assert_eq!(elements[1].child("propertyName").and_then(Node::ident_text), Some("b"));
    assert_eq!(elements[1].child("name").and_then(Node::ident_text), Some("c"));

    let ns = statements[2]
        .child("importClause")
        .and_then(|c| c.child("namedBindings"))
        .unwrap();
    assert!(ns.is(SyntaxKind::NamespaceImport));
    assert_eq!(
        statements[2]
            .child("moduleSpecifier")
            .and_then(|m| m.str("text")),
        Some("ts-transform-creator")
    );

    assert!(statements[4].child("importClause").is_none());
}

#[test]
fn test_variable_statement_with_type() {
    let stmt = first_statement("export const x: Foo<string>[] = 1, y = 2;");
    assert!(stmt.flag("exported"));
    let list = stmt.child("declarationList").unwrap();
    assert_eq!(list.str("keyword"), Some("const"));
    let decls = list.list("declarations");
    assert_eq!(decls.len(), 2);
    let ty = decls[0].child("type").unwrap();
    assert!(ty.is(SyntaxKind::ArrayType));
    assert!(ty.child("elementType").unwrap().is(SyntaxKind::TypeReference));
}

#[test]
fn test_function_declaration_and_overload() {
    let file = parse(
        "function f(a: string): Identifier;\nfunction f<T>(a?: T, ...rest: T[]): ts.Identifier { return a; }",
    );
    let statements = file.list("statements");
    assert!(statements[0].child("body").is_none());
    let decl = &statements[1];
    assert_eq!(decl.list("typeParameters").len(), 1);
    let params = decl.list("parameters");
    assert!(params[0].flag("questionToken"));
    assert!(params[1].flag("dotDotDotToken"));
    let ret = decl.child("type").unwrap();
    assert!(ret.child("typeName").unwrap().is(SyntaxKind::QualifiedName));
}

#[test]
fn test_tagged_template_with_substitutions() {
    let expr = expression("tsc`${value}.foo`;");
    assert!(expr.is(SyntaxKind::TaggedTemplateExpression));
    assert_eq!(expr.child("tag").and_then(Node::ident_text), Some("tsc"));
    let template = expr.child("template").unwrap();
    assert!(template.is(SyntaxKind::TemplateExpression));
    assert_eq!(template.str("head"), Some(""));
    let spans = template.list("templateSpans");
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].str("literal"), Some(".foo"));
    assert_eq!(
        spans[0].child("expression").and_then(Node::ident_text),
        Some("value")
    );
}

#[test]
fn test_tagged_template_on_property_access() {
    let expr = expression("q.tsc`a`;");
    assert!(expr.is(SyntaxKind::TaggedTemplateExpression));
    assert!(expr.child("tag").unwrap().is(SyntaxKind::PropertyAccessExpression));
    assert!(
        expr.child("template")
            .unwrap()
            .is(SyntaxKind::NoSubstitutionTemplateLiteral)
    );
}

#[test]
fn test_explicit_type_arguments_on_call() {
    let expr = expression("f<string>(a);");
    assert!(expr.is(SyntaxKind::CallExpression));
    assert_eq!(expr.list("typeArguments").len(), 1);

    // Without a following call this is a comparison.
    let cmp = expression("a < b;");
    assert!(cmp.is(SyntaxKind::BinaryExpression));
    assert_eq!(cmp.str("operator"), Some("<"));
}

#[test]
fn test_arrow_functions() {
    let single = expression("x => x;");
    assert!(single.is(SyntaxKind::ArrowFunction));
    assert_eq!(single.list("parameters").len(), 1);

    let typed = expression("(props: Props): ts.Node => ({ a: 1 });");
    assert!(typed.is(SyntaxKind::ArrowFunction));
    assert!(typed.child("type").is_some());
    assert!(
        typed
            .child("body")
            .unwrap()
            .is(SyntaxKind::ParenthesizedExpression)
    );

    let block = expression("async () => { return 1; };");
    assert!(block.flag("async"));
    assert!(block.child("body").unwrap().is(SyntaxKind::Block));
}

#[test]
fn test_parenthesized_expression_is_not_an_arrow() {
    let expr = expression("(a) + b;");
    assert!(expr.is(SyntaxKind::BinaryExpression));
    let cond = expression("c ? (a) : b;");
    assert!(cond.is(SyntaxKind::ConditionalExpression));
}

#[test]
fn test_binary_precedence() {
    assert_eq!(reprint("a + b * c;"), "a + b * c;\n");
    assert_eq!(reprint("(a + b) * c;"), "(a + b) * c;\n");
    let expr = expression("a || b && c;");
    assert_eq!(expr.str("operator"), Some("||"));
    let left_assoc = expression("a - b - c;");
    assert!(left_assoc.child("left").unwrap().is(SyntaxKind::BinaryExpression));
}

#[test]
fn test_as_expression() {
    let expr = expression("x as unknown as Foo;");
    assert!(expr.is(SyntaxKind::AsExpression));
    assert!(expr.child("expression").unwrap().is(SyntaxKind::AsExpression));
}

#[test]
fn test_object_and_array_literals() {
    let expr = expression("f({ a: 1, b, ...c, 'd': [1, ...e] });");
    let object = &expr.list("arguments")[0];
    let props = object.list("properties");
    assert_eq!(
        props.iter().map(Node::kind).collect::<Vec<_>>(),
        vec![
            SyntaxKind::PropertyAssignment,
            SyntaxKind::ShorthandPropertyAssignment,
            SyntaxKind::SpreadAssignment,
            SyntaxKind::PropertyAssignment,
        ]
    );
}

#[test]
fn test_type_literal_and_union() {
    let stmt = first_statement("let p: { a?: string; b: number | \"x\" } = v;");
    let ty = stmt.child("declarationList").unwrap().list("declarations")[0]
        .child("type")
        .unwrap()
        .clone();
    assert!(ty.is(SyntaxKind::TypeLiteral));
    let members = ty.list("members");
    assert!(members[0].flag("questionToken"));
    assert!(members[1].child("type").unwrap().is(SyntaxKind::UnionType));
}

#[test]
fn test_function_type_annotation() {
    let stmt = first_statement("let f: (node: Node) => Node;");
    let ty = stmt.child("declarationList").unwrap().list("declarations")[0]
        .child("type")
        .unwrap()
        .clone();
    assert!(ty.is(SyntaxKind::FunctionType));
}

#[test]
fn test_return_with_line_break_returns_nothing() {
    let stmt = first_statement("function f() { return\n1; }");
    let body = stmt.child("body").unwrap();
    let statements = body.list("statements");
    assert_eq!(statements.len(), 2);
    assert!(statements[0].child("expression").is_none());
}

#[test]
fn test_spans_cover_source() {
    let source = "const a = foo.bar(1);";
    let stmt = first_statement(source);
    let init = stmt.child("declarationList").unwrap().list("declarations")[0]
        .child("initializer")
        .unwrap()
        .clone();
    let span = init.span();
    assert_eq!(&source[span.start..span.end], "foo.bar(1)");
}

#[test]
fn test_errors() {
    let err = Parser::new("const = 1;").unwrap().parse_module().unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::ExpectedIdentifier);

    let err = Parser::new("f(a").unwrap().parse_module().unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::MissingClosingParen);
    assert_eq!(err.found.as_deref(), Some("end of input"));

    let err = Parser::new("{ a;").unwrap().parse_module().unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::MissingClosingBrace);

    let err = Parser::new("a b").unwrap().parse_module().unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::MissingSemicolon);

    let err = Parser::new("import from;").unwrap().parse_module().unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::InvalidImport);

    let err = Parser::new("import a form 'm';").unwrap().parse_module().unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::ExpectedToken);
    assert_eq!(err.expected, vec!["'from'".to_string()]);

    assert!(matches!(
        Parser::new("'abc").map(|_| ()),
        Err(ParseError {
            kind: ParseErrorKind::Lex(_),
            ..
        })
    ));
}
