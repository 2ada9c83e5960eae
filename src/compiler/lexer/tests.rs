use super::*;

fn kinds(input: &str) -> Vec<TokenKind> {
    Lexer::new(input)
        .tokenize()
        .unwrap()
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

fn tokens(input: &str) -> Vec<Token> {
    Lexer::new(input).tokenize().unwrap()
}

#[test]
fn test_punctuation_prefers_longest_match() {
    assert_eq!(
        kinds("a === b !== c => ...d"),
        vec![
            TokenKind::Ident,
            TokenKind::EqEqEq,
            TokenKind::Ident,
            TokenKind::NotEqEq,
            TokenKind::Ident,
            TokenKind::Arrow,
            TokenKind::DotDotDot,
            TokenKind::Ident,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_string_cooked_value_and_quote_style() {
    let toks = tokens(r#"'it\'s' "a\nb""#);
    assert_eq!(toks[0].kind, TokenKind::String);
    assert_eq!(toks[0].value, "it's");
    assert!(toks[0].single_quote);
    assert_eq!(toks[1].value, "a\nb");
    assert!(!toks[1].single_quote);
}

#[test]
fn test_no_substitution_template() {
    let toks = tokens("`Hello, World!`");
    assert_eq!(toks[0].kind, TokenKind::NoSubstitutionTemplate);
    assert_eq!(toks[0].value, "Hello, World!");
}

#[test]
fn test_template_with_substitutions() {
    let toks = tokens("`a${x}b${ {y} }c`");
    let kinds: Vec<_> = toks.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::TemplateHead,
            TokenKind::Ident,
            TokenKind::TemplateMiddle,
            TokenKind::LBrace,
            TokenKind::Ident,
            TokenKind::RBrace,
            TokenKind::TemplateTail,
            TokenKind::Eof,
        ]
    );
    assert_eq!(toks[0].value, "a");
    assert_eq!(toks[2].value, "b");
    assert_eq!(toks[6].value, "c");
}

#[test]
fn test_nested_template_inside_substitution() {
    let toks = tokens("`outer ${ tag`inner ${x}` } done`");
    let kinds: Vec<_> = toks.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::TemplateHead,
            TokenKind::Ident,
            TokenKind::TemplateHead,
            TokenKind::Ident,
            TokenKind::TemplateTail,
            TokenKind::TemplateTail,
            TokenKind::Eof,
        ]
    );
    assert_eq!(toks[5].value, " done");
}

#[test]
fn test_escaped_backtick_in_template() {
    let toks = tokens(r"`tsc\`x\``");
    assert_eq!(toks[0].kind, TokenKind::NoSubstitutionTemplate);
    assert_eq!(toks[0].value, "tsc`x`");
}

#[test]
fn test_comments_and_newlines() {
    let toks = tokens("a // line\n/* block */ b");
    assert_eq!(toks.len(), 3);
    assert!(!toks[0].newline_before);
    assert!(toks[1].newline_before);
    assert!(toks[1].is_ident("b"));
}

#[test]
fn test_numbers() {
    let toks = tokens("1 2.5 0xff 1e10 .5");
    assert!(toks[..5].iter().all(|t| t.kind == TokenKind::Number));
    assert_eq!(toks[2].text, "0xff");
}

#[test]
fn test_unicode_escapes() {
    let toks = tokens(r#""A\u{1F600}\x42""#);
    assert_eq!(toks[0].value, "A\u{1F600}B");
}

#[test]
fn test_unterminated_string() {
    let err = Lexer::new("'abc").tokenize().unwrap_err();
    assert_eq!(err.kind, LexErrorKind::UnterminatedString);
    assert_eq!(err.position, 0);
}

#[test]
fn test_unterminated_template() {
    let err = Lexer::new("`abc${x").tokenize().unwrap_err();
    assert_eq!(err.kind, LexErrorKind::UnterminatedTemplateLiteral);
}

#[test]
fn test_invalid_character() {
    let err = Lexer::new("a # b").tokenize().unwrap_err();
    assert_eq!(err.kind, LexErrorKind::InvalidCharacter);
    assert_eq!(err.found.as_deref(), Some("#"));
    assert_eq!(err.position, 2);
}
