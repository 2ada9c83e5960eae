//! Selector queries over syntax trees, in the manner of tsquery.
//!
//! Supported grammar:
//!
//! ```text
//! selector := compound (WS compound)*          descendant combinator
//! compound := (Kind | '*') attribute* has*
//! attribute := '[' path ('=' value)? ']'        path: field('.' field)*
//! value    := "string" | 'string' | true | false | word
//! has      := ':has(' selector ')'
//! ```
//!
//! An attribute path walks child-node fields and ends at a string or boolean
//! field; `[path]` alone tests presence. On kinds without such a field the
//! tsquery spellings `name` and `value` fall back to the node's `text`, so
//! `Identifier[name="ts"]` and `StringLiteral[value="x"]` work as they do
//! there.

use std::fmt;

use crate::syntax::{Field, Node, SyntaxKind};

/// A malformed selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorError {
    pub kind: SelectorErrorKind,
    /// Byte offset into the selector.
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorErrorKind {
    Empty,
    UnknownKind(String),
    UnknownPseudoClass(String),
    UnterminatedString,
    Expected(&'static str),
}

impl SelectorErrorKind {
    pub fn description(&self) -> &'static str {
        match self {
            Self::Empty => "empty selector",
            Self::UnknownKind(_) => "unknown node kind",
            Self::UnknownPseudoClass(_) => "unknown pseudo-class",
            Self::UnterminatedString => "unterminated string in selector",
            Self::Expected(_) => "unexpected character in selector",
        }
    }
}

impl fmt::Display for SelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.kind.description(), self.position)?;
        match &self.kind {
            SelectorErrorKind::UnknownKind(name) | SelectorErrorKind::UnknownPseudoClass(name) => {
                write!(f, ": `{name}`")
            }
            SelectorErrorKind::Expected(what) => write!(f, ": expected {what}"),
            _ => Ok(()),
        }
    }
}

impl std::error::Error for SelectorError {}

/// Returns every node under `tree` (inclusive) matching `selector`, in
/// depth-first pre-order.
pub fn query<'a>(tree: &'a Node, selector: &str) -> Result<Vec<&'a Node>, SelectorError> {
    let selector = Selector::parse(selector)?;
    let mut matches = Vec::new();
    let mut ancestors = Vec::new();
    collect(tree, &selector, &mut ancestors, &mut matches);
    Ok(matches)
}

/// A parsed selector; reusable across trees.
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    /// Outermost first.
    compounds: Vec<Compound>,
}

#[derive(Debug, Clone, PartialEq)]
struct Compound {
    /// `None` for `*`.
    kind: Option<SyntaxKind>,
    attributes: Vec<Attribute>,
    has: Vec<Selector>,
}

#[derive(Debug, Clone, PartialEq)]
struct Attribute {
    path: Vec<String>,
    value: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
enum Value {
    Str(String),
    Bool(bool),
}

impl Selector {
    pub fn parse(input: &str) -> Result<Selector, SelectorError> {
        let mut parser = SelectorParser { input, pos: 0 };
        let selector = parser.selector()?;
        parser.skip_ws();
        if parser.pos < input.len() {
            return Err(parser.error(SelectorErrorKind::Expected("end of selector")));
        }
        Ok(selector)
    }

    /// Whether `node`, with the given ancestors (outermost first), matches.
    pub fn matches(&self, node: &Node, ancestors: &[&Node]) -> bool {
        let Some((last, rest)) = self.compounds.split_last() else {
            return false;
        };
        if !last.matches(node) {
            return false;
        }
        // Descendant-only chains can be matched greedily, nearest ancestor
        // first.
        let mut remaining = ancestors;
        for compound in rest.iter().rev() {
            match remaining.iter().rposition(|a| compound.matches(a)) {
                Some(index) => remaining = &remaining[..index],
                None => return false,
            }
        }
        true
    }
}

fn collect<'a>(
    node: &'a Node,
    selector: &Selector,
    ancestors: &mut Vec<&'a Node>,
    out: &mut Vec<&'a Node>,
) {
    if selector.matches(node, ancestors) {
        out.push(node);
    }
    ancestors.push(node);
    for child in node.children() {
        collect(child, selector, ancestors, out);
    }
    ancestors.pop();
}

impl Compound {
    fn matches(&self, node: &Node) -> bool {
        if self.kind.is_some_and(|kind| !node.is(kind)) {
            return false;
        }
        self.attributes.iter().all(|attr| attr.matches(node))
            && self.has.iter().all(|selector| has_descendant(node, selector))
    }
}

fn has_descendant(root: &Node, selector: &Selector) -> bool {
    fn visit<'a>(node: &'a Node, selector: &Selector, ancestors: &mut Vec<&'a Node>) -> bool {
        if selector.matches(node, ancestors) {
            return true;
        }
        ancestors.push(node);
        let found = node
            .children()
            .into_iter()
            .any(|child| visit(child, selector, ancestors));
        ancestors.pop();
        found
    }

    // Ancestry for the inner selector starts at `root`.
    let mut ancestors = vec![root];
    root.children()
        .into_iter()
        .any(|child| visit(child, selector, &mut ancestors))
}

impl Attribute {
    fn matches(&self, node: &Node) -> bool {
        let Some((last, parents)) = self.path.split_last() else {
            return false;
        };
        let mut target = node;
        for name in parents {
            match target.child(name) {
                Some(child) => target = child,
                None => return false,
            }
        }
        let field = match target.field(last) {
            Some(field) => Some(field),
            None if last == "name" || last == "value" => target.field("text"),
            None => None,
        };
        match (field, &self.value) {
            (None, _) | (Some(Field::Absent), _) => false,
            (Some(_), None) => true,
            (Some(Field::Str(text)), Some(Value::Str(expected))) => text == expected,
            (Some(Field::Bool(flag)), Some(Value::Bool(expected))) => flag == expected,
            (Some(Field::Bool(flag)), Some(Value::Str(expected))) => {
                expected == if *flag { "true" } else { "false" }
            }
            _ => false,
        }
    }
}

// =============================================================================
// Selector parsing
// =============================================================================

struct SelectorParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> SelectorParser<'a> {
    fn error(&self, kind: SelectorErrorKind) -> SelectorError {
        SelectorError {
            kind,
            position: self.pos,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char, what: &'static str) -> Result<(), SelectorError> {
        if self.eat(c) {
            Ok(())
        } else {
            Err(self.error(SelectorErrorKind::Expected(what)))
        }
    }

    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
        self.pos > start
    }

    fn word(&mut self) -> &'a str {
        let input = self.input;
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        {
            self.bump();
        }
        &input[start..self.pos]
    }

    fn selector(&mut self) -> Result<Selector, SelectorError> {
        self.skip_ws();
        let mut compounds = vec![self.compound()?];
        loop {
            let had_ws = self.skip_ws();
            match self.peek() {
                None | Some(')') => break,
                Some(_) if had_ws => compounds.push(self.compound()?),
                Some(_) => return Err(self.error(SelectorErrorKind::Expected("whitespace"))),
            }
        }
        Ok(Selector { compounds })
    }

    fn compound(&mut self) -> Result<Compound, SelectorError> {
        let start = self.pos;
        let kind = if self.eat('*') {
            None
        } else {
            let name = self.word();
            if name.is_empty() {
                return Err(self.error(if self.input.trim().is_empty() {
                    SelectorErrorKind::Empty
                } else {
                    SelectorErrorKind::Expected("node kind or `*`")
                }));
            }
            match SyntaxKind::from_name(name) {
                Some(kind) => Some(kind),
                None => {
                    let name = name.to_string();
                    self.pos = start;
                    return Err(self.error(SelectorErrorKind::UnknownKind(name)));
                }
            }
        };

        let mut attributes = Vec::new();
        let mut has = Vec::new();
        loop {
            if self.eat('[') {
                attributes.push(self.attribute()?);
            } else if self.eat(':') {
                let at = self.pos;
                let name = self.word().to_string();
                if name != "has" {
                    self.pos = at;
                    return Err(self.error(SelectorErrorKind::UnknownPseudoClass(name)));
                }
                self.expect('(', "`(`")?;
                has.push(self.selector()?);
                self.expect(')', "`)`")?;
            } else {
                break;
            }
        }
        Ok(Compound {
            kind,
            attributes,
            has,
        })
    }

    fn attribute(&mut self) -> Result<Attribute, SelectorError> {
        self.skip_ws();
        let mut path = vec![self.word().to_string()];
        while self.eat('.') {
            path.push(self.word().to_string());
        }
        if path.iter().any(String::is_empty) {
            return Err(self.error(SelectorErrorKind::Expected("field name")));
        }
        self.skip_ws();
        let value = if self.eat('=') {
            self.skip_ws();
            Some(self.value()?)
        } else {
            None
        };
        self.skip_ws();
        self.expect(']', "`]`")?;
        Ok(Attribute { path, value })
    }

    fn value(&mut self) -> Result<Value, SelectorError> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                let start = self.pos;
                self.bump();
                let mut text = String::new();
                loop {
                    match self.bump() {
                        None => {
                            self.pos = start;
                            return Err(self.error(SelectorErrorKind::UnterminatedString));
                        }
                        Some(c) if c == quote => break,
                        Some('\\') => {
                            if let Some(escaped) = self.bump() {
                                text.push(escaped);
                            }
                        }
                        Some(c) => text.push(c),
                    }
                }
                Ok(Value::Str(text))
            }
            _ => match self.word() {
                "" => Err(self.error(SelectorErrorKind::Expected("attribute value"))),
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                word => Ok(Value::Str(word.to_string())),
            },
        }
    }
}

/// Quotes `text` for use as a selector attribute value.
pub fn quote_value(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::parse_module;

    fn count(source: &str, selector: &str) -> usize {
        let tree = parse_module(source).unwrap();
        query(&tree, selector).unwrap().len()
    }

    #[test]
    fn test_kind_and_attribute() {
        let source = r#"import { tsc } from "ts-transform-creator"; import ts from "typescript";"#;
        assert_eq!(count(source, "ImportDeclaration"), 2);
        assert_eq!(
            count(
                source,
                r#"ImportDeclaration[moduleSpecifier.text="ts-transform-creator"]"#
            ),
            1
        );
        assert_eq!(
            count(
                source,
                r#"ImportDeclaration:has(StringLiteral[value="typescript"])"#
            ),
            1
        );
    }

    #[test]
    fn test_descendant_combinator() {
        let source = "ts`x`; f(ts);";
        assert_eq!(count(source, r#"Identifier[name="ts"]"#), 2);
        assert_eq!(
            count(source, r#"TaggedTemplateExpression Identifier[name="ts"]"#),
            1
        );
        assert_eq!(count(source, r#"SourceFile * Identifier"#), 3);
    }

    #[test]
    fn test_has_does_not_match_self() {
        let source = "a;";
        assert_eq!(count(source, "Identifier:has(Identifier)"), 0);
        assert_eq!(count(source, "ExpressionStatement:has(Identifier)"), 1);
    }

    #[test]
    fn test_boolean_attribute_and_presence() {
        let source = "export const a = 1; const b = 2; let c;";
        assert_eq!(count(source, "VariableStatement[exported=true]"), 1);
        assert_eq!(count(source, "VariableDeclaration[initializer]"), 2);
    }

    #[test]
    fn test_results_are_in_preorder() {
        let tree = parse_module("f(g(h));").unwrap();
        let names: Vec<_> = query(&tree, "Identifier")
            .unwrap()
            .into_iter()
            .filter_map(Node::ident_text)
            .collect();
        assert_eq!(names, vec!["f", "g", "h"]);
    }

    #[test]
    fn test_selector_errors() {
        let err = Selector::parse("Widget").unwrap_err();
        assert_eq!(err.kind, SelectorErrorKind::UnknownKind("Widget".into()));
        assert_eq!(
            Selector::parse("").unwrap_err().kind,
            SelectorErrorKind::Empty
        );
        assert_eq!(
            Selector::parse(r#"Identifier[name="x]"#).unwrap_err().kind,
            SelectorErrorKind::UnterminatedString
        );
        assert!(matches!(
            Selector::parse("Identifier:not(x)").unwrap_err().kind,
            SelectorErrorKind::UnknownPseudoClass(_)
        ));
    }

    #[test]
    fn test_quote_value() {
        let selector = format!("StringLiteral[text={}]", quote_value(r#"a"b"#));
        assert_eq!(count(r#"'a"b';"#, &selector), 1);
    }
}
