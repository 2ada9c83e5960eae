//! Rustc-style rendering of parse errors against their source.

use super::parser::errors::{ParseError, ParseErrorKind};

/// 1-based line and column of a byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    /// Computes the location of `offset`, clamped to the source length.
    pub fn from_offset(source: &str, offset: usize) -> Self {
        let offset = floor_char_boundary(source, offset);
        let before = &source[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map(|pos| pos + 1).unwrap_or(0);
        let column = source[line_start..offset].chars().count() + 1;
        Self { line, column }
    }
}

fn floor_char_boundary(source: &str, offset: usize) -> usize {
    let mut offset = offset.min(source.len());
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Configuration for formatting an error with source context.
pub struct ErrorFormat<'a> {
    /// The error message (e.g., "unexpected token")
    pub message: &'a str,
    pub source: &'a str,
    /// Byte position in source where error occurred
    pub position: usize,
    pub filename: &'a str,
    /// Line offset to add (for templates embedded in a file)
    pub line_offset: usize,
    /// Annotation text shown after the caret
    pub annotation: Option<String>,
    pub help: Option<&'a str>,
}

impl<'a> ErrorFormat<'a> {
    pub fn new(message: &'a str, source: &'a str, position: usize) -> Self {
        Self {
            message,
            source,
            position,
            filename: "input",
            line_offset: 0,
            annotation: None,
            help: None,
        }
    }

    pub fn filename(mut self, filename: &'a str) -> Self {
        self.filename = filename;
        self
    }

    pub fn line_offset(mut self, offset: usize) -> Self {
        self.line_offset = offset;
        self
    }

    pub fn annotation(mut self, ann: String) -> Self {
        self.annotation = Some(ann);
        self
    }

    pub fn help(mut self, help: &'a str) -> Self {
        self.help = Some(help);
        self
    }

    /// Formats the error with source context.
    ///
    /// ```text
    /// error: message
    ///  --> file:line:column
    ///   |
    /// N | source line content
    ///   |     ^ annotation
    /// help: suggestion
    /// ```
    pub fn format(&self) -> String {
        let loc = SourceLocation::from_offset(self.source, self.position);
        let line_number = loc.line + self.line_offset;
        let gutter = line_number.to_string().len();

        let mut msg = format!("error: {}\n", self.message);
        msg.push_str(&format!(
            "{:>gutter$}--> {}:{}:{}\n",
            "", self.filename, line_number, loc.column
        ));

        if let Some(line) = self.source.lines().nth(loc.line - 1) {
            let (display, caret) = window(&line.replace('\t', "    "), loc.column - 1);
            msg.push_str(&format!("{:>gutter$} |\n", ""));
            msg.push_str(&format!("{line_number} | {display}\n"));
            let annotation = self.annotation.as_deref().unwrap_or("");
            msg.push_str(
                format!("{:>gutter$} | {:>caret$}^ {annotation}", "", "")
                    .trim_end(),
            );
            msg.push('\n');
        }

        if let Some(help) = self.help {
            msg.push_str(&format!("help: {help}\n"));
        }

        msg
    }
}

const MAX_LINE_LEN: usize = 80;
const CONTEXT_CHARS: usize = 30;

/// Trims a long line to a window around `column`, returning the text to show
/// and the caret column within it.
fn window(line: &str, column: usize) -> (String, usize) {
    let chars: Vec<char> = line.chars().collect();
    if chars.len() <= MAX_LINE_LEN {
        return (line.to_string(), column);
    }
    let start = column.saturating_sub(CONTEXT_CHARS).min(chars.len());
    let end = (column + CONTEXT_CHARS).min(chars.len());
    let prefix = if start > 0 { "..." } else { "" };
    let suffix = if end < chars.len() { "..." } else { "" };
    let snippet: String = chars[start..end].iter().collect();
    (
        format!("{prefix}{snippet}{suffix}"),
        column - start + prefix.len(),
    )
}

impl ParseError {
    /// Renders this error against the text it was raised for.
    pub fn render(&self, source: &str, filename: &str) -> String {
        self.render_in(source, filename, 0)
    }

    /// Renders this error for `source` embedded in `filename`, starting
    /// `line_offset` lines into it.
    pub fn render_in(&self, source: &str, filename: &str, line_offset: usize) -> String {
        let message = self.message();
        let mut format = ErrorFormat::new(&message, source, self.position)
            .filename(filename)
            .line_offset(line_offset);
        if let Some(annotation) = self.annotation() {
            format = format.annotation(annotation);
        }
        if let ParseErrorKind::Lex(kind) = self.kind {
            if let Some(help) = kind.suggestion() {
                format = format.help(help);
            }
        }
        format.format()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::parse_module;

    #[test]
    fn test_source_location() {
        let source = "a\nbc\n\u{e9}x";
        assert_eq!(
            SourceLocation::from_offset(source, 0),
            SourceLocation { line: 1, column: 1 }
        );
        assert_eq!(
            SourceLocation::from_offset(source, 3),
            SourceLocation { line: 2, column: 2 }
        );
        // `x` follows a two-byte character.
        assert_eq!(
            SourceLocation::from_offset(source, 7),
            SourceLocation { line: 3, column: 2 }
        );
        assert_eq!(SourceLocation::from_offset(source, 99).line, 3);
    }

    #[test]
    fn test_error_format_basic() {
        let formatted = ErrorFormat::new("unexpected token", "let x = ;", 8)
            .filename("test.ts")
            .annotation("expected expression".to_string())
            .format();

        assert!(formatted.contains("error: unexpected token"));
        assert!(formatted.contains("--> test.ts:1:9"));
        assert!(formatted.contains("1 | let x = ;"));
        assert!(formatted.contains("  |         ^ expected expression"));
    }

    #[test]
    fn test_error_format_line_offset_and_help() {
        let source = "function foo() {\n  return;\n}";
        let formatted = ErrorFormat::new("unexpected return", source, 19)
            .filename("test.ts")
            .line_offset(10)
            .help("remove the statement")
            .format();

        assert!(formatted.contains("--> test.ts:12:3"));
        assert!(formatted.contains("12 |   return;"));
        assert!(formatted.ends_with("help: remove the statement\n"));
    }

    #[test]
    fn test_long_line_is_windowed() {
        let long_line = "let veryLongVariableName = someFunction(anotherLongArgument, yetAnotherArgument, andEvenMoreArguments, finalArgument);";
        let formatted = ErrorFormat::new("test error", long_line, 50).format();
        assert!(formatted.contains("1 | ..."));
        assert!(formatted.matches("...").count() >= 2);

        let near_start = ErrorFormat::new("test error", long_line, 2).format();
        assert!(!near_start.contains("1 | ..."));
    }

    #[test]
    fn test_render_parse_error() {
        let source = "const a = ;";
        let err = parse_module(source).unwrap_err();
        let rendered = err.render(source, "fragment.ts");
        assert!(rendered.starts_with("error: expected expression"));
        assert!(rendered.contains("--> fragment.ts:1:11"));
        assert!(rendered.contains("found ';'"));
    }

    #[test]
    fn test_render_in_embedding_file() {
        let source = "const a = 1;\nconst b = '";
        let err = parse_module(source).unwrap_err();
        let rendered = err.render_in(source, "main.ts", 4);
        assert!(rendered.starts_with("error: unterminated string literal"), "{rendered}");
        assert!(rendered.contains("--> main.ts:6:11"), "{rendered}");
        assert!(rendered.contains("help: add a closing quote"), "{rendered}");
    }
}
