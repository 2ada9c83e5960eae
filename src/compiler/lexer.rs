//! Lexer for the host language.
//!
//! Produces a flat token stream. Template literals are split the way the
//! TypeScript scanner splits them (`NoSubstitutionTemplate`, `TemplateHead`,
//! `TemplateMiddle`, `TemplateTail`), carrying cooked text; `${ ... }`
//! nesting is tracked with a stack of brace depths, one per open template.

mod errors;
#[cfg(test)]
mod tests;

pub use errors::{LexError, LexErrorKind};

/// Token categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Identifier or keyword; keywords are told apart by text.
    Ident,
    /// String literal; `value` holds the cooked text.
    String,
    /// Numeric literal; `text` holds the source text.
    Number,
    /// `` `text` ``
    NoSubstitutionTemplate,
    /// `` `text${ ``
    TemplateHead,
    /// `}text${`
    TemplateMiddle,
    /// `` }text` ``
    TemplateTail,

    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semicolon,
    Comma,
    Dot,
    DotDotDot,
    Colon,
    Question,
    QuestionQuestion,
    /// `=>`
    Arrow,
    Eq,
    EqEq,
    EqEqEq,
    NotEq,
    NotEqEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    PlusEq,
    MinusEq,
    AmpAmp,
    PipePipe,
    Amp,
    Pipe,
    Bang,
    Tilde,
    /// End of input; always the last token.
    Eof,
}

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The source text of the token.
    pub text: String,
    /// Cooked value for strings and template pieces, source text otherwise.
    pub value: String,
    /// Byte offset where this token starts.
    pub start: usize,
    /// Byte offset just past the token.
    pub end: usize,
    /// Whether a line break precedes this token (automatic semicolons).
    pub newline_before: bool,
    /// String literal quoted with `'`.
    pub single_quote: bool,
}

impl Token {
    pub fn is_ident(&self, text: &str) -> bool {
        self.kind == TokenKind::Ident && self.text == text
    }
}

/// The lexer for host source text.
pub struct Lexer<'a> {
    /// The input text.
    input: &'a str,
    /// Current byte position in the input.
    pos: usize,
    /// Brace depth inside each open `${ ... }`, innermost last.
    template_stack: Vec<usize>,
    /// Whether a line break was skipped since the last token.
    newline_before: bool,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            template_stack: Vec::new(),
            newline_before: false,
        }
    }

    /// Tokenizes the entire input. The result always ends with `Eof`.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.pos >= self.input.len() {
                if !self.template_stack.is_empty() {
                    return Err(LexError::new(
                        LexErrorKind::UnterminatedTemplateLiteral,
                        self.pos,
                    ));
                }
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    text: String::new(),
                    value: String::new(),
                    start: self.pos,
                    end: self.pos,
                    newline_before: true,
                    single_quote: false,
                });
                return Ok(tokens);
            }
            let token = self.next_token()?;
            tokens.push(token);
        }
    }

    // =========================================================================
    // Cursor
    // =========================================================================

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.remaining().chars().nth(n)
    }

    fn advance(&mut self, n: usize) {
        self.pos += n;
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.advance(c.len_utf8());
        Some(c)
    }

    fn consume_while<F: Fn(char) -> bool>(&mut self, pred: F) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if pred(c) {
                self.advance(c.len_utf8());
            } else {
                break;
            }
        }
        &self.input[start..self.pos]
    }

    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            let remaining = self.remaining();
            if remaining.starts_with("//") {
                self.consume_while(|c| c != '\n');
            } else if remaining.starts_with("/*") {
                let start = self.pos;
                match remaining[2..].find("*/") {
                    Some(end) => {
                        if remaining[..end + 2].contains('\n') {
                            self.newline_before = true;
                        }
                        self.advance(end + 4);
                    }
                    None => {
                        return Err(LexError::new(LexErrorKind::UnterminatedComment, start));
                    }
                }
            } else if let Some(c) = self.peek()
                && c.is_whitespace()
            {
                if c == '\n' {
                    self.newline_before = true;
                }
                self.advance(c.len_utf8());
            } else {
                return Ok(());
            }
        }
    }

    // =========================================================================
    // Tokens
    // =========================================================================

    fn next_token(&mut self) -> Result<Token, LexError> {
        let start = self.pos;
        let newline_before = std::mem::take(&mut self.newline_before);
        let mut single_quote = false;

        let (kind, value) = match self.peek() {
            Some(c) if is_ident_start(c) => {
                self.consume_while(is_ident_continue);
                (TokenKind::Ident, None)
            }
            Some(c) if c.is_ascii_digit() => {
                self.lex_number();
                (TokenKind::Number, None)
            }
            Some('.') if self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.lex_number();
                (TokenKind::Number, None)
            }
            Some(quote @ ('"' | '\'')) => {
                single_quote = quote == '\'';
                let cooked = self.lex_string(quote)?;
                (TokenKind::String, Some(cooked))
            }
            Some('`') => {
                self.advance(1);
                let (cooked, opened) = self.lex_template_chars()?;
                if opened {
                    self.template_stack.push(0);
                    (TokenKind::TemplateHead, Some(cooked))
                } else {
                    (TokenKind::NoSubstitutionTemplate, Some(cooked))
                }
            }
            Some('}') if self.template_stack.last() == Some(&0) => {
                self.advance(1);
                let (cooked, opened) = self.lex_template_chars()?;
                if opened {
                    (TokenKind::TemplateMiddle, Some(cooked))
                } else {
                    self.template_stack.pop();
                    (TokenKind::TemplateTail, Some(cooked))
                }
            }
            Some(_) => (self.lex_punct()?, None),
            None => unreachable!("next_token is only called before end of input"),
        };

        let text = self.input[start..self.pos].to_string();
        Ok(Token {
            kind,
            value: value.unwrap_or_else(|| text.clone()),
            text,
            start,
            end: self.pos,
            newline_before,
            single_quote,
        })
    }

    fn lex_number(&mut self) {
        let remaining = self.remaining();
        if remaining.starts_with("0x") || remaining.starts_with("0X") {
            self.advance(2);
            self.consume_while(|c| c.is_ascii_hexdigit() || c == '_');
            return;
        }
        self.consume_while(|c| c.is_ascii_digit() || c == '_');
        if self.peek() == Some('.') {
            self.advance(1);
            self.consume_while(|c| c.is_ascii_digit() || c == '_');
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let sign = matches!(self.peek_nth(1), Some('+' | '-'));
            let digit_at = if sign { 2 } else { 1 };
            if self.peek_nth(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                self.advance(digit_at);
                self.consume_while(|c| c.is_ascii_digit());
            }
        }
        if self.peek() == Some('n') {
            self.advance(1);
        }
    }

    /// Lexes a quoted string, returning its cooked value.
    fn lex_string(&mut self, quote: char) -> Result<String, LexError> {
        let start = self.pos;
        self.advance(1);
        let mut cooked = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => {
                    return Err(LexError::new(LexErrorKind::UnterminatedString, start));
                }
                Some(c) if c == quote => return Ok(cooked),
                Some('\\') => self.lex_escape(&mut cooked)?,
                Some(c) => cooked.push(c),
            }
        }
    }

    /// Lexes template characters after a backtick or a closing `}`.
    ///
    /// Returns the cooked text and whether the piece ended with `${`.
    fn lex_template_chars(&mut self) -> Result<(String, bool), LexError> {
        let start = self.pos;
        let mut cooked = String::new();
        loop {
            if self.remaining().starts_with("${") {
                self.advance(2);
                return Ok((cooked, true));
            }
            match self.bump() {
                None => {
                    return Err(LexError::new(
                        LexErrorKind::UnterminatedTemplateLiteral,
                        start,
                    ));
                }
                Some('`') => return Ok((cooked, false)),
                Some('\\') => self.lex_escape(&mut cooked)?,
                Some('\r') => {
                    // Template line terminators are normalized to LF.
                    if self.peek() == Some('\n') {
                        self.advance(1);
                    }
                    cooked.push('\n');
                }
                Some(c) => cooked.push(c),
            }
        }
    }

    /// Lexes an escape sequence; the backslash is already consumed.
    fn lex_escape(&mut self, out: &mut String) -> Result<(), LexError> {
        let start = self.pos - 1;
        let invalid = |found: &str| {
            LexError::new(LexErrorKind::InvalidEscapeSequence, start).with_found(found)
        };
        match self.bump() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('v') => out.push('\u{b}'),
            Some('0') if !self.peek().is_some_and(|c| c.is_ascii_digit()) => out.push('\0'),
            Some('\n') => {}
            Some('\r') => {
                if self.peek() == Some('\n') {
                    self.advance(1);
                }
            }
            Some('x') => {
                let hex = self.take_hex(2).ok_or_else(|| invalid("\\x"))?;
                out.push(char::from_u32(hex).ok_or_else(|| invalid("\\x"))?);
            }
            Some('u') => {
                let code = if self.peek() == Some('{') {
                    self.advance(1);
                    let digits = self.consume_while(|c| c.is_ascii_hexdigit());
                    if self.bump() != Some('}') || digits.is_empty() {
                        return Err(invalid("\\u{"));
                    }
                    u32::from_str_radix(digits, 16).map_err(|_| invalid(digits))?
                } else {
                    self.take_hex(4).ok_or_else(|| invalid("\\u"))?
                };
                out.push(char::from_u32(code).ok_or_else(|| invalid("\\u"))?);
            }
            Some(c) if c.is_ascii_digit() => return Err(invalid(&format!("\\{c}"))),
            Some(c) => out.push(c),
            None => return Err(invalid("\\")),
        }
        Ok(())
    }

    fn take_hex(&mut self, len: usize) -> Option<u32> {
        let digits = self.remaining().get(..len)?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        self.advance(len);
        u32::from_str_radix(digits, 16).ok()
    }

    fn lex_punct(&mut self) -> Result<TokenKind, LexError> {
        const PUNCTS: &[(&str, TokenKind)] = &[
            ("...", TokenKind::DotDotDot),
            ("===", TokenKind::EqEqEq),
            ("!==", TokenKind::NotEqEq),
            ("=>", TokenKind::Arrow),
            ("==", TokenKind::EqEq),
            ("!=", TokenKind::NotEq),
            ("<=", TokenKind::LtEq),
            (">=", TokenKind::GtEq),
            ("&&", TokenKind::AmpAmp),
            ("||", TokenKind::PipePipe),
            ("??", TokenKind::QuestionQuestion),
            ("+=", TokenKind::PlusEq),
            ("-=", TokenKind::MinusEq),
            ("(", TokenKind::LParen),
            (")", TokenKind::RParen),
            ("{", TokenKind::LBrace),
            ("}", TokenKind::RBrace),
            ("[", TokenKind::LBracket),
            ("]", TokenKind::RBracket),
            (";", TokenKind::Semicolon),
            (",", TokenKind::Comma),
            (".", TokenKind::Dot),
            (":", TokenKind::Colon),
            ("?", TokenKind::Question),
            ("=", TokenKind::Eq),
            ("<", TokenKind::Lt),
            (">", TokenKind::Gt),
            ("+", TokenKind::Plus),
            ("-", TokenKind::Minus),
            ("*", TokenKind::Star),
            ("/", TokenKind::Slash),
            ("%", TokenKind::Percent),
            ("&", TokenKind::Amp),
            ("|", TokenKind::Pipe),
            ("!", TokenKind::Bang),
            ("~", TokenKind::Tilde),
        ];

        let remaining = self.remaining();
        let Some((text, kind)) = PUNCTS.iter().find(|(text, _)| remaining.starts_with(text))
        else {
            let found = self.peek().map(String::from).unwrap_or_default();
            return Err(LexError::new(LexErrorKind::InvalidCharacter, self.pos).with_found(found));
        };

        match kind {
            TokenKind::LBrace => {
                if let Some(depth) = self.template_stack.last_mut() {
                    *depth += 1;
                }
            }
            TokenKind::RBrace => {
                if let Some(depth) = self.template_stack.last_mut() {
                    // A zero depth was handled as a template continuation.
                    *depth = depth
                        .checked_sub(1)
                        .ok_or_else(|| LexError::new(LexErrorKind::UnbalancedBraces, self.pos))?;
                }
            }
            _ => {}
        }

        self.advance(text.len());
        Ok(*kind)
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphanumeric()
}
