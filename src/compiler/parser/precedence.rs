//! Operator precedence and binding power for the Pratt parser.

use crate::compiler::lexer::TokenKind;

/// Binding power for operators in Pratt parser style.
///
/// Using (left, right) pairs enables both left and right associativity:
/// - Left-associative: `left < right` (e.g., `a + b + c` = `(a + b) + c`)
/// - Right-associative: `left > right` (e.g., `a = b = c` = `a = (b = c)`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingPower {
    pub left: u8,
    pub right: u8,
}

impl BindingPower {
    /// Creates a left-associative binding power.
    #[inline]
    pub const fn left(power: u8) -> Self {
        Self {
            left: power,
            right: power + 1,
        }
    }
}

/// Precedence levels, lowest first. Gaps leave room for additions.
pub mod prec {
    use super::BindingPower;

    /// `??`
    pub const NULLISH: BindingPower = BindingPower::left(6);
    /// `||`
    pub const LOGICAL_OR: BindingPower = BindingPower::left(8);
    /// `&&`
    pub const LOGICAL_AND: BindingPower = BindingPower::left(10);
    /// `|`
    pub const BITWISE_OR: BindingPower = BindingPower::left(12);
    /// `&`
    pub const BITWISE_AND: BindingPower = BindingPower::left(16);
    /// `==`, `!=`, `===`, `!==`
    pub const EQUALITY: BindingPower = BindingPower::left(18);
    /// `<`, `>`, `<=`, `>=`, `as`
    pub const RELATIONAL: BindingPower = BindingPower::left(20);
    /// `+`, `-`
    pub const ADDITIVE: BindingPower = BindingPower::left(24);
    /// `*`, `/`, `%`
    pub const MULTIPLICATIVE: BindingPower = BindingPower::left(26);
}

/// Binary operator text and binding power for a token, if it is one.
pub fn binary_op(kind: TokenKind) -> Option<(&'static str, BindingPower)> {
    let op = match kind {
        TokenKind::QuestionQuestion => ("??", prec::NULLISH),
        TokenKind::PipePipe => ("||", prec::LOGICAL_OR),
        TokenKind::AmpAmp => ("&&", prec::LOGICAL_AND),
        TokenKind::Pipe => ("|", prec::BITWISE_OR),
        TokenKind::Amp => ("&", prec::BITWISE_AND),
        TokenKind::EqEq => ("==", prec::EQUALITY),
        TokenKind::NotEq => ("!=", prec::EQUALITY),
        TokenKind::EqEqEq => ("===", prec::EQUALITY),
        TokenKind::NotEqEq => ("!==", prec::EQUALITY),
        TokenKind::Lt => ("<", prec::RELATIONAL),
        TokenKind::Gt => (">", prec::RELATIONAL),
        TokenKind::LtEq => ("<=", prec::RELATIONAL),
        TokenKind::GtEq => (">=", prec::RELATIONAL),
        TokenKind::Plus => ("+", prec::ADDITIVE),
        TokenKind::Minus => ("-", prec::ADDITIVE),
        TokenKind::Star => ("*", prec::MULTIPLICATIVE),
        TokenKind::Slash => ("/", prec::MULTIPLICATIVE),
        TokenKind::Percent => ("%", prec::MULTIPLICATIVE),
        _ => return None,
    };
    Some(op)
}

/// Assignment operator text for a token, if it is one.
pub fn assignment_op(kind: TokenKind) -> Option<&'static str> {
    match kind {
        TokenKind::Eq => Some("="),
        TokenKind::PlusEq => Some("+="),
        TokenKind::MinusEq => Some("-="),
        _ => None,
    }
}

/// Binding power of a binary operator by its text, used by the printer.
pub fn operator_power(op: &str) -> u8 {
    match op {
        "??" => prec::NULLISH.left,
        "||" => prec::LOGICAL_OR.left,
        "&&" => prec::LOGICAL_AND.left,
        "|" => prec::BITWISE_OR.left,
        "&" => prec::BITWISE_AND.left,
        "==" | "!=" | "===" | "!==" => prec::EQUALITY.left,
        "<" | ">" | "<=" | ">=" => prec::RELATIONAL.left,
        "+" | "-" => prec::ADDITIVE.left,
        "*" | "/" | "%" => prec::MULTIPLICATIVE.left,
        // Assignments bind loosest.
        _ => 2,
    }
}
