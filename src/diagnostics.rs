//! Diagnostics collected while transforming a file.

use std::fmt;

use crate::compiler::error_fmt::SourceLocation;
use crate::ret_type::Degradation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    UnresolvedSubstitutionType,
    MissingReturnTypeSignature,
    /// A placeholder whose builder call was not found; the substitution is
    /// missing from the output.
    SplicePatternMismatch,
    FragmentParseFailure,
    InvalidModuleSpecifier,
    /// The factory namespace name is taken by a binding that does not import
    /// the factory module, so no factory import was inserted.
    FactoryNamespaceShadowed,
}

impl From<&Degradation> for DiagnosticKind {
    fn from(reason: &Degradation) -> Self {
        match reason {
            Degradation::UnresolvedSubstitutionType => DiagnosticKind::UnresolvedSubstitutionType,
            Degradation::MissingReturnTypeSignature { .. } => {
                DiagnosticKind::MissingReturnTypeSignature
            }
        }
    }
}

/// A 1-based position in a named file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub file: String,
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn at(file: &str, source: &str, offset: usize) -> Self {
        let SourceLocation { line, column } = SourceLocation::from_offset(source, offset);
        Self {
            file: file.to_string(),
            line,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
    pub location: Option<Location>,
}

impl Diagnostic {
    pub fn warning(kind: DiagnosticKind, message: impl Into<String>, location: Location) -> Self {
        Self {
            severity: Severity::Warning,
            kind,
            message: message.into(),
            location: Some(location),
        }
    }

    pub fn error(kind: DiagnosticKind, message: impl Into<String>, location: Option<Location>) -> Self {
        Self {
            severity: Severity::Error,
            kind,
            message: message.into(),
            location,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)?;
        if let Some(location) = &self.location {
            write!(f, "\n --> {location}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_and_display() {
        let location = Location::at("a.ts", "let a;\n  tsc``;", 9);
        assert_eq!(location.to_string(), "a.ts:2:3");
        let diagnostic = Diagnostic::warning(
            DiagnosticKind::SplicePatternMismatch,
            "substitution was not spliced",
            location,
        );
        assert_eq!(
            diagnostic.to_string(),
            "warning: substitution was not spliced\n --> a.ts:2:3"
        );
    }

    #[test]
    fn test_kind_from_degradation() {
        assert_eq!(
            DiagnosticKind::from(&Degradation::MissingReturnTypeSignature {
                found: "string".into()
            }),
            DiagnosticKind::MissingReturnTypeSignature
        );
    }
}
