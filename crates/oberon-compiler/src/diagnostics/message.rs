//! Diagnostic severities and the single flat message shape both parse and
//! semantic diagnostics are rendered from.

use oberon_core::CodePlace;

/// The four warning classes the analyzer currently distinguishes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum WarningKind {
    /// A declared symbol with zero uses.
    UnusedSymbol,
    /// An imported module never referenced.
    UnusedImport,
    /// A `CASE` arm whose labels can never match (currently: labels
    /// already fully covered by an earlier arm).
    UnreachableCaseArm,
    /// A declaration that shadows one visible from an enclosing scope.
    ShadowedParentDeclaration,
}

impl WarningKind {
    pub fn code(self) -> &'static str {
        match self {
            WarningKind::UnusedSymbol => "W1",
            WarningKind::UnusedImport => "W2",
            WarningKind::UnreachableCaseArm => "W3",
            WarningKind::ShadowedParentDeclaration => "W4",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Severity {
    Error,
    Warning(WarningKind),
}

impl Severity {
    pub fn tag(self) -> &'static str {
        match self {
            Severity::Error => "Error",
            Severity::Warning(kind) => kind.code(),
        }
    }

    pub fn is_error(self) -> bool {
        matches!(self, Severity::Error)
    }
}

/// A single diagnostic.
///
/// `expected` is `Some` only for parse errors, where `message` holds the
/// description of what was actually found; it is `None` for semantic
/// diagnostics, where `message` holds the full rendered text.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub place: CodePlace,
    pub message: String,
    pub expected: Option<Vec<String>>,
}

impl Diagnostic {
    pub fn parse_error(place: CodePlace, expected: Vec<String>, found: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            place,
            message: found.into(),
            expected: Some(expected),
        }
    }

    pub fn error(place: CodePlace, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            place,
            message: message.into(),
            expected: None,
        }
    }

    pub fn warning(place: CodePlace, kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning(kind),
            place,
            message: message.into(),
            expected: None,
        }
    }

    pub fn is_parse_error(&self) -> bool {
        self.expected.is_some()
    }
}
