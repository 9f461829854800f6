use std::fmt::Display;

use modelshape_pattern::PredictorType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A required pattern key was not matched by any listed entry.
    MissingRequiredEntry,
    /// A listed entry does not match any pattern key at its level.
    UnexpectedEntry,
    /// Mutually exclusive alternatives, or competing candidates for a key that
    /// allows exactly one entry, are present at the same level.
    ConflictingAlternatives,
}

impl DiagnosticKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            DiagnosticKind::MissingRequiredEntry => "missing required entry",
            DiagnosticKind::UnexpectedEntry => "unexpected entry",
            DiagnosticKind::ConflictingAlternatives => "conflicting alternatives",
        }
    }
}

impl Display for DiagnosticKind {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structural problem found while matching a listing against a pattern.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Path of the offending entry (or of the level missing an entry),
    /// relative to the validation root. Empty for the root itself.
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, path: impl Into<String>, message: impl Display) -> Self {
        Self {
            kind,
            path: path.into(),
            message: message.to_string(),
        }
    }
}

impl Display for Diagnostic {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Outcome of validating one listing against one predictor type's pattern.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ValidationReport {
    pub matched: bool,
    pub predictor_type: PredictorType,
    /// The validated path or prefix, for display.
    pub root: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    #[must_use]
    pub fn new(predictor_type: PredictorType, root: impl Into<String>, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            matched: diagnostics.is_empty(),
            predictor_type,
            root: root.into(),
            diagnostics,
        }
    }

    /// True if a diagnostic of `kind` was reported.
    #[must_use]
    pub fn has(&self, kind: DiagnosticKind) -> bool {
        self.diagnostics.iter().any(|d| d.kind == kind)
    }

    pub fn diagnostics_of(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.kind == kind)
    }

    /// Human-readable diagnostic lines, in the order they were found.
    pub fn messages(&self) -> impl Iterator<Item = String> + '_ {
        self.diagnostics.iter().map(ToString::to_string)
    }
}

impl Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let root = if self.root.is_empty() { "." } else { &self.root };
        if self.matched {
            return write!(f, "`{root}` matches the {} model layout", self.predictor_type);
        }

        write!(
            f,
            "`{root}` does not match the {} model layout:",
            self.predictor_type
        )?;
        for diagnostic in &self.diagnostics {
            write!(f, "\n  {diagnostic}")?;
        }
        Ok(())
    }
}
