//! Compile Diagnostics
//!
//! Engine parse errors are surfaced as diagnostics rather than thrown; a
//! reload aborts only when the set contains a blocking entry.

use std::fmt;
use std::path::Path;

use rquickjs::CaughtError;

/// Diagnostic severity. Warnings promoted to errors by configuration block
/// a reload just like real errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    WarningAsError,
    Error,
}

impl Severity {
    pub fn is_blocking(self) -> bool {
        matches!(self, Self::WarningAsError | Self::Error)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::WarningAsError => "warning(error)",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// One diagnostic from a compile attempt.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub file: Option<String>,
    pub line: Option<u32>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            file: None,
            line: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            file: None,
            line: None,
        }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    /// Build an error diagnostic from a caught engine error. `line_offset`
    /// is subtracted from the engine's reported line so positions map back
    /// to the script's own coordinates when the source was wrapped.
    pub fn from_caught(err: &CaughtError<'_>, origin: &Path, line_offset: u32) -> Self {
        let mut diag = match err {
            CaughtError::Exception(exc) => {
                let mut d = Diagnostic::error(
                    exc.message().unwrap_or_else(|| "unknown error".to_string()),
                );
                if let Some(line) = exc.line() {
                    if line >= 0 {
                        d = d.with_line((line as u32).saturating_sub(line_offset).max(1));
                    }
                }
                d
            }
            CaughtError::Value(value) => {
                Diagnostic::error(format!("exception value: {:?}", value.type_of()))
            }
            CaughtError::Error(e) => Diagnostic::error(e.to_string()),
        };
        diag.file = Some(origin.display().to_string());
        diag
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => {
                write!(f, "{}:{}: {}: {}", file, line, self.severity, self.message)
            }
            (Some(file), None) => write!(f, "{}: {}: {}", file, self.severity, self.message),
            _ => write!(f, "{}: {}", self.severity, self.message),
        }
    }
}

/// True if any diagnostic in the set blocks the reload.
pub fn has_blocking(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(|d| d.severity.is_blocking())
}

/// Render a diagnostic set for the log, one per line.
pub fn render_diagnostics(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocking_detection() {
        let diags = vec![
            Diagnostic::warning("unused binding"),
            Diagnostic::error("unexpected token"),
        ];
        assert!(has_blocking(&diags));

        let diags = vec![Diagnostic::warning("unused binding")];
        assert!(!has_blocking(&diags));

        let mut escalated = Diagnostic::warning("deprecated");
        escalated.severity = Severity::WarningAsError;
        assert!(has_blocking(&[escalated]));
    }

    #[test]
    fn test_render() {
        let diag = Diagnostic::error("unexpected token")
            .with_file("scripts/greeter.js")
            .with_line(3);
        assert_eq!(
            diag.to_string(),
            "scripts/greeter.js:3: error: unexpected token"
        );
    }

    #[test]
    fn test_empty_set_not_blocking() {
        assert!(!has_blocking(&[]));
        assert_eq!(render_diagnostics(&[]), "");
    }
}
