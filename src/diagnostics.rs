//! Structured diagnostics for schema checks and metadata cross-validation.
//!
//! Each discrepancy carries a stable code, the field it concerns and the
//! value the metadata file should hold, while its `Display` form stays the
//! plain instruction shown to submitters.

use std::fmt;

use serde::Serialize;

/// Severity of a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// A problem that causes validation failure.
    Error,
    /// A potential issue that does not cause failure.
    Warning,
}

/// A structured diagnostic message from validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Severity level.
    pub severity: Severity,
    /// Stable code (e.g., `"D001"`, `"S001"`).
    pub code: &'static str,
    /// Human-readable message.
    pub message: String,
    /// Metadata field the diagnostic refers to (e.g., `"sha256"`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
    /// The value the metadata should carry to resolve the diagnostic.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic with the given severity, code, and message.
    #[must_use]
    pub fn new(severity: Severity, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            field: None,
            expected: None,
        }
    }

    /// Set the field that caused this diagnostic.
    #[must_use]
    pub fn with_field(mut self, field: &'static str) -> Self {
        self.field = Some(field);
        self
    }

    /// Set the value the field is expected to hold.
    #[must_use]
    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    /// Returns `true` if this diagnostic is an error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Errors print as the bare message; warnings carry a `warning:` prefix.
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Error => write!(f, "{}", self.message),
            Severity::Warning => write!(f, "warning: {}", self.message),
        }
    }
}

// ── Codes ───────────────────────────────────────────────────────────────

// Schema conformance (S001)

/// Metadata does not conform to the schema document.
pub const S001: &str = "S001";

// Content discrepancies (D001–D006)

/// Computed sha256 differs from the declared one.
pub const D001: &str = "D001";
/// Manifest `summary` differs from metadata `name`.
pub const D002: &str = "D002";
/// Manifest `description` differs from metadata `description`.
pub const D003: &str = "D003";
/// Manifest `url` differs from metadata `homepage`.
pub const D004: &str = "D004";
/// Containing folder differs from manifest `name`.
pub const D005: &str = "D005";
/// File base name differs from manifest `version`.
pub const D006: &str = "D006";
