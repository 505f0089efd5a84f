//! Core domain models for translated lint diagnostics
//!
//! Architecture: Rich Domain Models - Records are entities with behavior, not just data
//! - Records classify their own severity from the rule code that produced them
//! - Positions own the one-based-wire to zero-based-host coordinate translation
//! - Fix payloads are carried verbatim from the tool for later, user-triggered use

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Severity classes for a diagnostic record
///
/// The tool's wire format never carries a severity; it is derived from the
/// rule code. Codes starting with `F` (pyflakes-derived correctness issues)
/// are errors, everything else is a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Stylistic or advisory findings
    Warning,
    /// Correctness findings that warrant the strongest highlighting
    Error,
}

impl Severity {
    /// Classify a rule code into a severity class
    pub fn from_code(code: &str) -> Self {
        if code.starts_with('F') {
            Self::Error
        } else {
            Self::Warning
        }
    }

    /// Whether this severity drives error-level highlighting in the host
    pub fn is_blocking(self) -> bool {
        matches!(self, Self::Error)
    }

    /// Convert to string for display
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// A zero-based text position in host addressing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
pub struct Position {
    /// Line index (0-based)
    pub line: u32,
    /// Column index (0-based)
    pub column: u32,
}

impl Position {
    /// Create a position from zero-based coordinates
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// Translate one-based wire coordinates into host addressing
    ///
    /// The tool promises coordinates >= 1; saturate rather than wrap if it
    /// ever sends 0.
    pub fn from_one_based(row: u32, column: u32) -> Self {
        Self { line: row.saturating_sub(1), column: column.saturating_sub(1) }
    }
}

/// A one-based wire position as the tool reports it
///
/// Fix edits keep wire addressing until they are turned into host
/// replacements, so the raw payload stays byte-for-byte reconstructible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct WirePosition {
    /// Row (1-based)
    pub row: u32,
    /// Column (1-based)
    pub column: u32,
}

impl WirePosition {
    /// Create a wire position from one-based coordinates
    pub fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Convert to zero-based host addressing
    pub fn to_host(self) -> Position {
        Position::from_one_based(self.row, self.column)
    }
}

/// One reported issue at a specific text span
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticRecord {
    /// Rule code that produced this record (short alphanumeric, non-empty)
    pub code: String,
    /// Severity derived from the rule code
    pub severity: Severity,
    /// Source file path as reported by the tool
    pub source: PathBuf,
    /// Start of the affected span (0-based)
    pub start: Position,
    /// End of the affected span (0-based)
    pub end: Position,
    /// Human-readable description of the issue
    pub message: String,
    /// Tool-provided fix, carried verbatim for later application
    pub fix: Option<FixPayload>,
}

impl DiagnosticRecord {
    /// Create a new record, deriving severity from the rule code
    pub fn new(
        code: impl Into<String>,
        source: PathBuf,
        start: Position,
        end: Position,
        message: impl Into<String>,
    ) -> Self {
        let code = code.into();
        let severity = Severity::from_code(&code);
        Self { code, severity, source, start, end, message: message.into(), fix: None }
    }

    /// Attach the tool's fix payload
    pub fn with_fix(mut self, fix: FixPayload) -> Self {
        self.fix = Some(fix);
        self
    }

    /// Whether the record carries a usable auto-fix
    pub fn has_fix(&self) -> bool {
        self.fix.as_ref().is_some_and(|f| !f.edits.is_empty())
    }

    /// Whether the span is well formed (start does not follow end)
    pub fn span_is_ordered(&self) -> bool {
        self.start <= self.end
    }

    /// Format record for display
    pub fn format_display(&self) -> String {
        format!(
            "{}:{}:{} [{}] {} {}",
            self.source.display(),
            self.start.line,
            self.start.column,
            self.severity.as_str(),
            self.code,
            self.message
        )
    }
}

/// Tool-provided set of text edits that would resolve a diagnostic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixPayload {
    /// Human-readable description of what the fix does
    pub message: String,
    /// Tool's own safety classification, carried but not interpreted
    pub applicability: Option<String>,
    /// Edits in document order; the tool guarantees they do not overlap
    pub edits: Vec<FixEdit>,
}

/// A single text replacement inside a fix payload (wire addressing)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixEdit {
    /// Replacement text
    pub content: String,
    /// Start of the replaced span (1-based)
    pub start: WirePosition,
    /// End of the replaced span, exclusive (1-based)
    pub end: WirePosition,
}

/// Error types that can occur while bridging to the tool
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Settings could not be loaded, parsed, or validated
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// File could not be read or accessed
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// The tool's output was not the JSON we expect
    #[error("Decode error: {message}")]
    Decode { message: String },

    /// The tool produced only stderr noise and no parseable output
    #[error("Tool error: {message}")]
    Tool { message: String },

    /// Suppression was requested for a code that must not be silenced
    #[error("Suppression error: {message}")]
    Suppression { message: String },
}

impl BridgeError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode { message: message.into() }
    }

    /// Create a tool error
    pub fn tool(message: impl Into<String>) -> Self {
        Self::Tool { message: message.into() }
    }

    /// Create a suppression error
    pub fn suppression(message: impl Into<String>) -> Self {
        Self::Suppression { message: message.into() }
    }
}

/// Result type for Bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;
