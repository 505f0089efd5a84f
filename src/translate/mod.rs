//! Wire-format translation for the tool's JSON output
//!
//! Architecture: Anti-Corruption Layer - The tool's schema stays at this boundary
//! - Deserialization goes through explicit serde structs, never ad-hoc key lookups
//! - Every failure path degrades to an empty record sequence plus a log entry;
//!   nothing here may take the host down
//! - Record translation is an iterator adaptor so the host can render
//!   incrementally

use crate::domain::diagnostics::{
    BridgeError, BridgeResult, DiagnosticRecord, FixEdit, FixPayload, Position, WirePosition,
};
use serde::Deserialize;
use std::path::PathBuf;

/// One-based location object as the tool emits it
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RuffLocation {
    pub row: u32,
    pub column: u32,
}

/// A single edit inside the tool's fix object
#[derive(Debug, Clone, Deserialize)]
pub struct RuffEdit {
    pub content: String,
    pub location: RuffLocation,
    pub end_location: RuffLocation,
}

/// The tool's fix object
#[derive(Debug, Clone, Deserialize)]
pub struct RuffFix {
    pub message: String,
    #[serde(default)]
    pub applicability: Option<String>,
    pub edits: Vec<RuffEdit>,
}

/// One issue object from the tool's JSON array
///
/// The schema is a versioned external contract that grows fields over time
/// (`cell`, `noqa_row`, `url` are present but not consumed), so unknown
/// fields are ignored rather than rejected.
#[derive(Debug, Clone, Deserialize)]
pub struct RuffMessage {
    pub code: String,
    pub filename: String,
    pub message: String,
    pub location: RuffLocation,
    pub end_location: RuffLocation,
    #[serde(default)]
    pub fix: Option<RuffFix>,
    #[serde(default)]
    pub noqa_row: Option<u32>,
    #[serde(default)]
    pub url: Option<String>,
}

impl RuffMessage {
    /// Translate a wire message into a normalized record
    ///
    /// Returns `None` for messages violating the record invariants (empty
    /// rule code, start after end); those are logged and dropped rather
    /// than surfaced as broken records.
    fn into_record(self) -> Option<DiagnosticRecord> {
        if self.code.is_empty() {
            tracing::warn!(
                filename = %self.filename,
                "dropping record with empty rule code: {}",
                self.message
            );
            return None;
        }

        let start = Position::from_one_based(self.location.row, self.location.column);
        let end = Position::from_one_based(self.end_location.row, self.end_location.column);
        if start > end {
            tracing::warn!(
                code = %self.code,
                filename = %self.filename,
                "dropping record with inverted span {}:{} > {}:{}",
                start.line,
                start.column,
                end.line,
                end.column
            );
            return None;
        }

        let mut record = DiagnosticRecord::new(
            self.code,
            PathBuf::from(self.filename),
            start,
            end,
            self.message,
        );

        if let Some(fix) = self.fix {
            record = record.with_fix(FixPayload {
                message: fix.message,
                applicability: fix.applicability,
                edits: fix
                    .edits
                    .into_iter()
                    .map(|e| FixEdit {
                        content: e.content,
                        start: WirePosition::new(e.location.row, e.location.column),
                        end: WirePosition::new(e.end_location.row, e.end_location.column),
                    })
                    .collect(),
            });
        }

        Some(record)
    }
}

/// Translates captured tool output into normalized diagnostic records
pub struct Translator;

impl Translator {
    pub fn new() -> Self {
        Self
    }

    /// Parse captured stdout/stderr into a lazy record sequence
    ///
    /// Degrading entry point: every failure yields an empty sequence and a
    /// log entry. Records come out in wire order; downstream must not
    /// assume file/line sorting.
    pub fn parse(
        &self,
        stdout: &str,
        stderr: &str,
    ) -> impl Iterator<Item = DiagnosticRecord> + 'static {
        let messages = match self.decode(stdout, stderr) {
            Ok(messages) => messages,
            Err(BridgeError::Tool { message }) => {
                // stderr is noisy (e.g. "error: Failed to parse at 155:15")
                // but with no stdout it is the only signal available
                tracing::error!("ruff reported: {message}");
                Vec::new()
            }
            Err(e) => {
                tracing::error!("{e}");
                Vec::new()
            }
        };

        messages.into_iter().filter_map(RuffMessage::into_record)
    }

    /// Parse with programmatic failure signalling
    ///
    /// Hosts that surface failures themselves use this instead of relying
    /// on the log stream. Record-level invariant violations are still
    /// dropped, not errored.
    pub fn parse_checked(
        &self,
        stdout: &str,
        stderr: &str,
    ) -> BridgeResult<Vec<DiagnosticRecord>> {
        let messages = self.decode(stdout, stderr)?;
        Ok(messages.into_iter().filter_map(RuffMessage::into_record).collect())
    }

    /// Decode captured output into wire messages
    fn decode(&self, stdout: &str, stderr: &str) -> BridgeResult<Vec<RuffMessage>> {
        if !stderr.trim().is_empty() && stdout.trim().is_empty() {
            return Err(BridgeError::tool(stderr.trim().to_string()));
        }

        if stdout.trim().is_empty() {
            tracing::info!("ruff: no output");
            return Ok(Vec::new());
        }

        serde_json::from_str::<Vec<RuffMessage>>(stdout).map_err(|e| {
            BridgeError::decode(format!(
                "We expected JSON from 'ruff', but instead got this:\n{stdout}\n({e})"
            ))
        })
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::diagnostics::Severity;

    const SAMPLE_OUTPUT: &str = r#"[
      {
        "cell": null,
        "code": "E501",
        "end_location": { "column": 140, "row": 24 },
        "filename": "api.py",
        "fix": null,
        "location": { "column": 121, "row": 24 },
        "message": "Line too long (139 > 120)",
        "noqa_row": 24,
        "url": "https://docs.astral.sh/ruff/rules/line-too-long"
      },
      {
        "cell": null,
        "code": "F401",
        "end_location": { "column": 10, "row": 1 },
        "filename": "api.py",
        "fix": {
          "applicability": "safe",
          "edits": [
            {
              "content": "",
              "end_location": { "column": 1, "row": 2 },
              "location": { "column": 1, "row": 1 }
            }
          ],
          "message": "Remove unused import: `os`"
        },
        "location": { "column": 8, "row": 1 },
        "message": "`os` imported but unused",
        "noqa_row": 1,
        "url": "https://docs.astral.sh/ruff/rules/unused-import"
      }
    ]"#;

    #[test]
    fn test_parse_sample_output() {
        let translator = Translator::new();
        let records: Vec<_> = translator.parse(SAMPLE_OUTPUT, "").collect();

        assert_eq!(records.len(), 2);

        let long_line = &records[0];
        assert_eq!(long_line.code, "E501");
        assert_eq!(long_line.severity, Severity::Warning);
        assert_eq!(long_line.start, Position::new(23, 120));
        assert_eq!(long_line.end, Position::new(23, 139));
        assert!(long_line.fix.is_none());

        let unused_import = &records[1];
        assert_eq!(unused_import.code, "F401");
        assert_eq!(unused_import.severity, Severity::Error);
        assert_eq!(unused_import.start, Position::new(0, 7));
        assert_eq!(unused_import.end, Position::new(0, 9));

        let fix = unused_import.fix.as_ref().unwrap();
        assert_eq!(fix.message, "Remove unused import: `os`");
        assert_eq!(fix.applicability.as_deref(), Some("safe"));
        assert_eq!(fix.edits.len(), 1);
        assert_eq!(fix.edits[0].start, WirePosition::new(1, 1));
        assert_eq!(fix.edits[0].end, WirePosition::new(2, 1));
    }

    #[test]
    fn test_records_keep_wire_order() {
        let translator = Translator::new();
        let codes: Vec<_> =
            translator.parse(SAMPLE_OUTPUT, "").map(|r| r.code).collect();
        assert_eq!(codes, vec!["E501", "F401"]);
    }

    #[test]
    fn test_empty_stdout_yields_empty_sequence() {
        let translator = Translator::new();
        assert_eq!(translator.parse("", "").count(), 0);
        assert_eq!(translator.parse("   \n", "").count(), 0);
    }

    #[test]
    fn test_empty_array_yields_empty_sequence() {
        let translator = Translator::new();
        assert_eq!(translator.parse("[]", "").count(), 0);
    }

    #[test]
    fn test_malformed_stdout_degrades_to_empty() {
        let translator = Translator::new();
        assert_eq!(translator.parse("not valid json", "").count(), 0);
    }

    #[test]
    fn test_malformed_stdout_errors_when_checked() {
        let translator = Translator::new();
        let result = translator.parse_checked("not valid json", "");
        assert!(matches!(result, Err(BridgeError::Decode { .. })));
    }

    #[test]
    fn test_stderr_only_is_a_tool_error() {
        let translator = Translator::new();
        let result = translator
            .parse_checked("", "error: Failed to parse at 155:15: Unexpected token");
        assert!(matches!(result, Err(BridgeError::Tool { .. })));

        // The degrading entry point swallows it
        assert_eq!(
            translator
                .parse("", "error: Failed to parse at 155:15: Unexpected token")
                .count(),
            0
        );
    }

    #[test]
    fn test_stderr_is_ignored_when_stdout_present() {
        // Parse errors appear well formatted on stdout too; stderr noise
        // alongside usable stdout must not mask the records
        let translator = Translator::new();
        let records = translator
            .parse_checked(SAMPLE_OUTPUT, "error: something noisy")
            .unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_empty_code_is_dropped() {
        let json = r#"[{
          "code": "",
          "filename": "api.py",
          "message": "mystery",
          "location": { "row": 1, "column": 1 },
          "end_location": { "row": 1, "column": 2 }
        }]"#;

        let translator = Translator::new();
        assert_eq!(translator.parse(json, "").count(), 0);
    }

    #[test]
    fn test_inverted_span_is_dropped() {
        let json = r#"[{
          "code": "E501",
          "filename": "api.py",
          "message": "backwards",
          "location": { "row": 5, "column": 1 },
          "end_location": { "row": 4, "column": 1 }
        }]"#;

        let translator = Translator::new();
        assert_eq!(translator.parse(json, "").count(), 0);
    }

    #[test]
    fn test_unknown_fields_are_tolerated() {
        let json = r#"[{
          "code": "W291",
          "filename": "api.py",
          "message": "Trailing whitespace",
          "location": { "row": 3, "column": 10 },
          "end_location": { "row": 3, "column": 11 },
          "some_future_field": { "nested": true }
        }]"#;

        let translator = Translator::new();
        let records: Vec<_> = translator.parse(json, "").collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].code, "W291");
    }

    #[test]
    fn test_missing_required_field_is_a_decode_failure() {
        // No "location" object
        let json = r#"[{
          "code": "W291",
          "filename": "api.py",
          "message": "Trailing whitespace",
          "end_location": { "row": 3, "column": 11 }
        }]"#;

        let translator = Translator::new();
        assert!(translator.parse_checked(json, "").is_err());
        assert_eq!(translator.parse(json, "").count(), 0);
    }
}
