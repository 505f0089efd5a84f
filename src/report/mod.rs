//! Report generation for translated diagnostic batches
//!
//! CDD Principle: Anti-Corruption Layer - Formatters translate domain objects to external formats
//! - The in-editor host renders records itself; these formatters serve the
//!   CLI and programmatic consumers
//! - Each formatter encapsulates the rules for its specific output format

use crate::domain::diagnostics::{BridgeResult, DiagnosticRecord, Severity};
use serde_json::Value as JsonValue;
use std::io::Write;

/// Supported output formats for diagnostic batches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable format with colors and per-file grouping
    Human,
    /// JSON format for programmatic consumption
    Json,
}

impl OutputFormat {
    /// Parse format from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "human" => Some(Self::Human),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Get all available format names
    pub fn all_formats() -> &'static [&'static str] {
        &["human", "json"]
    }
}

/// Options for customizing report output
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Whether to use colored output (for human format)
    pub use_colors: bool,
    /// Minimum severity level to include
    pub min_severity: Option<Severity>,
    /// Maximum number of records to include
    pub max_records: Option<usize>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self { use_colors: true, min_severity: None, max_records: None }
    }
}

/// Formats diagnostic batches for terminal or machine consumption
pub struct ReportFormatter {
    options: ReportOptions,
}

impl ReportFormatter {
    /// Create a new report formatter with options
    pub fn new(options: ReportOptions) -> Self {
        Self { options }
    }

    /// Format a batch of records in the specified format
    pub fn format(
        &self,
        records: &[DiagnosticRecord],
        format: OutputFormat,
    ) -> BridgeResult<String> {
        let filtered = self.filter_records(records);

        match format {
            OutputFormat::Human => self.format_human(&filtered),
            OutputFormat::Json => self.format_json(&filtered),
        }
    }

    /// Write a formatted batch to a writer
    pub fn write_report<W: Write>(
        &self,
        records: &[DiagnosticRecord],
        format: OutputFormat,
        mut writer: W,
    ) -> BridgeResult<()> {
        let formatted = self.format(records, format)?;
        writer.write_all(formatted.as_bytes())?;
        Ok(())
    }

    /// Filter records based on report options
    fn filter_records<'a>(&self, records: &'a [DiagnosticRecord]) -> Vec<&'a DiagnosticRecord> {
        let mut filtered: Vec<&DiagnosticRecord> = records
            .iter()
            .filter(|r| match self.options.min_severity {
                Some(min) => r.severity >= min,
                None => true,
            })
            .collect();

        if let Some(max) = self.options.max_records {
            filtered.truncate(max);
        }

        filtered
    }

    /// Format records in human-readable format, grouped by file
    fn format_human(&self, records: &[&DiagnosticRecord]) -> BridgeResult<String> {
        let mut output = String::new();

        if records.is_empty() {
            output.push_str("No issues found\n");
            return Ok(output);
        }

        let mut by_file: std::collections::BTreeMap<&std::path::Path, Vec<&DiagnosticRecord>> =
            std::collections::BTreeMap::new();
        for record in records {
            by_file.entry(record.source.as_path()).or_default().push(record);
        }

        for (file_path, file_records) in by_file {
            output.push_str(&format!("{}\n", file_path.display()));

            for record in file_records {
                let severity_color = match record.severity {
                    Severity::Error => "31",   // Red
                    Severity::Warning => "33", // Yellow
                };

                let position = format!("{}:{}", record.start.line, record.start.column);

                if self.options.use_colors {
                    output.push_str(&format!(
                        "  \x1b[2m{}\x1b[0m [\x1b[{}m{}\x1b[0m] {} {}\n",
                        position,
                        severity_color,
                        record.severity.as_str(),
                        record.code,
                        record.message
                    ));
                } else {
                    output.push_str(&format!(
                        "  {} [{}] {} {}\n",
                        position,
                        record.severity.as_str(),
                        record.code,
                        record.message
                    ));
                }

                if let Some(fix) = &record.fix {
                    output.push_str(&format!("    fix available: {}\n", fix.message));
                }
            }
            output.push('\n');
        }

        output.push_str(&self.format_summary(records));
        Ok(output)
    }

    /// Format records in JSON format
    fn format_json(&self, records: &[&DiagnosticRecord]) -> BridgeResult<String> {
        let json_records: Vec<JsonValue> = records
            .iter()
            .map(|r| {
                serde_json::json!({
                    "code": r.code,
                    "severity": r.severity.as_str(),
                    "source": r.source.display().to_string(),
                    "start": { "line": r.start.line, "column": r.start.column },
                    "end": { "line": r.end.line, "column": r.end.column },
                    "message": r.message,
                    "has_fix": r.has_fix(),
                })
            })
            .collect();

        let errors = records.iter().filter(|r| r.severity == Severity::Error).count();
        let warnings = records.len() - errors;

        let json_report = serde_json::json!({
            "records": json_records,
            "summary": { "error": errors, "warning": warnings },
        });

        serde_json::to_string_pretty(&json_report).map_err(|e| {
            crate::domain::diagnostics::BridgeError::config(format!(
                "JSON serialization failed: {e}"
            ))
        })
    }

    /// One-line summary of a batch
    fn format_summary(&self, records: &[&DiagnosticRecord]) -> String {
        let errors = records.iter().filter(|r| r.severity == Severity::Error).count();
        let warnings = records.len() - errors;
        format!(
            "{} issue{} ({} error{}, {} warning{})\n",
            records.len(),
            if records.len() == 1 { "" } else { "s" },
            errors,
            if errors == 1 { "" } else { "s" },
            warnings,
            if warnings == 1 { "" } else { "s" },
        )
    }
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self::new(ReportOptions::default())
    }
}
