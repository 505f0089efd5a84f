//! Ruff Bridge - Adapter between editor linting hosts and the ruff analyzer
//!
//! Architecture: Clean Architecture - Library interface serves as the application layer
//! - Pure translation and policy logic separated from host concerns
//! - The host owns process spawning, scheduling, and rendering; this crate
//!   owns the decision to run, the output translation, and the edit
//!   synthesis for fixes and suppressions

pub mod config;
pub mod domain;
pub mod fixes;
pub mod guard;
pub mod report;
pub mod suppress;
pub mod translate;

// Re-export main types for convenient access
pub use domain::diagnostics::{
    BridgeError, BridgeResult, DiagnosticRecord, FixEdit, FixPayload, Position, Severity,
    WirePosition,
};

pub use config::{BridgeSettings, SettingsBuilder};

pub use guard::{
    FileContext, GuardDecision, GuardPolicy, InvocationGuard, LocalConfigPolicy, SkipReason,
    TypeCommentPolicy,
};

pub use fixes::{actions_for, replacements, FixAction, Replacement};

pub use report::{OutputFormat, ReportFormatter, ReportOptions};

pub use translate::Translator;

use std::path::Path;

/// Main bridge facade providing the per-cycle operations the host calls
///
/// Stateless across cycles: the guard probes the filesystem fresh each
/// time, and translated records are owned by the host once yielded.
pub struct RuffBridge {
    settings: BridgeSettings,
    guard: InvocationGuard,
    translator: Translator,
}

impl RuffBridge {
    /// Create a bridge with default settings
    pub fn new() -> Self {
        Self::with_settings(BridgeSettings::default())
    }

    /// Create a bridge with the given settings
    pub fn with_settings(settings: BridgeSettings) -> Self {
        let guard = InvocationGuard::new(&settings);
        Self { settings, guard, translator: Translator::new() }
    }

    /// Create a bridge loading settings from a YAML file
    pub fn from_settings_file<P: AsRef<Path>>(path: P) -> BridgeResult<Self> {
        let settings = BridgeSettings::load_from_file(path)?;
        Ok(Self::with_settings(settings))
    }

    /// The settings this bridge was built with
    pub fn settings(&self) -> &BridgeSettings {
        &self.settings
    }

    /// Decide whether the tool should run this cycle
    ///
    /// Must be called before the host spawns anything. A skip is terminal
    /// for the cycle; the host clears its prior file association and does
    /// not treat it as a tool failure.
    pub fn check_invocation(&self, cwd: Option<&Path>, context: &FileContext) -> GuardDecision {
        self.guard.decide(cwd, context, &self.settings)
    }

    /// The argv the host should spawn when the guard permits a run
    pub fn command_line(&self) -> Vec<String> {
        self.settings.command_line()
    }

    /// Translate captured tool output into normalized records
    ///
    /// Failure paths degrade to an empty sequence plus a log entry.
    pub fn parse(
        &self,
        stdout: &str,
        stderr: &str,
    ) -> impl Iterator<Item = DiagnosticRecord> + 'static {
        self.translator.parse(stdout, stderr)
    }

    /// Translate with programmatic failure signalling
    pub fn parse_checked(&self, stdout: &str, stderr: &str) -> BridgeResult<Vec<DiagnosticRecord>> {
        self.translator.parse_checked(stdout, stderr)
    }

    /// Build the offered fix actions for a batch of records
    pub fn fix_actions(&self, records: &[DiagnosticRecord]) -> Vec<FixAction> {
        fixes::actions_for(records)
    }

    /// Synthesize the suppression edit for a diagnostic on one line
    pub fn suppress(
        &self,
        line_text: &str,
        line_number: u32,
        code: &str,
    ) -> BridgeResult<Option<Replacement>> {
        suppress::synthesize(line_text, line_number, code)
    }
}

impl Default for RuffBridge {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function to translate captured output with default settings
pub fn parse_output(stdout: &str, stderr: &str) -> Vec<DiagnosticRecord> {
    Translator::new().parse(stdout, stderr).collect()
}

/// Convenience function for the standard tool invocation argv
pub fn default_command_line() -> Vec<String> {
    BridgeSettings::default().command_line()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_full_cycle_proceed_and_parse() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("ruff.toml"), "").unwrap();

        let settings = SettingsBuilder::new()
            .check_for_local_configuration(true)
            .build()
            .unwrap();
        let bridge = RuffBridge::with_settings(settings);

        let decision =
            bridge.check_invocation(Some(temp.path()), &FileContext::for_file("api.py"));
        assert!(decision.permits_run());

        let stdout = r#"[{
            "code": "F401",
            "filename": "api.py",
            "message": "`os` imported but unused",
            "location": { "row": 1, "column": 8 },
            "end_location": { "row": 1, "column": 10 },
            "fix": null
        }]"#;

        let records: Vec<_> = bridge.parse(stdout, "").collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].severity, Severity::Error);
    }

    #[test]
    fn test_skip_cycle_is_terminal() {
        let temp = TempDir::new().unwrap();

        let settings = SettingsBuilder::new()
            .check_for_local_configuration(true)
            .build()
            .unwrap();
        let bridge = RuffBridge::with_settings(settings);

        let decision =
            bridge.check_invocation(Some(temp.path()), &FileContext::for_file("api.py"));
        assert!(decision.is_terminal());
        assert!(!decision.permits_run());
    }

    #[test]
    fn test_default_command_line() {
        assert_eq!(
            default_command_line(),
            vec!["ruff", "check", "--output-format=json", "--no-cache", "-"]
        );
    }

    #[test]
    fn test_parse_output_convenience() {
        assert!(parse_output("[]", "").is_empty());
        assert!(parse_output("garbage", "").is_empty());
    }

    #[test]
    fn test_suppress_through_facade() {
        let bridge = RuffBridge::new();
        let rep = bridge.suppress("import os", 0, "F401").unwrap().unwrap();
        assert_eq!(rep.content, "  # noqa: F401");

        assert!(bridge.suppress("x = 1", 0, "E999").is_err());
    }

    #[test]
    fn test_from_settings_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bridge.yaml");
        fs::write(&path, "check_for_local_configuration: true\n").unwrap();

        let bridge = RuffBridge::from_settings_file(&path).unwrap();
        assert!(bridge.settings().check_for_local_configuration);
    }
}
