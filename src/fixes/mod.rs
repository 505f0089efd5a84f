//! Auto-fix application for translated records
//!
//! Architecture: Domain Services - Fix payloads become host text replacements here
//! - Edits stay in the order the tool emitted them; the tool guarantees
//!   non-overlap and document order
//! - Records sharing a rule code and line collapse into one offered action
//!   so the user is not shown redundant near-duplicate suggestions

use crate::domain::diagnostics::{DiagnosticRecord, FixPayload, Position};
use std::collections::HashSet;

/// A single text replacement in host (zero-based) addressing
///
/// Replaces the half-open span `[start, end)` with `content`. A zero-width
/// span is an insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    /// Start of the replaced span
    pub start: Position,
    /// End of the replaced span, exclusive
    pub end: Position,
    /// Replacement text
    pub content: String,
}

impl Replacement {
    /// Create a replacement
    pub fn new(start: Position, end: Position, content: impl Into<String>) -> Self {
        Self { start, end, content: content.into() }
    }

    /// Create an insertion at a single position
    pub fn insertion(at: Position, content: impl Into<String>) -> Self {
        Self::new(at, at, content)
    }
}

/// Convert a fix payload's edits into host replacements, in payload order
pub fn replacements(fix: &FixPayload) -> Vec<Replacement> {
    fix.edits
        .iter()
        .map(|edit| Replacement::new(edit.start.to_host(), edit.end.to_host(), edit.content.clone()))
        .collect()
}

/// A user-selectable fix action covering one or more records
#[derive(Debug, Clone)]
pub struct FixAction {
    /// Action label shown to the user, e.g. `ruff: Remove unused import`
    pub title: String,
    /// The diagnostic message the action resolves
    pub detail: String,
    /// Records this action resolves, each carrying a fix payload
    pub records: Vec<DiagnosticRecord>,
}

impl FixAction {
    fn for_record(record: DiagnosticRecord) -> Option<Self> {
        let fix = record.fix.as_ref()?;
        Some(Self {
            title: format!("ruff: {}", fix.message),
            detail: record.message.clone(),
            records: vec![record],
        })
    }

    /// All replacements for this action, in record then payload order
    pub fn replacements(&self) -> Vec<Replacement> {
        self.records
            .iter()
            .filter_map(|r| r.fix.as_ref())
            .flat_map(|fix| replacements(fix))
            .collect()
    }
}

/// Build the offered fix actions for a batch of records
///
/// Records without a usable fix are skipped. Records sharing a rule code
/// and start line merge into a single action titled after the first
/// record's fix message.
pub fn actions_for(records: &[DiagnosticRecord]) -> Vec<FixAction> {
    let mut actions: Vec<FixAction> = Vec::new();
    let mut seen: HashSet<(String, u32)> = HashSet::new();

    for record in records {
        if !record.has_fix() {
            continue;
        }

        let key = (record.code.clone(), record.start.line);
        if seen.contains(&key) {
            if let Some(action) = actions
                .iter_mut()
                .find(|a| a.records[0].code == key.0 && a.records[0].start.line == key.1)
            {
                action.records.push(record.clone());
            }
            continue;
        }

        seen.insert(key);
        if let Some(action) = FixAction::for_record(record.clone()) {
            actions.push(action);
        }
    }

    actions
}
