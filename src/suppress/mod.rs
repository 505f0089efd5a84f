//! Inline suppression comment synthesis
//!
//! Architecture: Domain Services - Turns a record's rule code into a `# noqa` edit
//! - An existing comment on the line is extended; otherwise a fresh comment
//!   is appended at end of line
//! - Structural syntax and indentation codes are refused outright: a file
//!   the tool cannot reliably analyze must not be silenced

use crate::domain::diagnostics::{BridgeError, BridgeResult, Position};
use crate::fixes::Replacement;
use regex::Regex;
use std::sync::OnceLock;

/// Rule codes that must never be suppressed
///
/// Some indentation rules are not stylistic in Python; these violations
/// mean the file cannot be analyzed at all.
pub const NON_SUPPRESSIBLE: &[&str] = &[
    "E112", // expected an indented block
    "E113", // unexpected indentation
    "E116", // unexpected indentation (comment)
    "E901", // SyntaxError or IndentationError
    "E902", // IOError
    "E999", // SyntaxError
    "F722", // syntax error in forward annotation
];

/// Whether a rule code may be suppressed inline
pub fn is_suppressible(code: &str) -> bool {
    !NON_SUPPRESSIBLE.contains(&code)
}

fn noqa_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)# noqa:[\s]?(?P<codes>[A-Z]+[0-9]+((?:,\s?)[A-Z]+[0-9]+)*)")
            .expect("noqa pattern is valid")
    })
}

/// Synthesize the suppression edit for one line
///
/// `line_text` is the full text of the line (a trailing newline is
/// tolerated and ignored), `line_number` its zero-based index in the
/// buffer. Exactly one of two mutually exclusive outcomes applies:
///
/// - the line already carries a recognized `# noqa` comment: the captured
///   code list is rewritten with `code` appended (`Ok(None)` when the code
///   is already listed),
/// - no comment: a zero-width replacement at end of line inserts
///   `"  # noqa: {code}"`.
///
/// Non-suppressible codes are refused with an error.
pub fn synthesize(
    line_text: &str,
    line_number: u32,
    code: &str,
) -> BridgeResult<Option<Replacement>> {
    if !is_suppressible(code) {
        return Err(BridgeError::suppression(format!(
            "rule {code} signals a structural error and cannot be suppressed"
        )));
    }

    let line = line_text.trim_end_matches(['\n', '\r']);

    if let Some(captures) = noqa_pattern().captures(line) {
        let codes = captures.name("codes").expect("codes group always captured");

        let already_listed = codes
            .as_str()
            .split(',')
            .map(str::trim)
            .any(|existing| existing.eq_ignore_ascii_case(code));
        if already_listed {
            return Ok(None);
        }

        let start = char_offset(line, codes.start());
        let end = char_offset(line, codes.end());
        return Ok(Some(Replacement::new(
            Position::new(line_number, start),
            Position::new(line_number, end),
            format!("{}, {}", codes.as_str(), code),
        )));
    }

    let eol = char_offset(line, line.len());
    Ok(Some(Replacement::insertion(
        Position::new(line_number, eol),
        format!("  # noqa: {code}"),
    )))
}

/// Apply a single-line replacement to that line's text
///
/// Convenience for hosts (and the CLI) that edit line-by-line; the
/// replacement must not span lines.
pub fn apply_to_line(line_text: &str, replacement: &Replacement) -> String {
    let line = line_text.trim_end_matches(['\n', '\r']);
    let chars: Vec<char> = line.chars().collect();
    let start = replacement.start.column as usize;
    let end = replacement.end.column.min(chars.len() as u32) as usize;

    let mut result: String = chars[..start.min(chars.len())].iter().collect();
    result.push_str(&replacement.content);
    result.extend(&chars[end.min(chars.len())..]);
    result
}

/// Column index in characters for a byte offset into the line
///
/// The host addresses columns in characters; regex captures report bytes.
fn char_offset(line: &str, byte_offset: usize) -> u32 {
    line[..byte_offset].chars().count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_to_bare_line() {
        let rep = synthesize("import os", 4, "F401").unwrap().unwrap();

        assert_eq!(rep.start, Position::new(4, 9));
        assert_eq!(rep.end, Position::new(4, 9));
        assert_eq!(rep.content, "  # noqa: F401");
        assert_eq!(apply_to_line("import os", &rep), "import os  # noqa: F401");
    }

    #[test]
    fn test_extend_existing_comment() {
        let line = "x = 1  # noqa: E501";
        let rep = synthesize(line, 0, "F401").unwrap().unwrap();

        assert_eq!(apply_to_line(line, &rep), "x = 1  # noqa: E501, F401");
    }

    #[test]
    fn test_extend_multi_code_comment() {
        let line = "x = 1  # noqa: E501, W291";
        let rep = synthesize(line, 0, "F401").unwrap().unwrap();

        assert_eq!(apply_to_line(line, &rep), "x = 1  # noqa: E501, W291, F401");
    }

    #[test]
    fn test_code_already_listed_is_a_noop() {
        assert!(synthesize("x = 1  # noqa: E501, F401", 0, "F401").unwrap().is_none());
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let line = "x = 1  # NOQA: E501";
        let rep = synthesize(line, 0, "F401").unwrap().unwrap();
        assert_eq!(apply_to_line(line, &rep), "x = 1  # NOQA: E501, F401");

        // Case-insensitive on the codes too
        assert!(synthesize("x = 1  # noqa: f401", 0, "F401").unwrap().is_none());
    }

    #[test]
    fn test_refuses_structural_codes() {
        for code in NON_SUPPRESSIBLE {
            let result = synthesize("x = 1", 0, code);
            assert!(
                matches!(result, Err(BridgeError::Suppression { .. })),
                "{code} must be refused"
            );
        }
    }

    #[test]
    fn test_suppressible_classification() {
        assert!(is_suppressible("F401"));
        assert!(is_suppressible("E501"));
        assert!(!is_suppressible("E999"));
        assert!(!is_suppressible("F722"));
    }

    #[test]
    fn test_trailing_newline_is_ignored() {
        let rep = synthesize("import os\n", 0, "F401").unwrap().unwrap();
        assert_eq!(rep.start.column, 9);
    }

    #[test]
    fn test_exactly_one_replacement_per_invocation() {
        // Extension and append are mutually exclusive; an extended line
        // never also gets an end-of-line insertion
        let line = "import os  # noqa: E501";
        let rep = synthesize(line, 0, "F401").unwrap().unwrap();
        assert!(rep.start != rep.end, "extension rewrites the code span, not an insertion");
    }

    #[test]
    fn test_non_ascii_line_columns_are_characters() {
        let line = "x = \"héllo\"";
        let rep = synthesize(line, 0, "E501").unwrap().unwrap();
        assert_eq!(rep.start.column, line.chars().count() as u32);
        assert_eq!(apply_to_line(line, &rep), "x = \"héllo\"  # noqa: E501");
    }
}
