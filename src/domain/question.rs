//! PAA question bank records and template handling.
//!
//! A question is a template containing a `{location}` placeholder. Replacing
//! a client's bank re-parses a newline-delimited text block: every non-empty
//! line must contain the `{location}` token and end with `?`. Violations are
//! collected per line and returned together, not fail-fast.

use serde::{Deserialize, Serialize};

use crate::domain::ServiceLocation;
use crate::error::{CadencerError, Result};
use crate::id::{generate_id, now_ms};

/// The placeholder every question template must contain.
pub const LOCATION_TOKEN: &str = "{location}";

/// A templated "People Also Ask" question owned by one client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaaQuestion {
    /// Record ID: "paa-{timestamp}-{hex}"
    pub id: String,

    /// Owning client
    pub client_id: String,

    /// Question template with a `{location}` placeholder
    pub template: String,

    /// Ordering within the bank, lower runs first
    pub priority: u32,

    pub is_active: bool,

    /// Unix timestamp in milliseconds
    pub created_at: i64,
}

impl PaaQuestion {
    /// Create a new active question.
    pub fn new(client_id: &str, template: &str, priority: u32) -> Self {
        Self {
            id: generate_id("paa"),
            client_id: client_id.to_string(),
            template: template.to_string(),
            priority,
            is_active: true,
            created_at: now_ms(),
        }
    }
}

/// Parse a newline-delimited block of question templates into a fresh bank.
///
/// Blank lines are skipped. Priorities are assigned by line order starting
/// at 1. All validation errors are collected and returned as a single
/// [`CadencerError::Validation`] so a bulk edit can be corrected in one pass.
pub fn parse_question_block(client_id: &str, text: &str) -> Result<Vec<PaaQuestion>> {
    let mut questions = Vec::new();
    let mut errors = Vec::new();
    let mut priority = 0u32;

    for (line_no, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let mut line_ok = true;
        if !line.to_ascii_lowercase().contains(LOCATION_TOKEN) {
            errors.push(format!("line {}: missing {{location}} placeholder", line_no + 1));
            line_ok = false;
        }
        if !line.ends_with('?') {
            errors.push(format!("line {}: must end with '?'", line_no + 1));
            line_ok = false;
        }

        if line_ok {
            priority += 1;
            questions.push(PaaQuestion::new(client_id, line, priority));
        }
    }

    if !errors.is_empty() {
        return Err(CadencerError::Validation(errors));
    }

    Ok(questions)
}

/// Render a question template against a location.
///
/// Substitutes `{location}`, `{city}`, and `{state}` case-insensitively.
/// `{location}` renders the location's display name (neighborhood + city
/// when a neighborhood is present, else city + state).
pub fn render_template(template: &str, location: &ServiceLocation) -> String {
    let rendered = replace_token_ci(template, "{location}", &location.display_name());
    let rendered = replace_token_ci(&rendered, "{city}", &location.city);
    replace_token_ci(&rendered, "{state}", &location.state)
}

/// Replace every case-insensitive occurrence of `token` in `haystack`.
///
/// Tokens are ASCII, so byte offsets from the ASCII-lowercased copy map
/// directly back into the original string.
fn replace_token_ci(haystack: &str, token: &str, replacement: &str) -> String {
    let lower = haystack.to_ascii_lowercase();
    let mut out = String::with_capacity(haystack.len());
    let mut rest = 0usize;
    let mut search = 0usize;

    while let Some(pos) = lower[search..].find(token) {
        let start = search + pos;
        out.push_str(&haystack[rest..start]);
        out.push_str(replacement);
        rest = start + token.len();
        search = rest;
    }
    out.push_str(&haystack[rest..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location() -> ServiceLocation {
        ServiceLocation::new("client-1", "Portland", "OR")
    }

    #[test]
    fn test_parse_valid_block() {
        let block = "How much does windshield repair cost in {location}?\n\nIs mobile service available in {location}?\n";
        let questions = parse_question_block("client-1", block).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].priority, 1);
        assert_eq!(questions[1].priority, 2);
        assert!(questions.iter().all(|q| q.is_active));
    }

    #[test]
    fn test_parse_rejects_missing_location_token() {
        let err = parse_question_block("client-1", "How much does it cost?").unwrap_err();
        match err {
            CadencerError::Validation(errors) => {
                assert_eq!(errors.len(), 1);
                assert!(errors[0].contains("missing {location}"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_missing_question_mark() {
        let err = parse_question_block("client-1", "How much in {location}").unwrap_err();
        match err {
            CadencerError::Validation(errors) => {
                assert_eq!(errors.len(), 1);
                assert!(errors[0].contains("end with '?'"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_accepts_valid_line() {
        let questions = parse_question_block("client-1", "How much in {location}?").unwrap();
        assert_eq!(questions.len(), 1);
    }

    #[test]
    fn test_parse_collects_all_errors() {
        let block = "Bad line one\nGood question in {location}?\nBad line {location} two\n";
        let err = parse_question_block("client-1", block).unwrap_err();
        match err {
            CadencerError::Validation(errors) => {
                // Line 1 has two problems, line 3 one
                assert_eq!(errors.len(), 3);
                assert!(errors[0].contains("line 1"));
                assert!(errors[2].contains("line 3"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_render_basic() {
        let rendered = render_template("Best windshield repair in {location}?", &location());
        assert_eq!(rendered, "Best windshield repair in Portland, OR?");
    }

    #[test]
    fn test_render_case_insensitive() {
        let rendered = render_template("Best repair in {Location}? Near {CITY}, {state}?", &location());
        assert_eq!(rendered, "Best repair in Portland, OR? Near Portland, OR?");
    }

    #[test]
    fn test_render_with_neighborhood() {
        let loc = location().with_neighborhood("Sellwood");
        let rendered = render_template("Repair in {location}?", &loc);
        assert_eq!(rendered, "Repair in Sellwood, Portland?");
    }

    #[test]
    fn test_replace_token_ci_multiple_occurrences() {
        let out = replace_token_ci("{city} and {City} and {CITY}", "{city}", "Salem");
        assert_eq!(out, "Salem and Salem and Salem");
    }
}
