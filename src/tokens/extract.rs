//! Marker token extraction.
//!
//! A host reports a comment task as a single description string, for example
//! `"TODO: handle the empty case"`. The marker token is the leading run of an
//! ASCII letter followed by at least one word character, returned verbatim.

use regex::Regex;
use std::sync::OnceLock;

/// Leading marker pattern: one ASCII letter, then one or more letters,
/// digits or `_`. A lone letter is not a marker.
const TOKEN_PATTERN: &str = r"^[A-Za-z][A-Za-z0-9_]+";

fn token_regex() -> Option<&'static Regex> {
    static TOKEN_RE: OnceLock<Option<Regex>> = OnceLock::new();
    TOKEN_RE.get_or_init(|| Regex::new(TOKEN_PATTERN).ok()).as_ref()
}

/// Extract the marker token from a task description.
///
/// Case is preserved. Returns an empty string when the description does not
/// start with a marker, including for empty input.
///
/// # Example
///
/// ```
/// use taskscope::tokens::extract_token;
///
/// assert_eq!(extract_token("TODO: fix x"), "TODO");
/// assert_eq!(extract_token("hack_2 later"), "hack_2");
/// assert_eq!(extract_token(": nothing"), "");
/// ```
#[must_use]
pub fn extract_token(description: &str) -> String {
    token_regex()
        .and_then(|re| re.find(description))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Check whether `candidate` has exactly the shape the extractor produces.
///
/// Tokens of any other shape could never match a discovered task.
#[must_use]
pub fn is_token_shaped(candidate: &str) -> bool {
    !candidate.is_empty() && extract_token(candidate) == candidate
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_leading_marker() {
        assert_eq!(extract_token("TODO: fix x"), "TODO");
        assert_eq!(extract_token("HACK: y"), "HACK");
        assert_eq!(extract_token("UNRESOLVEDMERGECONFLICT"), "UNRESOLVEDMERGECONFLICT");
    }

    #[test]
    fn test_preserves_case() {
        assert_eq!(extract_token("todo remember this"), "todo");
        assert_eq!(extract_token("Review_2(later)"), "Review_2");
    }

    #[test]
    fn test_single_letter_is_not_a_marker() {
        assert_eq!(extract_token("X marks the spot"), "");
        assert_eq!(extract_token("a"), "");
        assert_eq!(extract_token("XY marks"), "XY");
    }

    #[test]
    fn test_empty_and_malformed_input() {
        assert_eq!(extract_token(""), "");
        assert_eq!(extract_token("   TODO indented"), "");
        assert_eq!(extract_token("42 TODO"), "");
        assert_eq!(extract_token("_private"), "");
        assert_eq!(extract_token("ÄNDERN bitte"), "");
    }

    #[test]
    fn test_stops_at_non_word_character() {
        assert_eq!(extract_token("FIXME-123 broken"), "FIXME");
        assert_eq!(extract_token("ab$c"), "ab");
        assert_eq!(extract_token("a$b"), "");
    }

    #[test]
    fn test_is_token_shaped() {
        assert!(is_token_shaped("MYCUSTOM"));
        assert!(is_token_shaped("Note_1"));
        assert!(!is_token_shaped(""));
        assert!(!is_token_shaped("BAD TOKEN"));
        assert!(!is_token_shaped("$money"));
        assert!(!is_token_shaped("1st"));
        assert!(!is_token_shaped("T"));
    }
}
