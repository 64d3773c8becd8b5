//! Configuration validation for taskscope.
//!
//! # Example
//!
//! ```
//! use taskscope::config::{SessionConfig, ValidationReport};
//!
//! let report = ValidationReport::check(&SessionConfig::default());
//! assert!(report.is_valid());
//! assert_eq!(report.exit_code(), 0);
//! ```

use super::SessionConfig;
use crate::tokens::{is_builtin, is_token_shaped};

/// Retry budgets above this are allowed but flagged.
const RETRY_WARNING_THRESHOLD: u32 = 100;

/// A single problem with a named field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub field: String,
    pub reason: String,
}

impl ValidationIssue {
    fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Result of configuration validation.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Errors that prevent the configuration from being used.
    pub errors: Vec<ValidationIssue>,
    /// Warnings that don't prevent validity but indicate potential issues.
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Create a new empty validation report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a configuration.
    #[must_use]
    pub fn check(config: &SessionConfig) -> Self {
        let mut report = Self::new();

        if config.edit_debounce_ms == 0 {
            report.error("editDebounceMs", "must be greater than zero");
        }
        if config.solution_open_delay_ms == 0 {
            report.error("solutionOpenDelayMs", "must be greater than zero");
        }
        if config.max_open_retries > RETRY_WARNING_THRESHOLD {
            report.warning(
                "maxOpenRetries",
                format!(
                    "{} retries may poll for a very long time",
                    config.max_open_retries
                ),
            );
        }

        let mut seen: Vec<String> = Vec::new();
        for token in &config.custom_tokens {
            if !is_token_shaped(token) {
                report.error("customTokens", format!("'{token}' is not a valid token"));
            } else if is_builtin(token) {
                report.error("customTokens", format!("'{token}' is a built-in token"));
            } else if seen.iter().any(|s| s.eq_ignore_ascii_case(token)) {
                report.warning("customTokens", format!("'{token}' is listed more than once"));
            } else {
                seen.push(token.clone());
            }
        }

        let default_known = is_builtin(&config.default_token)
            || seen.iter().any(|s| s.eq_ignore_ascii_case(&config.default_token));
        if !default_known {
            report.error(
                "defaultToken",
                format!("'{}' is not a registered token", config.default_token),
            );
        }

        report
    }

    fn error(&mut self, field: &str, reason: impl Into<String>) {
        self.errors.push(ValidationIssue::new(field, reason));
    }

    fn warning(&mut self, field: &str, reason: impl Into<String>) {
        self.warnings.push(ValidationIssue::new(field, reason));
    }

    /// Returns true if the configuration is valid (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns 0 if valid, 1 if invalid.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        if self.is_valid() {
            0
        } else {
            1
        }
    }

    /// Generate a human-readable summary of the validation result.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.is_valid() {
            if self.warnings.is_empty() {
                "Configuration is valid.".to_string()
            } else {
                format!(
                    "Configuration is valid with {} warning(s).",
                    self.warnings.len()
                )
            }
        } else {
            format!(
                "Configuration is invalid with {} error(s).",
                self.errors.len()
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let report = ValidationReport::check(&SessionConfig::default());
        assert!(report.is_valid());
        assert!(report.warnings.is_empty());
        assert_eq!(report.summary(), "Configuration is valid.");
    }

    #[test]
    fn test_bad_custom_tokens() {
        let config = SessionConfig {
            custom_tokens: vec!["TWO WORDS".into(), "todo".into(), "PERF".into(), "perf".into()],
            ..SessionConfig::default()
        };
        let report = ValidationReport::check(&config);
        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.exit_code(), 1);
        assert!(report.summary().contains("2 error(s)"));
    }

    #[test]
    fn test_default_token_must_be_registered() {
        let config = SessionConfig {
            default_token: "REVIEW".into(),
            ..SessionConfig::default()
        };
        let report = ValidationReport::check(&config);
        assert_eq!(report.errors[0].field, "defaultToken");

        let config = SessionConfig {
            custom_tokens: vec!["Review".into()],
            default_token: "REVIEW".into(),
            ..SessionConfig::default()
        };
        assert!(ValidationReport::check(&config).is_valid());
    }

    #[test]
    fn test_large_retry_budget_warns() {
        let config = SessionConfig {
            max_open_retries: 500,
            ..SessionConfig::default()
        };
        let report = ValidationReport::check(&config);
        assert!(report.is_valid());
        assert_eq!(report.warnings[0].field, "maxOpenRetries");
    }

    #[test]
    fn test_issue_display() {
        let issue = ValidationIssue::new("editDebounceMs", "must be greater than zero");
        assert_eq!(issue.to_string(), "editDebounceMs: must be greater than zero");
    }
}
