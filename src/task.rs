//! Task records built from raw host reports.
//!
//! A [`RawExternalTask`] is whatever the host's task list hands over; a
//! [`TaskRecord`] is the normalized, comment-derived form the rest of the
//! crate works with. Records are never patched: every reload builds new ones.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TaskScopeError};
use crate::tokens::extract_token;

/// Category the host uses for comment-derived tasks.
pub const COMMENT_CATEGORY: &str = "Comment";

/// One task entry as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawExternalTask {
    /// Host task kind, e.g. `Comment` or `Warning`.
    pub category: String,
    /// Full description, e.g. `TODO: fix x`.
    pub description: String,
    /// Path of the file the task was found in.
    pub file: String,
    /// 1-based line number.
    pub line: i64,
}

impl RawExternalTask {
    /// Convenience constructor.
    pub fn new(
        category: impl Into<String>,
        description: impl Into<String>,
        file: impl Into<String>,
        line: i64,
    ) -> Self {
        Self {
            category: category.into(),
            description: description.into(),
            file: file.into(),
            line,
        }
    }

    /// Comment-derived tasks only; compiler warnings and the like are not.
    #[must_use]
    pub fn is_comment(&self) -> bool {
        self.category.eq_ignore_ascii_case(COMMENT_CATEGORY)
    }
}

/// A discovered marker occurrence.
///
/// Equality compares `full_path`, `token`, `description` and `line`;
/// `filename` is derived from `full_path` and so is implied. Records are only
/// ever built through [`TaskRecord::new`], so they serialize but never
/// deserialize.
#[derive(Debug, Clone, Serialize)]
pub struct TaskRecord {
    token: String,
    description: String,
    line: u32,
    filename: String,
    full_path: String,
}

impl PartialEq for TaskRecord {
    fn eq(&self, other: &Self) -> bool {
        self.full_path == other.full_path
            && self.token == other.token
            && self.description == other.description
            && self.line == other.line
    }
}

impl Eq for TaskRecord {}

impl TaskRecord {
    /// Build a record from a description, path and line.
    ///
    /// # Errors
    ///
    /// Returns [`TaskScopeError::MalformedRecord`] if the path is blank or
    /// the line is not a positive number that fits in `u32`.
    pub fn new(description: &str, full_path: &str, line: i64) -> Result<Self> {
        if full_path.trim().is_empty() {
            return Err(TaskScopeError::malformed("task has no file path"));
        }
        let line = u32::try_from(line)
            .ok()
            .filter(|l| *l >= 1)
            .ok_or_else(|| {
                TaskScopeError::malformed(format!("line {line} out of range in {full_path}"))
            })?;

        Ok(Self {
            token: extract_token(description),
            description: description.to_string(),
            line,
            filename: basename(full_path).to_string(),
            full_path: full_path.to_string(),
        })
    }

    /// Build a record from a raw host task.
    ///
    /// The category is not checked here; see [`RawExternalTask::is_comment`].
    ///
    /// # Errors
    ///
    /// Same as [`TaskRecord::new`].
    pub fn from_raw(raw: &RawExternalTask) -> Result<Self> {
        Self::new(&raw.description, &raw.file, raw.line)
    }

    /// Marker token, e.g. `TODO`.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Full description as reported.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// 1-based line number.
    #[must_use]
    pub fn line(&self) -> u32 {
        self.line
    }

    /// File name without directories.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Absolute path as reported by the host.
    #[must_use]
    pub fn full_path(&self) -> &str {
        &self.full_path
    }

    /// Same logical task: same file and line, content aside.
    #[must_use]
    pub fn matches(&self, other: &TaskRecord) -> bool {
        self.full_path == other.full_path && self.line == other.line
    }

    /// `filename:line` for display.
    #[must_use]
    pub fn location(&self) -> String {
        format!("{}:{}", self.filename, self.line)
    }
}

/// Last path segment, splitting on both `\` and `/`.
fn basename(path: &str) -> &str {
    path.rsplit(['\\', '/']).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_from_raw() {
        let raw = RawExternalTask::new("Comment", "TODO: fix x", r"C:\src\app\a.cs", 10);
        let record = TaskRecord::from_raw(&raw).unwrap();
        assert_eq!(record.token(), "TODO");
        assert_eq!(record.description(), "TODO: fix x");
        assert_eq!(record.line(), 10);
        assert_eq!(record.filename(), "a.cs");
        assert_eq!(record.full_path(), r"C:\src\app\a.cs");
        assert_eq!(record.location(), "a.cs:10");
    }

    #[test]
    fn test_basename_unix_and_bare() {
        assert_eq!(basename("/home/dev/lib.rs"), "lib.rs");
        assert_eq!(basename("lib.rs"), "lib.rs");
        assert_eq!(basename(r"C:\mixed/dir\file.txt"), "file.txt");
    }

    #[test]
    fn test_malformed_records_rejected() {
        assert!(TaskRecord::new("TODO: x", "", 1).is_err());
        assert!(TaskRecord::new("TODO: x", "   ", 1).is_err());
        assert!(TaskRecord::new("TODO: x", "/a.rs", 0).is_err());
        assert!(TaskRecord::new("TODO: x", "/a.rs", -4).is_err());
        assert!(TaskRecord::new("TODO: x", "/a.rs", i64::MAX).is_err());
    }

    #[test]
    fn test_description_without_marker_has_empty_token() {
        let record = TaskRecord::new("  spaced out", "/a.rs", 3).unwrap();
        assert_eq!(record.token(), "");
    }

    #[test]
    fn test_is_comment_ignores_case() {
        assert!(RawExternalTask::new("comment", "TODO", "/a", 1).is_comment());
        assert!(RawExternalTask::new("COMMENT", "TODO", "/a", 1).is_comment());
        assert!(!RawExternalTask::new("Warning", "unused var", "/a", 1).is_comment());
    }

    #[test]
    fn test_record_serializes_all_fields() {
        let record = TaskRecord::new("HACK: y", "/src/lib/b.cs", 1).unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["token"], "HACK");
        assert_eq!(json["description"], "HACK: y");
        assert_eq!(json["line"], 1);
        assert_eq!(json["filename"], "b.cs");
        assert_eq!(json["full_path"], "/src/lib/b.cs");
    }

    #[test]
    fn test_matches_vs_equality() {
        let a = TaskRecord::new("TODO: first", "/src/a.rs", 5).unwrap();
        let b = TaskRecord::new("HACK: edited", "/src/a.rs", 5).unwrap();
        let c = TaskRecord::new("TODO: first", "/src/a.rs", 5).unwrap();
        assert!(a.matches(&b));
        assert_ne!(a, b);
        assert_eq!(a, c);
        assert!(!a.matches(&TaskRecord::new("TODO: first", "/src/a.rs", 6).unwrap()));
    }
}
