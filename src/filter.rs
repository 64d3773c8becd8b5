//! Filter engine: derives the visible task list from the master list.
//!
//! [`apply`] is pure. Given the same tasks, criteria and resolved scope it
//! returns the same ordered subsequence, so it can be re-run at any time.

use serde::{Deserialize, Serialize};

use crate::scope::{Scope, ScopeContext};
use crate::task::TaskRecord;
use crate::tokens::ALL_TOKEN;

/// What the view is currently filtered by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Token to show, or `ALL`.
    pub selected_token: String,
    /// Breadth of the view.
    pub selected_scope: Scope,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            selected_token: ALL_TOKEN.to_string(),
            selected_scope: Scope::Solution,
        }
    }
}

impl FilterCriteria {
    /// Criteria for a token and scope.
    pub fn new(token: impl Into<String>, scope: Scope) -> Self {
        Self {
            selected_token: token.into(),
            selected_scope: scope,
        }
    }

    /// Token gate. The `ALL` sentinel is matched case-sensitively; any other
    /// selection compares against the record token ignoring case.
    #[must_use]
    pub fn token_passes(&self, record: &TaskRecord) -> bool {
        self.selected_token == ALL_TOKEN
            || record.token().eq_ignore_ascii_case(&self.selected_token)
    }
}

/// Filter `tasks` by token, then by scope, preserving input order.
///
/// `scope` must be the context resolved for `criteria.selected_scope`.
///
/// # Example
///
/// ```
/// use taskscope::filter::{apply, FilterCriteria};
/// use taskscope::scope::{Scope, ScopeContext};
/// use taskscope::task::TaskRecord;
///
/// let tasks = vec![
///     TaskRecord::new("TODO: fix x", "/a.cs", 10).unwrap(),
///     TaskRecord::new("HACK: y", "/b.cs", 1).unwrap(),
/// ];
/// let hacks = apply(&tasks, &FilterCriteria::new("hack", Scope::Solution), &ScopeContext::Unfiltered);
/// assert_eq!(hacks.len(), 1);
/// assert_eq!(hacks[0].filename(), "b.cs");
/// ```
#[must_use]
pub fn apply(tasks: &[TaskRecord], criteria: &FilterCriteria, scope: &ScopeContext) -> Vec<TaskRecord> {
    tasks
        .iter()
        .filter(|record| criteria.token_passes(record) && scope.admits(record.full_path()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> Vec<TaskRecord> {
        vec![
            TaskRecord::new("TODO: fix x", "/src/a.cs", 10).unwrap(),
            TaskRecord::new("HACK: y", "/src/b.cs", 1).unwrap(),
            TaskRecord::new("todo: lower", "/src/b.cs", 7).unwrap(),
            TaskRecord::new("UNDONE: z", "/other/c.cs", 3).unwrap(),
            TaskRecord::new("no marker here", "/src/a.cs", 12).unwrap(),
        ]
    }

    #[test]
    fn test_all_includes_every_record_in_order() {
        let tasks = fixture();
        let out = apply(&tasks, &FilterCriteria::default(), &ScopeContext::Unfiltered);
        assert_eq!(out, tasks);
    }

    #[test]
    fn test_token_gate_ignores_case() {
        let tasks = fixture();
        let out = apply(
            &tasks,
            &FilterCriteria::new("Todo", Scope::Solution),
            &ScopeContext::Unfiltered,
        );
        let lines: Vec<u32> = out.iter().map(TaskRecord::line).collect();
        assert_eq!(lines, vec![10, 7]);
    }

    #[test]
    fn test_all_sentinel_is_case_sensitive() {
        let tasks = fixture();
        let out = apply(
            &tasks,
            &FilterCriteria::new("all", Scope::Solution),
            &ScopeContext::Unfiltered,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_project_scope_restricts_to_project_files() {
        let tasks = fixture();
        let ctx = ScopeContext::project(["/SRC/B.CS"]);
        let out = apply(&tasks, &FilterCriteria::new(ALL_TOKEN, Scope::Project), &ctx);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|t| t.full_path() == "/src/b.cs"));
    }

    #[test]
    fn test_class_scope_restricts_to_active_file() {
        let tasks = fixture();
        let ctx = ScopeContext::active_file("/src/a.cs");
        let out = apply(&tasks, &FilterCriteria::new("TODO", Scope::Class), &ctx);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].line(), 10);
    }

    #[test]
    fn test_empty_active_file_matches_nothing() {
        let tasks = fixture();
        let ctx = ScopeContext::active_file("");
        assert!(apply(&tasks, &FilterCriteria::default(), &ctx).is_empty());
    }

    #[test]
    fn test_apply_is_idempotent() {
        let tasks = fixture();
        let criteria = FilterCriteria::new("HACK", Scope::Project);
        let ctx = ScopeContext::project(["/src/a.cs", "/src/b.cs"]);
        let first = apply(&tasks, &criteria, &ctx);
        let second = apply(&tasks, &criteria, &ctx);
        assert_eq!(first, second);
        assert_eq!(apply(&first, &criteria, &ctx), first);
    }
}
