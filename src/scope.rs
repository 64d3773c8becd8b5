//! Scope selection and resolution.
//!
//! A [`Scope`] names how wide the view is. Resolving it against the host
//! providers yields a [`ScopeContext`] the filter engine can test paths
//! against. Resolution never fails: an unavailable project or active file
//! degrades to a context that admits nothing.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::TaskScopeError;
use crate::host::{ActiveFileProvider, ProjectFileProvider};

/// Structural breadth of the task view.
///
/// # Example
///
/// ```
/// use taskscope::scope::Scope;
///
/// let scope: Scope = "Project".parse().unwrap();
/// assert_eq!(scope, Scope::Project);
/// assert_eq!(scope.to_string(), "project");
/// ```
#[derive(
    Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Every task in the solution
    #[default]
    Solution,
    /// Tasks in files of the active project
    Project,
    /// Tasks in the active file only
    Class,
}

impl Scope {
    /// All scopes in display order.
    pub const ALL: [Scope; 3] = [Scope::Solution, Scope::Project, Scope::Class];
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Solution => write!(f, "solution"),
            Scope::Project => write!(f, "project"),
            Scope::Class => write!(f, "class"),
        }
    }
}

impl FromStr for Scope {
    type Err = TaskScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scope::ALL
            .into_iter()
            .find(|scope| scope.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TaskScopeError::UnknownScope {
                value: s.to_string(),
            })
    }
}

/// Case-folded form used for every path comparison.
fn fold_path(path: &str) -> String {
    path.to_lowercase()
}

/// A resolved scope, ready for membership tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeContext {
    /// No restriction.
    Unfiltered,
    /// Files of the active project, case-folded.
    ProjectFiles(HashSet<String>),
    /// The active file, case-folded. Empty admits nothing.
    ActiveFile(String),
}

impl ScopeContext {
    /// Build a project context from raw paths.
    pub fn project<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::ProjectFiles(paths.into_iter().map(|p| fold_path(p.as_ref())).collect())
    }

    /// Build an active-file context from a raw path.
    pub fn active_file(path: &str) -> Self {
        Self::ActiveFile(fold_path(path))
    }

    /// Whether a task in `full_path` is in scope.
    #[must_use]
    pub fn admits(&self, full_path: &str) -> bool {
        match self {
            Self::Unfiltered => true,
            Self::ProjectFiles(files) => files.contains(&fold_path(full_path)),
            Self::ActiveFile(active) => !active.is_empty() && *active == fold_path(full_path),
        }
    }
}

/// Resolves a [`Scope`] against the host's project and active-file providers.
pub struct ScopeResolver<'a> {
    project: &'a dyn ProjectFileProvider,
    active: &'a dyn ActiveFileProvider,
}

impl<'a> ScopeResolver<'a> {
    /// Create a resolver over the given providers.
    pub fn new(project: &'a dyn ProjectFileProvider, active: &'a dyn ActiveFileProvider) -> Self {
        Self { project, active }
    }

    /// Resolve `scope` into a context. Provider failures degrade to empty.
    #[must_use]
    pub fn resolve(&self, scope: Scope) -> ScopeContext {
        match scope {
            Scope::Solution => ScopeContext::Unfiltered,
            Scope::Project => ScopeContext::project(self.project_files()),
            Scope::Class => ScopeContext::active_file(&self.current_file()),
        }
    }

    /// Active file path, or empty if the provider fails.
    #[must_use]
    pub fn current_file(&self) -> String {
        self.active.current_file().unwrap_or_else(|e| {
            warn!("Active file unavailable, treating as none: {e:#}");
            String::new()
        })
    }

    /// Files of the active project with directory entries expanded.
    #[must_use]
    pub fn project_files(&self) -> Vec<String> {
        let entries = match self.project.list_active_project_files() {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Active project unavailable, scope is empty: {e:#}");
                return Vec::new();
            }
        };

        let mut files = Vec::with_capacity(entries.len());
        for entry in entries {
            if is_directory_entry(&entry) {
                expand_directory(&entry, &mut files);
            } else {
                files.push(entry);
            }
        }
        debug!("Resolved {} project files", files.len());
        files
    }
}

/// Directory entries are reported with a trailing separator.
fn is_directory_entry(entry: &str) -> bool {
    entry.ends_with('/') || entry.ends_with('\\')
}

/// Push every file below `dir`, at any depth. Unreadable entries are skipped.
fn expand_directory(dir: &str, files: &mut Vec<String>) {
    for entry in WalkDir::new(Path::new(dir)) {
        match entry {
            Ok(entry) if entry.file_type().is_file() => {
                files.push(entry.path().to_string_lossy().into_owned());
            }
            Ok(_) => {}
            Err(e) => debug!("Skipping unreadable entry under {dir}: {e}"),
        }
    }
}
