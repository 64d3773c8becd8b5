//! Host collaborator interfaces.
//!
//! The session never talks to an editor directly. A host supplies these
//! three synchronous providers and forwards its editor signals as
//! [`EditorEvent`]s. Providers are expected to be fast and to apply their own
//! timeouts; any error they return is absorbed by the session.
//!
//! The file-backed adapters at the bottom let the CLI stand in for a host by
//! reading JSON snapshots from disk.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use crate::task::RawExternalTask;

/// Source of raw task records (the host's own task list).
pub trait RawTaskSource: Send + Sync {
    /// Current snapshot of every task the host knows about.
    ///
    /// # Errors
    ///
    /// Returns an error if the host task list is unavailable.
    fn list_tasks(&self) -> Result<Vec<RawExternalTask>>;
}

/// Enumerates the files of the active project.
pub trait ProjectFileProvider: Send + Sync {
    /// Paths in the active project. Directory entries end with a path
    /// separator and are expanded recursively by the scope resolver.
    ///
    /// # Errors
    ///
    /// Returns an error if no project is active or the host fails.
    fn list_active_project_files(&self) -> Result<Vec<String>>;
}

/// Reports the file open in the active editor window.
pub trait ActiveFileProvider: Send + Sync {
    /// Absolute path of the active file, or an empty string if none.
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot report an active document.
    fn current_file(&self) -> Result<String>;
}

/// Editor signals the session reacts to. None carries a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorEvent {
    /// A line changed in the active text buffer.
    LineChanged,
    /// A different window gained focus.
    WindowActivated,
    /// A solution finished opening.
    SolutionOpened,
    /// The current solution is about to close.
    SolutionBeforeClosing,
}

impl std::fmt::Display for EditorEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LineChanged => write!(f, "line-changed"),
            Self::WindowActivated => write!(f, "window-activated"),
            Self::SolutionOpened => write!(f, "solution-opened"),
            Self::SolutionBeforeClosing => write!(f, "solution-before-closing"),
        }
    }
}

// ============================================================================
// File-backed adapters
// ============================================================================

/// Reads raw tasks from a JSON array file on every call.
#[derive(Debug, Clone)]
pub struct JsonTaskSource {
    path: PathBuf,
}

impl JsonTaskSource {
    /// Create a source backed by the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RawTaskSource for JsonTaskSource {
    fn list_tasks(&self) -> Result<Vec<RawExternalTask>> {
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read task file: {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse task file: {}", self.path.display()))
    }
}

/// Reads project entries from a JSON array of path strings.
///
/// With no file configured there is no active project.
#[derive(Debug, Clone, Default)]
pub struct JsonProjectFiles {
    path: Option<PathBuf>,
}

impl JsonProjectFiles {
    /// Create a provider backed by an optional file.
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

impl ProjectFileProvider for JsonProjectFiles {
    fn list_active_project_files(&self) -> Result<Vec<String>> {
        let Some(path) = &self.path else {
            anyhow::bail!("no active project");
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read project file list: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse project file list: {}", path.display()))
    }
}

/// Active file that only changes when told to.
#[derive(Debug, Clone, Default)]
pub struct StaticActiveFile {
    current: Arc<Mutex<String>>,
}

impl StaticActiveFile {
    /// Create a provider reporting `path` (may be empty).
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            current: Arc::new(Mutex::new(path.into())),
        }
    }

    /// Replace the reported path. Clones share the same value.
    pub fn set(&self, path: impl Into<String>) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = path.into();
    }
}

impl ActiveFileProvider for StaticActiveFile {
    fn current_file(&self) -> Result<String> {
        Ok(self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_json_task_source_reads_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tasks.json");
        std::fs::write(
            &path,
            r#"[{"category":"Comment","description":"TODO: a","file":"/a.rs","line":2}]"#,
        )
        .unwrap();

        let tasks = JsonTaskSource::new(&path).list_tasks().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].description, "TODO: a");
    }

    #[test]
    fn test_json_task_source_missing_file_errors() {
        let temp = TempDir::new().unwrap();
        let source = JsonTaskSource::new(temp.path().join("absent.json"));
        let err = source.list_tasks().unwrap_err();
        assert!(err.to_string().contains("Failed to read task file"));
    }

    #[test]
    fn test_project_files_without_project() {
        assert!(JsonProjectFiles::default()
            .list_active_project_files()
            .is_err());
    }

    #[test]
    fn test_static_active_file_shared_between_clones() {
        let provider = StaticActiveFile::new("/a.rs");
        let handle = provider.clone();
        handle.set("/b.rs");
        assert_eq!(provider.current_file().unwrap(), "/b.rs");
    }

    #[test]
    fn test_event_display() {
        assert_eq!(EditorEvent::SolutionBeforeClosing.to_string(), "solution-before-closing");
    }
}
