//! Mock implementations of the host provider traits.
//!
//! All mocks use interior mutability so a test can keep an `Arc` to the same
//! mock it handed to a session and change its behaviour mid-test.

use anyhow::{bail, Result};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::host::{ActiveFileProvider, ProjectFileProvider, RawTaskSource};
use crate::task::RawExternalTask;

#[derive(Debug, Clone)]
enum SourceMode {
    Fixed(Vec<RawExternalTask>),
    /// Call N returns N comment tasks, so the count never settles.
    Growing,
    Failing(String),
}

/// Mock task source with a call counter.
///
/// # Example
///
/// ```rust,ignore
/// let source = MockTaskSource::new().with_tasks(vec![
///     RawExternalTask::new("Comment", "TODO: a", "/a.rs", 1),
/// ]);
/// assert_eq!(source.list_tasks().unwrap().len(), 1);
/// assert_eq!(source.call_count(), 1);
/// ```
#[derive(Debug)]
pub struct MockTaskSource {
    mode: Mutex<SourceMode>,
    call_count: AtomicU32,
}

impl Default for MockTaskSource {
    fn default() -> Self {
        Self {
            mode: Mutex::new(SourceMode::Fixed(Vec::new())),
            call_count: AtomicU32::new(0),
        }
    }
}

impl MockTaskSource {
    /// Create a source that reports no tasks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report a fixed set of tasks.
    #[must_use]
    pub fn with_tasks(self, tasks: Vec<RawExternalTask>) -> Self {
        self.set_tasks(tasks);
        self
    }

    /// Report one more comment task on every call.
    #[must_use]
    pub fn growing(self) -> Self {
        *self.mode() = SourceMode::Growing;
        self
    }

    /// Replace the reported tasks.
    pub fn set_tasks(&self, tasks: Vec<RawExternalTask>) {
        *self.mode() = SourceMode::Fixed(tasks);
    }

    /// Fail every subsequent call.
    pub fn fail_with(&self, error: &str) {
        *self.mode() = SourceMode::Failing(error.to_string());
    }

    /// Number of times `list_tasks` was called.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }

    fn mode(&self) -> std::sync::MutexGuard<'_, SourceMode> {
        self.mode.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RawTaskSource for MockTaskSource {
    fn list_tasks(&self) -> Result<Vec<RawExternalTask>> {
        let call = self.call_count.fetch_add(1, Ordering::SeqCst) + 1;
        match &*self.mode() {
            SourceMode::Fixed(tasks) => Ok(tasks.clone()),
            SourceMode::Growing => Ok((1..=call)
                .map(|n| {
                    RawExternalTask::new("Comment", format!("TODO: item {n}"), "/grow.rs", n.into())
                })
                .collect()),
            SourceMode::Failing(error) => bail!("{error}"),
        }
    }
}

/// Mock project file provider.
#[derive(Debug, Default)]
pub struct MockProjectFiles {
    files: Vec<String>,
    error: Option<String>,
    call_count: AtomicU32,
}

impl MockProjectFiles {
    /// Create a provider for an empty project.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the entries to return.
    #[must_use]
    pub fn with_files(mut self, files: Vec<String>) -> Self {
        self.files = files;
        self
    }

    /// Configure the provider to fail.
    #[must_use]
    pub fn with_error(mut self, error: &str) -> Self {
        self.error = Some(error.to_string());
        self
    }

    /// Number of times the project was enumerated.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }
}

impl ProjectFileProvider for MockProjectFiles {
    fn list_active_project_files(&self) -> Result<Vec<String>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        match &self.error {
            Some(error) => bail!("{error}"),
            None => Ok(self.files.clone()),
        }
    }
}

/// Mock active file provider whose path can change mid-test.
#[derive(Debug, Default)]
pub struct MockActiveFile {
    current: Mutex<String>,
    error: Option<String>,
}

impl MockActiveFile {
    /// Create a provider reporting `path`.
    #[must_use]
    pub fn new(path: &str) -> Self {
        Self {
            current: Mutex::new(path.to_string()),
            error: None,
        }
    }

    /// Configure the provider to fail.
    #[must_use]
    pub fn with_error(mut self, error: &str) -> Self {
        self.error = Some(error.to_string());
        self
    }

    /// Change the reported active file.
    pub fn set(&self, path: &str) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = path.to_string();
    }
}

impl ActiveFileProvider for MockActiveFile {
    fn current_file(&self) -> Result<String> {
        if let Some(error) = &self.error {
            bail!("{error}");
        }
        Ok(self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}
