//! Configuration management for taskscope.
//!
//! Settings are looked up in layers, first hit wins:
//!
//! 1. `<project>/.taskscope/settings.json`
//! 2. `<project>/taskscope.toml`
//! 3. `<user config dir>/taskscope/settings.json`
//! 4. built-in defaults
//!
//! # Example settings.json
//!
//! ```json
//! {
//!   "editDebounceMs": 1500,
//!   "customTokens": ["REVIEW", "PERF"],
//!   "defaultScope": "project"
//! }
//! ```

pub mod validation;

pub use validation::ValidationReport;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::error::{Result, TaskScopeError};
use crate::scheduler::{
    SchedulerConfig, DEFAULT_EDIT_DEBOUNCE_MS, DEFAULT_MAX_OPEN_RETRIES,
    DEFAULT_SOLUTION_OPEN_DELAY_MS,
};
use crate::scope::Scope;
use crate::tokens::ALL_TOKEN;

/// Session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    /// Quiet period after the last edit before reloading (default: 2000).
    #[serde(default = "default_edit_debounce_ms")]
    pub edit_debounce_ms: u64,

    /// Delay between polls after a solution opens (default: 3000).
    #[serde(default = "default_solution_open_delay_ms")]
    pub solution_open_delay_ms: u64,

    /// Re-polls after a solution opens before giving up (default: 20).
    #[serde(default = "default_max_open_retries")]
    pub max_open_retries: u32,

    /// Extra marker tokens registered at startup.
    #[serde(default)]
    pub custom_tokens: Vec<String>,

    /// Token selected at startup (default: "ALL").
    #[serde(default = "default_token")]
    pub default_token: String,

    /// Scope selected at startup (default: solution).
    #[serde(default)]
    pub default_scope: Scope,
}

fn default_edit_debounce_ms() -> u64 {
    DEFAULT_EDIT_DEBOUNCE_MS
}

fn default_solution_open_delay_ms() -> u64 {
    DEFAULT_SOLUTION_OPEN_DELAY_MS
}

fn default_max_open_retries() -> u32 {
    DEFAULT_MAX_OPEN_RETRIES
}

fn default_token() -> String {
    ALL_TOKEN.to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            edit_debounce_ms: default_edit_debounce_ms(),
            solution_open_delay_ms: default_solution_open_delay_ms(),
            max_open_retries: default_max_open_retries(),
            custom_tokens: Vec::new(),
            default_token: default_token(),
            default_scope: Scope::default(),
        }
    }
}

impl SessionConfig {
    /// Load configuration for a project directory, falling back to the user
    /// config directory and then to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a settings file exists but cannot be read or parsed.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let candidates = Self::candidate_paths(project_dir);
        for path in &candidates {
            if path.exists() {
                debug!("Loading configuration from {}", path.display());
                return Self::load_from(path);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from an explicit file. `.toml` is parsed as TOML,
    /// anything else as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TaskScopeError::config_with_path(format!("cannot read settings: {e}"), path.to_path_buf())
        })?;
        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        let config = if is_toml {
            toml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };
        Ok(config)
    }

    /// Settings locations in lookup order.
    #[must_use]
    pub fn candidate_paths(project_dir: &Path) -> Vec<PathBuf> {
        let mut paths = vec![
            Self::settings_path(project_dir),
            project_dir.join("taskscope.toml"),
        ];
        if let Some(user) = Self::user_settings_path() {
            paths.push(user);
        }
        paths
    }

    /// Project-level settings.json path.
    #[must_use]
    pub fn settings_path(project_dir: &Path) -> PathBuf {
        project_dir.join(".taskscope").join("settings.json")
    }

    /// User-level settings.json path, if the platform has a config dir.
    #[must_use]
    pub fn user_settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("taskscope").join("settings.json"))
    }

    /// Validate, turning the first error into [`TaskScopeError::InvalidConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        let report = ValidationReport::check(self);
        match report.errors.first() {
            Some(issue) => Err(TaskScopeError::invalid_config(&issue.field, &issue.reason)),
            None => Ok(()),
        }
    }

    /// Scheduler timing derived from this configuration.
    #[must_use]
    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            edit_debounce: Duration::from_millis(self.edit_debounce_ms),
            solution_open_delay: Duration::from_millis(self.solution_open_delay_ms),
            max_open_retries: self.max_open_retries,
        }
    }
}
