//! taskscope - comment task aggregation for editor sessions
//!
//! Collects comment markers (`TODO`, `HACK`, ...) reported by a host editor,
//! classifies each by its leading token, and keeps a filtered view current
//! as the user edits, switches windows and opens or closes solutions.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`tokens`] - Token registry and the leading-token extractor
//! - [`task`] - Raw host records and normalized [`TaskRecord`]s
//! - [`scope`] - Solution / project / class scope resolution
//! - [`filter`] - Criteria and the pure filter function
//! - [`store`] - Master list and the observable filtered view
//! - [`scheduler`] - Debounce and stabilization state machine
//! - [`session`] - The controlling session wiring it all together
//! - [`host`] - Provider traits and file-backed adapters
//! - [`config`] - Configuration loading and validation
//! - [`error`] - Custom error types and handling
//! - [`testing`] - Testing infrastructure (mocks, fixtures, assertions)
//!
//! # Example
//!
//! ```rust,ignore
//! use taskscope::{Providers, Scope, SessionConfig, TaskSession};
//!
//! let session = TaskSession::new(&SessionConfig::default(), providers)?;
//! session.select_token("HACK")?;
//! session.select_scope(Scope::Project);
//! for task in session.filtered_tasks().iter() {
//!     println!("{} {}", task.location(), task.description());
//! }
//! ```

pub mod config;
pub mod error;
pub mod filter;
pub mod host;
pub mod scheduler;
pub mod scope;
pub mod session;
pub mod store;
pub mod task;
pub mod testing;
pub mod tokens;

// Re-export commonly used types
pub use error::{Result, TaskScopeError};

pub use config::{SessionConfig, ValidationReport};
pub use filter::FilterCriteria;
pub use host::{
    ActiveFileProvider, EditorEvent, JsonProjectFiles, JsonTaskSource, ProjectFileProvider,
    RawTaskSource, StaticActiveFile,
};
pub use scheduler::{RefreshScheduler, SchedulerConfig, SchedulerPhase};
pub use scope::{Scope, ScopeContext, ScopeResolver};
pub use session::{Providers, SessionSnapshot, TaskSession};
pub use store::{TaskStore, TaskView};
pub use task::{RawExternalTask, TaskRecord};
pub use tokens::{extract_token, TokenRegistry, ALL_TOKEN, BUILTIN_TOKENS};
