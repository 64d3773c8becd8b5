//! Testing infrastructure for taskscope.
//!
//! - **Mocks**: controllable stand-ins for the host providers
//! - **Fixtures**: raw task data for tests and benchmarks
//! - **Assertions**: checks over filtered views
//!
//! # Example
//!
//! ```rust,ignore
//! use taskscope::testing::{sample_tasks, MockTaskSource, MockActiveFile};
//!
//! let source = Arc::new(MockTaskSource::new().with_tasks(sample_tasks()));
//! let active = Arc::new(MockActiveFile::new("/solution/app/a.cs"));
//! ```

pub mod assertions;
pub mod fixtures;
pub mod mocks;

pub use assertions::*;
pub use fixtures::*;
pub use mocks::*;
