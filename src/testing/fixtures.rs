//! Reusable task data for tests and benchmarks.

use crate::task::RawExternalTask;

/// Markers cycled through by [`generated_tasks`].
const MARKERS: &[&str] = &["TODO", "HACK", "UNDONE", "todo", "NOTE"];

/// Three raw records: two comments and one compiler warning.
///
/// `a.cs` holds a TODO at line 10 and a warning at line 3; `b.cs` holds a
/// HACK at line 1.
#[must_use]
pub fn sample_tasks() -> Vec<RawExternalTask> {
    vec![
        RawExternalTask::new("Comment", "TODO: fix x", "/solution/app/a.cs", 10),
        RawExternalTask::new("Warning", "unused var", "/solution/app/a.cs", 3),
        RawExternalTask::new("Comment", "HACK: y", "/solution/lib/b.cs", 1),
    ]
}

/// `count` comment records spread over `files` files with mixed markers.
#[must_use]
pub fn generated_tasks(count: usize, files: usize) -> Vec<RawExternalTask> {
    let files = files.max(1);
    (0..count)
        .map(|i| {
            let marker = MARKERS[i % MARKERS.len()];
            RawExternalTask::new(
                "Comment",
                format!("{marker}: generated item {i}"),
                format!("/solution/src/file_{}.rs", i % files),
                i64::try_from(i / files + 1).unwrap_or(i64::MAX),
            )
        })
        .collect()
}
