//! Custom assertions for filtered task views.

use crate::task::TaskRecord;

/// Assert the view holds exactly these `(token, line)` pairs, in order.
///
/// # Panics
///
/// Panics with both sequences if they differ.
///
/// # Example
///
/// ```rust,ignore
/// assert_view(&session.filtered_tasks(), &[("TODO", 10), ("HACK", 1)]);
/// ```
pub fn assert_view(view: &[TaskRecord], expected: &[(&str, u32)]) {
    let actual: Vec<(&str, u32)> = view.iter().map(|t| (t.token(), t.line())).collect();
    assert_eq!(
        actual, expected,
        "Filtered view mismatch.\nActual:   {actual:?}\nExpected: {expected:?}"
    );
}

/// Assert every task in the view lives in `path` (case-insensitive).
///
/// # Panics
///
/// Panics naming the first task found elsewhere.
pub fn assert_all_in_file(view: &[TaskRecord], path: &str) {
    let folded = path.to_lowercase();
    if let Some(stray) = view.iter().find(|t| t.full_path().to_lowercase() != folded) {
        panic!(
            "Expected every task in {path}, found {} at {}",
            stray.description(),
            stray.full_path()
        );
    }
}
