//! Assertion helpers for sync reports.

/// Assert the status of one path in a `SyncReport` or `StatusReport`.
///
/// ```ignore
/// assert_status!(report, "a.copy.txt", FileStatus::Customized);
/// ```
#[macro_export]
macro_rules! assert_status {
    ($report:expr, $path:expr, $status:expr) => {{
        let outcome = $report
            .outcome($path)
            .unwrap_or_else(|| panic!("no outcome for {}", $path));
        assert_eq!(
            outcome.status, $status,
            "unexpected status for {}",
            $path
        );
    }};
}
