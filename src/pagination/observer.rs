//! Pagination event reporting
//!
//! The controller never writes to stdout or stderr itself. Anomalies and
//! merges are reported through an injected observer.

use super::types::ConsistencyViolation;
use tracing::{debug, warn};

/// Receives pagination events from the merge controller
///
/// Every method has a no-op default so observers only implement the
/// events they care about.
pub trait PaginationObserver: Send + Sync {
    /// A fetch was issued
    fn fetch_started(&self, _cursor: Option<&str>, _limit: u32) {}

    /// A page was appended
    fn page_merged(&self, _appended: usize, _total: usize, _has_next_page: bool) {}

    /// The server answered with no records
    fn empty_page(&self, _cursor: Option<&str>) {}

    /// A response was discarded
    fn merge_rejected(&self, _violation: &ConsistencyViolation) {}

    /// The fetch failed
    fn fetch_failed(&self, _message: &str) {}
}

/// Observer that logs through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl PaginationObserver for TracingObserver {
    fn fetch_started(&self, cursor: Option<&str>, limit: u32) {
        debug!(cursor = ?cursor, limit, "Fetching next page");
    }

    fn page_merged(&self, appended: usize, total: usize, has_next_page: bool) {
        debug!(appended, total, has_next_page, "Merged page");
    }

    fn empty_page(&self, cursor: Option<&str>) {
        warn!(
            cursor = ?cursor,
            "Server returned an empty page while more pages were expected"
        );
    }

    fn merge_rejected(&self, violation: &ConsistencyViolation) {
        warn!(%violation, "Bad pagination query, discarding page");
    }

    fn fetch_failed(&self, message: &str) {
        warn!(error = %message, "Failed to load more records");
    }
}

/// Observer that drops every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PaginationObserver for NoopObserver {}
