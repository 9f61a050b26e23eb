//! Pagination types and traits
//!
//! Defines the record/page abstractions, the fetch contract consumed from
//! the query client, and the state the merge controller owns.

use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// An item with a stable unique identifier.
///
/// Identity is by `id`; the merge controller refuses any merge that would
/// put the same id into the accumulated sequence twice.
pub trait Record: Clone + Send + Sync + 'static {
    /// Stable unique identifier, also used as the pagination cursor
    fn id(&self) -> &str;
}

/// One fetch's worth of records plus pagination metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<R> {
    /// Records in server order
    pub records: Vec<R>,
    /// Opaque token marking the last record
    pub end_cursor: Option<String>,
    /// Whether the server has more records after this page
    pub has_next_page: bool,
}

impl<R> Page<R> {
    /// Create a page
    pub fn new(records: Vec<R>, end_cursor: Option<String>, has_next_page: bool) -> Self {
        Self {
            records,
            end_cursor,
            has_next_page,
        }
    }

    /// Create an empty final page
    pub fn empty() -> Self {
        Self::new(Vec::new(), None, false)
    }

    /// Check if the page has no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Fetch contract consumed from the query client
#[async_trait]
pub trait PageFetcher<R>: Send + Sync {
    /// Fetch up to `limit` records after `cursor` (from the start if absent)
    async fn fetch_page(&self, cursor: Option<&str>, limit: u32) -> Result<Page<R>>;
}

/// State owned by the merge controller
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationState<R> {
    /// Accumulated records, in fetch order
    pub items: Vec<R>,
    /// Cursor for the next request
    pub cursor: Option<String>,
    /// Whether another page may be requested
    pub has_next_page: bool,
    /// Set while a fetch is in flight
    pub loading: bool,
    /// Display-only message from the last failed fetch
    pub last_error: Option<String>,
}

impl<R> Default for PaginationState<R> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            cursor: None,
            has_next_page: true,
            loading: false,
            last_error: None,
        }
    }
}

impl<R: Record> PaginationState<R> {
    /// Create an empty state with no cursor
    pub fn new() -> Self {
        Self::default()
    }

    /// The cursor the next fetch continues from: the last item's id, or
    /// the stored cursor while the sequence is empty
    pub fn tail_cursor(&self) -> Option<&str> {
        self.items
            .last()
            .map(Record::id)
            .or(self.cursor.as_deref())
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> LoadPhase {
        if self.loading {
            LoadPhase::Fetching
        } else if self.has_next_page {
            LoadPhase::Idle {
                has_next_page: true,
            }
        } else {
            LoadPhase::Exhausted
        }
    }

    /// Check a page can be appended without breaking continuity
    pub(crate) fn check_page(&self, page: &Page<R>) -> std::result::Result<(), ConsistencyViolation> {
        let mut seen: HashSet<&str> = self.items.iter().map(Record::id).collect();
        for record in &page.records {
            if !seen.insert(record.id()) {
                return Err(ConsistencyViolation::DuplicateRecord {
                    id: record.id().to_string(),
                });
            }
        }

        if let (Some(last), Some(end_cursor)) = (page.records.last(), &page.end_cursor) {
            if last.id() != end_cursor {
                return Err(ConsistencyViolation::EndCursorMismatch {
                    end_cursor: end_cursor.clone(),
                    last_id: last.id().to_string(),
                });
            }
        }

        Ok(())
    }

    /// Append a validated, non-empty page
    pub(crate) fn append(&mut self, page: Page<R>) -> usize {
        let appended = page.records.len();
        self.items.extend(page.records);
        self.cursor = page
            .end_cursor
            .or_else(|| self.items.last().map(|r| r.id().to_string()));
        self.has_next_page = page.has_next_page;
        appended
    }
}

/// A captured base sequence that can be restored into a controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationSnapshot<R> {
    /// Records in display order
    pub items: Vec<R>,
    /// Cursor after the last record
    pub cursor: Option<String>,
    /// Whether more pages are available
    pub has_next_page: bool,
}

impl<R: Record> PaginationSnapshot<R> {
    /// Validate id uniqueness and the cursor invariant
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for item in &self.items {
            if !seen.insert(item.id()) {
                return Err(Error::consistency(format!(
                    "duplicate record id '{}' in snapshot",
                    item.id()
                )));
            }
        }

        if let Some(last) = self.items.last() {
            if self.cursor.as_deref() != Some(last.id()) {
                return Err(Error::consistency(format!(
                    "snapshot cursor {:?} does not match last record id '{}'",
                    self.cursor,
                    last.id()
                )));
            }
        }

        Ok(())
    }
}

/// Lifecycle phase of a pagination session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    /// Waiting for the user
    Idle {
        /// Whether `load_more` would issue a fetch
        has_next_page: bool,
    },
    /// A fetch is in flight
    Fetching,
    /// No more pages; terminal
    Exhausted,
}

/// Why a merge was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsistencyViolation {
    /// The base sequence changed while the fetch was in flight
    CursorMismatch {
        /// Cursor the fetch was issued with
        expected: Option<String>,
        /// Last id of the base sequence when the response arrived
        actual: Option<String>,
    },
    /// The page repeats an id already present
    DuplicateRecord {
        /// The repeated id
        id: String,
    },
    /// The page's end cursor does not name its last record
    EndCursorMismatch {
        /// Cursor reported by the server
        end_cursor: String,
        /// Id of the page's last record
        last_id: String,
    },
}

impl std::fmt::Display for ConsistencyViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CursorMismatch { expected, actual } => write!(
                f,
                "bad pagination query: expected cursor {expected:?}, base ends at {actual:?}"
            ),
            Self::DuplicateRecord { id } => write!(f, "page repeats record id '{id}'"),
            Self::EndCursorMismatch {
                end_cursor,
                last_id,
            } => write!(
                f,
                "page end cursor '{end_cursor}' does not match last record '{last_id}'"
            ),
        }
    }
}

/// Why `load_more` did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Another fetch is already in flight
    InFlight,
    /// There are no more pages
    Exhausted,
}

/// Result of a single `load_more` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Records were appended
    Merged {
        /// Number of records appended
        appended: usize,
        /// Whether more pages remain
        has_next_page: bool,
    },
    /// The server returned no records; nothing changed
    EmptyPage,
    /// The response was discarded to keep the sequence consistent
    Rejected(ConsistencyViolation),
    /// The fetch failed; the message is also stored for display
    Failed(String),
    /// No fetch was issued
    Skipped(SkipReason),
}

impl LoadOutcome {
    /// Check if records were appended
    pub fn is_merged(&self) -> bool {
        matches!(self, Self::Merged { .. })
    }
}

/// Read-only snapshot handed to the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationView<R> {
    /// Accumulated records
    pub items: Vec<R>,
    /// Whether the load-more trigger applies
    pub has_next_page: bool,
    /// Whether a fetch is in flight
    pub loading: bool,
    /// Message from the last failed fetch
    pub error: Option<String>,
}

impl<R> PaginationView<R> {
    /// The trigger control is offered only when idle with more pages
    pub fn can_load_more(&self) -> bool {
        self.has_next_page && !self.loading
    }
}

impl<R: Clone> From<&PaginationState<R>> for PaginationView<R> {
    fn from(state: &PaginationState<R>) -> Self {
        Self {
            items: state.items.clone(),
            has_next_page: state.has_next_page,
            loading: state.loading,
            error: state.last_error.clone(),
        }
    }
}
