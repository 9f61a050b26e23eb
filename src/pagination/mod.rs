//! Pagination module
//!
//! Cursor pagination with a validating merge step.
//!
//! # Overview
//!
//! A [`MergeController`] holds the records displayed so far and a single
//! loading flag. Each [`MergeController::load_more`] call fetches the page
//! after the last known record and appends it only if the sequence it was
//! requested for is still the one on display.
//!
//! ```text
//!   Idle(true) --load_more--> Fetching --non-empty, has next--> Idle(true)
//!                                 |------ has_next_page=false --> Exhausted
//!                                 |------ empty page ----------> Idle(true)
//!                                 |------ cursor mismatch -----> Idle(true)
//!                                 '------ failure -------------> Idle(true)
//! ```

mod controller;
mod observer;
mod types;

pub use controller::{MergeController, MergeControllerBuilder, DEFAULT_PAGE_SIZE};
pub use observer::{NoopObserver, PaginationObserver, TracingObserver};
pub use types::{
    ConsistencyViolation, LoadOutcome, LoadPhase, Page, PageFetcher, PaginationSnapshot,
    PaginationState, PaginationView, Record, SkipReason,
};
