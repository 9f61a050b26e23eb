//! Merge controller
//!
//! Owns the accumulated record sequence, requests the next page from the
//! last known cursor, and appends results only when they continue the
//! sequence it was requested for.

use super::observer::{PaginationObserver, TracingObserver};
use super::types::{
    ConsistencyViolation, LoadOutcome, LoadPhase, Page, PageFetcher, PaginationSnapshot,
    PaginationState, PaginationView, Record, SkipReason,
};
use crate::error::{Error, Result};
use std::sync::Arc;
use tokio::sync::{watch, RwLock};

/// Page size used when none is configured
pub const DEFAULT_PAGE_SIZE: u32 = 2;

struct Inner<R, F> {
    fetcher: F,
    page_size: u32,
    state: RwLock<PaginationState<R>>,
    observer: Arc<dyn PaginationObserver>,
    revision: watch::Sender<u64>,
}

/// Pagination merge controller
///
/// Cloning yields another handle to the same session. `loading` is set
/// under the write lock before the fetch is issued, so at most one fetch
/// is in flight no matter how many handles call [`load_more`].
///
/// [`load_more`]: MergeController::load_more
pub struct MergeController<R, F> {
    inner: Arc<Inner<R, F>>,
}

impl<R, F> Clone for MergeController<R, F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R, F> Inner<R, F> {
    fn bump(&self) {
        self.revision.send_modify(|rev| *rev = rev.wrapping_add(1));
    }
}

/// Clears `loading` when a load ends before its merge step, which happens
/// when the `load_more` future is dropped or the fetcher panics.
struct LoadingGuard<R, F>
where
    R: Record,
    F: PageFetcher<R> + 'static,
{
    inner: Option<Arc<Inner<R, F>>>,
}

impl<R, F> LoadingGuard<R, F>
where
    R: Record,
    F: PageFetcher<R> + 'static,
{
    fn new(inner: &Arc<Inner<R, F>>) -> Self {
        Self {
            inner: Some(Arc::clone(inner)),
        }
    }

    /// The load reached its merge step and clears `loading` itself
    fn disarm(mut self) {
        self.inner = None;
    }
}

impl<R, F> Drop for LoadingGuard<R, F>
where
    R: Record,
    F: PageFetcher<R> + 'static,
{
    fn drop(&mut self) {
        let Some(inner) = self.inner.take() else {
            return;
        };

        if let Ok(mut state) = inner.state.try_write() {
            state.loading = false;
            drop(state);
            inner.bump();
            return;
        }

        // Lock is busy: finish on the runtime. No other load can start
        // until this one clears the flag.
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                inner.state.write().await.loading = false;
                inner.bump();
            });
        }
    }
}

impl<R, F> MergeController<R, F>
where
    R: Record,
    F: PageFetcher<R> + 'static,
{
    /// Create a controller with the default page size and tracing observer
    pub fn new(fetcher: F) -> Self {
        Self::builder(fetcher).build()
    }

    /// Start configuring a controller
    pub fn builder(fetcher: F) -> MergeControllerBuilder<R, F> {
        MergeControllerBuilder {
            fetcher,
            page_size: DEFAULT_PAGE_SIZE,
            observer: Arc::new(TracingObserver),
            _record: std::marker::PhantomData,
        }
    }

    /// Configured page size
    pub fn page_size(&self) -> u32 {
        self.inner.page_size
    }

    /// Fetch the next page and merge it into the accumulated sequence.
    ///
    /// Never returns an error: failures are recorded in the state for
    /// display and reported through the observer. `loading` is cleared
    /// even if this future is dropped or the fetcher panics.
    pub async fn load_more(&self) -> LoadOutcome {
        let expected = {
            let mut state = self.inner.state.write().await;
            if state.loading {
                return LoadOutcome::Skipped(SkipReason::InFlight);
            }
            if !state.has_next_page {
                return LoadOutcome::Skipped(SkipReason::Exhausted);
            }
            state.loading = true;
            state.tail_cursor().map(ToString::to_string)
        };
        let guard = LoadingGuard::new(&self.inner);
        self.bump();

        let limit = self.inner.page_size;
        self.inner.observer.fetch_started(expected.as_deref(), limit);
        let fetched = self
            .inner
            .fetcher
            .fetch_page(expected.as_deref(), limit)
            .await;

        let outcome = {
            let mut state = self.inner.state.write().await;
            guard.disarm();
            state.loading = false;
            self.complete(&mut state, expected, fetched)
        };
        self.bump();
        outcome
    }

    /// Keep loading until exhausted, a load does not merge, or `max_pages`
    /// merges have happened. Returns the last outcome.
    pub async fn load_all(&self, max_pages: Option<usize>) -> LoadOutcome {
        let mut merged = 0;
        loop {
            let outcome = self.load_more().await;
            if !outcome.is_merged() {
                return outcome;
            }
            merged += 1;
            let done = matches!(
                outcome,
                LoadOutcome::Merged {
                    has_next_page: false,
                    ..
                }
            );
            if done || max_pages.is_some_and(|max| merged >= max) {
                return outcome;
            }
        }
    }

    /// Discard the accumulated sequence.
    ///
    /// A fetch already in flight keeps `loading` set; its response no
    /// longer continues the base sequence and will be rejected.
    pub async fn reset(&self) {
        {
            let mut state = self.inner.state.write().await;
            let loading = state.loading;
            *state = PaginationState {
                loading,
                ..PaginationState::default()
            };
        }
        self.bump();
    }

    /// Replace the base sequence with a previously captured one
    pub async fn restore(&self, snapshot: PaginationSnapshot<R>) -> Result<()> {
        snapshot.validate()?;
        {
            let mut state = self.inner.state.write().await;
            state.items = snapshot.items;
            state.cursor = snapshot.cursor;
            state.has_next_page = snapshot.has_next_page;
            state.last_error = None;
        }
        self.bump();
        Ok(())
    }

    /// Capture the current base sequence
    pub async fn snapshot(&self) -> PaginationSnapshot<R> {
        let state = self.inner.state.read().await;
        PaginationSnapshot {
            items: state.items.clone(),
            cursor: state.cursor.clone(),
            has_next_page: state.has_next_page,
        }
    }

    /// Read-only view for the presentation layer
    pub async fn view(&self) -> PaginationView<R> {
        PaginationView::from(&*self.inner.state.read().await)
    }

    /// Current lifecycle phase
    pub async fn phase(&self) -> LoadPhase {
        self.inner.state.read().await.phase()
    }

    /// Check if a fetch is in flight
    pub async fn is_loading(&self) -> bool {
        self.inner.state.read().await.loading
    }

    /// Number of accumulated records
    pub async fn len(&self) -> usize {
        self.inner.state.read().await.items.len()
    }

    /// Check if no records have been loaded
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Receiver that ticks whenever the state changes
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    fn complete(
        &self,
        state: &mut PaginationState<R>,
        expected: Option<String>,
        fetched: Result<Page<R>>,
    ) -> LoadOutcome {
        let observer = &self.inner.observer;

        let page = match fetched {
            Ok(page) => page,
            Err(e) => {
                let message = display_message(&e);
                observer.fetch_failed(&message);
                state.last_error = Some(message.clone());
                return LoadOutcome::Failed(message);
            }
        };
        state.last_error = None;

        let actual = state.tail_cursor();
        if actual != expected.as_deref() {
            let violation = ConsistencyViolation::CursorMismatch {
                actual: actual.map(ToString::to_string),
                expected,
            };
            observer.merge_rejected(&violation);
            return LoadOutcome::Rejected(violation);
        }

        if page.is_empty() {
            observer.empty_page(expected.as_deref());
            return LoadOutcome::EmptyPage;
        }

        if let Err(violation) = state.check_page(&page) {
            observer.merge_rejected(&violation);
            return LoadOutcome::Rejected(violation);
        }

        let appended = state.append(page);
        observer.page_merged(appended, state.items.len(), state.has_next_page);
        LoadOutcome::Merged {
            appended,
            has_next_page: state.has_next_page,
        }
    }

    fn bump(&self) {
        self.inner.bump();
    }
}

/// Builder for [`MergeController`]
pub struct MergeControllerBuilder<R, F> {
    fetcher: F,
    page_size: u32,
    observer: Arc<dyn PaginationObserver>,
    _record: std::marker::PhantomData<fn() -> R>,
}

impl<R, F> MergeControllerBuilder<R, F>
where
    R: Record,
    F: PageFetcher<R>,
{
    /// Set the number of records requested per fetch
    #[must_use]
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the event observer
    #[must_use]
    pub fn observer(mut self, observer: Arc<dyn PaginationObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Build the controller.
    ///
    /// A zero page size is clamped to one.
    pub fn build(self) -> MergeController<R, F> {
        let (revision, _) = watch::channel(0);
        MergeController {
            inner: Arc::new(Inner {
                fetcher: self.fetcher,
                page_size: self.page_size.max(1),
                state: RwLock::new(PaginationState::default()),
                observer: self.observer,
                revision,
            }),
        }
    }
}

impl<R, F> std::fmt::Debug for MergeController<R, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MergeController")
            .field("page_size", &self.inner.page_size)
            .finish_non_exhaustive()
    }
}

/// Message shown to the user for a failed fetch
fn display_message(error: &Error) -> String {
    match error {
        Error::Graphql { messages } if !messages.is_empty() => messages.join("; "),
        other => other.to_string(),
    }
}
