//! Listing pagination: the first page plus any number of "load more" pages.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::{
    provider::{ContentProvider, SummaryPage, LISTING_PAGE_SIZE, PUBLICATION_TYPE},
    ArticleSummary, Result,
};

/// Summaries accumulated by one listing view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationState {
    /// Every summary received so far, in arrival order. Never de-duplicated.
    pub results: Vec<ArticleSummary>,
    /// Locator of the next page; `None` once the listing is exhausted.
    pub next_page: Option<String>,
}

impl PaginationState {
    /// Whether a "load more" control should be offered.
    pub fn has_more(&self) -> bool {
        self.next_page.is_some()
    }

    fn apply(&mut self, page: SummaryPage) {
        self.results.extend(page.results);
        self.next_page = page.next_page;
    }
}

impl From<SummaryPage> for PaginationState {
    fn from(page: SummaryPage) -> Self {
        Self {
            results: page.results,
            next_page: page.next_page,
        }
    }
}

/// What a [`Paginator::load_more`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page was fetched and appended.
    Appended {
        /// Number of summaries in the appended page.
        added: usize,
    },
    /// There is no next page; nothing was requested.
    Exhausted,
    /// Another load is still in flight; nothing was requested.
    Busy,
}

/// Pagination state of one listing view, safe to share between requests.
///
/// At most one page fetch runs at a time. A fetch that fails leaves the state
/// exactly as it was before the call.
#[derive(Debug, Default)]
pub struct Paginator {
    state: Mutex<PaginationState>,
    in_flight: AtomicBool,
}

impl Paginator {
    /// Fetches the first listing page.
    pub async fn initial_load<P>(provider: &P) -> Result<Self>
    where
        P: ContentProvider + ?Sized,
    {
        let page = provider.query_by_type(PUBLICATION_TYPE, LISTING_PAGE_SIZE).await?;
        tracing::debug!(
            results = page.results.len(),
            has_more = page.next_page.is_some(),
            "loaded first listing page"
        );
        Ok(Self::from_state(page.into()))
    }

    /// Wraps an existing state.
    pub fn from_state(state: PaginationState) -> Self {
        Self {
            state: Mutex::new(state),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> PaginationState {
        self.state.lock().clone()
    }

    /// Whether a next page exists.
    pub fn has_more(&self) -> bool {
        self.state.lock().has_more()
    }

    /// Whether a page fetch is currently running.
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Fetches the next page and appends it.
    ///
    /// Returns [`LoadOutcome::Busy`] without fetching while another call is in
    /// flight, and [`LoadOutcome::Exhausted`] when there is no next page. On
    /// error neither `results` nor `next_page` change.
    pub async fn load_more<P>(&self, provider: &P) -> Result<LoadOutcome>
    where
        P: ContentProvider + ?Sized,
    {
        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            return Ok(LoadOutcome::Busy);
        };

        let next_page = self.state.lock().next_page.clone();
        let Some(locator) = next_page else {
            return Ok(LoadOutcome::Exhausted);
        };

        let page = provider.fetch_page(&locator).await?;
        let added = page.results.len();
        self.state.lock().apply(page);
        Ok(LoadOutcome::Appended {
            added,
        })
    }
}

/// Holds the in-flight flag; clears it on drop, including when the owning
/// future is dropped mid-fetch.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
