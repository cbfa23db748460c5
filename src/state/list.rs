//! Infinite-scroll list controller
//!
//! Loads a paged resource one page at a time, appending each page to the
//! accumulated list as the viewport approaches its end.

use super::{StateFlow, ViewState};
use crate::config::ExplorerConfig;
use crate::model::Entity;
use crate::repository::Repository;
use crate::transport::{QueryParams, Transport};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, warn};

/// Accumulated content of a paged list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagedList<E> {
    /// Every item fetched so far, in page order
    pub items: Vec<E>,
    /// Number of pages appended so far
    pub pages_loaded: u32,
    /// Total number of pages reported by the last fetched page
    pub total_pages: u32,
    /// Total number of items across all pages
    pub total_count: u32,
    /// Message of the last failed next-page fetch, cleared by the next success
    pub load_error: Option<String>,
}

impl<E> PagedList<E> {
    /// Returns true once every page has been appended.
    pub fn is_exhausted(&self) -> bool {
        self.pages_loaded >= self.total_pages
    }
}

/// Pagination bookkeeping, never held across an await
#[derive(Debug, Default)]
struct Cursor {
    pages_loaded: u32,
    /// Known once the first page arrived
    total_pages: Option<u32>,
    /// Page currently being fetched
    in_flight: Option<u32>,
}

/// Releases the in-flight slot when a fetch is abandoned before it settles,
/// so the next trigger can issue it again.
struct InFlightGuard<'a> {
    cursor: &'a Mutex<Cursor>,
    armed: bool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            debug!("List page fetch abandoned");
            self.cursor.lock().in_flight = None;
        }
    }
}

impl Cursor {
    fn next_page(&self) -> u32 {
        self.pages_loaded + 1
    }

    fn is_exhausted(&self) -> bool {
        matches!(self.total_pages, Some(total) if self.next_page() > total)
    }
}

/// View-state controller for a scrollable list backed by a paged resource.
///
/// At most one page fetch is in flight at a time. Triggers arriving while a
/// fetch is pending, or after the last page was appended, are no-ops.
pub struct PagedListController<T: Transport, E: Entity> {
    repository: Arc<Repository<T>>,
    query: QueryParams,
    prefetch_threshold: usize,
    cursor: Mutex<Cursor>,
    state: StateFlow<ViewState<PagedList<E>>>,
}

impl<T: Transport, E: Entity> PagedListController<T, E> {
    /// Creates a controller listing every entity of `E`'s resource.
    pub fn new(repository: Arc<Repository<T>>, config: &ExplorerConfig) -> Self {
        Self::with_query(repository, QueryParams::new(), config)
    }

    /// Creates a controller whose page requests all carry `query`.
    pub fn with_query(
        repository: Arc<Repository<T>>,
        query: QueryParams,
        config: &ExplorerConfig,
    ) -> Self {
        Self {
            repository,
            query,
            prefetch_threshold: config.prefetch_threshold,
            cursor: Mutex::new(Cursor::default()),
            state: StateFlow::new(ViewState::Loading),
        }
    }

    pub fn state(&self) -> &StateFlow<ViewState<PagedList<E>>> {
        &self.state
    }

    /// Loads the first page.
    ///
    /// Does nothing if a page has already been loaded or a fetch is pending.
    /// If the returned future is dropped before the page arrives, the state
    /// stays `Loading` and a later call fetches the page again.
    pub async fn load_initial(&self) {
        {
            let mut cursor = self.cursor.lock();
            if cursor.pages_loaded > 0 || cursor.in_flight.is_some() {
                return;
            }
            cursor.in_flight = Some(1);
        }

        self.state.set(ViewState::Loading);
        self.fetch_and_merge(1).await;
    }

    /// Loads the page after the last one appended.
    ///
    /// Returns true if a fetch was issued. Returns false without touching the
    /// network when a fetch is already pending or every page is loaded.
    pub async fn load_next_page(&self) -> bool {
        let page = {
            let mut cursor = self.cursor.lock();
            if cursor.in_flight.is_some() || cursor.is_exhausted() {
                return false;
            }
            let page = cursor.next_page();
            cursor.in_flight = Some(page);
            page
        };

        self.fetch_and_merge(page).await;
        true
    }

    /// Decides whether the viewport is close enough to the end of the list
    /// to warrant fetching the next page.
    ///
    /// # Arguments
    ///
    /// * `last_visible_index` - Index of the last item currently on screen
    pub fn should_load_more(&self, last_visible_index: usize) -> bool {
        if self.cursor.lock().is_exhausted() {
            return false;
        }

        let loaded = match self.state.with(|state| state.content().map(|list| list.items.len())) {
            Some(loaded) => loaded,
            None => return false,
        };
        let below_viewport = loaded.saturating_sub(last_visible_index + 1);
        below_viewport <= self.prefetch_threshold
    }

    /// Reacts to a scroll: fetches the next page when the lookahead is reached.
    ///
    /// Returns true if a fetch was issued.
    pub async fn on_visible_range_changed(&self, last_visible_index: usize) -> bool {
        if !self.should_load_more(last_visible_index) {
            return false;
        }
        self.load_next_page().await
    }

    async fn fetch_and_merge(&self, page: u32) {
        let mut guard = InFlightGuard {
            cursor: &self.cursor,
            armed: true,
        };

        debug!(resource = E::RESOURCE, page, "Loading list page");
        let result = self.repository.page::<E>(page, &self.query).await;

        // Settled: the slot is released below together with the cursor update
        guard.armed = false;
        let mut cursor = self.cursor.lock();
        cursor.in_flight = None;

        match result {
            Ok(fetched) => {
                cursor.pages_loaded = page;
                cursor.total_pages = Some(fetched.info.pages);
                drop(cursor);

                self.state.update(|state| match state {
                    ViewState::Content(list) => {
                        list.items.extend(fetched.results);
                        list.pages_loaded = page;
                        list.total_pages = fetched.info.pages;
                        list.total_count = fetched.info.count;
                        list.load_error = None;
                    }
                    _ => {
                        *state = ViewState::Content(PagedList {
                            items: fetched.results,
                            pages_loaded: page,
                            total_pages: fetched.info.pages,
                            total_count: fetched.info.count,
                            load_error: None,
                        });
                    }
                });
            }
            Err(error) => {
                drop(cursor);
                warn!(resource = E::RESOURCE, page, %error, "Failed to load list page");

                // Existing content survives a failed append
                let message = error.to_string();
                self.state.update(|state| match state {
                    ViewState::Content(list) => list.load_error = Some(message),
                    _ => *state = ViewState::Error(message),
                });
            }
        }
    }
}
