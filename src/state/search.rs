//! Search-as-you-type controller
//!
//! Keystrokes flow through a debounce stage into query events. Each query
//! event supersedes the one in flight: its cancellation token is cancelled
//! and its result, should it still arrive, is never committed. Status facets
//! are applied locally to the last successful result set.

use super::{Debounced, StateFlow};
use crate::config::ExplorerConfig;
use crate::model::{Character, CharacterStatus};
use crate::pagination::FetchError;
use crate::repository::Repository;
use crate::transport::{Transport, TransportError};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Shown when the API reports no character matching the query
pub const NO_RESULTS_MESSAGE: &str = "No search results found!";

/// View state of the search screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchViewState {
    /// No query entered
    Empty,
    /// A query is in flight
    Searching,
    Content(SearchResults),
    Error(String),
}

/// Status facets derived from one result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    /// Every status present in the results, ordered by display name
    pub statuses: Vec<CharacterStatus>,
    /// Statuses currently shown; all of them by default
    pub selected: Vec<CharacterStatus>,
}

impl FilterState {
    fn from_results(results: &[Character]) -> Self {
        let mut statuses: Vec<CharacterStatus> = Vec::new();
        for character in results {
            if !statuses.contains(&character.status) {
                statuses.push(character.status);
            }
        }
        statuses.sort_by_key(|status| status.display_name());

        Self {
            selected: statuses.clone(),
            statuses,
        }
    }

    pub fn is_selected(&self, status: CharacterStatus) -> bool {
        self.selected.contains(&status)
    }

    fn toggle(&mut self, status: CharacterStatus) {
        if self.is_selected(status) {
            self.selected.retain(|selected| *selected != status);
        } else {
            self.selected.push(status);
        }
    }
}

/// Results of a completed search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResults {
    /// The query these results answer
    pub query: String,
    /// Every matching character, unfiltered
    pub results: Vec<Character>,
    pub filter: FilterState,
}

impl SearchResults {
    pub fn new(query: String, results: Vec<Character>) -> Self {
        Self {
            filter: FilterState::from_results(&results),
            query,
            results,
        }
    }

    /// Number of matches before facet filtering.
    pub fn count(&self) -> usize {
        self.results.len()
    }

    /// Characters whose status is currently selected.
    pub fn visible(&self) -> Vec<&Character> {
        self.results
            .iter()
            .filter(|character| self.filter.is_selected(character.status))
            .collect()
    }

    /// Number of matches with the given status, regardless of selection.
    pub fn status_count(&self, status: CharacterStatus) -> usize {
        self.results
            .iter()
            .filter(|character| character.status == status)
            .count()
    }
}

/// State shared between the controller, its pipeline task and query tasks
struct Shared<T: Transport> {
    repository: Arc<Repository<T>>,
    state: StateFlow<SearchViewState>,
    /// Token of the query whose result may still be committed
    active: Mutex<Option<CancellationToken>>,
}

impl<T: Transport> Shared<T> {
    /// Cancels the active query, installs `next` in its place and publishes
    /// `state` under one lock. Does nothing once `shutdown` is cancelled.
    fn supersede(
        &self,
        shutdown: &CancellationToken,
        next: Option<CancellationToken>,
        state: SearchViewState,
    ) -> bool {
        let mut active = self.active.lock();
        if shutdown.is_cancelled() {
            return false;
        }
        if let Some(previous) = active.take() {
            previous.cancel();
        }
        *active = next;
        self.state.set(state);
        true
    }

    /// Publishes `state` only while `token` is still the active query.
    fn commit(&self, token: &CancellationToken, state: SearchViewState) -> bool {
        let mut active = self.active.lock();
        if token.is_cancelled() {
            return false;
        }
        *active = None;
        self.state.set(state);
        true
    }
}

/// Controller for the search screen.
///
/// Owns a background task running the debounce and query pipeline. The task
/// and any query in flight are cancelled by [`close`](Self::close) or when
/// the controller is dropped; no state is published afterwards.
pub struct SearchController<T: Transport + 'static> {
    shared: Arc<Shared<T>>,
    input: mpsc::UnboundedSender<String>,
    shutdown: CancellationToken,
}

impl<T: Transport + 'static> SearchController<T> {
    /// Creates the controller and starts its pipeline.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn new(repository: Arc<Repository<T>>, config: &ExplorerConfig) -> Self {
        let (input, keystrokes) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            repository,
            state: StateFlow::new(SearchViewState::Empty),
            active: Mutex::new(None),
        });
        let shutdown = CancellationToken::new();

        tokio::spawn(run_pipeline(
            Arc::clone(&shared),
            Debounced::new(keystrokes, config.search_debounce),
            shutdown.clone(),
        ));

        Self {
            shared,
            input,
            shutdown,
        }
    }

    pub fn state(&self) -> &StateFlow<SearchViewState> {
        &self.shared.state
    }

    /// Feeds the current text of the search field into the pipeline.
    pub fn set_query(&self, text: impl Into<String>) {
        if self.shutdown.is_cancelled() {
            return;
        }
        // The pipeline only goes away after shutdown
        let _ = self.input.send(text.into());
    }

    /// Shows or hides results with the given status. Never hits the network.
    pub fn toggle_facet(&self, status: CharacterStatus) {
        if self.shutdown.is_cancelled() {
            return;
        }
        self.shared.state.update_if(|state| match state {
            SearchViewState::Content(content) => {
                content.filter.toggle(status);
                true
            }
            _ => false,
        });
    }

    /// Tears the search down: pending keystrokes and in-flight queries are dropped.
    pub fn close(&self) {
        // Taken so no transition is published concurrently with teardown
        let _active = self.shared.active.lock();
        self.shutdown.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

impl<T: Transport + 'static> Drop for SearchController<T> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Turns debounced text into query executions until shutdown
async fn run_pipeline<T: Transport + 'static>(
    shared: Arc<Shared<T>>,
    mut keystrokes: Debounced<String>,
    shutdown: CancellationToken,
) {
    let mut last_query: Option<String> = None;

    loop {
        let text = tokio::select! {
            _ = shutdown.cancelled() => break,
            next = keystrokes.next() => match next {
                Some(text) => text,
                None => break,
            },
        };

        // Identical consecutive queries are collapsed
        if last_query.as_deref() == Some(text.as_str()) {
            continue;
        }
        last_query = Some(text.clone());

        if text.trim().is_empty() {
            if !shared.supersede(&shutdown, None, SearchViewState::Empty) {
                break;
            }
            continue;
        }

        let token = shutdown.child_token();
        if !shared.supersede(&shutdown, Some(token.clone()), SearchViewState::Searching) {
            break;
        }
        tokio::spawn(execute_query(Arc::clone(&shared), text, token));
    }

    debug!("Search pipeline stopped");
}

async fn execute_query<T: Transport + 'static>(
    shared: Arc<Shared<T>>,
    query: String,
    token: CancellationToken,
) {
    debug!(%query, "Searching characters");

    let outcome = tokio::select! {
        _ = token.cancelled() => {
            debug!(%query, "Search superseded");
            return;
        }
        outcome = shared.repository.all_characters_by_name(&query) => outcome,
    };

    let state = match outcome {
        Ok(results) => SearchViewState::Content(SearchResults::new(query.clone(), results)),
        Err(error) => {
            warn!(%query, %error, "Search failed");
            SearchViewState::Error(error_message(&error))
        }
    };

    if !shared.commit(&token, state) {
        debug!(%query, "Discarded result of superseded search");
    }
}

/// The API answers 404 when nothing matches, which is not worth an error dump
fn error_message(error: &FetchError) -> String {
    fn is_no_match(error: &FetchError) -> bool {
        match error {
            FetchError::Transport(TransportError::NotFound(_)) => true,
            FetchError::Page { source, .. } => is_no_match(source),
            _ => false,
        }
    }

    if is_no_match(error) {
        NO_RESULTS_MESSAGE.to_string()
    } else {
        error.to_string()
    }
}
