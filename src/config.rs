//! Runtime configuration for the data-access layer and its controllers.

use std::time::Duration;

/// Default root of the public Rick and Morty API
pub const DEFAULT_BASE_URL: &str = "https://rickandmortyapi.com/api/";

/// Quiet period after the last keystroke before a search is issued
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(200);

/// Number of fetched-but-unseen items below the viewport at which the next
/// page is requested
pub const DEFAULT_PREFETCH_THRESHOLD: usize = 10;

/// Upper bound for a single HTTP round trip
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration shared by the transport and the view-state controllers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplorerConfig {
    /// Root URL every resource path is resolved against
    pub base_url: String,
    /// Timeout applied to each HTTP request
    pub request_timeout: Duration,
    /// Debounce window for search-as-you-type
    pub search_debounce: Duration,
    /// Lookahead used by list controllers to prefetch the next page
    pub prefetch_threshold: usize,
    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
            prefetch_threshold: DEFAULT_PREFETCH_THRESHOLD,
            user_agent: format!("rickmorty-explorer/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ExplorerConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_search_debounce(mut self, debounce: Duration) -> Self {
        self.search_debounce = debounce;
        self
    }

    pub fn with_prefetch_threshold(mut self, threshold: usize) -> Self {
        self.prefetch_threshold = threshold;
        self
    }
}
