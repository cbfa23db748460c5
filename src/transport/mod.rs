//! Transport port for the remote REST API.
//!
//! The data-access layer never talks HTTP directly. It asks a [`Transport`]
//! for the JSON body behind a relative resource path and a set of query
//! parameters, and treats any failure as an opaque [`TransportError`].
mod http;

pub use http::HttpTransport;

use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;

/// Query parameters appended to a request, kept ordered for stable URLs.
pub type QueryParams = BTreeMap<String, String>;

/// Errors that can occur while talking to the remote API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request could not be sent or no response was received
    #[error("Request failed: {0}")]
    Request(String),

    /// The API answered 404 for the requested path
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The API answered with a non-success status code
    #[error("HTTP {code} {reason}")]
    Status { code: u16, reason: String },

    /// The response body could not be decoded into the expected payload
    #[error("Failed to decode API response: {0}")]
    Decode(String),
}

/// Capability to perform a single GET against the remote API.
///
/// Implementors resolve `path` against their base URL and handle content
/// negotiation. The returned JSON is decoded by the caller, so
/// implementations stay agnostic of payload types.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetches the JSON document at `path` with the given query parameters.
    ///
    /// # Arguments
    ///
    /// * `path` - Resource path relative to the API root (e.g. `character/42`)
    /// * `query` - Query parameters to append to the request
    async fn get(&self, path: &str, query: &QueryParams)
    -> Result<serde_json::Value, TransportError>;
}

/// Builds query parameters from string pairs.
///
/// # Examples
///
/// ```
/// use rickmorty_explorer::transport::query;
///
/// let params = query([("name", "rick"), ("status", "alive")]);
/// assert_eq!(params.get("name").map(String::as_str), Some("rick"));
/// ```
pub fn query<'a, I>(pairs: I) -> QueryParams
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}
