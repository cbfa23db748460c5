/// reqwest-backed implementation of the transport port.
use super::{QueryParams, Transport, TransportError};
use crate::config::ExplorerConfig;
use async_trait::async_trait;
use tracing::debug;

/// Transport that talks to the live REST API over HTTPS.
///
/// Paths are resolved against the configured base URL, so callers only ever
/// pass relative resource paths such as `character` or `episode/1,2,`.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Creates a new transport from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Request` if the underlying HTTP client
    /// cannot be constructed (e.g. TLS backend initialisation failure).
    pub fn new(config: &ExplorerConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Joins the base URL and a relative resource path.
    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(
        &self,
        path: &str,
        query: &QueryParams,
    ) -> Result<serde_json::Value, TransportError> {
        let url = self.url_for(path);
        debug!(%url, ?query, "GET");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        // The API answers 404 both for unknown ids and for empty filter results
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(TransportError::NotFound(path.to_string()));
        }

        if !response.status().is_success() {
            return Err(TransportError::Status {
                code: response.status().as_u16(),
                reason: response
                    .status()
                    .canonical_reason()
                    .unwrap_or("Unknown")
                    .to_string(),
            });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))
    }
}
