//! rickmorty_explorer - Data access and view states for the Rick and Morty API
//!
//! This library fetches paged resources from the remote REST API, aggregates
//! them into complete result sets on demand, caches individually fetched
//! entities for the lifetime of a session, and exposes everything to a
//! presentation layer as observable view states.
//!
//! The HTTP transport is an injected capability ([`transport::Transport`]);
//! [`transport::HttpTransport`] is the reqwest-backed implementation used by
//! the CLI.

pub mod cache;
pub mod config;
pub mod model;
pub mod pagination;
pub mod repository;
pub mod state;
pub mod transport;

#[cfg(test)]
mod testing;

use std::sync::Arc;
use thiserror::Error;

// Re-export the types most callers need
pub use cache::EntityCache;
pub use config::ExplorerConfig;
pub use model::{
    Character, CharacterGender, CharacterStatus, Entity, EntityId, Episode, MappingError, Page,
    PageInfo,
};
pub use pagination::{FetchError, fetch_all_pages, fetch_one_page};
pub use repository::Repository;
pub use state::{StateFlow, ViewState};
pub use transport::{HttpTransport, QueryParams, Transport, TransportError};

/// Top-level error type for rickmorty_explorer operations
#[derive(Debug, Error)]
pub enum ExplorerError {
    /// Error while setting up or using the transport
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Error while fetching entities
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// A controller published an error view state
    #[error("{0}")]
    View(String),
}

/// Opens a session against the live API
///
/// The returned repository owns the session's entity caches; share it
/// between controllers so they benefit from each other's fetches.
///
/// # Examples
///
/// ```no_run
/// use rickmorty_explorer::{ExplorerConfig, connect};
///
/// # async fn run() -> Result<(), rickmorty_explorer::ExplorerError> {
/// let repository = connect(&ExplorerConfig::default())?;
/// let rick = repository.character(1).await?;
/// println!("{} is {}", rick.name, rick.status.display_name());
/// # Ok(())
/// # }
/// ```
pub fn connect(config: &ExplorerConfig) -> Result<Arc<Repository<HttpTransport>>, ExplorerError> {
    let transport = HttpTransport::new(config)?;
    Ok(Repository::shared(transport))
}
