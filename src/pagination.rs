//! Pagination aggregator
//!
//! Two ways to read a paged resource: a single page for incremental loading,
//! or every page in order for screens that need the complete result set.

use crate::model::remote_types::RemotePage;
use crate::model::{Entity, MappingError, Page};
use crate::transport::{QueryParams, Transport, TransportError};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur while fetching entities
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The transport failed or returned an undecodable body
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The payload decoded but could not be mapped to domain entities
    #[error(transparent)]
    Mapping(#[from] MappingError),

    /// One page of an aggregate fetch failed, aborting the whole operation
    #[error("Failed to fetch page {page} of {resource}: {source}")]
    Page {
        resource: &'static str,
        page: u32,
        source: Box<FetchError>,
    },
}

/// Decodes a JSON body into a payload type, reporting failures as transport errors
pub(crate) fn decode<R: serde::de::DeserializeOwned>(
    body: serde_json::Value,
) -> Result<R, TransportError> {
    serde_json::from_value(body).map_err(|e| TransportError::Decode(e.to_string()))
}

/// Fetches a single page of `E`'s resource
///
/// The page number is sent as the `page` query parameter alongside the
/// caller's own parameters. Any error is scoped to this page only.
///
/// # Arguments
///
/// * `transport` - The transport to issue the request through
/// * `page` - 1-based page number
/// * `query` - Additional filter parameters (e.g. `name`, `status`)
pub async fn fetch_one_page<E, T>(
    transport: &T,
    page: u32,
    query: &QueryParams,
) -> Result<Page<E>, FetchError>
where
    E: Entity,
    T: Transport + ?Sized,
{
    let mut params = query.clone();
    params.insert("page".to_string(), page.to_string());

    debug!(resource = E::RESOURCE, page, "Fetching page");
    let body = transport.get(E::RESOURCE, &params).await?;
    let remote: RemotePage<E::Remote> = decode(body)?;

    Ok(Page::from_remote(remote)?)
}

/// Fetches every page of `E`'s resource and concatenates the results
///
/// Page 1 is fetched first to learn the total page count, then pages
/// `2..=pages` are fetched strictly one after another. The first failure
/// stops the loop: no further pages are requested and everything gathered
/// so far is discarded. There is no partial success.
pub async fn fetch_all_pages<E, T>(transport: &T, query: &QueryParams) -> Result<Vec<E>, FetchError>
where
    E: Entity,
    T: Transport + ?Sized,
{
    let wrap = |page: u32| {
        move |source: FetchError| FetchError::Page {
            resource: E::RESOURCE,
            page,
            source: Box::new(source),
        }
    };

    let first = fetch_one_page::<E, T>(transport, 1, query)
        .await
        .map_err(wrap(1))?;
    let total_pages = first.info.pages;
    let mut entities = first.results;

    for page in 2..=total_pages {
        let next = fetch_one_page::<E, T>(transport, page, query)
            .await
            .map_err(wrap(page))?;
        entities.extend(next.results);
    }

    info!(
        resource = E::RESOURCE,
        pages = total_pages,
        count = entities.len(),
        "Fetched all pages"
    );
    Ok(entities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Character, Episode};
    use crate::testing::{FakeTransport, characters, episode_json, page_param, serve_page};
    use crate::transport::query;

    #[tokio::test]
    async fn test_fetch_one_page_returns_first_slice() {
        let transport = FakeTransport::paged("character", characters(826), 20);

        let page = fetch_one_page::<Character, _>(&transport, 1, &QueryParams::new())
            .await
            .unwrap();

        assert_eq!(page.info.count, 826);
        assert_eq!(page.info.pages, 42);
        assert_eq!(page.results.len(), 20);
        assert_eq!(page.results[0].id, 1);
        assert_eq!(page.results[19].id, 20);
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_one_page_forwards_query_params() {
        let transport = FakeTransport::paged("character", characters(3), 20);

        fetch_one_page::<Character, _>(&transport, 1, &query([("name", "rick")]))
            .await
            .unwrap();

        let (path, params) = &transport.calls()[0];
        assert_eq!(path, "character");
        assert_eq!(params.get("name").map(String::as_str), Some("rick"));
        assert_eq!(params.get("page").map(String::as_str), Some("1"));
    }

    #[tokio::test]
    async fn test_fetch_one_page_error_is_scoped() {
        let transport = FakeTransport::paged("character", characters(10), 5);

        let result = fetch_one_page::<Character, _>(&transport, 7, &QueryParams::new()).await;

        assert!(matches!(
            result,
            Err(FetchError::Transport(TransportError::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_fetch_one_page_reports_undecodable_body() {
        let transport = FakeTransport::new(|_, _| Ok(serde_json::json!({ "unexpected": true })));

        let result = fetch_one_page::<Character, _>(&transport, 1, &QueryParams::new()).await;

        assert!(matches!(
            result,
            Err(FetchError::Transport(TransportError::Decode(_)))
        ));
    }

    #[tokio::test]
    async fn test_fetch_all_pages_is_complete_and_ordered() {
        let episodes: Vec<_> = (1..=51)
            .map(|id| {
                let code = format!("S{:02}E{:02}", (id - 1) / 10 + 1, (id - 1) % 10 + 1);
                episode_json(id, &format!("Episode {}", id), &code, &[1])
            })
            .collect();
        let transport = FakeTransport::paged("episode", episodes, 20);

        let all = fetch_all_pages::<Episode, _>(&transport, &QueryParams::new())
            .await
            .unwrap();

        assert_eq!(all.len(), 51);
        let ids: Vec<u32> = all.iter().map(|e| e.id).collect();
        assert_eq!(ids, (1..=51).collect::<Vec<_>>());
        assert_eq!(transport.requested_pages(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_fetch_all_pages_fails_fast() {
        let items = characters(100);
        let transport = FakeTransport::new(move |_, params| {
            let page = page_param(params);
            if page == 3 {
                return Err(TransportError::Status {
                    code: 500,
                    reason: "Internal Server Error".to_string(),
                });
            }
            serve_page(&items, page, 20)
        });

        let result = fetch_all_pages::<Character, _>(&transport, &QueryParams::new()).await;

        match result {
            Err(FetchError::Page { resource, page, .. }) => {
                assert_eq!(resource, "character");
                assert_eq!(page, 3);
            }
            other => panic!("expected page failure, got {:?}", other),
        }
        // Pages 4 and 5 are never requested
        assert_eq!(transport.requested_pages(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_fetch_all_pages_fails_on_first_page() {
        let transport = FakeTransport::new(|path, _| Err(TransportError::NotFound(path.to_string())));

        let result = fetch_all_pages::<Character, _>(&transport, &query([("name", "zzz")])).await;

        assert!(matches!(result, Err(FetchError::Page { page: 1, .. })));
        assert_eq!(transport.call_count(), 1);
    }
}
