//! Session-scoped data access
//!
//! The repository wraps a transport and owns the entity caches for one
//! session. Single-entity lookups go through the cache; page and aggregate
//! reads always hit the transport and never populate the cache.

use crate::cache::EntityCache;
use crate::model::{Character, Entity, EntityId, Episode, Page};
use crate::pagination::{FetchError, decode, fetch_all_pages, fetch_one_page};
use crate::transport::{QueryParams, Transport};
use std::sync::Arc;
use tracing::debug;

/// Data access for one session, backed by a transport and entity caches
///
/// Controllers receive the repository by `Arc` so they share the same caches
/// for as long as the session lives.
pub struct Repository<T: Transport> {
    /// The underlying transport
    transport: T,
    /// Characters fetched individually during this session
    characters: EntityCache<Character>,
    /// Episodes fetched individually during this session
    episodes: EntityCache<Episode>,
}

impl<T: Transport> Repository<T> {
    /// Creates a repository with empty caches wrapping the given transport
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            characters: EntityCache::new(),
            episodes: EntityCache::new(),
        }
    }

    /// Convenience for sharing the repository between controllers
    pub fn shared(transport: T) -> Arc<Self> {
        Arc::new(Self::new(transport))
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn character_cache(&self) -> &EntityCache<Character> {
        &self.characters
    }

    pub fn episode_cache(&self) -> &EntityCache<Episode> {
        &self.episodes
    }

    /// Fetches a single character, consulting the cache first
    pub async fn character(&self, id: EntityId) -> Result<Character, FetchError> {
        self.cached(&self.characters, id).await
    }

    /// Fetches a single episode, consulting the cache first
    pub async fn episode(&self, id: EntityId) -> Result<Episode, FetchError> {
        self.cached(&self.episodes, id).await
    }

    /// Fetches several episodes in one round trip
    ///
    /// The id list is sent with a trailing comma so the API always answers
    /// with an array, even for a single id. An empty id list makes no call.
    /// The result is not cached.
    pub async fn episodes(&self, ids: &[EntityId]) -> Result<Vec<Episode>, FetchError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let joined: String = ids.iter().map(|id| format!("{},", id)).collect();
        let path = format!("{}/{}", Episode::RESOURCE, joined);

        let body = self.transport.get(&path, &QueryParams::new()).await?;
        let remote: Vec<<Episode as Entity>::Remote> = decode(body)?;
        remote
            .into_iter()
            .map(|episode| Episode::from_remote(episode).map_err(FetchError::from))
            .collect()
    }

    /// Fetches one page of characters matching `query`
    pub async fn character_page(
        &self,
        page: u32,
        query: &QueryParams,
    ) -> Result<Page<Character>, FetchError> {
        self.page(page, query).await
    }

    /// Fetches one page of any resource
    pub async fn page<E: Entity>(
        &self,
        page: u32,
        query: &QueryParams,
    ) -> Result<Page<E>, FetchError> {
        fetch_one_page::<E, T>(&self.transport, page, query).await
    }

    /// Fetches every page of any resource
    pub async fn all_pages<E: Entity>(&self, query: &QueryParams) -> Result<Vec<E>, FetchError> {
        fetch_all_pages::<E, T>(&self.transport, query).await
    }

    /// Fetches every character whose name matches `name`
    pub async fn all_characters_by_name(&self, name: &str) -> Result<Vec<Character>, FetchError> {
        let mut query = QueryParams::new();
        query.insert("name".to_string(), name.to_string());
        self.all_pages(&query).await
    }

    /// Fetches every episode of the show
    pub async fn all_episodes(&self) -> Result<Vec<Episode>, FetchError> {
        self.all_pages(&QueryParams::new()).await
    }

    /// Cache-first single-entity fetch
    ///
    /// On a hit no transport call is made. On a miss the entity is fetched,
    /// mapped and stored before being returned. Concurrent misses for the
    /// same id each issue their own request.
    async fn cached<E: Entity>(
        &self,
        cache: &EntityCache<E>,
        id: EntityId,
    ) -> Result<E, FetchError> {
        if let Some(entity) = cache.get(id) {
            debug!(resource = E::RESOURCE, id, "Cache hit");
            return Ok(entity);
        }

        debug!(resource = E::RESOURCE, id, "Cache miss");
        let path = format!("{}/{}", E::RESOURCE, id);
        let body = self.transport.get(&path, &QueryParams::new()).await?;
        let entity = E::from_remote(decode(body)?)?;

        cache.put(id, entity.clone());
        Ok(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CharacterStatus;
    use crate::testing::{FakeTransport, character_json, episode_json};
    use crate::transport::TransportError;

    fn character_transport() -> FakeTransport {
        FakeTransport::new(|path, _| {
            let id: u32 = path
                .strip_prefix("character/")
                .and_then(|id| id.parse().ok())
                .ok_or_else(|| TransportError::NotFound(path.to_string()))?;
            Ok(character_json(id, &format!("Character {}", id), "Dead"))
        })
    }

    #[tokio::test]
    async fn test_character_is_fetched_once_per_session() {
        let repository = Repository::new(character_transport());

        let first = repository.character(7).await.unwrap();
        let second = repository.character(7).await.unwrap();
        let third = repository.character(7).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(second, third);
        assert_eq!(first.status, CharacterStatus::Dead);
        assert_eq!(repository.transport().call_count(), 1);
        assert_eq!(repository.transport().calls()[0].0, "character/7");
    }

    #[tokio::test]
    async fn test_distinct_ids_each_miss_once() {
        let repository = Repository::new(character_transport());

        repository.character(1).await.unwrap();
        repository.character(2).await.unwrap();
        repository.character(1).await.unwrap();

        assert_eq!(repository.transport().call_count(), 2);
        assert_eq!(repository.character_cache().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let repository = Repository::new(character_transport());

        let result = repository.episode(3).await;

        assert!(matches!(result, Err(FetchError::Transport(TransportError::NotFound(_)))));
        assert!(repository.episode_cache().is_empty());
    }

    #[tokio::test]
    async fn test_page_fetch_does_not_populate_cache() {
        let repository = Repository::new(FakeTransport::paged(
            "character",
            crate::testing::characters(5),
            20,
        ));

        let page = repository.character_page(1, &QueryParams::new()).await.unwrap();

        assert_eq!(page.results.len(), 5);
        assert!(repository.character_cache().is_empty());
    }

    #[tokio::test]
    async fn test_episodes_by_ids() {
        let repository = Repository::new(FakeTransport::new(|path, _| {
            assert_eq!(path, "episode/1,2,");
            Ok(serde_json::json!([
                episode_json(1, "Pilot", "S01E01", &[1, 2]),
                episode_json(2, "Lawnmower Dog", "S01E02", &[1, 2]),
            ]))
        }));

        let episodes = repository.episodes(&[1, 2]).await.unwrap();

        assert_eq!(episodes.len(), 2);
        assert_eq!(episodes[1].name, "Lawnmower Dog");
        assert!(repository.episode_cache().is_empty());
    }

    #[tokio::test]
    async fn test_episodes_with_no_ids_makes_no_call() {
        let repository = Repository::new(character_transport());

        let episodes = repository.episodes(&[]).await.unwrap();

        assert!(episodes.is_empty());
        assert_eq!(repository.transport().call_count(), 0);
    }
}
