//! Season-grouped episode screens.

use super::{StateFlow, ViewState};
use crate::model::{Character, EntityId, Episode};
use crate::repository::Repository;
use crate::transport::Transport;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::warn;

/// Episodes grouped by season number, seasons in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeasonGroups {
    seasons: BTreeMap<u32, Vec<Episode>>,
}

impl SeasonGroups {
    /// Groups episodes by season, keeping their order within each season.
    pub fn from_episodes(episodes: impl IntoIterator<Item = Episode>) -> Self {
        let mut seasons: BTreeMap<u32, Vec<Episode>> = BTreeMap::new();
        for episode in episodes {
            seasons
                .entry(episode.season_number)
                .or_default()
                .push(episode);
        }
        Self { seasons }
    }

    pub fn season_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.seasons.keys().copied()
    }

    pub fn episodes(&self, season: u32) -> &[Episode] {
        self.seasons.get(&season).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &[Episode])> + '_ {
        self.seasons
            .iter()
            .map(|(season, episodes)| (*season, episodes.as_slice()))
    }

    /// Number of distinct characters appearing anywhere in `season`.
    pub fn unique_character_count(&self, season: u32) -> usize {
        self.episodes(season)
            .iter()
            .flat_map(|episode| episode.character_ids.iter().copied())
            .collect::<BTreeSet<EntityId>>()
            .len()
    }

    pub fn episode_count(&self) -> usize {
        self.seasons.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.seasons.is_empty()
    }
}

/// Controller for the screen listing every episode of the show by season.
pub struct SeasonsController<T: Transport> {
    repository: Arc<Repository<T>>,
    state: StateFlow<ViewState<SeasonGroups>>,
}

impl<T: Transport> SeasonsController<T> {
    pub fn new(repository: Arc<Repository<T>>) -> Self {
        Self {
            repository,
            state: StateFlow::new(ViewState::Loading),
        }
    }

    pub fn state(&self) -> &StateFlow<ViewState<SeasonGroups>> {
        &self.state
    }

    /// Reloads every episode page and regroups them.
    pub async fn refresh(&self) {
        self.state.set(ViewState::Loading);

        match self.repository.all_episodes().await {
            Ok(episodes) => self
                .state
                .set(ViewState::Content(SeasonGroups::from_episodes(episodes))),
            Err(error) => {
                warn!(%error, "Failed to load episodes");
                self.state.set(ViewState::Error(error.to_string()));
            }
        }
    }
}

/// A character together with the episodes they appear in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterEpisodes {
    pub character: Character,
    pub seasons: SeasonGroups,
}

/// Controller for the screen listing one character's episodes by season.
pub struct CharacterEpisodesController<T: Transport> {
    repository: Arc<Repository<T>>,
    state: StateFlow<ViewState<CharacterEpisodes>>,
}

impl<T: Transport> CharacterEpisodesController<T> {
    pub fn new(repository: Arc<Repository<T>>) -> Self {
        Self {
            repository,
            state: StateFlow::new(ViewState::Loading),
        }
    }

    pub fn state(&self) -> &StateFlow<ViewState<CharacterEpisodes>> {
        &self.state
    }

    /// Loads the character (cache first) and then all of their episodes.
    ///
    /// Content requires both steps to succeed; either failure publishes an
    /// error.
    pub async fn load(&self, character_id: EntityId) {
        self.state.set(ViewState::Loading);

        let character = match self.repository.character(character_id).await {
            Ok(character) => character,
            Err(error) => {
                warn!(character_id, %error, "Failed to load character");
                self.state.set(ViewState::Error(error.to_string()));
                return;
            }
        };

        match self.repository.episodes(&character.episode_ids).await {
            Ok(episodes) => self.state.set(ViewState::Content(CharacterEpisodes {
                seasons: SeasonGroups::from_episodes(episodes),
                character,
            })),
            Err(error) => {
                warn!(character_id, %error, "Failed to load episodes of character");
                self.state.set(ViewState::Error(error.to_string()));
            }
        }
    }
}
