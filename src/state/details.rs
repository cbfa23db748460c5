//! Character details screen.

use super::{StateFlow, ViewState};
use crate::model::{Character, EntityId};
use crate::repository::Repository;
use crate::transport::Transport;
use std::sync::Arc;
use tracing::warn;

/// A labelled fact about a character, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPoint {
    pub title: String,
    pub description: String,
}

impl DataPoint {
    fn new(title: &str, description: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            description: description.into(),
        }
    }
}

/// A character plus the facts derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterDetails {
    pub character: Character,
    pub data_points: Vec<DataPoint>,
}

impl CharacterDetails {
    pub fn new(character: Character) -> Self {
        let mut data_points = vec![
            DataPoint::new("Last known location", character.location.name.clone()),
            DataPoint::new("Species", character.species.clone()),
            DataPoint::new("Gender", character.gender.display_name()),
        ];
        if !character.kind.is_empty() {
            data_points.push(DataPoint::new("Type", character.kind.clone()));
        }
        data_points.push(DataPoint::new("Origin", character.origin.name.clone()));
        data_points.push(DataPoint::new(
            "Episode Count",
            character.episode_ids.len().to_string(),
        ));

        Self {
            character,
            data_points,
        }
    }
}

/// Controller for the screen showing a single character.
pub struct CharacterDetailsController<T: Transport> {
    repository: Arc<Repository<T>>,
    state: StateFlow<ViewState<CharacterDetails>>,
}

impl<T: Transport> CharacterDetailsController<T> {
    pub fn new(repository: Arc<Repository<T>>) -> Self {
        Self {
            repository,
            state: StateFlow::new(ViewState::Loading),
        }
    }

    pub fn state(&self) -> &StateFlow<ViewState<CharacterDetails>> {
        &self.state
    }

    /// Loads the character, from the session cache when already fetched.
    pub async fn load(&self, character_id: EntityId) {
        self.state.set(ViewState::Loading);

        match self.repository.character(character_id).await {
            Ok(character) => self
                .state
                .set(ViewState::Content(CharacterDetails::new(character))),
            Err(error) => {
                warn!(character_id, %error, "Failed to load character");
                self.state.set(ViewState::Error(error.to_string()));
            }
        }
    }
}
