//! Domain model for characters, episodes and pages.
//!
//! This module provides the stable domain entities handed to the view-state
//! controllers, the [`Entity`] trait tying each entity to its API resource,
//! and the raw payload types plus the mapper converting between the two.
mod mapper;
pub mod remote_types;

pub use mapper::{MappingError, extract_trailing_id, parse_episode_code};

use remote_types::{RemoteCharacter, RemoteEpisode};
use serde::de::DeserializeOwned;

/// Stable identifier of an entity within its resource.
pub type EntityId = u32;

/// An entity that can be fetched from a resource of the remote API.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Resource path relative to the API root
    const RESOURCE: &'static str;

    /// Raw payload type the API returns for one entity
    type Remote: DeserializeOwned + Send;

    /// Converts a raw payload into the domain entity.
    fn from_remote(remote: Self::Remote) -> Result<Self, MappingError>;

    /// Returns the entity's stable id.
    fn id(&self) -> EntityId;
}

/// Life status of a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CharacterStatus {
    Alive,
    Dead,
    Unknown,
}

impl CharacterStatus {
    /// Parses the API's status text case-insensitively, falling back to `Unknown`.
    pub fn parse(text: &str) -> Self {
        match text.trim().to_lowercase().as_str() {
            "alive" => Self::Alive,
            "dead" => Self::Dead,
            _ => Self::Unknown,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Alive => "Alive",
            Self::Dead => "Dead",
            Self::Unknown => "Unknown",
        }
    }
}

/// Gender of a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharacterGender {
    Male,
    Female,
    Genderless,
    Unknown,
}

impl CharacterGender {
    /// Parses the API's gender text case-insensitively, falling back to `Unknown`.
    pub fn parse(text: &str) -> Self {
        match text.trim().to_lowercase().as_str() {
            "male" => Self::Male,
            "female" => Self::Female,
            "genderless" => Self::Genderless,
            _ => Self::Unknown,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Genderless => "Genderless",
            Self::Unknown => "Not specified",
        }
    }
}

/// A named place a character comes from or was last seen at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Place {
    pub name: String,
    pub url: String,
}

/// A character of the show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Character {
    pub id: EntityId,
    pub name: String,
    pub status: CharacterStatus,
    pub species: String,
    /// Free-form sub-species, frequently empty
    pub kind: String,
    pub gender: CharacterGender,
    pub origin: Place,
    pub location: Place,
    pub image_url: String,
    /// Ids of the episodes the character appears in
    pub episode_ids: Vec<EntityId>,
    pub url: String,
    pub created: String,
}

/// A single episode of the show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Episode {
    pub id: EntityId,
    pub name: String,
    pub air_date: String,
    /// The season number this episode belongs to
    pub season_number: u32,
    /// The episode number within the season
    pub episode_number: u32,
    /// Ids of the characters appearing in the episode
    pub character_ids: Vec<EntityId>,
}

impl Episode {
    /// Renders the episode's season/episode code, e.g. `S01E05`.
    pub fn code(&self) -> String {
        format!("S{:02}E{:02}", self.season_number, self.episode_number)
    }
}

impl Entity for Character {
    const RESOURCE: &'static str = "character";
    type Remote = RemoteCharacter;

    fn from_remote(remote: RemoteCharacter) -> Result<Self, MappingError> {
        mapper::character_from_remote(remote)
    }

    fn id(&self) -> EntityId {
        self.id
    }
}

impl Entity for Episode {
    const RESOURCE: &'static str = "episode";
    type Remote = RemoteEpisode;

    fn from_remote(remote: RemoteEpisode) -> Result<Self, MappingError> {
        mapper::episode_from_remote(remote)
    }

    fn id(&self) -> EntityId {
        self.id
    }
}

/// Pagination metadata of a fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInfo {
    /// Total number of entities across all pages
    pub count: u32,
    /// Total number of pages
    pub pages: u32,
    pub next: Option<String>,
    pub prev: Option<String>,
}

/// One bounded slice of a resource plus its pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<E> {
    pub info: PageInfo,
    pub results: Vec<E>,
}
