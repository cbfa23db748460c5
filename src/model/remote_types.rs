/// Rick and Morty API response types for deserialization.
///
/// These structures mirror the JSON response format of the API. Unknown
/// fields are ignored by serde's default behaviour.
use serde::Deserialize;

/// Pagination metadata attached to every list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RemotePageInfo {
    /// Total number of entities across all pages
    pub count: u32,
    /// Total number of pages
    pub pages: u32,
    /// URL of the next page, absent on the last page
    pub next: Option<String>,
    /// URL of the previous page, absent on the first page
    pub prev: Option<String>,
}

/// One page of a list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RemotePage<R> {
    pub info: RemotePageInfo,
    pub results: Vec<R>,
}

/// A named link to another resource (origin, location).
#[derive(Debug, Clone, Deserialize)]
pub struct RemotePlace {
    pub name: String,
    /// Empty when the API does not know the place
    pub url: String,
}

/// A single character from the `character` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteCharacter {
    pub id: u32,
    pub name: String,
    pub status: String,
    pub species: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub gender: String,
    pub origin: RemotePlace,
    pub location: RemotePlace,
    pub image: String,
    /// URLs of the episodes the character appears in
    pub episode: Vec<String>,
    pub url: String,
    pub created: String,
}

/// A single episode from the `episode` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteEpisode {
    pub id: u32,
    pub name: String,
    pub air_date: String,
    /// Season/episode code such as `S01E05`
    pub episode: String,
    /// URLs of the characters appearing in the episode
    pub characters: Vec<String>,
}
