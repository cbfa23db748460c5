//! Conversion of raw API payloads into domain entities
//!
//! Everything here is pure. The only failure path is malformed input:
//! relationship URLs without a trailing numeric id, episode codes without
//! enough digits, and pages whose metadata contradicts their contents.

use super::remote_types::{RemoteCharacter, RemoteEpisode, RemotePage};
use super::{
    Character, CharacterGender, CharacterStatus, Entity, EntityId, Episode, Page, PageInfo, Place,
};
use thiserror::Error;

/// Errors raised when a payload cannot be mapped to the domain model
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// A relationship URL does not end in a numeric id
    #[error("No numeric id found in '{0}'")]
    MalformedId(String),

    /// An episode code does not carry a season and an episode number
    #[error("Malformed episode code '{0}'")]
    MalformedEpisodeCode(String),

    /// Page metadata contradicts the page contents
    #[error("Inconsistent page: {0}")]
    InconsistentPage(String),
}

/// Extracts the numeric id at the end of a resource URL
///
/// Trailing slashes are tolerated: both `.../episode/42` and
/// `.../episode/42/` yield `42`. A URL whose last segment is not a number
/// is an error rather than a silent default.
pub fn extract_trailing_id(url: &str) -> Result<EntityId, MappingError> {
    let trimmed = url.trim().trim_end_matches('/');
    let segment = trimmed.rsplit('/').next().unwrap_or_default();

    if segment.is_empty() || !segment.chars().all(|c| c.is_ascii_digit()) {
        return Err(MappingError::MalformedId(url.to_string()));
    }

    segment
        .parse()
        .map_err(|_| MappingError::MalformedId(url.to_string()))
}

/// Splits an episode code such as `S01E05` into `(season, episode)`
///
/// This is a format contract of the upstream API, not a general parser:
/// all digits of the code are concatenated, the first two are the season
/// and the remainder is the episode number.
pub fn parse_episode_code(code: &str) -> Result<(u32, u32), MappingError> {
    let digits: String = code.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 3 {
        return Err(MappingError::MalformedEpisodeCode(code.to_string()));
    }

    let (season, episode) = digits.split_at(2);
    let malformed = |_| MappingError::MalformedEpisodeCode(code.to_string());
    Ok((season.parse().map_err(malformed)?, episode.parse().map_err(malformed)?))
}

fn extract_ids(urls: &[String]) -> Result<Vec<EntityId>, MappingError> {
    urls.iter().map(|url| extract_trailing_id(url)).collect()
}

pub(super) fn character_from_remote(remote: RemoteCharacter) -> Result<Character, MappingError> {
    Ok(Character {
        episode_ids: extract_ids(&remote.episode)?,
        id: remote.id,
        name: remote.name,
        status: CharacterStatus::parse(&remote.status),
        species: remote.species,
        kind: remote.kind,
        gender: CharacterGender::parse(&remote.gender),
        origin: Place {
            name: remote.origin.name,
            url: remote.origin.url,
        },
        location: Place {
            name: remote.location.name,
            url: remote.location.url,
        },
        image_url: remote.image,
        url: remote.url,
        created: remote.created,
    })
}

pub(super) fn episode_from_remote(remote: RemoteEpisode) -> Result<Episode, MappingError> {
    let (season_number, episode_number) = parse_episode_code(&remote.episode)?;
    Ok(Episode {
        id: remote.id,
        name: remote.name,
        air_date: remote.air_date,
        season_number,
        episode_number,
        character_ids: extract_ids(&remote.characters)?,
    })
}

impl<E: Entity> Page<E> {
    /// Maps a raw page, validating its metadata against its contents
    pub fn from_remote(remote: RemotePage<E::Remote>) -> Result<Self, MappingError> {
        let info = remote.info;

        if remote.results.len() > info.count as usize {
            return Err(MappingError::InconsistentPage(format!(
                "{} results exceed total count {}",
                remote.results.len(),
                info.count
            )));
        }
        if info.count > 0 && info.pages == 0 {
            return Err(MappingError::InconsistentPage(format!(
                "count {} but zero pages",
                info.count
            )));
        }

        let results = remote
            .results
            .into_iter()
            .map(E::from_remote)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page {
            info: PageInfo {
                count: info.count,
                pages: info.pages,
                next: info.next,
                prev: info.prev,
            },
            results,
        })
    }
}
