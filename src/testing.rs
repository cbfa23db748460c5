//! Test doubles and JSON fixtures shared by the unit tests.

use crate::transport::{QueryParams, Transport, TransportError};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::time::Duration;

type Route = Box<dyn Fn(&str, &QueryParams) -> Result<Value, TransportError> + Send + Sync>;
type Latency = Box<dyn Fn(&str, &QueryParams) -> Duration + Send + Sync>;

/// Scripted transport recording every call it receives
pub(crate) struct FakeTransport {
    route: Route,
    latency: Latency,
    calls: Mutex<Vec<(String, QueryParams)>>,
}

impl FakeTransport {
    pub fn new<F>(route: F) -> Self
    where
        F: Fn(&str, &QueryParams) -> Result<Value, TransportError> + Send + Sync + 'static,
    {
        Self {
            route: Box::new(route),
            latency: Box::new(|_, _| Duration::ZERO),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Serves `items` of `resource` in pages of `page_size`, 404 beyond the last page
    pub fn paged(resource: &'static str, items: Vec<Value>, page_size: usize) -> Self {
        Self::new(move |path, query| {
            if path != resource {
                return Err(TransportError::NotFound(path.to_string()));
            }
            serve_page(&items, page_param(query), page_size)
        })
    }

    pub fn with_latency<F>(mut self, latency: F) -> Self
    where
        F: Fn(&str, &QueryParams) -> Duration + Send + Sync + 'static,
    {
        self.latency = Box::new(latency);
        self
    }

    pub fn calls(&self) -> Vec<(String, QueryParams)> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Page numbers requested so far, in call order
    pub fn requested_pages(&self) -> Vec<u32> {
        self.calls
            .lock()
            .iter()
            .map(|(_, query)| page_param(query))
            .collect()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(&self, path: &str, query: &QueryParams) -> Result<Value, TransportError> {
        self.calls.lock().push((path.to_string(), query.clone()));

        let delay = (self.latency)(path, query);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        (self.route)(path, query)
    }
}

pub(crate) fn page_param(query: &QueryParams) -> u32 {
    query
        .get("page")
        .and_then(|page| page.parse().ok())
        .unwrap_or(1)
}

/// Slices `items` into the requested page, mimicking the API's page envelope
pub(crate) fn serve_page(
    items: &[Value],
    page: u32,
    page_size: usize,
) -> Result<Value, TransportError> {
    let pages = items.len().div_ceil(page_size).max(1);
    let index = page.max(1) as usize - 1;
    if index >= pages {
        return Err(TransportError::NotFound(format!("page {}", page)));
    }

    let start = index * page_size;
    let end = (start + page_size).min(items.len());
    Ok(page_json(
        items.len() as u32,
        pages as u32,
        items[start..end].to_vec(),
    ))
}

pub(crate) fn page_json(count: u32, pages: u32, results: Vec<Value>) -> Value {
    json!({
        "info": { "count": count, "pages": pages, "next": null, "prev": null },
        "results": results,
    })
}

pub(crate) fn character_json(id: u32, name: &str, status: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "status": status,
        "species": "Human",
        "type": "",
        "gender": "Male",
        "origin": { "name": "Earth (C-137)", "url": "https://rickandmortyapi.com/api/location/1" },
        "location": { "name": "Citadel of Ricks", "url": "https://rickandmortyapi.com/api/location/3" },
        "image": format!("https://rickandmortyapi.com/api/character/avatar/{}.jpeg", id),
        "episode": [
            "https://rickandmortyapi.com/api/episode/1",
            "https://rickandmortyapi.com/api/episode/2",
        ],
        "url": format!("https://rickandmortyapi.com/api/character/{}", id),
        "created": "2017-11-04T18:48:46.250Z",
    })
}

pub(crate) fn episode_json(id: u32, name: &str, code: &str, character_ids: &[u32]) -> Value {
    let characters: Vec<String> = character_ids
        .iter()
        .map(|id| format!("https://rickandmortyapi.com/api/character/{}", id))
        .collect();
    json!({
        "id": id,
        "name": name,
        "air_date": "December 2, 2013",
        "episode": code,
        "characters": characters,
        "url": format!("https://rickandmortyapi.com/api/episode/{}", id),
        "created": "2017-11-10T12:56:33.798Z",
    })
}

/// `count` characters named `Character <id>`, all alive
pub(crate) fn characters(count: u32) -> Vec<Value> {
    (1..=count)
        .map(|id| character_json(id, &format!("Character {}", id), "Alive"))
        .collect()
}
