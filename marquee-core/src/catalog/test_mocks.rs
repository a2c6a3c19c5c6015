//! Scripted catalog for tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::error::{ApiError, ApiResult, HttpError, HttpStatus};
use super::types::{Genre, Movie, MovieDetails, Page};
use super::MovieCatalog;

/// A call observed by [`MockCatalog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogCall {
    NowPlaying(u32),
    Details(u32),
    Search(String, u32),
}

#[derive(Debug, Default)]
struct MockState {
    pages: HashMap<u32, ApiResult<Page<Movie>>>,
    details: HashMap<u32, ApiResult<MovieDetails>>,
    searches: HashMap<String, ApiResult<Vec<Movie>>>,
    page_delays: HashMap<u32, Duration>,
    search_delays: HashMap<String, Duration>,
    delay: Duration,
    calls: Vec<CatalogCall>,
}

/// Catalog returning scripted results and recording every call.
///
/// Unscripted pages and details resolve to HTTP 404, unscripted searches to
/// an empty result list. Delays are served with `tokio::time::sleep`, so tests
/// running on a paused clock stay deterministic.
#[derive(Debug, Clone, Default)]
pub struct MockCatalog {
    state: Arc<Mutex<MockState>>,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog serving `total_pages` now-playing pages of `per_page` movies.
    ///
    /// Movie ids are sequential across pages, starting at 1.
    pub fn with_pages(total_pages: u32, per_page: u32) -> Self {
        let catalog = Self::new();
        for page_number in 1..=total_pages {
            let first_id = (page_number - 1) * per_page + 1;
            let movies = (first_id..first_id + per_page).map(movie).collect();
            catalog.set_page(page_number, Ok(Page::new(movies, page_number, total_pages)));
        }
        catalog
    }

    pub fn set_page(&self, page: u32, result: ApiResult<Page<Movie>>) {
        self.state.lock().pages.insert(page, result);
    }

    pub fn set_details(&self, id: u32, result: ApiResult<MovieDetails>) {
        self.state.lock().details.insert(id, result);
    }

    pub fn set_search(&self, query: &str, result: ApiResult<Vec<Movie>>) {
        self.state.lock().searches.insert(query.to_string(), result);
    }

    /// Delay applied to every call without a more specific delay.
    pub fn set_delay(&self, delay: Duration) {
        self.state.lock().delay = delay;
    }

    pub fn set_page_delay(&self, page: u32, delay: Duration) {
        self.state.lock().page_delays.insert(page, delay);
    }

    pub fn set_search_delay(&self, query: &str, delay: Duration) {
        self.state.lock().search_delays.insert(query.to_string(), delay);
    }

    /// Every call received so far, in arrival order.
    pub fn calls(&self) -> Vec<CatalogCall> {
        self.state.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().calls.len()
    }

    pub fn search_queries(&self) -> Vec<String> {
        self.state
            .lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                CatalogCall::Search(query, _) => Some(query.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: CatalogCall) -> Duration {
        let mut state = self.state.lock();
        let delay = match &call {
            CatalogCall::NowPlaying(page) => state.page_delays.get(page).copied(),
            CatalogCall::Search(query, _) => state.search_delays.get(query).copied(),
            CatalogCall::Details(_) => None,
        }
        .unwrap_or(state.delay);
        state.calls.push(call);
        delay
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

fn not_found() -> ApiError {
    ApiError::Http(HttpError::new(HttpStatus::NotFound, None))
}

#[async_trait]
impl MovieCatalog for MockCatalog {
    async fn now_playing(&self, page: u32) -> ApiResult<Page<Movie>> {
        pause(self.record(CatalogCall::NowPlaying(page))).await;
        self.state
            .lock()
            .pages
            .get(&page)
            .cloned()
            .unwrap_or_else(|| Err(not_found()))
    }

    async fn movie_details(&self, id: u32) -> ApiResult<MovieDetails> {
        pause(self.record(CatalogCall::Details(id))).await;
        self.state
            .lock()
            .details
            .get(&id)
            .cloned()
            .unwrap_or_else(|| Err(not_found()))
    }

    async fn search(&self, query: &str, page: u32) -> ApiResult<Vec<Movie>> {
        pause(self.record(CatalogCall::Search(query.to_string(), page))).await;
        self.state
            .lock()
            .searches
            .get(query)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Movie summary fixture.
pub fn movie(id: u32) -> Movie {
    Movie {
        id,
        title: format!("Movie {id}"),
        overview: format!("Overview of movie {id}"),
        poster_path: Some(format!("/poster{id}.jpg")),
        backdrop_path: None,
        vote_average: 7.5,
        vote_count: 100 + id,
        release_date: Some("2024-05-17".to_string()),
    }
}

/// Movie details fixture.
pub fn movie_details(id: u32) -> MovieDetails {
    MovieDetails {
        id,
        title: format!("Movie {id}"),
        overview: format!("Overview of movie {id}"),
        poster_path: Some(format!("/poster{id}.jpg")),
        backdrop_path: Some(format!("/backdrop{id}.jpg")),
        vote_average: 8.1,
        vote_count: 2048,
        release_date: Some("2023-11-03".to_string()),
        runtime: Some(125),
        status: "Released".to_string(),
        tagline: None,
        budget: 90_000_000,
        revenue: 0,
        genres: vec![Genre {
            id: 18,
            name: "Drama".to_string(),
        }],
        production_companies: Vec::new(),
        spoken_languages: Vec::new(),
    }
}
