//! Shared fixtures for tests running against a mock catalog server.

#![allow(dead_code)]

use std::future::Future;
use std::time::Duration;

use marquee_core::catalog::CatalogClient;
use marquee_core::config::{ApiConfig, MarqueeConfig};
use serde_json::{Value, json};
use wiremock::MockServer;

pub const API_KEY: &str = "test-api-key";

/// API configuration pointing at `server`.
pub fn api_config(server: &MockServer) -> ApiConfig {
    ApiConfig {
        base_url: format!("{}/3/", server.uri()),
        api_key: API_KEY.to_string(),
        ..MarqueeConfig::for_testing().api
    }
}

pub fn client_for(server: &MockServer) -> CatalogClient {
    CatalogClient::from_config(&api_config(server)).unwrap()
}

/// Client for an address nothing listens on.
pub fn unreachable_client(base_url: &str) -> CatalogClient {
    let config = ApiConfig {
        base_url: base_url.to_string(),
        ..MarqueeConfig::for_testing().api
    };
    CatalogClient::from_config(&config).unwrap()
}

pub fn movie_json(id: u32) -> Value {
    json!({
        "id": id,
        "title": format!("Movie {id}"),
        "overview": format!("Overview of movie {id}"),
        "poster_path": format!("/poster{id}.jpg"),
        "backdrop_path": null,
        "vote_average": 7.25,
        "vote_count": 100 + id,
        "release_date": "2024-05-17",
        "adult": false,
        "popularity": 123.4
    })
}

pub fn list_json(ids: impl IntoIterator<Item = u32>, page: u32, total_pages: u32) -> Value {
    let results: Vec<Value> = ids.into_iter().map(movie_json).collect();
    json!({
        "page": page,
        "total_results": results.len() as u32 * total_pages,
        "results": results,
        "total_pages": total_pages,
        "dates": { "maximum": "2024-06-01", "minimum": "2024-04-20" }
    })
}

pub fn details_json(id: u32) -> Value {
    json!({
        "id": id,
        "title": format!("Movie {id}"),
        "overview": "A long night in a small town.",
        "poster_path": "/poster.jpg",
        "backdrop_path": "/backdrop.jpg",
        "vote_average": 8.1,
        "vote_count": 2048,
        "release_date": "2023-11-03",
        "runtime": 125,
        "status": "Released",
        "tagline": null,
        "budget": 90000000,
        "revenue": 0,
        "genres": [{ "id": 18, "name": "Drama" }, { "id": 53, "name": "Thriller" }],
        "production_companies": [
            { "id": 7, "name": "Nightfall Pictures", "logo_path": null, "origin_country": "US" }
        ],
        "spoken_languages": [{ "iso_639_1": "en", "english_name": "English", "name": "English" }],
        "homepage": "https://example.com",
        "imdb_id": "tt0000001"
    })
}

/// Awaits `future`, failing the test if it takes longer than five seconds.
pub async fn within<F: Future>(future: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(5), future)
        .await
        .expect("timed out waiting for catalog activity")
}
