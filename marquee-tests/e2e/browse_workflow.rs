//! Browsing workflows from listing to details to search.

use std::sync::Arc;
use std::time::Duration;

use marquee_core::catalog::{ApiError, HttpStatus, MovieCatalog, NetworkError};
use marquee_core::config::{MarqueeConfig, SearchConfig};
use marquee_core::paging::spawn_pager;
use marquee_core::{DetailCache, MovieDetailsService};
use marquee_search::{SearchState, spawn_search};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{client_for, details_json, list_json, unreachable_client, within};

#[tokio::test]
async fn test_first_listing_page_exposes_next_key_only() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/movie/now_playing"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_json([11, 12, 13], 1, 5)))
        .expect(1)
        .mount(&server)
        .await;

    let pager = spawn_pager(
        Arc::new(client_for(&server)),
        MarqueeConfig::default().paging,
    );
    let mut snapshots = pager.subscribe();
    let snapshot = within(snapshots.wait_for(|s| !s.items.is_empty() && s.is_idle()))
        .await
        .unwrap()
        .clone();

    assert_eq!(snapshot.items.len(), 3);
    assert_eq!(snapshot.pages.len(), 1);
    assert_eq!(snapshot.pages[0].key, 1);
    assert_eq!(snapshot.pages[0].next_key, Some(2));
    assert_eq!(snapshot.pages[0].prev_key, None);
}

#[tokio::test]
async fn test_opening_same_movie_twice_uses_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/movie/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(details_json(42)))
        .expect(1)
        .mount(&server)
        .await;
    let service = MovieDetailsService::new(
        Arc::new(client_for(&server)),
        Arc::new(DetailCache::default()),
    );

    let first = service.movie_details(42).await.unwrap();
    assert!(service.cache().contains(42));

    let second = service.movie_details(42).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(server.received_requests().await.unwrap_or_default().len(), 1);
}

#[tokio::test]
async fn test_empty_query_is_idle_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/search/movie"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_json([], 1, 1)))
        .expect(0)
        .mount(&server)
        .await;
    let search = spawn_search(Arc::new(client_for(&server)), SearchConfig::default());

    search.set_query("ba").await.unwrap();
    search.set_query("").await.unwrap();
    assert_eq!(search.query().await.unwrap(), "");
    assert_eq!(search.state(), SearchState::Idle);

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(search.state(), SearchState::Idle);
}

#[tokio::test]
async fn test_query_goes_loading_then_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/search/movie"))
        .and(query_param("query", "batman"))
        .and(query_param("include_adult", "false"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(list_json([268, 414], 1, 1))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;
    let search = spawn_search(Arc::new(client_for(&server)), SearchConfig::default());
    let mut states = search.subscribe();

    search.set_query("batman").await.unwrap();

    within(states.wait_for(SearchState::is_loading)).await.unwrap();
    let state = within(states.wait_for(|s| matches!(s, SearchState::Success(_))))
        .await
        .unwrap()
        .clone();
    let ids: Vec<u32> = state.results().unwrap_or_default().iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![268, 414]);
}

#[tokio::test]
async fn test_unknown_movie_is_not_found_and_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/movie/99"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "status_code": 34,
            "status_message": "The resource you requested could not be found."
        })))
        .mount(&server)
        .await;
    let service = MovieDetailsService::new(
        Arc::new(client_for(&server)),
        Arc::new(DetailCache::default()),
    );

    let error = service.movie_details(99).await.unwrap_err();

    match &error {
        ApiError::Http(http) => {
            assert_eq!(http.status, HttpStatus::NotFound);
            assert_eq!(http.status_code(), 404);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!service.cache().contains(99));
    assert!(service.cache().is_empty());
}

#[tokio::test]
async fn test_unresolvable_host_is_no_connection_everywhere() {
    let client = unreachable_client("http://catalog.marquee.invalid/3/");
    let no_connection = ApiError::Network(NetworkError::NoConnection);

    assert_eq!(client.now_playing(1).await.unwrap_err(), no_connection);
    assert_eq!(client.movie_details(42).await.unwrap_err(), no_connection);
    assert_eq!(client.search("batman", 1).await.unwrap_err(), no_connection);
}
