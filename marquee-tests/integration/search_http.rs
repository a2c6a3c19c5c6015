//! Search orchestrator over HTTP.

use std::sync::Arc;
use std::time::Duration;

use marquee_core::config::SearchConfig;
use marquee_search::{SearchHandle, SearchState, spawn_search};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{client_for, list_json, within};

fn fast_config() -> SearchConfig {
    SearchConfig {
        debounce: Duration::from_millis(50),
        ..SearchConfig::default()
    }
}

async fn settled(search: &SearchHandle) -> SearchState {
    let mut states = search.subscribe();
    within(states.wait_for(|s| matches!(s, SearchState::Success(_) | SearchState::Error(_))))
        .await
        .unwrap()
        .clone()
}

#[tokio::test]
async fn test_settled_query_is_searched_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/search/movie"))
        .and(query_param("query", "alien"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_json([348, 679], 1, 1)))
        .expect(1)
        .mount(&server)
        .await;
    let search = spawn_search(Arc::new(client_for(&server)), fast_config());

    for query in ["a", "al", "ali", "alie", "alien"] {
        search.set_query(query).await.unwrap();
    }

    match settled(&search).await {
        SearchState::Success(movies) => {
            let ids: Vec<u32> = movies.iter().map(|m| m.id).collect();
            assert_eq!(ids, vec![348, 679]);
        }
        other => panic!("unexpected state: {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_becomes_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/search/movie"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    let search = spawn_search(Arc::new(client_for(&server)), fast_config());

    search.set_query("alien").await.unwrap();

    match settled(&search).await {
        SearchState::Error(message) => assert!(!message.is_empty()),
        other => panic!("unexpected state: {other:?}"),
    }
}

#[tokio::test]
async fn test_superseded_search_never_publishes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/search/movie"))
        .and(query_param("query", "slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(list_json([1], 1, 1))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/3/search/movie"))
        .and(query_param("query", "fast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_json([2], 1, 1)))
        .mount(&server)
        .await;
    let search = spawn_search(Arc::new(client_for(&server)), fast_config());

    search.set_query("slow").await.unwrap();
    let mut states = search.subscribe();
    within(states.wait_for(SearchState::is_loading)).await.unwrap();
    search.set_query("fast").await.unwrap();

    let settled_state = settled(&search).await;
    tokio::time::sleep(Duration::from_millis(800)).await;

    assert_eq!(settled_state.results().map(|m| m[0].id), Some(2));
    assert_eq!(search.state(), settled_state);
}
