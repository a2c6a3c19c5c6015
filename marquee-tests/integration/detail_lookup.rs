//! Cache-fronted detail lookups over HTTP.

use std::sync::Arc;

use marquee_core::catalog::{ApiError, HttpStatus};
use marquee_core::{DetailCache, MovieDetailsService};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{client_for, details_json};

fn service_for(server: &MockServer, capacity: usize) -> MovieDetailsService {
    MovieDetailsService::new(
        Arc::new(client_for(server)),
        Arc::new(DetailCache::new(capacity)),
    )
}

#[tokio::test]
async fn test_repeated_lookup_hits_network_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/movie/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(details_json(42)))
        .expect(1)
        .mount(&server)
        .await;
    let service = service_for(&server, 50);

    let first = service.movie_details(42).await.unwrap();
    let second = service.movie_details(42).await.unwrap();

    assert_eq!(first, second);
    let stats = service.cache().statistics();
    assert_eq!(stats.hit_count, 1);
    assert_eq!(stats.miss_count, 1);
}

#[tokio::test]
async fn test_failed_lookup_is_retried_remotely() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/movie/99"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;
    let service = service_for(&server, 50);

    for _ in 0..2 {
        match service.movie_details(99).await.unwrap_err() {
            ApiError::Http(http) => assert_eq!(http.status, HttpStatus::ServiceUnavailable),
            other => panic!("unexpected error: {other:?}"),
        }
    }
    assert!(!service.cache().contains(99));
}

#[tokio::test]
async fn test_evicted_entry_is_fetched_again() {
    let server = MockServer::start().await;
    for (id, calls) in [(1u32, 2u64), (2, 1), (3, 1)] {
        Mock::given(method("GET"))
            .and(path(format!("/3/movie/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(details_json(id)))
            .expect(calls)
            .mount(&server)
            .await;
    }
    let service = service_for(&server, 2);

    service.movie_details(1).await.unwrap();
    service.movie_details(2).await.unwrap();
    service.movie_details(3).await.unwrap();
    service.movie_details(1).await.unwrap();

    assert_eq!(service.cache().statistics().eviction_count, 2);
}

#[tokio::test]
async fn test_concurrent_lookups_for_different_ids() {
    let server = MockServer::start().await;
    for id in 1..=10u32 {
        Mock::given(method("GET"))
            .and(path(format!("/3/movie/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(details_json(id)))
            .mount(&server)
            .await;
    }
    let service = service_for(&server, 50);

    let lookups = (1..=10u32).map(|id| {
        let service = service.clone();
        async move { service.movie_details(id).await }
    });
    let results = futures::future::join_all(lookups).await;

    assert!(results.iter().all(Result::is_ok));
    assert_eq!(service.cache().len(), 10);
}
