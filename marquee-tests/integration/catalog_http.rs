//! Catalog client against a mock HTTP catalog.

use std::time::Duration;

use marquee_core::catalog::{
    ApiError, CatalogClient, HttpFamily, HttpStatus, MovieCatalog, NetworkError,
};
use marquee_core::config::{ApiConfig, MarqueeConfig};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{API_KEY, api_config, client_for, details_json, list_json};

#[tokio::test]
async fn test_now_playing_sends_credential_language_and_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/movie/now_playing"))
        .and(query_param("page", "2"))
        .and(query_param("language", "en-US"))
        .and(query_param("api_key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_json(21..=40, 2, 7)))
        .expect(1)
        .mount(&server)
        .await;

    let page = client_for(&server).now_playing(2).await.unwrap();

    assert_eq!(page.items.len(), 20);
    assert_eq!(page.items[0].id, 21);
    assert_eq!(page.page_number, 2);
    assert_eq!(page.total_pages, 7);
    assert!(page.has_next());
    assert!(page.has_previous());
}

#[tokio::test]
async fn test_search_excludes_adult_content() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/search/movie"))
        .and(query_param("query", "the thing"))
        .and(query_param("page", "1"))
        .and(query_param("include_adult", "false"))
        .and(query_param("api_key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_json([1091], 1, 1)))
        .expect(1)
        .mount(&server)
        .await;

    let movies = client_for(&server).search("the thing", 1).await.unwrap();

    assert_eq!(movies.len(), 1);
    assert_eq!(movies[0].id, 1091);
}

#[tokio::test]
async fn test_details_tolerate_unknown_and_null_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/movie/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(details_json(42)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/3/movie/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7,
            "title": null,
            "vote_average": null,
            "genres": null,
            "belongs_to_collection": { "id": 1, "name": "Saga" }
        })))
        .mount(&server)
        .await;
    let client = client_for(&server);

    let details = client.movie_details(42).await.unwrap();
    assert_eq!(details.runtime, Some(125));
    assert_eq!(details.tagline, None);
    assert_eq!(details.genres.len(), 2);
    assert_eq!(details.production_companies[0].logo_path, None);
    assert_eq!(details.spoken_languages[0].iso_639_1, "en");

    let sparse = client.movie_details(7).await.unwrap();
    assert_eq!(sparse.title, "");
    assert_eq!(sparse.vote_average, 0.0);
    assert!(sparse.genres.is_empty());
    assert_eq!(sparse.runtime, None);
}

#[tokio::test]
async fn test_error_statuses_are_classified_by_code() {
    let server = MockServer::start().await;
    let codes = [400u16, 401, 403, 404, 418, 429, 451, 500, 502, 503, 504, 507, 599];
    for code in codes {
        Mock::given(method("GET"))
            .and(path(format!("/3/movie/{code}")))
            .respond_with(ResponseTemplate::new(code).set_body_json(json!({
                "status_code": 7,
                "status_message": "Invalid API key",
                "success": false
            })))
            .mount(&server)
            .await;
    }
    let client = client_for(&server);

    for code in codes {
        let http = match client.movie_details(u32::from(code)).await.unwrap_err() {
            ApiError::Http(http) => http,
            other => panic!("expected HTTP error for {code}, got {other:?}"),
        };

        assert_eq!(http.status_code(), code);
        let expected_family = if code < 500 {
            HttpFamily::Client
        } else {
            HttpFamily::Server
        };
        assert_eq!(http.family(), expected_family);

        let named = matches!(code, 400 | 401 | 403 | 404 | 429 | 500 | 502 | 503 | 504);
        let generic = matches!(
            http.status,
            HttpStatus::GenericClient(_) | HttpStatus::GenericServer(_)
        );
        assert_eq!(named, !generic, "wrong sub-kind for {code}");
    }
}

#[tokio::test]
async fn test_malformed_payload_is_serialization_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/movie/now_playing"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/3/search/movie"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": "nope" })))
        .mount(&server)
        .await;
    let client = client_for(&server);

    let listing = client.now_playing(1).await.unwrap_err();
    assert!(matches!(listing, ApiError::Serialization { .. }));
    assert!(!listing.is_retryable());

    let search = client.search("alien", 1).await.unwrap_err();
    assert!(matches!(search, ApiError::Serialization { .. }));
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/movie/1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(details_json(1))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    let config = ApiConfig {
        read_timeout: Duration::from_millis(200),
        ..api_config(&server)
    };
    let client = CatalogClient::from_config(&config).unwrap();

    let error = client.movie_details(1).await.unwrap_err();

    assert_eq!(error, ApiError::Network(NetworkError::Timeout));
    assert!(error.is_retryable());
}

#[tokio::test]
async fn test_refused_connection_is_no_connection() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let client = crate::common::unreachable_client(&format!("http://127.0.0.1:{port}/3/"));

    assert_eq!(
        client.now_playing(1).await.unwrap_err(),
        ApiError::Network(NetworkError::NoConnection)
    );
}

#[tokio::test]
async fn test_stalled_connect_is_timeout() {
    let socket = tokio::net::TcpSocket::new_v4().unwrap();
    socket.bind("127.0.0.1:0".parse().unwrap()).unwrap();
    let listener = socket.listen(0).unwrap();
    let addr = listener.local_addr().unwrap();

    // Fill the accept backlog so the next handshake never completes.
    let mut held = Vec::new();
    for _ in 0..16 {
        let attempt = tokio::time::timeout(
            Duration::from_millis(100),
            tokio::net::TcpStream::connect(addr),
        )
        .await;
        match attempt {
            Ok(Ok(stream)) => held.push(stream),
            _ => break,
        }
    }

    let config = ApiConfig {
        base_url: format!("http://{addr}/3/"),
        connect_timeout: Duration::from_millis(300),
        read_timeout: Duration::from_secs(5),
        ..MarqueeConfig::for_testing().api
    };
    let client = CatalogClient::from_config(&config).unwrap();

    let error = client.movie_details(1).await.unwrap_err();

    assert_eq!(error, ApiError::Network(NetworkError::Timeout));
    drop(held);
    drop(listener);
}

#[tokio::test]
async fn test_every_error_has_a_user_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/movie/404"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let error = client_for(&server).movie_details(404).await.unwrap_err();

    assert!(!error.user_message().is_empty());
    assert!(!error.to_string().is_empty());
}
