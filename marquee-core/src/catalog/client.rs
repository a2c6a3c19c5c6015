//! Stateless translation between catalog endpoints and [`ApiResult`] values.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::classify::{FailureCause, classify};
use super::error::ApiResult;
use super::transport::{ApiRequest, HttpTransport, RawResponse, Transport};
use super::types::{Movie, MovieDetails, MovieListResponse, Page};
use super::MovieCatalog;
use crate::config::ApiConfig;

const NOW_PLAYING_PATH: &str = "movie/now_playing";
const SEARCH_PATH: &str = "search/movie";

/// Catalog client issuing exactly one transport call per operation.
///
/// Holds no cache, no pagination state and never retries.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    transport: Arc<dyn Transport>,
    language: String,
}

impl CatalogClient {
    /// Creates a client over the production HTTP transport.
    ///
    /// # Errors
    /// - `ApiError::Unknown` - Base URL is invalid or the HTTP client could not be built
    pub fn from_config(config: &ApiConfig) -> ApiResult<Self> {
        let transport = HttpTransport::new(config).map_err(classify)?;
        Ok(Self::new(Arc::new(transport), config.language.clone()))
    }

    /// Creates a client over an arbitrary transport.
    pub fn new(transport: Arc<dyn Transport>, language: impl Into<String>) -> Self {
        Self {
            transport,
            language: language.into(),
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> ApiResult<T> {
        let path = request.path.clone();
        let outcome = match self.transport.send_request(request).await {
            Ok(response) => decode_response(response),
            Err(cause) => Err(cause),
        };

        outcome.map_err(|cause| {
            let error = classify(cause);
            tracing::warn!("Catalog request to {path} failed: {error}");
            error
        })
    }
}

/// Checks the status, then decodes the body.
fn decode_response<T: DeserializeOwned>(response: RawResponse) -> Result<T, FailureCause> {
    if !response.is_success() {
        return Err(FailureCause::Status {
            code: response.status,
            status_message: response.status_text,
        });
    }

    serde_json::from_slice(&response.body).map_err(FailureCause::from)
}

#[async_trait]
impl MovieCatalog for CatalogClient {
    async fn now_playing(&self, page: u32) -> ApiResult<Page<Movie>> {
        let request = ApiRequest::get(NOW_PLAYING_PATH)
            .with_query("page", page)
            .with_query("language", &self.language);

        let response: MovieListResponse = self.fetch(request).await?;
        Ok(Page::from(response))
    }

    async fn movie_details(&self, id: u32) -> ApiResult<MovieDetails> {
        let request =
            ApiRequest::get(format!("movie/{id}")).with_query("language", &self.language);

        self.fetch(request).await
    }

    async fn search(&self, query: &str, page: u32) -> ApiResult<Vec<Movie>> {
        let request = ApiRequest::get(SEARCH_PATH)
            .with_query("query", query)
            .with_query("page", page)
            .with_query("language", &self.language)
            .with_query("include_adult", false);

        let response: MovieListResponse = self.fetch(request).await?;
        Ok(response.results)
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;
    use crate::catalog::error::{ApiError, HttpError, HttpStatus, NetworkError};

    /// Transport replaying one canned outcome and recording requests.
    #[derive(Debug)]
    struct CannedTransport {
        outcome: Result<RawResponse, FailureCause>,
        requests: Mutex<Vec<ApiRequest>>,
    }

    impl CannedTransport {
        fn new(outcome: Result<RawResponse, FailureCause>) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Transport for CannedTransport {
        async fn send_request(&self, request: ApiRequest) -> Result<RawResponse, FailureCause> {
            self.requests.lock().push(request);
            self.outcome.clone()
        }
    }

    fn client_over(transport: Arc<CannedTransport>) -> CatalogClient {
        CatalogClient::new(transport, "en-US")
    }

    #[tokio::test]
    async fn test_now_playing_wraps_page() {
        let body = r#"{"page":1,"results":[{"id":1,"title":"A"},{"id":2,"title":"B"},{"id":3,"title":"C"}],"total_pages":5,"total_results":60}"#;
        let transport = CannedTransport::new(Ok(RawResponse::new(200, body)));
        let client = client_over(transport.clone());

        let page = client.now_playing(1).await.unwrap();
        assert_eq!(page.items.len(), 3);
        assert_eq!(page.page_number, 1);
        assert_eq!(page.total_pages, 5);

        let requests = transport.requests.lock();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].path, "movie/now_playing");
        assert_eq!(requests[0].query_value("page"), Some("1"));
        assert_eq!(requests[0].query_value("language"), Some("en-US"));
    }

    #[tokio::test]
    async fn test_search_excludes_adult_content() {
        let body = r#"{"page":1,"results":[],"total_pages":1,"total_results":0}"#;
        let transport = CannedTransport::new(Ok(RawResponse::new(200, body)));
        let client = client_over(transport.clone());

        let movies = client.search("batman", 1).await.unwrap();
        assert!(movies.is_empty());

        let requests = transport.requests.lock();
        assert_eq!(requests[0].query_value("query"), Some("batman"));
        assert_eq!(requests[0].query_value("include_adult"), Some("false"));
    }

    #[tokio::test]
    async fn test_error_status_is_classified() {
        let mut response = RawResponse::new(404, r#"{"status_code":34}"#);
        response.status_text = Some("Not Found".to_string());
        let client = client_over(CannedTransport::new(Ok(response)));

        let error = client.movie_details(99).await.unwrap_err();
        assert_eq!(
            error,
            ApiError::Http(HttpError::new(
                HttpStatus::NotFound,
                Some("Not Found".to_string())
            ))
        );
    }

    #[tokio::test]
    async fn test_malformed_body_is_serialization_error() {
        let client = client_over(CannedTransport::new(Ok(RawResponse::new(200, "<html>"))));

        let error = client.movie_details(1).await.unwrap_err();
        assert!(matches!(error, ApiError::Serialization { .. }));
    }

    #[tokio::test]
    async fn test_transport_failure_is_classified() {
        let client = client_over(CannedTransport::new(Err(FailureCause::Connectivity {
            message: "dns error: failed to lookup address".to_string(),
        })));

        let error = client.search("alien", 1).await.unwrap_err();
        assert_eq!(error, ApiError::Network(NetworkError::NoConnection));
    }
}
