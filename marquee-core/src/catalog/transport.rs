//! Request transport for the catalog API.
//!
//! [`Transport`] is the seam between the catalog client and the network. The
//! production [`HttpTransport`] attaches the API credential to every request
//! and enforces the configured connect and read timeouts.

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use super::classify::FailureCause;
use crate::config::ApiConfig;

/// Query parameter carrying the static API credential.
pub const API_KEY_PARAM: &str = "api_key";

/// HTTP method of an [`ApiRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
}

/// Outgoing catalog request, relative to the configured base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl ApiRequest {
    /// Creates a GET request for `path`.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            query: Vec::new(),
        }
    }

    /// Appends a query parameter.
    pub fn with_query(mut self, name: &str, value: impl ToString) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    /// Looks up the first value of a query parameter.
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

impl fmt::Display for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {}", self.method, self.path)?;
        for (index, (name, value)) in self.query.iter().enumerate() {
            let separator = if index == 0 { '?' } else { '&' };
            write!(f, "{separator}{name}={}", urlencoding::encode(value))?;
        }
        Ok(())
    }
}

/// Response as received from the wire, before status checks or decoding.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub status_text: Option<String>,
    pub body: Bytes,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            status_text: None,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes catalog requests.
///
/// Implementations return `Ok` for any response that arrived, whatever its
/// status; `Err` is reserved for failures before a response was received.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Sends one request.
    ///
    /// # Errors
    /// - `FailureCause::Connectivity` - Host could not be resolved or reached
    /// - `FailureCause::Timeout` - Connect or read deadline elapsed
    /// - `FailureCause::Io` - Connection failed mid-request
    async fn send_request(&self, request: ApiRequest) -> Result<RawResponse, FailureCause>;
}

/// reqwest-backed transport used in production.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: Url,
    api_key: String,
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport from API configuration.
    ///
    /// # Errors
    /// - `FailureCause::Other` - Base URL is invalid or the HTTP client could not be built
    pub fn new(config: &ApiConfig) -> Result<Self, FailureCause> {
        let base_url = parse_base_url(&config.base_url)?;

        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .user_agent(config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(3))
            .build()
            .map_err(|e| FailureCause::Other {
                message: format!("HTTP client creation failed: {e}"),
            })?;

        Ok(Self {
            base_url,
            api_key: config.api_key.clone(),
            client,
        })
    }

    /// Resolves a request into its absolute URL, credential included.
    pub fn build_url(&self, request: &ApiRequest) -> Result<Url, FailureCause> {
        let mut url = self
            .base_url
            .join(request.path.trim_start_matches('/'))
            .map_err(|e| FailureCause::Other {
                message: format!("Invalid request path '{}': {e}", request.path),
            })?;

        {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &request.query {
                pairs.append_pair(name, value);
            }
            pairs.append_pair(API_KEY_PARAM, &self.api_key);
        }

        Ok(url)
    }
}

/// Parses the base URL, forcing a trailing slash so relative joins keep the
/// version segment (`.../3/` + `movie/1`).
fn parse_base_url(base_url: &str) -> Result<Url, FailureCause> {
    let normalized = if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{base_url}/")
    };

    Url::parse(&normalized).map_err(|e| FailureCause::Other {
        message: format!("Invalid base URL '{base_url}': {e}"),
    })
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send_request(&self, request: ApiRequest) -> Result<RawResponse, FailureCause> {
        let url = self.build_url(&request)?;
        tracing::debug!("Sending catalog request {request}");

        let builder = match request.method {
            Method::Get => self.client.get(url),
        };

        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        tracing::debug!(
            "Catalog responded {} for {} ({} bytes)",
            status.as_u16(),
            request.path,
            body.len()
        );

        Ok(RawResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().map(str::to_string),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn test_config(base_url: &str) -> ApiConfig {
        ApiConfig {
            base_url: base_url.to_string(),
            api_key: "secret".to_string(),
            connect_timeout: Duration::from_secs(1),
            read_timeout: Duration::from_secs(1),
            ..ApiConfig::default()
        }
    }

    #[test]
    fn test_build_url_attaches_credential() {
        let transport = HttpTransport::new(&test_config("https://api.example.com/3")).unwrap();
        let request = ApiRequest::get("movie/now_playing")
            .with_query("page", 2)
            .with_query("language", "en-US");

        let url = transport.build_url(&request).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/3/movie/now_playing?page=2&language=en-US&api_key=secret"
        );
    }

    #[test]
    fn test_build_url_encodes_query_values() {
        let transport = HttpTransport::new(&test_config("https://api.example.com/3/")).unwrap();
        let request = ApiRequest::get("/search/movie").with_query("query", "star wars & co");

        let url = transport.build_url(&request).unwrap();
        assert_eq!(url.path(), "/3/search/movie");
        assert_eq!(
            url.query_pairs().find(|(k, _)| k == "query").unwrap().1,
            "star wars & co"
        );
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let result = HttpTransport::new(&test_config("not a url"));
        assert!(matches!(result, Err(FailureCause::Other { .. })));
    }

    #[test]
    fn test_request_display_omits_credential() {
        let request = ApiRequest::get("search/movie").with_query("query", "la la land");
        let rendered = request.to_string();
        assert_eq!(rendered, "Get search/movie?query=la%20la%20land");
        assert!(!rendered.contains(API_KEY_PARAM));
    }

    #[tokio::test]
    async fn test_send_request_returns_raw_status_and_body() {
        use wiremock::matchers::{method, path, query_param};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/3/movie/550"))
            .and(query_param("api_key", "secret"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .expect(1)
            .mount(&server)
            .await;
        let transport = HttpTransport::new(&test_config(&format!("{}/3", server.uri()))).unwrap();

        let response = transport
            .send_request(ApiRequest::get("movie/550"))
            .await
            .unwrap();

        assert_eq!(response.status, 429);
        assert_eq!(response.status_text.as_deref(), Some("Too Many Requests"));
        assert_eq!(&response.body[..], b"slow down");
        assert!(!response.is_success());
    }
}
