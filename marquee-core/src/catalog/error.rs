//! Closed error taxonomy for catalog operations.
//!
//! Every fallible catalog call resolves to an [`ApiResult`], whose error side is
//! always one of the [`ApiError`] variants below. The taxonomy is closed: match
//! on it exhaustively when rendering or deciding on a retry affordance.

use thiserror::Error;

/// Outcome of any network-facing catalog operation.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Classified failure of a catalog operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Transport-level failure before a response was received.
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// Remote answered with a non-2xx status in the 400-599 range.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// Response body could not be decoded into the expected payload.
    #[error("Failed to parse response: {message}")]
    Serialization { message: String },

    /// Anything the classifier could not place elsewhere.
    #[error("{message}")]
    Unknown { message: String },
}

/// Connectivity failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("No internet connection available")]
    NoConnection,

    #[error("Request timed out")]
    Timeout,

    #[error("Network error: {message}")]
    Generic { message: String },
}

/// Status family of an [`HttpError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpFamily {
    /// 4xx
    Client,
    /// 5xx
    Server,
}

/// Named HTTP error statuses plus a family-generic fallback for each family.
///
/// The generic variants carry the raw code; the named variants imply theirs,
/// so [`HttpStatus::code`] always reports the status that was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpStatus {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    TooManyRequests,
    GenericClient(u16),
    InternalServerError,
    BadGateway,
    ServiceUnavailable,
    GatewayTimeout,
    GenericServer(u16),
}

impl HttpStatus {
    /// Maps a status code onto its sub-kind.
    ///
    /// Returns `None` for codes outside 400-599; those are not HTTP errors in
    /// this taxonomy.
    pub fn from_code(code: u16) -> Option<Self> {
        let status = match code {
            400 => HttpStatus::BadRequest,
            401 => HttpStatus::Unauthorized,
            403 => HttpStatus::Forbidden,
            404 => HttpStatus::NotFound,
            429 => HttpStatus::TooManyRequests,
            400..=499 => HttpStatus::GenericClient(code),
            500 => HttpStatus::InternalServerError,
            502 => HttpStatus::BadGateway,
            503 => HttpStatus::ServiceUnavailable,
            504 => HttpStatus::GatewayTimeout,
            500..=599 => HttpStatus::GenericServer(code),
            _ => return None,
        };
        Some(status)
    }

    /// Canonical status code for this sub-kind.
    pub fn code(self) -> u16 {
        match self {
            HttpStatus::BadRequest => 400,
            HttpStatus::Unauthorized => 401,
            HttpStatus::Forbidden => 403,
            HttpStatus::NotFound => 404,
            HttpStatus::TooManyRequests => 429,
            HttpStatus::GenericClient(code) => code,
            HttpStatus::InternalServerError => 500,
            HttpStatus::BadGateway => 502,
            HttpStatus::ServiceUnavailable => 503,
            HttpStatus::GatewayTimeout => 504,
            HttpStatus::GenericServer(code) => code,
        }
    }

    pub fn family(self) -> HttpFamily {
        match self {
            HttpStatus::BadRequest
            | HttpStatus::Unauthorized
            | HttpStatus::Forbidden
            | HttpStatus::NotFound
            | HttpStatus::TooManyRequests
            | HttpStatus::GenericClient(_) => HttpFamily::Client,
            HttpStatus::InternalServerError
            | HttpStatus::BadGateway
            | HttpStatus::ServiceUnavailable
            | HttpStatus::GatewayTimeout
            | HttpStatus::GenericServer(_) => HttpFamily::Server,
        }
    }

    /// Short description used in error text.
    fn describe(self) -> &'static str {
        match self {
            HttpStatus::BadRequest => "Bad request",
            HttpStatus::Unauthorized => "Unauthorized - Invalid API key",
            HttpStatus::Forbidden => "Forbidden - Access denied",
            HttpStatus::NotFound => "Resource not found",
            HttpStatus::TooManyRequests => "Too many requests - Rate limit exceeded",
            HttpStatus::GenericClient(_) => "Client error",
            HttpStatus::InternalServerError => "Internal server error",
            HttpStatus::BadGateway => "Bad gateway",
            HttpStatus::ServiceUnavailable => "Service temporarily unavailable",
            HttpStatus::GatewayTimeout => "Gateway timeout",
            HttpStatus::GenericServer(_) => "Server error",
        }
    }
}

/// Non-2xx response from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("HTTP error {}: {}{}", .status.code(), .status.describe(), format_status_message(.status_message))]
pub struct HttpError {
    pub status: HttpStatus,
    pub status_message: Option<String>,
}

fn format_status_message(status_message: &Option<String>) -> String {
    match status_message.as_deref().map(str::trim) {
        Some(message) if !message.is_empty() => format!(" ({message})"),
        _ => String::new(),
    }
}

impl HttpError {
    pub fn new(status: HttpStatus, status_message: Option<String>) -> Self {
        Self {
            status,
            status_message,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.status.code()
    }

    pub fn family(&self) -> HttpFamily {
        self.status.family()
    }
}

impl ApiError {
    /// Builds a serialization error from any displayable decode failure.
    pub fn serialization(error: impl std::fmt::Display) -> Self {
        ApiError::Serialization {
            message: error.to_string(),
        }
    }

    /// Builds an unknown error from any displayable failure.
    pub fn unknown(error: impl std::fmt::Display) -> Self {
        ApiError::Unknown {
            message: error.to_string(),
        }
    }

    /// Returns a user-facing message for this error. Never empty.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(NetworkError::NoConnection) => {
                "No internet connection. Check your network and try again.".to_string()
            }
            ApiError::Network(NetworkError::Timeout) => {
                "The request timed out. Please try again.".to_string()
            }
            ApiError::Network(NetworkError::Generic { .. }) => {
                "A network error occurred. Please try again.".to_string()
            }
            ApiError::Http(error) => match error.status {
                HttpStatus::Unauthorized => {
                    "Authentication failed. Check the configured API key.".to_string()
                }
                HttpStatus::Forbidden => "Access to this content is not allowed.".to_string(),
                HttpStatus::NotFound => "The requested movie could not be found.".to_string(),
                HttpStatus::TooManyRequests => {
                    "Too many requests. Please wait a moment and try again.".to_string()
                }
                HttpStatus::BadRequest | HttpStatus::GenericClient(_) => {
                    format!("The request could not be completed: {error}")
                }
                HttpStatus::InternalServerError => {
                    "The movie service encountered an internal error.".to_string()
                }
                HttpStatus::ServiceUnavailable => {
                    "The movie service is temporarily unavailable.".to_string()
                }
                HttpStatus::BadGateway | HttpStatus::GatewayTimeout | HttpStatus::GenericServer(_) => {
                    "The movie service is having problems. Please try again later.".to_string()
                }
            },
            ApiError::Serialization { .. } => {
                "Received an unexpected response from the movie service.".to_string()
            }
            ApiError::Unknown { .. } => "An unexpected error occurred.".to_string(),
        }
    }

    /// Whether re-issuing the same request can reasonably succeed.
    ///
    /// Nothing in this crate retries on its own; callers use this to decide
    /// whether to offer a retry action.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Network(_) => true,
            ApiError::Http(error) => {
                error.status == HttpStatus::TooManyRequests || error.family() == HttpFamily::Server
            }
            ApiError::Serialization { .. } | ApiError::Unknown { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_variants() -> Vec<ApiError> {
        let mut errors = vec![
            ApiError::Network(NetworkError::NoConnection),
            ApiError::Network(NetworkError::Timeout),
            ApiError::Network(NetworkError::Generic {
                message: "connection reset".to_string(),
            }),
            ApiError::serialization("expected value at line 1"),
            ApiError::unknown("Unexpected error: boom"),
        ];
        for code in [400, 401, 403, 404, 418, 429, 500, 502, 503, 504, 599] {
            let status = HttpStatus::from_code(code).unwrap();
            errors.push(ApiError::Http(HttpError::new(status, None)));
        }
        errors
    }

    #[test]
    fn test_every_error_has_user_message() {
        for error in all_variants() {
            assert!(!error.user_message().is_empty(), "{error:?}");
            assert!(!error.to_string().is_empty(), "{error:?}");
        }
    }

    #[test]
    fn test_status_code_matches_named_kind() {
        assert_eq!(HttpStatus::from_code(404), Some(HttpStatus::NotFound));
        assert_eq!(HttpStatus::NotFound.code(), 404);
        assert_eq!(HttpStatus::from_code(418), Some(HttpStatus::GenericClient(418)));
        assert_eq!(HttpStatus::from_code(501), Some(HttpStatus::GenericServer(501)));
        assert_eq!(HttpStatus::from_code(399), None);
        assert_eq!(HttpStatus::from_code(600), None);
    }

    #[test]
    fn test_http_error_display_includes_status_message() {
        let error = HttpError::new(HttpStatus::NotFound, Some("Not Found".to_string()));
        assert_eq!(error.to_string(), "HTTP error 404: Resource not found (Not Found)");

        let bare = HttpError::new(HttpStatus::GenericServer(507), Some("  ".to_string()));
        assert_eq!(bare.to_string(), "HTTP error 507: Server error");
    }

    #[test]
    fn test_retry_eligibility() {
        assert!(ApiError::Network(NetworkError::Timeout).is_retryable());
        assert!(ApiError::Http(HttpError::new(HttpStatus::TooManyRequests, None)).is_retryable());
        assert!(ApiError::Http(HttpError::new(HttpStatus::BadGateway, None)).is_retryable());
        assert!(!ApiError::Http(HttpError::new(HttpStatus::NotFound, None)).is_retryable());
        assert!(!ApiError::serialization("bad json").is_retryable());
    }
}
