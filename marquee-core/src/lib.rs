//! Marquee Core - Movie catalog access, caching and paging
//!
//! This crate provides the data-access layer of the Marquee movie browser:
//! the classified catalog client, the bounded detail cache, the now-playing
//! pager, display formatting, and configuration management.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod details;
pub mod format;
pub mod paging;
pub mod tracing_setup;

// Re-export main types for convenient access
pub use cache::{CacheStatistics, DetailCache};
pub use catalog::{ApiError, ApiResult, CatalogClient, MovieCatalog};
pub use config::MarqueeConfig;
pub use details::MovieDetailsService;
pub use paging::{PagerHandle, PagingError, PagingSnapshot, spawn_pager};

/// Errors that can bubble up from any Marquee subsystem.
///
/// Catalog results are already classified as [`ApiError`]; this wraps them
/// together with failures outside the catalog boundary.
#[derive(Debug, thiserror::Error)]
pub enum MarqueeError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] ApiError),

    #[error("Paging error: {0}")]
    Paging(#[from] PagingError),

    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MarqueeError {
    /// Returns a user-friendly error message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            MarqueeError::Catalog(error) => error.user_message(),
            MarqueeError::Paging(_) => "The listing is no longer available".to_string(),
            MarqueeError::Configuration { reason } => format!("Configuration error: {reason}"),
            MarqueeError::Io(_) => "File system error occurred".to_string(),
        }
    }

    /// Whether repeating the same action may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, MarqueeError::Catalog(error) if error.is_retryable())
    }
}

pub type Result<T> = std::result::Result<T, MarqueeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{HttpError, HttpStatus, NetworkError};

    #[test]
    fn test_catalog_errors_keep_their_message() {
        let error = MarqueeError::from(ApiError::Network(NetworkError::NoConnection));

        assert_eq!(
            error.user_message(),
            ApiError::Network(NetworkError::NoConnection).user_message()
        );
        assert!(error.is_retryable());
    }

    #[test]
    fn test_non_catalog_errors_are_not_retryable() {
        let config = MarqueeError::Configuration {
            reason: "missing api key".to_string(),
        };
        assert_eq!(config.user_message(), "Configuration error: missing api key");
        assert!(!config.is_retryable());

        let not_found = MarqueeError::from(ApiError::Http(HttpError::new(HttpStatus::NotFound, None)));
        assert!(!not_found.is_retryable());
        assert!(!MarqueeError::from(PagingError::ActorStopped).user_message().is_empty());
    }
}
