//! Movie catalog access: error taxonomy, transport, client and records.
//!
//! Every operation resolves to an [`ApiResult`]; failures are always one of
//! the closed [`ApiError`] variants produced by [`classify`].

pub mod classify;
pub mod client;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_mocks;
pub mod transport;
pub mod types;

use async_trait::async_trait;

pub use classify::{FailureCause, classify, classify_status};
pub use client::CatalogClient;
pub use error::{ApiError, ApiResult, HttpError, HttpFamily, HttpStatus, NetworkError};
#[cfg(any(test, feature = "test-utils"))]
pub use test_mocks::{CatalogCall, MockCatalog};
pub use transport::{ApiRequest, HttpTransport, Method, RawResponse, Transport};
pub use types::{
    Genre, Movie, MovieDetails, MovieListResponse, Page, ProductionCompany, SpokenLanguage,
};

/// Remote movie catalog operations.
///
/// Implementations perform one remote call per invocation and never retry.
#[async_trait]
pub trait MovieCatalog: Send + Sync + std::fmt::Debug {
    /// Fetches one page of the now-playing listing.
    ///
    /// # Errors
    /// - `ApiError::Network` - Connectivity failure or timeout
    /// - `ApiError::Http` - Catalog answered with an error status
    /// - `ApiError::Serialization` - Payload did not decode
    async fn now_playing(&self, page: u32) -> ApiResult<Page<Movie>>;

    /// Fetches the full record for one movie.
    ///
    /// # Errors
    /// - `ApiError::Network` - Connectivity failure or timeout
    /// - `ApiError::Http` - Catalog answered with an error status, e.g. not found
    /// - `ApiError::Serialization` - Payload did not decode
    async fn movie_details(&self, id: u32) -> ApiResult<MovieDetails>;

    /// Searches titles, returning the movies of the requested result page.
    ///
    /// # Errors
    /// - `ApiError::Network` - Connectivity failure or timeout
    /// - `ApiError::Http` - Catalog answered with an error status
    /// - `ApiError::Serialization` - Payload did not decode
    async fn search(&self, query: &str, page: u32) -> ApiResult<Vec<Movie>>;
}
