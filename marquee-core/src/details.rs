//! Cache-fronted movie detail lookups.

use std::sync::Arc;

use crate::cache::DetailCache;
use crate::catalog::{ApiResult, MovieCatalog, MovieDetails};

/// Resolves movie details from the cache first, then the catalog.
///
/// Successful remote lookups are stored before being returned; failures are
/// propagated untouched and never cached.
#[derive(Debug, Clone)]
pub struct MovieDetailsService {
    catalog: Arc<dyn MovieCatalog>,
    cache: Arc<DetailCache>,
}

impl MovieDetailsService {
    pub fn new(catalog: Arc<dyn MovieCatalog>, cache: Arc<DetailCache>) -> Self {
        Self { catalog, cache }
    }

    /// Looks up one movie.
    ///
    /// # Errors
    /// - `ApiError::Network` - Connectivity failure or timeout on a cache miss
    /// - `ApiError::Http` - Catalog rejected the lookup, e.g. unknown id
    /// - `ApiError::Serialization` - Payload did not decode
    pub async fn movie_details(&self, id: u32) -> ApiResult<MovieDetails> {
        if let Some(details) = self.cache.get(id) {
            return Ok(details);
        }

        let details = self.catalog.movie_details(id).await?;
        self.cache.put(id, details.clone());
        tracing::debug!("Cached details for movie {id}");

        Ok(details)
    }

    /// Shared cache backing this service.
    pub fn cache(&self) -> &Arc<DetailCache> {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_mocks::movie_details;
    use crate::catalog::{ApiError, CatalogCall, HttpError, HttpStatus, MockCatalog, NetworkError};

    fn service_with(catalog: &MockCatalog) -> MovieDetailsService {
        MovieDetailsService::new(Arc::new(catalog.clone()), Arc::new(DetailCache::new(50)))
    }

    #[tokio::test]
    async fn test_second_lookup_is_served_from_cache() {
        let catalog = MockCatalog::new();
        catalog.set_details(42, Ok(movie_details(42)));
        let service = service_with(&catalog);

        let first = service.movie_details(42).await.unwrap();
        let second = service.movie_details(42).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(catalog.calls(), vec![CatalogCall::Details(42)]);
        assert!(service.cache().contains(42));
    }

    #[tokio::test]
    async fn test_failure_is_propagated_and_not_cached() {
        let catalog = MockCatalog::new();
        let not_found = ApiError::Http(HttpError::new(HttpStatus::NotFound, None));
        catalog.set_details(99, Err(not_found.clone()));
        let service = service_with(&catalog);

        let error = service.movie_details(99).await.unwrap_err();

        assert_eq!(error, not_found);
        assert!(!service.cache().contains(99));
        assert!(service.cache().is_empty());
    }

    #[tokio::test]
    async fn test_retry_after_failure_reaches_catalog_again() {
        let catalog = MockCatalog::new();
        catalog.set_details(5, Err(ApiError::Network(NetworkError::Timeout)));
        let service = service_with(&catalog);

        assert!(service.movie_details(5).await.is_err());

        catalog.set_details(5, Ok(movie_details(5)));
        assert_eq!(service.movie_details(5).await.unwrap().id, 5);
        assert_eq!(catalog.call_count(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_lookups_share_cache() {
        let catalog = MockCatalog::new();
        for id in 1..=20 {
            catalog.set_details(id, Ok(movie_details(id)));
        }
        let service = service_with(&catalog);

        let lookups = (1..=20).map(|id| {
            let service = service.clone();
            tokio::spawn(async move { service.movie_details(id).await })
        });
        for lookup in futures::future::join_all(lookups).await {
            assert!(lookup.unwrap().is_ok());
        }

        assert_eq!(service.cache().len(), 20);
    }
}
