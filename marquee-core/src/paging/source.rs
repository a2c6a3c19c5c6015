//! Key arithmetic for the now-playing listing.

use std::sync::Arc;

use super::state::PagingState;
use crate::catalog::{ApiError, Movie, MovieCatalog};

/// Which end of the loaded data a load extends, or a full reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadKind {
    Refresh,
    Append,
    Prepend,
}

/// A single page request. `key: None` means the initial page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadParams {
    pub kind: LoadKind,
    pub key: Option<u32>,
}

impl LoadParams {
    pub fn refresh(key: Option<u32>) -> Self {
        Self {
            kind: LoadKind::Refresh,
            key,
        }
    }

    pub fn append(key: u32) -> Self {
        Self {
            kind: LoadKind::Append,
            key: Some(key),
        }
    }

    pub fn prepend(key: u32) -> Self {
        Self {
            kind: LoadKind::Prepend,
            key: Some(key),
        }
    }

    /// Key actually requested from the catalog.
    pub fn resolved_key(&self) -> u32 {
        self.key.unwrap_or(MoviePagingSource::STARTING_KEY)
    }
}

/// Outcome of one page load.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadResult {
    Page {
        items: Vec<Movie>,
        prev_key: Option<u32>,
        next_key: Option<u32>,
    },
    Error(ApiError),
}

/// Loads now-playing pages and derives neighbouring keys.
///
/// Holds no paging state; the pager owns that.
#[derive(Debug, Clone)]
pub struct MoviePagingSource {
    catalog: Arc<dyn MovieCatalog>,
}

impl MoviePagingSource {
    pub const STARTING_KEY: u32 = 1;

    pub fn new(catalog: Arc<dyn MovieCatalog>) -> Self {
        Self { catalog }
    }

    /// Fetches the requested page. Failures are returned, never retried.
    pub async fn load(&self, params: LoadParams) -> LoadResult {
        let key = params.resolved_key();
        tracing::debug!("Loading now-playing page {key} ({:?})", params.kind);

        match self.catalog.now_playing(key).await {
            Ok(page) => {
                let prev_key = (page.has_previous() && key > Self::STARTING_KEY).then(|| key - 1);
                let next_key = page.has_next().then(|| key + 1);

                LoadResult::Page {
                    items: page.items,
                    prev_key,
                    next_key,
                }
            }
            Err(error) => {
                tracing::warn!("Failed to load now-playing page {key}: {error}");
                LoadResult::Error(error)
            }
        }
    }

    /// Key to reload so a refresh lands on the page around the anchor.
    pub fn refresh_key(&self, state: &PagingState) -> Option<u32> {
        state.refresh_key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogCall, HttpError, HttpStatus, MockCatalog, Page};
    use crate::catalog::test_mocks::movie;

    fn source_for(catalog: &MockCatalog) -> MoviePagingSource {
        MoviePagingSource::new(Arc::new(catalog.clone()))
    }

    #[tokio::test]
    async fn test_initial_load_requests_first_page() {
        let catalog = MockCatalog::new();
        catalog.set_page(1, Ok(Page::new(vec![movie(1), movie(2), movie(3)], 1, 5)));

        let result = source_for(&catalog).load(LoadParams::refresh(None)).await;

        assert_eq!(
            result,
            LoadResult::Page {
                items: vec![movie(1), movie(2), movie(3)],
                prev_key: None,
                next_key: Some(2),
            }
        );
        assert_eq!(catalog.calls(), vec![CatalogCall::NowPlaying(1)]);
    }

    #[tokio::test]
    async fn test_middle_and_last_page_keys() {
        let catalog = MockCatalog::with_pages(5, 2);
        let source = source_for(&catalog);

        match source.load(LoadParams::append(3)).await {
            LoadResult::Page {
                prev_key, next_key, ..
            } => {
                assert_eq!(prev_key, Some(2));
                assert_eq!(next_key, Some(4));
            }
            other => panic!("unexpected result: {other:?}"),
        }

        match source.load(LoadParams::append(5)).await {
            LoadResult::Page {
                prev_key, next_key, ..
            } => {
                assert_eq!(prev_key, Some(4));
                assert_eq!(next_key, None);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failure_is_surfaced_without_retry() {
        let catalog = MockCatalog::new();
        let unavailable = ApiError::Http(HttpError::new(HttpStatus::ServiceUnavailable, None));
        catalog.set_page(2, Err(unavailable.clone()));

        let result = source_for(&catalog).load(LoadParams::append(2)).await;

        assert_eq!(result, LoadResult::Error(unavailable));
        assert_eq!(catalog.call_count(), 1);
    }
}
