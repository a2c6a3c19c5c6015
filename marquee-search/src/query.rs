//! Query policy and the single-shot search use case.

use marquee_core::catalog::{ApiResult, Movie, MovieCatalog};

/// Whether `query` is long enough, once trimmed, to be worth a remote search.
pub fn is_valid_query(query: &str, min_length: usize) -> bool {
    query.trim().chars().count() >= min_length
}

/// Searches the first result page for `query`.
///
/// Blank queries resolve to an empty list without touching the catalog.
///
/// # Errors
/// - `ApiError::Network` - Connectivity failure or timeout
/// - `ApiError::Http` - Catalog answered with an error status
/// - `ApiError::Serialization` - Payload did not decode
pub async fn search_movies(catalog: &dyn MovieCatalog, query: &str) -> ApiResult<Vec<Movie>> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }

    catalog.search(query, 1).await
}

#[cfg(test)]
mod tests {
    use marquee_core::catalog::test_mocks::movie;
    use marquee_core::catalog::{CatalogCall, MockCatalog};

    use super::*;

    #[test]
    fn test_query_length_uses_trimmed_characters() {
        assert!(!is_valid_query("", 2));
        assert!(!is_valid_query("  a  ", 2));
        assert!(is_valid_query("ab", 2));
        assert!(is_valid_query(" été ", 2));
        assert!(is_valid_query("a", 1));
    }

    #[tokio::test]
    async fn test_blank_query_skips_catalog() {
        let catalog = MockCatalog::new();

        assert_eq!(search_movies(&catalog, "   ").await, Ok(Vec::new()));
        assert_eq!(catalog.call_count(), 0);
    }

    #[tokio::test]
    async fn test_query_is_trimmed_and_first_page_requested() {
        let catalog = MockCatalog::new();
        catalog.set_search("batman", Ok(vec![movie(268)]));

        let movies = search_movies(&catalog, " batman ").await.unwrap();

        assert_eq!(movies, vec![movie(268)]);
        assert_eq!(
            catalog.calls(),
            vec![CatalogCall::Search("batman".to_string(), 1)]
        );
    }
}
