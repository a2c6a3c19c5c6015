//! Movie records and page containers returned by the catalog.
//!
//! Decoding is tolerant: unknown fields are ignored, and missing or `null`
//! values for non-optional fields fall back to their defaults.

use serde::{Deserialize, Deserializer, Serialize};

/// Movie summary as it appears in listings and search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vote_average: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vote_count: u32,
    #[serde(default)]
    pub release_date: Option<String>,
}

/// Full movie record returned by the detail endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetails {
    pub id: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vote_average: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vote_count: u32,
    #[serde(default)]
    pub release_date: Option<String>,
    /// Runtime in minutes.
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub budget: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub revenue: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genres: Vec<Genre>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub production_companies: Vec<ProductionCompany>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub spoken_languages: Vec<SpokenLanguage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionCompany {
    pub id: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub logo_path: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub origin_country: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpokenLanguage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub iso_639_1: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub english_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

/// Wire shape shared by the now-playing and search endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieListResponse {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<Movie>,
    #[serde(default = "first_page")]
    pub total_pages: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_results: u32,
}

fn first_page() -> u32 {
    1
}

/// One page of an ordered, 1-based paged sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_number: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page_number: u32, total_pages: u32) -> Self {
        Self {
            items,
            page_number,
            total_pages,
        }
    }

    pub fn has_next(&self) -> bool {
        self.page_number < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page_number > 1
    }
}

impl From<MovieListResponse> for Page<Movie> {
    fn from(response: MovieListResponse) -> Self {
        Page::new(response.results, response.page, response.total_pages)
    }
}

/// Deserializes `null` as `T::default()`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn test_page_navigation_flags(page_number in 1u32..500, total_pages in 1u32..500) {
            let page: Page<u32> = Page::new(Vec::new(), page_number, total_pages);
            prop_assert_eq!(page.has_next(), page_number < total_pages);
            prop_assert_eq!(page.has_previous(), page_number > 1);
        }
    }

    #[test]
    fn test_movie_tolerates_unknown_and_missing_fields() {
        let json = r#"{
            "id": 7,
            "title": "Heat",
            "overview": null,
            "vote_average": null,
            "adult": false,
            "genre_ids": [80, 18],
            "popularity": 41.2
        }"#;

        let movie: Movie = serde_json::from_str(json).unwrap();
        assert_eq!(movie.id, 7);
        assert_eq!(movie.title, "Heat");
        assert_eq!(movie.overview, "");
        assert_eq!(movie.vote_average, 0.0);
        assert_eq!(movie.vote_count, 0);
        assert!(movie.poster_path.is_none());
        assert!(movie.release_date.is_none());
    }

    #[test]
    fn test_details_decode_nested_lists() {
        let json = r#"{
            "id": 42,
            "title": "The Answer",
            "overview": "Deep thought.",
            "runtime": 142,
            "status": "Released",
            "budget": 1000000,
            "revenue": 5000000,
            "genres": [{"id": 878, "name": "Science Fiction"}],
            "production_companies": [{"id": 1, "name": "Magrathea", "logo_path": null, "origin_country": "GB"}],
            "spoken_languages": [{"iso_639_1": "en", "english_name": "English", "name": "English"}],
            "homepage": "https://example.com"
        }"#;

        let details: MovieDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.runtime, Some(142));
        assert_eq!(details.genres[0].name, "Science Fiction");
        assert_eq!(details.production_companies[0].origin_country, "GB");
        assert_eq!(details.spoken_languages.len(), 1);
        assert!(details.tagline.is_none());
    }

    #[test]
    fn test_list_response_converts_to_page() {
        let json = r#"{"page": 2, "results": [{"id": 1, "title": "A"}], "total_pages": 5, "total_results": 100}"#;
        let response: MovieListResponse = serde_json::from_str(json).unwrap();
        let page = Page::from(response);

        assert_eq!(page.page_number, 2);
        assert_eq!(page.total_pages, 5);
        assert_eq!(page.items.len(), 1);
        assert!(page.has_next());
        assert!(page.has_previous());
    }
}
