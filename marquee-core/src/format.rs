//! Display formatting for movie records.
//!
//! Every helper is total: absent or empty inputs produce an empty string (or
//! `N/A` for money) rather than failing.

use chrono::{Datelike, NaiveDate};

use crate::catalog::{Genre, ProductionCompany};
use crate::config::ImageConfig;

/// Vote average with one decimal, e.g. `7.5`.
pub fn format_rating(vote_average: f64) -> String {
    format!("{vote_average:.1}")
}

/// Release year from a `YYYY-MM-DD` date.
///
/// Falls back to the first four characters when the date is not a full
/// calendar date (the catalog sometimes sends just a year).
pub fn extract_year(release_date: Option<&str>) -> String {
    let Some(date) = release_date.map(str::trim).filter(|d| !d.is_empty()) else {
        return String::new();
    };

    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(parsed) => parsed.year().to_string(),
        Err(_) => date.chars().take(4).collect(),
    }
}

/// Runtime in minutes as `2h 5m`.
pub fn format_runtime(runtime: Option<u32>) -> String {
    runtime
        .map(|minutes| format!("{}h {}m", minutes / 60, minutes % 60))
        .unwrap_or_default()
}

/// Dollar amount with thousands separators, or `N/A` when not positive.
pub fn format_currency(amount: i64) -> String {
    if amount <= 0 {
        return "N/A".to_string();
    }

    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    grouped.push('$');
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

pub fn format_genres(genres: &[Genre]) -> String {
    join_names(genres.iter().map(|genre| genre.name.as_str()))
}

pub fn format_production_companies(companies: &[ProductionCompany]) -> String {
    join_names(companies.iter().map(|company| company.name.as_str()))
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names
        .filter(|name| !name.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Builds absolute poster and backdrop URLs from catalog image paths.
#[derive(Debug, Clone)]
pub struct ImageUrls {
    config: ImageConfig,
}

impl ImageUrls {
    pub fn new(config: ImageConfig) -> Self {
        Self { config }
    }

    pub fn poster_url(&self, path: Option<&str>) -> String {
        self.build(self.config.poster_size, path)
    }

    pub fn backdrop_url(&self, path: Option<&str>) -> String {
        self.build(self.config.backdrop_size, path)
    }

    fn build(&self, size: &str, path: Option<&str>) -> String {
        match path.filter(|p| !p.is_empty()) {
            Some(path) => format!("{}{size}{path}", self.config.base_url),
            None => String::new(),
        }
    }
}

impl Default for ImageUrls {
    fn default() -> Self {
        Self::new(ImageConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_rating() {
        assert_eq!(format_rating(7.456), "7.5");
        assert_eq!(format_rating(0.0), "0.0");
        assert_eq!(format_rating(10.0), "10.0");
    }

    #[test]
    fn test_extract_year() {
        assert_eq!(extract_year(Some("2024-05-17")), "2024");
        assert_eq!(extract_year(Some("1999")), "1999");
        assert_eq!(extract_year(Some("")), "");
        assert_eq!(extract_year(None), "");
    }

    #[test]
    fn test_format_runtime() {
        assert_eq!(format_runtime(Some(125)), "2h 5m");
        assert_eq!(format_runtime(Some(45)), "0h 45m");
        assert_eq!(format_runtime(None), "");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(1_234_567), "$1,234,567");
        assert_eq!(format_currency(999), "$999");
        assert_eq!(format_currency(1000), "$1,000");
        assert_eq!(format_currency(0), "N/A");
        assert_eq!(format_currency(-5), "N/A");
    }

    #[test]
    fn test_format_names() {
        let genres = vec![
            Genre {
                id: 28,
                name: "Action".to_string(),
            },
            Genre {
                id: 12,
                name: "Adventure".to_string(),
            },
        ];
        assert_eq!(format_genres(&genres), "Action, Adventure");
        assert_eq!(format_genres(&[]), "");
        assert_eq!(format_production_companies(&[]), "");
    }

    #[test]
    fn test_image_urls() {
        let urls = ImageUrls::default();
        assert_eq!(
            urls.poster_url(Some("/abc.jpg")),
            "https://image.tmdb.org/t/p/w500/abc.jpg"
        );
        assert_eq!(
            urls.backdrop_url(Some("/abc.jpg")),
            "https://image.tmdb.org/t/p/w780/abc.jpg"
        );
        assert_eq!(urls.poster_url(None), "");
        assert_eq!(urls.backdrop_url(Some("")), "");
    }
}
