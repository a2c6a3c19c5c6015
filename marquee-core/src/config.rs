//! Centralized configuration for Marquee.
//!
//! All tunable parameters and settings are defined here to avoid
//! hard-coded values scattered throughout the codebase.

use std::time::Duration;

/// Central configuration for all Marquee components.
///
/// Groups related configuration settings into logical sections.
/// Supports environment variable overrides for runtime customization.
#[derive(Debug, Clone, Default)]
pub struct MarqueeConfig {
    pub api: ApiConfig,
    pub images: ImageConfig,
    pub cache: CacheConfig,
    pub paging: PagingConfig,
    pub search: SearchConfig,
}

/// Remote catalog access.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL every request path is resolved against
    pub base_url: String,
    /// Static credential attached to every request as a query parameter
    pub api_key: String,
    /// Language requested for titles and overviews
    pub language: String,
    /// Connection establishment timeout
    pub connect_timeout: Duration,
    /// Timeout for reading each response
    pub read_timeout: Duration,
    /// User agent for HTTP requests
    pub user_agent: &'static str,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.themoviedb.org/3/".to_string(),
            api_key: String::new(),
            language: "en-US".to_string(),
            connect_timeout: Duration::from_secs(30),
            read_timeout: Duration::from_secs(30),
            user_agent: "marquee/0.1.0",
        }
    }
}

/// Poster and backdrop image locations.
#[derive(Debug, Clone)]
pub struct ImageConfig {
    pub base_url: String,
    pub poster_size: &'static str,
    pub backdrop_size: &'static str,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            base_url: "https://image.tmdb.org/t/p/".to_string(),
            poster_size: "w500",
            backdrop_size: "w780",
        }
    }
}

/// Detail cache sizing.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of movie detail records kept in memory
    pub details_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            details_capacity: 50,
        }
    }
}

/// Now-playing pager tuning.
///
/// These only affect when loads are triggered, never the key arithmetic.
#[derive(Debug, Clone)]
pub struct PagingConfig {
    /// Distance from either end of the loaded items that triggers the next load
    pub prefetch_distance: usize,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            prefetch_distance: 10,
        }
    }
}

/// Search-as-you-type behaviour.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Quiet period after the last keystroke before a search runs
    pub debounce: Duration,
    /// Minimum trimmed query length that triggers a remote search
    pub min_query_length: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            min_query_length: 2,
        }
    }
}

impl MarqueeConfig {
    /// Creates configuration with environment variable overrides.
    ///
    /// Allows runtime configuration via environment variables while
    /// maintaining sensible defaults. Unparseable values are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(base_url) = std::env::var("MARQUEE_API_BASE_URL") {
            config.api.base_url = base_url;
        }

        if let Ok(api_key) = std::env::var("MARQUEE_API_KEY") {
            config.api.api_key = api_key;
        }

        if let Ok(language) = std::env::var("MARQUEE_LANGUAGE") {
            config.api.language = language;
        }

        if let Ok(timeout) = std::env::var("MARQUEE_CONNECT_TIMEOUT") {
            if let Ok(seconds) = timeout.parse::<u64>() {
                config.api.connect_timeout = Duration::from_secs(seconds);
            }
        }

        if let Ok(timeout) = std::env::var("MARQUEE_READ_TIMEOUT") {
            if let Ok(seconds) = timeout.parse::<u64>() {
                config.api.read_timeout = Duration::from_secs(seconds);
            }
        }

        if let Ok(image_url) = std::env::var("MARQUEE_IMAGE_BASE_URL") {
            config.images.base_url = image_url;
        }

        if let Ok(capacity) = std::env::var("MARQUEE_CACHE_CAPACITY") {
            if let Ok(entries) = capacity.parse::<usize>() {
                config.cache.details_capacity = entries;
            }
        }

        if let Ok(debounce) = std::env::var("MARQUEE_SEARCH_DEBOUNCE_MS") {
            if let Ok(millis) = debounce.parse::<u64>() {
                config.search.debounce = Duration::from_millis(millis);
            }
        }

        config
    }

    /// Creates a configuration optimized for testing.
    ///
    /// Points at a local address and uses short timeouts so failures surface fast.
    pub fn for_testing() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://127.0.0.1:9/3/".to_string(),
                api_key: "test-api-key".to_string(),
                connect_timeout: Duration::from_secs(2),
                read_timeout: Duration::from_secs(2),
                ..ApiConfig::default()
            },
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = MarqueeConfig::default();

        assert_eq!(config.api.base_url, "https://api.themoviedb.org/3/");
        assert_eq!(config.api.language, "en-US");
        assert_eq!(config.api.connect_timeout, Duration::from_secs(30));
        assert_eq!(config.api.read_timeout, Duration::from_secs(30));
        assert_eq!(config.images.poster_size, "w500");
        assert_eq!(config.images.backdrop_size, "w780");
        assert_eq!(config.cache.details_capacity, 50);
        assert_eq!(config.paging.prefetch_distance, 10);
        assert_eq!(config.search.debounce, Duration::from_millis(300));
        assert_eq!(config.search.min_query_length, 2);
    }

    #[test]
    fn test_testing_preset() {
        let config = MarqueeConfig::for_testing();
        assert!(!config.api.api_key.is_empty());
        assert!(config.api.connect_timeout < Duration::from_secs(30));
        assert_eq!(config.cache.details_capacity, 50);
    }

    #[test]
    fn test_env_override() {
        unsafe {
            std::env::set_var("MARQUEE_API_KEY", "from-env");
            std::env::set_var("MARQUEE_CONNECT_TIMEOUT", "5");
            std::env::set_var("MARQUEE_CACHE_CAPACITY", "10");
            std::env::set_var("MARQUEE_SEARCH_DEBOUNCE_MS", "not-a-number");
        }

        let config = MarqueeConfig::from_env();

        assert_eq!(config.api.api_key, "from-env");
        assert_eq!(config.api.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.cache.details_capacity, 10);
        assert_eq!(config.search.debounce, Duration::from_millis(300));

        // Cleanup
        unsafe {
            std::env::remove_var("MARQUEE_API_KEY");
            std::env::remove_var("MARQUEE_CONNECT_TIMEOUT");
            std::env::remove_var("MARQUEE_CACHE_CAPACITY");
            std::env::remove_var("MARQUEE_SEARCH_DEBOUNCE_MS");
        }
    }
}
