//! Pager, search and detail lookups sharing one catalog.

use std::sync::Arc;

use marquee_core::catalog::test_mocks::{movie, movie_details};
use marquee_core::catalog::{CatalogCall, MockCatalog, MovieCatalog};
use marquee_core::config::MarqueeConfig;
use marquee_core::paging::spawn_pager;
use marquee_core::{DetailCache, MovieDetailsService};
use marquee_search::{SearchState, spawn_search};

#[tokio::test(start_paused = true)]
async fn test_streams_run_independently_over_one_catalog() {
    let mock = MockCatalog::with_pages(3, 20);
    mock.set_search("heat", Ok(vec![movie(949)]));
    mock.set_details(7, Ok(movie_details(7)));
    let catalog: Arc<dyn MovieCatalog> = Arc::new(mock.clone());
    let config = MarqueeConfig::default();

    let pager = spawn_pager(Arc::clone(&catalog), config.paging.clone());
    let search = spawn_search(Arc::clone(&catalog), config.search.clone());
    let details = MovieDetailsService::new(
        Arc::clone(&catalog),
        Arc::new(DetailCache::from_config(&config.cache)),
    );

    search.set_query("heat").await.unwrap();
    let opened = details.movie_details(7).await.unwrap();
    let mut listing = pager.subscribe();
    listing
        .wait_for(|s| s.items.len() == 20 && s.is_idle())
        .await
        .unwrap();
    let mut states = search.subscribe();
    let state = states
        .wait_for(|s| matches!(s, SearchState::Success(_)))
        .await
        .unwrap()
        .clone();

    assert_eq!(opened.id, 7);
    assert_eq!(state, SearchState::Success(vec![movie(949)]));
    assert_eq!(pager.snapshot().await.unwrap().items[0].id, 1);

    let calls = mock.calls();
    assert!(calls.contains(&CatalogCall::NowPlaying(1)));
    assert!(calls.contains(&CatalogCall::Details(7)));
    assert!(calls.contains(&CatalogCall::Search("heat".to_string(), 1)));
    assert_eq!(calls.len(), 3);
}
