//! Now-playing pager over HTTP.

use std::sync::Arc;
use std::time::Duration;

use marquee_core::config::PagingConfig;
use marquee_core::paging::{LoadState, PagingSnapshot, spawn_pager};
use marquee_core::{ApiError, PagerHandle};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{client_for, list_json, within};

async fn mount_page(server: &MockServer, page: u32, total_pages: u32, delay: Duration) {
    let first_id = (page - 1) * 20 + 1;
    Mock::given(method("GET"))
        .and(path("/3/movie/now_playing"))
        .and(query_param("page", page.to_string()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(list_json(first_id..first_id + 20, page, total_pages))
                .set_delay(delay),
        )
        .expect(1)
        .mount(server)
        .await;
}

async fn settled_with(pager: &PagerHandle, items: usize) -> PagingSnapshot {
    let mut snapshots = pager.subscribe();
    within(snapshots.wait_for(|s| s.items.len() == items && s.is_idle()))
        .await
        .unwrap()
        .clone()
}

#[tokio::test]
async fn test_scrolling_loads_pages_in_order() {
    let server = MockServer::start().await;
    for page in 1..=3 {
        mount_page(&server, page, 3, Duration::ZERO).await;
    }
    let pager = spawn_pager(Arc::new(client_for(&server)), PagingConfig::default());

    settled_with(&pager, 20).await;
    pager.item_accessed(15).await.unwrap();
    settled_with(&pager, 40).await;
    pager.item_accessed(35).await.unwrap();
    let snapshot = settled_with(&pager, 60).await;

    let keys: Vec<u32> = snapshot.pages.iter().map(|p| p.key).collect();
    assert_eq!(keys, vec![1, 2, 3]);
    let ids: Vec<u32> = snapshot.items.iter().map(|m| m.id).collect();
    assert_eq!(ids, (1..=60).collect::<Vec<_>>());
    assert_eq!(
        snapshot.append,
        LoadState::NotLoading {
            end_of_pagination_reached: true
        }
    );
}

#[tokio::test]
async fn test_repeated_access_requests_page_once() {
    let server = MockServer::start().await;
    mount_page(&server, 1, 2, Duration::ZERO).await;
    mount_page(&server, 2, 2, Duration::from_millis(300)).await;
    let pager = spawn_pager(Arc::new(client_for(&server)), PagingConfig::default());
    settled_with(&pager, 20).await;

    for index in 10..20 {
        pager.item_accessed(index).await.unwrap();
    }

    settled_with(&pager, 40).await;
}

#[tokio::test]
async fn test_failed_append_keeps_loaded_items() {
    let server = MockServer::start().await;
    mount_page(&server, 1, 2, Duration::ZERO).await;
    Mock::given(method("GET"))
        .and(path("/3/movie/now_playing"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    let pager = spawn_pager(Arc::new(client_for(&server)), PagingConfig::default());
    settled_with(&pager, 20).await;

    pager.item_accessed(19).await.unwrap();
    let mut snapshots = pager.subscribe();
    let snapshot = within(snapshots.wait_for(|s| s.append.error().is_some()))
        .await
        .unwrap()
        .clone();

    assert_eq!(snapshot.items.len(), 20);
    assert!(matches!(snapshot.append.error(), Some(ApiError::Http(_))));

    // Another access does not retry on its own
    pager.item_accessed(19).await.unwrap();
    assert!(pager.snapshot().await.unwrap().append.error().is_some());
}
