//! Actor driving the now-playing pager.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use tokio::sync::{mpsc, watch};

use super::commands::{LoadState, PageSummary, PagerCommand, PagingSnapshot};
use super::handle::PagerHandle;
use super::source::{LoadKind, LoadParams, LoadResult, MoviePagingSource};
use super::state::{LoadedPage, PagingState};
use crate::catalog::MovieCatalog;
use crate::config::PagingConfig;

struct CompletedLoad {
    params: LoadParams,
    generation: u64,
    result: LoadResult,
}

/// Spawns the pager actor and returns its handle.
///
/// The first page is requested immediately. Dropping every handle stops the
/// actor and cancels whatever loads are still in flight.
///
/// # Examples
/// ```rust,no_run
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use std::sync::Arc;
/// use marquee_core::catalog::CatalogClient;
/// use marquee_core::config::MarqueeConfig;
/// use marquee_core::paging::spawn_pager;
///
/// let config = MarqueeConfig::from_env();
/// let client = CatalogClient::from_config(&config.api)?;
/// let pager = spawn_pager(Arc::new(client), config.paging);
/// let snapshot = pager.snapshot().await?;
/// # Ok(())
/// # }
/// ```
pub fn spawn_pager(catalog: Arc<dyn MovieCatalog>, config: PagingConfig) -> PagerHandle {
    let (sender, receiver) = mpsc::channel(100);
    let (state_tx, state_rx) = watch::channel(PagingSnapshot::default());

    let mut actor = PagerActor {
        source: MoviePagingSource::new(catalog),
        config,
        state: PagingState::default(),
        generation: 0,
        in_flight: HashMap::new(),
        loads: FuturesUnordered::new(),
        refresh: LoadState::default(),
        append: LoadState::default(),
        prepend: LoadState::default(),
        state_tx,
    };
    actor.refresh();

    tokio::spawn(actor.run(receiver));

    PagerHandle::new(sender, state_rx)
}

struct PagerActor {
    source: MoviePagingSource,
    config: PagingConfig,
    state: PagingState,
    /// Bumped by every refresh; loads from older generations are discarded.
    generation: u64,
    /// One entry per key currently being loaded.
    in_flight: HashMap<u32, LoadKind>,
    loads: FuturesUnordered<BoxFuture<'static, CompletedLoad>>,
    refresh: LoadState,
    append: LoadState,
    prepend: LoadState,
    state_tx: watch::Sender<PagingSnapshot>,
}

impl PagerActor {
    async fn run(mut self, mut receiver: mpsc::Receiver<PagerCommand>) {
        tracing::debug!("Pager actor started");

        loop {
            tokio::select! {
                command = receiver.recv() => match command {
                    Some(command) => {
                        if !self.handle_command(command) {
                            break;
                        }
                    }
                    None => break,
                },
                Some(completed) = self.loads.next(), if !self.loads.is_empty() => {
                    self.apply(completed);
                }
            }
        }

        tracing::debug!(
            "Pager actor stopped, cancelling {} in-flight loads",
            self.loads.len()
        );
    }

    /// Returns false once the actor should stop.
    fn handle_command(&mut self, command: PagerCommand) -> bool {
        match command {
            PagerCommand::Refresh { responder } => {
                let started = self.refresh();
                let _ = responder.send(started);
            }
            PagerCommand::Retry { responder } => {
                let retried = self.retry();
                let _ = responder.send(retried);
            }
            PagerCommand::ItemAccessed { index } => self.item_accessed(index),
            PagerCommand::GetSnapshot { responder } => {
                let _ = responder.send(self.snapshot());
            }
            PagerCommand::Shutdown { responder } => {
                let _ = responder.send(());
                return false;
            }
        }
        true
    }

    fn refresh(&mut self) -> bool {
        if self.refresh.is_loading() {
            tracing::debug!("Refresh already in flight, ignoring");
            return false;
        }

        let key = self.source.refresh_key(&self.state);
        self.generation += 1;
        self.in_flight.clear();
        // Dropping the pending futures cancels their remote calls
        self.loads = FuturesUnordered::new();
        self.append = LoadState::default();
        self.prepend = LoadState::default();

        self.start_load(LoadParams::refresh(key))
    }

    fn retry(&mut self) -> bool {
        if self.refresh.error().is_some() {
            return self.refresh();
        }

        let mut retried = false;
        if self.append.error().is_some() {
            if let Some(key) = self.state.last_next_key() {
                retried |= self.start_load(LoadParams::append(key));
            }
        }
        if self.prepend.error().is_some() {
            if let Some(key) = self.state.first_prev_key() {
                retried |= self.start_load(LoadParams::prepend(key));
            }
        }
        retried
    }

    fn item_accessed(&mut self, index: usize) {
        self.state.anchor_position = Some(index);

        if self.refresh.is_loading() || self.state.pages.is_empty() {
            return;
        }

        let distance = self.config.prefetch_distance;
        let item_count = self.state.item_count();

        if index.saturating_add(distance) >= item_count && self.append.error().is_none() {
            if let Some(key) = self.state.last_next_key() {
                self.start_load(LoadParams::append(key));
            }
        }

        if index < distance && self.prepend.error().is_none() {
            if let Some(key) = self.state.first_prev_key() {
                self.start_load(LoadParams::prepend(key));
            }
        }
    }

    fn start_load(&mut self, params: LoadParams) -> bool {
        let key = params.resolved_key();
        if self.in_flight.contains_key(&key) {
            tracing::debug!("Page {key} already in flight, not loading again");
            return false;
        }

        self.in_flight.insert(key, params.kind);
        *self.load_state_mut(params.kind) = LoadState::Loading;

        let source = self.source.clone();
        let generation = self.generation;
        self.loads.push(
            async move {
                let result = source.load(params).await;
                CompletedLoad {
                    params,
                    generation,
                    result,
                }
            }
            .boxed(),
        );

        self.publish();
        true
    }

    fn apply(&mut self, completed: CompletedLoad) {
        let CompletedLoad {
            params,
            generation,
            result,
        } = completed;
        let key = params.resolved_key();

        if generation != self.generation {
            tracing::debug!("Discarding page {key} from superseded generation {generation}");
            return;
        }
        self.in_flight.remove(&key);

        let (items, prev_key, next_key) = match result {
            LoadResult::Page {
                items,
                prev_key,
                next_key,
            } => (items, prev_key, next_key),
            LoadResult::Error(error) => {
                *self.load_state_mut(params.kind) = LoadState::Error(error);
                self.publish();
                return;
            }
        };

        let page = LoadedPage {
            key,
            items,
            prev_key,
            next_key,
        };

        match params.kind {
            LoadKind::Refresh => {
                self.state = PagingState {
                    pages: vec![page],
                    anchor_position: None,
                };
                self.refresh = LoadState::default();
                self.append = LoadState::NotLoading {
                    end_of_pagination_reached: next_key.is_none(),
                };
                self.prepend = LoadState::NotLoading {
                    end_of_pagination_reached: prev_key.is_none(),
                };
            }
            LoadKind::Append => {
                if self.state.last_next_key() != Some(key) {
                    tracing::debug!("Discarding page {key}, no longer adjacent to the last page");
                    self.append = LoadState::default();
                    self.publish();
                    return;
                }
                self.state.pages.push(page);
                self.append = LoadState::NotLoading {
                    end_of_pagination_reached: next_key.is_none(),
                };
            }
            LoadKind::Prepend => {
                if self.state.first_prev_key() != Some(key) {
                    tracing::debug!("Discarding page {key}, no longer adjacent to the first page");
                    self.prepend = LoadState::default();
                    self.publish();
                    return;
                }
                let inserted = page.items.len();
                self.state.pages.insert(0, page);
                self.state.anchor_position = self
                    .state
                    .anchor_position
                    .map(|a| a.saturating_add(inserted));
                self.prepend = LoadState::NotLoading {
                    end_of_pagination_reached: prev_key.is_none(),
                };
            }
        }

        tracing::debug!(
            "Merged page {key}, {} items across {} pages",
            self.state.item_count(),
            self.state.pages.len()
        );
        self.publish();
    }

    fn load_state_mut(&mut self, kind: LoadKind) -> &mut LoadState {
        match kind {
            LoadKind::Refresh => &mut self.refresh,
            LoadKind::Append => &mut self.append,
            LoadKind::Prepend => &mut self.prepend,
        }
    }

    fn snapshot(&self) -> PagingSnapshot {
        let pages = self
            .state
            .pages
            .iter()
            .zip(self.state.page_ranges())
            .map(|(page, item_range)| PageSummary {
                key: page.key,
                prev_key: page.prev_key,
                next_key: page.next_key,
                item_range,
            })
            .collect();

        PagingSnapshot {
            items: self.state.items(),
            pages,
            refresh: self.refresh.clone(),
            append: self.append.clone(),
            prepend: self.prepend.clone(),
            anchor_position: self.state.anchor_position,
        }
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.snapshot());
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::catalog::test_mocks::movie;
    use crate::catalog::{ApiError, CatalogCall, MockCatalog, NetworkError, Page};
    use crate::paging::PagingError;

    fn config(prefetch_distance: usize) -> PagingConfig {
        PagingConfig { prefetch_distance }
    }

    fn now_playing_calls(catalog: &MockCatalog, page: u32) -> usize {
        catalog
            .calls()
            .into_iter()
            .filter(|call| *call == CatalogCall::NowPlaying(page))
            .count()
    }

    async fn wait_for_items(handle: &PagerHandle, count: usize) -> PagingSnapshot {
        let mut snapshots = handle.subscribe();
        snapshots
            .wait_for(|s| s.items.len() == count && s.is_idle())
            .await
            .unwrap()
            .clone()
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_load_publishes_first_page() {
        let catalog = MockCatalog::new();
        catalog.set_page(1, Ok(Page::new(vec![movie(1), movie(2), movie(3)], 1, 5)));
        let handle = spawn_pager(Arc::new(catalog.clone()), config(10));

        let snapshot = wait_for_items(&handle, 3).await;

        assert_eq!(snapshot.pages.len(), 1);
        assert_eq!(snapshot.pages[0].key, 1);
        assert_eq!(snapshot.pages[0].prev_key, None);
        assert_eq!(snapshot.pages[0].next_key, Some(2));
        assert_eq!(
            snapshot.prepend,
            LoadState::NotLoading {
                end_of_pagination_reached: true
            }
        );
        assert_eq!(catalog.calls(), vec![CatalogCall::NowPlaying(1)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_access_near_end_appends_next_page() {
        let catalog = MockCatalog::with_pages(5, 20);
        let handle = spawn_pager(Arc::new(catalog.clone()), config(10));
        wait_for_items(&handle, 20).await;

        handle.item_accessed(5).await.unwrap();
        assert_eq!(handle.snapshot().await.unwrap().items.len(), 20);

        handle.item_accessed(12).await.unwrap();
        let snapshot = wait_for_items(&handle, 40).await;

        assert_eq!(snapshot.items[20].id, 21);
        assert_eq!(snapshot.pages[1].item_range, 20..40);
        assert_eq!(
            catalog.calls(),
            vec![CatalogCall::NowPlaying(1), CatalogCall::NowPlaying(2)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_range_index_appends_without_panicking() {
        let catalog = MockCatalog::with_pages(3, 20);
        let handle = spawn_pager(Arc::new(catalog.clone()), config(10));
        wait_for_items(&handle, 20).await;

        handle.item_accessed(usize::MAX).await.unwrap();
        let snapshot = wait_for_items(&handle, 40).await;

        assert_eq!(snapshot.anchor_position, Some(usize::MAX));
        assert_eq!(snapshot.pages[1].key, 2);
        assert!(handle.snapshot().await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_key_is_loaded_once() {
        let catalog = MockCatalog::with_pages(5, 20);
        catalog.set_page_delay(2, Duration::from_secs(1));
        let handle = spawn_pager(Arc::new(catalog.clone()), config(10));
        wait_for_items(&handle, 20).await;

        handle.item_accessed(15).await.unwrap();
        handle.item_accessed(17).await.unwrap();
        handle.item_accessed(19).await.unwrap();
        wait_for_items(&handle, 40).await;

        assert_eq!(now_playing_calls(&catalog, 2), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_while_refreshing_is_ignored() {
        let catalog = MockCatalog::with_pages(2, 20);
        catalog.set_page_delay(1, Duration::from_secs(1));
        let handle = spawn_pager(Arc::new(catalog.clone()), config(10));

        assert!(!handle.refresh().await.unwrap());
        wait_for_items(&handle, 20).await;

        assert_eq!(now_playing_calls(&catalog, 1), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_recenters_on_anchor_page() {
        let catalog = MockCatalog::with_pages(5, 20);
        let handle = spawn_pager(Arc::new(catalog.clone()), config(2));
        wait_for_items(&handle, 20).await;

        handle.item_accessed(19).await.unwrap();
        wait_for_items(&handle, 40).await;
        handle.item_accessed(25).await.unwrap();

        assert!(handle.refresh().await.unwrap());
        let mut snapshots = handle.subscribe();
        let snapshot = snapshots
            .wait_for(|s| s.pages.len() == 1 && s.is_idle())
            .await
            .unwrap()
            .clone();

        assert_eq!(snapshot.pages[0].key, 2);
        assert_eq!(snapshot.items[0].id, 21);
        assert_eq!(catalog.calls().last(), Some(&CatalogCall::NowPlaying(2)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_access_near_start_prepends_and_shifts_anchor() {
        let catalog = MockCatalog::with_pages(5, 20);
        let handle = spawn_pager(Arc::new(catalog.clone()), config(2));
        wait_for_items(&handle, 20).await;

        handle.item_accessed(19).await.unwrap();
        wait_for_items(&handle, 40).await;
        handle.item_accessed(25).await.unwrap();
        handle.refresh().await.unwrap();
        let mut snapshots = handle.subscribe();
        snapshots
            .wait_for(|s| s.pages.len() == 1 && s.is_idle())
            .await
            .unwrap();

        handle.item_accessed(0).await.unwrap();
        let snapshot = wait_for_items(&handle, 40).await;

        assert_eq!(snapshot.pages[0].key, 1);
        assert_eq!(snapshot.items[0].id, 1);
        assert_eq!(snapshot.anchor_position, Some(20));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_discards_pending_append() {
        let catalog = MockCatalog::with_pages(5, 20);
        catalog.set_page_delay(2, Duration::from_secs(5));
        let handle = spawn_pager(Arc::new(catalog.clone()), config(10));
        wait_for_items(&handle, 20).await;

        handle.item_accessed(19).await.unwrap();
        assert!(handle.snapshot().await.unwrap().append.is_loading());

        assert!(handle.refresh().await.unwrap());
        tokio::time::sleep(Duration::from_secs(10)).await;

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.pages.len(), 1);
        assert_eq!(snapshot.pages[0].key, 1);
        assert_eq!(snapshot.items.len(), 20);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_is_surfaced_until_retry() {
        let catalog = MockCatalog::new();
        catalog.set_page(1, Err(ApiError::Network(NetworkError::Timeout)));
        let handle = spawn_pager(Arc::new(catalog.clone()), config(10));

        let mut snapshots = handle.subscribe();
        let snapshot = snapshots
            .wait_for(|s| s.refresh.error().is_some())
            .await
            .unwrap()
            .clone();
        assert_eq!(
            snapshot.refresh.error(),
            Some(&ApiError::Network(NetworkError::Timeout))
        );
        assert_eq!(catalog.call_count(), 1);

        catalog.set_page(1, Ok(Page::new(vec![movie(1)], 1, 1)));
        assert!(handle.retry().await.unwrap());
        let snapshot = wait_for_items(&handle, 1).await;

        assert_eq!(snapshot.refresh, LoadState::default());
        assert!(!handle.retry().await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_page_stops_appending() {
        let catalog = MockCatalog::with_pages(1, 3);
        let handle = spawn_pager(Arc::new(catalog.clone()), config(10));
        let snapshot = wait_for_items(&handle, 3).await;

        assert_eq!(
            snapshot.append,
            LoadState::NotLoading {
                end_of_pagination_reached: true
            }
        );
        handle.item_accessed(2).await.unwrap();
        handle.snapshot().await.unwrap();
        assert_eq!(catalog.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_cancels_in_flight_load() {
        let catalog = MockCatalog::with_pages(1, 3);
        catalog.set_page_delay(1, Duration::from_secs(5));
        let handle = spawn_pager(Arc::new(catalog.clone()), config(10));
        let mut snapshots = handle.subscribe();

        drop(handle);
        while snapshots.changed().await.is_ok() {}

        assert!(snapshots.borrow().items.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_commands_fail_after_shutdown() {
        let catalog = MockCatalog::with_pages(1, 3);
        let handle = spawn_pager(Arc::new(catalog), config(10));

        handle.shutdown().await.unwrap();

        assert_eq!(handle.refresh().await, Err(PagingError::ActorStopped));
    }
}
