//! Debounced, switch-to-latest search task.

use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use marquee_core::catalog::{ApiResult, Movie, MovieCatalog};
use marquee_core::config::SearchConfig;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Instant;

use crate::handle::SearchHandle;
use crate::query::{is_valid_query, search_movies};
use crate::state::SearchState;

/// Commands accepted by the search orchestrator.
pub enum SearchCommand {
    /// New query text, one per keystroke.
    SetQuery {
        /// Full text of the query field
        query: String,
    },
    /// Reset to idle right away.
    Clear,
    /// Get the query text as last received.
    GetQuery {
        /// Channel receiving the query
        responder: oneshot::Sender<String>,
    },
}

struct InFlightSearch {
    generation: u64,
    future: BoxFuture<'static, ApiResult<Vec<Movie>>>,
}

/// Spawns the search orchestrator and returns its handle.
///
/// The orchestrator starts in [`SearchState::Idle`]. Dropping every handle
/// stops it and cancels the search in flight, if any.
pub fn spawn_search(catalog: Arc<dyn MovieCatalog>, config: SearchConfig) -> SearchHandle {
    let (sender, receiver) = mpsc::channel(100);
    let (state_tx, state_rx) = watch::channel(SearchState::Idle);

    let orchestrator = SearchOrchestrator {
        catalog,
        config,
        query: String::new(),
        generation: 0,
        deadline: None,
        in_flight: None,
        state_tx,
    };
    tokio::spawn(orchestrator.run(receiver));

    SearchHandle::new(sender, state_rx)
}

struct SearchOrchestrator {
    catalog: Arc<dyn MovieCatalog>,
    config: SearchConfig,
    query: String,
    /// Bumped by every accepted query; older searches can never publish.
    generation: u64,
    /// When the debounce window for the current query closes.
    deadline: Option<Instant>,
    in_flight: Option<InFlightSearch>,
    state_tx: watch::Sender<SearchState>,
}

impl SearchOrchestrator {
    async fn run(mut self, mut receiver: mpsc::Receiver<SearchCommand>) {
        tracing::debug!("Search orchestrator started");

        loop {
            let deadline = self.deadline.unwrap_or_else(Instant::now);

            tokio::select! {
                command = receiver.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                _ = tokio::time::sleep_until(deadline), if self.deadline.is_some() => {
                    self.debounce_elapsed();
                }
                (generation, result) = next_result(&mut self.in_flight), if self.in_flight.is_some() => {
                    self.in_flight = None;
                    self.finish(generation, result);
                }
            }
        }

        tracing::debug!("Search orchestrator stopped");
    }

    fn handle_command(&mut self, command: SearchCommand) {
        match command {
            SearchCommand::SetQuery { query } => self.set_query(query),
            SearchCommand::Clear => self.set_query(String::new()),
            SearchCommand::GetQuery { responder } => {
                let _ = responder.send(self.query.clone());
            }
        }
    }

    fn set_query(&mut self, query: String) {
        if query == self.query {
            return;
        }

        self.query = query;
        self.generation += 1;
        if self.in_flight.take().is_some() {
            tracing::debug!("Cancelled search superseded by a newer query");
        }

        if self.query.trim().is_empty() {
            self.deadline = None;
            self.publish(SearchState::Idle);
        } else {
            self.deadline = Some(Instant::now() + self.config.debounce);
        }
    }

    fn debounce_elapsed(&mut self) {
        self.deadline = None;

        if !is_valid_query(&self.query, self.config.min_query_length) {
            self.publish(SearchState::Idle);
            return;
        }

        tracing::debug!("Searching for {:?}", self.query);
        self.publish(SearchState::Loading);

        let catalog = Arc::clone(&self.catalog);
        let query = self.query.clone();
        self.in_flight = Some(InFlightSearch {
            generation: self.generation,
            future: async move { search_movies(catalog.as_ref(), &query).await }.boxed(),
        });
    }

    fn finish(&mut self, generation: u64, result: ApiResult<Vec<Movie>>) {
        if generation != self.generation {
            tracing::debug!("Discarding result of superseded search {generation}");
            return;
        }

        let state = match result {
            Ok(movies) => {
                tracing::debug!("Search for {:?} returned {} movies", self.query, movies.len());
                SearchState::Success(movies)
            }
            Err(error) => {
                tracing::warn!("Search for {:?} failed: {error}", self.query);
                SearchState::Error(error.user_message())
            }
        };
        self.publish(state);
    }

    fn publish(&self, state: SearchState) {
        self.state_tx.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        });
    }
}

async fn next_result(in_flight: &mut Option<InFlightSearch>) -> (u64, ApiResult<Vec<Movie>>) {
    match in_flight {
        Some(search) => (search.generation, search.future.as_mut().await),
        None => std::future::pending().await,
    }
}
