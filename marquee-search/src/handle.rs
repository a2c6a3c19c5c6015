//! Handle for communicating with the search orchestrator.

use tokio::sync::{mpsc, oneshot, watch};

use crate::orchestrator::SearchCommand;
use crate::state::SearchState;
use crate::{Result, SearchError};

/// Handle for feeding queries to the search orchestrator and observing its state.
///
/// Cheap to clone. The orchestrator stops once every clone has been dropped.
#[derive(Clone)]
pub struct SearchHandle {
    sender: mpsc::Sender<SearchCommand>,
    states: watch::Receiver<SearchState>,
}

impl SearchHandle {
    pub(crate) fn new(
        sender: mpsc::Sender<SearchCommand>,
        states: watch::Receiver<SearchState>,
    ) -> Self {
        Self { sender, states }
    }

    /// Replaces the query text, restarting the debounce window.
    ///
    /// A value equal to the current query is ignored. A blank value behaves
    /// like [`SearchHandle::clear`].
    ///
    /// # Errors
    /// - `SearchError::OrchestratorStopped` - Orchestrator has shut down
    pub async fn set_query(&self, query: impl Into<String>) -> Result<()> {
        self.send(SearchCommand::SetQuery {
            query: query.into(),
        })
        .await
    }

    /// Empties the query and returns to [`SearchState::Idle`] without waiting
    /// for the debounce window.
    ///
    /// # Errors
    /// - `SearchError::OrchestratorStopped` - Orchestrator has shut down
    pub async fn clear(&self) -> Result<()> {
        self.send(SearchCommand::Clear).await
    }

    /// Query text as last received by the orchestrator.
    ///
    /// # Errors
    /// - `SearchError::OrchestratorStopped` - Orchestrator has shut down
    pub async fn query(&self) -> Result<String> {
        let (responder, rx) = oneshot::channel();
        self.send(SearchCommand::GetQuery { responder }).await?;
        rx.await.map_err(|_| SearchError::OrchestratorStopped)
    }

    /// Latest published state.
    pub fn state(&self) -> SearchState {
        self.states.borrow().clone()
    }

    /// Stream of states, one per change.
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.states.clone()
    }

    async fn send(&self, command: SearchCommand) -> Result<()> {
        self.sender
            .send(command)
            .await
            .map_err(|_| SearchError::OrchestratorStopped)
    }
}

impl std::fmt::Debug for SearchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchHandle")
            .field("state", &*self.states.borrow())
            .finish()
    }
}
