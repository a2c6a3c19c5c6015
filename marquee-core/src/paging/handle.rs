//! Handle for communicating with the pager actor.

use tokio::sync::{mpsc, oneshot, watch};

use super::PagingError;
use super::commands::{PagerCommand, PagingSnapshot};

/// Handle for communicating with the pager actor.
///
/// Cheap to clone. The actor stops once every clone has been dropped.
#[derive(Clone)]
pub struct PagerHandle {
    sender: mpsc::Sender<PagerCommand>,
    snapshots: watch::Receiver<PagingSnapshot>,
}

impl PagerHandle {
    pub(super) fn new(
        sender: mpsc::Sender<PagerCommand>,
        snapshots: watch::Receiver<PagingSnapshot>,
    ) -> Self {
        Self { sender, snapshots }
    }

    /// Reloads the listing around the last accessed item.
    ///
    /// Returns `false` when a refresh was already running and this request
    /// was folded into it.
    ///
    /// # Errors
    /// - `PagingError::ActorStopped` - Pager has shut down
    pub async fn refresh(&self) -> Result<bool, PagingError> {
        let (responder, rx) = oneshot::channel();
        self.send(PagerCommand::Refresh { responder }).await?;
        rx.await.map_err(|_| PagingError::ActorStopped)
    }

    /// Re-issues whichever loads last failed.
    ///
    /// # Errors
    /// - `PagingError::ActorStopped` - Pager has shut down
    pub async fn retry(&self) -> Result<bool, PagingError> {
        let (responder, rx) = oneshot::channel();
        self.send(PagerCommand::Retry { responder }).await?;
        rx.await.map_err(|_| PagingError::ActorStopped)
    }

    /// Reports the position the consumer is looking at.
    ///
    /// Records the refresh anchor and prefetches the neighbouring page when
    /// the position is within the prefetch distance of either end.
    ///
    /// # Errors
    /// - `PagingError::ActorStopped` - Pager has shut down
    pub async fn item_accessed(&self, index: usize) -> Result<(), PagingError> {
        self.send(PagerCommand::ItemAccessed { index }).await
    }

    /// Current snapshot, after every previously sent command was handled.
    ///
    /// # Errors
    /// - `PagingError::ActorStopped` - Pager has shut down
    pub async fn snapshot(&self) -> Result<PagingSnapshot, PagingError> {
        let (responder, rx) = oneshot::channel();
        self.send(PagerCommand::GetSnapshot { responder }).await?;
        rx.await.map_err(|_| PagingError::ActorStopped)
    }

    /// Stream of snapshots, one per state change.
    pub fn subscribe(&self) -> watch::Receiver<PagingSnapshot> {
        self.snapshots.clone()
    }

    /// Stops the actor. In-flight loads are cancelled.
    ///
    /// # Errors
    /// - `PagingError::ActorStopped` - Pager had already shut down
    pub async fn shutdown(&self) -> Result<(), PagingError> {
        let (responder, rx) = oneshot::channel();
        self.send(PagerCommand::Shutdown { responder }).await?;
        rx.await.map_err(|_| PagingError::ActorStopped)
    }

    async fn send(&self, command: PagerCommand) -> Result<(), PagingError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| PagingError::ActorStopped)
    }
}

impl std::fmt::Debug for PagerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagerHandle")
            .field("closed", &self.sender.is_closed())
            .finish()
    }
}
