//! Command and snapshot definitions for the pager actor.

use std::ops::Range;

use tokio::sync::oneshot;

use crate::catalog::{ApiError, Movie};

/// Commands that can be sent to the pager actor.
pub enum PagerCommand {
    /// Reload around the anchor. Responds `false` when a refresh is already running.
    Refresh { responder: oneshot::Sender<bool> },
    /// Re-issue failed loads. Responds `false` when nothing had failed.
    Retry { responder: oneshot::Sender<bool> },
    /// The consumer looked at the item at `index`; may trigger a prefetch.
    ItemAccessed { index: usize },
    /// Get the current snapshot.
    GetSnapshot {
        responder: oneshot::Sender<PagingSnapshot>,
    },
    /// Stop the actor, cancelling in-flight loads.
    Shutdown { responder: oneshot::Sender<()> },
}

/// Progress of one load direction.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    NotLoading { end_of_pagination_reached: bool },
    Loading,
    Error(ApiError),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn error(&self) -> Option<&ApiError> {
        match self {
            Self::Error(error) => Some(error),
            _ => None,
        }
    }
}

impl Default for LoadState {
    fn default() -> Self {
        Self::NotLoading {
            end_of_pagination_reached: false,
        }
    }
}

/// Where a merged page sits in the visible list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSummary {
    pub key: u32,
    pub prev_key: Option<u32>,
    pub next_key: Option<u32>,
    pub item_range: Range<usize>,
}

/// Everything a consumer needs to render the listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PagingSnapshot {
    pub items: Vec<Movie>,
    pub pages: Vec<PageSummary>,
    pub refresh: LoadState,
    pub append: LoadState,
    pub prepend: LoadState,
    pub anchor_position: Option<usize>,
}

impl PagingSnapshot {
    /// True when no load is running in any direction.
    pub fn is_idle(&self) -> bool {
        !self.refresh.is_loading() && !self.append.is_loading() && !self.prepend.is_loading()
    }
}
