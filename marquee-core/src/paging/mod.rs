//! Now-playing pager.
//!
//! [`MoviePagingSource`] turns a page key into a catalog call and derives the
//! neighbouring keys. The pager actor spawned by [`spawn_pager`] owns the
//! merged pages, keeps at most one load in flight per key, and publishes a
//! [`PagingSnapshot`] after every change.

pub mod actor;
pub mod commands;
pub mod handle;
pub mod source;
pub mod state;

pub use actor::spawn_pager;
pub use commands::{LoadState, PageSummary, PagingSnapshot};
pub use handle::PagerHandle;
pub use source::{LoadKind, LoadParams, LoadResult, MoviePagingSource};
pub use state::{LoadedPage, PagingState};

/// Errors talking to the pager actor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PagingError {
    #[error("Pager has shut down")]
    ActorStopped,
}
