//! Marquee Search - Search-as-you-type over the movie catalog

#![deny(missing_docs)]
#![deny(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
//!
//! Turns a stream of keystrokes into at most one catalog search per settled
//! query. Newer queries cancel older in-flight searches, so only the latest
//! outcome ever becomes visible.

pub mod handle;
pub mod orchestrator;
pub mod query;
pub mod state;

// Re-export main types
pub use handle::SearchHandle;
pub use orchestrator::spawn_search;
pub use query::{is_valid_query, search_movies};
pub use state::SearchState;

/// Errors talking to the search orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// The orchestrator task is no longer running.
    #[error("Search orchestrator has shut down")]
    OrchestratorStopped,
}

/// Convenience type alias for Results with SearchError.
pub type Result<T> = std::result::Result<T, SearchError>;
