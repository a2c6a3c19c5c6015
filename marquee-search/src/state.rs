//! Visible search state.

use marquee_core::catalog::Movie;

/// What the search view should show.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SearchState {
    /// No search active; the unfiltered listing applies.
    #[default]
    Idle,
    /// A search for the current query is running.
    Loading,
    /// The latest search finished. An empty list means nothing matched.
    Success(Vec<Movie>),
    /// The latest search failed; carries a message ready for display.
    Error(String),
}

impl SearchState {
    /// Whether a search is running.
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Results of a finished search, if any.
    pub fn results(&self) -> Option<&[Movie]> {
        match self {
            Self::Success(movies) => Some(movies),
            _ => None,
        }
    }
}
