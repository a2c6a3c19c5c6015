//! Merged pages and the refresh anchor.

use std::ops::Range;

use crate::catalog::Movie;

/// A page merged into the visible list.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedPage {
    pub key: u32,
    pub items: Vec<Movie>,
    pub prev_key: Option<u32>,
    pub next_key: Option<u32>,
}

/// Pages merged so far, in key order, plus the last accessed position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PagingState {
    pub pages: Vec<LoadedPage>,
    pub anchor_position: Option<usize>,
}

impl PagingState {
    pub fn item_count(&self) -> usize {
        self.pages.iter().map(|page| page.items.len()).sum()
    }

    pub fn items(&self) -> Vec<Movie> {
        self.pages
            .iter()
            .flat_map(|page| page.items.iter().cloned())
            .collect()
    }

    /// Item ranges of each page within the merged list.
    pub fn page_ranges(&self) -> Vec<Range<usize>> {
        let mut offset = 0;
        self.pages
            .iter()
            .map(|page| {
                let range = offset..offset + page.items.len();
                offset = range.end;
                range
            })
            .collect()
    }

    /// Page holding `position`, or the nearest end page when it lies outside
    /// the merged items.
    pub fn closest_page_to_position(&self, position: usize) -> Option<&LoadedPage> {
        let mut offset = 0;
        for page in &self.pages {
            offset += page.items.len();
            if position < offset {
                return Some(page);
            }
        }
        self.pages.last()
    }

    /// Key that reloads the page around the anchor.
    ///
    /// `prev_key + 1` when the page has a predecessor, otherwise
    /// `next_key - 1`, otherwise none (start from the first page).
    pub fn refresh_key(&self) -> Option<u32> {
        let anchor = self.anchor_position?;
        let page = self.closest_page_to_position(anchor)?;

        page.prev_key
            .map(|prev| prev + 1)
            .or_else(|| page.next_key.and_then(|next| next.checked_sub(1)))
    }

    pub fn first_prev_key(&self) -> Option<u32> {
        self.pages.first().and_then(|page| page.prev_key)
    }

    pub fn last_next_key(&self) -> Option<u32> {
        self.pages.last().and_then(|page| page.next_key)
    }
}
