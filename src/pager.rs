//! Client-side pagination over a fetched result set.

use serde::Serialize;

pub const PAGE_SIZE: usize = 10;

/// The visible window of one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageSlice<'a, T> {
    pub page_items: &'a [T],
    /// Zero-based, inclusive.
    pub start_index: usize,
    /// Exclusive. Displayed range is `start_index + 1 ..= end_index`.
    pub end_index: usize,
    pub total_items: usize,
}

/// Slices page `page` (1-based). Pages past the end are empty, not errors.
pub fn slice<T>(items: &[T], page: usize, page_size: usize) -> PageSlice<'_, T> {
    let total_items = items.len();
    let start_index = page.saturating_sub(1).saturating_mul(page_size);
    let end_index = start_index.saturating_add(page_size).min(total_items);
    let page_items = items.get(start_index..end_index).unwrap_or_default();
    PageSlice { page_items, start_index, end_index, total_items }
}

pub fn page_count(total_items: usize, page_size: usize) -> usize {
    if page_size == 0 { 0 } else { total_items.div_ceil(page_size) }
}

/// Current-page pointer owned by the presentation layer.
///
/// The pointer follows a query identity (the submission id): observing a
/// different id resets it to page 1. Page changes never trigger a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageState {
    pub current_page: usize,
    pub page_size: usize,
    query: Option<u64>,
}

impl Default for PageState {
    fn default() -> Self { Self::new(PAGE_SIZE) }
}

impl PageState {
    pub fn new(page_size: usize) -> Self { Self { current_page: 1, page_size: page_size.max(1), query: None } }

    /// Resets to page 1 when `query` differs from the last one seen.
    pub fn observe(&mut self, query: u64) {
        if self.query != Some(query) {
            self.query = Some(query);
            self.current_page = 1;
        }
    }

    pub fn go_to(&mut self, page: usize) { self.current_page = page.max(1); }

    pub fn next(&mut self, total_items: usize) {
        if self.current_page < page_count(total_items, self.page_size) {
            self.current_page += 1;
        }
    }

    pub fn prev(&mut self) {
        if self.current_page > 1 {
            self.current_page -= 1;
        }
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> PageSlice<'a, T> { slice(items, self.current_page, self.page_size) }

    pub fn show_controls(&self, total_items: usize) -> bool { total_items > self.page_size }
}
