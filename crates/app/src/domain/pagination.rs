//! Cursor pagination over time-ordered identifiers.

use serde::Serialize;

/// Largest page any listing returns.
pub const MAX_PAGE_SIZE: usize = 20;

/// One page of results plus the cursor for the next page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T, C> {
    pub items: Vec<T>,
    pub next_cursor: Option<C>,
}

/// Clamp a requested page size to `1..=MAX_PAGE_SIZE`.
#[must_use]
pub fn page_size(requested: Option<usize>) -> usize {
    requested.unwrap_or(MAX_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

impl<T, C> Page<T, C> {
    /// Build a page from a query that fetched one row more than `size`.
    ///
    /// The extra row only signals that another page exists; the cursor is taken
    /// from the last row kept.
    pub fn from_overfetch(mut rows: Vec<T>, size: usize, cursor_of: impl Fn(&T) -> C) -> Self {
        let has_more = rows.len() > size;

        rows.truncate(size);

        let next_cursor = if has_more {
            rows.last().map(cursor_of)
        } else {
            None
        };

        Self {
            items: rows,
            next_cursor,
        }
    }
}
