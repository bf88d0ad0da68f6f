//! Fixed-size page windows

use serde::Serialize;

/// The slice `[page_index * page_size, page_index * page_size + page_size)`
/// of `records`, clipped to the list. An index past the end yields an empty
/// slice; the index itself is never clamped.
pub fn paginate<T>(records: &[T], page_index: usize, page_size: usize) -> &[T] {
    let start = page_index.saturating_mul(page_size).min(records.len());
    let end = start.saturating_add(page_size).min(records.len());
    &records[start..end]
}

/// Current page of a paged list (zero-based index)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    page_index: usize,
    page_size: usize,
}

impl PageWindow {
    /// First page with the given size; a zero size is treated as one
    pub fn new(page_size: usize) -> Self {
        Self {
            page_index: 0,
            page_size: page_size.max(1),
        }
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn set_page(&mut self, page_index: usize) {
        self.page_index = page_index;
    }

    /// Back to the first page
    pub fn reset(&mut self) {
        self.page_index = 0;
    }

    /// Change the page size, keeping the first record of the current page
    /// on screen
    pub fn set_page_size(&mut self, page_size: usize) {
        let page_size = page_size.max(1);
        let first = self.page_index.saturating_mul(self.page_size);
        self.page_size = page_size;
        self.page_index = first / page_size;
    }

    /// Number of pages needed for `total` records
    pub fn total_pages(&self, total: usize) -> usize {
        total.div_ceil(self.page_size)
    }

    /// 1-based inclusive range of records on this page, `None` when empty
    pub fn display_range(&self, total: usize) -> Option<(usize, usize)> {
        let start = self.page_index.saturating_mul(self.page_size);
        if start >= total {
            return None;
        }
        let end = start.saturating_add(self.page_size).min(total);
        Some((start + 1, end))
    }

    /// Label such as `13-24 / 30`
    pub fn label(&self, total: usize) -> String {
        match self.display_range(total) {
            Some((start, end)) => format!("{}-{} / {}", start, end, total),
            None => format!("0-0 / {}", total),
        }
    }

    pub fn slice<'a, T>(&self, records: &'a [T]) -> &'a [T] {
        paginate(records, self.page_index, self.page_size)
    }
}

impl Default for PageWindow {
    fn default() -> Self {
        Self::new(12)
    }
}
