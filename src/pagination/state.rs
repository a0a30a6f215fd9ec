//! Navigation state shared by the sync and async cursors

use crate::types::PagePosition;

/// Offsets, history and the memoized count of one cursor
///
/// `next_offset` is only meaningful after a page has been produced: it is
/// where the following page starts. Invariant: `next_offset >= current_offset`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CursorState {
    current_offset: u64,
    next_offset: u64,
    history: Vec<u64>,
    total_item_count: Option<u64>,
}

impl CursorState {
    /// Create a state positioned on the first page
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset of the first item of the current page
    pub fn current_offset(&self) -> u64 {
        self.current_offset
    }

    /// Offset the following page starts at
    pub fn next_offset(&self) -> u64 {
        self.next_offset
    }

    /// Number of pages behind the current one
    pub fn page_index(&self) -> usize {
        self.history.len()
    }

    /// 1-based number of the first item on the page
    pub fn first_item_number(&self) -> u64 {
        self.current_offset + 1
    }

    /// 1-based number of the last item produced for the page
    pub fn last_item_number(&self) -> u64 {
        self.next_offset
    }

    /// The total item count, if it has been computed
    pub fn cached_total(&self) -> Option<u64> {
        self.total_item_count
    }

    /// Memoize the total item count; later calls keep the first value
    pub fn remember_total(&mut self, total: u64) -> u64 {
        *self.total_item_count.get_or_insert(total)
    }

    /// Snapshot for display
    pub fn position(&self) -> PagePosition {
        PagePosition {
            page_index: self.page_index(),
            first_item_number: self.first_item_number(),
            last_item_number: self.last_item_number(),
            total_item_count: self.total_item_count,
        }
    }

    /// Rewind `next_offset` before producing the current page again
    pub(crate) fn begin_page(&mut self) {
        self.next_offset = self.current_offset;
    }

    /// Account for one produced item
    pub(crate) fn record_emitted(&mut self) {
        self.next_offset += 1;
    }

    /// Whether producing the current page moved past `current_offset`
    pub fn has_advanced(&self) -> bool {
        self.next_offset != self.current_offset
    }

    /// Clear history and return to offset 0
    pub fn move_first(&mut self) -> bool {
        self.history.clear();
        self.current_offset = 0;
        self.next_offset = 0;
        true
    }

    /// Step forward if the last produced page advanced and more items remain
    pub fn move_next(&mut self, total_item_count: u64) -> bool {
        if self.has_advanced() && self.next_offset < total_item_count {
            self.history.push(self.current_offset);
            self.current_offset = self.next_offset;
            return true;
        }
        false
    }

    /// Step back to the previously visited offset
    pub fn move_previous(&mut self) -> bool {
        match self.history.pop() {
            Some(previous) => {
                self.next_offset = self.current_offset;
                self.current_offset = previous;
                true
            }
            None => false,
        }
    }

    /// Identical to [`CursorState::move_previous`]; no jump to the final page
    pub fn move_last(&mut self) -> bool {
        self.move_previous()
    }
}
