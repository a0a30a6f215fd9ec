//! Synchronous paged cursor

use super::scanner::{GroupScanner, Step};
use super::state::CursorState;
use crate::config::PagerConfig;
use crate::equality::EqualityPolicy;
use crate::error::Result;
use crate::source::SequenceSource;
use crate::types::{Navigation, PagePosition};
use std::iter::FusedIterator;
use tracing::debug;

/// Pages through a skip/take source, counting runs of equal items as one slot
///
/// ```
/// use query_pager::equality::ValueEquality;
/// use query_pager::pagination::PagedQueryCursor;
/// use query_pager::source::VecSource;
///
/// let source = VecSource::new(vec!['A', 'A', 'B', 'C', 'C', 'C', 'D']);
/// let mut cursor = PagedQueryCursor::new(source, 2, 2, ValueEquality)?;
///
/// assert_eq!(cursor.collect_page()?, vec!['A', 'A', 'B']);
/// assert!(cursor.move_next()?);
/// assert_eq!(cursor.collect_page()?, vec!['C', 'C', 'C', 'D']);
/// assert!(!cursor.move_next()?);
/// # Ok::<(), query_pager::Error>(())
/// ```
#[derive(Debug)]
pub struct PagedQueryCursor<S, E> {
    source: S,
    equality: E,
    page_size: usize,
    window_size: usize,
    state: CursorState,
}

impl<S, E> PagedQueryCursor<S, E>
where
    S: SequenceSource,
    S::Item: Clone,
    E: EqualityPolicy<S::Item>,
{
    /// Create a cursor on the first page
    ///
    /// Fails when `page_size` or `window_size` is zero. The total count is
    /// not queried until it is first needed.
    pub fn new(source: S, page_size: usize, window_size: usize, equality: E) -> Result<Self> {
        let config = PagerConfig::new(page_size, window_size);
        Self::with_config(source, &config, equality)
    }

    /// Create a cursor from a validated [`PagerConfig`]
    pub fn with_config(source: S, config: &PagerConfig, equality: E) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            source,
            equality,
            page_size: config.page_size,
            window_size: config.window_size,
            state: CursorState::new(),
        })
    }

    /// Number of pages behind the current one
    pub fn page_index(&self) -> usize {
        self.state.page_index()
    }

    /// 1-based number of the first item on the page
    pub fn first_item_number(&self) -> u64 {
        self.state.first_item_number()
    }

    /// 1-based number of the last item produced for the page
    pub fn last_item_number(&self) -> u64 {
        self.state.last_item_number()
    }

    /// Offset of the first item of the current page
    pub fn current_offset(&self) -> u64 {
        self.state.current_offset()
    }

    /// Offset the following page starts at
    pub fn next_offset(&self) -> u64 {
        self.state.next_offset()
    }

    /// Maximum number of groups per page
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of items requested per read
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// The underlying source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Policy deciding group membership
    pub fn equality(&self) -> &E {
        &self.equality
    }

    /// Snapshot of the current position, including the count if known
    pub fn position(&self) -> PagePosition {
        self.state.position()
    }

    /// Total number of items in the source
    ///
    /// Queried once and cached for the life of the cursor. A failed query is
    /// not cached.
    pub fn total_item_count(&mut self) -> Result<u64> {
        if let Some(total) = self.state.cached_total() {
            return Ok(total);
        }
        let total = self.source.count()?;
        debug!(total, "Counted source items");
        Ok(self.state.remember_total(total))
    }

    /// Lazily produce the current page
    ///
    /// The page borrows the cursor mutably, so it has to be dropped before
    /// navigating. Producing it again replays the same page.
    pub fn current_page(&mut self) -> Page<'_, S, E> {
        let scanner = GroupScanner::new(
            self.state.current_offset(),
            self.page_size,
            self.window_size,
        );
        Page {
            cursor: self,
            scanner,
            started: false,
        }
    }

    /// Produce the current page into a `Vec`
    pub fn collect_page(&mut self) -> Result<Vec<S::Item>> {
        self.current_page().collect()
    }

    /// Return to the first page; always succeeds
    pub fn move_first(&mut self) -> bool {
        self.state.move_first()
    }

    /// Advance to the following page
    ///
    /// Returns `Ok(false)` when the last produced page did not advance or
    /// nothing remains. The count is only queried when the page advanced.
    pub fn move_next(&mut self) -> Result<bool> {
        if !self.state.has_advanced() {
            return Ok(false);
        }
        let total = self.total_item_count()?;
        Ok(self.state.move_next(total))
    }

    /// Return to the previously visited page
    pub fn move_previous(&mut self) -> bool {
        self.state.move_previous()
    }

    /// Same as [`PagedQueryCursor::move_previous`]
    pub fn move_last(&mut self) -> bool {
        self.state.move_last()
    }

    /// Apply a [`Navigation`] command
    pub fn navigate(&mut self, navigation: Navigation) -> Result<bool> {
        match navigation {
            Navigation::First => Ok(self.move_first()),
            Navigation::Next => self.move_next(),
            Navigation::Previous => Ok(self.move_previous()),
            Navigation::Last => Ok(self.move_last()),
        }
    }
}

/// One page of a [`PagedQueryCursor`], produced on demand
///
/// Yields each item as `Ok`. A failed read is yielded once as `Err`, after
/// which the page ends.
pub struct Page<'c, S, E>
where
    S: SequenceSource,
{
    cursor: &'c mut PagedQueryCursor<S, E>,
    scanner: GroupScanner<S::Item>,
    started: bool,
}

impl<S, E> Page<'_, S, E>
where
    S: SequenceSource,
    S::Item: Clone,
{
    /// Number of groups started so far
    pub fn groups(&self) -> usize {
        self.scanner.groups()
    }
}

impl<S, E> Iterator for Page<'_, S, E>
where
    S: SequenceSource,
    S::Item: Clone,
    E: EqualityPolicy<S::Item>,
{
    type Item = Result<S::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.started {
            self.started = true;
            self.cursor.state.begin_page();
        }

        loop {
            match self.scanner.step(&self.cursor.equality) {
                Step::Fetch { skip, take } => match self.cursor.source.read(skip, take) {
                    Ok(window) => {
                        debug!(skip, take, returned = window.len(), "Read window");
                        self.scanner.fill(window);
                    }
                    Err(e) => {
                        self.scanner.finish();
                        return Some(Err(e));
                    }
                },
                Step::Emit(item) => {
                    self.cursor.state.record_emitted();
                    return Some(Ok(item));
                }
                Step::Done => return None,
            }
        }
    }
}

impl<S, E> FusedIterator for Page<'_, S, E>
where
    S: SequenceSource,
    S::Item: Clone,
    E: EqualityPolicy<S::Item>,
{
}
