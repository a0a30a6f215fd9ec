//! Asynchronous paged cursor
//!
//! Same navigation model as [`super::PagedQueryCursor`], over an
//! [`AsyncSequenceSource`]. Window reads and the one-time count are the only
//! await points, and reads never overlap.

use super::scanner::{GroupScanner, Step};
use super::state::CursorState;
use crate::config::PagerConfig;
use crate::equality::EqualityPolicy;
use crate::error::Result;
use crate::source::AsyncSequenceSource;
use crate::types::{Navigation, PagePosition};
use futures::stream::{self, Stream, TryStreamExt};
use tracing::debug;

/// Async counterpart of [`super::PagedQueryCursor`]
#[derive(Debug)]
pub struct AsyncPagedQueryCursor<S, E> {
    source: S,
    equality: E,
    page_size: usize,
    window_size: usize,
    state: CursorState,
}

/// Driver state threaded through the page stream
struct PageDriver<'c, S, E>
where
    S: AsyncSequenceSource,
{
    cursor: &'c mut AsyncPagedQueryCursor<S, E>,
    scanner: GroupScanner<S::Item>,
    started: bool,
}

impl<S, E> PageDriver<'_, S, E>
where
    S: AsyncSequenceSource,
    S::Item: Clone,
    E: EqualityPolicy<S::Item>,
{
    async fn next_item(&mut self) -> Result<Option<S::Item>> {
        if !self.started {
            self.started = true;
            self.cursor.state.begin_page();
        }

        loop {
            match self.scanner.step(&self.cursor.equality) {
                Step::Fetch { skip, take } => {
                    let window = self.cursor.source.read(skip, take).await?;
                    debug!(skip, take, returned = window.len(), "Read window");
                    self.scanner.fill(window);
                }
                Step::Emit(item) => {
                    self.cursor.state.record_emitted();
                    return Ok(Some(item));
                }
                Step::Done => return Ok(None),
            }
        }
    }
}

impl<S, E> AsyncPagedQueryCursor<S, E>
where
    S: AsyncSequenceSource,
    S::Item: Clone,
    E: EqualityPolicy<S::Item>,
{
    /// Create a cursor on the first page
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

    pub fn page_index(&self) -> usize {
        self.state.page_index()
    }

    pub fn first_item_number(&self) -> u64 {
        self.state.first_item_number()
    }

    pub fn last_item_number(&self) -> u64 {
        self.state.last_item_number()
    }

    pub fn current_offset(&self) -> u64 {
        self.state.current_offset()
    }

    pub fn next_offset(&self) -> u64 {
        self.state.next_offset()
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn equality(&self) -> &E {
        &self.equality
    }

    pub fn position(&self) -> PagePosition {
        self.state.position()
    }

    /// Total number of items in the source, queried once
    pub async fn total_item_count(&mut self) -> Result<u64> {
        if let Some(total) = self.state.cached_total() {
            return Ok(total);
        }
        let total = self.source.count().await?;
        debug!(total, "Counted source items");
        Ok(self.state.remember_total(total))
    }

    /// Lazily produce the current page as a stream
    ///
    /// The stream borrows the cursor mutably and ends after the first error.
    pub fn current_page(&mut self) -> impl Stream<Item = Result<S::Item>> + '_ {
        let scanner = GroupScanner::new(
            self.state.current_offset(),
            self.page_size,
            self.window_size,
        );
        let driver = PageDriver {
            cursor: self,
            scanner,
            started: false,
        };

        stream::try_unfold(driver, |mut driver| async move {
            driver
                .next_item()
                .await
                .map(|item| item.map(|item| (item, driver)))
        })
    }

    /// Produce the current page into a `Vec`
    pub async fn collect_page(&mut self) -> Result<Vec<S::Item>> {
        self.current_page().try_collect().await
    }

    pub fn move_first(&mut self) -> bool {
        self.state.move_first()
    }

    /// Advance to the following page; queries the count only when needed
    pub async fn move_next(&mut self) -> Result<bool> {
        if !self.state.has_advanced() {
            return Ok(false);
        }
        let total = self.total_item_count().await?;
        Ok(self.state.move_next(total))
    }

    pub fn move_previous(&mut self) -> bool {
        self.state.move_previous()
    }

    /// Same as [`AsyncPagedQueryCursor::move_previous`]
    pub fn move_last(&mut self) -> bool {
        self.state.move_last()
    }

    /// Apply a [`Navigation`] command
    pub async fn navigate(&mut self, navigation: Navigation) -> Result<bool> {
        match navigation {
            Navigation::First => Ok(self.move_first()),
            Navigation::Next => self.move_next().await,
            Navigation::Previous => Ok(self.move_previous()),
            Navigation::Last => Ok(self.move_last()),
        }
    }
}
