//! Run-length grouping over windowed reads
//!
//! `GroupScanner` holds no reference to a source. Its driver asks it what to
//! do next, performs any read it requests, and hands the window back. The
//! sync iterator and the async stream share it, so both suspend at exactly
//! the same points: before a window read and after each produced item.

use crate::equality::EqualityPolicy;
use std::collections::VecDeque;

/// What the driver has to do next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step<T> {
    /// Read `take` items starting at `skip` and pass them to [`GroupScanner::fill`]
    Fetch {
        /// Items to skip
        skip: u64,
        /// Items to request
        take: usize,
    },
    /// Produce this item
    Emit(T),
    /// The page is complete
    Done,
}

/// Produces one page of `page_size` groups from windows of `window_size` items
#[derive(Debug)]
pub struct GroupScanner<T> {
    page_size: usize,
    window_size: usize,
    read_offset: u64,
    buffer: VecDeque<T>,
    // Last item of the open group; `None` at a group start.
    last_emitted: Option<T>,
    groups: usize,
    finished: bool,
}

impl<T: Clone> GroupScanner<T> {
    /// Start scanning at `start_offset`
    pub fn new(start_offset: u64, page_size: usize, window_size: usize) -> Self {
        Self {
            page_size,
            window_size,
            read_offset: start_offset,
            buffer: VecDeque::new(),
            last_emitted: None,
            groups: 0,
            finished: page_size == 0,
        }
    }

    /// Advance until an item is ready, a read is needed, or the page ends
    pub fn step<E>(&mut self, equality: &E) -> Step<T>
    where
        E: EqualityPolicy<T> + ?Sized,
    {
        loop {
            if self.finished {
                return Step::Done;
            }

            let Some(head) = self.buffer.front() else {
                return Step::Fetch {
                    skip: self.read_offset,
                    take: self.window_size,
                };
            };

            let continues_group = match &self.last_emitted {
                None => true,
                Some(last) => equality.equals(last, head),
            };

            if continues_group {
                if let Some(item) = self.buffer.pop_front() {
                    if self.last_emitted.is_none() {
                        self.groups += 1;
                    }
                    self.last_emitted = Some(item.clone());
                    return Step::Emit(item);
                }
                continue;
            }

            // The head starts the next group and stays buffered.
            self.last_emitted = None;
            if self.groups >= self.page_size {
                self.finished = true;
            }
        }
    }

    /// Hand over the window requested by the last [`Step::Fetch`]
    ///
    /// An empty window means the sequence has ended.
    pub fn fill(&mut self, window: Vec<T>) {
        if window.is_empty() {
            self.finished = true;
            return;
        }
        self.read_offset += window.len() as u64;
        self.buffer.extend(window);
    }

    /// Stop producing, e.g. after a failed read
    pub fn finish(&mut self) {
        self.finished = true;
    }

    /// Number of groups started so far
    pub fn groups(&self) -> usize {
        self.groups
    }

    /// Whether the page is complete
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}
