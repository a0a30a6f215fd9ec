//! Pagination module
//!
//! Presents a skip/take source as fixed-size pages, where page size is
//! measured in groups of consecutive equal items rather than raw items.
//!
//! # Overview
//!
//! - [`PagedQueryCursor`] - synchronous cursor producing pages as iterators
//! - [`AsyncPagedQueryCursor`] - the same cursor over async sources, producing
//!   pages as streams
//! - [`CursorState`] - offsets, navigation history and the memoized count
//! - [`GroupScanner`] - the grouping algorithm, independent of any I/O
//!
//! Navigation keeps a stack of visited offsets, so moving back always lands
//! exactly where a page started before, whatever the group sizes were.

mod cursor;
mod scanner;
mod state;
mod stream;

pub use cursor::{Page, PagedQueryCursor};
pub use scanner::{GroupScanner, Step};
pub use state::CursorState;
pub use stream::AsyncPagedQueryCursor;
