// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Query Pager
//!
//! Grouped pagination over ordered, offset-addressable sequences.
//!
//! A page holds up to `page_size` *groups*, where a group is a maximal run of
//! consecutive items that an [`EqualityPolicy`] considers equal. Items are
//! pulled from the source in windows of `window_size`, so a page never needs
//! to know its length up front.
//!
//! ## Features
//!
//! - **Grouped pages**: Runs of equal items never split across a page boundary
//! - **Windowed reads**: Only `skip`/`take` and `count` are asked of a source
//! - **Navigation history**: Next, previous and first without recounting
//! - **Sync and async**: [`PagedQueryCursor`] and [`AsyncPagedQueryCursor`]
//! - **Sources**: In-memory vectors, DuckDB queries, offset-style HTTP APIs
//!
//! ## Quick Start
//!
//! ```rust
//! use query_pager::{PagedQueryCursor, ValueEquality, VecSource};
//!
//! let source = VecSource::new("AABCCCD".chars().collect());
//! let mut cursor = PagedQueryCursor::new(source, 2, 3, ValueEquality)?;
//!
//! assert_eq!(cursor.collect_page()?, vec!['A', 'A', 'B']);
//! assert!(cursor.move_next()?);
//! assert_eq!(cursor.collect_page()?, vec!['C', 'C', 'C', 'D']);
//! # Ok::<(), query_pager::Error>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Paged cursors                            │
//! │  current_page() → items   move_next/previous/first/last()       │
//! │  total_item_count() (memoized)                                  │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────────────┬───────────┴───────────┬──────────────────────┐
//! │  GroupScanner    │     CursorState       │   EqualityPolicy     │
//! ├──────────────────┼───────────────────────┼──────────────────────┤
//! │ window reads     │ offsets               │ Value / Key          │
//! │ group counting   │ history stack         │ Field / Json         │
//! └──────────────────┴───────────────────────┴──────────────────────┘
//!                                │
//! ┌──────────────────┬───────────┴───────────┬──────────────────────┐
//! │    VecSource     │     DuckDbSource      │     HttpSource       │
//! └──────────────────┴───────────────────────┴──────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types shared across modules
pub mod types;

/// Pager and CLI configuration
pub mod config;

/// Equality policies that decide group membership
pub mod equality;

/// Paged cursors
pub mod pagination;

/// Sequence sources
pub mod source;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use config::{BrowseConfig, PagerConfig, SourceConfig};
pub use equality::{EqualityPolicy, FieldEquality, JsonEquality, KeyEquality, ValueEquality};
pub use pagination::{AsyncPagedQueryCursor, Page, PagedQueryCursor};
pub use source::{
    AsyncSequenceSource, BlockingSource, DuckDbSource, HttpSource, HttpSourceConfig,
    SequenceSource, VecSource,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
