//! Sequence sources
//!
//! Supports: in-memory vectors, JSON files, DuckDB queries, offset-style HTTP APIs
//!
//! # Overview
//!
//! A cursor never fetches items itself. It asks a source for skip/take
//! windows and, at most once, for the total count. Sources are either
//! synchronous ([`SequenceSource`]) or async ([`AsyncSequenceSource`]);
//! [`BlockingSource`] bridges the former to the async cursor.

mod database;
mod http;
mod memory;
mod types;

pub use database::{DuckDbSource, MEMORY_DATABASE};
pub use http::{HttpSource, HttpSourceConfig};
pub use memory::VecSource;
pub use types::{AsyncSequenceSource, BlockingSource, SequenceSource};

#[cfg(test)]
mod tests;
