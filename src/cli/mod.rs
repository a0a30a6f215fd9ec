//! CLI module
//!
//! Command-line pager over a configured source.
//!
//! # Commands
//!
//! - `page` - Print one page as JSON (or pretty text)
//! - `count` - Print the source's total item count
//! - `browse` - Page interactively from stdin
//! - `validate` - Check a config file

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::{open_source, page_report, render_pretty, JsonCursor, JsonSource, PageReport, Runner};
