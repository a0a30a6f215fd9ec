//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Page through large queries, one group of equal items per slot
#[derive(Parser, Debug)]
#[command(name = "query-pager")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Pager configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the configured page size (groups per page)
    #[arg(long, global = true)]
    pub page_size: Option<usize>,

    /// Override the configured window size (items per read)
    #[arg(long, global = true)]
    pub window_size: Option<usize>,

    /// Override the configured grouping field path
    #[arg(long, global = true)]
    pub group_by: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print one page, walking forward from the first
    Page {
        /// 1-based page number
        #[arg(short, long, default_value = "1")]
        number: usize,
    },

    /// Print the total item count of the source
    Count,

    /// Page interactively: n(ext), p(revious), f(irst), l(ast), q(uit)
    Browse,

    /// Validate the configuration file
    Validate,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
