//! Configuration types
//!
//! [`PagerConfig`] carries the two sizes every cursor needs. [`BrowseConfig`]
//! is the YAML file the CLI reads: pager sizes, an optional grouping field
//! and the source definition.
//!
//! ```yaml
//! pager:
//!   page_size: 15
//!   window_size: 30
//! group_by: id
//! source:
//!   type: duckdb
//!   database: packages.duckdb
//!   query: SELECT id, version FROM packages ORDER BY id, version DESC
//! ```

use crate::error::{Error, Result};
use crate::source::{HttpSourceConfig, MEMORY_DATABASE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// Pager Config
// ============================================================================

/// Page and window sizes for a cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagerConfig {
    /// Groups per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Items requested per source read
    #[serde(default = "default_window_size")]
    pub window_size: usize,
}

fn default_page_size() -> usize {
    15
}

fn default_window_size() -> usize {
    30
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            window_size: default_window_size(),
        }
    }
}

impl PagerConfig {
    /// Create a pager config
    pub fn new(page_size: usize, window_size: usize) -> Self {
        Self {
            page_size,
            window_size,
        }
    }

    /// Both sizes must be at least 1
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::invalid_value("page_size", "must be at least 1"));
        }
        if self.window_size == 0 {
            return Err(Error::invalid_value("window_size", "must be at least 1"));
        }
        Ok(())
    }
}

// ============================================================================
// Source Config
// ============================================================================

/// Where the CLI reads items from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceConfig {
    /// A JSON file holding an array of records
    JsonFile {
        /// Path to the file
        path: PathBuf,
    },

    /// An ordered DuckDB query
    Duckdb {
        /// Database file, or `:memory:`
        #[serde(default = "default_database")]
        database: String,
        /// Statements run once before paging (e.g. `ATTACH`)
        #[serde(default)]
        setup: Option<String>,
        /// The ordered query to page through
        query: String,
    },

    /// An offset-style JSON API
    Http(HttpSourceConfig),
}

fn default_database() -> String {
    MEMORY_DATABASE.to_string()
}

impl SourceConfig {
    /// Short name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Self::JsonFile { .. } => "json_file",
            Self::Duckdb { .. } => "duckdb",
            Self::Http(_) => "http",
        }
    }

    /// Check the definition without touching the source
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::JsonFile { path } => {
                if path.as_os_str().is_empty() {
                    return Err(Error::missing_field("source.path"));
                }
                Ok(())
            }
            Self::Duckdb { query, .. } => {
                if query.trim().is_empty() {
                    return Err(Error::missing_field("source.query"));
                }
                Ok(())
            }
            Self::Http(http) => http.validate(),
        }
    }
}

// ============================================================================
// Browse Config
// ============================================================================

/// Configuration file for the CLI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowseConfig {
    /// Page and window sizes
    #[serde(default)]
    pub pager: PagerConfig,

    /// Dotted field path whose value groups records; whole records when absent
    #[serde(default)]
    pub group_by: Option<String>,

    /// Source definition
    pub source: SourceConfig,
}

impl BrowseConfig {
    /// Load and validate a YAML (or JSON) config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::config(format!(
                    "Failed to read config file '{}': {}",
                    path.display(),
                    e
                ))
            }
        })?;
        Self::from_str(&content)
    }

    /// Parse and validate a YAML (or JSON) config
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate pager sizes, grouping and source
    pub fn validate(&self) -> Result<()> {
        self.pager.validate()?;
        if let Some(group_by) = &self.group_by {
            if group_by.trim().is_empty() {
                return Err(Error::invalid_value("group_by", "cannot be empty"));
            }
        }
        self.source.validate()
    }
}
