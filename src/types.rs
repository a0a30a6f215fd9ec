//! Common types shared across modules

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Page Position
// ============================================================================

/// Snapshot of where a cursor currently stands, for display
///
/// `first_item_number` and `last_item_number` are 1-based, so a pager
/// showing the first fifteen items of two hundred reports `1`, `15` and
/// `Some(200)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagePosition {
    /// Number of pages behind the current one
    pub page_index: usize,
    /// 1-based number of the first item on the page
    pub first_item_number: u64,
    /// 1-based number of the last item produced for the page
    pub last_item_number: u64,
    /// Total item count, if it has been computed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_item_count: Option<u64>,
}

impl fmt::Display for PagePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "page {} (items {}-{}",
            self.page_index + 1,
            self.first_item_number,
            self.last_item_number
        )?;
        if let Some(total) = self.total_item_count {
            write!(f, " of {total}")?;
        }
        write!(f, ")")
    }
}

// ============================================================================
// Navigation
// ============================================================================

/// A navigation request against a cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Navigation {
    /// Jump back to the first page
    First,
    /// Advance to the following page
    Next,
    /// Return to the previously visited page
    Previous,
    /// Behaves exactly like `Previous`
    Last,
}

impl FromStr for Navigation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "f" | "first" => Ok(Self::First),
            "n" | "next" => Ok(Self::Next),
            "p" | "prev" | "previous" => Ok(Self::Previous),
            "l" | "last" => Ok(Self::Last),
            other => Err(Error::invalid_value(
                "navigation",
                format!("unknown command '{other}' (expected first, next, previous or last)"),
            )),
        }
    }
}

impl fmt::Display for Navigation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::First => "first",
            Self::Next => "next",
            Self::Previous => "previous",
            Self::Last => "last",
        };
        f.write_str(name)
    }
}

// ============================================================================
// JSON Paths
// ============================================================================

/// Look up a dotted path (`$.data.items`, `package.id`) inside a JSON value
///
/// An empty path or `$` returns the value itself. Only object keys are
/// followed.
pub fn lookup_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.trim();
    let path = path
        .strip_prefix("$.")
        .or_else(|| path.strip_prefix('$'))
        .unwrap_or(path);
    if path.is_empty() {
        return Some(value);
    }

    let mut current = value;
    for part in path.split('.') {
        match current {
            Value::Object(map) => {
                current = map.get(part)?;
            }
            _ => return None,
        }
    }

    Some(current)
}
