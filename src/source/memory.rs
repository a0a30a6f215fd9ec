//! In-memory source

use super::types::{AsyncSequenceSource, SequenceSource};
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;

/// Ordered items held in memory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VecSource<T> {
    items: Vec<T>,
}

impl<T> VecSource<T> {
    /// Create a source over `items`, in order
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the source holds no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The items, in order
    pub fn items(&self) -> &[T] {
        &self.items
    }
}

impl<T: Clone> VecSource<T> {
    fn window(&self, skip: u64, take: usize) -> Vec<T> {
        let start = usize::try_from(skip).unwrap_or(usize::MAX);
        self.items.iter().skip(start).take(take).cloned().collect()
    }
}

impl VecSource<Value> {
    /// Load a JSON array of records from a file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::Io(e)
            }
        })?;
        Self::from_json_str(&content)
    }

    /// Parse a JSON array of records
    pub fn from_json_str(json: &str) -> Result<Self> {
        match serde_json::from_str(json)? {
            Value::Array(items) => Ok(Self::new(items)),
            other => Err(Error::source_read(format!(
                "expected a JSON array of records, found {}",
                json_kind(&other)
            ))),
        }
    }
}

impl<T> From<Vec<T>> for VecSource<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

impl<T> FromIterator<T> for VecSource<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<T: Clone> SequenceSource for VecSource<T> {
    type Item = T;

    fn read(&self, skip: u64, take: usize) -> Result<Vec<T>> {
        Ok(self.window(skip, take))
    }

    fn count(&self) -> Result<u64> {
        Ok(self.items.len() as u64)
    }
}

#[async_trait]
impl<T: Clone + Send + Sync> AsyncSequenceSource for VecSource<T> {
    type Item = T;

    async fn read(&self, skip: u64, take: usize) -> Result<Vec<T>> {
        Ok(self.window(skip, take))
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.items.len() as u64)
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
