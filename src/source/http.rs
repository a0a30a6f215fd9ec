//! HTTP source for offset-style JSON APIs
//!
//! Reads windows with `GET url?skip=N&take=M` (parameter names are
//! configurable, e.g. `$skip`/`$top` for OData feeds) and counts with a
//! single request. Requests are never retried; the caller decides what to
//! do with a failure.

use super::memory::json_kind;
use super::types::AsyncSequenceSource;
use crate::error::{Error, Result};
use crate::types::lookup_path;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Configuration for an [`HttpSource`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpSourceConfig {
    /// Endpoint returning windows of records
    pub url: String,

    /// Query parameter carrying the number of items to skip
    #[serde(default = "default_skip_param")]
    pub skip_param: String,

    /// Query parameter carrying the number of items to return
    #[serde(default = "default_take_param")]
    pub take_param: String,

    /// Path to the records; the whole body when absent
    ///
    /// A dotted path (`data.items`) must point at an array. JSONPath with
    /// indexes or wildcards (`$.results[*]`) is also accepted.
    #[serde(default)]
    pub records_path: Option<String>,

    /// Endpoint returning the total count; defaults to `url` with `take=0`
    #[serde(default)]
    pub count_url: Option<String>,

    /// Dotted path to the total count in the count response
    #[serde(default = "default_count_path")]
    pub count_path: String,

    /// Headers sent with every request
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_skip_param() -> String {
    "skip".to_string()
}

fn default_take_param() -> String {
    "take".to_string()
}

fn default_count_path() -> String {
    "total".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl HttpSourceConfig {
    /// Create a config with default parameter names
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            skip_param: default_skip_param(),
            take_param: default_take_param(),
            records_path: None,
            count_url: None,
            count_path: default_count_path(),
            headers: HashMap::new(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Set the records path
    #[must_use]
    pub fn with_records_path(mut self, path: impl Into<String>) -> Self {
        self.records_path = Some(path.into());
        self
    }

    /// Set a dedicated count endpoint and the path of the count in its body
    #[must_use]
    pub fn with_count(mut self, url: impl Into<String>, path: impl Into<String>) -> Self {
        self.count_url = Some(url.into());
        self.count_path = path.into();
        self
    }

    /// Rename the skip/take query parameters
    #[must_use]
    pub fn with_params(mut self, skip: impl Into<String>, take: impl Into<String>) -> Self {
        self.skip_param = skip.into();
        self.take_param = take.into();
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Check URLs and parameter names
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.url)?;
        if let Some(count_url) = &self.count_url {
            Url::parse(count_url)?;
        }
        if self.skip_param.is_empty() || self.take_param.is_empty() {
            return Err(Error::invalid_value(
                "skip_param",
                "skip and take parameter names cannot be empty",
            ));
        }
        if self.timeout_secs == 0 {
            return Err(Error::invalid_value("timeout_secs", "must be at least 1"));
        }
        Ok(())
    }
}

/// Async source over an offset-style JSON API
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    config: HttpSourceConfig,
    url: Url,
    count_url: Option<Url>,
}

impl HttpSource {
    /// Build a source from its configuration
    pub fn new(config: HttpSourceConfig) -> Result<Self> {
        config.validate()?;

        let url = Url::parse(&config.url)?;
        let count_url = config.count_url.as_deref().map(Url::parse).transpose()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(format!("query-pager/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            config,
            url,
            count_url,
        })
    }

    /// The source configuration
    pub fn config(&self) -> &HttpSourceConfig {
        &self.config
    }

    async fn get_json(&self, url: &Url, query: &[(&str, String)]) -> Result<Value> {
        let mut request = self.client.get(url.clone());
        for (key, value) in &self.config.headers {
            request = request.header(key.as_str(), value.as_str());
        }
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::http_status(status.as_u16(), body));
        }

        Ok(response.json().await?)
    }

    fn window_params(&self, skip: u64, take: usize) -> [(&str, String); 2] {
        [
            (self.config.skip_param.as_str(), skip.to_string()),
            (self.config.take_param.as_str(), take.to_string()),
        ]
    }
}

#[async_trait]
impl AsyncSequenceSource for HttpSource {
    type Item = Value;

    async fn read(&self, skip: u64, take: usize) -> Result<Vec<Value>> {
        debug!(url = %self.url, skip, take, "Fetching window");
        let body = self.get_json(&self.url, &self.window_params(skip, take)).await?;
        extract_records(body, self.config.records_path.as_deref())
    }

    async fn count(&self) -> Result<u64> {
        let body = match &self.count_url {
            Some(count_url) => {
                debug!(url = %count_url, "Fetching count");
                self.get_json(count_url, &[]).await?
            }
            None => {
                debug!(url = %self.url, "Fetching count");
                self.get_json(&self.url, &self.window_params(0, 0)).await?
            }
        };
        extract_count(&body, &self.config.count_path)
    }
}

/// Pull the records array out of a response body
///
/// Plain dotted paths are walked directly. Paths with indexes, wildcards or
/// filters (`data[0].items`, `$.results[*]`) go through JSONPath.
fn extract_records(body: Value, records_path: Option<&str>) -> Result<Vec<Value>> {
    let path = records_path.unwrap_or("$");

    if path.contains('[') || path.contains('*') || path.contains("..") {
        let mut matches = extract_with_jsonpath(&body, path)?;
        if selects_many(path) {
            return Ok(matches);
        }
        // A single-match path has to land on the records array itself
        return match matches.len() {
            1 => expect_array(matches.remove(0), path),
            _ => Err(Error::record_extraction(path, "path not found in response")),
        };
    }

    let records = lookup_path(&body, path)
        .ok_or_else(|| Error::record_extraction(path, "path not found in response"))?;
    expect_array(records.clone(), path)
}

fn expect_array(records: Value, path: &str) -> Result<Vec<Value>> {
    match records {
        Value::Array(items) => Ok(items),
        other => Err(Error::record_extraction(
            path,
            format!("expected an array, found {}", json_kind(&other)),
        )),
    }
}

/// Whether every JSONPath match is a record of its own
fn selects_many(path: &str) -> bool {
    path.contains('*') || path.contains("..") || path.contains("[?") || path.contains(':')
}

/// Evaluate a JSONPath query, returning all matches
fn extract_with_jsonpath(body: &Value, path: &str) -> Result<Vec<Value>> {
    use jsonpath_rust::JsonPath;

    let query = if path.starts_with('$') {
        path.to_string()
    } else {
        format!("$.{path}")
    };
    let jp = JsonPath::try_from(query.as_str())
        .map_err(|e| Error::record_extraction(path, format!("invalid JSONPath: {e}")))?;

    match jp.find(body) {
        Value::Array(matches) => Ok(matches),
        Value::Null => Ok(vec![]),
        other => Ok(vec![other]),
    }
}

/// Read a non-negative count, given as a number or a numeric string
fn extract_count(body: &Value, count_path: &str) -> Result<u64> {
    let value = lookup_path(body, count_path)
        .ok_or_else(|| Error::record_extraction(count_path, "count not found in response"))?;

    let count = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    count.ok_or_else(|| {
        Error::record_extraction(count_path, format!("expected a non-negative count, found {value}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_records() {
        let body = json!({"data": {"items": [{"id": 1}, {"id": 2}]}});
        let records = extract_records(body, Some("data.items")).unwrap();
        assert_eq!(records, vec![json!({"id": 1}), json!({"id": 2})]);

        let records = extract_records(json!([1, 2, 3]), None).unwrap();
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn test_extract_records_errors() {
        let err = extract_records(json!({"data": []}), Some("items")).unwrap_err();
        assert!(err.to_string().contains("path not found"));

        let err = extract_records(json!({"data": {"id": 1}}), Some("data")).unwrap_err();
        assert!(err.to_string().contains("expected an array, found an object"));
    }

    #[test]
    fn test_extract_records_jsonpath() {
        let body = json!({"results": [{"id": "serde"}, {"id": "tokio"}]});
        let records = extract_records(body.clone(), Some("$.results[*]")).unwrap();
        assert_eq!(records, vec![json!({"id": "serde"}), json!({"id": "tokio"})]);

        let body = json!({"data": [{"items": [1, 2]}, {"items": [3]}]});
        assert_eq!(
            extract_records(body.clone(), Some("data[0].items")).unwrap(),
            vec![json!(1), json!(2)]
        );
        assert_eq!(
            extract_records(body.clone(), Some("$.data[*].items[*]")).unwrap(),
            vec![json!(1), json!(2), json!(3)]
        );

        let err = extract_records(body, Some("data[5].items")).unwrap_err();
        assert!(err.to_string().contains("path not found"));
    }

    #[test]
    fn test_extract_count() {
        assert_eq!(extract_count(&json!({"total": 42}), "total").unwrap(), 42);
        assert_eq!(
            extract_count(&json!({"meta": {"count": "7"}}), "meta.count").unwrap(),
            7
        );
        assert!(extract_count(&json!({"total": -1}), "total").is_err());
        assert!(extract_count(&json!({}), "total").is_err());
    }

    #[test]
    fn test_config_validate() {
        assert!(HttpSourceConfig::new("https://api.example.com/items")
            .validate()
            .is_ok());
        assert!(HttpSourceConfig::new("not a url").validate().is_err());

        let config = HttpSourceConfig::new("https://api.example.com/items").with_params("", "take");
        assert!(config.validate().unwrap_err().is_config());
    }

    #[test]
    fn test_config_defaults_from_yaml() {
        let config: HttpSourceConfig =
            serde_yaml::from_str("url: https://api.example.com/items").unwrap();
        assert_eq!(config.skip_param, "skip");
        assert_eq!(config.take_param, "take");
        assert_eq!(config.count_path, "total");
        assert_eq!(config.timeout_secs, 30);
        assert!(config.records_path.is_none());
    }
}
