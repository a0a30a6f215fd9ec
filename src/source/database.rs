//! DuckDB-backed source
//!
//! Wraps an ordered SQL query. Windows are read by appending
//! `LIMIT`/`OFFSET` to the query, and every row is converted to a JSON object
//! keyed by column name. DuckDB can attach PostgreSQL, MySQL and SQLite
//! databases, so the query may reach any of them.

use super::types::SequenceSource;
use crate::error::{Error, Result};
use base64::Engine as _;
use duckdb::types::Value as DbValue;
use duckdb::Connection;
use serde_json::{Map, Value};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// In-memory database path
pub const MEMORY_DATABASE: &str = ":memory:";

/// Source over the rows of a DuckDB query
///
/// The query must be deterministic in order (use `ORDER BY`) and must not
/// carry its own `LIMIT`/`OFFSET`.
pub struct DuckDbSource {
    conn: Mutex<Connection>,
    query: String,
}

impl std::fmt::Debug for DuckDbSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuckDbSource")
            .field("query", &self.query)
            .finish_non_exhaustive()
    }
}

impl DuckDbSource {
    /// Open a database file (or [`MEMORY_DATABASE`]) and wrap `query`
    pub fn open(database: &str, query: impl Into<String>) -> Result<Self> {
        let conn = if database == MEMORY_DATABASE {
            Connection::open_in_memory()
        } else {
            Connection::open(database)
        }
        .map_err(|e| Error::database(format!("Failed to open DuckDB database '{database}': {e}")))?;

        Self::from_connection(conn, query)
    }

    /// Wrap `query` on an existing connection
    pub fn from_connection(conn: Connection, query: impl Into<String>) -> Result<Self> {
        let query = normalize_query(&query.into());
        if query.is_empty() {
            return Err(Error::invalid_value("query", "query cannot be empty"));
        }

        Ok(Self {
            conn: Mutex::new(conn),
            query,
        })
    }

    /// The wrapped query
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Run statements against the connection (setup, `ATTACH`, extensions)
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.lock()?
            .execute_batch(sql)
            .map_err(|e| Error::database(format!("Failed to execute batch: {e}")))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::database("DuckDB connection lock poisoned"))
    }

    fn window_sql(&self, skip: u64, take: usize) -> String {
        format!(
            "SELECT * FROM ({} LIMIT {take} OFFSET {skip}) AS q",
            self.query
        )
    }
}

impl SequenceSource for DuckDbSource {
    type Item = Value;

    fn read(&self, skip: u64, take: usize) -> Result<Vec<Value>> {
        let sql = self.window_sql(skip, take);
        debug!("Executing window query: {}", sql);

        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| Error::database(format!("Failed to prepare query: {e}")))?;
        let mut rows = stmt
            .query([])
            .map_err(|e| Error::database(format!("Failed to read window: {e}")))?;
        let columns = rows
            .as_ref()
            .map(duckdb::Statement::column_names)
            .unwrap_or_default();

        let mut records = Vec::new();
        while let Some(row) = rows
            .next()
            .map_err(|e| Error::database(format!("Failed to read row: {e}")))?
        {
            let mut record = Map::with_capacity(columns.len());
            for (index, column) in columns.iter().enumerate() {
                let value: DbValue = row
                    .get(index)
                    .map_err(|e| Error::database(format!("Failed to read column '{column}': {e}")))?;
                record.insert(column.clone(), duckdb_value_to_json(value));
            }
            records.push(Value::Object(record));
        }
        Ok(records)
    }

    fn count(&self) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM ({}) AS q", self.query);
        debug!("Executing count query: {}", sql);

        let count: i64 = self
            .lock()?
            .query_row(&sql, [], |row| row.get(0))
            .map_err(|e| Error::database(format!("Failed to count rows: {e}")))?;
        u64::try_from(count).map_err(|_| Error::database(format!("Negative row count: {count}")))
    }
}

/// Convert one DuckDB cell to JSON
///
/// Huge integers and decimals become strings so no precision is lost;
/// timestamps, dates and times become ISO-8601 strings and blobs base64.
fn duckdb_value_to_json(value: DbValue) -> Value {
    match value {
        DbValue::Null => Value::Null,
        DbValue::Boolean(b) => Value::Bool(b),
        DbValue::TinyInt(i) => Value::Number(i.into()),
        DbValue::SmallInt(i) => Value::Number(i.into()),
        DbValue::Int(i) => Value::Number(i.into()),
        DbValue::BigInt(i) => Value::Number(i.into()),
        DbValue::HugeInt(i) => Value::String(i.to_string()),
        DbValue::UTinyInt(i) => Value::Number(i.into()),
        DbValue::USmallInt(i) => Value::Number(i.into()),
        DbValue::UInt(i) => Value::Number(i.into()),
        DbValue::UBigInt(i) => Value::Number(i.into()),
        DbValue::Float(f) => {
            serde_json::Number::from_f64(f64::from(f)).map_or(Value::Null, Value::Number)
        }
        DbValue::Double(f) => serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number),
        DbValue::Decimal(d) => Value::String(d.to_string()),
        DbValue::Text(s) => Value::String(s),
        DbValue::Blob(b) => Value::String(base64::engine::general_purpose::STANDARD.encode(b)),
        DbValue::Timestamp(_, micros) => {
            let secs = micros.div_euclid(1_000_000);
            let nsecs = (micros.rem_euclid(1_000_000) * 1000) as u32;
            chrono::DateTime::from_timestamp(secs, nsecs)
                .map(|dt| Value::String(dt.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()))
                .unwrap_or(Value::Number(micros.into()))
        }
        DbValue::Date32(days) => {
            // 719_163 days from 0001-01-01 to 1970-01-01
            chrono::NaiveDate::from_num_days_from_ce_opt(days + 719_163)
                .map(|date| Value::String(date.format("%Y-%m-%d").to_string()))
                .unwrap_or(Value::Number(days.into()))
        }
        DbValue::Time64(_, micros) => {
            let secs = micros / 1_000_000;
            Value::String(format!(
                "{:02}:{:02}:{:02}.{:06}",
                secs / 3600,
                (secs % 3600) / 60,
                secs % 60,
                micros % 1_000_000
            ))
        }
        DbValue::List(items) => {
            Value::Array(items.into_iter().map(duckdb_value_to_json).collect())
        }
        other => Value::String(format!("{other:?}")),
    }
}

/// Strip whitespace and trailing semicolons so the query nests as a subquery
fn normalize_query(query: &str) -> String {
    query.trim().trim_end_matches(';').trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_query() {
        assert_eq!(
            normalize_query("  SELECT * FROM t ORDER BY id;  "),
            "SELECT * FROM t ORDER BY id"
        );
        assert_eq!(normalize_query("SELECT 1 ;;"), "SELECT 1");
    }

    #[test]
    fn test_window_sql() {
        let source = DuckDbSource::open(MEMORY_DATABASE, "SELECT 1 AS n;").unwrap();
        assert_eq!(
            source.window_sql(20, 10),
            "SELECT * FROM (SELECT 1 AS n LIMIT 10 OFFSET 20) AS q"
        );
    }

    #[test]
    fn test_empty_query_rejected() {
        let err = DuckDbSource::open(MEMORY_DATABASE, " ; ").unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_value_conversion() {
        assert_eq!(duckdb_value_to_json(DbValue::Null), Value::Null);
        assert_eq!(
            duckdb_value_to_json(DbValue::HugeInt(1 << 70)),
            serde_json::json!("1180591620717411303424")
        );
        assert_eq!(duckdb_value_to_json(DbValue::Double(f64::NAN)), Value::Null);
        assert_eq!(
            duckdb_value_to_json(DbValue::Blob(b"hi".to_vec())),
            serde_json::json!("aGk=")
        );
        assert_eq!(
            duckdb_value_to_json(DbValue::Date32(0)),
            serde_json::json!("1970-01-01")
        );
        assert_eq!(
            duckdb_value_to_json(DbValue::List(vec![DbValue::Int(1), DbValue::Null])),
            serde_json::json!([1, null])
        );
    }
}
