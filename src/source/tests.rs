//! Tests for source module

use super::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::io::Write;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// VecSource Tests
// ============================================================================

#[test]
fn test_vec_source_windows() {
    let source = VecSource::new(vec![1, 2, 3, 4, 5]);

    assert_eq!(SequenceSource::read(&source, 0, 2).unwrap(), vec![1, 2]);
    assert_eq!(SequenceSource::read(&source, 3, 10).unwrap(), vec![4, 5]);
    assert!(SequenceSource::read(&source, 5, 2).unwrap().is_empty());
    assert!(SequenceSource::read(&source, u64::MAX, 2).unwrap().is_empty());
    assert_eq!(SequenceSource::count(&source).unwrap(), 5);
}

#[test]
fn test_vec_source_from_iter() {
    let source: VecSource<char> = "abc".chars().collect();
    assert_eq!(source.len(), 3);
    assert!(!source.is_empty());
    assert_eq!(source.items(), &['a', 'b', 'c']);
}

#[test]
fn test_borrowed_source() {
    let source = VecSource::new(vec!["x", "y"]);
    let borrowed = &source;
    assert_eq!(SequenceSource::read(&borrowed, 1, 1).unwrap(), vec!["y"]);
}

#[test]
fn test_shared_source_pages() {
    use crate::equality::ValueEquality;
    use crate::pagination::PagedQueryCursor;
    use std::sync::Arc;

    let shared = Arc::new(VecSource::new(vec!['a', 'a', 'b', 'c']));
    let mut cursor = PagedQueryCursor::new(Arc::clone(&shared), 2, 2, ValueEquality).unwrap();

    assert_eq!(cursor.collect_page().unwrap(), vec!['a', 'a', 'b']);
    assert!(cursor.move_next().unwrap());
    assert_eq!(cursor.collect_page().unwrap(), vec!['c']);
    assert_eq!(SequenceSource::count(&shared).unwrap(), 4);
}

/// Lines of a text blob, parsed as numbers with `anyhow` context
struct NumberLines {
    text: &'static str,
}

impl SequenceSource for NumberLines {
    type Item = u32;

    fn read(&self, skip: u64, take: usize) -> crate::Result<Vec<u32>> {
        let mut numbers = Vec::new();
        for (line_no, line) in self
            .text
            .lines()
            .enumerate()
            .skip(skip as usize)
            .take(take)
        {
            let number = line
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("line {}: {e}", line_no + 1))?;
            numbers.push(number);
        }
        Ok(numbers)
    }

    fn count(&self) -> crate::Result<u64> {
        Ok(self.text.lines().count() as u64)
    }
}

#[test]
fn test_custom_source_errors_surface() {
    use crate::equality::ValueEquality;
    use crate::pagination::PagedQueryCursor;

    let source = NumberLines {
        text: "1\n1\n2\nthree\n4",
    };
    let mut cursor = PagedQueryCursor::new(source, 5, 3, ValueEquality).unwrap();

    let page: Vec<_> = cursor.current_page().collect();
    assert_eq!(page.len(), 4);
    assert_eq!(*page[2].as_ref().unwrap(), 2);
    match &page[3] {
        Err(crate::Error::Anyhow(e)) => assert!(e.to_string().starts_with("line 4:")),
        other => panic!("Expected anyhow error, got {other:?}"),
    }
}

#[test]
fn test_vec_source_from_json_str() {
    let source = VecSource::from_json_str(r#"[{"id": "a"}, {"id": "b"}]"#).unwrap();
    assert_eq!(source.items(), &[json!({"id": "a"}), json!({"id": "b"})]);

    let err = VecSource::from_json_str(r#"{"id": "a"}"#).unwrap_err();
    assert!(err.to_string().contains("found an object"));
}

#[test]
fn test_vec_source_from_json_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"[1, 2, 3]"#).unwrap();

    let source = VecSource::from_json_file(file.path()).unwrap();
    assert_eq!(source.len(), 3);

    let err = VecSource::from_json_file("/definitely/not/here.json").unwrap_err();
    assert!(matches!(err, crate::Error::FileNotFound { .. }));
}

#[tokio::test]
async fn test_vec_source_async() {
    let source = VecSource::new(vec!['a', 'b', 'c']);
    assert_eq!(
        AsyncSequenceSource::read(&source, 1, 5).await.unwrap(),
        vec!['b', 'c']
    );
    assert_eq!(AsyncSequenceSource::count(&source).await.unwrap(), 3);
}

#[tokio::test]
async fn test_blocking_source() {
    let source = BlockingSource::new(VecSource::new(vec![10, 20, 30]));
    assert_eq!(source.read(0, 2).await.unwrap(), vec![10, 20]);
    assert_eq!(source.count().await.unwrap(), 3);
    assert_eq!(source.get_ref().len(), 3);
}

// ============================================================================
// DuckDbSource Tests
// ============================================================================

fn package_source() -> DuckDbSource {
    let source = DuckDbSource::open(
        MEMORY_DATABASE,
        "SELECT id, version FROM packages ORDER BY id, version;",
    )
    .unwrap();
    source
        .execute_batch(
            "CREATE TABLE packages (id VARCHAR, version INTEGER);
             INSERT INTO packages VALUES
                ('serde', 1), ('serde', 2), ('tokio', 1),
                ('anyhow', 1), ('anyhow', 2), ('anyhow', 3);",
        )
        .unwrap();
    source
}

#[test]
fn test_duckdb_source_count() {
    let source = package_source();
    assert_eq!(source.count().unwrap(), 6);
}

#[test]
fn test_duckdb_source_windows() {
    let source = package_source();

    let first = source.read(0, 2).unwrap();
    assert_eq!(
        first,
        vec![
            json!({"id": "anyhow", "version": 1}),
            json!({"id": "anyhow", "version": 2}),
        ]
    );

    let last = source.read(4, 10).unwrap();
    assert_eq!(
        last,
        vec![
            json!({"id": "serde", "version": 2}),
            json!({"id": "tokio", "version": 1}),
        ]
    );

    assert!(source.read(6, 10).unwrap().is_empty());
}

#[test]
fn test_duckdb_source_mixed_types() {
    let source = DuckDbSource::open(
        MEMORY_DATABASE,
        "SELECT * FROM releases ORDER BY id",
    )
    .unwrap();
    source
        .execute_batch(
            "CREATE TABLE releases (
                id INTEGER, name VARCHAR, yanked BOOLEAN, downloads BIGINT,
                score DOUBLE, released DATE
             );
             INSERT INTO releases VALUES
                (1, 'serde', false, 1000, 4.5, DATE '2024-03-01'),
                (2, NULL, true, NULL, NULL, NULL);",
        )
        .unwrap();

    let records = source.read(0, 10).unwrap();
    assert_eq!(
        records,
        vec![
            json!({
                "id": 1, "name": "serde", "yanked": false, "downloads": 1000,
                "score": 4.5, "released": "2024-03-01"
            }),
            json!({
                "id": 2, "name": null, "yanked": true, "downloads": null,
                "score": null, "released": null
            }),
        ]
    );
}

#[test]
fn test_duckdb_source_bad_query() {
    let source = DuckDbSource::open(MEMORY_DATABASE, "SELECT * FROM missing_table").unwrap();
    assert!(matches!(
        source.read(0, 1).unwrap_err(),
        crate::Error::Database { .. }
    ));
    assert!(source.count().is_err());
}

// ============================================================================
// HttpSource Tests
// ============================================================================

#[tokio::test]
async fn test_http_source_read() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/packages"))
        .and(query_param("skip", "2"))
        .and(query_param("take", "2"))
        .and(header("X-Api-Key", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "serde"}, {"id": "tokio"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = HttpSourceConfig::new(format!("{}/packages", server.uri()))
        .with_records_path("data")
        .header("X-Api-Key", "secret");
    let source = HttpSource::new(config).unwrap();

    let records = source.read(2, 2).await.unwrap();
    assert_eq!(records, vec![json!({"id": "serde"}), json!({"id": "tokio"})]);
}

#[tokio::test]
async fn test_http_source_custom_params() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/odata/Packages"))
        .and(query_param("$skip", "0"))
        .and(query_param("$top", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([1, 2, 3])))
        .mount(&server)
        .await;

    let config = HttpSourceConfig::new(format!("{}/odata/Packages", server.uri()))
        .with_params("$skip", "$top");
    let source = HttpSource::new(config).unwrap();

    assert_eq!(source.read(0, 3).await.unwrap(), vec![json!(1), json!(2), json!(3)]);
}

#[tokio::test]
async fn test_http_source_jsonpath_records() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": "serde"}, {"id": "tokio"}],
            "total": 2
        })))
        .mount(&server)
        .await;

    let config =
        HttpSourceConfig::new(format!("{}/search", server.uri())).with_records_path("$.results[*]");
    let source = HttpSource::new(config).unwrap();

    assert_eq!(
        source.read(0, 2).await.unwrap(),
        vec![json!({"id": "serde"}), json!({"id": "tokio"})]
    );
    assert_eq!(source.count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_http_source_count_default_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/packages"))
        .and(query_param("take", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total": 120, "data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let source = HttpSource::new(HttpSourceConfig::new(format!("{}/packages", server.uri())))
        .unwrap();
    assert_eq!(source.count().await.unwrap(), 120);
}

#[tokio::test]
async fn test_http_source_count_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/packages/count"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"meta": {"count": 9}})))
        .mount(&server)
        .await;

    let config = HttpSourceConfig::new(format!("{}/packages", server.uri()))
        .with_count(format!("{}/packages/count", server.uri()), "meta.count");
    let source = HttpSource::new(config).unwrap();
    assert_eq!(source.count().await.unwrap(), 9);
}

#[tokio::test]
async fn test_http_source_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/packages"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let source = HttpSource::new(HttpSourceConfig::new(format!("{}/packages", server.uri())))
        .unwrap();
    let err = source.read(0, 10).await.unwrap_err();
    match err {
        crate::Error::HttpStatus { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("Expected HttpStatus, got {other:?}"),
    }
}
