//! Tests for output module

use super::*;
use crate::engine::{RecordHandler, RecordPage};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tempfile::tempdir;

fn page(number: usize, records: Vec<Value>) -> RecordPage {
    RecordPage {
        object_type: "Subscriber".to_string(),
        page: number,
        records,
    }
}

fn read_lines(path: &std::path::Path) -> Vec<Value> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn test_config_default() {
    let config = JsonLinesConfig::default();
    assert_eq!(config.mode(), WriteMode::Create);
    assert!(!config.is_flush_each_page());
}

#[test]
fn test_config_builder() {
    let config = JsonLinesConfig::new().append().with_flush_each_page(true);
    assert_eq!(config.mode(), WriteMode::Append);
    assert!(config.is_flush_each_page());
}

// ============================================================================
// Writer Tests
// ============================================================================

#[tokio::test]
async fn test_writer_one_line_per_record() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.jsonl");
    let writer = JsonLinesWriter::open(&path, &JsonLinesConfig::new())
        .await
        .unwrap();

    writer
        .handle(page(1, vec![json!({"ID": 1}), json!({"ID": 2})]))
        .await
        .unwrap();
    writer.handle(page(2, vec![])).await.unwrap();
    writer
        .handle(page(3, vec![json!({"ID": 3, "Name": "a\nb"})]))
        .await
        .unwrap();
    writer.flush().await.unwrap();

    assert_eq!(writer.rows_written(), 3);
    assert_eq!(writer.path(), Some(path.as_path()));
    assert_eq!(
        read_lines(&path),
        vec![json!({"ID": 1}), json!({"ID": 2}), json!({"ID": 3, "Name": "a\nb"})]
    );
}

#[tokio::test]
async fn test_writer_create_truncates() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.jsonl");
    std::fs::write(&path, "{\"old\":true}\n").unwrap();

    let writer = JsonLinesWriter::open(&path, &JsonLinesConfig::new())
        .await
        .unwrap();
    writer.write_records(&[json!({"new": true})]).await.unwrap();
    writer.flush().await.unwrap();

    assert_eq!(read_lines(&path), vec![json!({"new": true})]);
}

#[tokio::test]
async fn test_writer_append_keeps_previous_output() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.jsonl");
    std::fs::write(&path, "{\"ID\":1}\n").unwrap();

    let writer = JsonLinesWriter::open(&path, &JsonLinesConfig::new().append())
        .await
        .unwrap();
    writer.write_records(&[json!({"ID": 2})]).await.unwrap();
    writer.flush().await.unwrap();

    assert_eq!(read_lines(&path), vec![json!({"ID": 1}), json!({"ID": 2})]);
}

#[tokio::test]
async fn test_writer_creates_parent_dirs() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested/deeper/out.jsonl");

    let writer = JsonLinesWriter::open(&path, &JsonLinesConfig::new().with_flush_each_page(true))
        .await
        .unwrap();
    writer.handle(page(1, vec![json!({"ID": 1})])).await.unwrap();

    // Flushed by the handler itself
    assert_eq!(read_lines(&path), vec![json!({"ID": 1})]);
}

#[tokio::test]
async fn test_write_empty_records() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.jsonl");
    let writer = JsonLinesWriter::open(&path, &JsonLinesConfig::new())
        .await
        .unwrap();

    assert_eq!(writer.write_records(&[]).await.unwrap(), 0);
    assert_eq!(writer.rows_written(), 0);
}
