//! Tests for output module

use super::*;
use serde_json::json;
use tempfile::tempdir;

#[tokio::test]
async fn test_write_pretty_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("results.json");
    let records = vec![json!({"id": 1, "title": "Rust"}), json!({"id": 2})];

    JsonFileWriter::new().write(&path, &records).await.unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.starts_with("[\n  {"));
    let parsed: Vec<serde_json::Value> = serde_json::from_str(&contents).unwrap();
    assert_eq!(parsed, records);
    assert!(!path.with_extension("tmp").exists());
}

#[tokio::test]
async fn test_write_creates_parent_directories() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("results").join("output").join("catalog.json");

    JsonFileWriter::new()
        .write(&path, &Vec::<serde_json::Value>::new())
        .await
        .unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
}

#[tokio::test]
async fn test_write_overwrites_existing_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("catalog.json");
    std::fs::write(&path, "stale").unwrap();

    JsonFileWriter::new().write(&path, &json!([1])).await.unwrap();

    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(parsed, json!([1]));
}

#[tokio::test]
async fn test_write_into_file_as_directory_fails() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "not a dir").unwrap();

    let err = JsonFileWriter::new()
        .write(&blocker.join("catalog.json"), &json!([]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), crate::error::ErrorKind::Io);
}

#[tokio::test]
async fn test_failed_rename_removes_temp_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("catalog.json");
    std::fs::create_dir(&path).unwrap();
    std::fs::write(path.join("keep"), "x").unwrap();

    let err = JsonFileWriter::new()
        .write(&path, &json!([1]))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), crate::error::ErrorKind::Io);
    assert!(!path.with_extension("tmp").exists());
    assert!(path.join("keep").exists());
}
