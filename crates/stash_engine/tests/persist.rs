use std::fs;

use stash_engine::{ensure_dir, AtomicFileWriter, PersistError};
use tempfile::TempDir;

#[test]
fn creates_missing_directory() {
    let temp = TempDir::new().unwrap();
    let nested = temp.path().join("a").join("b");
    assert!(!nested.exists());
    ensure_dir(&nested).unwrap();
    assert!(nested.is_dir());
}

#[test]
fn write_replaces_existing_file() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().join("saved.json"));

    let first = writer.write("hello").unwrap();
    assert_eq!(fs::read_to_string(&first).unwrap(), "hello");

    let second = writer.write("world").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "world");
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
}

#[test]
fn write_creates_parent_directories() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("exports").join("saved.json");
    AtomicFileWriter::new(&target).write("{}").unwrap();
    assert_eq!(fs::read_to_string(target).unwrap(), "{}");
}

#[test]
fn parent_that_is_a_file_fails_without_partial_output() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("not_a_dir");
    fs::write(&blocker, "x").unwrap();

    let result = AtomicFileWriter::new(blocker.join("saved.json")).write("data");
    assert!(matches!(result, Err(PersistError::Directory(_))));
    assert_eq!(fs::read_to_string(&blocker).unwrap(), "x");
}

#[test]
fn target_without_file_name_is_rejected() {
    let result = AtomicFileWriter::new("/").write("data");
    assert!(matches!(result, Err(PersistError::NoFileName(_))));
}
