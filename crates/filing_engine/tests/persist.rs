use std::fs;

use filing_engine::{ensure_output_dir, relocate_file};
use tempfile::TempDir;

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("out");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn relocate_creates_parent_and_replaces_existing() {
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("outputs/nested/plan__2024.pdf");

    let first = temp.path().join("one.pdf");
    fs::write(&first, "hello").unwrap();
    assert_eq!(relocate_file(&first, &dest).unwrap(), dest);
    assert_eq!(fs::read_to_string(&dest).unwrap(), "hello");
    assert!(!first.exists());

    // Replace existing
    let second = temp.path().join("two.pdf");
    fs::write(&second, "world").unwrap();
    relocate_file(&second, &dest).unwrap();
    assert_eq!(fs::read_to_string(&dest).unwrap(), "world");
    assert!(!second.exists());
}

#[test]
fn destination_parent_must_be_a_directory() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();
    let source = temp.path().join("doc.pdf");
    fs::write(&source, "data").unwrap();

    let result = relocate_file(&source, &file_path.join("doc.pdf"));
    assert!(result.is_err());
    assert!(source.exists());
}
