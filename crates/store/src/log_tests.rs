use super::*;
use serde::Deserialize;
use tempfile::tempdir;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
struct Rec {
    n: u32,
}

#[test]
fn append_then_read_all_round_trips() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("log.jsonl");
    let mut log = AppendLog::open(&path).unwrap();
    log.append(&Rec { n: 1 }).unwrap();
    log.append(&Rec { n: 2 }).unwrap();

    let records: Vec<Rec> = AppendLog::read_all(&path).unwrap();
    assert_eq!(records, vec![Rec { n: 1 }, Rec { n: 2 }]);
}

#[test]
fn read_all_on_missing_file_is_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing.jsonl");
    let records: Vec<Rec> = AppendLog::read_all(&path).unwrap();
    assert!(records.is_empty());
}

#[test]
fn corrupt_line_is_fatal_on_read() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("log.jsonl");
    std::fs::write(&path, "{\"n\":1}\nnot json\n").unwrap();

    let err = AppendLog::read_all::<Rec>(&path).unwrap_err();
    assert!(matches!(err, StoreError::CorruptLog { .. }));
}

#[test]
fn blank_lines_are_skipped() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("log.jsonl");
    std::fs::write(&path, "{\"n\":1}\n\n{\"n\":2}\n").unwrap();
    let records: Vec<Rec> = AppendLog::read_all(&path).unwrap();
    assert_eq!(records, vec![Rec { n: 1 }, Rec { n: 2 }]);
}
