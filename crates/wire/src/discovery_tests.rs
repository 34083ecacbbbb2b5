use super::*;

#[test]
fn a_written_record_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("server.json");
    let record = DiscoveryRecord::new(1234, 4180, "http://127.0.0.1:4180");
    record.write(&path).unwrap();

    let read_back = DiscoveryRecord::read(&path).unwrap();
    assert_eq!(read_back, Some(record));
}

#[test]
fn a_missing_file_reads_as_none() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("server.json");
    assert_eq!(DiscoveryRecord::read(&path).unwrap(), None);
}

#[test]
fn a_malformed_file_reads_as_none_rather_than_erroring() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("server.json");
    std::fs::write(&path, "not json\n").unwrap();
    assert_eq!(DiscoveryRecord::read(&path).unwrap(), None);
}
