use super::*;

#[test]
fn acquiring_an_unheld_lock_succeeds_and_writes_the_pid() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("control-plane").join("writer.lock");
    let _lock = WriterLock::acquire(&path).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents.trim(), std::process::id().to_string());
}

#[test]
fn a_second_acquire_on_the_same_path_fails_while_the_first_is_held() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("writer.lock");
    let _first = WriterLock::acquire(&path).unwrap();

    let second = WriterLock::acquire(&path);
    assert!(matches!(second, Err(ServeError::LockFailed)));
}

#[test]
fn dropping_the_lock_allows_reacquisition() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("writer.lock");
    {
        let _first = WriterLock::acquire(&path).unwrap();
    }
    let _second = WriterLock::acquire(&path).unwrap();
}
