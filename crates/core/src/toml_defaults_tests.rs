use super::*;

#[test]
fn a_missing_file_yields_all_none() {
    let dir = tempfile::tempdir().unwrap();
    let overrides = load(dir.path().join("foreman.toml")).unwrap();
    assert_eq!(overrides, TomlOverrides::default());
}

#[test]
fn operator_and_run_defaults_sections_parse() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("foreman.toml");
    std::fs::write(
        &path,
        r#"
[operator]
enabled = false
run_triggers_enabled = true

[run_defaults]
provider = "mock"
model = "mock-2"
"#,
    )
    .unwrap();

    let overrides = load(&path).unwrap();
    assert_eq!(overrides.operator.enabled, Some(false));
    assert_eq!(overrides.operator.run_triggers_enabled, Some(true));
    assert_eq!(overrides.run_defaults.model.as_deref(), Some("mock-2"));
}

#[test]
fn a_malformed_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("foreman.toml");
    std::fs::write(&path, "not = [valid").unwrap();
    assert!(load(&path).is_err());
}
