use super::*;
use serial_test::serial;

#[test]
#[serial]
fn server_url_override_is_none_when_unset() {
    std::env::remove_var(SERVER_URL);
    assert_eq!(server_url_override(), None);
}

#[test]
#[serial]
fn server_url_override_is_some_when_set() {
    std::env::set_var(SERVER_URL, "http://127.0.0.1:9999");
    assert_eq!(server_url_override(), Some("http://127.0.0.1:9999".to_string()));
    std::env::remove_var(SERVER_URL);
}

#[test]
#[serial]
fn banner_suppressed_requires_a_non_empty_value() {
    std::env::set_var(NO_BANNER, "");
    assert!(!banner_suppressed());
    std::env::set_var(NO_BANNER, "1");
    assert!(banner_suppressed());
    std::env::remove_var(NO_BANNER);
}
