use super::*;

#[test]
fn message_serializes_with_expected_fields() {
    let msg = Message {
        topic: "issue:iss-1".into(),
        author: "worker".into(),
        body: "starting work".into(),
        created_at: 10,
    };
    let json = serde_json::to_value(&msg).unwrap();
    assert_eq!(json["topic"], "issue:iss-1");
    assert_eq!(json["author"], "worker");
}
