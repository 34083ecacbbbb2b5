use super::*;

#[derive(Serialize)]
struct Item {
    name: String,
}

#[test]
fn from_flags_json_wins_over_text_default() {
    assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
    assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Json);
    assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Text);
}

#[test]
fn format_time_ago_reports_dash_for_zero() {
    assert_eq!(format_time_ago(0), "-");
}

#[test]
fn format_elapsed_buckets_by_unit() {
    assert_eq!(format_elapsed(5), "5s");
    assert_eq!(format_elapsed(125), "2m");
    assert_eq!(format_elapsed(7_300), "2h");
    assert_eq!(format_elapsed(200_000), "2d");
}

#[test]
fn handle_list_prints_empty_message_for_text() {
    let items: Vec<Item> = vec![];
    handle_list(OutputFormat::Text, &items, "nothing here", |_, _| unreachable!()).unwrap();
}

#[test]
fn handle_list_renders_text_when_nonempty() {
    let items = vec![Item { name: "a".into() }];
    let mut rendered = false;
    handle_list(OutputFormat::Text, &items, "empty", |items, _| {
        assert_eq!(items.len(), 1);
        rendered = true;
    })
    .unwrap();
    assert!(rendered);
}
