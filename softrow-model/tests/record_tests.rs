use softrow_model::{Record, RecordId};
use serde_json::json;

fn make_record(data: serde_json::Value) -> Record {
    Record::from_json("rec-1", data)
}

// ── RecordId ─────────────────────────────────────────────────────

#[test]
fn record_id_from_integer_and_str_agree() {
    assert_eq!(RecordId::from(42), RecordId::from("42"));
    assert_eq!(RecordId::from(42).to_string(), "42");
}

#[test]
fn record_id_parses_from_str() {
    let id: RecordId = "abc".parse().unwrap();
    assert_eq!(id.as_str(), "abc");
}

#[test]
fn generated_ids_are_unique() {
    let a = RecordId::generate();
    let b = RecordId::generate();
    assert_ne!(a, b);
    assert_eq!(a.as_str().len(), 36);
}

#[test]
fn record_id_to_value_is_json_string() {
    assert_eq!(RecordId::from(7).to_value(), json!("7"));
}

#[test]
fn record_id_serializes_transparently() {
    let json = serde_json::to_string(&RecordId::from("x1")).unwrap();
    assert_eq!(json, r#""x1""#);
}

// ── Construction ─────────────────────────────────────────────────

#[test]
fn from_json_keeps_object_members() {
    let r = make_record(json!({"title": "Hello", "count": 3}));
    assert_eq!(r.id.as_str(), "rec-1");
    assert_eq!(r.data.len(), 2);
}

#[test]
fn from_json_non_object_is_empty() {
    let r = make_record(json!([1, 2, 3]));
    assert!(r.data.is_empty());
}

#[test]
fn with_adds_fields() {
    let r = Record::new("r").with("deleted", false).with("status", "open");
    assert_eq!(r.get_bool("deleted"), Some(false));
    assert_eq!(r.get_str("status"), Some("open"));
}

// ── Accessors ────────────────────────────────────────────────────

#[test]
fn get_str_returns_none_for_non_string() {
    let r = make_record(json!({"count": 5}));
    assert_eq!(r.get_str("count"), None);
    assert_eq!(r.get_i64("count"), Some(5));
}

#[test]
fn get_bool_reads_flag() {
    let r = make_record(json!({"deleted": true}));
    assert_eq!(r.get_bool("deleted"), Some(true));
    assert_eq!(r.get_bool("missing"), None);
}

#[test]
fn is_null_for_missing_and_null() {
    let r = make_record(json!({"deleted_at": null, "title": "x"}));
    assert!(r.is_null("deleted_at"));
    assert!(r.is_null("nope"));
    assert!(!r.is_null("title"));
}
