use pretty_assertions::assert_eq;
use softrow_model::{Column, ColumnType, Dependent, EntitySchema};

fn posts() -> EntitySchema {
    EntitySchema::new("posts")
        .column(Column::text("title"))
        .column(Column::boolean("deleted"))
        .column(Column::datetime("published_at"))
        .dependent("comments", "post_id")
}

// ── Column constructors ──────────────────────────────────────────

#[test]
fn boolean_column_not_nullable() {
    let c = Column::boolean("deleted");
    assert_eq!(c.name, "deleted");
    assert_eq!(c.column_type, ColumnType::Boolean);
    assert!(!c.nullable);
}

#[test]
fn datetime_column_nullable() {
    let c = Column::datetime("deleted_at");
    assert_eq!(c.column_type, ColumnType::DateTime);
    assert!(c.nullable);
}

#[test]
fn other_shorthands() {
    assert_eq!(Column::text("t").column_type, ColumnType::Text);
    assert_eq!(Column::integer("i").column_type, ColumnType::Integer);
    assert_eq!(Column::float("f").column_type, ColumnType::Float);
    assert_eq!(Column::json("j").column_type, ColumnType::Json);
}

// ── EntitySchema ─────────────────────────────────────────────────

#[test]
fn default_primary_key_is_id() {
    let s = EntitySchema::new("posts");
    assert_eq!(s.primary_key, "id");
    assert!(s.columns.is_empty());
}

#[test]
fn custom_primary_key() {
    let s = EntitySchema::new("users").primary_key("uid");
    assert_eq!(s.primary_key, "uid");
    assert_eq!(s.column_type("uid"), Some(ColumnType::Text));
    assert!(s.has_column("uid"));
    assert!(!s.has_column("id"));
}

#[test]
fn column_type_lookup() {
    let s = posts();
    assert_eq!(s.column_type("deleted"), Some(ColumnType::Boolean));
    assert_eq!(s.column_type("published_at"), Some(ColumnType::DateTime));
    assert_eq!(s.column_type("nope"), None);
}

#[test]
fn dependents_recorded() {
    let s = posts();
    assert_eq!(
        s.dependents,
        vec![Dependent {
            entity_type: "comments".into(),
            foreign_key: "post_id".into(),
        }]
    );
}

#[test]
fn schema_deserializes_with_defaults() {
    let json = r#"{"entity_type":"tags","columns":[{"name":"label","column_type":"text"}]}"#;
    let s: EntitySchema = serde_json::from_str(json).unwrap();
    assert_eq!(s.primary_key, "id");
    assert!(s.columns[0].nullable);
    assert!(s.dependents.is_empty());
}

// ── ColumnType declared names ────────────────────────────────────

#[test]
fn declared_names_map_back() {
    for ty in [
        ColumnType::Text,
        ColumnType::Integer,
        ColumnType::Float,
        ColumnType::Boolean,
        ColumnType::DateTime,
        ColumnType::Json,
    ] {
        assert_eq!(ColumnType::from_declared(ty.declared()), ty);
    }
}

#[test]
fn affinity_rules() {
    assert_eq!(ColumnType::from_declared("bool"), ColumnType::Boolean);
    assert_eq!(ColumnType::from_declared("TIMESTAMP"), ColumnType::DateTime);
    assert_eq!(ColumnType::from_declared("BIGINT"), ColumnType::Integer);
    assert_eq!(ColumnType::from_declared("double precision"), ColumnType::Float);
    assert_eq!(ColumnType::from_declared("VARCHAR(255)"), ColumnType::Text);
    assert_eq!(ColumnType::from_declared(""), ColumnType::Text);
}

#[test]
fn column_type_serde_snake_case() {
    let json = serde_json::to_string(&ColumnType::DateTime).unwrap();
    assert_eq!(json, r#""date_time""#);
}

// ── Column defaults ──────────────────────────────────────────────

#[test]
fn default_values_follow_nullability() {
    use serde_json::{Value, json};
    assert_eq!(Column::boolean("deleted").default_value(), json!(false));
    assert_eq!(Column::datetime("deleted_at").default_value(), Value::Null);
    assert_eq!(Column::text("title").default_value(), Value::Null);
}
