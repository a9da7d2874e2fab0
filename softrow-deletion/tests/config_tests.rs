use pretty_assertions::assert_eq;
use softrow_deletion::{DeletionConfig, DeletionError, SoftDeleteConfig};
use std::io::Write;

// ── Parsing ──────────────────────────────────────────────────────

#[test]
fn parses_entities() {
    let config = SoftDeleteConfig::from_toml_str(
        r#"
        [entities.posts]
        field_name = "deleted_at"

        [entities.comments]
        "#,
    )
    .unwrap();

    assert_eq!(
        config,
        SoftDeleteConfig::default()
            .entity("comments", DeletionConfig::default())
            .entity("posts", DeletionConfig::with_field("deleted_at"))
    );
}

#[test]
fn field_name_defaults_to_deleted() {
    let config = SoftDeleteConfig::from_toml_str("[entities.posts]\n").unwrap();
    assert_eq!(config.entities["posts"].field_name, "deleted");
    assert_eq!(DeletionConfig::default().field_name, "deleted");
}

#[test]
fn empty_document_has_no_entities() {
    let config = SoftDeleteConfig::from_toml_str("").unwrap();
    assert!(config.entities.is_empty());
}

#[test]
fn malformed_document_is_config_error() {
    let err = SoftDeleteConfig::from_toml_str("[entities.posts\nfield_name = 1").unwrap_err();
    assert!(matches!(err, DeletionError::Config(_)));

    let err = SoftDeleteConfig::from_toml_str("[entities.posts]\nfield_name = 7\n").unwrap_err();
    assert!(matches!(err, DeletionError::Config(_)));
}

// ── Loading ──────────────────────────────────────────────────────

#[test]
fn missing_file_yields_default() {
    let dir = tempfile::tempdir().unwrap();
    let config = SoftDeleteConfig::load_from(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, SoftDeleteConfig::default());
}

#[test]
fn loads_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[entities.articles]\nfield_name = \"removed_at\"").unwrap();

    let config = SoftDeleteConfig::load_from(file.path()).unwrap();
    assert_eq!(config.entities.len(), 1);
    assert_eq!(config.entities["articles"].field_name, "removed_at");
}

#[test]
fn invalid_file_is_config_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "entities = 3").unwrap();

    assert!(matches!(
        SoftDeleteConfig::load_from(file.path()),
        Err(DeletionError::Config(_))
    ));
}

#[test]
fn unreadable_path_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        SoftDeleteConfig::load_from(dir.path()),
        Err(DeletionError::Config(_))
    ));
}
