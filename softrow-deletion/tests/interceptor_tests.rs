use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use softrow_deletion::{
    AccessLayer, DeletionConfig, DeletionError, DeletionPolicy, DeletionResult, Interceptor,
    ReadMode,
};
use softrow_model::{ColumnType, Conditions, ReadQuery, Record, RecordId};
use std::cell::RefCell;
use std::collections::VecDeque;

/// Access layer that records every call and replays scripted results.
struct Recorder {
    column: ColumnType,
    matches: Vec<Record>,
    delete_results: RefCell<VecDeque<bool>>,
    calls: RefCell<Vec<String>>,
    queries: RefCell<Vec<ReadQuery>>,
}

impl Recorder {
    fn new(column: ColumnType) -> Self {
        Self {
            column,
            matches: Vec::new(),
            delete_results: RefCell::new(VecDeque::new()),
            calls: RefCell::new(Vec::new()),
            queries: RefCell::new(Vec::new()),
        }
    }

    fn matching(mut self, ids: &[&str]) -> Self {
        self.matches = ids.iter().map(|id| Record::new(*id)).collect();
        self
    }

    fn deletes_return(self, results: &[bool]) -> Self {
        self.delete_results.borrow_mut().extend(results.iter().copied());
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn log(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

impl AccessLayer for Recorder {
    fn primary_key(&self, _entity_type: &str) -> DeletionResult<String> {
        Ok("id".into())
    }

    fn column_type(&self, _entity_type: &str, field: &str) -> DeletionResult<Option<ColumnType>> {
        Ok((field == "deleted").then_some(self.column))
    }

    fn find(&self, entity_type: &str, query: ReadQuery) -> DeletionResult<Vec<Record>> {
        self.log(format!("find {entity_type}"));
        self.queries.borrow_mut().push(query);
        Ok(self.matches.clone())
    }

    fn save_field(
        &self,
        entity_type: &str,
        id: &RecordId,
        field: &str,
        value: Value,
    ) -> DeletionResult<bool> {
        self.log(format!("save {entity_type} {id} {field}={value}"));
        Ok(true)
    }

    fn delete(
        &self,
        entity_type: &str,
        id: Option<&RecordId>,
        cascade: bool,
    ) -> DeletionResult<bool> {
        let id = id.map_or_else(|| "-".to_string(), ToString::to_string);
        self.log(format!("delete {entity_type} {id} cascade={cascade}"));
        Ok(self.delete_results.borrow_mut().pop_front().unwrap_or(true))
    }

    fn delete_dependent(
        &self,
        entity_type: &str,
        id: &RecordId,
        cascade: bool,
    ) -> DeletionResult<()> {
        self.log(format!("dependents {entity_type} {id} cascade={cascade}"));
        Ok(())
    }
}

fn interceptor() -> Interceptor {
    Interceptor::new(DeletionPolicy::new("posts", DeletionConfig::default()))
}

fn conds(value: Value) -> Conditions {
    Conditions::from_json(&value).unwrap()
}

// ── Read mode ────────────────────────────────────────────────────

#[test]
fn starts_excluding() {
    assert_eq!(interceptor().mode(), ReadMode::Excluding);
    assert_eq!(ReadMode::default(), ReadMode::Excluding);
}

#[test]
fn toggle_round_trip() {
    let i = interceptor();
    i.include_deleted_records();
    assert_eq!(i.mode(), ReadMode::Including);
    i.include_deleted_records();
    assert_eq!(i.mode(), ReadMode::Including);
    i.exclude_deleted_records();
    assert_eq!(i.mode(), ReadMode::Excluding);
}

// ── Read rewriting ───────────────────────────────────────────────

#[test]
fn adds_predicate_when_no_conditions() {
    let access = Recorder::new(ColumnType::Boolean);
    let query = interceptor().before_read(&access, ReadQuery::new()).unwrap();
    assert_eq!(query.conditions, Some(conds(json!({"deleted": false}))));
}

#[test]
fn merges_into_caller_conditions() {
    let access = Recorder::new(ColumnType::DateTime);
    let query = ReadQuery::new()
        .conditions(conds(json!({"status": "published"})))
        .fields(["title"])
        .order_by("title", true)
        .limit(5)
        .offset(2)
        .depth(0);

    let rewritten = interceptor().before_read(&access, query.clone()).unwrap();
    assert_eq!(
        rewritten.conditions,
        Some(conds(json!({"status": "published", "deleted": null})))
    );
    assert_eq!(rewritten.fields, query.fields);
    assert_eq!(rewritten.order, query.order);
    assert_eq!(rewritten.limit, Some(5));
    assert_eq!(rewritten.offset, 2);
    assert_eq!(rewritten.depth, 0);
}

#[test]
fn leaves_explicit_reference_alone() {
    let access = Recorder::new(ColumnType::Boolean);
    for value in [
        json!({"deleted": true}),
        json!({"posts.deleted": true}),
        json!({"OR": {"deleted": true, "status": "x"}}),
        json!({"NOT": {"posts.deleted": true}}),
    ] {
        let query = ReadQuery::new().conditions(conds(value.clone()));
        let rewritten = interceptor().before_read(&access, query.clone()).unwrap();
        assert_eq!(rewritten, query, "{value}");
    }
}

#[test]
fn including_mode_passes_through() {
    let access = Recorder::new(ColumnType::Boolean);
    let i = interceptor();
    i.include_deleted_records();
    assert_eq!(i.before_read(&access, ReadQuery::new()).unwrap(), ReadQuery::new());
    i.exclude_deleted_records();
    assert!(i.before_read(&access, ReadQuery::new()).unwrap().conditions.is_some());
}

#[test]
fn missing_column_fails_read() {
    let access = Recorder::new(ColumnType::Boolean);
    let i = Interceptor::new(DeletionPolicy::new(
        "posts",
        DeletionConfig::with_field("removed"),
    ));
    assert!(matches!(
        i.before_read(&access, ReadQuery::new()),
        Err(DeletionError::UnknownField { .. })
    ));
}

// ── Single delete ────────────────────────────────────────────────

#[test]
fn delete_writes_only_the_field() {
    let access = Recorder::new(ColumnType::Boolean);
    let saved = interceptor()
        .delete(&access, &RecordId::from(7), false)
        .unwrap();
    assert!(saved);
    assert_eq!(access.calls(), vec!["save posts 7 deleted=true"]);
}

#[test]
fn cascade_runs_before_mutation() {
    let access = Recorder::new(ColumnType::Boolean);
    interceptor()
        .delete(&access, &RecordId::from(7), true)
        .unwrap();
    assert_eq!(
        access.calls(),
        vec!["dependents posts 7 cascade=true", "save posts 7 deleted=true"]
    );
}

#[test]
fn datetime_delete_writes_timestamp() {
    let access = Recorder::new(ColumnType::DateTime);
    interceptor()
        .delete(&access, &RecordId::from("a"), false)
        .unwrap();
    let calls = access.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].starts_with("save posts a deleted=\""), "{}", calls[0]);
}

// ── Bulk delete ──────────────────────────────────────────────────

#[test]
fn empty_conditions_rejected_without_calls() {
    let access = Recorder::new(ColumnType::Boolean).matching(&["1"]);
    let err = interceptor()
        .delete_all(&access, &Conditions::new(), true, true)
        .unwrap_err();
    assert!(matches!(err, DeletionError::InvalidArgument(_)));
    assert!(access.calls().is_empty());
}

#[test]
fn no_matches_is_success() {
    let access = Recorder::new(ColumnType::Boolean);
    let ok = interceptor()
        .delete_all(&access, &conds(json!({"status": "x"})), true, false)
        .unwrap();
    assert!(ok);
    assert_eq!(access.calls(), vec!["find posts"]);
}

#[test]
fn identifier_query_is_key_only_and_shallow() {
    let access = Recorder::new(ColumnType::Boolean).matching(&["1"]);
    let conditions = conds(json!({"status": "draft"}));
    interceptor()
        .delete_all(&access, &conditions, false, false)
        .unwrap();

    let queries = access.queries.borrow();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].conditions, Some(conditions));
    assert_eq!(queries[0].fields, vec!["posts.id".to_string()]);
    assert_eq!(queries[0].depth, 0);
}

#[test]
fn deletes_each_match_in_order() {
    let access = Recorder::new(ColumnType::Boolean).matching(&["1", "2", "3"]);
    let ok = interceptor()
        .delete_all(&access, &conds(json!({"status": "x"})), true, false)
        .unwrap();
    assert!(ok);
    assert_eq!(
        access.calls(),
        vec![
            "find posts",
            "delete posts 1 cascade=true",
            "delete posts 2 cascade=true",
            "delete posts 3 cascade=true",
        ]
    );
}

#[test]
fn one_failure_makes_result_false_and_the_rest_still_run() {
    let access = Recorder::new(ColumnType::Boolean)
        .matching(&["1", "2", "3"])
        .deletes_return(&[true, false, true]);
    let ok = interceptor()
        .delete_all(&access, &conds(json!({"status": "x"})), false, false)
        .unwrap();
    assert!(!ok);
    assert_eq!(access.calls().len(), 4);
    assert_eq!(access.calls()[3], "delete posts 3 cascade=false");
}

#[test]
fn callbacks_flag_is_ignored() {
    let with = Recorder::new(ColumnType::Boolean).matching(&["1", "2"]);
    let without = Recorder::new(ColumnType::Boolean).matching(&["1", "2"]);
    let conditions = conds(json!({"status": "x"}));

    interceptor().delete_all(&with, &conditions, true, true).unwrap();
    interceptor()
        .delete_all(&without, &conditions, true, false)
        .unwrap();
    assert_eq!(with.calls(), without.calls());
}
