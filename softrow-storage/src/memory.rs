//! In-memory record store.
//!
//! Rows are kept per entity type in insertion order and conditions are
//! evaluated in Rust. Used for tests and for embedding without a database.

use crate::compare::{satisfies, sort_order};
use crate::{RecordStore, StorageError, StorageResult};
use serde_json::{Map, Value};
use softrow_model::{
    ColumnType, Conditions, EntitySchema, FieldRef, Order, ReadQuery, Record, RecordId,
};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

struct Table {
    schema: EntitySchema,
    rows: Vec<Record>,
}

impl Table {
    fn value_of(&self, record: &Record, column: &str) -> Value {
        if column == self.schema.primary_key {
            record.id.to_value()
        } else {
            record.get(column).cloned().unwrap_or(Value::Null)
        }
    }

    fn column<'k>(&self, key: &'k str) -> StorageResult<FieldRef<'k>> {
        let field = FieldRef::parse(key)
            .ok_or_else(|| StorageError::InvalidCondition(format!("malformed key {key:?}")))?;
        if !field.belongs_to(&self.schema.entity_type) || !self.schema.has_column(field.name) {
            return Err(StorageError::unknown_column(&self.schema.entity_type, key));
        }
        Ok(field)
    }

    fn matches(&self, record: &Record, conditions: &Conditions) -> StorageResult<bool> {
        conditions.evaluate(&mut |key: &str, expected: &Value| -> StorageResult<bool> {
            let field = self.column(key)?;
            let actual = self.value_of(record, field.name);
            satisfies(field.operator, &actual, expected).ok_or_else(|| {
                StorageError::InvalidCondition(format!("cannot apply {key:?} to {expected}"))
            })
        })
    }

    fn validate(&self, conditions: &Conditions) -> StorageResult<()> {
        for (key, _) in conditions.fields() {
            self.column(key)?;
        }
        for (_, group) in conditions.groups() {
            self.validate(group)?;
        }
        Ok(())
    }

    fn select(&self, conditions: Option<&Conditions>) -> StorageResult<Vec<usize>> {
        if let Some(conditions) = conditions {
            self.validate(conditions)?;
        }
        let mut hits = Vec::new();
        for (index, record) in self.rows.iter().enumerate() {
            let hit = match conditions {
                Some(conditions) => self.matches(record, conditions)?,
                None => true,
            };
            if hit {
                hits.push(index);
            }
        }
        Ok(hits)
    }

    fn project(&self, record: &Record, fields: &[String]) -> StorageResult<Record> {
        if fields.is_empty() {
            return Ok(record.clone());
        }
        let mut data = Map::new();
        for key in fields {
            let field = self.column(key)?;
            if field.name != self.schema.primary_key {
                data.insert(field.name.to_string(), self.value_of(record, field.name));
            }
        }
        Ok(Record {
            id: record.id.clone(),
            data,
        })
    }

    fn sort(&self, hits: &mut [usize], order: &[Order]) -> StorageResult<()> {
        for term in order {
            self.column(&term.field)?;
        }
        hits.sort_by(|a, b| {
            let (a, b) = (&self.rows[*a], &self.rows[*b]);
            order
                .iter()
                .map(|term| {
                    let name = FieldRef::parse(&term.field).map_or("", |f| f.name);
                    let ordering = sort_order(&self.value_of(a, name), &self.value_of(b, name));
                    if term.descending {
                        ordering.reverse()
                    } else {
                        ordering
                    }
                })
                .find(|o| o.is_ne())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(())
    }
}

/// A [`RecordStore`] that keeps everything in process memory.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Table>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of physically stored rows, deleted-flagged or not.
    pub fn row_count(&self, entity_type: &str) -> StorageResult<usize> {
        let tables = self.tables();
        Ok(table(&tables, entity_type)?.rows.len())
    }

    fn tables(&self) -> RwLockReadGuard<'_, HashMap<String, Table>> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn tables_mut(&self) -> RwLockWriteGuard<'_, HashMap<String, Table>> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn table<'t>(tables: &'t HashMap<String, Table>, entity_type: &str) -> StorageResult<&'t Table> {
    tables
        .get(entity_type)
        .ok_or_else(|| StorageError::UnknownEntity(entity_type.into()))
}

fn table_mut<'t>(
    tables: &'t mut HashMap<String, Table>,
    entity_type: &str,
) -> StorageResult<&'t mut Table> {
    tables
        .get_mut(entity_type)
        .ok_or_else(|| StorageError::UnknownEntity(entity_type.into()))
}

impl RecordStore for MemoryStore {
    fn create_entity(&self, schema: EntitySchema) -> StorageResult<()> {
        let mut tables = self.tables_mut();
        match tables.get_mut(&schema.entity_type) {
            Some(existing) => existing.schema = schema,
            None => {
                debug!(entity = %schema.entity_type, "creating in-memory table");
                tables.insert(
                    schema.entity_type.clone(),
                    Table {
                        schema,
                        rows: Vec::new(),
                    },
                );
            }
        }
        Ok(())
    }

    fn schema(&self, entity_type: &str) -> StorageResult<EntitySchema> {
        let tables = self.tables();
        Ok(table(&tables, entity_type)?.schema.clone())
    }

    fn column_type(&self, entity_type: &str, field: &str) -> StorageResult<Option<ColumnType>> {
        let tables = self.tables();
        Ok(table(&tables, entity_type)?.schema.column_type(field))
    }

    fn insert(&self, entity_type: &str, record: Record) -> StorageResult<RecordId> {
        let mut tables = self.tables_mut();
        let table = table_mut(&mut tables, entity_type)?;

        if table.rows.iter().any(|r| r.id == record.id) {
            return Err(StorageError::DuplicateId {
                entity_type: entity_type.into(),
                id: record.id.to_string(),
            });
        }
        if let Some(unknown) = record.data.keys().find(|k| table.schema.find_column(k).is_none()) {
            return Err(StorageError::unknown_column(entity_type, unknown));
        }

        let mut data = Map::new();
        for column in &table.schema.columns {
            let value = record
                .data
                .get(&column.name)
                .cloned()
                .unwrap_or_else(|| column.default_value());
            data.insert(column.name.clone(), value);
        }
        let id = record.id;
        table.rows.push(Record {
            id: id.clone(),
            data,
        });
        Ok(id)
    }

    fn read(&self, entity_type: &str, query: &ReadQuery) -> StorageResult<Vec<Record>> {
        let tables = self.tables();
        let table = table(&tables, entity_type)?;

        let mut hits = table.select(query.conditions.as_ref())?;
        table.sort(&mut hits, &query.order)?;

        hits.into_iter()
            .skip(query.offset)
            .take(query.limit.unwrap_or(usize::MAX))
            .map(|index| table.project(&table.rows[index], &query.fields))
            .collect()
    }

    fn save_field(
        &self,
        entity_type: &str,
        id: &RecordId,
        field: &str,
        value: Value,
    ) -> StorageResult<bool> {
        let mut tables = self.tables_mut();
        let table = table_mut(&mut tables, entity_type)?;

        if table.schema.find_column(field).is_none() {
            return Err(StorageError::unknown_column(entity_type, field));
        }
        match table.rows.iter_mut().find(|r| &r.id == id) {
            Some(record) => {
                record.data.insert(field.to_string(), value);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete(&self, entity_type: &str, id: &RecordId) -> StorageResult<bool> {
        let mut tables = self.tables_mut();
        let table = table_mut(&mut tables, entity_type)?;
        let before = table.rows.len();
        table.rows.retain(|r| &r.id != id);
        Ok(table.rows.len() != before)
    }

    fn delete_where(&self, entity_type: &str, conditions: &Conditions) -> StorageResult<usize> {
        let mut tables = self.tables_mut();
        let table = table_mut(&mut tables, entity_type)?;
        let hits = table.select(Some(conditions))?;

        let mut index = 0;
        table.rows.retain(|_| {
            let keep = hits.binary_search(&index).is_err();
            index += 1;
            keep
        });
        Ok(hits.len())
    }
}
