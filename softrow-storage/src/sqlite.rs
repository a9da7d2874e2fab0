//! SQLite record store.
//!
//! One table per entity type. Column types are read back from the table
//! definition (`PRAGMA table_info`), so a table created outside softrow is
//! described by what SQLite declares, not by the registered schema.

use crate::sql::{self, quote_ident, to_sql};
use crate::{RecordStore, StorageError, StorageResult};
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use serde_json::{Map, Value};
use softrow_model::{ColumnType, Conditions, EntitySchema, ReadQuery, Record, RecordId};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock};
use tracing::debug;

/// A [`RecordStore`] backed by a SQLite database.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    schemas: RwLock<HashMap<String, EntitySchema>>,
}

impl SqliteStore {
    /// Opens (or creates) a database file.
    pub fn open(path: &Path) -> StorageResult<Self> {
        Ok(Self::from_connection(Connection::open(path)?))
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> StorageResult<Self> {
        Ok(Self::from_connection(Connection::open_in_memory()?))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            schemas: RwLock::new(HashMap::new()),
        }
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn registered(&self, entity_type: &str) -> StorageResult<EntitySchema> {
        self.schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(entity_type)
            .cloned()
            .ok_or_else(|| StorageError::UnknownEntity(entity_type.into()))
    }

    /// Declared column types as SQLite reports them.
    fn declared_types(&self, entity_type: &str) -> StorageResult<HashMap<String, ColumnType>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_ident(entity_type)))?;
        let rows = stmt.query_map([], |row| {
            let name: String = row.get(1)?;
            let declared: String = row.get(2)?;
            Ok((name, ColumnType::from_declared(&declared)))
        })?;
        let mut types = HashMap::new();
        for row in rows {
            let (name, ty) = row?;
            types.insert(name, ty);
        }
        Ok(types)
    }
}

fn from_sql(value: ValueRef<'_>, column_type: ColumnType) -> StorageResult<Value> {
    Ok(match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => match column_type {
            ColumnType::Boolean => Value::Bool(i != 0),
            _ => Value::from(i),
        },
        ValueRef::Real(f) => serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number),
        ValueRef::Text(bytes) => {
            let text = String::from_utf8_lossy(bytes).into_owned();
            match column_type {
                ColumnType::Json => serde_json::from_str(&text)?,
                _ => Value::String(text),
            }
        }
        ValueRef::Blob(_) => {
            return Err(StorageError::InvalidData("blob columns are not supported".into()));
        }
    })
}

impl RecordStore for SqliteStore {
    fn create_entity(&self, schema: EntitySchema) -> StorageResult<()> {
        let mut columns = vec![format!(
            "{} TEXT PRIMARY KEY NOT NULL",
            quote_ident(&schema.primary_key)
        )];
        for column in &schema.columns {
            let mut definition = format!(
                "{} {}",
                quote_ident(&column.name),
                column.column_type.declared()
            );
            if !column.nullable {
                let default = to_sql(&column.default_value());
                definition.push_str(" NOT NULL DEFAULT ");
                definition.push_str(&match default {
                    SqlValue::Integer(i) => i.to_string(),
                    SqlValue::Real(f) => f.to_string(),
                    _ => "''".to_string(),
                });
            }
            columns.push(definition);
        }
        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            quote_ident(&schema.entity_type),
            columns.join(", ")
        );
        debug!(entity = %schema.entity_type, "creating sqlite table");
        self.conn().execute_batch(&ddl)?;

        self.schemas
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(schema.entity_type.clone(), schema);
        Ok(())
    }

    fn schema(&self, entity_type: &str) -> StorageResult<EntitySchema> {
        self.registered(entity_type)
    }

    fn column_type(&self, entity_type: &str, field: &str) -> StorageResult<Option<ColumnType>> {
        let schema = self.registered(entity_type)?;
        if field == schema.primary_key {
            return Ok(Some(ColumnType::Text));
        }
        Ok(self.declared_types(entity_type)?.get(field).copied())
    }

    fn insert(&self, entity_type: &str, record: Record) -> StorageResult<RecordId> {
        let schema = self.registered(entity_type)?;
        if let Some(unknown) = record.data.keys().find(|k| schema.find_column(k).is_none()) {
            return Err(StorageError::unknown_column(entity_type, unknown));
        }

        let conn = self.conn();
        let exists = conn
            .query_row(
                &format!(
                    "SELECT 1 FROM {} WHERE {} = ?1",
                    quote_ident(entity_type),
                    quote_ident(&schema.primary_key)
                ),
                params![record.id.as_str()],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if exists {
            return Err(StorageError::DuplicateId {
                entity_type: entity_type.into(),
                id: record.id.to_string(),
            });
        }

        let mut names = vec![quote_ident(&schema.primary_key)];
        let mut values = vec![SqlValue::Text(record.id.to_string())];
        for column in &schema.columns {
            let value = record
                .data
                .get(&column.name)
                .cloned()
                .unwrap_or_else(|| column.default_value());
            names.push(quote_ident(&column.name));
            values.push(to_sql(&value));
        }
        let placeholders = vec!["?"; names.len()].join(", ");
        conn.execute(
            &format!(
                "INSERT INTO {} ({}) VALUES ({placeholders})",
                quote_ident(entity_type),
                names.join(", ")
            ),
            params_from_iter(values.iter()),
        )?;
        Ok(record.id)
    }

    fn read(&self, entity_type: &str, query: &ReadQuery) -> StorageResult<Vec<Record>> {
        let schema = self.registered(entity_type)?;

        let mut selected: Vec<(String, ColumnType)> = Vec::new();
        if query.fields.is_empty() {
            selected.extend(
                schema
                    .columns
                    .iter()
                    .map(|c| (c.name.clone(), c.column_type)),
            );
        } else {
            for key in &query.fields {
                let (field, _) = sql::column(&schema, key)?;
                if field.name != schema.primary_key {
                    let ty = schema.column_type(field.name).unwrap_or(ColumnType::Text);
                    selected.push((field.name.to_string(), ty));
                }
            }
        }

        let mut columns = vec![quote_ident(&schema.primary_key)];
        columns.extend(selected.iter().map(|(name, _)| quote_ident(name)));
        let mut statement = format!(
            "SELECT {} FROM {}",
            columns.join(", "),
            quote_ident(entity_type)
        );

        let mut params = Vec::new();
        if let Some(conditions) = &query.conditions {
            let clause = sql::compile(&schema, conditions)?;
            statement.push_str(" WHERE ");
            statement.push_str(&clause.sql);
            params = clause.params;
        }
        if !query.order.is_empty() {
            let mut terms = Vec::with_capacity(query.order.len());
            for order in &query.order {
                let (_, column) = sql::column(&schema, &order.field)?;
                terms.push(if order.descending {
                    format!("{column} DESC")
                } else {
                    format!("{column} ASC")
                });
            }
            statement.push_str(" ORDER BY ");
            statement.push_str(&terms.join(", "));
        }
        if query.limit.is_some() || query.offset > 0 {
            let limit = query.limit.map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX));
            statement.push_str(&format!(" LIMIT {limit} OFFSET {}", query.offset));
        }
        debug!(entity = %entity_type, sql = %statement, "sqlite read");

        let conn = self.conn();
        let mut stmt = conn.prepare(&statement)?;
        let mut rows = stmt.query(params_from_iter(params.iter()))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let id: String = row.get(0)?;
            let mut data = Map::new();
            for (offset, (name, ty)) in selected.iter().enumerate() {
                data.insert(name.clone(), from_sql(row.get_ref(offset + 1)?, *ty)?);
            }
            records.push(Record {
                id: RecordId::from(id),
                data,
            });
        }
        Ok(records)
    }

    fn save_field(
        &self,
        entity_type: &str,
        id: &RecordId,
        field: &str,
        value: Value,
    ) -> StorageResult<bool> {
        let schema = self.registered(entity_type)?;
        if schema.find_column(field).is_none() {
            return Err(StorageError::unknown_column(entity_type, field));
        }
        let changed = self.conn().execute(
            &format!(
                "UPDATE {} SET {} = ?1 WHERE {} = ?2",
                quote_ident(entity_type),
                quote_ident(field),
                quote_ident(&schema.primary_key)
            ),
            params![to_sql(&value), id.as_str()],
        )?;
        Ok(changed > 0)
    }

    fn delete(&self, entity_type: &str, id: &RecordId) -> StorageResult<bool> {
        let schema = self.registered(entity_type)?;
        let removed = self.conn().execute(
            &format!(
                "DELETE FROM {} WHERE {} = ?1",
                quote_ident(entity_type),
                quote_ident(&schema.primary_key)
            ),
            params![id.as_str()],
        )?;
        Ok(removed > 0)
    }

    fn delete_where(&self, entity_type: &str, conditions: &Conditions) -> StorageResult<usize> {
        let schema = self.registered(entity_type)?;
        let clause = sql::compile(&schema, conditions)?;
        let removed = self.conn().execute(
            &format!("DELETE FROM {} WHERE {}", quote_ident(entity_type), clause.sql),
            params_from_iter(clause.params.iter()),
        )?;
        Ok(removed)
    }
}
