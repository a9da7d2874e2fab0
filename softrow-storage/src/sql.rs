//! Compiles [`Conditions`] into a parameterised SQLite `WHERE` clause.

use crate::{StorageError, StorageResult};
use rusqlite::types::Value as SqlValue;
use serde_json::Value;
use softrow_model::{Conditions, EntitySchema, FieldRef, Group, Operator};

/// A compiled predicate and its positional parameters.
#[derive(Debug)]
pub(crate) struct WhereClause {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Converts a JSON value into its SQLite storage form. Booleans become
/// 0/1, nested structures are stored as JSON text.
pub(crate) fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        Value::Array(_) | Value::Object(_) => SqlValue::Text(value.to_string()),
    }
}

/// Resolves a key to a quoted column name, rejecting keys that do not
/// address a column of `schema`.
pub(crate) fn column<'k>(
    schema: &EntitySchema,
    key: &'k str,
) -> StorageResult<(FieldRef<'k>, String)> {
    let field = FieldRef::parse(key)
        .ok_or_else(|| StorageError::InvalidCondition(format!("malformed key {key:?}")))?;
    if !field.belongs_to(&schema.entity_type) || !schema.has_column(field.name) {
        return Err(StorageError::unknown_column(&schema.entity_type, key));
    }
    Ok((field, quote_ident(field.name)))
}

pub(crate) fn compile(schema: &EntitySchema, conditions: &Conditions) -> StorageResult<WhereClause> {
    let mut params = Vec::new();
    let sql = compile_node(schema, conditions, Group::And, &mut params)?;
    Ok(WhereClause { sql, params })
}

fn compile_node(
    schema: &EntitySchema,
    conditions: &Conditions,
    connective: Group,
    params: &mut Vec<SqlValue>,
) -> StorageResult<String> {
    let mut terms = Vec::new();
    for (key, value) in conditions.fields() {
        terms.push(compile_field(schema, key, value, params)?);
    }
    for (group, nested) in conditions.groups() {
        terms.push(compile_node(schema, nested, group, params)?);
    }
    if terms.is_empty() {
        return Ok("1 = 1".to_string());
    }

    let wrapped: Vec<String> = terms.into_iter().map(|t| format!("({t})")).collect();
    Ok(match connective {
        Group::And => wrapped.join(" AND "),
        Group::Or => wrapped.join(" OR "),
        Group::Not => format!("NOT ({})", wrapped.join(" AND ")),
    })
}

fn compile_field(
    schema: &EntitySchema,
    key: &str,
    value: &Value,
    params: &mut Vec<SqlValue>,
) -> StorageResult<String> {
    let (field, column) = column(schema, key)?;
    let unsupported = || StorageError::InvalidCondition(format!("cannot apply {key:?} to {value}"));

    match value {
        Value::Null => match field.operator {
            Operator::Eq => Ok(format!("{column} IS NULL")),
            Operator::Ne => Ok(format!("{column} IS NOT NULL")),
            _ => Err(unsupported()),
        },
        Value::Array(items) => {
            let negate = match field.operator {
                Operator::Eq => false,
                Operator::Ne => true,
                _ => return Err(unsupported()),
            };
            if items.is_empty() {
                return Ok(if negate {
                    format!("{column} IS NOT NULL")
                } else {
                    "0 = 1".to_string()
                });
            }
            let placeholders = vec!["?"; items.len()].join(", ");
            params.extend(items.iter().map(to_sql));
            let keyword = if negate { "NOT IN" } else { "IN" };
            Ok(format!("{column} {keyword} ({placeholders})"))
        }
        Value::Object(_) => Err(unsupported()),
        _ => {
            params.push(to_sql(value));
            Ok(format!("{column} {} ?", field.operator.symbol()))
        }
    }
}
