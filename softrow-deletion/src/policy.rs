//! Deletion policy engine.
//!
//! Decides, for one entity type, which column marks a record as deleted,
//! what kind of column it is, and what predicate or mutation corresponds to
//! "not deleted" and "mark deleted".

use crate::{AccessLayer, DeletionConfig, DeletionError, DeletionResult};
use chrono::{DateTime, Utc};
use serde_json::Value;
use softrow_model::{ColumnType, Conditions, Group};
use std::sync::OnceLock;
use tracing::debug;

/// Format of datetime deletion markers (UTC, second precision).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// How the deletion column encodes "deleted".
///
/// A record is deleted iff the flag is `true` (`Boolean`) or the timestamp
/// is non-null (`Datetime`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeletionKind {
    Boolean,
    Datetime,
}

impl DeletionKind {
    fn from_column(column_type: ColumnType) -> Option<Self> {
        match column_type {
            ColumnType::Boolean => Some(Self::Boolean),
            ColumnType::DateTime => Some(Self::Datetime),
            ColumnType::Text | ColumnType::Integer | ColumnType::Float | ColumnType::Json => None,
        }
    }
}

/// A single-column update.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMutation {
    pub field: String,
    pub value: Value,
}

/// Deletion policy for one entity type.
///
/// The column kind is looked up on first use and memoised for the lifetime
/// of the policy.
#[derive(Debug)]
pub struct DeletionPolicy {
    entity_type: String,
    config: DeletionConfig,
    kind: OnceLock<DeletionKind>,
}

impl DeletionPolicy {
    pub fn new(entity_type: &str, config: DeletionConfig) -> Self {
        Self {
            entity_type: entity_type.into(),
            config,
            kind: OnceLock::new(),
        }
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    pub fn field_name(&self) -> &str {
        &self.config.field_name
    }

    /// The field name qualified with the entity type, e.g. `posts.deleted`.
    pub fn qualified_field_name(&self) -> String {
        format!("{}.{}", self.entity_type, self.config.field_name)
    }

    /// The memoised column kind, if it has been resolved.
    pub fn resolved_kind(&self) -> Option<DeletionKind> {
        self.kind.get().copied()
    }

    /// Resolves the deletion column's kind from storage metadata, once.
    ///
    /// Fails with `UnknownField` if the column does not exist and with
    /// `UnsupportedColumnType` if it is neither boolean nor datetime. A
    /// failed resolution is not memoised.
    pub fn resolve_column_type<A: AccessLayer + ?Sized>(
        &self,
        access: &A,
    ) -> DeletionResult<DeletionKind> {
        if let Some(kind) = self.kind.get() {
            return Ok(*kind);
        }

        let field = self.field_name();
        let column_type = access.column_type(&self.entity_type, field)?.ok_or_else(|| {
            DeletionError::UnknownField {
                entity_type: self.entity_type.clone(),
                field: field.to_string(),
            }
        })?;
        let kind = DeletionKind::from_column(column_type).ok_or_else(|| {
            DeletionError::UnsupportedColumnType {
                entity_type: self.entity_type.clone(),
                field: field.to_string(),
                column_type,
            }
        })?;

        debug!(entity = %self.entity_type, field, ?kind, "resolved deletion column");
        Ok(*self.kind.get_or_init(|| kind))
    }

    /// Condition fragment that hides deleted records: `{field: false}` for a
    /// flag, `{field: null}` for a timestamp.
    pub fn exclusion_predicate<A: AccessLayer + ?Sized>(
        &self,
        access: &A,
    ) -> DeletionResult<Conditions> {
        let value = match self.resolve_column_type(access)? {
            DeletionKind::Boolean => Value::Bool(false),
            DeletionKind::Datetime => Value::Null,
        };
        Ok(Conditions::new().with(self.field_name(), value))
    }

    /// True if the conditions already constrain the deletion field.
    ///
    /// Only the bare (`deleted`) and qualified (`posts.deleted`) keys are
    /// recognised, at the top level and directly inside the `OR` and `NOT`
    /// groups. Keys carrying an operator, deeper nesting, the `AND` group
    /// and other aliases are not detected.
    pub fn already_references_field(&self, conditions: Option<&Conditions>) -> bool {
        let Some(conditions) = conditions else {
            return false;
        };
        let bare = self.field_name();
        let qualified = self.qualified_field_name();
        let mentions = |c: &Conditions| c.contains_key(bare) || c.contains_key(&qualified);

        mentions(conditions)
            || [Group::Or, Group::Not]
                .into_iter()
                .filter_map(|group| conditions.group(group))
                .any(mentions)
    }

    /// Update that marks a record deleted now.
    pub fn deletion_mutation<A: AccessLayer + ?Sized>(
        &self,
        access: &A,
    ) -> DeletionResult<FieldMutation> {
        self.deletion_mutation_at(access, Utc::now())
    }

    /// Update that marks a record deleted at `now`. Timestamps are written
    /// with second precision.
    pub fn deletion_mutation_at<A: AccessLayer + ?Sized>(
        &self,
        access: &A,
        now: DateTime<Utc>,
    ) -> DeletionResult<FieldMutation> {
        let value = match self.resolve_column_type(access)? {
            DeletionKind::Boolean => Value::Bool(true),
            DeletionKind::Datetime => Value::String(now.format(TIMESTAMP_FORMAT).to_string()),
        };
        Ok(FieldMutation {
            field: self.field_name().to_string(),
            value,
        })
    }
}
