use crate::{Conditions, RecordId};
use serde::{Deserialize, Serialize};

/// A read specification.
///
/// Only `conditions` is ever rewritten on its way to the store; fields,
/// ordering, pagination and depth pass through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Conditions>,
    /// Columns to return. Empty means every column.
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub order: Vec<Order>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: usize,
    /// Association depth. Stores that do not load associations ignore it.
    #[serde(default = "default_depth")]
    pub depth: u8,
}

fn default_depth() -> u8 {
    1
}

impl Default for ReadQuery {
    fn default() -> Self {
        Self {
            conditions: None,
            fields: Vec::new(),
            order: Vec::new(),
            limit: None,
            offset: 0,
            depth: default_depth(),
        }
    }
}

impl ReadQuery {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn conditions(mut self, conditions: Conditions) -> Self {
        self.conditions = Some(conditions);
        self
    }

    #[must_use]
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn order_by(mut self, field: &str, descending: bool) -> Self {
        self.order.push(Order {
            field: field.into(),
            descending,
        });
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    #[must_use]
    pub fn depth(mut self, depth: u8) -> Self {
        self.depth = depth;
        self
    }
}

/// One ordering term of a read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub field: String,
    #[serde(default)]
    pub descending: bool,
}

/// What a delete request targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteTarget {
    /// The record currently selected on the entity type.
    Current,
    Id(RecordId),
    /// Every record matching the conditions (bulk delete).
    Matching(Conditions),
}

/// A single or bulk delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteRequest {
    pub target: DeleteTarget,
    #[serde(default = "default_cascade")]
    pub cascade: bool,
    /// Whether per-record delete hooks fire during a bulk delete.
    #[serde(default)]
    pub callbacks: bool,
}

fn default_cascade() -> bool {
    true
}

impl DeleteRequest {
    pub fn current() -> Self {
        Self::target(DeleteTarget::Current)
    }

    pub fn id(id: impl Into<RecordId>) -> Self {
        Self::target(DeleteTarget::Id(id.into()))
    }

    pub fn matching(conditions: Conditions) -> Self {
        Self::target(DeleteTarget::Matching(conditions))
    }

    fn target(target: DeleteTarget) -> Self {
        Self {
            target,
            cascade: default_cascade(),
            callbacks: false,
        }
    }

    #[must_use]
    pub fn cascade(mut self, cascade: bool) -> Self {
        self.cascade = cascade;
        self
    }

    #[must_use]
    pub fn callbacks(mut self, callbacks: bool) -> Self {
        self.callbacks = callbacks;
        self
    }
}
