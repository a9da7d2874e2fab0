use serde::{Deserialize, Serialize};

/// Describes an entity type's storage layout: its primary key, columns,
/// and the dependent entity types a cascading delete reaches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySchema {
    pub entity_type: String,
    #[serde(default = "default_primary_key")]
    pub primary_key: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub dependents: Vec<Dependent>,
}

fn default_primary_key() -> String {
    "id".to_string()
}

impl EntitySchema {
    /// Creates an empty schema with an `id` primary key.
    pub fn new(entity_type: &str) -> Self {
        Self {
            entity_type: entity_type.into(),
            primary_key: default_primary_key(),
            columns: Vec::new(),
            dependents: Vec::new(),
        }
    }

    #[must_use]
    pub fn primary_key(mut self, name: &str) -> Self {
        self.primary_key = name.into();
        self
    }

    #[must_use]
    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Declares `entity_type` as a dependent whose `foreign_key` column
    /// holds this entity's primary key.
    #[must_use]
    pub fn dependent(mut self, entity_type: &str, foreign_key: &str) -> Self {
        self.dependents.push(Dependent {
            entity_type: entity_type.into(),
            foreign_key: foreign_key.into(),
        });
        self
    }

    /// Looks up a column definition by name.
    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns the declared type of `name`. The primary key is always text.
    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        if name == self.primary_key {
            return Some(ColumnType::Text);
        }
        self.find_column(name).map(|c| c.column_type)
    }

    /// True if `name` is the primary key or a declared column.
    pub fn has_column(&self, name: &str) -> bool {
        name == self.primary_key || self.find_column(name).is_some()
    }
}

/// A single typed column of an entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
}

fn default_nullable() -> bool {
    true
}

impl Column {
    fn simple(name: &str, column_type: ColumnType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable,
        }
    }

    /// Shorthand for a text column.
    pub fn text(name: &str) -> Self {
        Self::simple(name, ColumnType::Text, true)
    }

    /// Shorthand for an integer column.
    pub fn integer(name: &str) -> Self {
        Self::simple(name, ColumnType::Integer, true)
    }

    /// Shorthand for a floating point column.
    pub fn float(name: &str) -> Self {
        Self::simple(name, ColumnType::Float, true)
    }

    /// Shorthand for a boolean flag (never null).
    pub fn boolean(name: &str) -> Self {
        Self::simple(name, ColumnType::Boolean, false)
    }

    /// Shorthand for a nullable timestamp column.
    pub fn datetime(name: &str) -> Self {
        Self::simple(name, ColumnType::DateTime, true)
    }

    /// Shorthand for a JSON blob column.
    pub fn json(name: &str) -> Self {
        Self::simple(name, ColumnType::Json, true)
    }

    /// Value a store writes when an insert omits this column.
    pub fn default_value(&self) -> serde_json::Value {
        match (self.column_type, self.nullable) {
            (ColumnType::Boolean, false) => serde_json::Value::Bool(false),
            (ColumnType::Integer | ColumnType::Float, false) => serde_json::Value::from(0),
            (ColumnType::Text | ColumnType::DateTime | ColumnType::Json, false) => {
                serde_json::Value::String(String::new())
            }
            (_, true) => serde_json::Value::Null,
        }
    }
}

/// The storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Text,
    Integer,
    Float,
    Boolean,
    DateTime,
    Json,
}

impl ColumnType {
    /// SQL type name used when creating a table.
    pub fn declared(self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Integer => "INTEGER",
            Self::Float => "REAL",
            Self::Boolean => "BOOLEAN",
            Self::DateTime => "DATETIME",
            Self::Json => "JSON",
        }
    }

    /// Maps a declared SQL type back to a column type using SQLite-style
    /// affinity rules.
    pub fn from_declared(declared: &str) -> Self {
        let upper = declared.trim().to_ascii_uppercase();
        if upper.starts_with("BOOL") {
            Self::Boolean
        } else if upper == "DATETIME" || upper == "TIMESTAMP" || upper == "DATE" {
            Self::DateTime
        } else if upper.contains("INT") {
            Self::Integer
        } else if upper == "REAL"
            || upper.starts_with("FLOA")
            || upper.starts_with("DOUB")
            || upper == "NUMERIC"
            || upper.starts_with("DECIMAL")
        {
            Self::Float
        } else if upper == "JSON" {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// A child entity type reached by cascading deletes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependent {
    pub entity_type: String,
    pub foreign_key: String,
}
