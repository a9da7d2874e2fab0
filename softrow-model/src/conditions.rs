//! Read conditions: a mapping of field keys to constraints, plus nested
//! boolean groups.
//!
//! A field key is `field` or `Entity.field`, optionally followed by a
//! comparison operator (`"age >="`). A JSON `null` constraint means IS NULL
//! and an array means IN. Groups are keyed by `AND`, `OR` and `NOT`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Boolean connective of a condition group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Group {
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
    #[serde(rename = "NOT")]
    Not,
}

impl Group {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "AND" => Some(Self::And),
            "OR" => Some(Self::Or),
            "NOT" => Some(Self::Not),
            _ => None,
        }
    }
}

/// A conditions structure as carried by a [`crate::ReadQuery`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conditions {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    fields: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    groups: BTreeMap<Group, Conditions>,
}

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON object. Members named `AND`, `OR` or `NOT` whose value is
    /// an object become groups; every other member is a field constraint.
    pub fn from_json(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let mut conditions = Self::new();
        for (key, value) in object {
            match (Group::from_keyword(key), value) {
                (Some(group), Value::Object(_)) => {
                    conditions.groups.insert(group, Self::from_json(value)?);
                }
                _ => {
                    conditions.fields.insert(key.clone(), value.clone());
                }
            }
        }
        Some(conditions)
    }

    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    #[must_use]
    pub fn with_group(mut self, group: Group, conditions: Conditions) -> Self {
        self.groups.insert(group, conditions);
        self
    }

    /// Sets a field constraint, replacing any existing one for the same key.
    pub fn insert(&mut self, key: &str, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(key.to_string(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn group(&self, group: Group) -> Option<&Conditions> {
        self.groups.get(&group)
    }

    pub fn group_mut(&mut self, group: Group) -> &mut Conditions {
        self.groups.entry(group).or_default()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn groups(&self) -> impl Iterator<Item = (Group, &Conditions)> {
        self.groups.iter().map(|(g, c)| (*g, c))
    }

    /// True when there is no constraint anywhere in the tree.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.groups.values().all(Conditions::is_empty)
    }

    /// Adds every top-level field of `other` whose key is not already
    /// present. Existing keys are never overwritten.
    pub fn merge_absent(&mut self, other: Conditions) {
        for (key, value) in other.fields {
            self.fields.entry(key).or_insert(value);
        }
        for (group, conditions) in other.groups {
            self.groups.entry(group).or_insert(conditions);
        }
    }

    /// Evaluates the tree with the top-level fields conjoined.
    ///
    /// `field` decides a single `(key, constraint)` pair. Every pair is
    /// visited, so an error in any branch surfaces regardless of the others.
    pub fn evaluate<E>(
        &self,
        field: &mut impl FnMut(&str, &Value) -> Result<bool, E>,
    ) -> Result<bool, E> {
        self.evaluate_as(Group::And, field)
    }

    fn evaluate_as<E>(
        &self,
        connective: Group,
        field: &mut impl FnMut(&str, &Value) -> Result<bool, E>,
    ) -> Result<bool, E> {
        let mut results = Vec::with_capacity(self.fields.len() + self.groups.len());
        for (key, value) in &self.fields {
            results.push(field(key, value)?);
        }
        for (group, conditions) in &self.groups {
            results.push(conditions.evaluate_as(*group, field)?);
        }
        if results.is_empty() {
            return Ok(true);
        }
        Ok(match connective {
            Group::And => results.iter().all(|r| *r),
            Group::Or => results.iter().any(|r| *r),
            Group::Not => !results.iter().all(|r| *r),
        })
    }
}

/// Comparison operator attached to a field key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl Operator {
    fn parse(symbol: &str) -> Option<Self> {
        match symbol {
            "=" => Some(Self::Eq),
            "!=" | "<>" => Some(Self::Ne),
            ">" => Some(Self::Gt),
            ">=" => Some(Self::Ge),
            "<" => Some(Self::Lt),
            "<=" => Some(Self::Le),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
        }
    }
}

/// A parsed field key: `[qualifier.]name [operator]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRef<'a> {
    pub qualifier: Option<&'a str>,
    pub name: &'a str,
    pub operator: Operator,
}

impl<'a> FieldRef<'a> {
    /// Parses a condition key. Returns `None` for an empty name or an
    /// unrecognised operator.
    pub fn parse(key: &'a str) -> Option<Self> {
        let key = key.trim();
        let (path, operator) = match key.split_once(char::is_whitespace) {
            Some((path, symbol)) => (path, Operator::parse(symbol.trim())?),
            None => (key, Operator::Eq),
        };
        let (qualifier, name) = match path.rsplit_once('.') {
            Some((qualifier, name)) => (Some(qualifier), name),
            None => (None, path),
        };
        if name.is_empty() || qualifier.is_some_and(str::is_empty) {
            return None;
        }
        Some(Self {
            qualifier,
            name,
            operator,
        })
    }

    /// True if the key addresses a column of `entity_type`, either bare or
    /// qualified with the entity's own name.
    pub fn belongs_to(&self, entity_type: &str) -> bool {
        self.qualifier.is_none_or(|q| q == entity_type)
    }
}
