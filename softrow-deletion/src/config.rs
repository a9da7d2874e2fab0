//! Soft-delete configuration: per entity type settings, optionally read
//! from a TOML file.
//!
//! ```toml
//! [entities.posts]
//! field_name = "deleted_at"
//!
//! [entities.comments]
//! ```

use crate::{DeletionError, DeletionResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Settings for one soft-deletable entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionConfig {
    /// Column that marks a record as deleted.
    #[serde(default = "default_field_name")]
    pub field_name: String,
}

fn default_field_name() -> String {
    "deleted".to_string()
}

impl Default for DeletionConfig {
    fn default() -> Self {
        Self {
            field_name: default_field_name(),
        }
    }
}

impl DeletionConfig {
    pub fn with_field(field_name: &str) -> Self {
        Self {
            field_name: field_name.into(),
        }
    }
}

/// Soft-delete settings for a set of entity types.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftDeleteConfig {
    #[serde(default)]
    pub entities: BTreeMap<String, DeletionConfig>,
}

impl SoftDeleteConfig {
    pub fn from_toml_str(contents: &str) -> DeletionResult<Self> {
        toml::from_str(contents).map_err(|e| DeletionError::Config(e.to_string()))
    }

    /// Loads settings from `path`. A missing file yields an empty config.
    pub fn load_from(path: &Path) -> DeletionResult<Self> {
        if !path.exists() {
            info!("No soft-delete config at {:?}, no entity types attached", path);
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| DeletionError::Config(format!("failed to read {}: {e}", path.display())))?;
        let config = Self::from_toml_str(&contents)?;
        info!(
            entities = config.entities.len(),
            "Loaded soft-delete config from {:?}", path
        );
        Ok(config)
    }

    #[must_use]
    pub fn entity(mut self, entity_type: &str, config: DeletionConfig) -> Self {
        self.entities.insert(entity_type.into(), config);
        self
    }
}
