//! Record access layer with optional soft-delete attachments.
//!
//! A [`Repository`] is configured with `&mut self` (register entity types,
//! attach soft deletion, install hooks) and then used through `&self`.
//! Every registered entity type carries an optional [`Interceptor`]; when
//! present, reads are filtered and deletes become field updates, and no
//! path through the repository removes one of its rows physically.

use crate::interceptor::{Interceptor, ReadMode};
use crate::policy::DeletionPolicy;
use crate::{AccessLayer, DeletionConfig, DeletionError, DeletionResult, SoftDeleteConfig};
use serde_json::Value;
use softrow_model::{
    ColumnType, Conditions, DeleteHooks, DeleteRequest, DeleteTarget, EntitySchema, ReadQuery,
    Record, RecordId,
};
use softrow_storage::RecordStore;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

struct Model {
    schema: EntitySchema,
    interceptor: Option<Interceptor>,
    hooks: Option<Arc<dyn DeleteHooks>>,
    current: RwLock<Option<RecordId>>,
}

impl Model {
    fn current(&self) -> Option<RecordId> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_current(&self, id: Option<RecordId>) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = id;
    }
}

/// Access layer over a [`RecordStore`].
pub struct Repository<S: RecordStore> {
    store: S,
    models: HashMap<String, Model>,
}

impl<S: RecordStore> Repository<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            models: HashMap::new(),
        }
    }

    /// Reads records regardless of deletion state. Nothing is written.
    pub fn read_unfiltered(
        &self,
        entity_type: &str,
        query: &ReadQuery,
    ) -> DeletionResult<Vec<Record>> {
        self.model(entity_type)?;
        Ok(self.store.read(entity_type, query)?)
    }

    /// Number of stored rows, deleted ones included.
    pub fn row_count(&self, entity_type: &str) -> DeletionResult<usize> {
        let primary_key = self.primary_key(entity_type)?;
        let query = ReadQuery::new().fields([primary_key]).depth(0);
        Ok(self.store.read(entity_type, &query)?.len())
    }

    // ── Configuration ────────────────────────────────────────────

    /// Creates storage for an entity type and makes it available here.
    ///
    /// Registering an entity type again updates its schema only; the
    /// soft-delete attachment, hooks and current record are kept.
    pub fn register(&mut self, schema: EntitySchema) -> DeletionResult<()> {
        self.store.create_entity(schema.clone())?;
        match self.models.get_mut(&schema.entity_type) {
            Some(model) => {
                debug!(entity = %schema.entity_type, "schema updated");
                model.schema = schema;
            }
            None => {
                self.models.insert(
                    schema.entity_type.clone(),
                    Model {
                        schema,
                        interceptor: None,
                        hooks: None,
                        current: RwLock::new(None),
                    },
                );
            }
        }
        Ok(())
    }

    /// Attaches soft deletion to a registered entity type, replacing any
    /// earlier attachment.
    ///
    /// The deletion column is not checked here; a missing column surfaces
    /// as `UnknownField` on the first read or delete.
    pub fn attach_soft_delete(
        &mut self,
        entity_type: &str,
        config: DeletionConfig,
    ) -> DeletionResult<()> {
        let model = self.model_mut(entity_type)?;
        info!(entity = %entity_type, field = %config.field_name, "Soft delete attached");
        model.interceptor = Some(Interceptor::new(DeletionPolicy::new(entity_type, config)));
        Ok(())
    }

    /// Attaches soft deletion to every entity type named in `config`.
    pub fn attach_from_config(&mut self, config: &SoftDeleteConfig) -> DeletionResult<()> {
        for (entity_type, settings) in &config.entities {
            self.attach_soft_delete(entity_type, settings.clone())?;
        }
        Ok(())
    }

    pub fn set_hooks(
        &mut self,
        entity_type: &str,
        hooks: Arc<dyn DeleteHooks>,
    ) -> DeletionResult<()> {
        self.model_mut(entity_type)?.hooks = Some(hooks);
        Ok(())
    }

    // ── Attachment state ─────────────────────────────────────────

    pub fn is_soft_deletable(&self, entity_type: &str) -> bool {
        self.models
            .get(entity_type)
            .is_some_and(|m| m.interceptor.is_some())
    }

    /// The soft-delete attachment, if any.
    pub fn interceptor(&self, entity_type: &str) -> DeletionResult<Option<&Interceptor>> {
        Ok(self.model(entity_type)?.interceptor.as_ref())
    }

    /// Read mode of a soft-deletable entity type; `None` without an attachment.
    pub fn read_mode(&self, entity_type: &str) -> Option<ReadMode> {
        self.models
            .get(entity_type)
            .and_then(|m| m.interceptor.as_ref())
            .map(Interceptor::mode)
    }

    pub fn include_deleted_records(&self, entity_type: &str) -> DeletionResult<()> {
        self.attached(entity_type)?.include_deleted_records();
        Ok(())
    }

    pub fn exclude_deleted_records(&self, entity_type: &str) -> DeletionResult<()> {
        self.attached(entity_type)?.exclude_deleted_records();
        Ok(())
    }

    // ── Records ──────────────────────────────────────────────────

    /// Inserts a record and selects it as the entity type's current record.
    pub fn insert(&self, entity_type: &str, record: Record) -> DeletionResult<RecordId> {
        let model = self.model(entity_type)?;
        let id = self.store.insert(entity_type, record)?;
        model.set_current(Some(id.clone()));
        Ok(id)
    }

    /// Selects (or clears) the current record of an entity type.
    pub fn select(&self, entity_type: &str, id: Option<RecordId>) -> DeletionResult<()> {
        self.model(entity_type)?.set_current(id);
        Ok(())
    }

    pub fn current(&self, entity_type: &str) -> DeletionResult<Option<RecordId>> {
        Ok(self.model(entity_type)?.current())
    }

    /// Reads one record by primary key, subject to the read mode.
    pub fn find_by_id(&self, entity_type: &str, id: &RecordId) -> DeletionResult<Option<Record>> {
        let primary_key = self.primary_key(entity_type)?;
        let query = ReadQuery::new()
            .conditions(Conditions::new().with(&primary_key, id.to_value()))
            .limit(1);
        Ok(self.find(entity_type, query)?.into_iter().next())
    }

    /// Deletes every record matching `conditions`.
    ///
    /// Empty conditions are rejected before any storage call. Soft-deletable
    /// entity types go through [`Interceptor::delete_all`]; others are
    /// removed physically, per record with hooks when `callbacks` is set,
    /// otherwise in one statement.
    pub fn delete_all(
        &self,
        entity_type: &str,
        conditions: &Conditions,
        cascade: bool,
        callbacks: bool,
    ) -> DeletionResult<bool> {
        if conditions.is_empty() {
            return Err(DeletionError::InvalidArgument(format!(
                "refusing to delete every {entity_type} record without conditions"
            )));
        }
        let model = self.model(entity_type)?;
        match &model.interceptor {
            Some(interceptor) => interceptor.delete_all(self, conditions, cascade, callbacks),
            None => self.hard_delete_all(model, conditions, cascade, callbacks),
        }
    }

    /// Runs a [`DeleteRequest`].
    pub fn execute(&self, entity_type: &str, request: DeleteRequest) -> DeletionResult<bool> {
        match &request.target {
            DeleteTarget::Current => self.delete(entity_type, None, request.cascade),
            DeleteTarget::Id(id) => self.delete(entity_type, Some(id), request.cascade),
            DeleteTarget::Matching(conditions) => {
                self.delete_all(entity_type, conditions, request.cascade, request.callbacks)
            }
        }
    }

    fn hard_delete_all(
        &self,
        model: &Model,
        conditions: &Conditions,
        cascade: bool,
        callbacks: bool,
    ) -> DeletionResult<bool> {
        let entity_type = model.schema.entity_type.as_str();
        let primary_key = model.schema.primary_key.as_str();
        let query = ReadQuery::new()
            .conditions(conditions.clone())
            .fields([primary_key])
            .depth(0);
        let matched = self.find(entity_type, query)?;
        if matched.is_empty() {
            return Ok(true);
        }

        if callbacks {
            let mut result = true;
            for record in &matched {
                result &= self.delete(entity_type, Some(&record.id), cascade)?;
            }
            return Ok(result);
        }

        if cascade {
            for record in &matched {
                self.delete_dependent(entity_type, &record.id, cascade)?;
            }
        }
        let ids: Vec<Value> = matched.iter().map(|r| r.id.to_value()).collect();
        let removed = self
            .store
            .delete_where(entity_type, &Conditions::new().with(primary_key, ids))?;
        debug!(entity = %entity_type, removed, "bulk removed records");
        Ok(true)
    }

    fn model(&self, entity_type: &str) -> DeletionResult<&Model> {
        self.models
            .get(entity_type)
            .ok_or_else(|| DeletionError::UnknownEntity(entity_type.into()))
    }

    fn model_mut(&mut self, entity_type: &str) -> DeletionResult<&mut Model> {
        self.models
            .get_mut(entity_type)
            .ok_or_else(|| DeletionError::UnknownEntity(entity_type.into()))
    }

    fn attached(&self, entity_type: &str) -> DeletionResult<&Interceptor> {
        self.model(entity_type)?.interceptor.as_ref().ok_or_else(|| {
            DeletionError::InvalidArgument(format!("{entity_type} has no soft delete attached"))
        })
    }
}

impl<S: RecordStore> AccessLayer for Repository<S> {
    fn primary_key(&self, entity_type: &str) -> DeletionResult<String> {
        Ok(self.model(entity_type)?.schema.primary_key.clone())
    }

    fn column_type(&self, entity_type: &str, field: &str) -> DeletionResult<Option<ColumnType>> {
        Ok(self.store.column_type(entity_type, field)?)
    }

    fn find(&self, entity_type: &str, query: ReadQuery) -> DeletionResult<Vec<Record>> {
        let model = self.model(entity_type)?;
        let query = match &model.interceptor {
            Some(interceptor) => interceptor.before_read(self, query)?,
            None => query,
        };
        Ok(self.store.read(entity_type, &query)?)
    }

    fn save_field(
        &self,
        entity_type: &str,
        id: &RecordId,
        field: &str,
        value: Value,
    ) -> DeletionResult<bool> {
        self.model(entity_type)?;
        Ok(self.store.save_field(entity_type, id, field, value)?)
    }

    fn delete(
        &self,
        entity_type: &str,
        id: Option<&RecordId>,
        cascade: bool,
    ) -> DeletionResult<bool> {
        let model = self.model(entity_type)?;
        let selected = model.current();
        let Some(active) = id.or(selected.as_ref()) else {
            return Err(DeletionError::InvalidArgument(format!(
                "no {entity_type} record selected to delete"
            )));
        };

        if let Some(hooks) = &model.hooks
            && !hooks.before_delete(entity_type, active, cascade)
        {
            warn!(entity = %entity_type, id = %active, "delete vetoed by hook");
            return Ok(false);
        }

        let deleted = match &model.interceptor {
            Some(interceptor) => interceptor.delete(self, active, cascade)?,
            None => {
                if cascade {
                    self.delete_dependent(entity_type, active, cascade)?;
                }
                let removed = self.store.delete(entity_type, active)?;
                debug!(entity = %entity_type, id = %active, removed, "removed record");
                removed
            }
        };

        if deleted && let Some(hooks) = &model.hooks {
            hooks.after_delete(entity_type, active);
        }
        Ok(deleted)
    }

    fn delete_dependent(
        &self,
        entity_type: &str,
        id: &RecordId,
        cascade: bool,
    ) -> DeletionResult<()> {
        let model = self.model(entity_type)?;
        for dependent in &model.schema.dependents {
            let child_key = self.primary_key(&dependent.entity_type)?;
            let query = ReadQuery::new()
                .conditions(Conditions::new().with(&dependent.foreign_key, id.to_value()))
                .fields([child_key])
                .depth(0);
            let children = self.find(&dependent.entity_type, query)?;
            debug!(
                entity = %entity_type,
                id = %id,
                dependent = %dependent.entity_type,
                count = children.len(),
                "cascading delete"
            );
            for child in &children {
                self.delete(&dependent.entity_type, Some(&child.id), cascade)?;
            }
        }
        Ok(())
    }
}
