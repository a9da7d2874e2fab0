//! Interceptor: rewrites reads and redirects deletes for one soft-deletable
//! entity type.
//!
//! The read mode is shared state on the attachment. Callers sharing one
//! [`Interceptor`] share the mode, so `include_deleted_records` must be
//! paired with `exclude_deleted_records` within the same unit of work.
//! Nothing resets it automatically.

use crate::policy::DeletionPolicy;
use crate::{AccessLayer, DeletionError, DeletionResult};
use softrow_model::{Conditions, ReadQuery, RecordId};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

/// Whether default reads hide deleted records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadMode {
    #[default]
    Excluding,
    Including,
}

/// Soft-delete attachment for one entity type.
#[derive(Debug)]
pub struct Interceptor {
    policy: DeletionPolicy,
    including: AtomicBool,
}

impl Interceptor {
    pub fn new(policy: DeletionPolicy) -> Self {
        Self {
            policy,
            including: AtomicBool::new(false),
        }
    }

    pub fn policy(&self) -> &DeletionPolicy {
        &self.policy
    }

    pub fn mode(&self) -> ReadMode {
        if self.including.load(Ordering::SeqCst) {
            ReadMode::Including
        } else {
            ReadMode::Excluding
        }
    }

    /// Stop hiding deleted records from reads.
    pub fn include_deleted_records(&self) {
        self.including.store(true, Ordering::SeqCst);
    }

    /// Go back to hiding deleted records from reads.
    pub fn exclude_deleted_records(&self) {
        self.including.store(false, Ordering::SeqCst);
    }

    /// Adds the exclusion predicate to a read, unless deleted records are
    /// being included or the caller already constrains the deletion field.
    pub fn before_read<A: AccessLayer + ?Sized>(
        &self,
        access: &A,
        mut query: ReadQuery,
    ) -> DeletionResult<ReadQuery> {
        if self.mode() == ReadMode::Including {
            return Ok(query);
        }
        if self
            .policy
            .already_references_field(query.conditions.as_ref())
        {
            debug!(
                entity = %self.policy.entity_type(),
                field = %self.policy.field_name(),
                "read already constrains deletion field, not filtering"
            );
            return Ok(query);
        }

        let predicate = self.policy.exclusion_predicate(access)?;
        query
            .conditions
            .get_or_insert_with(Conditions::new)
            .merge_absent(predicate);
        Ok(query)
    }

    /// Marks one record deleted, cascading to dependents first when asked.
    ///
    /// Only the deletion column is written. Returns the result of that
    /// single-field update.
    pub fn delete<A: AccessLayer + ?Sized>(
        &self,
        access: &A,
        id: &RecordId,
        cascade: bool,
    ) -> DeletionResult<bool> {
        let entity_type = self.policy.entity_type();
        if cascade {
            access.delete_dependent(entity_type, id, cascade)?;
        }

        let mutation = self.policy.deletion_mutation(access)?;
        let saved = access.save_field(entity_type, id, &mutation.field, mutation.value)?;
        debug!(entity = %entity_type, id = %id, cascade, saved, "soft deleted record");
        Ok(saved)
    }

    /// Soft deletes every record matching `conditions`, one at a time.
    ///
    /// Not transactional: a failed record leaves earlier ones deleted and
    /// later ones are still attempted. The result is `true` only if every
    /// record was deleted. `callbacks` is accepted but not honoured; hooks
    /// fire for every record.
    pub fn delete_all<A: AccessLayer + ?Sized>(
        &self,
        access: &A,
        conditions: &Conditions,
        cascade: bool,
        _callbacks: bool,
    ) -> DeletionResult<bool> {
        let entity_type = self.policy.entity_type();
        if conditions.is_empty() {
            return Err(DeletionError::InvalidArgument(format!(
                "refusing to delete every {entity_type} record without conditions"
            )));
        }

        let primary_key = access.primary_key(entity_type)?;
        let query = ReadQuery::new()
            .conditions(conditions.clone())
            .fields([format!("{entity_type}.{primary_key}")])
            .depth(0);
        let matched = access.find(entity_type, query)?;
        if matched.is_empty() {
            return Ok(true);
        }

        let mut result = true;
        for record in &matched {
            result &= access.delete(entity_type, Some(&record.id), cascade)?;
        }
        if !result {
            warn!(
                entity = %entity_type,
                matched = matched.len(),
                "bulk soft delete left some records undeleted"
            );
        }
        Ok(result)
    }
}
