//! Visit log use-case service.
//!
//! # Responsibility
//! - List, append and delete nurse visits for one child.
//!
//! # Invariants
//! - Listing preserves file storage order; nothing re-sorts entries.
//! - Append never checks for duplicates.
//! - Delete removes every row equal to the `(identity, nurse, time)` tuple
//!   and writes nothing when no row matches.

use crate::model::columns::{NURSE_NAME, VISIT_LOG_COLUMNS, VISIT_TIME};
use crate::model::identity::ChildIdentity;
use crate::model::visit::VisitLogEntry;
use crate::service::{ServiceError, ServiceResult};
use crate::store::TableStore;
use log::{info, warn};
use std::time::Instant;

/// Visit log service over one log table.
pub struct VisitLogService<S: TableStore> {
    store: S,
}

impl<S: TableStore> VisitLogService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the visits recorded for `identity` in storage order.
    ///
    /// An absent log file reads as an empty log.
    pub fn list_for_child(&self, identity: &ChildIdentity) -> ServiceResult<Vec<VisitLogEntry>> {
        let table = self.store.load_or_empty(VISIT_LOG_COLUMNS)?;
        Ok(table
            .rows
            .iter()
            .filter(|row| identity.matches_row(&table, row))
            .map(|row| VisitLogEntry::from_row(&table, row))
            .collect())
    }

    /// Appends one visit and rewrites the log.
    ///
    /// Creates the log file with the canonical header when absent.
    pub fn append(
        &self,
        identity: &ChildIdentity,
        nurse_name: &str,
        visit_time: &str,
    ) -> ServiceResult<VisitLogEntry> {
        let started_at = Instant::now();
        let result = self.append_inner(identity, nurse_name, visit_time);
        match &result {
            Ok(_) => info!(
                "event=visit_append module=visit status=ok duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event=visit_append module=visit status=error error_code={} duration_ms={}",
                err.code(),
                started_at.elapsed().as_millis()
            ),
        }
        result
    }

    /// Deletes every visit equal to `(identity, nurse_name, visit_time)`.
    ///
    /// Returns the number of rows removed (more than one when duplicates exist).
    ///
    /// # Errors
    /// - `StorageUnavailable` when the log file is absent.
    /// - `NotFound` when no row matches; the file is not rewritten.
    pub fn delete(
        &self,
        identity: &ChildIdentity,
        nurse_name: &str,
        visit_time: &str,
    ) -> ServiceResult<usize> {
        let started_at = Instant::now();
        let result = self.delete_inner(identity, nurse_name, visit_time);
        match &result {
            Ok(removed) => info!(
                "event=visit_delete module=visit status=ok removed={} duration_ms={}",
                removed,
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event=visit_delete module=visit status=error error_code={} duration_ms={}",
                err.code(),
                started_at.elapsed().as_millis()
            ),
        }
        result
    }

    fn append_inner(
        &self,
        identity: &ChildIdentity,
        nurse_name: &str,
        visit_time: &str,
    ) -> ServiceResult<VisitLogEntry> {
        if identity.is_blank() {
            return Err(ServiceError::Validation(
                "Child identity is incomplete; a visit cannot be logged.".to_string(),
            ));
        }
        let nurse_name = nurse_name.trim();
        if nurse_name.is_empty() {
            return Err(ServiceError::Validation(
                "Please assign a nurse before logging a visit.".to_string(),
            ));
        }

        let _lock = self.store.lock()?;
        let mut table = self.store.load_or_empty(VISIT_LOG_COLUMNS)?;
        let mut values = identity.identity_cells().to_vec();
        values.push((NURSE_NAME, nurse_name));
        values.push((VISIT_TIME, visit_time));
        table.push_named(&values);
        self.store.save(&table)?;

        Ok(VisitLogEntry {
            identity: identity.clone(),
            nurse_name: nurse_name.to_string(),
            visit_time: visit_time.to_string(),
        })
    }

    fn delete_inner(
        &self,
        identity: &ChildIdentity,
        nurse_name: &str,
        visit_time: &str,
    ) -> ServiceResult<usize> {
        let target = VisitLogEntry {
            identity: identity.clone(),
            nurse_name: nurse_name.to_string(),
            visit_time: visit_time.to_string(),
        };

        let _lock = self.store.lock()?;
        let mut table = self.store.load()?;
        let before = table.rows.len();
        let kept = table
            .rows
            .iter()
            .filter(|row| !target.matches_row(&table, row))
            .cloned()
            .collect::<Vec<_>>();
        let removed = before - kept.len();
        if removed == 0 {
            return Err(ServiceError::NotFound(format!(
                "visit by {nurse_name} on {visit_time}"
            )));
        }

        table.rows = kept;
        self.store.save(&table)?;
        Ok(removed)
    }
}
