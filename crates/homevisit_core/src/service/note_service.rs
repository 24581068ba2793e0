//! Per-child note use-case service.
//!
//! # Responsibility
//! - Look up and replace the single free-text note of one child.
//!
//! # Invariants
//! - `upsert` removes every row of the child before appending the new one,
//!   so at most one note per identity exists after any save.
//! - Note text is trimmed of surrounding whitespace before it is stored.

use crate::model::columns::{NOTES, NOTES_COLUMNS};
use crate::model::identity::ChildIdentity;
use crate::model::note::NoteRecord;
use crate::service::{ServiceError, ServiceResult};
use crate::store::TableStore;
use log::{info, warn};
use std::time::Instant;

/// Note service over one notes table.
pub struct NoteService<S: TableStore> {
    store: S,
}

impl<S: TableStore> NoteService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the first note stored for `identity`.
    pub fn get(&self, identity: &ChildIdentity) -> ServiceResult<Option<NoteRecord>> {
        let table = self.store.load_or_empty(NOTES_COLUMNS)?;
        Ok(table
            .rows
            .iter()
            .find(|row| identity.matches_row(&table, row))
            .map(|row| NoteRecord::from_row(&table, row)))
    }

    /// Replaces the note of `identity` with `text`.
    pub fn upsert(&self, identity: &ChildIdentity, text: &str) -> ServiceResult<NoteRecord> {
        let started_at = Instant::now();
        let result = self.upsert_inner(identity, text);
        match &result {
            Ok(record) => info!(
                "event=note_upsert module=note status=ok chars={} duration_ms={}",
                record.text.chars().count(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event=note_upsert module=note status=error error_code={} duration_ms={}",
                err.code(),
                started_at.elapsed().as_millis()
            ),
        }
        result
    }

    fn upsert_inner(&self, identity: &ChildIdentity, text: &str) -> ServiceResult<NoteRecord> {
        if identity.is_blank() {
            return Err(ServiceError::Validation(
                "Child identity is incomplete; notes cannot be saved.".to_string(),
            ));
        }
        let text = text.trim();

        let _lock = self.store.lock()?;
        let mut table = self.store.load_or_empty(NOTES_COLUMNS)?;
        let kept = table
            .rows
            .iter()
            .filter(|row| !identity.matches_row(&table, row))
            .cloned()
            .collect::<Vec<_>>();
        table.rows = kept;

        let mut values = identity.identity_cells().to_vec();
        values.push((NOTES, text));
        table.push_named(&values);
        self.store.save(&table)?;

        Ok(NoteRecord {
            identity: identity.clone(),
            text: text.to_string(),
        })
    }
}
