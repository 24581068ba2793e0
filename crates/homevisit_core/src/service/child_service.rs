//! Child table use-case service.
//!
//! # Responsibility
//! - Look up children by identity, drill-down name or town.
//! - Assign a nurse (the only write this core makes to the child table) and
//!   auto-log the assignment as a visit.
//! - Log a visit for the currently assigned nurse.
//! - Compute the caseload report over the whole table.
//!
//! # Invariants
//! - Only the `Assigned_Nurse` column is ever rewritten; every other cell,
//!   column and row order survives unchanged.
//! - Assignment and its auto-log are two separate durable writes; there is no
//!   transaction spanning both files.

use crate::model::child::ChildRecord;
use crate::model::columns::{ASSIGNED_NURSE, CHILD_IDENTITY_COLUMNS};
use crate::model::identity::{canonical_guardian_id, ChildIdentity};
use crate::model::visit::VisitLogEntry;
use crate::service::report_service::{caseload_report, CaseloadReport};
use crate::service::visit_service::VisitLogService;
use crate::service::{ServiceError, ServiceResult};
use crate::store::{StoreResult, Table, TableStore};
use chrono::NaiveDate;
use log::{info, warn};
use std::time::Instant;

/// Result of a nurse assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NurseAssignment {
    pub child: ChildRecord,
    /// Visit auto-logged for the new nurse.
    pub logged_visit: VisitLogEntry,
}

/// Child table service; owns the visit log it auto-logs into.
pub struct ChildService<C: TableStore, V: TableStore> {
    children: C,
    visits: VisitLogService<V>,
}

impl<C: TableStore, V: TableStore> ChildService<C, V> {
    pub fn new(children: C, visits: VisitLogService<V>) -> Self {
        Self { children, visits }
    }

    pub fn visits(&self) -> &VisitLogService<V> {
        &self.visits
    }

    /// Returns every child in storage order; an absent table reads as empty.
    ///
    /// # Errors
    /// - `Store(InvalidData)` when an identity column is missing.
    pub fn list(&self) -> ServiceResult<Vec<ChildRecord>> {
        let table = self.children.load_or_empty(CHILD_IDENTITY_COLUMNS)?;
        require_identity_columns(&table)?;
        Ok(table
            .rows
            .iter()
            .map(|row| ChildRecord::from_row(&table, row))
            .collect())
    }

    /// Returns the first child matching `identity`.
    pub fn find(&self, identity: &ChildIdentity) -> ServiceResult<Option<ChildRecord>> {
        Ok(self
            .list()?
            .into_iter()
            .find(|child| same_child(&child.identity, identity)))
    }

    /// Finds a child by guardian ID and the `"First Last"` display name used
    /// in town drill-down lists.
    pub fn find_by_display_name(
        &self,
        guardian_id: &str,
        display_name: &str,
    ) -> ServiceResult<Option<ChildRecord>> {
        let guardian_id = canonical_guardian_id(guardian_id);
        Ok(self.list()?.into_iter().find(|child| {
            child.identity.guardian_id == guardian_id
                && child.identity.display_name() == display_name
        }))
    }

    /// Returns children whose trimmed `City` equals `town`.
    pub fn children_in_town(&self, town: &str) -> ServiceResult<Vec<ChildRecord>> {
        let town = town.trim();
        Ok(self
            .list()?
            .into_iter()
            .filter(|child| child.city.trim() == town)
            .collect())
    }

    /// Computes caseload statistics as of `today`.
    pub fn report(&self, today: NaiveDate) -> ServiceResult<CaseloadReport> {
        let children = self.list()?;
        Ok(caseload_report(&children, today))
    }

    /// Assigns `nurse_name` to the child and auto-logs a visit at `visit_time`.
    ///
    /// # Errors
    /// - `Validation` when `nurse_name` is blank.
    /// - `StorageUnavailable` when the child table is absent.
    /// - `NotFound` when no row matches `identity`.
    pub fn assign_nurse(
        &self,
        identity: &ChildIdentity,
        nurse_name: &str,
        visit_time: &str,
    ) -> ServiceResult<NurseAssignment> {
        let started_at = Instant::now();
        let result = self.assign_nurse_inner(identity, nurse_name, visit_time);
        match &result {
            Ok(_) => info!(
                "event=nurse_assign module=child status=ok duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event=nurse_assign module=child status=error error_code={} duration_ms={}",
                err.code(),
                started_at.elapsed().as_millis()
            ),
        }
        result
    }

    /// Logs a visit at `visit_time` for the child's assigned nurse.
    ///
    /// # Errors
    /// - `NotFound` when the child does not exist.
    /// - `Validation` when the child has no assigned nurse.
    pub fn log_visit(
        &self,
        identity: &ChildIdentity,
        visit_time: &str,
    ) -> ServiceResult<VisitLogEntry> {
        let child = self
            .find(identity)?
            .ok_or_else(|| ServiceError::NotFound(format!("child {identity}")))?;
        let nurse = child.assigned_nurse.as_deref().ok_or_else(|| {
            ServiceError::Validation("Please assign a nurse before logging a visit.".to_string())
        })?;
        self.visits.append(&child.identity, nurse, visit_time)
    }

    fn assign_nurse_inner(
        &self,
        identity: &ChildIdentity,
        nurse_name: &str,
        visit_time: &str,
    ) -> ServiceResult<NurseAssignment> {
        let nurse_name = nurse_name.trim();
        if nurse_name.is_empty() {
            return Err(ServiceError::Validation(
                "Please choose a nurse to assign.".to_string(),
            ));
        }

        let child = {
            let _lock = self.children.lock()?;
            let mut table = self.children.load()?;
            require_identity_columns(&table)?;
            let updated = write_assignment(&mut table, identity, nurse_name);
            let Some(row_index) = updated.first().copied() else {
                return Err(ServiceError::NotFound(format!("child {identity}")));
            };
            self.children.save(&table)?;
            ChildRecord::from_row(&table, &table.rows[row_index])
        };

        let logged_visit = self.visits.append(&child.identity, nurse_name, visit_time)?;
        Ok(NurseAssignment {
            child,
            logged_visit,
        })
    }
}

/// Sets `Assigned_Nurse` on every row of `identity`; returns the touched row indexes.
fn write_assignment(table: &mut Table, identity: &ChildIdentity, nurse_name: &str) -> Vec<usize> {
    let nurse_column = table.ensure_column(ASSIGNED_NURSE);
    let matching = table
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| identity.matches_row(table, row))
        .map(|(index, _)| index)
        .collect::<Vec<_>>();
    for &index in &matching {
        table.rows[index][nurse_column] = nurse_name.to_string();
    }
    matching
}

fn require_identity_columns(table: &Table) -> StoreResult<()> {
    for column in CHILD_IDENTITY_COLUMNS {
        table.require_column(column)?;
    }
    Ok(())
}

fn same_child(left: &ChildIdentity, right: &ChildIdentity) -> bool {
    left.matches(&right.guardian_id, &right.first_name, &right.last_name)
}
