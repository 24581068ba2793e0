//! Visit log entry model.
//!
//! # Invariants
//! - An entry has no identifier beyond its full `(identity, nurse, time)` tuple.
//! - `visit_time` is opaque text; it is never parsed or reformatted.

use crate::model::columns::{NURSE_NAME, VISIT_TIME};
use crate::model::identity::ChildIdentity;
use crate::store::Table;
use serde::{Deserialize, Serialize};

/// One nurse visit recorded for a child.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitLogEntry {
    pub identity: ChildIdentity,
    pub nurse_name: String,
    pub visit_time: String,
}

impl VisitLogEntry {
    pub fn from_row(table: &Table, row: &[String]) -> Self {
        Self {
            identity: ChildIdentity::from_row(table, row),
            nurse_name: table.cell(row, NURSE_NAME).to_string(),
            visit_time: table.cell(row, VISIT_TIME).to_string(),
        }
    }

    /// Returns whether one log row is exactly this entry.
    pub(crate) fn matches_row(&self, table: &Table, row: &[String]) -> bool {
        self.identity.matches_row(table, row)
            && table.cell(row, NURSE_NAME) == self.nurse_name
            && table.cell(row, VISIT_TIME) == self.visit_time
    }
}
