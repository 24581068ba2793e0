//! Per-child free-text note model.
//!
//! # Invariants
//! - At most one note per `ChildIdentity` after any save.

use crate::model::columns::NOTES;
use crate::model::identity::ChildIdentity;
use crate::store::Table;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRecord {
    pub identity: ChildIdentity,
    /// Note body as saved.
    pub text: String,
}

impl NoteRecord {
    pub fn from_row(table: &Table, row: &[String]) -> Self {
        Self {
            identity: ChildIdentity::from_row(table, row),
            text: table.cell(row, NOTES).to_string(),
        }
    }
}
