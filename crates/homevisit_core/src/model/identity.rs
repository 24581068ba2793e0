//! Composite child identity shared by the child, visit log and notes tables.
//!
//! # Responsibility
//! - Canonicalize guardian IDs and compare child names case-insensitively.
//! - Match and stamp identity columns on raw table rows.
//!
//! # Invariants
//! - Guardian IDs compare exactly after canonicalization.
//! - Child names compare after trimming and lower-casing.
//! - Identity stores names as the caller spelled them; only comparison folds case.

use crate::model::columns::{CHILD_FIRST_NAME, CHILD_LAST_NAME, MOTHER_ID};
use crate::store::Table;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

// Spreadsheet tools re-save integer IDs as `117.0`.
static FLOAT_INTEGER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(-?\d+)\.0+$").expect("valid float-integer regex"));

/// Key correlating one child across tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildIdentity {
    /// Canonical guardian (mother) ID.
    pub guardian_id: String,
    pub first_name: String,
    pub last_name: String,
}

impl ChildIdentity {
    pub fn new(
        guardian_id: impl AsRef<str>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            guardian_id: canonical_guardian_id(guardian_id.as_ref()),
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    /// Reads the identity columns of one row.
    pub fn from_row(table: &Table, row: &[String]) -> Self {
        Self::new(
            table.cell(row, MOTHER_ID),
            table.cell(row, CHILD_FIRST_NAME),
            table.cell(row, CHILD_LAST_NAME),
        )
    }

    /// Returns whether raw `(guardian, first, last)` values denote this child.
    pub fn matches(&self, guardian_id: &str, first_name: &str, last_name: &str) -> bool {
        canonical_guardian_id(guardian_id) == self.guardian_id
            && fold_name(first_name) == fold_name(&self.first_name)
            && fold_name(last_name) == fold_name(&self.last_name)
    }

    /// Returns whether one table row belongs to this child.
    pub fn matches_row(&self, table: &Table, row: &[String]) -> bool {
        self.matches(
            table.cell(row, MOTHER_ID),
            table.cell(row, CHILD_FIRST_NAME),
            table.cell(row, CHILD_LAST_NAME),
        )
    }

    /// Returns `"First Last"` as shown in drill-down lists.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_blank(&self) -> bool {
        self.guardian_id.is_empty()
            || self.first_name.trim().is_empty()
            || self.last_name.trim().is_empty()
    }

    pub(crate) fn identity_cells(&self) -> [(&'static str, &str); 3] {
        [
            (MOTHER_ID, self.guardian_id.as_str()),
            (CHILD_FIRST_NAME, self.first_name.as_str()),
            (CHILD_LAST_NAME, self.last_name.as_str()),
        ]
    }
}

impl Display for ChildIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (guardian {})",
            self.display_name(),
            self.guardian_id
        )
    }
}

/// Canonical spelling of a guardian ID: trimmed, float-integer suffix removed.
pub fn canonical_guardian_id(raw: &str) -> String {
    let trimmed = raw.trim();
    match FLOAT_INTEGER_RE.captures(trimmed) {
        Some(caps) => caps[1].to_string(),
        None => trimmed.to_string(),
    }
}

fn fold_name(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::{canonical_guardian_id, ChildIdentity};

    #[test]
    fn guardian_id_folds_spreadsheet_float_spelling() {
        assert_eq!(canonical_guardian_id(" 117.0 "), "117");
        assert_eq!(canonical_guardian_id("117.00"), "117");
        assert_eq!(canonical_guardian_id("117.5"), "117.5");
        assert_eq!(canonical_guardian_id("A-117"), "A-117");
    }

    #[test]
    fn names_match_case_insensitively_but_guardian_exactly() {
        let identity = ChildIdentity::new("117", "ana", "lee");
        assert!(identity.matches("117", "Ana", "LEE"));
        assert!(identity.matches("117.0", " ana", "lee "));
        assert!(!identity.matches("1170", "ana", "lee"));
        assert!(!identity.matches("117", "anna", "lee"));
    }

    #[test]
    fn blank_identity_is_detected() {
        assert!(ChildIdentity::new("", "ana", "lee").is_blank());
        assert!(ChildIdentity::new("117", " ", "lee").is_blank());
        assert!(!ChildIdentity::new("117", "ana", "lee").is_blank());
    }
}
