//! Caseload domain model.
//!
//! # Responsibility
//! - Define the record shapes read from and written to the three tables.
//! - Own the column names shared with spreadsheet files.
//!
//! # Invariants
//! - Column names are part of the file format and never change spelling.
//! - Records are correlated across tables only through `ChildIdentity`.

pub mod child;
pub mod columns;
pub mod identity;
pub mod note;
pub mod visit;
