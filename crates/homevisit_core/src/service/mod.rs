//! Caseload use-case services.
//!
//! # Responsibility
//! - Orchestrate load-modify-save cycles over `TableStore` implementations.
//! - Keep UI/API layers decoupled from file formats.
//! - Translate storage failures into use-case errors with user-facing text.
//!
//! # Invariants
//! - Every mutation holds the table's `WriterLock` from load until save completes.
//! - A failed mutation never writes a partial table.
//! - Services keep no cached table between calls.

use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod child_service;
pub mod note_service;
pub mod report_service;
pub mod visit_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Use-case error shared by caseload services.
#[derive(Debug)]
pub enum ServiceError {
    /// Backing file is absent where an existing record is required.
    StorageUnavailable(PathBuf),
    /// Target record does not exist.
    NotFound(String),
    /// Caller input or record state does not allow the operation.
    Validation(String),
    /// Persistence-layer failure.
    Store(StoreError),
}

impl ServiceError {
    /// Stable code for `error_code=` log fields; carries no record data.
    pub fn code(&self) -> &'static str {
        match self {
            Self::StorageUnavailable(_) => "storage_unavailable",
            Self::NotFound(_) => "not_found",
            Self::Validation(_) => "validation",
            Self::Store(StoreError::Locked(_)) => "locked",
            Self::Store(_) => "store",
        }
    }

    /// Text suitable for a dialog or terminal message.
    pub fn user_message(&self) -> String {
        match self {
            Self::StorageUnavailable(path) => {
                format!("Data file not found: {}.", path.display())
            }
            Self::NotFound(what) => format!("No matching record found for {what}."),
            Self::Validation(message) => message.clone(),
            Self::Store(StoreError::Locked(path)) => format!(
                "The data file is being saved by another instance. If none is running, delete {} and retry.",
                path.display()
            ),
            Self::Store(err) => format!("Could not access the data file: {err}."),
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StorageUnavailable(path) => {
                write!(f, "storage unavailable: {}", path.display())
            }
            Self::NotFound(what) => write!(f, "not found: {what}"),
            Self::Validation(message) => write!(f, "validation failed: {message}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(path) => Self::StorageUnavailable(path),
            other => Self::Store(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ServiceError;
    use crate::store::StoreError;
    use std::path::PathBuf;

    #[test]
    fn missing_file_maps_to_storage_unavailable() {
        let err = ServiceError::from(StoreError::NotFound(PathBuf::from("nurse_log.csv")));
        assert!(matches!(err, ServiceError::StorageUnavailable(_)));
        assert!(err.user_message().contains("nurse_log.csv"));
    }

    #[test]
    fn locked_store_message_names_lock_file() {
        let err = ServiceError::from(StoreError::Locked(PathBuf::from("notes.csv.lock")));
        assert!(err.user_message().contains("notes.csv.lock"));
    }
}
