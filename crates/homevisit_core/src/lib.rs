//! Core data layer for the home-visit caseload tracker.
//! This crate is the single source of truth for record matching and storage rules.

pub mod config;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use config::{CaseloadConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::child::{parse_assigned_nurse, ChildRecord};
pub use model::identity::ChildIdentity;
pub use model::note::NoteRecord;
pub use model::visit::VisitLogEntry;
pub use service::child_service::{ChildService, NurseAssignment};
pub use service::note_service::NoteService;
pub use service::report_service::{caseload_report, AgeExtreme, CaseloadReport, TownCount};
pub use service::visit_service::VisitLogService;
pub use service::{ServiceError, ServiceResult};
pub use store::{open_table, StoreError, StoreResult, Table, TableStore};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
