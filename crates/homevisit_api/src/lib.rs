//! Boundary API for UI front ends.
//!
//! # Responsibility
//! - Expose use-case level calls returning plain-data envelopes.
//! - Turn every core error into a user-facing message at this boundary.
//!
//! # Invariants
//! - No function here panics or returns `Result`; failures set `ok = false`.
//! - Each call opens its tables fresh; nothing is cached between calls.
//!
//! # See also
//! - docs/architecture/storage.md

use chrono::NaiveDate;
use homevisit_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, open_table,
    ping as ping_inner, CaseloadConfig, CaseloadReport, ChildIdentity, ChildRecord, ChildService,
    NoteService, ServiceError, TableStore, VisitLogService,
};
use log::error;
use std::path::Path;

const VISIT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

type DynStore = Box<dyn TableStore>;

/// Health-check call.
pub fn ping() -> String {
    ping_inner().to_owned()
}

pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes core logging once per process.
///
/// Returns an empty string on success and the error message otherwise.
pub fn init_logging(level: &str, log_dir: &Path) -> String {
    match init_logging_inner(level, log_dir) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Current local time in the visit log's `YYYY-MM-DD HH:MM:SS` spelling.
pub fn current_visit_time() -> String {
    chrono::Local::now().format(VISIT_TIME_FORMAT).to_string()
}

/// Generic envelope for mutating calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    /// Human-readable result for a dialog or status line.
    pub message: String,
    /// Rows removed by a delete call.
    pub removed: Option<usize>,
}

impl ActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
            removed: None,
        }
    }

    fn failure(operation: &str, err: &ServiceError) -> Self {
        error!(
            "event={operation} module=api status=error error_code={}",
            err.code()
        );
        Self {
            ok: false,
            message: err.user_message(),
            removed: None,
        }
    }
}

/// One row of the visit list shown on a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitItem {
    pub nurse_name: String,
    pub visit_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitListResponse {
    pub ok: bool,
    /// Storage order.
    pub items: Vec<VisitItem>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteResponse {
    pub ok: bool,
    /// `None` when the child has no note yet.
    pub text: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildLookupResponse {
    pub ok: bool,
    pub child: Option<ChildRecord>,
    pub message: String,
}

/// Pre-formatted profile text for clipboard or an external PDF exporter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileResponse {
    pub ok: bool,
    pub title: String,
    pub text: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportResponse {
    pub ok: bool,
    pub report: Option<CaseloadReport>,
    pub message: String,
}

/// One child in a town drill-down list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TownChildItem {
    pub display_name: String,
    pub guardian_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TownChildrenResponse {
    pub ok: bool,
    pub items: Vec<TownChildItem>,
    pub message: String,
}

/// Looks up one child by identity.
pub fn child_lookup(config: &CaseloadConfig, identity: &ChildIdentity) -> ChildLookupResponse {
    match child_service(config).find(identity) {
        Ok(Some(child)) => ChildLookupResponse {
            ok: true,
            child: Some(child),
            message: String::new(),
        },
        Ok(None) => ChildLookupResponse {
            ok: false,
            child: None,
            message: "Child data not found.".to_string(),
        },
        Err(err) => {
            error!("event=child_lookup module=api status=error error_code={}", err.code());
            ChildLookupResponse {
                ok: false,
                child: None,
                message: err.user_message(),
            }
        }
    }
}

/// Returns the profile title and text for one child.
pub fn child_profile(config: &CaseloadConfig, identity: &ChildIdentity) -> ProfileResponse {
    let lookup = child_lookup(config, identity);
    match lookup.child {
        Some(child) => ProfileResponse {
            ok: true,
            title: child.profile_title(),
            text: child.profile_text(),
            message: String::new(),
        },
        None => ProfileResponse {
            ok: false,
            title: String::new(),
            text: String::new(),
            message: lookup.message,
        },
    }
}

/// Lists visits for one child in storage order.
pub fn visits_list(config: &CaseloadConfig, identity: &ChildIdentity) -> VisitListResponse {
    match visit_service(config).list_for_child(identity) {
        Ok(entries) => {
            let items = entries
                .into_iter()
                .map(|entry| VisitItem {
                    nurse_name: entry.nurse_name,
                    visit_time: entry.visit_time,
                })
                .collect::<Vec<_>>();
            let message = if items.is_empty() {
                "No visits logged.".to_string()
            } else {
                format!("{} visit(s) logged.", items.len())
            };
            VisitListResponse {
                ok: true,
                items,
                message,
            }
        }
        Err(err) => {
            error!("event=visits_list module=api status=error error_code={}", err.code());
            VisitListResponse {
                ok: false,
                items: Vec::new(),
                message: err.user_message(),
            }
        }
    }
}

/// Logs a visit for the child's assigned nurse at `visit_time`.
pub fn visit_log(
    config: &CaseloadConfig,
    identity: &ChildIdentity,
    visit_time: &str,
) -> ActionResponse {
    match child_service(config).log_visit(identity, visit_time) {
        Ok(entry) => ActionResponse::success(format!(
            "Visit logged for nurse {}.",
            entry.nurse_name
        )),
        Err(err) => ActionResponse::failure("visit_log", &err),
    }
}

/// Deletes the visit equal to `(identity, nurse_name, visit_time)`.
pub fn visit_delete(
    config: &CaseloadConfig,
    identity: &ChildIdentity,
    nurse_name: &str,
    visit_time: &str,
) -> ActionResponse {
    match visit_service(config).delete(identity, nurse_name, visit_time) {
        Ok(removed) => ActionResponse {
            ok: true,
            message: "Visit log deleted successfully.".to_string(),
            removed: Some(removed),
        },
        Err(err) => ActionResponse::failure("visit_delete", &err),
    }
}

/// Returns the child's note text, if any.
pub fn note_get(config: &CaseloadConfig, identity: &ChildIdentity) -> NoteResponse {
    match note_service(config).get(identity) {
        Ok(note) => NoteResponse {
            ok: true,
            text: note.map(|record| record.text),
            message: String::new(),
        },
        Err(err) => {
            error!("event=note_get module=api status=error error_code={}", err.code());
            NoteResponse {
                ok: false,
                text: None,
                message: err.user_message(),
            }
        }
    }
}

/// Replaces the child's note.
pub fn note_save(config: &CaseloadConfig, identity: &ChildIdentity, text: &str) -> ActionResponse {
    match note_service(config).upsert(identity, text) {
        Ok(_) => ActionResponse::success("Notes saved successfully."),
        Err(err) => ActionResponse::failure("note_save", &err),
    }
}

/// Assigns a nurse and auto-logs the assignment as a visit at `visit_time`.
pub fn nurse_assign(
    config: &CaseloadConfig,
    identity: &ChildIdentity,
    nurse_name: &str,
    visit_time: &str,
) -> ActionResponse {
    match child_service(config).assign_nurse(identity, nurse_name, visit_time) {
        Ok(assignment) => ActionResponse::success(format!(
            "Nurse {} assigned and logged.",
            assignment.logged_visit.nurse_name
        )),
        Err(err) => ActionResponse::failure("nurse_assign", &err),
    }
}

/// Computes caseload statistics as of `today`.
pub fn caseload_report(config: &CaseloadConfig, today: NaiveDate) -> ReportResponse {
    match child_service(config).report(today) {
        Ok(report) => ReportResponse {
            ok: true,
            report: Some(report),
            message: String::new(),
        },
        Err(err) => {
            error!("event=caseload_report module=api status=error error_code={}", err.code());
            ReportResponse {
                ok: false,
                report: None,
                message: err.user_message(),
            }
        }
    }
}

/// Lists children living in `town`.
pub fn town_children(config: &CaseloadConfig, town: &str) -> TownChildrenResponse {
    match child_service(config).children_in_town(town) {
        Ok(children) if children.is_empty() => TownChildrenResponse {
            ok: true,
            items: Vec::new(),
            message: format!("No children found for {}.", town.trim()),
        },
        Ok(children) => TownChildrenResponse {
            ok: true,
            items: children
                .into_iter()
                .map(|child| TownChildItem {
                    display_name: child.identity.display_name(),
                    guardian_id: child.identity.guardian_id,
                })
                .collect(),
            message: String::new(),
        },
        Err(err) => {
            error!("event=town_children module=api status=error error_code={}", err.code());
            TownChildrenResponse {
                ok: false,
                items: Vec::new(),
                message: err.user_message(),
            }
        }
    }
}

fn visit_service(config: &CaseloadConfig) -> VisitLogService<DynStore> {
    VisitLogService::new(open_table(config.visit_log_path()))
}

fn note_service(config: &CaseloadConfig) -> NoteService<DynStore> {
    NoteService::new(open_table(config.notes_path()))
}

fn child_service(config: &CaseloadConfig) -> ChildService<DynStore, DynStore> {
    ChildService::new(open_table(config.children_path()), visit_service(config))
}
