use homevisit_core::store::CsvTableFile;
use homevisit_core::{ChildIdentity, ServiceError, TableStore, VisitLogService};

fn service_in(dir: &tempfile::TempDir) -> VisitLogService<CsvTableFile> {
    VisitLogService::new(CsvTableFile::new(dir.path().join("nurse_log.csv")))
}

#[test]
fn list_returns_appended_entries_in_call_order() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_in(&dir);
    let ana = ChildIdentity::new("117", "ana", "lee");

    service.append(&ana, "Nurse B", "2024-02-01 08:00").unwrap();
    service.append(&ana, "Nurse A", "2024-01-01 10:00").unwrap();
    service.append(&ana, "Nurse B", "2024-03-01 12:30").unwrap();

    let times = service
        .list_for_child(&ana)
        .unwrap()
        .into_iter()
        .map(|entry| entry.visit_time)
        .collect::<Vec<_>>();
    assert_eq!(
        times,
        vec!["2024-02-01 08:00", "2024-01-01 10:00", "2024-03-01 12:30"]
    );
}

#[test]
fn list_matches_names_case_insensitively_and_guardian_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_in(&dir);

    service
        .append(&ChildIdentity::new("117", "Ana", "Lee"), "Nurse A", "t1")
        .unwrap();
    service
        .append(&ChildIdentity::new("118", "Ana", "Lee"), "Nurse A", "t2")
        .unwrap();
    service
        .append(&ChildIdentity::new("117", "Ana", "Leeds"), "Nurse A", "t3")
        .unwrap();

    let listed = service
        .list_for_child(&ChildIdentity::new("117", "ANA", "lee"))
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].visit_time, "t1");
}

#[test]
fn list_on_missing_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_in(&dir);
    let listed = service
        .list_for_child(&ChildIdentity::new("1", "a", "b"))
        .unwrap();
    assert!(listed.is_empty());
}

#[test]
fn append_allows_identical_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_in(&dir);
    let ana = ChildIdentity::new("117", "ana", "lee");

    service.append(&ana, "Nurse A", "same").unwrap();
    service.append(&ana, "Nurse A", "same").unwrap();
    assert_eq!(service.list_for_child(&ana).unwrap().len(), 2);
}

#[test]
fn append_rejects_blank_nurse() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_in(&dir);
    let err = service
        .append(&ChildIdentity::new("117", "ana", "lee"), "  ", "t")
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    assert!(!dir.path().join("nurse_log.csv").exists());
}

#[test]
fn deleting_second_of_two_entries_leaves_first() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_in(&dir);
    let ana = ChildIdentity::new("117", "ana", "lee");
    service.append(&ana, "Nurse A", "2024-01-01 10:00").unwrap();
    service.append(&ana, "Nurse A", "2024-01-05 09:00").unwrap();

    let removed = service.delete(&ana, "Nurse A", "2024-01-05 09:00").unwrap();
    assert_eq!(removed, 1);

    let remaining = service.list_for_child(&ana).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].nurse_name, "Nurse A");
    assert_eq!(remaining[0].visit_time, "2024-01-01 10:00");
}

#[test]
fn delete_removes_every_duplicate() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_in(&dir);
    let ana = ChildIdentity::new("117", "ana", "lee");
    service.append(&ana, "Nurse A", "dup").unwrap();
    service.append(&ana, "Nurse A", "keep").unwrap();
    service.append(&ana, "Nurse A", "dup").unwrap();

    assert_eq!(service.delete(&ana, "Nurse A", "dup").unwrap(), 2);
    let remaining = service.list_for_child(&ana).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].visit_time, "keep");
}

#[test]
fn delete_without_match_fails_and_does_not_rewrite() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_in(&dir);
    let ana = ChildIdentity::new("117", "ana", "lee");
    service.append(&ana, "Nurse A", "2024-01-01 10:00").unwrap();

    let path = dir.path().join("nurse_log.csv");
    let before = std::fs::read(&path).unwrap();

    // nurse name matches exactly, not case-insensitively
    let err = service
        .delete(&ana, "nurse a", "2024-01-01 10:00")
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
    assert_eq!(std::fs::read(&path).unwrap(), before);
}

#[test]
fn delete_on_missing_file_reports_storage_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_in(&dir);
    let err = service
        .delete(&ChildIdentity::new("1", "a", "b"), "Nurse A", "t")
        .unwrap_err();
    assert!(matches!(err, ServiceError::StorageUnavailable(_)));
}

#[test]
fn held_writer_lock_blocks_mutation() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvTableFile::new(dir.path().join("nurse_log.csv"));
    let _held = store.lock().unwrap();

    let service = service_in(&dir);
    let err = service
        .append(&ChildIdentity::new("117", "ana", "lee"), "Nurse A", "t")
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Store(homevisit_core::StoreError::Locked(_))
    ));
}

#[test]
fn appended_file_uses_canonical_columns() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_in(&dir);
    service
        .append(&ChildIdentity::new("117.0", "Ana", "Lee"), "Nurse A", "t")
        .unwrap();

    let written = std::fs::read_to_string(dir.path().join("nurse_log.csv")).unwrap();
    assert_eq!(
        written,
        "Mother_ID,Child_First_Name,Child_Last_Name,Nurse_Name,Visit_Time\n117,Ana,Lee,Nurse A,t\n"
    );
}
