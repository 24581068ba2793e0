use homevisit_core::store::{CsvTableFile, SqliteTableFile, XlsxTableFile};
use homevisit_core::{open_table, Table, TableStore};

fn sample_table() -> Table {
    let mut table = Table::with_columns([
        "Mother_ID",
        "Child_First_Name",
        "Child_Last_Name",
        "Nurse_Name",
        "Visit_Time",
    ]);
    table.push_named(&[
        ("Mother_ID", "117"),
        ("Child_First_Name", "Ana"),
        ("Child_Last_Name", "Lee"),
        ("Nurse_Name", "Nurse A"),
        ("Visit_Time", "2024-01-01 10:00"),
    ]);
    table.push_named(&[
        ("Mother_ID", "117"),
        ("Child_First_Name", "Ana"),
        ("Child_Last_Name", "Lee"),
        ("Nurse_Name", "Nurse A"),
        ("Visit_Time", "2024-01-01 10:00"),
    ]);
    table.push_named(&[("Mother_ID", "9"), ("Nurse_Name", "O'Neil, \"Jo\"")]);
    table
}

fn assert_save_of_load_is_noop(store: &dyn TableStore) {
    store.save(&sample_table()).unwrap();
    let loaded = store.load().unwrap();
    store.save(&loaded).unwrap();
    let reloaded = store.load().unwrap();

    assert_eq!(reloaded, loaded);
    assert_eq!(reloaded, sample_table());
    assert_eq!(reloaded.len(), 3);
}

#[test]
fn csv_save_of_load_is_noop() {
    let dir = tempfile::tempdir().unwrap();
    assert_save_of_load_is_noop(&CsvTableFile::new(dir.path().join("nurse_log.csv")));
}

#[test]
fn sqlite_save_of_load_is_noop() {
    let dir = tempfile::tempdir().unwrap();
    assert_save_of_load_is_noop(&SqliteTableFile::new(dir.path().join("nurse_log.sqlite3")));
}

#[test]
fn xlsx_save_of_load_is_noop() {
    let dir = tempfile::tempdir().unwrap();
    assert_save_of_load_is_noop(&XlsxTableFile::new(dir.path().join("nurse_log.xlsx")));
}

#[test]
fn open_table_round_trips_through_every_backend() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["t.csv", "t.db", "t.xlsx"] {
        let store = open_table(dir.path().join(name));
        assert_save_of_load_is_noop(store.as_ref());
    }
}

#[test]
fn csv_file_written_by_spreadsheet_keeps_unknown_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("children.csv");
    let original = "Mother_ID,Custom Column,Child_First_Name\n1,keep me,Ana\n";
    std::fs::write(&path, original).unwrap();

    let store = CsvTableFile::new(&path);
    store.save(&store.load().unwrap()).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
}

#[test]
fn csv_rows_longer_than_header_survive_save_of_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("children.csv");
    let original = "Mother_ID,Child_First_Name,Child_Last_Name,Assigned_Nurse\n117,Ana,Lee,None,extra-cell\n";
    std::fs::write(&path, original).unwrap();

    let store = CsvTableFile::new(&path);
    store.save(&store.load().unwrap()).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
}
