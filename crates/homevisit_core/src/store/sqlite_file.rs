//! SQLite-backed table file.
//!
//! # Responsibility
//! - Persist one table as the `records` table inside a SQLite file.
//! - Replace the whole row set inside a single transaction.
//!
//! # Invariants
//! - File format version is tracked via `PRAGMA user_version`.
//! - Files written by a newer format version are rejected before any read or write.
//! - Row order is `rowid` order, which is insertion order.
//!
//! # See also
//! - docs/architecture/storage.md

use super::{StoreError, StoreResult, Table, TableStore};
use log::{debug, error};
use rusqlite::types::ValueRef;
use rusqlite::{params_from_iter, Connection, OpenFlags};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const RECORDS_TABLE: &str = "records";
const FORMAT_VERSION: u32 = 1;

/// Returns the latest file format version known by this binary.
pub fn latest_format_version() -> u32 {
    FORMAT_VERSION
}

/// Table persisted as the `records` table of one SQLite file.
#[derive(Debug, Clone)]
pub struct SqliteTableFile {
    path: PathBuf,
}

impl SqliteTableFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TableStore for SqliteTableFile {
    fn load(&self) -> StoreResult<Table> {
        let started_at = Instant::now();
        if !self.path.exists() {
            debug!("event=table_load module=store status=missing format=sqlite");
            return Err(StoreError::NotFound(self.path.clone()));
        }

        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.busy_timeout(Duration::from_secs(5))?;
        ensure_supported_version(&conn)?;

        let table = read_records(&conn)?;
        debug!(
            "event=table_load module=store status=ok format=sqlite rows={} duration_ms={}",
            table.len(),
            started_at.elapsed().as_millis()
        );
        Ok(table)
    }

    fn save(&self, table: &Table) -> StoreResult<()> {
        let started_at = Instant::now();
        match replace_records(&self.path, table) {
            Ok(()) => {
                debug!(
                    "event=table_save module=store status=ok format=sqlite rows={} duration_ms={}",
                    table.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=table_save module=store status=error format=sqlite duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

fn replace_records(path: &Path, table: &Table) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut conn = Connection::open(path)?;
    conn.busy_timeout(Duration::from_secs(5))?;
    ensure_supported_version(&conn)?;

    let tx = conn.transaction()?;
    tx.execute_batch(&format!("DROP TABLE IF EXISTS {RECORDS_TABLE};"))?;
    if !table.columns.is_empty() {
        let column_defs = table
            .columns
            .iter()
            .map(|column| format!("{} TEXT NOT NULL DEFAULT ''", quote_ident(column)))
            .collect::<Vec<_>>()
            .join(", ");
        tx.execute_batch(&format!("CREATE TABLE {RECORDS_TABLE} ({column_defs});"))?;

        let placeholders = vec!["?"; table.columns.len()].join(", ");
        let mut insert =
            tx.prepare(&format!("INSERT INTO {RECORDS_TABLE} VALUES ({placeholders});"))?;
        for row in &table.rows {
            if row.len() != table.columns.len() {
                return Err(StoreError::InvalidData(format!(
                    "row has {} cells, header has {}",
                    row.len(),
                    table.columns.len()
                )));
            }
            insert.execute(params_from_iter(row.iter()))?;
        }
    }
    tx.execute_batch(&format!("PRAGMA user_version = {FORMAT_VERSION};"))?;
    tx.commit()?;
    Ok(())
}

fn read_records(conn: &Connection) -> StoreResult<Table> {
    let columns = table_columns(conn)?;
    if columns.is_empty() {
        return Ok(Table::default());
    }

    let mut stmt = conn.prepare(&format!("SELECT * FROM {RECORDS_TABLE} ORDER BY rowid;"))?;
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut cells = Vec::with_capacity(columns.len());
        for (index, column) in columns.iter().enumerate() {
            cells.push(cell_text(row.get_ref(index)?, column)?);
        }
        out.push(cells);
    }

    Ok(Table { columns, rows: out })
}

fn table_columns(conn: &Connection) -> StoreResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({RECORDS_TABLE});"))?;
    let mut rows = stmt.query([])?;
    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        columns.push(row.get::<_, String>(1)?);
    }
    Ok(columns)
}

fn cell_text(value: ValueRef<'_>, column: &str) -> StoreResult<String> {
    match value {
        ValueRef::Null => Ok(String::new()),
        ValueRef::Integer(number) => Ok(number.to_string()),
        ValueRef::Real(number) => Ok(number.to_string()),
        ValueRef::Text(bytes) => Ok(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(_) => Err(StoreError::InvalidData(format!(
            "blob value in column `{column}`"
        ))),
    }
}

fn ensure_supported_version(conn: &Connection) -> StoreResult<()> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    if version > FORMAT_VERSION {
        return Err(StoreError::UnsupportedFormatVersion {
            file_version: version,
            latest_supported: FORMAT_VERSION,
        });
    }
    Ok(())
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::{latest_format_version, quote_ident, SqliteTableFile};
    use crate::store::{StoreError, Table, TableStore};
    use rusqlite::Connection;

    #[test]
    fn quote_ident_escapes_embedded_quotes() {
        assert_eq!(quote_ident("Phone_#"), "\"Phone_#\"");
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn save_then_load_keeps_insertion_order_and_special_columns() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteTableFile::new(dir.path().join("children.sqlite3"));
        let mut table = Table::with_columns(["Mother_ID", "Phone_#", "Mobile_#"]);
        table.push_named(&[("Mother_ID", "2"), ("Phone_#", "555-0102")]);
        table.push_named(&[("Mother_ID", "1"), ("Mobile_#", "555-0101")]);

        store.save(&table).unwrap();
        assert_eq!(store.load().unwrap(), table);
    }

    #[test]
    fn numeric_cells_written_by_other_tools_read_back_as_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE records (Mother_ID INTEGER, Visit_Time TEXT);
             INSERT INTO records VALUES (117, NULL);",
        )
        .unwrap();
        drop(conn);

        let table = SqliteTableFile::new(&path).load().unwrap();
        assert_eq!(table.rows, vec![vec!["117", ""]]);
    }

    #[test]
    fn newer_format_version_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("future.sqlite");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch("PRAGMA user_version = 999;").unwrap();
        drop(conn);

        let err = SqliteTableFile::new(&path).load().unwrap_err();
        match err {
            StoreError::UnsupportedFormatVersion {
                file_version,
                latest_supported,
            } => {
                assert_eq!(file_version, 999);
                assert_eq!(latest_supported, latest_format_version());
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
