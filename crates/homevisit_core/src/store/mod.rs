//! Tabular file storage: whole-table load and atomic whole-table replace.
//!
//! # Responsibility
//! - Read one persisted tabular file into an ordered in-memory `Table`.
//! - Replace the whole file with a new row set in one atomic step.
//! - Provide the single-writer lock that guards load-modify-save cycles.
//!
//! # Invariants
//! - `load` on an absent file returns `StoreError::NotFound`, never an empty table.
//! - Every row of a loaded `Table` has exactly `columns.len()` cells. Cells
//!   past the header are kept under empty-named columns, never dropped.
//! - `save(load())` preserves columns, row order and row count.
//!
//! # See also
//! - docs/architecture/storage.md

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

mod csv_file;
mod lock;
mod sqlite_file;
mod xlsx_file;

pub use csv_file::CsvTableFile;
pub use lock::WriterLock;
pub use sqlite_file::{latest_format_version, SqliteTableFile};
pub use xlsx_file::XlsxTableFile;

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage-level error for tabular files.
#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Csv(csv::Error),
    Sqlite(rusqlite::Error),
    XlsxRead(calamine::XlsxError),
    XlsxWrite(rust_xlsxwriter::XlsxError),
    /// Backing file does not exist.
    NotFound(PathBuf),
    /// Another writer holds the lock file.
    Locked(PathBuf),
    UnsupportedFormatVersion {
        file_version: u32,
        latest_supported: u32,
    },
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Csv(err) => write!(f, "{err}"),
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::XlsxRead(err) => write!(f, "{err}"),
            Self::XlsxWrite(err) => write!(f, "{err}"),
            Self::NotFound(path) => write!(f, "table file not found: {}", path.display()),
            Self::Locked(path) => write!(
                f,
                "table is locked by another writer (remove `{}` if no other instance is running)",
                path.display()
            ),
            Self::UnsupportedFormatVersion {
                file_version,
                latest_supported,
            } => write!(
                f,
                "table file format version {file_version} is newer than supported {latest_supported}"
            ),
            Self::InvalidData(message) => write!(f, "invalid table data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Csv(err) => Some(err),
            Self::Sqlite(err) => Some(err),
            Self::XlsxRead(err) => Some(err),
            Self::XlsxWrite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<csv::Error> for StoreError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<calamine::XlsxError> for StoreError {
    fn from(value: calamine::XlsxError) -> Self {
        Self::XlsxRead(value)
    }
}

impl From<rust_xlsxwriter::XlsxError> for StoreError {
    fn from(value: rust_xlsxwriter::XlsxError) -> Self {
        Self::XlsxWrite(value)
    }
}

/// Ordered in-memory copy of one tabular file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Creates an empty table with the given header.
    pub fn with_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Returns the position of `name` in the header.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Returns the position of `name`, failing when the column is absent.
    pub fn require_column(&self, name: &str) -> StoreResult<usize> {
        self.column_index(name)
            .ok_or_else(|| StoreError::InvalidData(format!("missing required column `{name}`")))
    }

    /// Appends `name` to the header (padding every row) unless it exists.
    ///
    /// Returns the column position either way.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(index) = self.column_index(name) {
            return index;
        }
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(String::new());
        }
        self.columns.len() - 1
    }

    /// Returns one cell, or `""` for a column the table does not carry.
    pub fn cell<'a>(&self, row: &'a [String], column: &str) -> &'a str {
        self.column_index(column)
            .and_then(|index| row.get(index))
            .map_or("", String::as_str)
    }

    /// Appends a row given as `(column, value)` pairs.
    ///
    /// Columns missing from the header are added; unnamed columns stay empty.
    pub fn push_named(&mut self, values: &[(&str, &str)]) {
        for (column, _) in values {
            self.ensure_column(column);
        }
        let mut row = vec![String::new(); self.columns.len()];
        for (column, value) in values {
            if let Some(index) = self.column_index(column) {
                row[index] = (*value).to_string();
            }
        }
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Header cells to write back: trailing empty names added by
    /// `normalize_row_widths` are left out.
    pub(crate) fn written_header(&self) -> &[String] {
        let named = self
            .columns
            .iter()
            .rposition(|column| !column.is_empty())
            .map_or(0, |index| index + 1);
        if named == 0 {
            &self.columns
        } else {
            &self.columns[..named]
        }
    }

    /// Pads short rows and widens the header with empty names for long rows.
    pub(crate) fn normalize_row_widths(&mut self) {
        let width = self
            .rows
            .iter()
            .map(Vec::len)
            .fold(self.columns.len(), usize::max);
        self.columns.resize(width, String::new());
        for row in &mut self.rows {
            row.resize(width, String::new());
        }
    }
}

/// Whole-file persistence contract for one table.
pub trait TableStore {
    /// Reads the full table. Fails with `StoreError::NotFound` when absent.
    fn load(&self) -> StoreResult<Table>;
    /// Atomically replaces the file with `table`.
    fn save(&self, table: &Table) -> StoreResult<()>;
    /// Backing file path.
    fn path(&self) -> &Path;

    /// Acquires the single-writer lock for this table's file.
    fn lock(&self) -> StoreResult<WriterLock> {
        WriterLock::acquire(self.path())
    }

    /// Reads the full table, treating an absent file as an empty table with
    /// `columns` as header.
    fn load_or_empty(&self, columns: &[&str]) -> StoreResult<Table> {
        match self.load() {
            Ok(table) => Ok(table),
            Err(StoreError::NotFound(_)) => Ok(Table::with_columns(columns.iter().copied())),
            Err(err) => Err(err),
        }
    }
}

impl<T: TableStore + ?Sized> TableStore for Box<T> {
    fn load(&self) -> StoreResult<Table> {
        (**self).load()
    }

    fn save(&self, table: &Table) -> StoreResult<()> {
        (**self).save(table)
    }

    fn path(&self) -> &Path {
        (**self).path()
    }

    fn lock(&self) -> StoreResult<WriterLock> {
        (**self).lock()
    }
}

/// Writes a sibling temp file through `write`, syncs it and renames it over
/// `path`. The previous file stays intact when any step fails.
pub(crate) fn replace_file_atomically<F>(path: &Path, write: F) -> StoreResult<()>
where
    F: FnOnce(&mut File) -> StoreResult<()>,
{
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent)?;

    let mut staged = NamedTempFile::new_in(&parent)?;
    write(staged.as_file_mut())?;
    staged.as_file().sync_all()?;
    staged
        .persist(path)
        .map_err(|err| StoreError::Io(err.error))?;
    Ok(())
}

/// Opens a table file, picking the backend from the file extension.
///
/// `.xlsx` opens as an Excel workbook; `.sqlite`, `.sqlite3` and `.db` as
/// SQLite; anything else as CSV.
pub fn open_table(path: impl AsRef<Path>) -> Box<dyn TableStore> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("xlsx") => Box::new(XlsxTableFile::new(path)),
        Some("sqlite" | "sqlite3" | "db") => Box::new(SqliteTableFile::new(path)),
        _ => Box::new(CsvTableFile::new(path)),
    }
}
