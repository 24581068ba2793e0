//! CSV-backed table file.
//!
//! # Responsibility
//! - Read a header-first CSV file into a `Table`.
//! - Replace the file atomically via temp file + rename in the same directory.
//!
//! # Invariants
//! - A failed save leaves the previous file content untouched.
//! - Short rows are padded to header width on load; cells past the header
//!   survive a load and save unchanged.

use super::{replace_file_atomically, StoreError, StoreResult, Table, TableStore};
use log::{debug, error};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Table persisted as one CSV file with a header row.
#[derive(Debug, Clone)]
pub struct CsvTableFile {
    path: PathBuf,
}

impl CsvTableFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TableStore for CsvTableFile {
    fn load(&self) -> StoreResult<Table> {
        let started_at = Instant::now();
        if !self.path.exists() {
            debug!("event=table_load module=store status=missing format=csv");
            return Err(StoreError::NotFound(self.path.clone()));
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)?;
        let columns = reader
            .headers()?
            .iter()
            .map(str::to_string)
            .collect::<Vec<_>>();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
        }

        let mut table = Table { columns, rows };
        table.normalize_row_widths();
        debug!(
            "event=table_load module=store status=ok format=csv rows={} duration_ms={}",
            table.len(),
            started_at.elapsed().as_millis()
        );
        Ok(table)
    }

    fn save(&self, table: &Table) -> StoreResult<()> {
        let started_at = Instant::now();
        match write_atomically(&self.path, table) {
            Ok(()) => {
                debug!(
                    "event=table_save module=store status=ok format=csv rows={} duration_ms={}",
                    table.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=table_save module=store status=error format=csv duration_ms={} error={}",
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

fn write_atomically(path: &Path, table: &Table) -> StoreResult<()> {
    replace_file_atomically(path, |file| {
        let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(file);
        let header = table.written_header();
        if !header.is_empty() {
            writer.write_record(header)?;
        }
        for row in &table.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    })
}
