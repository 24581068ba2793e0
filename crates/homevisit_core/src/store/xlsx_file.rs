//! Excel-workbook-backed table file.
//!
//! # Responsibility
//! - Read the first worksheet of an `.xlsx` workbook into a `Table`.
//! - Replace the workbook atomically via temp file + rename in the same directory.
//!
//! # Invariants
//! - Row 1 of the used range is the header; the range is rectangular, so every
//!   row is loaded at header width.
//! - Every non-empty cell is written as a text cell; empty cells are left blank.
//! - Numeric and date cells written by spreadsheet tools load as text
//!   (`117`, `2022-01-01 00:00:00`).

use super::{replace_file_atomically, StoreError, StoreResult, Table, TableStore};
use calamine::{open_workbook, Data, Reader, Xlsx};
use log::{debug, error};
use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};
use std::time::Instant;

const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Table persisted as the first worksheet of one `.xlsx` workbook.
#[derive(Debug, Clone)]
pub struct XlsxTableFile {
    path: PathBuf,
}

impl XlsxTableFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TableStore for XlsxTableFile {
    fn load(&self) -> StoreResult<Table> {
        let started_at = Instant::now();
        if !self.path.exists() {
            debug!("event=table_load module=store status=missing format=xlsx");
            return Err(StoreError::NotFound(self.path.clone()));
        }

        let table = read_first_sheet(&self.path)?;
        debug!(
            "event=table_load module=store status=ok format=xlsx rows={} duration_ms={}",
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
                    "event=table_save module=store status=ok format=xlsx rows={} duration_ms={}",
                    table.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=table_save module=store status=error format=xlsx duration_ms={} error={}",
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

fn read_first_sheet(path: &Path) -> StoreResult<Table> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range?,
        None => return Ok(Table::default()),
    };
    // the used range may start right of column A
    let leading_blank = range.start().map_or(0, |(_, column)| column as usize);

    let mut rows = range.rows().map(|cells| {
        let mut row = vec![String::new(); leading_blank];
        row.extend(cells.iter().map(cell_text));
        row
    });
    let Some(columns) = rows.next() else {
        return Ok(Table::default());
    };
    let mut table = Table {
        columns,
        rows: rows.collect(),
    };
    table.normalize_row_widths();
    Ok(table)
}

fn cell_text(value: &Data) -> String {
    match value {
        Data::Empty => String::new(),
        Data::String(text) | Data::DateTimeIso(text) | Data::DurationIso(text) => text.clone(),
        Data::Int(number) => number.to_string(),
        Data::Float(number) => number.to_string(),
        Data::Bool(flag) => flag.to_string(),
        Data::DateTime(value) => value
            .as_datetime()
            .map(|stamp| stamp.format(DATE_TIME_FORMAT).to_string())
            .unwrap_or_else(|| value.as_f64().to_string()),
        Data::Error(err) => err.to_string(),
    }
}

fn write_atomically(path: &Path, table: &Table) -> StoreResult<()> {
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        for (column, name) in table.written_header().iter().enumerate() {
            if !name.is_empty() {
                sheet.write_string(0, column_number(column)?, name.as_str())?;
            }
        }
        for (index, row) in table.rows.iter().enumerate() {
            let row_number = u32::try_from(index + 1)
                .map_err(|_| StoreError::InvalidData("too many rows for a worksheet".to_string()))?;
            for (column, value) in row.iter().enumerate() {
                if !value.is_empty() {
                    sheet.write_string(row_number, column_number(column)?, value.as_str())?;
                }
            }
        }
    }
    replace_file_atomically(path, |file| {
        workbook.save_to_writer(file)?;
        Ok(())
    })
}

fn column_number(index: usize) -> StoreResult<u16> {
    u16::try_from(index)
        .map_err(|_| StoreError::InvalidData("too many columns for a worksheet".to_string()))
}

#[cfg(test)]
mod tests {
    use super::XlsxTableFile;
    use crate::store::{StoreError, Table, TableStore};
    use rust_xlsxwriter::Workbook;

    #[test]
    fn load_missing_workbook_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = XlsxTableFile::new(dir.path().join("nurse_log.xlsx"));
        assert!(matches!(store.load(), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn save_then_load_keeps_rows_blank_cells_and_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = XlsxTableFile::new(dir.path().join("notes.xlsx"));
        let mut table = Table::with_columns(["Mother_ID", "Child_First_Name", "Notes"]);
        table.push_named(&[("Mother_ID", "9"), ("Notes", "Allergic to latex, see chart")]);
        table.push_named(&[("Mother_ID", "7"), ("Child_First_Name", "Ana")]);

        store.save(&table).unwrap();
        assert_eq!(store.load().unwrap(), table);
    }

    #[test]
    fn numeric_cells_from_spreadsheet_tools_load_as_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("children.xlsx");
        let mut workbook = Workbook::new();
        {
            let sheet = workbook.add_worksheet();
            sheet.write_string(0, 0, "Mother_ID").unwrap();
            sheet.write_string(0, 1, "ZIP").unwrap();
            sheet.write_number(1, 0, 117.0).unwrap();
            sheet.write_string(1, 1, "03820").unwrap();
        }
        workbook.save(&path).unwrap();

        let table = XlsxTableFile::new(&path).load().unwrap();
        assert_eq!(table.columns, vec!["Mother_ID", "ZIP"]);
        assert_eq!(table.rows, vec![vec!["117", "03820"]]);
    }
}
