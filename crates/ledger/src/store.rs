//! The tabular store seam.
//!
//! The ledger never talks to a backend directly; everything goes through
//! [`SheetStore`]. [`MemorySheets`] backs tests and local runs, the Google
//! Sheets client lives in [`crate::gsheets`].

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors from the tabular store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("sheet \"{0}\" not found")]
    SheetNotFound(String),
    #[error("sheet \"{0}\" already exists")]
    SheetExists(String),
    #[error("row {row} not found in sheet \"{sheet}\"")]
    RowNotFound { sheet: String, row: usize },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A spreadsheet-like store holding named sheets of string cells.
///
/// Row indices are 1-based and count **data** rows; the header row written by
/// [`add_sheet`] is only reachable through [`header`] and
/// [`insert_leading_column`].
///
/// [`add_sheet`]: SheetStore::add_sheet
/// [`header`]: SheetStore::header
/// [`insert_leading_column`]: SheetStore::insert_leading_column
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Titles of every sheet in the document.
    async fn sheet_titles(&self) -> StoreResult<Vec<String>>;

    /// Creates an empty sheet with the given header row.
    async fn add_sheet(&self, title: &str, header: &[String]) -> StoreResult<()>;

    /// The header row of a sheet.
    async fn header(&self, title: &str) -> StoreResult<Vec<String>>;

    /// Appends one data row after the last one.
    async fn append_row(&self, title: &str, row: &[String]) -> StoreResult<()>;

    /// Every data row of a sheet, header excluded.
    async fn rows(&self, title: &str) -> StoreResult<Vec<Vec<String>>>;

    /// Overwrites a single cell; `column` is 1-based.
    async fn update_cell(
        &self,
        title: &str,
        row: usize,
        column: usize,
        value: &str,
    ) -> StoreResult<()>;

    /// Deletes one data row.
    async fn delete_row(&self, title: &str, row: usize) -> StoreResult<()>;

    /// Inserts a blank first column and sets its header cell.
    async fn insert_leading_column(&self, title: &str, header_cell: &str) -> StoreResult<()>;
}

#[derive(Default)]
struct Sheet {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// In-memory [`SheetStore`].
///
/// Used by the integration tests and the `memory` store setting; state is
/// lost on restart.
#[derive(Default)]
pub struct MemorySheets {
    sheets: Mutex<BTreeMap<String, Sheet>>,
}

impl MemorySheets {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SheetStore for MemorySheets {
    async fn sheet_titles(&self) -> StoreResult<Vec<String>> {
        let sheets = self.sheets.lock().await;
        Ok(sheets.keys().cloned().collect())
    }

    async fn add_sheet(&self, title: &str, header: &[String]) -> StoreResult<()> {
        let mut sheets = self.sheets.lock().await;
        if sheets.contains_key(title) {
            return Err(StoreError::SheetExists(title.to_string()));
        }
        sheets.insert(
            title.to_string(),
            Sheet {
                header: header.to_vec(),
                rows: Vec::new(),
            },
        );
        Ok(())
    }

    async fn header(&self, title: &str) -> StoreResult<Vec<String>> {
        let sheets = self.sheets.lock().await;
        let sheet = lookup(&sheets, title)?;
        Ok(sheet.header.clone())
    }

    async fn append_row(&self, title: &str, row: &[String]) -> StoreResult<()> {
        let mut sheets = self.sheets.lock().await;
        let sheet = lookup_mut(&mut sheets, title)?;
        sheet.rows.push(row.to_vec());
        Ok(())
    }

    async fn rows(&self, title: &str) -> StoreResult<Vec<Vec<String>>> {
        let sheets = self.sheets.lock().await;
        let sheet = lookup(&sheets, title)?;
        Ok(sheet.rows.clone())
    }

    async fn update_cell(
        &self,
        title: &str,
        row: usize,
        column: usize,
        value: &str,
    ) -> StoreResult<()> {
        let mut sheets = self.sheets.lock().await;
        let sheet = lookup_mut(&mut sheets, title)?;
        let cells = sheet
            .rows
            .get_mut(row.wrapping_sub(1))
            .ok_or_else(|| StoreError::RowNotFound {
                sheet: title.to_string(),
                row,
            })?;
        if cells.len() < column {
            cells.resize(column, String::new());
        }
        cells[column - 1] = value.to_string();
        Ok(())
    }

    async fn delete_row(&self, title: &str, row: usize) -> StoreResult<()> {
        let mut sheets = self.sheets.lock().await;
        let sheet = lookup_mut(&mut sheets, title)?;
        if row == 0 || row > sheet.rows.len() {
            return Err(StoreError::RowNotFound {
                sheet: title.to_string(),
                row,
            });
        }
        sheet.rows.remove(row - 1);
        Ok(())
    }

    async fn insert_leading_column(&self, title: &str, header_cell: &str) -> StoreResult<()> {
        let mut sheets = self.sheets.lock().await;
        let sheet = lookup_mut(&mut sheets, title)?;
        sheet.header.insert(0, header_cell.to_string());
        for row in &mut sheet.rows {
            row.insert(0, String::new());
        }
        Ok(())
    }
}

fn lookup<'a>(sheets: &'a BTreeMap<String, Sheet>, title: &str) -> StoreResult<&'a Sheet> {
    sheets
        .get(title)
        .ok_or_else(|| StoreError::SheetNotFound(title.to_string()))
}

fn lookup_mut<'a>(
    sheets: &'a mut BTreeMap<String, Sheet>,
    title: &str,
) -> StoreResult<&'a mut Sheet> {
    sheets
        .get_mut(title)
        .ok_or_else(|| StoreError::SheetNotFound(title.to_string()))
}
