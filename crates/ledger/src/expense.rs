//! Expense records and their sheet row encoding.
//!
//! Personal sheets carry `ID, Дата, Категория, Сумма, Теги, Тип, Комментарий`;
//! family sheets add a `user_id` column before the comment. Rows written
//! before ids existed keep a blank `ID` cell after the column migration and
//! are skipped by every id-keyed operation.

use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::{Amount, LedgerError, UserId};

/// `Дата` cell format, second precision.
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Whether an expense belongs to the user or to their family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExpenseKind {
    Personal,
    Family,
}

impl ExpenseKind {
    /// The value stored in the `Тип` column.
    #[must_use]
    pub const fn as_cell(self) -> &'static str {
        match self {
            ExpenseKind::Personal => "Личная",
            ExpenseKind::Family => "Семейная",
        }
    }

    pub(crate) fn from_cell(cell: &str) -> Option<Self> {
        match cell.trim() {
            "Личная" => Some(ExpenseKind::Personal),
            "Семейная" => Some(ExpenseKind::Family),
            _ => None,
        }
    }
}

/// Editable expense fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExpenseField {
    Category,
    Amount,
    Comment,
}

impl ExpenseField {
    /// 1-based personal-sheet column holding the field.
    pub(crate) const fn personal_column(self) -> usize {
        match self {
            ExpenseField::Category => 3,
            ExpenseField::Amount => 4,
            ExpenseField::Comment => 7,
        }
    }
}

/// One recorded expense.
#[derive(Clone, Debug, PartialEq)]
pub struct Expense {
    pub id: Uuid,
    /// Wall-clock time in the deployment timezone, second precision.
    pub recorded_at: NaiveDateTime,
    pub category: String,
    pub amount: Amount,
    /// Reserved column, currently always empty.
    pub tags: String,
    pub kind: ExpenseKind,
    /// Set on family rows; personal rows imply the sheet owner.
    pub owner: Option<UserId>,
    pub comment: String,
}

pub(crate) fn personal_header() -> Vec<String> {
    Vec::from(["ID", "Дата", "Категория", "Сумма", "Теги", "Тип", "Комментарий"].map(str::to_string))
}

pub(crate) fn family_header() -> Vec<String> {
    Vec::from(
        [
            "ID",
            "Дата",
            "Категория",
            "Сумма",
            "Теги",
            "Тип",
            "user_id",
            "Комментарий",
        ]
        .map(str::to_string),
    )
}

impl Expense {
    pub(crate) fn to_personal_row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.recorded_at.format(DATE_FORMAT).to_string(),
            self.category.clone(),
            self.amount.to_string(),
            self.tags.clone(),
            self.kind.as_cell().to_string(),
            self.comment.clone(),
        ]
    }

    pub(crate) fn to_family_row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.recorded_at.format(DATE_FORMAT).to_string(),
            self.category.clone(),
            self.amount.to_string(),
            self.tags.clone(),
            self.kind.as_cell().to_string(),
            self.owner.map(|u| u.to_string()).unwrap_or_default(),
            self.comment.clone(),
        ]
    }

    /// Decodes a personal-sheet row.
    ///
    /// Returns `Ok(None)` for rows without an id; fails on unparseable date,
    /// amount or kind cells.
    pub(crate) fn from_personal_row(
        sheet: &str,
        row: &[String],
    ) -> Result<Option<Self>, LedgerError> {
        let Some(id) = row_id(row) else {
            return Ok(None);
        };
        Ok(Some(Expense {
            id,
            recorded_at: parse_date(sheet, cell(row, 1))?,
            category: cell(row, 2).to_string(),
            amount: parse_amount(sheet, cell(row, 3))?,
            tags: cell(row, 4).to_string(),
            kind: parse_kind(sheet, cell(row, 5))?,
            owner: None,
            comment: cell(row, 6).to_string(),
        }))
    }

    /// Decodes a family-sheet row; same contract as [`Self::from_personal_row`].
    pub(crate) fn from_family_row(
        sheet: &str,
        row: &[String],
    ) -> Result<Option<Self>, LedgerError> {
        let Some(id) = row_id(row) else {
            return Ok(None);
        };
        let owner = cell(row, 6);
        let owner = if owner.is_empty() {
            None
        } else {
            Some(UserId(owner.parse().map_err(|_| LedgerError::MalformedRow {
                sheet: sheet.to_string(),
                detail: format!("bad user_id cell: {owner:?}"),
            })?))
        };
        Ok(Some(Expense {
            id,
            recorded_at: parse_date(sheet, cell(row, 1))?,
            category: cell(row, 2).to_string(),
            amount: parse_amount(sheet, cell(row, 3))?,
            tags: cell(row, 4).to_string(),
            kind: parse_kind(sheet, cell(row, 5))?,
            owner,
            comment: cell(row, 7).to_string(),
        }))
    }
}

fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or("").trim()
}

fn row_id(row: &[String]) -> Option<Uuid> {
    Uuid::parse_str(cell(row, 0)).ok()
}

pub(crate) fn parse_date(sheet: &str, cell: &str) -> Result<NaiveDateTime, LedgerError> {
    NaiveDateTime::parse_from_str(cell, DATE_FORMAT).map_err(|_| LedgerError::MalformedRow {
        sheet: sheet.to_string(),
        detail: format!("bad date cell: {cell:?}"),
    })
}

pub(crate) fn parse_amount(sheet: &str, cell: &str) -> Result<Amount, LedgerError> {
    cell.parse().map_err(|_| LedgerError::MalformedRow {
        sheet: sheet.to_string(),
        detail: format!("bad amount cell: {cell:?}"),
    })
}

fn parse_kind(sheet: &str, cell: &str) -> Result<ExpenseKind, LedgerError> {
    ExpenseKind::from_cell(cell).ok_or_else(|| LedgerError::MalformedRow {
        sheet: sheet.to_string(),
        detail: format!("bad kind cell: {cell:?}"),
    })
}
