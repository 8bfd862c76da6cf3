//! Recording, listing, deleting and editing expenses.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::categories::category_is_known;
use crate::expense::DATE_FORMAT;
use crate::{Amount, Expense, ExpenseField, ExpenseKind, Ledger, LedgerError, LedgerResult, UserId};

/// A fully collected expense waiting to be persisted.
#[derive(Clone, Debug)]
pub struct ExpenseDraft {
    pub kind: ExpenseKind,
    pub category: String,
    pub amount: Amount,
    pub comment: String,
}

impl Ledger {
    /// Persists a collected expense and returns the stored record.
    ///
    /// Family drafts need a membership; without one the call fails with
    /// [`LedgerError::NoFamily`] and nothing is written.
    pub async fn append_expense(&self, user: UserId, draft: ExpenseDraft) -> LedgerResult<Expense> {
        let expense = Expense {
            id: Uuid::new_v4(),
            recorded_at: self.now_local(),
            category: draft.category,
            amount: draft.amount,
            tags: String::new(),
            kind: draft.kind,
            owner: match draft.kind {
                ExpenseKind::Personal => None,
                ExpenseKind::Family => Some(user),
            },
            comment: draft.comment,
        };

        match expense.kind {
            ExpenseKind::Personal => {
                let sheet = self.personal_sheet(user).await?;
                self.store
                    .append_row(&sheet, &expense.to_personal_row())
                    .await?;
            }
            ExpenseKind::Family => {
                let family = self.family_of(user).await?.ok_or(LedgerError::NoFamily)?;
                let sheet = self.family_sheet(&family).await?;
                self.store
                    .append_row(&sheet, &expense.to_family_row())
                    .await?;
            }
        }
        tracing::info!(user = %user, id = %expense.id, kind = expense.kind.as_cell(), "expense recorded");
        Ok(expense)
    }

    /// Deletes an expense by id and reports which sheet held it.
    ///
    /// The personal sheet is probed first, then the family sheet.
    pub async fn delete_expense(&self, user: UserId, id: Uuid) -> LedgerResult<ExpenseKind> {
        let personal = self.personal_sheet(user).await?;
        if let Some(row) = self.find_row(&personal, id).await? {
            self.store.delete_row(&personal, row).await?;
            return Ok(ExpenseKind::Personal);
        }

        if let Some(family) = self.family_of(user).await? {
            let sheet = self.family_sheet(&family).await?;
            if let Some(row) = self.find_row(&sheet, id).await? {
                self.store.delete_row(&sheet, row).await?;
                return Ok(ExpenseKind::Family);
            }
        }
        Err(LedgerError::NotFound(id.to_string()))
    }

    /// Rewrites one field of a personal expense.
    ///
    /// The row is located by its id, so the operation is stable against rows
    /// shifting underneath. Family rows are not editable.
    pub async fn update_field(
        &self,
        user: UserId,
        id: Uuid,
        field: ExpenseField,
        value: &str,
    ) -> LedgerResult<()> {
        let value = match field {
            ExpenseField::Category => {
                let label = value.trim();
                if !category_is_known(label) {
                    return Err(LedgerError::InvalidInput(format!(
                        "unknown category: {label}"
                    )));
                }
                label.to_string()
            }
            ExpenseField::Amount => value.parse::<Amount>()?.to_string(),
            ExpenseField::Comment => value.trim().to_string(),
        };

        let sheet = self.personal_sheet(user).await?;
        let row = self
            .find_row(&sheet, id)
            .await?
            .ok_or_else(|| LedgerError::NotFound(id.to_string()))?;
        self.store
            .update_cell(&sheet, row, field.personal_column(), &value)
            .await?;
        tracing::info!(user = %user, id = %id, ?field, "expense updated");
        Ok(())
    }

    /// The newest expenses visible to the user, personal and family merged.
    pub async fn list_recent(&self, user: UserId, limit: usize) -> LedgerResult<Vec<Expense>> {
        let personal = self.personal_sheet(user).await?;
        let mut expenses = Vec::new();
        for row in self.store.rows(&personal).await? {
            if let Some(expense) = Expense::from_personal_row(&personal, &row)? {
                expenses.push(expense);
            }
        }

        if let Some(family) = self.family_of(user).await? {
            let sheet = self.family_sheet(&family).await?;
            for row in self.store.rows(&sheet).await? {
                if let Some(expense) = Expense::from_family_row(&sheet, &row)? {
                    expenses.push(expense);
                }
            }
        }

        expenses.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        let mut seen = HashSet::new();
        expenses.retain(|e| seen.insert(e.id));
        expenses.truncate(limit);
        Ok(expenses)
    }

    /// Returns `true` if the user recorded anything on `date`.
    ///
    /// Used by the daily reminder; unparseable dates count as no expense.
    pub async fn has_expense_on(&self, user: UserId, date: NaiveDate) -> LedgerResult<bool> {
        let sheet = self.personal_sheet(user).await?;
        let rows = self.store.rows(&sheet).await?;
        Ok(rows.iter().any(|row| {
            row.get(1)
                .and_then(|cell| NaiveDateTime::parse_from_str(cell.trim(), DATE_FORMAT).ok())
                .is_some_and(|dt| dt.date() == date)
        }))
    }

    /// 1-based data row whose `ID` cell matches, if any.
    async fn find_row(&self, sheet: &str, id: Uuid) -> LedgerResult<Option<usize>> {
        let id = id.to_string();
        let rows = self.store.rows(sheet).await?;
        Ok(rows
            .iter()
            .position(|row| row.first().map(String::as_str) == Some(id.as_str()))
            .map(|index| index + 1))
    }
}
