//! Windowed statistics over recorded expenses.

use std::collections::HashMap;

use chrono::{Datelike, Days, Months, NaiveDate};

use crate::categories::{CATEGORIES, category_is_known};
use crate::expense::{self, ExpenseKind};
use crate::{Amount, Ledger, LedgerError, LedgerResult, UserId};

/// Inclusive date window a report covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Monday through Sunday of the week containing `date`.
    #[must_use]
    pub fn week_of(date: NaiveDate) -> Self {
        let monday = date - Days::new(u64::from(date.weekday().num_days_from_monday()));
        Self {
            start: monday,
            end: monday + Days::new(6),
        }
    }

    /// First through last day of the month containing `date`.
    #[must_use]
    pub fn month_of(date: NaiveDate) -> Self {
        let start = date.with_day(1).unwrap_or(date);
        let end = start
            .checked_add_months(Months::new(1))
            .and_then(|next| next.checked_sub_days(Days::new(1)))
            .unwrap_or(date);
        Self { start, end }
    }

    /// Returns `true` if `date` falls inside the window, bounds included.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Which sheets a report covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatsScope {
    /// Personal rows of the user's own sheet.
    Personal,
    /// The family sheet; requires a membership.
    Family,
    /// Personal plus family, family silently skipped without a membership.
    Both,
}

/// Per-category sums over one window.
///
/// Categories appear in [`CATEGORIES`] order; labels outside the fixed set
/// (legacy data) follow in first-seen order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CategoryTotals {
    pub by_category: Vec<(String, Amount)>,
    pub total: Amount,
}

impl CategoryTotals {
    /// Returns `true` when nothing fell inside the window.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_category.is_empty()
    }
}

impl Ledger {
    /// Sums expenses per category over the window.
    ///
    /// A row whose date or amount cell fails to parse aborts the whole call;
    /// partial totals are never returned.
    pub async fn aggregate(
        &self,
        user: UserId,
        scope: StatsScope,
        range: DateRange,
    ) -> LedgerResult<CategoryTotals> {
        let mut sums: HashMap<String, Amount> = HashMap::new();
        let mut unknown: Vec<String> = Vec::new();

        match scope {
            StatsScope::Personal => {
                let sheet = self.personal_sheet(user).await?;
                self.tally(&sheet, true, range, &mut sums, &mut unknown)
                    .await?;
            }
            StatsScope::Family => {
                let family = self.family_of(user).await?.ok_or(LedgerError::NoFamily)?;
                let sheet = self.family_sheet(&family).await?;
                self.tally(&sheet, false, range, &mut sums, &mut unknown)
                    .await?;
            }
            StatsScope::Both => {
                let sheet = self.personal_sheet(user).await?;
                self.tally(&sheet, true, range, &mut sums, &mut unknown)
                    .await?;
                if let Some(family) = self.family_of(user).await? {
                    let sheet = self.family_sheet(&family).await?;
                    self.tally(&sheet, false, range, &mut sums, &mut unknown)
                        .await?;
                }
            }
        }

        let mut totals = CategoryTotals::default();
        for label in CATEGORIES {
            if let Some(sum) = sums.remove(label) {
                totals.total += sum;
                totals.by_category.push((label.to_string(), sum));
            }
        }
        for label in unknown {
            if let Some(sum) = sums.remove(&label) {
                totals.total += sum;
                totals.by_category.push((label, sum));
            }
        }
        Ok(totals)
    }

    /// Adds one sheet's in-window rows to `sums`.
    ///
    /// `personal_only` additionally filters on `Тип == Личная`, mirroring how
    /// personal reports ignore rows of other kinds.
    async fn tally(
        &self,
        sheet: &str,
        personal_only: bool,
        range: DateRange,
        sums: &mut HashMap<String, Amount>,
        unknown: &mut Vec<String>,
    ) -> LedgerResult<()> {
        for row in self.store.rows(sheet).await? {
            let cell = |index: usize| row.get(index).map(String::as_str).unwrap_or("").trim();

            if personal_only && ExpenseKind::from_cell(cell(5)) != Some(ExpenseKind::Personal) {
                continue;
            }
            let recorded_at = expense::parse_date(sheet, cell(1))?;
            if !range.contains(recorded_at.date()) {
                continue;
            }
            let amount = expense::parse_amount(sheet, cell(3))?;

            let label = cell(2).to_string();
            if !sums.contains_key(&label) && !category_is_known(&label) {
                unknown.push(label.clone());
            }
            *sums.entry(label).or_insert(Amount::ZERO) += amount;
        }
        Ok(())
    }
}
