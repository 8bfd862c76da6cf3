//! Expense ledger over a spreadsheet-like store.
//!
//! Every user gets a personal sheet titled with their numeric id; families
//! share one sheet titled with the family id plus a row in the
//! `families_list` membership sheet. The [`Ledger`] facade owns the store
//! handle and the deployment timezone and exposes the record, family and
//! statistics operations on top.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, Timelike, Utc};
use chrono_tz::Tz;

pub use amount::Amount;
pub use categories::{CATEGORIES, category_is_known};
pub use error::LedgerError;
pub use expense::{Expense, ExpenseField, ExpenseKind};
pub use families::{FamilyId, MembershipRole};
pub use gsheets::GoogleSheets;
pub use records::ExpenseDraft;
pub use stats::{CategoryTotals, DateRange, StatsScope};
pub use store::{MemorySheets, SheetStore, StoreError};

mod amount;
mod categories;
mod error;
mod expense;
mod families;
mod gsheets;
mod records;
mod sheets;
mod stats;
mod store;

type LedgerResult<T> = Result<T, LedgerError>;

/// Telegram numeric user id; doubles as the title of the personal sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(UserId)
    }
}

/// The ledger facade over one spreadsheet document.
///
/// Cheap to clone; operations live in the topic modules (records, families,
/// stats, sheets) as separate `impl Ledger` blocks.
#[derive(Clone)]
pub struct Ledger {
    store: Arc<dyn SheetStore>,
    tz: Tz,
}

impl Ledger {
    pub fn new(store: Arc<dyn SheetStore>, tz: Tz) -> Self {
        Self { store, tz }
    }

    /// Deployment timezone used for timestamps, windows and reminders.
    #[must_use]
    pub const fn timezone(&self) -> Tz {
        self.tz
    }

    /// Today's date in the deployment timezone.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.now_local().date()
    }

    /// Current wall-clock time in the deployment timezone, second precision.
    pub(crate) fn now_local(&self) -> NaiveDateTime {
        let now = Utc::now().with_timezone(&self.tz).naive_local();
        now.with_nanosecond(0).unwrap_or(now)
    }
}
