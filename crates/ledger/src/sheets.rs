//! Sheet provisioning and the `ID` column migration.

use crate::expense::personal_header;
use crate::{FamilyId, Ledger, LedgerError, LedgerResult, UserId};

pub(crate) const FAMILIES_SHEET: &str = "families_list";

pub(crate) fn families_header() -> Vec<String> {
    Vec::from(["family_id", "user_id", "role"].map(str::to_string))
}

impl Ledger {
    /// Makes sure the user's personal sheet exists.
    pub async fn ensure_user(&self, user: UserId) -> LedgerResult<()> {
        self.personal_sheet(user).await?;
        Ok(())
    }

    /// Users that own a personal sheet.
    pub async fn known_users(&self) -> LedgerResult<Vec<UserId>> {
        let titles = self.store.sheet_titles().await?;
        Ok(titles
            .iter()
            .filter_map(|title| title.parse().ok().map(UserId))
            .collect())
    }

    /// Title of the user's personal sheet, created on first use.
    pub(crate) async fn personal_sheet(&self, user: UserId) -> LedgerResult<String> {
        let title = user.to_string();
        if self.sheet_exists(&title).await? {
            self.migrate_id_column(&title).await?;
        } else {
            self.store.add_sheet(&title, &personal_header()).await?;
            tracing::info!(user = %user, "personal sheet created");
        }
        Ok(title)
    }

    /// Title of the family's sheet; never creates one.
    pub(crate) async fn family_sheet(&self, family_id: &FamilyId) -> LedgerResult<String> {
        let title = family_id.to_string();
        if !self.sheet_exists(&title).await? {
            return Err(LedgerError::NotFound(title));
        }
        self.migrate_id_column(&title).await?;
        Ok(title)
    }

    /// Title of the membership sheet, created on first use.
    pub(crate) async fn families_sheet(&self) -> LedgerResult<&'static str> {
        if !self.sheet_exists(FAMILIES_SHEET).await? {
            self.store
                .add_sheet(FAMILIES_SHEET, &families_header())
                .await?;
        }
        Ok(FAMILIES_SHEET)
    }

    async fn sheet_exists(&self, title: &str) -> LedgerResult<bool> {
        let titles = self.store.sheet_titles().await?;
        Ok(titles.iter().any(|t| t == title))
    }

    /// Expense sheets created before ids existed get a leading `ID` column,
    /// leaving old rows with blank id cells.
    async fn migrate_id_column(&self, title: &str) -> LedgerResult<()> {
        let header = self.store.header(title).await?;
        if header.first().map(String::as_str) == Some("ID") {
            return Ok(());
        }
        tracing::info!(sheet = title, "inserting ID column");
        self.store.insert_leading_column(title, "ID").await?;
        Ok(())
    }
}
