//! Family registry over the `families_list` sheet.
//!
//! Membership is append-only: one row per user, `creator` for the founding
//! user and `member` for everyone who joined. A user belongs to at most one
//! family and there is no leave operation.

use std::fmt;

use rand::{Rng, distributions::Alphanumeric};

use crate::expense::family_header;
use crate::sheets::FAMILIES_SHEET;
use crate::{Ledger, LedgerError, LedgerResult, UserId};

/// Family identifier; also the title of the family's expense sheet.
///
/// Rendered as `family-` followed by a short random alphanumeric token.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FamilyId(String);

impl FamilyId {
    pub const PREFIX: &'static str = "family-";

    /// Interprets free text as a family id if it carries the prefix.
    ///
    /// Whether the family exists is checked at join time, not here.
    #[must_use]
    pub fn from_input(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        trimmed
            .starts_with(Self::PREFIX)
            .then(|| FamilyId(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn random() -> Self {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(6)
            .map(char::from)
            .collect();
        FamilyId(format!("{}{token}", Self::PREFIX))
    }

    fn from_cell(cell: &str) -> Option<Self> {
        let trimmed = cell.trim();
        (!trimmed.is_empty()).then(|| FamilyId(trimmed.to_string()))
    }
}

impl fmt::Display for FamilyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role of a user inside a family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MembershipRole {
    Creator,
    Member,
}

impl MembershipRole {
    /// The value stored in the `role` column.
    #[must_use]
    pub const fn as_cell(self) -> &'static str {
        match self {
            MembershipRole::Creator => "creator",
            MembershipRole::Member => "member",
        }
    }
}

struct Membership {
    family_id: FamilyId,
    user: UserId,
}

impl Ledger {
    /// Creates a family with the calling user as creator.
    ///
    /// Provisions the family's expense sheet and returns the id to share.
    pub async fn create_family(&self, user: UserId) -> LedgerResult<FamilyId> {
        let memberships = self.memberships().await?;
        if memberships.iter().any(|m| m.user == user) {
            return Err(LedgerError::AlreadyMember);
        }

        let family_id = FamilyId::random();
        self.store
            .add_sheet(family_id.as_str(), &family_header())
            .await?;
        self.append_membership(&family_id, user, MembershipRole::Creator)
            .await?;
        tracing::info!(user = %user, family = %family_id, "family created");
        Ok(family_id)
    }

    /// Adds the user to an existing family as a plain member.
    pub async fn join_family(&self, user: UserId, family_id: &FamilyId) -> LedgerResult<()> {
        let memberships = self.memberships().await?;
        if memberships.iter().any(|m| m.user == user) {
            return Err(LedgerError::AlreadyMember);
        }
        if !memberships.iter().any(|m| m.family_id == *family_id) {
            return Err(LedgerError::NotFound(family_id.to_string()));
        }

        self.append_membership(family_id, user, MembershipRole::Member)
            .await?;
        tracing::info!(user = %user, family = %family_id, "user joined family");
        Ok(())
    }

    /// The family the user belongs to, if any.
    pub async fn family_of(&self, user: UserId) -> LedgerResult<Option<FamilyId>> {
        let memberships = self.memberships().await?;
        Ok(memberships
            .into_iter()
            .find(|m| m.user == user)
            .map(|m| m.family_id))
    }

    async fn append_membership(
        &self,
        family_id: &FamilyId,
        user: UserId,
        role: MembershipRole,
    ) -> LedgerResult<()> {
        self.store
            .append_row(
                FAMILIES_SHEET,
                &[
                    family_id.to_string(),
                    user.to_string(),
                    role.as_cell().to_string(),
                ],
            )
            .await?;
        Ok(())
    }

    async fn memberships(&self) -> LedgerResult<Vec<Membership>> {
        let sheet = self.families_sheet().await?;
        let rows = self.store.rows(sheet).await?;
        let mut memberships = Vec::with_capacity(rows.len());
        for row in rows {
            let family_cell = row.first().map(String::as_str).unwrap_or("");
            let user_cell = row.get(1).map(String::as_str).unwrap_or("").trim();
            let family_id =
                FamilyId::from_cell(family_cell).ok_or_else(|| LedgerError::MalformedRow {
                    sheet: sheet.to_string(),
                    detail: "empty family_id cell".to_string(),
                })?;
            let user = user_cell
                .parse()
                .map(UserId)
                .map_err(|_| LedgerError::MalformedRow {
                    sheet: sheet.to_string(),
                    detail: format!("bad user_id cell: {user_cell:?}"),
                })?;
            memberships.push(Membership { family_id, user });
        }
        Ok(memberships)
    }
}
