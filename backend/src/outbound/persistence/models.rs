//! Internal Diesel row structs for the ledger tables.
//!
//! These types never leave the persistence layer; conversions into domain
//! types live here so the repository stays focused on query flow.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::ports::{LedgerRepositoryError, StoredCredentials};
use crate::domain::{
    Account, PasswordDigest, PhoneNumber, Points, Redemption, RedemptionId, RedemptionStatus,
    Reward, RewardId, UserId, UserRole,
};

use super::schema::{redemptions, rewards, users};

/// Convert a stored `BIGINT` into a balance, rejecting negatives.
pub(crate) fn points_from_column(value: i64) -> Result<Points, LedgerRepositoryError> {
    u64::try_from(value)
        .map(Points::new)
        .map_err(|_| LedgerRepositoryError::query("negative points value in storage"))
}

/// Convert a balance into a `BIGINT` column value.
pub(crate) fn points_to_column(points: Points) -> Result<i64, LedgerRepositoryError> {
    i64::try_from(points.value())
        .map_err(|_| LedgerRepositoryError::query("points value exceeds storage range"))
}

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AccountRow {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub role: String,
    pub points: i64,
}

impl TryFrom<AccountRow> for Account {
    type Error = LedgerRepositoryError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let phone = PhoneNumber::new(&row.phone)
            .map_err(|err| LedgerRepositoryError::query(format!("stored phone: {err}")))?;
        let role: UserRole = row
            .role
            .parse()
            .map_err(|err| LedgerRepositoryError::query(format!("stored role: {err}")))?;
        Ok(Account::new(UserId::from_uuid(row.id), row.name, phone)
            .with_role(role)
            .with_points(points_from_column(row.points)?))
    }
}

/// Insertable struct for registering accounts.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewAccountRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub phone: &'a str,
    pub role: &'a str,
    pub points: i64,
    pub password_hash: &'a str,
}

impl<'a> NewAccountRow<'a> {
    pub(crate) fn new(
        account: &'a Account,
        digest: &'a PasswordDigest,
    ) -> Result<Self, LedgerRepositoryError> {
        Ok(Self {
            id: *account.id.as_uuid(),
            name: &account.name,
            phone: account.phone.as_ref(),
            role: account.role.as_str(),
            points: points_to_column(account.points)?,
            password_hash: digest.as_str(),
        })
    }
}

/// Login columns read by phone number.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CredentialsRow {
    pub id: Uuid,
    pub password_hash: Option<String>,
}

impl CredentialsRow {
    /// `None` when the account has no digest on file.
    pub(crate) fn into_credentials(self) -> Result<Option<StoredCredentials>, LedgerRepositoryError> {
        let Some(stored) = self.password_hash else {
            return Ok(None);
        };
        let digest = PasswordDigest::from_stored(stored)
            .map_err(|err| LedgerRepositoryError::query(err.to_string()))?;
        Ok(Some(StoredCredentials {
            user_id: UserId::from_uuid(self.id),
            digest,
        }))
    }
}

/// Row struct for reading from the rewards table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = rewards)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RewardRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub cost: i64,
    pub is_active: bool,
}

impl TryFrom<RewardRow> for Reward {
    type Error = LedgerRepositoryError;

    fn try_from(row: RewardRow) -> Result<Self, Self::Error> {
        Ok(Reward {
            id: RewardId::from_uuid(row.id),
            title: row.title,
            description: row.description,
            cost: points_from_column(row.cost)?,
            is_active: row.is_active,
        })
    }
}

impl TryFrom<&Reward> for RewardRow {
    type Error = LedgerRepositoryError;

    fn try_from(reward: &Reward) -> Result<Self, Self::Error> {
        Ok(Self {
            id: *reward.id.as_uuid(),
            title: reward.title.clone(),
            description: reward.description.clone(),
            cost: points_to_column(reward.cost)?,
            is_active: reward.is_active,
        })
    }
}

/// Insertable struct for redemption records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = redemptions)]
pub(crate) struct NewRedemptionRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub reward_id: Option<Uuid>,
    pub points_spent: i64,
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
}

impl<'a> NewRedemptionRow<'a> {
    pub(crate) fn from_redemption(
        redemption: &'a Redemption,
    ) -> Result<Self, LedgerRepositoryError> {
        Ok(Self {
            id: *redemption.id.as_uuid(),
            user_id: *redemption.user_id.as_uuid(),
            reward_id: redemption.reward_id.map(|id| *id.as_uuid()),
            points_spent: points_to_column(redemption.points_spent)?,
            status: redemption.status.as_str(),
            created_at: redemption.created_at,
        })
    }
}

/// Build the PENDING redemption written alongside a catalog debit.
pub(crate) fn pending_redemption(
    user_id: &UserId,
    reward_id: RewardId,
    points_spent: Points,
    created_at: DateTime<Utc>,
) -> Redemption {
    Redemption {
        id: RedemptionId::random(),
        user_id: user_id.clone(),
        reward_id: Some(reward_id),
        points_spent,
        status: RedemptionStatus::Pending,
        created_at,
    }
}
