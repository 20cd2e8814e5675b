//! PostgreSQL-backed `LedgerRepository`.
//!
//! Redemptions lock the account row with `SELECT ... FOR UPDATE` inside a
//! transaction, so the balance check, the debit, and the optional redemption
//! insert observe and commit one consistent balance. Concurrent redemptions
//! for the same account queue on the row lock.

use async_trait::async_trait;
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::{Bool, Text};
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{
    AccountCreation, Debit, LedgerRepository, LedgerRepositoryError, RedeemOutcome,
    RedemptionDraft, ReferralCredit, ReferralCreditOutcome, StoredCredentials,
};
use crate::domain::{Account, PasswordDigest, PhoneNumber, Points, Reward, RewardId, UserId};

use super::models::{
    AccountRow, CredentialsRow, NewAccountRow, NewRedemptionRow, RewardRow, pending_redemption,
    points_from_column, points_to_column,
};
use super::pool::{DbPool, PoolError};
use super::schema::{redemptions, rewards, users};

/// Diesel-backed implementation of the ledger repository port.
#[derive(Clone)]
pub struct DieselLedgerRepository {
    pool: DbPool,
}

impl DieselLedgerRepository {
    /// Create a repository over `pool`.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use kabadiyo::outbound::persistence::{DbPool, DieselLedgerRepository, PoolConfig};
    ///
    /// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
    /// let pool = DbPool::new(PoolConfig::new("postgres://localhost/kabadiyo")).await?;
    /// let repository = DieselLedgerRepository::new(pool);
    /// # let _ = repository;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Failure inside a ledger transaction. Either variant rolls the
/// transaction back.
#[derive(Debug)]
enum TxError {
    Diesel(diesel::result::Error),
    Ledger(LedgerRepositoryError),
}

impl From<diesel::result::Error> for TxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

impl From<LedgerRepositoryError> for TxError {
    fn from(error: LedgerRepositoryError) -> Self {
        Self::Ledger(error)
    }
}

impl From<TxError> for LedgerRepositoryError {
    fn from(error: TxError) -> Self {
        match error {
            TxError::Diesel(error) => map_diesel_error(error),
            TxError::Ledger(error) => error,
        }
    }
}

fn map_pool_error(error: PoolError) -> LedgerRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            LedgerRepositoryError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> LedgerRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    let error_message = error.to_string();
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                error = %error_message,
                "diesel operation failed"
            );
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            error = %error_message,
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => LedgerRepositoryError::query("record not found"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            LedgerRepositoryError::connection(info.message().to_owned())
        }
        DieselError::DatabaseError(_, info) => {
            LedgerRepositoryError::query(info.message().to_owned())
        }
        _ => LedgerRepositoryError::query(error_message),
    }
}

#[async_trait]
impl LedgerRepository for DieselLedgerRepository {
    async fn find_account(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Account>, LedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .find(*user_id.as_uuid())
            .select(AccountRow::as_select())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Account::try_from).transpose()
    }

    async fn find_account_by_id_suffix(
        &self,
        suffix: &str,
    ) -> Result<Option<Account>, LedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(sql::<Bool>("right(id::text, 6) = ").bind::<Text, _>(suffix.to_owned()))
            .order(users::created_at.asc())
            .select(AccountRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Account::try_from).transpose()
    }

    async fn create_account(
        &self,
        account: &Account,
        digest: &PasswordDigest,
    ) -> Result<AccountCreation, LedgerRepositoryError> {
        let new_row = NewAccountRow::new(account, digest)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let inserted = diesel::insert_into(users::table)
            .values(&new_row)
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(if inserted == 0 {
            AccountCreation::PhoneTaken
        } else {
            AccountCreation::Created
        })
    }

    async fn find_credentials(
        &self,
        phone: &PhoneNumber,
    ) -> Result<Option<StoredCredentials>, LedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::phone.eq(phone.as_ref()))
            .select(CredentialsRow::as_select())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(CredentialsRow::into_credentials).transpose()?.flatten())
    }

    async fn credit(
        &self,
        user_id: &UserId,
        amount: Points,
    ) -> Result<Option<Points>, LedgerRepositoryError> {
        let delta = points_to_column(amount)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let balance: Option<i64> = diesel::update(users::table.find(*user_id.as_uuid()))
            .set(users::points.eq(users::points + delta))
            .returning(users::points)
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        balance.map(points_from_column).transpose()
    }

    async fn redeem(&self, draft: RedemptionDraft) -> Result<RedeemOutcome, LedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user_uuid = *draft.user_id.as_uuid();

        let outcome = conn
            .transaction::<_, TxError, _>(|conn| {
                async move {
                    let row = users::table
                        .find(user_uuid)
                        .select(AccountRow::as_select())
                        .for_update()
                        .get_result(conn)
                        .await
                        .optional()?;
                    let Some(row) = row else {
                        return Ok(RedeemOutcome::AccountMissing);
                    };
                    let account = Account::try_from(row)?;
                    let Some(remaining) = account.points.checked_sub(draft.cost) else {
                        return Ok(RedeemOutcome::Insufficient {
                            balance: account.points,
                        });
                    };

                    diesel::update(users::table.find(user_uuid))
                        .set(users::points.eq(points_to_column(remaining)?))
                        .execute(conn)
                        .await?;

                    let redemption = draft.reward_id.map(|reward_id| {
                        pending_redemption(&draft.user_id, reward_id, draft.cost, draft.requested_at)
                    });
                    if let Some(redemption) = redemption.as_ref() {
                        diesel::insert_into(redemptions::table)
                            .values(NewRedemptionRow::from_redemption(redemption)?)
                            .execute(conn)
                            .await?;
                    }

                    Ok(RedeemOutcome::Debited(Debit {
                        account: account.with_points(remaining),
                        redemption,
                    }))
                }
                .scope_boxed()
            })
            .await?;

        Ok(outcome)
    }

    async fn credit_referral_pair(
        &self,
        credit: ReferralCredit,
    ) -> Result<ReferralCreditOutcome, LedgerRepositoryError> {
        let referrer_delta = points_to_column(credit.referrer_bonus)?;
        let new_user_delta = points_to_column(credit.new_user_bonus)?;
        let referrer = *credit.referrer.as_uuid();
        let new_user = *credit.new_user.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let outcome = conn
            .transaction::<_, TxError, _>(|conn| {
                async move {
                    // Lock in id order so two opposing referrals cannot deadlock.
                    let locked: Vec<Uuid> = users::table
                        .filter(users::id.eq_any([referrer, new_user]))
                        .order(users::id.asc())
                        .select(users::id)
                        .for_update()
                        .load(conn)
                        .await?;
                    if !locked.contains(&referrer) {
                        return Ok(ReferralCreditOutcome::ReferrerMissing);
                    }
                    if !locked.contains(&new_user) {
                        return Ok(ReferralCreditOutcome::NewUserMissing);
                    }

                    diesel::update(users::table.find(referrer))
                        .set(users::points.eq(users::points + referrer_delta))
                        .execute(conn)
                        .await?;
                    diesel::update(users::table.find(new_user))
                        .set(users::points.eq(users::points + new_user_delta))
                        .execute(conn)
                        .await?;
                    Ok(ReferralCreditOutcome::Applied)
                }
                .scope_boxed()
            })
            .await?;

        Ok(outcome)
    }

    async fn find_reward(
        &self,
        reward_id: &RewardId,
    ) -> Result<Option<Reward>, LedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = rewards::table
            .find(*reward_id.as_uuid())
            .select(RewardRow::as_select())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Reward::try_from).transpose()
    }

    async fn list_active_rewards(&self) -> Result<Vec<Reward>, LedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = rewards::table
            .filter(rewards::is_active.eq(true))
            .order((rewards::cost.asc(), rewards::title.asc()))
            .select(RewardRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(Reward::try_from).collect()
    }

    async fn seed_rewards(&self, catalog: &[Reward]) -> Result<usize, LedgerRepositoryError> {
        if catalog.is_empty() {
            return Ok(0);
        }
        let rows = catalog
            .iter()
            .map(RewardRow::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(rewards::table)
            .values(&rows)
            .on_conflict(rewards::title)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for ledger repository error mapping.
    use super::*;
    use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind};
    use rstest::rstest;

    struct StubInfo(&'static str);

    impl DatabaseErrorInformation for StubInfo {
        fn message(&self) -> &str {
            self.0
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            Some("users")
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            None
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn database_error(kind: DatabaseErrorKind, message: &'static str) -> diesel::result::Error {
        diesel::result::Error::DatabaseError(kind, Box::new(StubInfo(message)))
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let err = map_pool_error(PoolError::checkout("connection refused"));

        assert!(matches!(err, LedgerRepositoryError::Connection { .. }));
        assert!(err.to_string().contains("connection refused"));
    }

    #[rstest]
    fn closed_connection_maps_to_connection_error() {
        let err = map_diesel_error(database_error(
            DatabaseErrorKind::ClosedConnection,
            "server closed the connection",
        ));
        assert!(matches!(err, LedgerRepositoryError::Connection { .. }));
    }

    #[rstest]
    #[case::not_found(diesel::result::Error::NotFound, "record not found")]
    #[case::check_violation(
        database_error(DatabaseErrorKind::CheckViolation, "users_points_check"),
        "users_points_check"
    )]
    fn other_failures_map_to_query_errors(
        #[case] error: diesel::result::Error,
        #[case] expected: &str,
    ) {
        let err = map_diesel_error(error);
        assert!(matches!(err, LedgerRepositoryError::Query { .. }));
        assert!(err.to_string().contains(expected));
    }

    #[rstest]
    fn transaction_errors_keep_ledger_failures_intact() {
        let inner = LedgerRepositoryError::query("stored role: unknown role");
        let mapped = LedgerRepositoryError::from(TxError::from(inner.clone()));
        assert_eq!(mapped, inner);
    }
}
