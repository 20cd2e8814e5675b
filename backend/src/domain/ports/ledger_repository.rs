//! Driven port for point-ledger persistence.
//!
//! Adapters own atomicity: [`LedgerRepository::redeem`] and
//! [`LedgerRepository::credit_referral_pair`] must apply all of their writes
//! or none of them, and `redeem` must serialise concurrent calls for the
//! same user so the balance check and the debit observe the same value.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Account, PasswordDigest, PhoneNumber, Points, Redemption, Reward, RewardId, UserId,
};

/// Persistence errors raised by ledger repository adapters.
///
/// `Connection` means the store could not be reached and the caller may
/// retry; `Query` means a statement ran and failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerRepositoryError {
    #[error("ledger repository connection failed: {message}")]
    Connection { message: String },
    #[error("ledger repository query failed: {message}")]
    Query { message: String },
}

impl LedgerRepositoryError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// A request to debit `cost` from `user_id`.
///
/// A PENDING redemption is written alongside the debit only when
/// `reward_id` is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedemptionDraft {
    pub user_id: UserId,
    pub cost: Points,
    pub reward_id: Option<RewardId>,
    pub requested_at: DateTime<Utc>,
}

/// Committed result of a successful debit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Debit {
    /// Account state after the debit.
    pub account: Account,
    pub redemption: Option<Redemption>,
}

/// Outcome of an atomic redemption attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedeemOutcome {
    /// Balance was sufficient; the debit (and redemption) committed.
    Debited(Debit),
    /// Balance was below the cost; nothing was written.
    Insufficient { balance: Points },
    /// No account exists for the user; nothing was written.
    AccountMissing,
}

/// Paired credit applied when a referral code is redeemed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferralCredit {
    pub referrer: UserId,
    pub referrer_bonus: Points,
    pub new_user: UserId,
    pub new_user_bonus: Points,
}

/// Outcome of [`LedgerRepository::credit_referral_pair`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferralCreditOutcome {
    Applied,
    ReferrerMissing,
    NewUserMissing,
}

/// Login material stored against a phone number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    pub user_id: UserId,
    pub digest: PasswordDigest,
}

/// Outcome of [`LedgerRepository::create_account`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountCreation {
    Created,
    /// Another account already uses the phone number; nothing was written.
    PhoneTaken,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Fetch an account by identifier.
    async fn find_account(&self, user_id: &UserId)
    -> Result<Option<Account>, LedgerRepositoryError>;

    /// Fetch the account whose identifier ends with `suffix` (lower-case hex).
    /// When several match, the earliest registered wins.
    async fn find_account_by_id_suffix(
        &self,
        suffix: &str,
    ) -> Result<Option<Account>, LedgerRepositoryError>;

    /// Insert a new account with its password digest, unless the phone
    /// number is already registered.
    async fn create_account(
        &self,
        account: &Account,
        digest: &PasswordDigest,
    ) -> Result<AccountCreation, LedgerRepositoryError>;

    /// Login material for `phone`. Accounts without a stored digest cannot
    /// log in and yield `None`.
    async fn find_credentials(
        &self,
        phone: &PhoneNumber,
    ) -> Result<Option<StoredCredentials>, LedgerRepositoryError>;

    /// Atomically add `amount` and return the new balance, or `None` when the
    /// account does not exist.
    async fn credit(
        &self,
        user_id: &UserId,
        amount: Points,
    ) -> Result<Option<Points>, LedgerRepositoryError>;

    /// Lock the account, compare its balance with the cost, then debit and
    /// optionally insert a PENDING redemption, all in one unit of work.
    async fn redeem(&self, draft: RedemptionDraft) -> Result<RedeemOutcome, LedgerRepositoryError>;

    /// Credit both sides of a referral in one unit of work.
    async fn credit_referral_pair(
        &self,
        credit: ReferralCredit,
    ) -> Result<ReferralCreditOutcome, LedgerRepositoryError>;

    /// Fetch a catalog reward regardless of its active flag.
    async fn find_reward(&self, reward_id: &RewardId)
    -> Result<Option<Reward>, LedgerRepositoryError>;

    /// Active rewards ordered by ascending cost.
    async fn list_active_rewards(&self) -> Result<Vec<Reward>, LedgerRepositoryError>;

    /// Insert rewards whose titles are not yet present; returns the number inserted.
    async fn seed_rewards(&self, rewards: &[Reward]) -> Result<usize, LedgerRepositoryError>;
}
