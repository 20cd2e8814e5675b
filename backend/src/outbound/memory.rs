//! In-process `LedgerRepository` used when no database is configured.
//!
//! A single `tokio::sync::Mutex` guards all state, and every operation holds
//! it for its full read-compare-write sequence, so concurrent redemptions for
//! the same user are serialised exactly as the row lock does in PostgreSQL.
//! Accounts are kept in registration order, matching the `created_at`
//! ordering the PostgreSQL adapter uses for referral lookups.

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::ports::{
    AccountCreation, Debit, LedgerRepository, LedgerRepositoryError, RedeemOutcome,
    RedemptionDraft, ReferralCredit, ReferralCreditOutcome, StoredCredentials,
};
use crate::domain::{
    Account, PasswordDigest, PhoneNumber, Points, Redemption, RedemptionId, RedemptionStatus,
    Reward, RewardId, UserId, default_catalog,
};

#[derive(Debug)]
struct StoredAccount {
    account: Account,
    digest: Option<PasswordDigest>,
}

#[derive(Debug, Default)]
struct LedgerState {
    accounts: Vec<StoredAccount>,
    rewards: Vec<Reward>,
    redemptions: Vec<Redemption>,
}

impl LedgerState {
    fn account(&self, user_id: &UserId) -> Option<&Account> {
        self.accounts
            .iter()
            .map(|stored| &stored.account)
            .find(|account| &account.id == user_id)
    }

    fn account_mut(&mut self, user_id: &UserId) -> Option<&mut Account> {
        self.accounts
            .iter_mut()
            .map(|stored| &mut stored.account)
            .find(|account| &account.id == user_id)
    }

    /// Replace the account's profile and balance, keeping its digest, or
    /// append it when new.
    fn upsert(&mut self, account: Account, digest: Option<PasswordDigest>) {
        if let Some(existing) = self
            .accounts
            .iter_mut()
            .find(|stored| stored.account.id == account.id)
        {
            existing.account = account;
            if digest.is_some() {
                existing.digest = digest;
            }
            return;
        }
        self.accounts.push(StoredAccount { account, digest });
    }
}

/// Mutex-guarded ledger store.
#[derive(Debug, Default)]
pub struct InMemoryLedgerRepository {
    state: Mutex<LedgerState>,
}

impl InMemoryLedgerRepository {
    /// Store preloaded with the default reward catalog.
    pub fn with_default_catalog() -> Self {
        Self {
            state: Mutex::new(LedgerState {
                rewards: default_catalog(),
                ..LedgerState::default()
            }),
        }
    }

    /// Builder form of account seeding for synchronous setup code.
    #[must_use]
    pub fn with_account(mut self, account: Account, digest: Option<PasswordDigest>) -> Self {
        self.state.get_mut().upsert(account, digest);
        self
    }

    /// Insert or replace an account, including its balance. A stored
    /// password digest survives the replacement.
    pub async fn put_account(&self, account: Account) {
        self.state.lock().await.upsert(account, None);
    }

    /// Insert or replace a catalog reward.
    pub async fn put_reward(&self, reward: Reward) {
        let mut state = self.state.lock().await;
        state.rewards.retain(|existing| existing.id != reward.id);
        state.rewards.push(reward);
    }

    /// Snapshot of committed redemptions.
    pub async fn redemptions(&self) -> Vec<Redemption> {
        self.state.lock().await.redemptions.clone()
    }
}

fn overflow() -> LedgerRepositoryError {
    LedgerRepositoryError::query("balance overflow")
}

#[async_trait]
impl LedgerRepository for InMemoryLedgerRepository {
    async fn find_account(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Account>, LedgerRepositoryError> {
        Ok(self.state.lock().await.account(user_id).cloned())
    }

    async fn find_account_by_id_suffix(
        &self,
        suffix: &str,
    ) -> Result<Option<Account>, LedgerRepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .accounts
            .iter()
            .map(|stored| &stored.account)
            .find(|account| account.id.as_ref().ends_with(suffix))
            .cloned())
    }

    async fn create_account(
        &self,
        account: &Account,
        digest: &PasswordDigest,
    ) -> Result<AccountCreation, LedgerRepositoryError> {
        let mut state = self.state.lock().await;
        let taken = state
            .accounts
            .iter()
            .any(|stored| stored.account.phone == account.phone || stored.account.id == account.id);
        if taken {
            return Ok(AccountCreation::PhoneTaken);
        }
        state.accounts.push(StoredAccount {
            account: account.clone(),
            digest: Some(digest.clone()),
        });
        Ok(AccountCreation::Created)
    }

    async fn find_credentials(
        &self,
        phone: &PhoneNumber,
    ) -> Result<Option<StoredCredentials>, LedgerRepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .accounts
            .iter()
            .find(|stored| &stored.account.phone == phone)
            .and_then(|stored| {
                stored.digest.clone().map(|digest| StoredCredentials {
                    user_id: stored.account.id.clone(),
                    digest,
                })
            }))
    }

    async fn credit(
        &self,
        user_id: &UserId,
        amount: Points,
    ) -> Result<Option<Points>, LedgerRepositoryError> {
        let mut state = self.state.lock().await;
        let Some(account) = state.account_mut(user_id) else {
            return Ok(None);
        };
        account.points = account.points.checked_add(amount).ok_or_else(overflow)?;
        Ok(Some(account.points))
    }

    async fn redeem(&self, draft: RedemptionDraft) -> Result<RedeemOutcome, LedgerRepositoryError> {
        let mut state = self.state.lock().await;
        let Some(account) = state.account_mut(&draft.user_id) else {
            return Ok(RedeemOutcome::AccountMissing);
        };
        let Some(remaining) = account.points.checked_sub(draft.cost) else {
            debug!(user_id = %draft.user_id, "redemption refused: insufficient balance");
            return Ok(RedeemOutcome::Insufficient {
                balance: account.points,
            });
        };
        account.points = remaining;
        let account = account.clone();

        let redemption = draft.reward_id.map(|reward_id| Redemption {
            id: RedemptionId::random(),
            user_id: draft.user_id.clone(),
            reward_id: Some(reward_id),
            points_spent: draft.cost,
            status: RedemptionStatus::Pending,
            created_at: draft.requested_at,
        });
        if let Some(redemption) = redemption.as_ref() {
            state.redemptions.push(redemption.clone());
        }
        Ok(RedeemOutcome::Debited(Debit {
            account,
            redemption,
        }))
    }

    async fn credit_referral_pair(
        &self,
        credit: ReferralCredit,
    ) -> Result<ReferralCreditOutcome, LedgerRepositoryError> {
        let mut state = self.state.lock().await;
        let Some(referrer_points) = state.account(&credit.referrer).map(|a| a.points) else {
            return Ok(ReferralCreditOutcome::ReferrerMissing);
        };
        let Some(new_user_points) = state.account(&credit.new_user).map(|a| a.points) else {
            return Ok(ReferralCreditOutcome::NewUserMissing);
        };
        let referrer_total = referrer_points
            .checked_add(credit.referrer_bonus)
            .ok_or_else(overflow)?;
        let new_user_total = new_user_points
            .checked_add(credit.new_user_bonus)
            .ok_or_else(overflow)?;

        if let Some(account) = state.account_mut(&credit.referrer) {
            account.points = referrer_total;
        }
        if let Some(account) = state.account_mut(&credit.new_user) {
            account.points = new_user_total;
        }
        Ok(ReferralCreditOutcome::Applied)
    }

    async fn find_reward(
        &self,
        reward_id: &RewardId,
    ) -> Result<Option<Reward>, LedgerRepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .rewards
            .iter()
            .find(|reward| &reward.id == reward_id)
            .cloned())
    }

    async fn list_active_rewards(&self) -> Result<Vec<Reward>, LedgerRepositoryError> {
        let state = self.state.lock().await;
        let mut rewards: Vec<Reward> = state
            .rewards
            .iter()
            .filter(|reward| reward.is_active)
            .cloned()
            .collect();
        rewards.sort_by_key(|reward| reward.cost);
        Ok(rewards)
    }

    async fn seed_rewards(&self, rewards: &[Reward]) -> Result<usize, LedgerRepositoryError> {
        let mut state = self.state.lock().await;
        let mut inserted = 0;
        for reward in rewards {
            if state.rewards.iter().any(|existing| existing.title == reward.title) {
                continue;
            }
            state.rewards.push(reward.clone());
            inserted += 1;
        }
        Ok(inserted)
    }
}
