//! Points ledger service implementing the points, rewards, and referral
//! driving ports on top of a [`LedgerRepository`].
//!
//! The repository handle is injected at construction; the caller's identity
//! is passed to every operation. Balance checks and debits are delegated to
//! [`LedgerRepository::redeem`] so they run as one unit of work.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{error, info, warn};

use crate::domain::ports::{
    AwardOutcome, BalanceSummary, Debit, LedgerRepository, LedgerRepositoryError, PointsAdded,
    PointsCommand, PointsQuery, RedeemOutcome, RedemptionDraft, ReferralCommand, ReferralCredit,
    ReferralCreditOutcome, RewardRedeemed, RewardsQuery, ThresholdRedeemed,
    ThresholdRedemptionRequest,
};
use crate::domain::{
    AwardReason, Error, NEW_USER_BONUS, Points, PointsAmount, REDEEM_THRESHOLD, REDEEM_VALUE_INR,
    REFERRER_BONUS, Reward, RewardId, ReferralApplied, ReferralCode, ReferralInfo, UserId,
};

const DEFAULT_SERVICE_LABEL: &str = "local service";

/// Ledger service generic over its persistence adapter.
#[derive(Clone)]
pub struct PointsLedgerService<R> {
    repository: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> PointsLedgerService<R> {
    /// Create a service over `repository`, stamping redemptions with `clock`.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use kabadiyo::domain::PointsLedgerService;
    /// use kabadiyo::outbound::memory::InMemoryLedgerRepository;
    /// use mockable::DefaultClock;
    ///
    /// let service = PointsLedgerService::new(
    ///     Arc::new(InMemoryLedgerRepository::default()),
    ///     Arc::new(DefaultClock),
    /// );
    /// # let _ = service;
    /// ```
    pub fn new(repository: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }
}

fn map_repository_error(err: LedgerRepositoryError) -> Error {
    match err {
        LedgerRepositoryError::Connection { message } => {
            warn!(%message, "ledger store unavailable");
            Error::service_unavailable("points ledger temporarily unavailable")
        }
        LedgerRepositoryError::Query { message } => {
            error!(%message, "ledger query failed");
            Error::internal(format!("ledger query failed: {message}"))
        }
    }
}

fn user_not_found() -> Error {
    Error::not_found("User not found")
}

fn reward_not_found() -> Error {
    Error::not_found("Reward not found")
}

fn catalog_shortfall(cost: Points, balance: Points) -> Error {
    Error::insufficient_funds(format!(
        "Insufficient points. Need {} points, you have {}.",
        cost.grouped(),
        balance.grouped()
    ))
}

fn threshold_shortfall(balance: Points) -> Error {
    Error::insufficient_funds(format!(
        "Need {} points to redeem. You have {}.",
        REDEEM_THRESHOLD.grouped(),
        balance.grouped()
    ))
}

impl<R> PointsLedgerService<R>
where
    R: LedgerRepository,
{
    async fn credit(&self, user_id: &UserId, amount: Points) -> Result<Points, Error> {
        self.repository
            .credit(user_id, amount)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(user_not_found)
    }

    /// Look up a reward that may still be redeemed.
    async fn active_reward(&self, reward_id: &RewardId) -> Result<Reward, Error> {
        match self
            .repository
            .find_reward(reward_id)
            .await
            .map_err(map_repository_error)?
        {
            Some(reward) if reward.is_active => Ok(reward),
            _ => Err(reward_not_found()),
        }
    }

    async fn debit(
        &self,
        user_id: &UserId,
        cost: Points,
        reward_id: Option<RewardId>,
    ) -> Result<RedeemOutcome, Error> {
        let draft = RedemptionDraft {
            user_id: user_id.clone(),
            cost,
            reward_id,
            requested_at: self.clock.utc(),
        };
        self.repository
            .redeem(draft)
            .await
            .map_err(map_repository_error)
    }
}

#[async_trait]
impl<R> PointsQuery for PointsLedgerService<R>
where
    R: LedgerRepository,
{
    async fn balance(&self, user_id: &UserId) -> Result<Points, Error> {
        let account = self
            .repository
            .find_account(user_id)
            .await
            .map_err(map_repository_error)?;
        Ok(account.map_or(Points::ZERO, |account| account.points))
    }

    async fn summary(&self, user_id: &UserId) -> Result<BalanceSummary, Error> {
        let account = self
            .repository
            .find_account(user_id)
            .await
            .map_err(map_repository_error)?;
        Ok(match account {
            Some(account) => BalanceSummary::new(account.points, Some(account.name)),
            None => BalanceSummary::new(Points::ZERO, None),
        })
    }
}

#[async_trait]
impl<R> PointsCommand for PointsLedgerService<R>
where
    R: LedgerRepository,
{
    async fn award(&self, user_id: &UserId, reason: &str) -> Result<AwardOutcome, Error> {
        let Some(reason) = AwardReason::parse(reason) else {
            return Ok(AwardOutcome::Ignored);
        };
        let amount = reason.points();
        if amount == Points::ZERO {
            return Ok(AwardOutcome::Ignored);
        }
        let new_balance = self.credit(user_id, amount).await?;
        info!(%user_id, reason = reason.as_str(), %amount, "points awarded");
        Ok(AwardOutcome::Awarded {
            reason,
            amount,
            new_balance,
        })
    }

    async fn add(
        &self,
        user_id: &UserId,
        amount: PointsAmount,
        reason: Option<String>,
    ) -> Result<PointsAdded, Error> {
        let new_balance = self.credit(user_id, Points::from(amount)).await?;
        info!(%user_id, amount = amount.value(), reason = ?reason, "points added");
        Ok(PointsAdded {
            new_balance,
            added: amount,
            reason,
        })
    }

    async fn redeem_reward(
        &self,
        user_id: &UserId,
        reward_id: &RewardId,
    ) -> Result<RewardRedeemed, Error> {
        let reward = self.active_reward(reward_id).await?;
        match self.debit(user_id, reward.cost, Some(reward.id)).await? {
            RedeemOutcome::Debited(Debit {
                account,
                redemption: Some(redemption),
            }) => {
                info!(%user_id, reward_id = %reward.id, cost = %reward.cost, "reward redeemed");
                Ok(RewardRedeemed {
                    redemption_id: redemption.id,
                    remaining: account.points,
                })
            }
            RedeemOutcome::Debited(Debit {
                redemption: None, ..
            }) => Err(Error::internal("redemption record missing after debit")),
            RedeemOutcome::Insufficient { balance } => Err(catalog_shortfall(reward.cost, balance)),
            RedeemOutcome::AccountMissing => Err(user_not_found()),
        }
    }

    async fn redeem_fixed_threshold(
        &self,
        request: ThresholdRedemptionRequest,
    ) -> Result<ThresholdRedeemed, Error> {
        let ThresholdRedemptionRequest {
            user_id,
            reward_id,
            service,
        } = request;
        if let Some(reward_id) = reward_id.as_ref() {
            self.active_reward(reward_id).await?;
        }

        match self.debit(&user_id, REDEEM_THRESHOLD, reward_id).await? {
            RedeemOutcome::Debited(Debit {
                account,
                redemption,
            }) => {
                let label = service
                    .as_deref()
                    .map(str::trim)
                    .filter(|label| !label.is_empty())
                    .unwrap_or(DEFAULT_SERVICE_LABEL);
                info!(%user_id, service = label, "threshold redemption committed");
                Ok(ThresholdRedeemed {
                    message: format!(
                        "Congratulations! You've redeemed ₹{REDEEM_VALUE_INR} worth of {label}!"
                    ),
                    redemption_id: redemption.map(|redemption| redemption.id),
                    remaining: account.points,
                    value_inr: REDEEM_VALUE_INR,
                    name: account.name,
                    phone: account.phone,
                })
            }
            RedeemOutcome::Insufficient { balance } => Err(threshold_shortfall(balance)),
            RedeemOutcome::AccountMissing => Err(threshold_shortfall(Points::ZERO)),
        }
    }
}

#[async_trait]
impl<R> RewardsQuery for PointsLedgerService<R>
where
    R: LedgerRepository,
{
    async fn active_rewards(&self) -> Result<Vec<Reward>, Error> {
        let mut rewards = self
            .repository
            .list_active_rewards()
            .await
            .map_err(map_repository_error)?;
        rewards.retain(|reward| reward.is_active);
        rewards.sort_by_key(|reward| reward.cost);
        Ok(rewards)
    }
}

#[async_trait]
impl<R> ReferralCommand for PointsLedgerService<R>
where
    R: LedgerRepository,
{
    async fn referral_info(&self, user_id: &UserId) -> Result<ReferralInfo, Error> {
        let account = self
            .repository
            .find_account(user_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(user_not_found)?;
        Ok(ReferralInfo::for_user(&account.id))
    }

    async fn apply_referral(
        &self,
        code: &str,
        new_user: &UserId,
    ) -> Result<ReferralApplied, Error> {
        let code = ReferralCode::parse(code)
            .map_err(|_| Error::invalid_request("Invalid referral code"))?;
        let referrer = self
            .repository
            .find_account_by_id_suffix(&code.id_suffix())
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::invalid_request("Invalid referral code"))?;
        if &referrer.id == new_user {
            return Err(Error::invalid_request("You cannot use your own referral code"));
        }

        let outcome = self
            .repository
            .credit_referral_pair(ReferralCredit {
                referrer: referrer.id.clone(),
                referrer_bonus: REFERRER_BONUS,
                new_user: new_user.clone(),
                new_user_bonus: NEW_USER_BONUS,
            })
            .await
            .map_err(map_repository_error)?;
        match outcome {
            ReferralCreditOutcome::Applied => {
                info!(referrer = %referrer.id, %new_user, "referral applied");
                Ok(ReferralApplied {
                    referrer_bonus: REFERRER_BONUS,
                    new_user_bonus: NEW_USER_BONUS,
                })
            }
            ReferralCreditOutcome::ReferrerMissing => {
                Err(Error::invalid_request("Invalid referral code"))
            }
            ReferralCreditOutcome::NewUserMissing => Err(user_not_found()),
        }
    }
}

#[cfg(test)]
#[path = "ledger_service_tests.rs"]
mod tests;
