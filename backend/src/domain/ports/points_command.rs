//! Driving port for ledger mutations.
//!
//! Every operation takes the authenticated identity explicitly; callers
//! resolve it from their transport before invoking the port.

use async_trait::async_trait;

use crate::domain::{
    AwardReason, Error, PhoneNumber, Points, PointsAmount, RedemptionId, RewardId, UserId,
};

/// Result of [`PointsCommand::award`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AwardOutcome {
    /// The reason earned points and the balance was incremented.
    Awarded {
        reason: AwardReason,
        amount: Points,
        new_balance: Points,
    },
    /// The reason was unrecognised or worth nothing; no write happened.
    Ignored,
}

/// Result of [`PointsCommand::add`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointsAdded {
    pub new_balance: Points,
    pub added: PointsAmount,
    pub reason: Option<String>,
}

/// Result of [`PointsCommand::redeem_reward`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardRedeemed {
    pub redemption_id: RedemptionId,
    pub remaining: Points,
}

/// Input for [`PointsCommand::redeem_fixed_threshold`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdRedemptionRequest {
    pub user_id: UserId,
    pub reward_id: Option<RewardId>,
    /// Free-text label for the service being claimed.
    pub service: Option<String>,
}

/// Result of [`PointsCommand::redeem_fixed_threshold`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdRedeemed {
    pub message: String,
    pub redemption_id: Option<RedemptionId>,
    pub remaining: Points,
    pub value_inr: u64,
    pub name: String,
    pub phone: PhoneNumber,
}

/// Domain use-case port for awarding and redeeming points.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PointsCommand: Send + Sync {
    /// Credit the fixed amount mapped to `reason`.
    async fn award(&self, user_id: &UserId, reason: &str) -> Result<AwardOutcome, Error>;

    /// Credit an arbitrary positive amount.
    async fn add(
        &self,
        user_id: &UserId,
        amount: PointsAmount,
        reason: Option<String>,
    ) -> Result<PointsAdded, Error>;

    /// Spend the catalog cost of `reward_id` and record a PENDING redemption.
    async fn redeem_reward(
        &self,
        user_id: &UserId,
        reward_id: &RewardId,
    ) -> Result<RewardRedeemed, Error>;

    /// Spend the fixed threshold for a nominal-value service.
    async fn redeem_fixed_threshold(
        &self,
        request: ThresholdRedemptionRequest,
    ) -> Result<ThresholdRedeemed, Error>;
}
