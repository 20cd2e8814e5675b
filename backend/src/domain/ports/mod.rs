//! Domain ports and supporting types for the hexagonal boundary.

mod ledger_repository;
mod login_service;
mod points_command;
mod points_query;
mod referral_command;
mod rewards_query;

#[cfg(test)]
pub use ledger_repository::MockLedgerRepository;
pub use ledger_repository::{
    AccountCreation, Debit, LedgerRepository, LedgerRepositoryError, RedeemOutcome,
    RedemptionDraft, ReferralCredit, ReferralCreditOutcome, StoredCredentials,
};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::LoginService;
#[cfg(test)]
pub use points_command::MockPointsCommand;
pub use points_command::{
    AwardOutcome, PointsAdded, PointsCommand, RewardRedeemed, ThresholdRedeemed,
    ThresholdRedemptionRequest,
};
#[cfg(test)]
pub use points_query::MockPointsQuery;
pub use points_query::{BalanceSummary, PointsQuery};
#[cfg(test)]
pub use referral_command::MockReferralCommand;
pub use referral_command::ReferralCommand;
#[cfg(test)]
pub use rewards_query::MockRewardsQuery;
pub use rewards_query::RewardsQuery;
