//! Driving port for the reward catalog.

use async_trait::async_trait;

use crate::domain::{Error, Reward};

/// Domain use-case port for listing redeemable rewards.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RewardsQuery: Send + Sync {
    /// Active rewards, cheapest first.
    async fn active_rewards(&self) -> Result<Vec<Reward>, Error>;
}
