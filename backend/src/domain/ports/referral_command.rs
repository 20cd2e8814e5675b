//! Driving port for referral codes.

use async_trait::async_trait;

use crate::domain::{Error, ReferralApplied, ReferralInfo, UserId};

/// Domain use-case port for sharing and applying referral codes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReferralCommand: Send + Sync {
    /// Referral code and share material for the caller.
    async fn referral_info(&self, user_id: &UserId) -> Result<ReferralInfo, Error>;

    /// Credit the code owner and the new user.
    async fn apply_referral(&self, code: &str, new_user: &UserId)
    -> Result<ReferralApplied, Error>;
}
