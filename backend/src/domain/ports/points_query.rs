//! Driving port for balance reads.

use async_trait::async_trait;

use crate::domain::{Error, Points, REDEEM_THRESHOLD, REDEEM_VALUE_INR, UserId};

/// Balance view returned by the points endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceSummary {
    pub points: Points,
    /// `None` when the account does not exist.
    pub name: Option<String>,
    pub can_redeem: bool,
    pub redeem_value: u64,
}

impl BalanceSummary {
    /// Derive the summary for a balance, applying the redemption threshold.
    pub fn new(points: Points, name: Option<String>) -> Self {
        Self {
            points,
            name,
            can_redeem: points >= REDEEM_THRESHOLD,
            redeem_value: REDEEM_VALUE_INR,
        }
    }
}

/// Domain use-case port for reading balances.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PointsQuery: Send + Sync {
    /// Current balance, or zero when the account is missing.
    async fn balance(&self, user_id: &UserId) -> Result<Points, Error>;

    /// Balance plus redemption eligibility.
    async fn summary(&self, user_id: &UserId) -> Result<BalanceSummary, Error>;
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, false)]
    #[case(99_999, false)]
    #[case(100_000, true)]
    #[case(250_000, true)]
    fn can_redeem_tracks_threshold(#[case] raw: u64, #[case] expected: bool) {
        let summary = BalanceSummary::new(Points::new(raw), None);
        assert_eq!(summary.can_redeem, expected);
        assert_eq!(summary.redeem_value, 2_000);
    }
}
