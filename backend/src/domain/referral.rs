//! Referral codes and the bonus schedule.

use std::fmt;

use super::{Points, REDEEM_THRESHOLD, REDEEM_VALUE_INR, UserId};

/// Points credited to the referrer when a code is applied.
pub const REFERRER_BONUS: Points = Points::new(2_000);

/// Points credited to the newly registered user.
pub const NEW_USER_BONUS: Points = Points::new(500);

const CODE_PREFIX: &str = "KBD";
const SUFFIX_LEN: usize = 6;
const SHARE_BASE_URL: &str = "https://kabadiyo.com";

/// Errors raised while parsing a referral code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReferralCodeError {
    #[error("referral code must not be empty")]
    Empty,
    #[error("referral code is malformed")]
    Malformed,
}

/// Shareable referral code: `KBD` followed by the last six id characters.
///
/// # Examples
/// ```
/// use kabadiyo::domain::{ReferralCode, UserId};
///
/// let id = UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid id");
/// let code = ReferralCode::for_user(&id);
/// assert_eq!(code.as_ref(), "KBD66AFA6");
/// assert_eq!(code.id_suffix(), "66afa6");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReferralCode(String);

impl ReferralCode {
    /// Derive the code owned by `user_id`.
    pub fn for_user(user_id: &UserId) -> Self {
        let raw = user_id.as_ref();
        let start = raw.len().saturating_sub(SUFFIX_LEN);
        let suffix = raw.get(start..).unwrap_or(raw);
        Self(format!("{CODE_PREFIX}{}", suffix.to_ascii_uppercase()))
    }

    /// Parse user input, case-insensitively.
    pub fn parse(raw: &str) -> Result<Self, ReferralCodeError> {
        let normalised = raw.trim().to_ascii_uppercase();
        if normalised.is_empty() {
            return Err(ReferralCodeError::Empty);
        }
        let suffix = normalised
            .strip_prefix(CODE_PREFIX)
            .ok_or(ReferralCodeError::Malformed)?;
        if suffix.len() != SUFFIX_LEN || !suffix.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ReferralCodeError::Malformed);
        }
        Ok(Self(normalised))
    }

    /// Lower-case id suffix used to locate the referrer.
    pub fn id_suffix(&self) -> String {
        self.0
            .get(CODE_PREFIX.len()..)
            .unwrap_or_default()
            .to_ascii_lowercase()
    }

    /// Registration link embedding the code.
    pub fn share_url(&self) -> String {
        format!("{SHARE_BASE_URL}/register?ref={}", self.0)
    }

    /// Message users paste into chat apps.
    pub fn share_text(&self) -> String {
        format!(
            "Join Kabadiyo and sell scrap easily! Use my code {} to get {} bonus points. Download: {SHARE_BASE_URL}",
            self.0,
            NEW_USER_BONUS.value()
        )
    }
}

impl AsRef<str> for ReferralCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReferralCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Referral summary shown to the code owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferralInfo {
    pub code: ReferralCode,
    pub share_url: String,
    pub share_text: String,
    pub stats: ReferralStats,
    pub schedule: ReferralSchedule,
}

impl ReferralInfo {
    /// Assemble the summary for `user_id`.
    pub fn for_user(user_id: &UserId) -> Self {
        let code = ReferralCode::for_user(user_id);
        Self {
            share_url: code.share_url(),
            share_text: code.share_text(),
            code,
            stats: ReferralStats::default(),
            schedule: ReferralSchedule::default(),
        }
    }
}

/// Referral counters. Not tracked yet, so always zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReferralStats {
    pub total_referrals: u64,
    pub successful_referrals: u64,
    pub pending_referrals: u64,
    pub total_earned: Points,
}

/// Constants advertised alongside a referral code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferralSchedule {
    pub per_referral: Points,
    pub min_threshold: Points,
    pub redeem_value: u64,
}

impl Default for ReferralSchedule {
    fn default() -> Self {
        Self {
            per_referral: REFERRER_BONUS,
            min_threshold: REDEEM_THRESHOLD,
            redeem_value: REDEEM_VALUE_INR,
        }
    }
}

/// Result of a successfully applied referral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferralApplied {
    pub referrer_bonus: Points,
    pub new_user_bonus: Points,
}
