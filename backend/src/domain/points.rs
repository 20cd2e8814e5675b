//! Point balances, credit amounts, and award reasons.
//!
//! Balances are unsigned so a negative balance cannot be represented; every
//! debit goes through [`Points::checked_sub`].

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Balance required by the fixed-threshold redemption path.
pub const REDEEM_THRESHOLD: Points = Points(100_000);

/// Nominal rupee value granted by a fixed-threshold redemption.
pub const REDEEM_VALUE_INR: u64 = 2_000;

/// A non-negative point balance or cost.
///
/// # Examples
/// ```
/// use kabadiyo::domain::Points;
///
/// let balance = Points::new(1_500);
/// assert_eq!(balance.checked_sub(Points::new(500)), Some(Points::new(1_000)));
/// assert_eq!(balance.checked_sub(Points::new(2_000)), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Points(u64);

impl Points {
    /// Empty balance.
    pub const ZERO: Self = Self(0);

    /// Wrap a raw value.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw value.
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Subtract `cost`, or `None` when the balance would go negative.
    #[must_use]
    pub fn checked_sub(self, cost: Self) -> Option<Self> {
        self.0.checked_sub(cost.0).map(Self)
    }

    /// Add `amount`, or `None` on overflow.
    #[must_use]
    pub fn checked_add(self, amount: Self) -> Option<Self> {
        self.0.checked_add(amount.0).map(Self)
    }

    /// Render with en-US thousands separators, e.g. `100,000`.
    pub fn grouped(self) -> String {
        let digits = self.0.to_string();
        let mut out = String::with_capacity(digits.len() + digits.len() / 3);
        for (index, ch) in digits.chars().enumerate() {
            if index > 0 && (digits.len() - index) % 3 == 0 {
                out.push(',');
            }
            out.push(ch);
        }
        out
    }
}

impl fmt::Display for Points {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<PointsAmount> for Points {
    fn from(value: PointsAmount) -> Self {
        Self(value.0)
    }
}

/// Errors raised while validating a credit amount.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PointsAmountError {
    /// The amount was absent or `null`.
    #[error("amount is required")]
    Missing,
    /// The amount was not a whole number.
    #[error("amount must be a whole number")]
    NotAnInteger,
    /// The amount was zero or negative.
    #[error("amount must be positive")]
    NotPositive,
}

/// A strictly positive number of points to credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PointsAmount(u64);

impl PointsAmount {
    /// Validate a raw integer amount.
    pub fn new(value: i64) -> Result<Self, PointsAmountError> {
        match u64::try_from(value) {
            Ok(0) | Err(_) => Err(PointsAmountError::NotPositive),
            Ok(positive) => Ok(Self(positive)),
        }
    }

    /// Validate an amount taken from a JSON body.
    ///
    /// Strings, booleans, fractions, zero, and negatives are rejected.
    ///
    /// # Examples
    /// ```
    /// use kabadiyo::domain::PointsAmount;
    /// use serde_json::json;
    ///
    /// assert!(PointsAmount::from_json(Some(&json!(25))).is_ok());
    /// assert!(PointsAmount::from_json(Some(&json!(-5))).is_err());
    /// assert!(PointsAmount::from_json(Some(&json!("25"))).is_err());
    /// ```
    pub fn from_json(value: Option<&Value>) -> Result<Self, PointsAmountError> {
        let value = match value {
            None | Some(Value::Null) => return Err(PointsAmountError::Missing),
            Some(value) => value,
        };
        let Value::Number(number) = value else {
            return Err(PointsAmountError::NotAnInteger);
        };
        if let Some(positive) = number.as_u64() {
            return if positive == 0 {
                Err(PointsAmountError::NotPositive)
            } else {
                Ok(Self(positive))
            };
        }
        if number.as_i64().is_some() {
            return Err(PointsAmountError::NotPositive);
        }
        match number.as_f64() {
            Some(float) if float <= 0.0 => Err(PointsAmountError::NotPositive),
            _ => Err(PointsAmountError::NotAnInteger),
        }
    }

    /// Raw value.
    pub const fn value(self) -> u64 {
        self.0
    }
}

/// Qualifying events that earn points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AwardReason {
    OrderCompleted,
    Referral,
    Signup,
}

impl AwardReason {
    /// Parse an event name. Unrecognised names yield `None`.
    ///
    /// # Examples
    /// ```
    /// use kabadiyo::domain::AwardReason;
    ///
    /// assert_eq!(AwardReason::parse("ORDER_COMPLETED"), Some(AwardReason::OrderCompleted));
    /// assert_eq!(AwardReason::parse("Referral"), Some(AwardReason::Referral));
    /// assert_eq!(AwardReason::parse("BIRTHDAY"), None);
    /// ```
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "ORDER_COMPLETED" => Some(Self::OrderCompleted),
            "REFERRAL" | "Referral" => Some(Self::Referral),
            "SIGNUP" | "Signup" => Some(Self::Signup),
            _ => None,
        }
    }

    /// Points granted for the event.
    pub const fn points(self) -> Points {
        match self {
            Self::OrderCompleted => Points(100),
            Self::Referral => Points(50),
            Self::Signup => Points(0),
        }
    }

    /// Canonical event name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OrderCompleted => "ORDER_COMPLETED",
            Self::Referral => "REFERRAL",
            Self::Signup => "SIGNUP",
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(0, "0")]
    #[case(999, "999")]
    #[case(1_000, "1,000")]
    #[case(99_999, "99,999")]
    #[case(100_000, "100,000")]
    #[case(1_234_567, "1,234,567")]
    fn grouped_formatting(#[case] raw: u64, #[case] expected: &str) {
        assert_eq!(Points::new(raw).grouped(), expected);
    }

    #[rstest]
    #[case(json!(1), Ok(1))]
    #[case(json!(250), Ok(250))]
    #[case(json!(0), Err(PointsAmountError::NotPositive))]
    #[case(json!(-5), Err(PointsAmountError::NotPositive))]
    #[case(json!(-0.5), Err(PointsAmountError::NotPositive))]
    #[case(json!(2.5), Err(PointsAmountError::NotAnInteger))]
    #[case(json!("10"), Err(PointsAmountError::NotAnInteger))]
    #[case(json!(true), Err(PointsAmountError::NotAnInteger))]
    #[case(Value::Null, Err(PointsAmountError::Missing))]
    fn amount_from_json(#[case] raw: Value, #[case] expected: Result<u64, PointsAmountError>) {
        let parsed = PointsAmount::from_json(Some(&raw)).map(PointsAmount::value);
        assert_eq!(parsed, expected);
    }

    #[rstest]
    fn absent_amount_is_missing() {
        assert_eq!(
            PointsAmount::from_json(None),
            Err(PointsAmountError::Missing)
        );
    }

    #[rstest]
    #[case(-5)]
    #[case(0)]
    fn non_positive_integers_are_rejected(#[case] raw: i64) {
        assert_eq!(PointsAmount::new(raw), Err(PointsAmountError::NotPositive));
    }

    #[rstest]
    #[case("ORDER_COMPLETED", Some(100))]
    #[case("Referral", Some(50))]
    #[case("REFERRAL", Some(50))]
    #[case("Signup", Some(0))]
    #[case("order_completed", None)]
    #[case("", None)]
    fn award_reasons_map_to_fixed_amounts(#[case] raw: &str, #[case] expected: Option<u64>) {
        let awarded = AwardReason::parse(raw).map(|reason| reason.points().value());
        assert_eq!(awarded, expected);
    }

    #[rstest]
    fn threshold_constants() {
        assert_eq!(REDEEM_THRESHOLD.grouped(), "100,000");
        assert_eq!(REDEEM_VALUE_INR, 2_000);
    }
}
