//! Reward catalog entries and redemption records.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Points, UserId};

/// Validation error for catalog identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} id must be a valid UUID")]
pub struct InvalidIdError {
    kind: &'static str,
}

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Parse an identifier from its string form.
            pub fn parse(raw: &str) -> Result<Self, InvalidIdError> {
                Uuid::parse_str(raw.trim())
                    .map(Self)
                    .map_err(|_| InvalidIdError { kind: $kind })
            }

            /// Generate a fresh identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Access the underlying UUID.
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(
    /// Catalog reward identifier.
    RewardId,
    "reward"
);
uuid_id!(
    /// Redemption record identifier.
    RedemptionId,
    "redemption"
);

/// A catalog reward priced in points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    pub id: RewardId,
    pub title: String,
    pub description: String,
    pub cost: Points,
    pub is_active: bool,
}

impl Reward {
    /// Build an active reward with a fresh identifier.
    pub fn new(title: impl Into<String>, description: impl Into<String>, cost: Points) -> Self {
        Self {
            id: RewardId::random(),
            title: title.into(),
            description: description.into(),
            cost,
            is_active: true,
        }
    }
}

/// The catalog installed by `seed-rewards` and the in-memory ledger.
pub fn default_catalog() -> Vec<Reward> {
    vec![
        Reward::new(
            "Free Pickup Priority",
            "Get priority pickup within 2 hours for your next order",
            Points::new(150),
        ),
        Reward::new(
            "Plant a Tree",
            "We'll plant a tree in your name and send you the certificate",
            Points::new(200),
        ),
        Reward::new(
            "Premium T-Shirt",
            "Get a limited edition Kabadiwala eco-warrior T-shirt",
            Points::new(500),
        ),
    ]
}

/// Lifecycle state of a redemption. The ledger only ever writes `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RedemptionStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl RedemptionStatus {
    /// Stable storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }
}

/// A committed claim against the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redemption {
    pub id: RedemptionId,
    pub user_id: UserId,
    pub reward_id: Option<RewardId>,
    pub points_spent: Points,
    pub status: RedemptionStatus,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn default_catalog_is_active_and_priced() {
        let catalog = default_catalog();
        let costs: Vec<u64> = catalog.iter().map(|reward| reward.cost.value()).collect();
        assert_eq!(costs, vec![150, 200, 500]);
        assert!(catalog.iter().all(|reward| reward.is_active));
    }

    #[rstest]
    fn reward_id_rejects_garbage() {
        let err = RewardId::parse("plant-a-tree").expect_err("invalid id");
        assert_eq!(err.to_string(), "reward id must be a valid UUID");
    }

    #[rstest]
    fn redemption_status_defaults_to_pending() {
        assert_eq!(RedemptionStatus::default().as_str(), "PENDING");
    }
}
