//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every helper returns an `invalid_request` domain error whose `details`
//! name the offending field and a machine-readable reason.

use serde_json::json;

use crate::domain::{Error, PointsAmountError, RewardId, UserId};

/// Validation reasons reported in `details.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reason {
    MissingField,
    InvalidUuid,
    InvalidAmount,
}

impl Reason {
    fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidUuid => "invalid_uuid",
            Self::InvalidAmount => "invalid_amount",
        }
    }
}

/// Wire name of a request field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub(crate) const fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: FieldName, message: impl Into<String>, reason: Reason) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": reason.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    field_error(
        field,
        format!("missing required field: {}", field.as_str()),
        Reason::MissingField,
    )
}

/// Map a rejected credit amount to the `"Invalid amount"` client error.
pub(crate) fn invalid_amount_error(field: FieldName, err: &PointsAmountError) -> Error {
    Error::invalid_request("Invalid amount").with_details(json!({
        "field": field.as_str(),
        "code": Reason::InvalidAmount.as_str(),
        "reason": err.to_string(),
    }))
}

fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    Error::invalid_request(format!("{} must be a valid UUID", field.as_str())).with_details(
        json!({
            "field": field.as_str(),
            "value": value,
            "code": Reason::InvalidUuid.as_str(),
        }),
    )
}

/// Require a non-blank string field.
pub(crate) fn require_text(value: Option<String>, field: FieldName) -> Result<String, Error> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(missing_field_error(field)),
    }
}

pub(crate) fn parse_reward_id(value: &str, field: FieldName) -> Result<RewardId, Error> {
    RewardId::parse(value).map_err(|_| invalid_uuid_error(field, value))
}

pub(crate) fn parse_user_id(value: &str, field: FieldName) -> Result<UserId, Error> {
    UserId::new(value).map_err(|_| invalid_uuid_error(field, value))
}
