//! Points balance and redemption endpoints.
//!
//! ```text
//! GET  /api/v1/points
//! POST /api/v1/points          {"amount":25,"reason":"bonus"}
//! POST /api/v1/points/award    {"reason":"ORDER_COMPLETED"}
//! POST /api/v1/points/redeem   {"rewardId":"…","service":"Doorstep pickup"}
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::PointsAmount;
use crate::domain::ports::{
    AwardOutcome, BalanceSummary, PointsAdded, ThresholdRedeemed, ThresholdRedemptionRequest,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_amount_error, missing_field_error, parse_reward_id,
};

const AMOUNT: FieldName = FieldName::new("amount");
const REASON: FieldName = FieldName::new("reason");
const REWARD_ID: FieldName = FieldName::new("rewardId");

/// Balance summary returned by `GET /api/v1/points`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    #[schema(example = 120_000)]
    pub points: u64,
    #[schema(example = "Demo Seller")]
    pub name: String,
    /// Whether the balance reaches the fixed redemption threshold.
    pub can_redeem: bool,
    /// Rupee value of one threshold redemption.
    #[schema(example = 2000)]
    pub redeem_value: u64,
}

impl From<BalanceSummary> for BalanceResponse {
    fn from(summary: BalanceSummary) -> Self {
        Self {
            points: summary.points.value(),
            name: summary.name.unwrap_or_default(),
            can_redeem: summary.can_redeem,
            redeem_value: summary.redeem_value,
        }
    }
}

/// Request body for `POST /api/v1/points`.
///
/// `amount` stays untyped so that missing and non-numeric values surface as
/// the same `Invalid amount` error rather than a framework parse failure.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AddPointsRequest {
    #[schema(value_type = Option<u64>, example = 25)]
    pub amount: Option<Value>,
    #[schema(example = "bonus")]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddPointsResponse {
    pub success: bool,
    pub new_balance: u64,
    pub added: u64,
    pub reason: Option<String>,
}

impl From<PointsAdded> for AddPointsResponse {
    fn from(added: PointsAdded) -> Self {
        Self {
            success: true,
            new_balance: added.new_balance.value(),
            added: added.added.value(),
            reason: added.reason,
        }
    }
}

/// Request body for `POST /api/v1/points/award`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AwardRequest {
    #[schema(example = "ORDER_COMPLETED")]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AwardResponse {
    /// False when the reason is unknown or earns nothing.
    pub awarded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_balance: Option<u64>,
}

impl From<AwardOutcome> for AwardResponse {
    fn from(outcome: AwardOutcome) -> Self {
        match outcome {
            AwardOutcome::Awarded {
                reason,
                amount,
                new_balance,
            } => Self {
                awarded: true,
                reason: Some(reason.as_str().to_owned()),
                amount: Some(amount.value()),
                new_balance: Some(new_balance.value()),
            },
            AwardOutcome::Ignored => Self {
                awarded: false,
                reason: None,
                amount: None,
                new_balance: None,
            },
        }
    }
}

/// Request body for `POST /api/v1/points/redeem`.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RedeemRequest {
    /// Catalog reward to attach a PENDING redemption to.
    #[schema(value_type = Option<String>, format = Uuid)]
    pub reward_id: Option<String>,
    /// Label for the claimed service; defaults to "local service".
    pub service: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserDetails {
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RedeemResponse {
    pub success: bool,
    #[schema(example = "Congratulations! You've redeemed ₹2000 worth of local service!")]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redemption_id: Option<String>,
    pub remaining_points: u64,
    pub user_details: UserDetails,
}

impl From<ThresholdRedeemed> for RedeemResponse {
    fn from(redeemed: ThresholdRedeemed) -> Self {
        Self {
            success: true,
            message: redeemed.message,
            redemption_id: redeemed.redemption_id.map(|id| id.to_string()),
            remaining_points: redeemed.remaining.value(),
            user_details: UserDetails {
                name: redeemed.name,
                phone: redeemed.phone.into(),
            },
        }
    }
}

/// Current balance for the signed-in user.
#[utoipa::path(
    get,
    path = "/api/v1/points",
    responses(
        (status = 200, description = "Balance", body = BalanceResponse),
        (status = 401, description = "No session", body = ErrorSchema),
        (status = 503, description = "Ledger unavailable", body = ErrorSchema)
    ),
    tags = ["points"],
    operation_id = "getPoints"
)]
#[get("/points")]
pub async fn get_points(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<BalanceResponse>> {
    let user_id = user.into_inner();
    let summary = state.points_query.summary(&user_id).await?;
    Ok(web::Json(summary.into()))
}

/// Credit a positive amount.
#[utoipa::path(
    post,
    path = "/api/v1/points",
    request_body = AddPointsRequest,
    responses(
        (status = 200, description = "Points added", body = AddPointsResponse),
        (status = 400, description = "Invalid amount", body = ErrorSchema),
        (status = 401, description = "No session", body = ErrorSchema),
        (status = 404, description = "Unknown user", body = ErrorSchema)
    ),
    tags = ["points"],
    operation_id = "addPoints"
)]
#[post("/points")]
pub async fn add_points(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<AddPointsRequest>,
) -> ApiResult<web::Json<AddPointsResponse>> {
    let user_id = user.into_inner();
    let AddPointsRequest { amount, reason } = payload.into_inner();
    let amount = PointsAmount::from_json(amount.as_ref())
        .map_err(|err| invalid_amount_error(AMOUNT, &err))?;
    let added = state.points_command.add(&user_id, amount, reason).await?;
    Ok(web::Json(added.into()))
}

/// Credit the fixed amount for a qualifying event.
#[utoipa::path(
    post,
    path = "/api/v1/points/award",
    request_body = AwardRequest,
    responses(
        (status = 200, description = "Award evaluated", body = AwardResponse),
        (status = 400, description = "Missing reason", body = ErrorSchema),
        (status = 401, description = "No session", body = ErrorSchema),
        (status = 404, description = "Unknown user", body = ErrorSchema)
    ),
    tags = ["points"],
    operation_id = "awardPoints"
)]
#[post("/points/award")]
pub async fn award_points(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<AwardRequest>,
) -> ApiResult<web::Json<AwardResponse>> {
    let user_id = user.into_inner();
    let reason = payload
        .into_inner()
        .reason
        .ok_or_else(|| missing_field_error(REASON))?;
    let outcome = state.points_command.award(&user_id, &reason).await?;
    Ok(web::Json(outcome.into()))
}

/// Spend the fixed threshold for a ₹2000 service.
#[utoipa::path(
    post,
    path = "/api/v1/points/redeem",
    request_body = RedeemRequest,
    responses(
        (status = 200, description = "Redeemed", body = RedeemResponse),
        (status = 400, description = "Insufficient points", body = ErrorSchema),
        (status = 401, description = "No session", body = ErrorSchema),
        (status = 404, description = "Unknown reward", body = ErrorSchema)
    ),
    tags = ["points"],
    operation_id = "redeemPoints"
)]
#[post("/points/redeem")]
pub async fn redeem_points(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<RedeemRequest>,
) -> ApiResult<web::Json<RedeemResponse>> {
    let user_id = user.into_inner();
    let RedeemRequest { reward_id, service } = payload.into_inner();
    let reward_id = reward_id
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| parse_reward_id(raw, REWARD_ID))
        .transpose()?;
    let redeemed = state
        .points_command
        .redeem_fixed_threshold(ThresholdRedemptionRequest {
            user_id,
            reward_id,
            service,
        })
        .await?;
    Ok(web::Json(redeemed.into()))
}

#[cfg(test)]
#[path = "points_tests.rs"]
mod tests;
