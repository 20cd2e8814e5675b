//! Reward catalog endpoints.
//!
//! ```text
//! GET  /api/v1/rewards
//! POST /api/v1/rewards/{rewardId}/redeem
//! ```

use actix_web::{get, post, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::Reward;
use crate::domain::ports::RewardRedeemed;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, RewardSchema};
use crate::inbound::http::session::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_reward_id};

const REWARD_ID: FieldName = FieldName::new("rewardId");

/// Confirmation message shown after a catalog redemption.
pub const REWARD_REDEEMED_MESSAGE: &str = "Reward Redeemed! Admin will contact you.";

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RewardRedeemedResponse {
    pub success: bool,
    #[schema(example = "Reward Redeemed! Admin will contact you.")]
    pub message: String,
    #[schema(format = Uuid)]
    pub redemption_id: String,
    pub remaining_points: u64,
}

impl From<RewardRedeemed> for RewardRedeemedResponse {
    fn from(redeemed: RewardRedeemed) -> Self {
        Self {
            success: true,
            message: REWARD_REDEEMED_MESSAGE.to_owned(),
            redemption_id: redeemed.redemption_id.to_string(),
            remaining_points: redeemed.remaining.value(),
        }
    }
}

/// Active rewards, cheapest first.
#[utoipa::path(
    get,
    path = "/api/v1/rewards",
    responses(
        (status = 200, description = "Active catalog", body = [RewardSchema]),
        (status = 503, description = "Ledger unavailable", body = ErrorSchema)
    ),
    tags = ["rewards"],
    operation_id = "listRewards",
    security([])
)]
#[get("/rewards")]
pub async fn list_rewards(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<Reward>>> {
    let rewards = state.rewards.active_rewards().await?;
    Ok(web::Json(rewards))
}

/// Spend a reward's cost and queue it for fulfilment.
#[utoipa::path(
    post,
    path = "/api/v1/rewards/{rewardId}/redeem",
    params(("rewardId" = String, Path, description = "Catalog reward id", format = Uuid)),
    responses(
        (status = 200, description = "Reward redeemed", body = RewardRedeemedResponse),
        (status = 400, description = "Insufficient points or malformed id", body = ErrorSchema),
        (status = 401, description = "No session", body = ErrorSchema),
        (status = 404, description = "Unknown or inactive reward", body = ErrorSchema)
    ),
    tags = ["rewards"],
    operation_id = "redeemReward"
)]
#[post("/rewards/{reward_id}/redeem")]
pub async fn redeem_reward(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<RewardRedeemedResponse>> {
    let user_id = user.into_inner();
    let reward_id = parse_reward_id(&path.into_inner(), REWARD_ID)?;
    let redeemed = state
        .points_command
        .redeem_reward(&user_id, &reward_id)
        .await?;
    Ok(web::Json(redeemed.into()))
}
