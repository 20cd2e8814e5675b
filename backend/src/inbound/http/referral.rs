//! Referral endpoints.
//!
//! ```text
//! GET  /api/v1/referral
//! POST /api/v1/referral  {"referralCode":"KBD66AFA6","newUserId":"…"}
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ReferralApplied, ReferralInfo};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_user_id, require_text};

const REFERRAL_CODE: FieldName = FieldName::new("referralCode");
const NEW_USER_ID: FieldName = FieldName::new("newUserId");

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReferralStatsResponse {
    pub total_referrals: u64,
    pub successful_referrals: u64,
    pub pending_referrals: u64,
    pub total_earned: u64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReferralRewardsResponse {
    #[schema(example = 2000)]
    pub per_referral: u64,
    #[schema(example = 100_000)]
    pub min_threshold: u64,
    #[schema(example = 2000)]
    pub redeem_value: u64,
}

/// Share material for the caller's referral code.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReferralInfoResponse {
    #[schema(example = "KBD66AFA6")]
    pub referral_code: String,
    pub share_url: String,
    pub share_text: String,
    pub stats: ReferralStatsResponse,
    pub rewards: ReferralRewardsResponse,
}

impl From<ReferralInfo> for ReferralInfoResponse {
    fn from(info: ReferralInfo) -> Self {
        Self {
            referral_code: info.code.to_string(),
            share_url: info.share_url,
            share_text: info.share_text,
            stats: ReferralStatsResponse {
                total_referrals: info.stats.total_referrals,
                successful_referrals: info.stats.successful_referrals,
                pending_referrals: info.stats.pending_referrals,
                total_earned: info.stats.total_earned.value(),
            },
            rewards: ReferralRewardsResponse {
                per_referral: info.schedule.per_referral.value(),
                min_threshold: info.schedule.min_threshold.value(),
                redeem_value: info.schedule.redeem_value,
            },
        }
    }
}

/// Request body for `POST /api/v1/referral`.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyReferralRequest {
    #[schema(example = "KBD66AFA6")]
    pub referral_code: Option<String>,
    #[schema(value_type = Option<String>, format = Uuid)]
    pub new_user_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyReferralResponse {
    pub success: bool,
    #[schema(example = "Referral applied! Both users received bonus points.")]
    pub message: String,
    pub referrer_bonus: u64,
    pub new_user_bonus: u64,
}

impl From<ReferralApplied> for ApplyReferralResponse {
    fn from(applied: ReferralApplied) -> Self {
        Self {
            success: true,
            message: "Referral applied! Both users received bonus points.".to_owned(),
            referrer_bonus: applied.referrer_bonus.value(),
            new_user_bonus: applied.new_user_bonus.value(),
        }
    }
}

/// The caller's referral code and bonus schedule.
#[utoipa::path(
    get,
    path = "/api/v1/referral",
    responses(
        (status = 200, description = "Referral summary", body = ReferralInfoResponse),
        (status = 401, description = "No session", body = ErrorSchema),
        (status = 404, description = "Account not found", body = ErrorSchema)
    ),
    tags = ["referral"],
    operation_id = "getReferral"
)]
#[get("/referral")]
pub async fn get_referral(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<ReferralInfoResponse>> {
    let user_id = user.into_inner();
    let info = state.referrals.referral_info(&user_id).await?;
    Ok(web::Json(info.into()))
}

/// Apply a referral code on behalf of a newly registered user.
///
/// Open to unauthenticated callers because registration runs before a
/// session exists.
#[utoipa::path(
    post,
    path = "/api/v1/referral",
    request_body = ApplyReferralRequest,
    responses(
        (status = 200, description = "Bonuses credited", body = ApplyReferralResponse),
        (status = 400, description = "Missing field or invalid code", body = ErrorSchema),
        (status = 503, description = "Ledger unavailable", body = ErrorSchema)
    ),
    tags = ["referral"],
    operation_id = "applyReferral",
    security([])
)]
#[post("/referral")]
pub async fn apply_referral(
    state: web::Data<HttpState>,
    payload: web::Json<ApplyReferralRequest>,
) -> ApiResult<web::Json<ApplyReferralResponse>> {
    let ApplyReferralRequest {
        referral_code,
        new_user_id,
    } = payload.into_inner();
    let referral_code = require_text(referral_code, REFERRAL_CODE)?;
    let new_user_id = require_text(new_user_id, NEW_USER_ID)?;
    let new_user = parse_user_id(&new_user_id, NEW_USER_ID)?;
    let applied = state
        .referrals
        .apply_referral(&referral_code, &new_user)
        .await?;
    Ok(web::Json(applied.into()))
}

#[cfg(test)]
mod tests {
    //! Handler coverage against the in-memory ledger.
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test, web};
    use rstest::rstest;
    use serde_json::{Value, json};

    use super::*;
    use crate::domain::ports::{LedgerRepository, MockReferralCommand};
    use crate::domain::{Account, PhoneNumber, Points, UserId};
    use crate::inbound::http::test_utils::{login_cookie, memory_state, test_session_middleware};
    use crate::inbound::http::users::login;
    use crate::outbound::memory::InMemoryLedgerRepository;

    const REFERRER_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
    const NEW_USER: &str = "9b2d7c1e-4f0a-4e6b-8d3c-5a1f2e3d4c5b";

    fn test_app(
        state: HttpState,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(state))
            .wrap(test_session_middleware())
            .service(
                web::scope("/api/v1")
                    .service(login)
                    .service(get_referral)
                    .service(apply_referral),
            )
    }

    async fn put_user(repository: &InMemoryLedgerRepository, id: &str, phone: &str) -> UserId {
        let id = UserId::new(id).expect("valid id");
        let phone = PhoneNumber::new(phone).expect("valid phone");
        repository
            .put_account(Account::new(id.clone(), "Neighbour", phone))
            .await;
        id
    }

    async fn points_of(repository: &InMemoryLedgerRepository, id: &UserId) -> Points {
        repository
            .find_account(id)
            .await
            .expect("lookup")
            .map_or(Points::ZERO, |account| account.points)
    }

    #[rstest]
    #[actix_web::test]
    async fn summary_describes_the_callers_code() {
        let (state, _) = memory_state();
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = login_cookie(&app).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/referral")
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["referralCode"], "KBD174000");
        assert_eq!(
            body["shareUrl"],
            "https://kabadiyo.com/register?ref=KBD174000"
        );
        assert_eq!(
            body["stats"],
            json!({
                "totalReferrals": 0,
                "successfulReferrals": 0,
                "pendingReferrals": 0,
                "totalEarned": 0,
            })
        );
        assert_eq!(
            body["rewards"],
            json!({"perReferral": 2000, "minThreshold": 100_000, "redeemValue": 2000})
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn summary_requires_a_session() {
        let (mut state, _) = memory_state();
        let mut referrals = MockReferralCommand::new();
        referrals.expect_referral_info().never();
        state.referrals = Arc::new(referrals);
        let app = actix_test::init_service(test_app(state)).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/api/v1/referral").to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[actix_web::test]
    async fn applying_a_code_credits_both_users() {
        let (state, repository) = memory_state();
        let referrer = put_user(&repository, REFERRER_ID, "9876543210").await;
        let new_user = put_user(&repository, NEW_USER, "9123456780").await;
        let app = actix_test::init_service(test_app(state)).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/referral")
                .set_json(json!({"referralCode": "kbd66afa6", "newUserId": NEW_USER}))
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(
            body,
            json!({
                "success": true,
                "message": "Referral applied! Both users received bonus points.",
                "referrerBonus": 2000,
                "newUserBonus": 500,
            })
        );
        assert_eq!(points_of(&repository, &referrer).await, Points::new(2_000));
        assert_eq!(points_of(&repository, &new_user).await, Points::new(500));
    }

    #[rstest]
    #[case::missing_code(json!({"newUserId": NEW_USER}), "referralCode")]
    #[case::blank_code(json!({"referralCode": " ", "newUserId": NEW_USER}), "referralCode")]
    #[case::missing_user(json!({"referralCode": "KBD66AFA6"}), "newUserId")]
    #[case::malformed_user(json!({"referralCode": "KBD66AFA6", "newUserId": "nope"}), "newUserId")]
    #[actix_web::test]
    async fn incomplete_requests_are_rejected(#[case] payload: Value, #[case] field: &str) {
        let (mut state, _) = memory_state();
        let mut referrals = MockReferralCommand::new();
        referrals.expect_apply_referral().never();
        state.referrals = Arc::new(referrals);
        let app = actix_test::init_service(test_app(state)).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/referral")
                .set_json(payload)
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["details"]["field"], field);
    }

    #[rstest]
    #[actix_web::test]
    async fn unknown_code_leaves_balances_alone() {
        let (state, repository) = memory_state();
        let new_user = put_user(&repository, NEW_USER, "9123456780").await;
        let app = actix_test::init_service(test_app(state)).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/referral")
                .set_json(json!({"referralCode": "KBD000000", "newUserId": NEW_USER}))
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["error"], "Invalid referral code");
        assert_eq!(points_of(&repository, &new_user).await, Points::ZERO);
    }
}
