//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint in the inbound layer, the schema
//! wrappers that describe domain types without coupling them to utoipa, and
//! the session cookie security scheme.
//!
//! The document is served by Swagger UI in debug builds and exported via
//! `cargo run --bin openapi-dump` for client generation.

use crate::inbound::http::points::{
    AddPointsRequest, AddPointsResponse, AwardRequest, AwardResponse, BalanceResponse,
    RedeemRequest, RedeemResponse, UserDetails,
};
use crate::inbound::http::referral::{
    ApplyReferralRequest, ApplyReferralResponse, ReferralInfoResponse, ReferralRewardsResponse,
    ReferralStatsResponse,
};
use crate::inbound::http::rewards::RewardRedeemedResponse;
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema, RewardSchema};
use crate::inbound::http::users::{
    LoginRequest, RegisterRequest, RegisterResponse, RegisteredUser,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the points ledger API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Kabadiyo points ledger API",
        description = "Loyalty balances, reward redemption, and referral bonuses for scrap sellers."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::points::get_points,
        crate::inbound::http::points::add_points,
        crate::inbound::http::points::award_points,
        crate::inbound::http::points::redeem_points,
        crate::inbound::http::rewards::list_rewards,
        crate::inbound::http::rewards::redeem_reward,
        crate::inbound::http::referral::get_referral,
        crate::inbound::http::referral::apply_referral,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        RewardSchema,
        LoginRequest,
        RegisterRequest,
        RegisterResponse,
        RegisteredUser,
        BalanceResponse,
        AddPointsRequest,
        AddPointsResponse,
        AwardRequest,
        AwardResponse,
        RedeemRequest,
        RedeemResponse,
        UserDetails,
        RewardRedeemedResponse,
        ReferralInfoResponse,
        ReferralStatsResponse,
        ReferralRewardsResponse,
        ApplyReferralRequest,
        ApplyReferralResponse,
    )),
    tags(
        (name = "session", description = "Sign-up, login and logout"),
        (name = "points", description = "Balances, credits, and threshold redemption"),
        (name = "rewards", description = "Reward catalog and catalog redemption"),
        (name = "referral", description = "Referral codes and bonuses"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the registered paths and schema field structure.

    use super::*;
    use rstest::rstest;
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    // utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";
    const REWARD_SCHEMA_NAME: &str = "crate.domain.Reward";

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case(ERROR_SCHEMA_NAME, "error")]
    #[case(ERROR_SCHEMA_NAME, "code")]
    #[case(ERROR_SCHEMA_NAME, "traceId")]
    #[case(REWARD_SCHEMA_NAME, "isActive")]
    #[case(REWARD_SCHEMA_NAME, "cost")]
    fn wrapped_schemas_expose_wire_fields(#[case] name: &str, #[case] field: &str) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas.get(name).expect("schema registered");

        assert_object_schema_has_field(schema, field);
    }

    #[rstest]
    #[case("/api/v1/register")]
    #[case("/api/v1/login")]
    #[case("/api/v1/logout")]
    #[case("/api/v1/points")]
    #[case("/api/v1/points/award")]
    #[case("/api/v1/points/redeem")]
    #[case("/api/v1/rewards")]
    #[case("/api/v1/rewards/{rewardId}/redeem")]
    #[case("/api/v1/referral")]
    #[case("/health/ready")]
    #[case("/health/live")]
    fn every_endpoint_is_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing path {path}");
    }

    #[rstest]
    fn session_cookie_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
