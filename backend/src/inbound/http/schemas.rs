//! OpenAPI schema definitions for domain types.
//!
//! Domain types stay framework-agnostic and do not derive `ToSchema`; these
//! wrappers mirror their serialised shape for the generated document.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// No valid session.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// The referenced user or reward does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The balance does not cover the requested spend.
    #[schema(rename = "insufficient_funds")]
    InsufficientFunds,
    /// A backing service is temporarily unavailable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Human-readable message returned to clients.
    #[schema(example = "Need 100,000 points to redeem. You have 42,000.")]
    error: String,
    /// Stable machine-readable error code.
    #[schema(example = "insufficient_funds")]
    code: ErrorCodeSchema,
    /// Correlation identifier, also sent in the `trace-id` header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary error details.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::Reward`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Reward)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct RewardSchema {
    #[schema(value_type = String, format = Uuid)]
    id: String,
    #[schema(example = "Plant a Tree")]
    title: String,
    description: String,
    /// Price in points.
    #[schema(example = 200)]
    cost: u64,
    is_active: bool,
}
