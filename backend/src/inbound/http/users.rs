//! Account and session endpoints.
//!
//! ```text
//! POST /api/v1/register {"name":"Asha","phone":"9876543210","password":"s3cret!"}
//! POST /api/v1/login    {"phone":"9876543210","password":"s3cret!"}
//! POST /api/v1/logout
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{
    Account, Error, LoginCredentials, LoginValidationError, Registration,
    RegistrationValidationError, UserRole,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Login request body for `POST /api/v1/login`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "9876543210")]
    pub phone: String,
    #[schema(example = "s3cret!")]
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.phone, &value.password)
    }
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::InvalidPhone => {
            Error::invalid_request("phone must be a valid phone number")
                .with_details(json!({ "field": "phone", "code": "invalid_phone" }))
        }
        LoginValidationError::EmptyPassword => Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password", "code": "empty_password" })),
    }
}

/// Sign-up request body for `POST /api/v1/register`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[schema(example = "Asha Devi")]
    pub name: String,
    #[schema(example = "9876543210")]
    pub phone: String,
    #[schema(example = "s3cret!", min_length = 6)]
    pub password: String,
}

/// Public view of a freshly registered account.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredUser {
    #[schema(format = Uuid)]
    pub id: String,
    pub name: String,
    #[schema(value_type = String, example = "USER")]
    pub role: UserRole,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub success: bool,
    pub user: RegisteredUser,
}

impl From<Account> for RegisterResponse {
    fn from(account: Account) -> Self {
        Self {
            success: true,
            user: RegisteredUser {
                id: account.id.to_string(),
                name: account.name,
                role: account.role,
            },
        }
    }
}

fn map_registration_error(err: RegistrationValidationError) -> Error {
    let (field, code) = match err {
        RegistrationValidationError::EmptyName => ("name", "empty_name"),
        RegistrationValidationError::InvalidPhone => ("phone", "invalid_phone"),
        RegistrationValidationError::ShortPassword => ("password", "short_password"),
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field, "code": code }))
}

/// Create an account. The caller logs in separately afterwards.
#[utoipa::path(
    post,
    path = "/api/v1/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Invalid fields or phone already registered", body = ErrorSchema),
        (status = 503, description = "Ledger unavailable", body = ErrorSchema)
    ),
    tags = ["session"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let RegisterRequest {
        name,
        phone,
        password,
    } = payload.into_inner();
    let registration =
        Registration::try_from_parts(&name, &phone, &password).map_err(map_registration_error)?;
    let account = state.login.register(&registration).await?;
    Ok(HttpResponse::Created().json(RegisterResponse::from(account)))
}

/// Authenticate and establish a cookie session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 503, description = "Ledger unavailable", body = ErrorSchema)
    ),
    tags = ["session"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let user_id = state.login.authenticate(&credentials).await?;
    session.sign_in(&user_id)?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "userId": user_id })))
}

/// Drop the caller's session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["session"],
    operation_id = "logout",
    security([])
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.sign_out();
    HttpResponse::NoContent().finish()
}
