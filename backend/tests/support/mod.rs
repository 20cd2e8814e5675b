//! Shared wiring for HTTP integration tests.
//!
//! Builds the same `/api/v1` scope the server mounts, backed by an in-memory
//! ledger, with a throwaway session key and plain-HTTP cookies. Accounts are
//! created through `POST /api/v1/register` like real users.

use std::sync::Arc;

use actix_session::SessionMiddleware;
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::{Cookie, Key};
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::middleware::from_fn;
use actix_web::{App, test, web};
use mockable::DefaultClock;
use serde_json::json;

use kabadiyo::trace_requests;
use kabadiyo::domain::{LedgerLoginService, PointsLedgerService};
use kabadiyo::inbound::http::json_config;
use kabadiyo::inbound::http::points::{add_points, award_points, get_points, redeem_points};
use kabadiyo::inbound::http::referral::{apply_referral, get_referral};
use kabadiyo::inbound::http::rewards::{list_rewards, redeem_reward};
use kabadiyo::inbound::http::session::SESSION_COOKIE_NAME;
use kabadiyo::inbound::http::state::HttpState;
use kabadiyo::inbound::http::users::{login, logout, register};
use kabadiyo::outbound::memory::InMemoryLedgerRepository;

/// Fresh in-memory ledger seeded with the default catalog.
pub fn ledger() -> Arc<InMemoryLedgerRepository> {
    Arc::new(InMemoryLedgerRepository::with_default_catalog())
}

/// Application mounting every ledger endpoint over `repository`.
pub fn ledger_app(
    repository: Arc<InMemoryLedgerRepository>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let service = Arc::new(PointsLedgerService::new(
        Arc::clone(&repository),
        Arc::new(DefaultClock),
    ));
    let state = HttpState::for_ledger(service, Arc::new(LedgerLoginService::new(repository)));
    let session = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name(SESSION_COOKIE_NAME.to_owned())
        .cookie_secure(false)
        .build();

    App::new()
        .app_data(web::Data::new(state))
        .wrap(from_fn(trace_requests))
        .service(
            web::scope("/api/v1")
                .wrap(session)
                .app_data(json_config())
                .service(register)
                .service(login)
                .service(logout)
                .service(get_points)
                .service(add_points)
                .service(award_points)
                .service(redeem_points)
                .service(list_rewards)
                .service(redeem_reward)
                .service(get_referral)
                .service(apply_referral),
        )
}

/// Phone number of the account created by [`login_cookie`].
pub const SELLER_PHONE: &str = "9876543210";
const SELLER_PASSWORD: &str = "s3cret!";

/// Register an account and return its id.
pub async fn register_account<S, B>(app: &S, name: &str, phone: &str, password: &str) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: actix_web::body::MessageBody,
{
    let request = test::TestRequest::post()
        .uri("/api/v1/register")
        .set_json(json!({ "name": name, "phone": phone, "password": password }))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(app, request).await;
    body["user"]["id"]
        .as_str()
        .expect("registration returns the account id")
        .to_owned()
}

/// Log in and return the session cookie.
pub async fn login_as<S, B>(app: &S, phone: &str, password: &str) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: actix_web::body::MessageBody,
{
    let request = test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({ "phone": phone, "password": password }))
        .to_request();
    let response = test::call_service(app, request).await;
    assert!(response.status().is_success(), "login should succeed");
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .expect("session cookie set")
        .into_owned()
}

/// Register a seller account, log in as it, and return the session cookie.
pub async fn login_cookie<S, B>(app: &S) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: actix_web::body::MessageBody,
{
    register_account(app, "Asha", SELLER_PHONE, SELLER_PASSWORD).await;
    login_as(app, SELLER_PHONE, SELLER_PASSWORD).await
}
