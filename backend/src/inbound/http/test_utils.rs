//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::test;
use mockable::DefaultClock;

use crate::domain::{
    Account, LedgerLoginService, PasswordDigest, PhoneNumber, PointsLedgerService, UserId,
};
use crate::inbound::http::session::SESSION_COOKIE_NAME;
use crate::inbound::http::state::HttpState;
use crate::outbound::memory::InMemoryLedgerRepository;

/// Phone number of the account seeded by [`memory_state`].
pub const FIXTURE_PHONE: &str = "9999999999";
/// Password of the seeded account.
pub const FIXTURE_PASSWORD: &str = "password";
/// Identifier of the seeded account.
pub const FIXTURE_USER_ID: &str = "123e4567-e89b-12d3-a456-426614174000";
/// Display name of the seeded account.
pub const FIXTURE_NAME: &str = "Demo Seller";

/// Identifier of the seeded account as a [`UserId`].
pub fn fixture_user_id() -> UserId {
    UserId::new(FIXTURE_USER_ID).expect("fixture user id is valid")
}

/// Zero-balance seeded account.
pub fn fixture_account() -> Account {
    let phone = PhoneNumber::new(FIXTURE_PHONE).expect("fixture phone is valid");
    Account::new(fixture_user_id(), FIXTURE_NAME, phone)
}

/// Session middleware with a fresh key, cookie name `session`, and the
/// `Secure` flag off for plain-HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name(SESSION_COOKIE_NAME.to_owned())
        .cookie_secure(false)
        .build()
}

/// Handler state over an in-memory ledger seeded with the default catalog
/// and one account that can log in with the fixture credentials.
pub fn memory_state() -> (HttpState, Arc<InMemoryLedgerRepository>) {
    let digest = PasswordDigest::hash(FIXTURE_PASSWORD).expect("fixture password hashes");
    let repository = Arc::new(
        InMemoryLedgerRepository::with_default_catalog()
            .with_account(fixture_account(), Some(digest)),
    );
    let ledger = Arc::new(PointsLedgerService::new(
        Arc::clone(&repository),
        Arc::new(DefaultClock),
    ));
    let login = Arc::new(LedgerLoginService::new(Arc::clone(&repository)));
    (HttpState::for_ledger(ledger, login), repository)
}

/// Log in as the seeded account and return the session cookie.
pub async fn login_cookie<S, B>(app: &S) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: actix_web::body::MessageBody,
{
    let request = test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(serde_json::json!({
            "phone": FIXTURE_PHONE,
            "password": FIXTURE_PASSWORD,
        }))
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
