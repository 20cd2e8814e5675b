//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::build_http_state;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::body::MessageBody;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::middleware::from_fn;
use actix_web::{App, HttpServer, web};

#[cfg(debug_assertions)]
use kabadiyo::doc::ApiDoc;
use kabadiyo::trace_requests;
use kabadiyo::inbound::http::health::{HealthState, live, ready};
use kabadiyo::inbound::http::json_config;
use kabadiyo::inbound::http::points::{add_points, award_points, get_points, redeem_points};
use kabadiyo::inbound::http::referral::{apply_referral, get_referral};
use kabadiyo::inbound::http::rewards::{list_rewards, redeem_reward};
use kabadiyo::inbound::http::session::SESSION_COOKIE_NAME;
use kabadiyo::inbound::http::session_config::SessionSettings;
use kabadiyo::inbound::http::state::HttpState;
use kabadiyo::inbound::http::users::{login, logout, register};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name(SESSION_COOKIE_NAME.into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();

    let api = web::scope("/api/v1")
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
        .service(apply_referral);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(from_fn(trace_requests))
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Build the health state reported by health checks for this configuration.
pub fn health_state_for(config: &ServerConfig) -> web::Data<HealthState> {
    web::Data::new(HealthState::new(config.ledger.name()))
}

/// Construct the Actix HTTP server.
///
/// Readiness is marked once the listener is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let backend = config.ledger.name();
    let http_state = web::Data::new(build_http_state(&config.ledger));
    let ServerConfig {
        session,
        bind_addr,
        ledger: _,
    } = config;
    let SessionSettings {
        key,
        cookie_secure,
        same_site,
    } = session;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    tracing::info!(%bind_addr, ledger = backend, "listening");
    health_state.mark_ready();
    Ok(server)
}
