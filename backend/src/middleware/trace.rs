//! Request correlation for the ledger API.
//!
//! Every request runs inside a [`TraceId`] scope and a `request` span. A
//! caller-supplied `trace-id` header is reused when it is a valid UUID, so a
//! client retrying a redemption can correlate both attempts; otherwise a
//! fresh id is generated. The id is echoed in the `trace-id` response header
//! and picked up by any domain error built while handling the request.

use std::time::Instant;

use actix_web::Error;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::middleware::Next;
use tracing::{Instrument, debug, error, info_span, warn};

use crate::domain::{TRACE_ID_HEADER, TraceId};

fn inbound_trace_id(req: &ServiceRequest) -> Option<TraceId> {
    req.headers()
        .get(TRACE_ID_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Trace middleware body, mounted with `actix_web::middleware::from_fn`.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use actix_web::middleware::from_fn;
/// use kabadiyo::trace_requests;
///
/// let app = App::new().wrap(from_fn(trace_requests));
/// ```
pub async fn trace_requests(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let trace_id = inbound_trace_id(&req).unwrap_or_else(TraceId::generate);
    let span = info_span!(
        "request",
        %trace_id,
        method = %req.method(),
        path = req.path(),
    );

    let handled = async move {
        let started = Instant::now();
        let mut res = next.call(req).await?;
        let status = res.status().as_u16();
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        if res.status().is_server_error() {
            warn!(status, elapsed_ms, "request failed");
        } else {
            debug!(status, elapsed_ms, "request completed");
        }

        match HeaderValue::from_str(&trace_id.to_string()) {
            Ok(value) => {
                res.headers_mut()
                    .insert(HeaderName::from_static(TRACE_ID_HEADER), value);
            }
            Err(error) => error!(%error, "trace id is not a valid header value"),
        }
        Ok::<_, Error>(res)
    };

    TraceId::scope(trace_id, handled.instrument(span)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::dev::Service;
    use actix_web::middleware::from_fn;
    use actix_web::{App, HttpResponse, test, web};
    use rstest::rstest;

    use crate::domain::Error as DomainError;

    async fn echo_trace_id() -> HttpResponse {
        match TraceId::current() {
            Some(id) => HttpResponse::Ok().body(id.to_string()),
            None => HttpResponse::InternalServerError().finish(),
        }
    }

    async fn missing_reward() -> Result<HttpResponse, DomainError> {
        Err(DomainError::not_found("Reward not found"))
    }

    fn header_of(res: &ServiceResponse) -> String {
        res.headers()
            .get(TRACE_ID_HEADER)
            .expect("trace id header")
            .to_str()
            .expect("header is ascii")
            .to_owned()
    }

    async fn call(request: test::TestRequest) -> ServiceResponse {
        let app = test::init_service(
            App::new()
                .wrap(from_fn(trace_requests))
                .route("/echo", web::get().to(echo_trace_id))
                .route("/rewards/missing", web::post().to(missing_reward)),
        )
        .await;
        app.call(request.to_request())
            .await
            .expect("service call")
            .map_into_boxed_body()
    }

    #[actix_web::test]
    async fn header_matches_the_id_seen_by_handlers() {
        let res = call(test::TestRequest::get().uri("/echo")).await;
        let trace_id = header_of(&res);
        let body = test::read_body(res).await;
        assert_eq!(std::str::from_utf8(&body).expect("utf8 body"), trace_id);
    }

    #[actix_web::test]
    async fn error_bodies_carry_the_request_trace_id() {
        let res = call(test::TestRequest::post().uri("/rewards/missing")).await;
        let trace_id = header_of(&res);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["traceId"].as_str(), Some(trace_id.as_str()));
        assert_eq!(body["error"], "Reward not found");
    }

    #[actix_web::test]
    async fn caller_trace_ids_are_reused() {
        let supplied = "7d8f5bde-0c3c-4e5a-9a43-55b3a1c1e8f2";
        let res = call(
            test::TestRequest::get()
                .uri("/echo")
                .insert_header((TRACE_ID_HEADER, supplied)),
        )
        .await;
        assert_eq!(header_of(&res), supplied);
        assert_eq!(test::read_body(res).await, supplied);
    }

    #[rstest]
    #[case::not_a_uuid("retry-1")]
    #[case::blank("  ")]
    #[actix_web::test]
    async fn unusable_caller_ids_are_replaced(#[case] supplied: &str) {
        let res = call(
            test::TestRequest::get()
                .uri("/echo")
                .insert_header((TRACE_ID_HEADER, supplied)),
        )
        .await;
        let trace_id = header_of(&res);
        assert_ne!(trace_id, supplied);
        assert!(trace_id.parse::<TraceId>().is_ok());
    }
}
