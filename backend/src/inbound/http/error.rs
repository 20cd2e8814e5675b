//! JSON error responses for the ledger API.
//!
//! Clients receive `{"error": ..., "code": ...}` plus the trace id. An
//! insufficient balance is an ordinary `400` so the mobile client can show
//! the "Need N points" message verbatim. Internal failures are logged in
//! full and reach the client only as "Internal server error". A store
//! outage answers `503` with `Retry-After` so clients back off instead of
//! resubmitting a redemption immediately.

use std::borrow::Cow;

use actix_web::http::header::RETRY_AFTER;
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::{error, warn};

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

/// Seconds a client should wait after a `503` before retrying.
pub const RETRY_AFTER_SECS: u32 = 5;

const INTERNAL_MESSAGE: &str = "Internal server error";

/// The error as the client may see it.
fn client_view(error: &Error) -> Cow<'_, Error> {
    if error.code() != ErrorCode::InternalError {
        return Cow::Borrowed(error);
    }
    let redacted = Error::internal(INTERNAL_MESSAGE);
    Cow::Owned(match error.trace_id() {
        Some(id) => redacted.with_trace_id(id.to_owned()),
        None => redacted,
    })
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self.code() {
            ErrorCode::InvalidRequest | ErrorCode::InsufficientFunds => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let trace_id = self.trace_id().unwrap_or("-");
        let mut builder = HttpResponse::build(self.status_code());
        match self.code() {
            ErrorCode::InternalError => {
                error!(trace_id, message = self.message(), "ledger request failed");
            }
            ErrorCode::ServiceUnavailable => {
                warn!(trace_id, message = self.message(), "ledger store unavailable");
                builder.insert_header((RETRY_AFTER, RETRY_AFTER_SECS));
            }
            _ => {}
        }
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(client_view(self))
    }
}
