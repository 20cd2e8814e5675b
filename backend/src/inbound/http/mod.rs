//! HTTP inbound adapter exposing REST endpoints.

use actix_web::{HttpRequest, error::JsonPayloadError, web};

use crate::domain::Error;

pub mod error;
pub mod health;
pub mod points;
pub mod referral;
pub mod rewards;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;

/// JSON extractor settings mapping malformed bodies to `invalid_request`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(16 * 1024)
        .error_handler(json_error)
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = match &err {
        JsonPayloadError::ContentType => "expected an application/json body".to_owned(),
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            "request body is too large".to_owned()
        }
        other => format!("malformed JSON body: {other}"),
    };
    Error::invalid_request(message).into()
}
