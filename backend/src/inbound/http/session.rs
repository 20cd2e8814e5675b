//! Seller sessions carried in the private session cookie.
//!
//! Ledger handlers take an [`AuthenticatedUser`] and never touch the cookie
//! themselves. Extraction fails with `401 Unauthorized` before the handler
//! body runs, so no balance is read or written for anonymous callers.
//! Login and logout use [`SessionContext`] to sign a seller in or out.

use actix_session::{Session, SessionExt};
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::{Ready, ready};
use tracing::warn;

use crate::domain::{Error, UserId};

/// Name of the session cookie set on login.
pub const SESSION_COOKIE_NAME: &str = "session";

pub(crate) const USER_ID_KEY: &str = "user_id";

const LOGIN_REQUIRED: &str = "login required";

/// Read the signed-in seller, treating an unparsable id as signed out.
fn signed_in_user(session: &Session) -> Result<Option<UserId>, Error> {
    let Some(raw) = session
        .get::<String>(USER_ID_KEY)
        .map_err(|error| Error::internal(format!("failed to read session: {error}")))?
    else {
        return Ok(None);
    };
    match UserId::new(&raw) {
        Ok(user_id) => Ok(Some(user_id)),
        Err(error) => {
            warn!(%error, "discarding session with a malformed user id");
            session.purge();
            Ok(None)
        }
    }
}

/// The seller whose ledger a request acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(UserId);

impl AuthenticatedUser {
    pub fn id(&self) -> &UserId {
        &self.0
    }

    pub fn into_inner(self) -> UserId {
        self.0
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let session = req.get_session();
        ready(
            signed_in_user(&session)
                .and_then(|user| user.ok_or_else(|| Error::unauthorized(LOGIN_REQUIRED)))
                .map(Self),
        )
    }
}

/// Sign-in and sign-out for the session endpoints.
pub struct SessionContext(Session);

impl SessionContext {
    /// Bind the session to `user_id`.
    ///
    /// The session is renewed first so a cookie issued before login never
    /// becomes an authenticated one.
    pub fn sign_in(&self, user_id: &UserId) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, user_id.as_ref())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// End the session and expire its cookie.
    pub fn sign_out(self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = Error;
    type Future = Ready<Result<Self, Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(Self(req.get_session())))
    }
}
