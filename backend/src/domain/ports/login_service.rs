//! Driving port for sign-up and login.
//!
//! Inbound adapters authenticate through this port without importing the
//! backing store, so handler tests can substitute a mock.

use async_trait::async_trait;

use crate::domain::{Account, Error, LoginCredentials, Registration, UserId};

/// Domain use-case port for account access.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Check a phone/password pair and return the account id.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error>;

    /// Create a zero-balance account for a new phone number.
    async fn register(&self, registration: &Registration) -> Result<Account, Error>;
}
