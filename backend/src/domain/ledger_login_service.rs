//! `LoginService` backed by the ledger's account table.
//!
//! Passwords are checked against stored Argon2id digests. Hashing runs on
//! the blocking pool so it never stalls the request workers.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::ports::{
    AccountCreation, LedgerRepository, LedgerRepositoryError, LoginService, StoredCredentials,
};
use crate::domain::{
    Account, Error, LoginCredentials, PasswordDigest, PasswordDigestError, Registration, UserId,
};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Login service backed by a ledger repository.
#[derive(Clone)]
pub struct LedgerLoginService<R> {
    repository: Arc<R>,
}

impl<R> LedgerLoginService<R> {
    /// Create a login service over `repository`.
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }
}

fn map_repository_error(err: LedgerRepositoryError) -> Error {
    match err {
        LedgerRepositoryError::Connection { .. } => {
            Error::service_unavailable("login temporarily unavailable")
        }
        LedgerRepositoryError::Query { message } => {
            Error::internal(format!("account lookup failed: {message}"))
        }
    }
}

fn map_digest_error(err: PasswordDigestError) -> Error {
    Error::internal(err.to_string())
}

async fn blocking<T, F>(work: F) -> Result<T, Error>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| Error::internal(format!("password worker failed: {err}")))
}

#[async_trait]
impl<R> LoginService for LedgerLoginService<R>
where
    R: LedgerRepository,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let Some(StoredCredentials { user_id, digest }) = self
            .repository
            .find_credentials(credentials.phone())
            .await
            .map_err(map_repository_error)?
        else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        let password = credentials.password().to_owned();
        let matches = blocking(move || digest.verify(&password)).await?;
        if !matches {
            warn!(%user_id, "login rejected: password mismatch");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        Ok(user_id)
    }

    async fn register(&self, registration: &Registration) -> Result<Account, Error> {
        let password = registration.password().to_owned();
        let digest = blocking(move || PasswordDigest::hash(&password))
            .await?
            .map_err(map_digest_error)?;
        let account = Account::new(
            UserId::random(),
            registration.name(),
            registration.phone().clone(),
        );

        match self
            .repository
            .create_account(&account, &digest)
            .await
            .map_err(map_repository_error)?
        {
            AccountCreation::Created => {
                info!(user_id = %account.id, "account registered");
                Ok(account)
            }
            AccountCreation::PhoneTaken => {
                Err(Error::invalid_request("Phone number already registered"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    //! Credential checks and registration against a mocked repository.
    use super::*;
    use crate::domain::ports::MockLedgerRepository;
    use crate::domain::{ErrorCode, PhoneNumber};
    use rstest::{fixture, rstest};

    const PHONE: &str = "9876543210";

    #[fixture]
    fn user_id() -> UserId {
        UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid id")
    }

    fn stored(user_id: &UserId, password: &str) -> StoredCredentials {
        StoredCredentials {
            user_id: user_id.clone(),
            digest: PasswordDigest::hash(password).expect("hashes"),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn matching_password_returns_the_account_id(user_id: UserId) {
        let mut repo = MockLedgerRepository::new();
        let credentials = stored(&user_id, "s3cret!");
        repo.expect_find_credentials()
            .withf(|phone| phone.as_ref() == PHONE)
            .times(1)
            .return_once(move |_| Ok(Some(credentials)));

        let service = LedgerLoginService::new(Arc::new(repo));
        let creds = LoginCredentials::try_from_parts(PHONE, "s3cret!").expect("credentials shape");
        let authenticated = service.authenticate(&creds).await.expect("login succeeds");
        assert_eq!(authenticated, user_id);
    }

    #[rstest]
    #[case::wrong_password(true)]
    #[case::unknown_phone(false)]
    #[tokio::test]
    async fn bad_credentials_are_unauthorised(user_id: UserId, #[case] known_phone: bool) {
        let mut repo = MockLedgerRepository::new();
        let credentials = known_phone.then(|| stored(&user_id, "s3cret!"));
        repo.expect_find_credentials()
            .times(1)
            .return_once(move |_| Ok(credentials));

        let service = LedgerLoginService::new(Arc::new(repo));
        let creds = LoginCredentials::try_from_parts(PHONE, "hunter2").expect("credentials shape");
        let err = service.authenticate(&creds).await.expect_err("rejected");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert_eq!(err.message(), INVALID_CREDENTIALS);
    }

    #[rstest]
    #[tokio::test]
    async fn storage_outage_is_service_unavailable() {
        let mut repo = MockLedgerRepository::new();
        repo.expect_find_credentials()
            .times(1)
            .return_once(|_| Err(LedgerRepositoryError::connection("refused")));

        let service = LedgerLoginService::new(Arc::new(repo));
        let creds = LoginCredentials::try_from_parts(PHONE, "s3cret!").expect("credentials shape");
        let err = service.authenticate(&creds).await.expect_err("outage");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }

    #[rstest]
    #[tokio::test]
    async fn registration_stores_a_digest_not_the_password() {
        let mut repo = MockLedgerRepository::new();
        repo.expect_create_account()
            .withf(|account, digest| {
                account.name == "Asha"
                    && account.phone.as_ref() == PHONE
                    && digest.as_str() != "s3cret!"
                    && digest.verify("s3cret!")
            })
            .times(1)
            .return_once(|_, _| Ok(AccountCreation::Created));

        let service = LedgerLoginService::new(Arc::new(repo));
        let registration =
            Registration::try_from_parts("Asha", PHONE, "s3cret!").expect("valid sign-up");
        let account = service.register(&registration).await.expect("registered");
        assert_eq!(account.phone, PhoneNumber::new(PHONE).expect("valid phone"));
        assert_eq!(account.points.value(), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_phone_is_a_client_error() {
        let mut repo = MockLedgerRepository::new();
        repo.expect_create_account()
            .times(1)
            .return_once(|_, _| Ok(AccountCreation::PhoneTaken));

        let service = LedgerLoginService::new(Arc::new(repo));
        let registration =
            Registration::try_from_parts("Asha", PHONE, "s3cret!").expect("valid sign-up");
        let err = service.register(&registration).await.expect_err("duplicate");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.message(), "Phone number already registered");
    }
}
