//! Argon2id password digests.
//!
//! Digests are stored in PHC string format (`$argon2id$v=19$...`), so the
//! parameters and salt travel with the hash.

use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use uuid::Uuid;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Failure while hashing or reading a stored digest.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordDigestError {
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("stored password digest is malformed: {0}")]
    Malformed(String),
}

/// A salted Argon2id digest of a password.
///
/// # Examples
/// ```
/// use kabadiyo::domain::PasswordDigest;
///
/// let digest = PasswordDigest::hash("correct horse").expect("hashes");
/// assert!(digest.verify("correct horse"));
/// assert!(!digest.verify("battery staple"));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Hash `password` with a fresh random salt.
    pub fn hash(password: &str) -> Result<Self, PasswordDigestError> {
        let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
            .map_err(|err| PasswordDigestError::Hash(err.to_string()))?;
        let digest = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| PasswordDigestError::Hash(err.to_string()))?;
        Ok(Self(digest.to_string()))
    }

    /// Wrap a digest read back from storage after checking its format.
    pub fn from_stored(stored: impl Into<String>) -> Result<Self, PasswordDigestError> {
        let stored = stored.into();
        PasswordHash::new(&stored)
            .map_err(|err| PasswordDigestError::Malformed(err.to_string()))?;
        Ok(Self(stored))
    }

    /// Whether `password` produces this digest.
    pub fn verify(&self, password: &str) -> bool {
        PasswordHash::new(&self.0).is_ok_and(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
    }

    /// PHC string for persistence.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasswordDigest(..)")
    }
}
