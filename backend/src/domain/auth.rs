//! Login credentials and sign-up requests.
//!
//! Inbound payload parsing stays outside the domain; handlers call
//! [`LoginCredentials::try_from_parts`] or [`Registration::try_from_parts`]
//! before talking to the login port.

use std::fmt;

use zeroize::Zeroizing;

use super::PhoneNumber;
use super::password::MIN_PASSWORD_LEN;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Phone number was missing or malformed.
    InvalidPhone,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPhone => write!(f, "phone must be a valid phone number"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials.
///
/// The password keeps caller-provided whitespace and is zeroed on drop.
///
/// # Examples
/// ```
/// use kabadiyo::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("9876543210", "s3cret!").unwrap();
/// assert_eq!(creds.phone().as_ref(), "9876543210");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    phone: PhoneNumber,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw phone/password inputs.
    pub fn try_from_parts(phone: &str, password: &str) -> Result<Self, LoginValidationError> {
        let phone = PhoneNumber::new(phone).map_err(|_| LoginValidationError::InvalidPhone)?;
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            phone,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Phone number used to look up the account.
    pub fn phone(&self) -> &PhoneNumber {
        &self.phone
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validation failures for a sign-up request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationValidationError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("Invalid phone number")]
    InvalidPhone,
    #[error("Password must be at least {MIN_PASSWORD_LEN} characters")]
    ShortPassword,
}

/// A validated sign-up request. The password is zeroed on drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    name: String,
    phone: PhoneNumber,
    password: Zeroizing<String>,
}

impl Registration {
    /// Validate raw sign-up fields.
    ///
    /// # Examples
    /// ```
    /// use kabadiyo::domain::{Registration, RegistrationValidationError};
    ///
    /// let ok = Registration::try_from_parts("Asha", "9876543210", "secret1").unwrap();
    /// assert_eq!(ok.name(), "Asha");
    /// assert_eq!(
    ///     Registration::try_from_parts("Asha", "9876543210", "abc").unwrap_err(),
    ///     RegistrationValidationError::ShortPassword,
    /// );
    /// ```
    pub fn try_from_parts(
        name: &str,
        phone: &str,
        password: &str,
    ) -> Result<Self, RegistrationValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RegistrationValidationError::EmptyName);
        }
        let phone =
            PhoneNumber::new(phone).map_err(|_| RegistrationValidationError::InvalidPhone)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(RegistrationValidationError::ShortPassword);
        }
        Ok(Self {
            name: name.to_owned(),
            phone,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phone(&self) -> &PhoneNumber {
        &self.phone
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}
