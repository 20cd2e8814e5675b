//! Domain primitives, ports, and the points ledger service.
//!
//! Public surface:
//! - [`Error`] / [`ErrorCode`]: transport-agnostic failures.
//! - [`Points`], [`PointsAmount`], [`AwardReason`]: balance arithmetic.
//! - [`Account`], [`Reward`], [`Redemption`]: ledger entities.
//! - [`PasswordDigest`]: Argon2id hashes checked at login.
//! - [`PointsLedgerService`]: implements the driving ports in [`ports`].

pub mod auth;
pub mod error;
pub mod ledger_login_service;
pub mod ledger_service;
pub mod password;
pub mod points;
pub mod ports;
pub mod referral;
pub mod reward;
pub mod trace_id;
pub mod user;

pub use self::auth::{
    LoginCredentials, LoginValidationError, Registration, RegistrationValidationError,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::ledger_login_service::LedgerLoginService;
pub use self::ledger_service::PointsLedgerService;
pub use self::password::{MIN_PASSWORD_LEN, PasswordDigest, PasswordDigestError};
pub use self::points::{
    AwardReason, Points, PointsAmount, PointsAmountError, REDEEM_THRESHOLD, REDEEM_VALUE_INR,
};
pub use self::referral::{
    NEW_USER_BONUS, REFERRER_BONUS, ReferralApplied, ReferralCode, ReferralCodeError,
    ReferralInfo, ReferralSchedule, ReferralStats,
};
pub use self::reward::{
    InvalidIdError, Redemption, RedemptionId, RedemptionStatus, Reward, RewardId, default_catalog,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{Account, PhoneNumber, UserId, UserRole, UserValidationError};
