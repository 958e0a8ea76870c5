//! Unified error codes for the credential gateway
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Tenant errors
//! - 4xxx: License errors
//! - 5xxx: Asset errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so the frontend can
/// switch on them without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,

    // ==================== 1xxx: Auth ====================
    /// No credential was presented
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid (signature, issuer, audience, format)
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Specific role required
    RoleRequired = 2002,

    // ==================== 3xxx: Tenant ====================
    /// No tenant could be derived for the request
    TenantUnresolved = 3001,

    // ==================== 4xxx: License ====================
    /// No active license of an accepted type
    LicenseRequired = 4001,
    /// License type is not one of the known types
    LicenseTypeInvalid = 4002,

    // ==================== 5xxx: Asset ====================
    /// Stored asset or its record does not exist
    AssetNotFound = 5001,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Persistence or object store unreachable
    DependencyUnavailable = 9101,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",

            // Auth
            ErrorCode::NotAuthenticated => "Authentication required",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",

            // Permission
            ErrorCode::RoleRequired => "Specific role is required",

            // Tenant
            ErrorCode::TenantUnresolved => "Tenant not configured",

            // License
            ErrorCode::LicenseRequired => "License required",
            ErrorCode::LicenseTypeInvalid => "Unknown license type",

            // Asset
            ErrorCode::AssetNotFound => "Asset not found",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DependencyUnavailable => "Dependency unavailable, please retry later",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),

            1001 => Ok(ErrorCode::NotAuthenticated),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),

            2002 => Ok(ErrorCode::RoleRequired),

            3001 => Ok(ErrorCode::TenantUnresolved),

            4001 => Ok(ErrorCode::LicenseRequired),
            4002 => Ok(ErrorCode::LicenseTypeInvalid),

            5001 => Ok(ErrorCode::AssetNotFound),

            9001 => Ok(ErrorCode::InternalError),
            9101 => Ok(ErrorCode::DependencyUnavailable),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::TokenInvalid.code(), 1004);
        assert_eq!(ErrorCode::RoleRequired.code(), 2002);
        assert_eq!(ErrorCode::TenantUnresolved.code(), 3001);
        assert_eq!(ErrorCode::LicenseRequired.code(), 4001);
        assert_eq!(ErrorCode::AssetNotFound.code(), 5001);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
        assert_eq!(ErrorCode::DependencyUnavailable.code(), 9101);
    }

    #[test]
    fn test_try_from_valid() {
        assert_eq!(ErrorCode::try_from(4001), Ok(ErrorCode::LicenseRequired));
        assert_eq!(ErrorCode::try_from(3001), Ok(ErrorCode::TenantUnresolved));
        assert_eq!(
            ErrorCode::try_from(9101),
            Ok(ErrorCode::DependencyUnavailable)
        );
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(0), Err(InvalidErrorCode(0)));
        assert_eq!(ErrorCode::try_from(2001), Err(InvalidErrorCode(2001)));
        assert_eq!(ErrorCode::try_from(65535), Err(InvalidErrorCode(65535)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::LicenseRequired).unwrap();
        assert_eq!(json, "4001");

        let code: ErrorCode = serde_json::from_str("5001").unwrap();
        assert_eq!(code, ErrorCode::AssetNotFound);

        assert!(serde_json::from_str::<ErrorCode>("4242").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorCode::RoleRequired.to_string(), "2002");
    }

    #[test]
    fn test_message() {
        assert_eq!(ErrorCode::LicenseRequired.message(), "License required");
        assert_eq!(ErrorCode::TenantUnresolved.message(), "Tenant not configured");
    }
}
