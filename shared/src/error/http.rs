//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::NotFound | Self::AssetNotFound => StatusCode::NOT_FOUND,

            Self::NotAuthenticated | Self::TokenExpired | Self::TokenInvalid => {
                StatusCode::UNAUTHORIZED
            }

            Self::RoleRequired => StatusCode::FORBIDDEN,

            // Entitlement missing, not a client mistake
            Self::LicenseRequired => StatusCode::PAYMENT_REQUIRED,

            Self::DependencyUnavailable => StatusCode::SERVICE_UNAVAILABLE,

            // Deployment has no tenant to fall back to
            Self::TenantUnresolved | Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,

            Self::ValidationFailed | Self::LicenseTypeInvalid => StatusCode::BAD_REQUEST,
        }
    }
}
