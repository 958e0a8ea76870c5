//! Unified service-layer error type for the gateway
//!
//! `ServiceError` bridges infrastructure errors (store, object store) and the
//! API-layer error (`AppError`), so handlers can use `?` without manual
//! `.map_err(|e| { tracing::error!(...); AppError::new(...) })` boilerplate.

use axum::response::IntoResponse;
use shared::error::AppError;

use crate::db::StoreError;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Service-layer error
///
/// - `Db`: persistence or object-store failure (logged, surfaced as 503)
/// - `App`: authorization or business-rule error (passed through to the client)
#[derive(Debug)]
pub enum ServiceError {
    /// Dependency failure (sqlx, AWS SDK, filesystem)
    Db(BoxError),
    /// Error that already carries its `ErrorCode`
    App(AppError),
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            // Constraint violations are permanent; retrying cannot succeed
            StoreError::Database(sqlx::Error::Database(db_err))
                if db_err.is_foreign_key_violation() =>
            {
                tracing::warn!(error = %db_err, "Write references an unknown tenant");
                ServiceError::App(AppError::tenant_unresolved())
            }
            StoreError::Database(sqlx::Error::Database(db_err))
                if db_err.is_unique_violation() || db_err.is_check_violation() =>
            {
                tracing::warn!(error = %db_err, "Write rejected by store constraint");
                ServiceError::App(AppError::validation("Request conflicts with stored data"))
            }
            StoreError::Database(err) => ServiceError::Db(err.into()),
            // Row exists but cannot be interpreted; retrying will not help
            invalid @ StoreError::InvalidRow { .. } => {
                tracing::error!(error = %invalid, "Unreadable row in store");
                ServiceError::App(AppError::internal("Stored record is invalid"))
            }
        }
    }
}

impl From<BoxError> for ServiceError {
    fn from(e: BoxError) -> Self {
        ServiceError::Db(e)
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Db(db_err) => {
                tracing::error!(error = %db_err, "Dependency unavailable");
                AppError::unavailable()
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

/// Convenience type alias for service-layer results
pub type ServiceResult<T> = Result<T, ServiceError>;
