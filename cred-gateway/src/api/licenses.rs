//! License endpoints: current, purchase, verify

use axum::{Extension, Json, body::Bytes, extract::State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::error::{AppError, ErrorCode};
use shared::models::{License, LicenseType, NewLicense};

use crate::auth::AuthContext;
use crate::state::AppState;

use super::ApiResult;

/// Latest license, or `{"status":"none"}`
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CurrentLicense {
    Found(License),
    None { status: &'static str },
}

/// GET /api/licenses/current
pub async fn current_license(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> ApiResult<CurrentLicense> {
    let current = match state.store.latest_license(&ctx.tenant_id).await? {
        Some(license) => CurrentLicense::Found(license),
        None => CurrentLicense::None { status: "none" },
    };
    Ok(Json(current))
}

/// Purchase request body; every field is optional
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub license_type: Option<String>,
    pub seats: Option<i64>,
    pub starts_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub meta: Option<Value>,
}

impl PurchaseRequest {
    /// An empty body means all defaults
    fn parse(body: &[u8]) -> Result<Self, AppError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
            .map_err(|e| AppError::validation(format!("Invalid request body: {e}")))
    }

    fn into_new_license(self, tenant_id: String) -> Result<NewLicense, AppError> {
        let license_type = match self.license_type.as_deref() {
            None => LicenseType::Reseller,
            Some(raw) => LicenseType::from_db(raw).ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::LicenseTypeInvalid,
                    format!("Unknown license type: {raw}"),
                )
                .with_detail("field", "licenseType")
            })?,
        };

        let seats = match self.seats {
            None => 1,
            Some(n) => i32::try_from(n).ok().filter(|n| *n >= 0).ok_or_else(|| {
                AppError::validation("Seats must be a non-negative integer")
                    .with_detail("field", "seats")
            })?,
        };

        if let (Some(starts), Some(expires)) = (self.starts_at, self.expires_at)
            && expires <= starts
        {
            return Err(AppError::validation("expiresAt must be after startsAt")
                .with_detail("field", "expiresAt"));
        }

        Ok(NewLicense {
            tenant_id,
            license_type,
            seats,
            starts_at: self.starts_at,
            expires_at: self.expires_at,
            meta: self.meta.filter(|m| !m.is_null()),
        })
    }
}

/// POST /api/licenses/purchase
///
/// Appends one active license for the resolved tenant and returns it.
pub async fn purchase_license(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    body: Bytes,
) -> ApiResult<License> {
    let new = PurchaseRequest::parse(&body)?.into_new_license(ctx.tenant_id.clone())?;
    let license = state.store.insert_license(new).await?;

    tracing::info!(
        tenant_id = %ctx.tenant_id,
        subject = %ctx.principal.subject,
        license_id = %license.id,
        license_type = %license.license_type,
        seats = license.seats,
        "License purchased"
    );
    Ok(Json(license))
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub license: Option<License>,
}

/// POST /api/licenses/verify
pub async fn verify_license(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> ApiResult<VerifyResponse> {
    let response = match state.store.check_latest_active_license(&ctx.tenant_id).await? {
        Some((license, valid)) => VerifyResponse {
            valid,
            license: Some(license),
        },
        None => VerifyResponse {
            valid: false,
            license: None,
        },
    };
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::ErrorCode;

    fn new_license(body: &str) -> Result<NewLicense, AppError> {
        PurchaseRequest::parse(body.as_bytes())?.into_new_license("t-1".into())
    }

    #[test]
    fn test_empty_body_uses_defaults() {
        let new = new_license("").unwrap();
        assert_eq!(new.license_type, LicenseType::Reseller);
        assert_eq!(new.seats, 1);
        assert!(new.starts_at.is_none());
        assert!(new.meta.is_none());
    }

    #[test]
    fn test_explicit_fields() {
        let new = new_license(
            r#"{"licenseType":"enterprise","seats":5,"meta":{"po":"PO-7"},
                "startsAt":"2025-01-01T00:00:00Z","expiresAt":"2026-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(new.license_type, LicenseType::Enterprise);
        assert_eq!(new.seats, 5);
        assert_eq!(new.meta.unwrap()["po"], "PO-7");
        assert!(new.starts_at.is_some());
    }

    #[test]
    fn test_zero_seats_allowed() {
        assert_eq!(new_license(r#"{"seats":0}"#).unwrap().seats, 0);
    }

    #[test]
    fn test_validation_failures() {
        let err = new_license(r#"{"licenseType":"platinum"}"#).unwrap_err();
        assert_eq!(err.code, ErrorCode::LicenseTypeInvalid);
        assert_eq!(err.http_status().as_u16(), 400);

        for body in [
            r#"{"seats":-1}"#,
            r#"{"seats":99999999999}"#,
            r#"{"startsAt":"2025-06-01T00:00:00Z","expiresAt":"2025-01-01T00:00:00Z"}"#,
            "{not json",
        ] {
            let err = new_license(body).unwrap_err();
            assert_eq!(err.code, ErrorCode::ValidationFailed, "body: {body}");
        }
    }
}
