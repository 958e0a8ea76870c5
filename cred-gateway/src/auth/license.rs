//! License gate
//!
//! The effective license is the most recently started one that is active, of
//! an allowed type, and unexpired on the store clock. Type order does not
//! matter: with several allowed types the latest start wins.

use shared::error::AppError;
use shared::models::{License, LicenseType};

use crate::db::Store;
use crate::error::ServiceResult;

/// Require an effective license of one of `allowed` for `tenant_id`
///
/// Read-only and safe to retry.
pub async fn require_license(
    store: &dyn Store,
    tenant_id: &str,
    allowed: &[LicenseType],
) -> ServiceResult<License> {
    if allowed.is_empty() {
        return Err(AppError::license_required().into());
    }

    match store.find_effective_license(tenant_id, allowed).await? {
        Some(license) => Ok(license),
        None => {
            tracing::warn!(
                tenant_id = %tenant_id,
                allowed = ?allowed,
                "No effective license"
            );
            Err(AppError::license_required()
                .with_detail(
                    "allowed",
                    allowed.iter().map(|t| t.as_db()).collect::<Vec<_>>(),
                )
                .into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::error::ServiceError;
    use chrono::{Duration, Utc};
    use shared::error::ErrorCode;
    use shared::models::LicenseStatus;

    fn license(
        id: &str,
        license_type: LicenseType,
        status: LicenseStatus,
        started_days_ago: i64,
        expires_in_days: Option<i64>,
    ) -> License {
        let now = Utc::now();
        License {
            id: id.into(),
            tenant_id: "t-1".into(),
            license_type,
            status,
            seats: 1,
            starts_at: now - Duration::days(started_days_ago),
            expires_at: expires_in_days.map(|d| now + Duration::days(d)),
            meta: None,
        }
    }

    fn code(err: ServiceError) -> ErrorCode {
        AppError::from(err).code
    }

    #[tokio::test]
    async fn test_latest_start_wins_regardless_of_type() {
        let store = MemoryStore::new();
        store
            .add_license(license("a", LicenseType::Affiliate, LicenseStatus::Active, 30, None))
            .await;
        store
            .add_license(license("b", LicenseType::Reseller, LicenseStatus::Active, 5, None))
            .await;

        let found = require_license(
            &store,
            "t-1",
            &[LicenseType::Affiliate, LicenseType::Reseller],
        )
        .await
        .unwrap();
        assert_eq!(found.id, "b");
        assert_eq!(found.license_type, LicenseType::Reseller);
    }

    #[tokio::test]
    async fn test_expired_license_excluded() {
        let store = MemoryStore::new();
        store
            .add_license(license("old", LicenseType::Enterprise, LicenseStatus::Active, 400, Some(-1)))
            .await;

        let err = require_license(&store, "t-1", &[LicenseType::Enterprise])
            .await
            .unwrap_err();
        assert_eq!(code(err), ErrorCode::LicenseRequired);
    }

    #[tokio::test]
    async fn test_expired_newer_license_does_not_hide_older_valid_one() {
        let store = MemoryStore::new();
        store
            .add_license(license("valid", LicenseType::Reseller, LicenseStatus::Active, 100, Some(30)))
            .await;
        store
            .add_license(license("lapsed", LicenseType::Reseller, LicenseStatus::Active, 10, Some(-2)))
            .await;

        let found = require_license(&store, "t-1", &[LicenseType::Reseller])
            .await
            .unwrap();
        assert_eq!(found.id, "valid");
    }

    #[tokio::test]
    async fn test_non_expiring_license_eligible() {
        let store = MemoryStore::new();
        store
            .add_license(license("forever", LicenseType::Enterprise, LicenseStatus::Active, 3650, None))
            .await;

        let found = require_license(&store, "t-1", &[LicenseType::Enterprise])
            .await
            .unwrap();
        assert_eq!(found.id, "forever");
    }

    #[tokio::test]
    async fn test_inactive_and_disallowed_types_excluded() {
        let store = MemoryStore::new();
        store
            .add_license(license("off", LicenseType::Reseller, LicenseStatus::Inactive, 1, None))
            .await;
        store
            .add_license(license("aff", LicenseType::Affiliate, LicenseStatus::Active, 1, None))
            .await;

        let err = require_license(
            &store,
            "t-1",
            &[LicenseType::Reseller, LicenseType::Enterprise],
        )
        .await
        .unwrap_err();
        assert_eq!(code(err), ErrorCode::LicenseRequired);
    }

    #[tokio::test]
    async fn test_other_tenant_license_ignored() {
        let store = MemoryStore::new();
        store
            .add_license(license("mine", LicenseType::Reseller, LicenseStatus::Active, 1, None))
            .await;

        let err = require_license(&store, "t-2", &[LicenseType::Reseller])
            .await
            .unwrap_err();
        assert_eq!(code(err), ErrorCode::LicenseRequired);
    }

    #[tokio::test]
    async fn test_empty_allowed_set_skips_store() {
        let store = MemoryStore::new();
        let err = require_license(&store, "t-1", &[]).await.unwrap_err();
        assert_eq!(code(err), ErrorCode::LicenseRequired);
        assert_eq!(store.query_count(), 0);
    }
}
