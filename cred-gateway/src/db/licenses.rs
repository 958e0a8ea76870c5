//! License queries
//!
//! Expiry is always compared with `now()` inside the query.

use chrono::{DateTime, Utc};
use serde_json::Value;
use shared::models::{License, LicenseStatus, LicenseType, NewLicense};
use sqlx::PgPool;

use super::StoreError;

const LICENSE_COLUMNS: &str =
    "id, tenant_id, license_type, status, seats, starts_at, expires_at, meta";

#[derive(sqlx::FromRow)]
pub struct LicenseRow {
    pub id: String,
    pub tenant_id: String,
    pub license_type: String,
    pub status: String,
    pub seats: i32,
    pub starts_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub meta: Option<Value>,
}

impl TryFrom<LicenseRow> for License {
    type Error = StoreError;

    fn try_from(row: LicenseRow) -> Result<Self, Self::Error> {
        let license_type =
            LicenseType::from_db(&row.license_type).ok_or_else(|| StoreError::InvalidRow {
                field: "license_type",
                value: row.license_type.clone(),
            })?;
        let status = LicenseStatus::from_db(&row.status).ok_or_else(|| StoreError::InvalidRow {
            field: "status",
            value: row.status.clone(),
        })?;

        Ok(License {
            id: row.id,
            tenant_id: row.tenant_id,
            license_type,
            status,
            seats: row.seats,
            starts_at: row.starts_at,
            expires_at: row.expires_at,
            meta: row.meta,
        })
    }
}

#[derive(sqlx::FromRow)]
pub struct LicenseCheckRow {
    #[sqlx(flatten)]
    pub license: LicenseRow,
    pub valid: bool,
}

/// Effective license for gating: latest start among active, allowed, unexpired rows
pub async fn find_effective(
    pool: &PgPool,
    tenant_id: &str,
    allowed: &[LicenseType],
) -> Result<Option<LicenseRow>, sqlx::Error> {
    let types: Vec<String> = allowed.iter().map(|t| t.as_db().to_string()).collect();

    sqlx::query_as::<_, LicenseRow>(&format!(
        "SELECT {LICENSE_COLUMNS}
         FROM licenses
         WHERE tenant_id = $1
           AND status = 'active'
           AND license_type = ANY($2)
           AND (expires_at IS NULL OR expires_at > now())
         ORDER BY starts_at DESC, id
         LIMIT 1"
    ))
    .bind(tenant_id)
    .bind(types)
    .fetch_optional(pool)
    .await
}

pub async fn find_latest(pool: &PgPool, tenant_id: &str) -> Result<Option<LicenseRow>, sqlx::Error> {
    sqlx::query_as::<_, LicenseRow>(&format!(
        "SELECT {LICENSE_COLUMNS}
         FROM licenses
         WHERE tenant_id = $1
         ORDER BY starts_at DESC, id
         LIMIT 1"
    ))
    .bind(tenant_id)
    .fetch_optional(pool)
    .await
}

pub async fn check_latest_active(
    pool: &PgPool,
    tenant_id: &str,
) -> Result<Option<LicenseCheckRow>, sqlx::Error> {
    sqlx::query_as::<_, LicenseCheckRow>(&format!(
        "SELECT {LICENSE_COLUMNS},
                (expires_at IS NULL OR expires_at > now()) AS valid
         FROM licenses
         WHERE tenant_id = $1
           AND status = 'active'
         ORDER BY starts_at DESC, id
         LIMIT 1"
    ))
    .bind(tenant_id)
    .fetch_optional(pool)
    .await
}

/// Single atomic insert; returns the stored row
pub async fn insert(pool: &PgPool, id: &str, new: &NewLicense) -> Result<LicenseRow, sqlx::Error> {
    sqlx::query_as::<_, LicenseRow>(&format!(
        "INSERT INTO licenses (id, tenant_id, license_type, status, seats, starts_at, expires_at, meta)
         VALUES ($1, $2, $3, $4, $5, COALESCE($6, now()), $7, $8)
         RETURNING {LICENSE_COLUMNS}"
    ))
    .bind(id)
    .bind(&new.tenant_id)
    .bind(new.license_type.as_db())
    .bind(LicenseStatus::Active.as_db())
    .bind(new.seats)
    .bind(new.starts_at)
    .bind(new.expires_at)
    .bind(&new.meta)
    .fetch_one(pool)
    .await
}
