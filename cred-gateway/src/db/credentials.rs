//! Badge and certificate reads, always scoped to one tenant

use shared::models::{Badge, Certificate};
use sqlx::PgPool;

#[derive(sqlx::FromRow)]
pub struct BadgeRow {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub icon_url: Option<String>,
    pub status: String,
    pub display_order: i32,
    pub issued_at: chrono::DateTime<chrono::Utc>,
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<BadgeRow> for Badge {
    fn from(row: BadgeRow) -> Self {
        Self {
            id: row.id,
            tenant_id: row.tenant_id,
            name: row.name,
            icon_url: row.icon_url,
            status: row.status,
            display_order: row.display_order,
            issued_at: row.issued_at,
            expires_at: row.expires_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub struct CertificateRow {
    pub id: String,
    pub tenant_id: String,
    pub title: String,
    pub cert_type: String,
    pub status: String,
    pub issued_at: chrono::DateTime<chrono::Utc>,
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
    pub file_key: Option<String>,
}

impl From<CertificateRow> for Certificate {
    fn from(row: CertificateRow) -> Self {
        Self {
            id: row.id,
            tenant_id: row.tenant_id,
            title: row.title,
            cert_type: row.cert_type,
            status: row.status,
            issued_at: row.issued_at,
            expires_at: row.expires_at,
            file_key: row.file_key,
        }
    }
}

pub async fn list_badges(pool: &PgPool, tenant_id: &str) -> Result<Vec<BadgeRow>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, tenant_id, name, icon_url, status, display_order, issued_at, expires_at
         FROM badges
         WHERE tenant_id = $1
         ORDER BY display_order ASC, issued_at DESC",
    )
    .bind(tenant_id)
    .fetch_all(pool)
    .await
}

pub async fn list_certificates(
    pool: &PgPool,
    tenant_id: &str,
) -> Result<Vec<CertificateRow>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, tenant_id, title, cert_type, status, issued_at, expires_at, file_key
         FROM certificates
         WHERE tenant_id = $1
         ORDER BY issued_at DESC",
    )
    .bind(tenant_id)
    .fetch_all(pool)
    .await
}

/// Tenant scope is part of the lookup; another tenant's id reads as missing
pub async fn find_certificate(
    pool: &PgPool,
    tenant_id: &str,
    certificate_id: &str,
) -> Result<Option<CertificateRow>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, tenant_id, title, cert_type, status, issued_at, expires_at, file_key
         FROM certificates
         WHERE id = $1 AND tenant_id = $2",
    )
    .bind(certificate_id)
    .bind(tenant_id)
    .fetch_optional(pool)
    .await
}
