use shared::models::TenantStatus;
use sqlx::PgPool;

pub async fn find_active_by_slug(pool: &PgPool, slug: &str) -> Result<Option<String>, sqlx::Error> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT id FROM tenants WHERE slug = $1 AND status = $2")
            .bind(slug)
            .bind(TenantStatus::Active.as_db())
            .fetch_optional(pool)
            .await?;
    Ok(row.map(|r| r.0))
}

/// Single-tenant deployments resolve every request to this tenant
pub async fn find_oldest(pool: &PgPool) -> Result<Option<String>, sqlx::Error> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT id FROM tenants ORDER BY created_at ASC LIMIT 1")
            .fetch_optional(pool)
            .await?;
    Ok(row.map(|r| r.0))
}
