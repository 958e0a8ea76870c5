//! PostgreSQL-backed [`Store`]

use async_trait::async_trait;
use shared::models::{Badge, Certificate, License, LicenseType, NewLicense};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::{Store, StoreResult, credentials, licenses, tenants};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and apply pending migrations
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(std::time::Duration::from_secs(5))
            .idle_timeout(std::time::Duration::from_secs(600))
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_active_tenant_by_slug(&self, slug: &str) -> StoreResult<Option<String>> {
        Ok(tenants::find_active_by_slug(&self.pool, slug).await?)
    }

    async fn find_oldest_tenant(&self) -> StoreResult<Option<String>> {
        Ok(tenants::find_oldest(&self.pool).await?)
    }

    async fn find_effective_license(
        &self,
        tenant_id: &str,
        allowed: &[LicenseType],
    ) -> StoreResult<Option<License>> {
        licenses::find_effective(&self.pool, tenant_id, allowed)
            .await?
            .map(License::try_from)
            .transpose()
    }

    async fn latest_license(&self, tenant_id: &str) -> StoreResult<Option<License>> {
        licenses::find_latest(&self.pool, tenant_id)
            .await?
            .map(License::try_from)
            .transpose()
    }

    async fn check_latest_active_license(
        &self,
        tenant_id: &str,
    ) -> StoreResult<Option<(License, bool)>> {
        match licenses::check_latest_active(&self.pool, tenant_id).await? {
            Some(row) => Ok(Some((License::try_from(row.license)?, row.valid))),
            None => Ok(None),
        }
    }

    async fn insert_license(&self, new: NewLicense) -> StoreResult<License> {
        let id = uuid::Uuid::new_v4().to_string();
        let row = licenses::insert(&self.pool, &id, &new).await?;
        License::try_from(row)
    }

    async fn list_badges(&self, tenant_id: &str) -> StoreResult<Vec<Badge>> {
        let rows = credentials::list_badges(&self.pool, tenant_id).await?;
        Ok(rows.into_iter().map(Badge::from).collect())
    }

    async fn list_certificates(&self, tenant_id: &str) -> StoreResult<Vec<Certificate>> {
        let rows = credentials::list_certificates(&self.pool, tenant_id).await?;
        Ok(rows.into_iter().map(Certificate::from).collect())
    }

    async fn find_certificate(
        &self,
        tenant_id: &str,
        certificate_id: &str,
    ) -> StoreResult<Option<Certificate>> {
        Ok(credentials::find_certificate(&self.pool, tenant_id, certificate_id)
            .await?
            .map(Certificate::from))
    }
}
