//! Database access layer
//!
//! [`Store`] is the relational collaborator the pipeline and handlers talk
//! to. [`PgStore`] backs it with PostgreSQL; [`MemoryStore`] keeps records
//! in process for tests and local demos.
//!
//! Every comparison against "now" is evaluated by the store on its own
//! clock, so eligibility is decided the same way everywhere.

pub mod credentials;
pub mod licenses;
pub mod memory;
pub mod pg;
pub mod tenants;

use async_trait::async_trait;
use shared::models::{Badge, Certificate, License, LicenseType, NewLicense};
use thiserror::Error;

pub use memory::MemoryStore;
pub use pg::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("invalid {field} in stored row: {value:?}")]
    InvalidRow { field: &'static str, value: String },
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait Store: Send + Sync {
    /// Id of the `active` tenant owning `slug`
    async fn find_active_tenant_by_slug(&self, slug: &str) -> StoreResult<Option<String>>;

    /// Id of the earliest created tenant, whatever its status
    async fn find_oldest_tenant(&self) -> StoreResult<Option<String>>;

    /// Most recently started license that is active, of an allowed type,
    /// and unexpired
    async fn find_effective_license(
        &self,
        tenant_id: &str,
        allowed: &[LicenseType],
    ) -> StoreResult<Option<License>>;

    /// Most recently started license in any status
    async fn latest_license(&self, tenant_id: &str) -> StoreResult<Option<License>>;

    /// Most recently started active license, with whether it is unexpired
    async fn check_latest_active_license(
        &self,
        tenant_id: &str,
    ) -> StoreResult<Option<(License, bool)>>;

    /// Insert an `active` license; a missing start defaults to the store clock
    async fn insert_license(&self, new: NewLicense) -> StoreResult<License>;

    /// Badges ordered by display order, then newest issuance first
    async fn list_badges(&self, tenant_id: &str) -> StoreResult<Vec<Badge>>;

    /// Certificates, newest issuance first
    async fn list_certificates(&self, tenant_id: &str) -> StoreResult<Vec<Certificate>>;

    async fn find_certificate(
        &self,
        tenant_id: &str,
        certificate_id: &str,
    ) -> StoreResult<Option<Certificate>>;
}
