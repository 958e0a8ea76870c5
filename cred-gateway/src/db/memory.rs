//! In-process [`Store`] for tests and local demos
//!
//! Mirrors the ordering and filtering of the SQL queries. Its clock is
//! `Utc::now()`. Every trait call counts as one query so callers can assert
//! that a code path never touched the store.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use shared::models::{
    Badge, Certificate, License, LicenseStatus, LicenseType, NewLicense, Tenant, TenantStatus,
};
use tokio::sync::RwLock;

use super::{Store, StoreError, StoreResult};

#[derive(Default)]
struct Records {
    tenants: Vec<Tenant>,
    licenses: Vec<License>,
    badges: Vec<Badge>,
    certificates: Vec<Certificate>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<RwLock<Records>>,
    queries: Arc<AtomicUsize>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_tenant(&self, tenant: Tenant) {
        self.records.write().await.tenants.push(tenant);
    }

    pub async fn add_license(&self, license: License) {
        self.records.write().await.licenses.push(license);
    }

    pub async fn add_badge(&self, badge: Badge) {
        self.records.write().await.badges.push(badge);
    }

    pub async fn add_certificate(&self, certificate: Certificate) {
        self.records.write().await.certificates.push(certificate);
    }

    pub async fn licenses_for(&self, tenant_id: &str) -> Vec<License> {
        self.records
            .read()
            .await
            .licenses
            .iter()
            .filter(|l| l.tenant_id == tenant_id)
            .cloned()
            .collect()
    }

    /// Number of store calls served so far
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Make every subsequent call fail as if the database were down
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn begin(&self) -> StoreResult<()> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

/// Latest start wins; ties go to the smallest id, as in `ORDER BY starts_at DESC, id`
fn latest<'a>(licenses: impl Iterator<Item = &'a License>) -> Option<&'a License> {
    licenses.min_by(|a, b| b.starts_at.cmp(&a.starts_at).then_with(|| a.id.cmp(&b.id)))
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_active_tenant_by_slug(&self, slug: &str) -> StoreResult<Option<String>> {
        self.begin()?;
        let records = self.records.read().await;
        Ok(records
            .tenants
            .iter()
            .find(|t| t.slug == slug && t.status == TenantStatus::Active)
            .map(|t| t.id.clone()))
    }

    async fn find_oldest_tenant(&self) -> StoreResult<Option<String>> {
        self.begin()?;
        let records = self.records.read().await;
        Ok(records
            .tenants
            .iter()
            .min_by_key(|t| t.created_at)
            .map(|t| t.id.clone()))
    }

    async fn find_effective_license(
        &self,
        tenant_id: &str,
        allowed: &[LicenseType],
    ) -> StoreResult<Option<License>> {
        self.begin()?;
        let now = Utc::now();
        let records = self.records.read().await;
        Ok(latest(records.licenses.iter().filter(|l| {
            l.tenant_id == tenant_id && allowed.contains(&l.license_type) && l.is_current_at(now)
        }))
        .cloned())
    }

    async fn latest_license(&self, tenant_id: &str) -> StoreResult<Option<License>> {
        self.begin()?;
        let records = self.records.read().await;
        Ok(latest(records.licenses.iter().filter(|l| l.tenant_id == tenant_id)).cloned())
    }

    async fn check_latest_active_license(
        &self,
        tenant_id: &str,
    ) -> StoreResult<Option<(License, bool)>> {
        self.begin()?;
        let now = Utc::now();
        let records = self.records.read().await;
        Ok(latest(
            records
                .licenses
                .iter()
                .filter(|l| l.tenant_id == tenant_id && l.status == LicenseStatus::Active),
        )
        .map(|l| (l.clone(), l.is_current_at(now))))
    }

    async fn insert_license(&self, new: NewLicense) -> StoreResult<License> {
        self.begin()?;
        let license = License {
            id: uuid::Uuid::new_v4().to_string(),
            tenant_id: new.tenant_id,
            license_type: new.license_type,
            status: LicenseStatus::Active,
            seats: new.seats,
            starts_at: new.starts_at.unwrap_or_else(Utc::now),
            expires_at: new.expires_at,
            meta: new.meta,
        };
        self.records.write().await.licenses.push(license.clone());
        Ok(license)
    }

    async fn list_badges(&self, tenant_id: &str) -> StoreResult<Vec<Badge>> {
        self.begin()?;
        let records = self.records.read().await;
        let mut badges: Vec<Badge> = records
            .badges
            .iter()
            .filter(|b| b.tenant_id == tenant_id)
            .cloned()
            .collect();
        badges.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then(b.issued_at.cmp(&a.issued_at))
        });
        Ok(badges)
    }

    async fn list_certificates(&self, tenant_id: &str) -> StoreResult<Vec<Certificate>> {
        self.begin()?;
        let records = self.records.read().await;
        let mut certificates: Vec<Certificate> = records
            .certificates
            .iter()
            .filter(|c| c.tenant_id == tenant_id)
            .cloned()
            .collect();
        certificates.sort_by(|a, b| b.issued_at.cmp(&a.issued_at));
        Ok(certificates)
    }

    async fn find_certificate(
        &self,
        tenant_id: &str,
        certificate_id: &str,
    ) -> StoreResult<Option<Certificate>> {
        self.begin()?;
        let records = self.records.read().await;
        Ok(records
            .certificates
            .iter()
            .find(|c| c.id == certificate_id && c.tenant_id == tenant_id)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn badge(id: &str, order: i32, days_ago: i64) -> Badge {
        Badge {
            id: id.into(),
            tenant_id: "t-1".into(),
            name: format!("Badge {id}"),
            icon_url: None,
            status: "active".into(),
            display_order: order,
            issued_at: Utc::now() - Duration::days(days_ago),
            expires_at: None,
        }
    }

    #[tokio::test]
    async fn test_badges_sorted_by_order_then_newest() {
        let store = MemoryStore::new();
        store.add_badge(badge("old-first", 1, 10)).await;
        store.add_badge(badge("new-first", 1, 1)).await;
        store.add_badge(badge("zero", 0, 30)).await;

        let ids: Vec<String> = store
            .list_badges("t-1")
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(ids, vec!["zero", "new-first", "old-first"]);
    }

    #[tokio::test]
    async fn test_license_start_tie_goes_to_smallest_id() {
        let store = MemoryStore::new();
        let starts_at = Utc::now() - Duration::days(3);
        for id in ["lic-b", "lic-a", "lic-c"] {
            store
                .add_license(License {
                    id: id.into(),
                    tenant_id: "t-1".into(),
                    license_type: LicenseType::Reseller,
                    status: LicenseStatus::Active,
                    seats: 1,
                    starts_at,
                    expires_at: None,
                    meta: None,
                })
                .await;
        }

        let effective = store
            .find_effective_license("t-1", &[LicenseType::Reseller])
            .await
            .unwrap();
        assert_eq!(effective.map(|l| l.id).as_deref(), Some("lic-a"));
    }

    #[tokio::test]
    async fn test_oldest_tenant_ignores_status() {
        let store = MemoryStore::new();
        store
            .add_tenant(Tenant {
                id: "t-new".into(),
                slug: "new".into(),
                status: TenantStatus::Active,
                created_at: Utc::now(),
            })
            .await;
        store
            .add_tenant(Tenant {
                id: "t-old".into(),
                slug: "old".into(),
                status: TenantStatus::Suspended,
                created_at: Utc::now() - Duration::days(365),
            })
            .await;

        assert_eq!(
            store.find_oldest_tenant().await.unwrap().as_deref(),
            Some("t-old")
        );
        assert_eq!(store.find_active_tenant_by_slug("old").await.unwrap(), None);
        assert_eq!(store.query_count(), 2);
    }

    #[tokio::test]
    async fn test_unavailable_store_fails() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        assert!(matches!(
            store.find_oldest_tenant().await,
            Err(StoreError::Database(_))
        ));
    }
}
