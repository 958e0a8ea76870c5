//! Shared fixtures for router tests: in-memory store, fake object store, token minting

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use chrono::Utc;
use cred_gateway::assets::{AssetDelivery, ObjectStore, StoredObject, UrlSigner};
use cred_gateway::auth::{Claims, JwtConfig, MissingRolePolicy, TokenVerifier};
use cred_gateway::db::MemoryStore;
use cred_gateway::{AppState, Config, api};
use http_body_util::BodyExt;
use shared::models::{
    Badge, Certificate, License, LicenseStatus, LicenseType, Tenant, TenantStatus,
};
use tower::ServiceExt;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub const SECRET: &str = "router-test-secret-0123456789abcdef";
pub const ISSUER: &str = "https://auth.example.com";
pub const AUDIENCE: &str = "cred-api";
pub const TENANT: &str = "t-acme";

#[derive(Default)]
pub struct FakeObjects {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl FakeObjects {
    pub fn put(&self, key: &str, bytes: &[u8]) {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), bytes.to_vec());
    }
}

#[async_trait]
impl ObjectStore for FakeObjects {
    async fn get(&self, key: &str) -> Result<Option<StoredObject>, BoxError> {
        let objects = self.objects.lock().unwrap();
        Ok(objects.get(key).map(|bytes| StoredObject {
            content_length: Some(bytes.len() as u64),
            body: Body::from(bytes.clone()),
        }))
    }

    async fn exists(&self, key: &str) -> Result<bool, BoxError> {
        Ok(self.objects.lock().unwrap().contains_key(key))
    }
}

pub struct FakeSigner;

#[async_trait]
impl UrlSigner for FakeSigner {
    async fn signed_url(&self, key: &str, ttl: Duration) -> Result<String, BoxError> {
        Ok(format!(
            "https://assets.example.com/{key}?expires={}",
            ttl.as_secs()
        ))
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: MemoryStore,
    pub objects: Arc<FakeObjects>,
    pub verifier: TokenVerifier,
}

fn config() -> Config {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("DATABASE_URL", "postgres://unused/test"),
        ("JWT_SECRET", SECRET),
        ("JWT_ISSUER", ISSUER),
        ("JWT_AUDIENCE", AUDIENCE),
        ("APP_NAME", "cred-gateway-test"),
    ]);
    Config::from_lookup(|name| vars.get(name).map(|v| v.to_string())).unwrap()
}

fn verifier() -> TokenVerifier {
    TokenVerifier::new(JwtConfig {
        secret: SECRET.into(),
        issuer: ISSUER.into(),
        audience: AUDIENCE.into(),
        missing_role: MissingRolePolicy::Admin,
    })
}

/// Build the router over fresh fakes; `signing` selects the delivery capability
pub fn app(signing: bool) -> TestApp {
    let store = MemoryStore::new();
    let objects = Arc::new(FakeObjects::default());
    let assets = if signing {
        AssetDelivery::SigningCapable {
            store: objects.clone(),
            signer: Arc::new(FakeSigner),
        }
    } else {
        AssetDelivery::StreamOnly {
            store: objects.clone(),
        }
    };

    let state = AppState::from_parts(Arc::new(store.clone()), assets, verifier(), &config());
    TestApp {
        router: api::create_router(state),
        store,
        objects,
        verifier: verifier(),
    }
}

impl TestApp {
    pub fn token(&self, role: Option<&str>, tenant: Option<&str>) -> String {
        self.verifier
            .issue(
                &Claims {
                    sub: Some("user-1".into()),
                    role: role.map(str::to_string),
                    tenant_id: tenant.map(str::to_string),
                    email: Some("user@acme.test".into()),
                },
                chrono::Duration::minutes(10),
            )
            .unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response<Body> {
        self.send(request("GET", uri, token, Body::empty())).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: &str) -> Response<Body> {
        self.send(request("POST", uri, token, Body::from(body.to_string())))
            .await
    }

    pub async fn seed_tenant(&self, id: &str, slug: &str, age_days: i64) {
        self.store
            .add_tenant(Tenant {
                id: id.into(),
                slug: slug.into(),
                status: TenantStatus::Active,
                created_at: Utc::now() - chrono::Duration::days(age_days),
            })
            .await;
    }

    pub async fn seed_license(&self, tenant_id: &str, license_type: LicenseType) {
        self.store
            .add_license(License {
                id: format!("lic-{tenant_id}-{license_type}"),
                tenant_id: tenant_id.into(),
                license_type,
                status: LicenseStatus::Active,
                seats: 3,
                starts_at: Utc::now() - chrono::Duration::days(7),
                expires_at: None,
                meta: None,
            })
            .await;
    }

    pub async fn seed_badge(&self, id: &str, order: i32, days_ago: i64) {
        self.store
            .add_badge(Badge {
                id: id.into(),
                tenant_id: TENANT.into(),
                name: format!("Badge {id}"),
                icon_url: None,
                status: "active".into(),
                display_order: order,
                issued_at: Utc::now() - chrono::Duration::days(days_ago),
                expires_at: None,
            })
            .await;
    }

    pub async fn seed_certificate(&self, id: &str, title: &str, file_key: Option<&str>) {
        self.store
            .add_certificate(Certificate {
                id: id.into(),
                tenant_id: TENANT.into(),
                title: title.into(),
                cert_type: "resale".into(),
                status: "issued".into(),
                issued_at: Utc::now(),
                expires_at: None,
                file_key: file_key.map(str::to_string),
            })
            .await;
    }
}

pub fn request(method: &str, uri: &str, token: Option<&str>, body: Body) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::HOST, "api.example.com");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(body).unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
