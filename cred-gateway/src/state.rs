//! Application state shared by every route

use std::sync::Arc;
use std::time::Duration;

use crate::assets::{AssetDelivery, FsObjectStore, S3ObjectStore};
use crate::auth::{JwtConfig, TokenVerifier};
use crate::config::{AssetBackend, Config};
use crate::db::{PgStore, Store};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    /// Relational store (tenants, licenses, badges, certificates)
    pub store: Arc<dyn Store>,
    /// Certificate artifact delivery
    pub assets: Arc<AssetDelivery>,
    /// Bearer credential verifier
    pub verifier: Arc<TokenVerifier>,
    /// Lifetime of signed download URLs
    pub signed_url_ttl: Duration,
    /// Reported by /health
    pub app_name: String,
    pub legal_entity: String,
}

impl AppState {
    /// Connect to Postgres (running migrations) and build the asset backend
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let store =
            PgStore::connect(&config.database_url, config.database_max_connections).await?;
        tracing::info!("Database connected, migrations applied");

        let assets = match &config.asset_backend {
            AssetBackend::S3 {
                bucket,
                signed_urls,
            } => {
                let aws_config =
                    aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
                let s3 = Arc::new(S3ObjectStore::new(
                    aws_sdk_s3::Client::new(&aws_config),
                    bucket,
                ));
                tracing::info!(bucket = %s3.bucket(), signed_urls, "S3 asset backend");
                if *signed_urls {
                    AssetDelivery::SigningCapable {
                        store: s3.clone(),
                        signer: s3,
                    }
                } else {
                    AssetDelivery::StreamOnly { store: s3 }
                }
            }
            AssetBackend::Fs { root } => {
                tracing::info!(root = %root.display(), "Filesystem asset backend");
                AssetDelivery::StreamOnly {
                    store: Arc::new(FsObjectStore::new(root.clone())),
                }
            }
        };

        let verifier = TokenVerifier::new(JwtConfig {
            secret: config.jwt_secret.clone(),
            issuer: config.jwt_issuer.clone(),
            audience: config.jwt_audience.clone(),
            missing_role: config.missing_role_policy,
        });

        Ok(Self::from_parts(Arc::new(store), assets, verifier, config))
    }

    /// Assemble state from already-built collaborators
    pub fn from_parts(
        store: Arc<dyn Store>,
        assets: AssetDelivery,
        verifier: TokenVerifier,
        config: &Config,
    ) -> Self {
        Self {
            store,
            assets: Arc::new(assets),
            verifier: Arc::new(verifier),
            signed_url_ttl: config.signed_url_ttl,
            app_name: config.app_name.clone(),
            legal_entity: config.legal_entity.clone(),
        }
    }
}
