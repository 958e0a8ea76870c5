//! Gateway configuration

use std::path::PathBuf;
use std::time::Duration;

use crate::auth::MissingRolePolicy;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const DEFAULT_SIGNED_URL_TTL_SECS: u64 = 300;

/// Where certificate artifacts live
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetBackend {
    /// S3 bucket; `signed_urls` selects the signing-capable delivery path
    S3 { bucket: String, signed_urls: bool },
    /// Local directory, stream-only
    Fs { root: PathBuf },
}

/// Gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Environment: development | staging | production
    pub environment: String,
    /// HTTP port
    pub http_port: u16,
    /// PostgreSQL connection URL
    pub database_url: String,
    /// Pool size
    pub database_max_connections: u32,
    /// HMAC secret for bearer credentials
    pub jwt_secret: String,
    /// Required `iss` claim
    pub jwt_issuer: String,
    /// Required `aud` claim
    pub jwt_audience: String,
    /// What to do when a verified credential carries no `role` claim
    pub missing_role_policy: MissingRolePolicy,
    /// Application name reported by /health
    pub app_name: String,
    /// Legal entity reported by /health
    pub legal_entity: String,
    pub asset_backend: AssetBackend,
    /// Lifetime of signed download URLs
    pub signed_url_ttl: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BoxError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| "development".into());

        let missing_role_policy = match lookup("MISSING_ROLE_POLICY") {
            None => MissingRolePolicy::Admin,
            Some(v) => v
                .parse()
                .map_err(|e: String| format!("MISSING_ROLE_POLICY: {e}"))?,
        };

        let asset_backend = match lookup("ASSET_BACKEND").as_deref().unwrap_or("s3") {
            "s3" => AssetBackend::S3 {
                bucket: lookup("ASSET_S3_BUCKET").unwrap_or_else(|| "sensitive-assets".into()),
                signed_urls: parse_bool(lookup("ASSET_SIGNED_URLS").as_deref(), true),
            },
            "fs" => AssetBackend::Fs {
                root: PathBuf::from(lookup("ASSET_FS_ROOT").unwrap_or_else(|| "assets".into())),
            },
            other => return Err(format!("ASSET_BACKEND must be s3 or fs, got {other}").into()),
        };

        let signed_url_ttl = Duration::from_secs(
            lookup("SIGNED_URL_TTL_SECS")
                .and_then(|v| v.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_SIGNED_URL_TTL_SECS),
        );

        Ok(Self {
            http_port: lookup("HTTP_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            database_url: lookup("DATABASE_URL").ok_or("DATABASE_URL must be set")?,
            database_max_connections: lookup("DATABASE_MAX_CONNECTIONS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            jwt_secret: require_secret(&lookup, "JWT_SECRET", &environment)?,
            jwt_issuer: require_secret(&lookup, "JWT_ISSUER", &environment)?,
            jwt_audience: require_secret(&lookup, "JWT_AUDIENCE", &environment)?,
            missing_role_policy,
            app_name: lookup("APP_NAME").unwrap_or_else(|| "cred-gateway".into()),
            legal_entity: lookup("LEGAL_ENTITY").unwrap_or_default(),
            asset_backend,
            signed_url_ttl,
            environment,
        })
    }
}

/// Require a secret variable: must be set and non-empty in non-development environments.
fn require_secret<F>(lookup: &F, name: &str, environment: &str) -> Result<String, BoxError>
where
    F: Fn(&str) -> Option<String>,
{
    let val = match lookup(name) {
        Some(v) => v,
        None => {
            if environment != "development" {
                return Err(format!("{name} must be set in {environment} environment").into());
            }
            format!("dev-{name}-not-for-production")
        }
    };
    if val.is_empty() && environment != "development" {
        return Err(format!("{name} must not be empty in {environment} environment").into());
    }
    Ok(val)
}

fn parse_bool(value: Option<&str>, default: bool) -> bool {
    match value.map(|v| v.trim().to_ascii_lowercase()) {
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => true,
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => false,
        _ => default,
    }
}
