//! Protected asset delivery
//!
//! Certificate artifacts are served either as a redirect to a short-lived
//! signed URL or as a streamed attachment. Which path applies is fixed when
//! [`AssetDelivery`] is built, never probed per request.

pub mod fs;
pub mod s3;

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use shared::error::AppError;

use crate::error::ServiceResult;

pub use fs::FsObjectStore;
pub use s3::S3ObjectStore;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const FALLBACK_FILENAME: &str = "certificate";

/// Object body plus its size when the backend knows it
pub struct StoredObject {
    pub body: Body,
    pub content_length: Option<u64>,
}

/// Read access to stored artifacts
///
/// A missing key is `Ok(None)` / `Ok(false)`; `Err` means the backend itself failed.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<StoredObject>, BoxError>;

    async fn exists(&self, key: &str) -> Result<bool, BoxError>;
}

/// Issues read-only, time-limited URLs for exactly one key
#[async_trait]
pub trait UrlSigner: Send + Sync {
    async fn signed_url(&self, key: &str, ttl: Duration) -> Result<String, BoxError>;
}

/// Delivery capability chosen at startup
#[derive(Clone)]
pub enum AssetDelivery {
    SigningCapable {
        store: Arc<dyn ObjectStore>,
        signer: Arc<dyn UrlSigner>,
    },
    StreamOnly {
        store: Arc<dyn ObjectStore>,
    },
}

impl std::fmt::Debug for AssetDelivery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::SigningCapable { .. } => "AssetDelivery::SigningCapable",
            Self::StreamOnly { .. } => "AssetDelivery::StreamOnly",
        })
    }
}

/// How a download is answered
pub enum DeliveryPlan {
    /// 302 to a signed URL
    Redirect(String),
    /// 200 with the object as a PDF attachment
    Stream {
        body: Body,
        content_disposition: HeaderValue,
        content_length: Option<u64>,
    },
}

impl AssetDelivery {
    /// Plan the download of `storage_key`, named after `title`
    pub async fn deliver(
        &self,
        storage_key: &str,
        title: &str,
        ttl: Duration,
    ) -> ServiceResult<DeliveryPlan> {
        match self {
            Self::SigningCapable { store, signer } => {
                if !store.exists(storage_key).await? {
                    tracing::warn!(key = %storage_key, "Asset missing from object store");
                    return Err(AppError::asset_not_found().into());
                }
                let url = signer.signed_url(storage_key, ttl).await?;
                Ok(DeliveryPlan::Redirect(url))
            }
            Self::StreamOnly { store } => {
                let Some(object) = store.get(storage_key).await? else {
                    tracing::warn!(key = %storage_key, "Asset missing from object store");
                    return Err(AppError::asset_not_found().into());
                };
                Ok(DeliveryPlan::Stream {
                    body: object.body,
                    content_disposition: attachment_disposition(title),
                    content_length: object.content_length,
                })
            }
        }
    }
}

impl IntoResponse for DeliveryPlan {
    fn into_response(self) -> Response {
        let no_store = (header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
        match self {
            Self::Redirect(url) => match HeaderValue::from_str(&url) {
                Ok(location) => (
                    StatusCode::FOUND,
                    [(header::LOCATION, location), no_store],
                )
                    .into_response(),
                Err(_) => {
                    AppError::internal("Signed URL is not a valid header value").into_response()
                }
            },
            Self::Stream {
                body,
                content_disposition,
                content_length,
            } => {
                let mut response = (
                    StatusCode::OK,
                    [
                        (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
                        (header::CONTENT_DISPOSITION, content_disposition),
                        no_store,
                    ],
                    body,
                )
                    .into_response();
                if let Some(len) = content_length {
                    response
                        .headers_mut()
                        .insert(header::CONTENT_LENGTH, HeaderValue::from(len));
                }
                response
            }
        }
    }
}

/// Title without quotes, slashes or control characters
fn sanitize_title(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| !c.is_control() && !matches!(c, '"' | '\\' | '/'))
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        cleaned.to_string()
    }
}

/// `attachment; filename="<title>.pdf"`, plus `filename*` for non-ASCII titles
pub fn attachment_disposition(title: &str) -> HeaderValue {
    let name = sanitize_title(title);

    let value = if name.is_ascii() {
        format!("attachment; filename=\"{name}.pdf\"")
    } else {
        let ascii: String = name
            .chars()
            .map(|c| if c.is_ascii() { c } else { '_' })
            .collect();
        let mut encoded = String::new();
        for byte in format!("{name}.pdf").bytes() {
            if byte.is_ascii_alphanumeric() || b"!#$&+-.^_`|~".contains(&byte) {
                encoded.push(byte as char);
            } else {
                let _ = write!(encoded, "%{byte:02X}");
            }
        }
        format!("attachment; filename=\"{ascii}.pdf\"; filename*=UTF-8''{encoded}")
    };

    HeaderValue::from_str(&value)
        .unwrap_or_else(|_| HeaderValue::from_static("attachment; filename=\"certificate.pdf\""))
}
