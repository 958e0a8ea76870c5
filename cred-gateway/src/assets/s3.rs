//! S3 object store with presigned GET support

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use axum::body::Body;
use tokio_util::io::ReaderStream;

use super::{BoxError, ObjectStore, StoredObject, UrlSigner};

#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get(&self, key: &str) -> Result<Option<StoredObject>, BoxError> {
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(e) if e.as_service_error().is_some_and(|se| se.is_no_such_key()) => {
                return Ok(None);
            }
            Err(e) => {
                tracing::error!(
                    bucket = %self.bucket,
                    key = %key,
                    error = %DisplayErrorContext(&e),
                    "S3 get_object failed"
                );
                return Err(DisplayErrorContext(e).to_string().into());
            }
        };

        let content_length = output.content_length().and_then(|len| u64::try_from(len).ok());
        let reader = output.body.into_async_read();
        Ok(Some(StoredObject {
            body: Body::from_stream(ReaderStream::new(reader)),
            content_length,
        }))
    }

    async fn exists(&self, key: &str) -> Result<bool, BoxError> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => Ok(false),
            Err(e) => {
                tracing::error!(
                    bucket = %self.bucket,
                    key = %key,
                    error = %DisplayErrorContext(&e),
                    "S3 head_object failed"
                );
                Err(DisplayErrorContext(e).to_string().into())
            }
        }
    }
}

#[async_trait]
impl UrlSigner for S3ObjectStore {
    async fn signed_url(&self, key: &str, ttl: Duration) -> Result<String, BoxError> {
        let presigning = PresigningConfig::expires_in(ttl)?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| {
                tracing::error!(key = %key, error = %DisplayErrorContext(&e), "Failed to presign URL");
                DisplayErrorContext(e).to_string()
            })?;

        Ok(presigned.uri().to_string())
    }
}
