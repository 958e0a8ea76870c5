//! Local directory object store (stream-only)

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use axum::body::Body;
use tokio_util::io::ReaderStream;

use super::{BoxError, ObjectStore, StoredObject};

#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path for `key`, or `None` if the key would leave the root
    fn resolve(&self, key: &str) -> Option<PathBuf> {
        let relative = Path::new(key);
        if key.is_empty()
            || !relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)))
        {
            tracing::warn!(key = %key, "Rejected object key outside asset root");
            return None;
        }
        Some(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn get(&self, key: &str) -> Result<Option<StoredObject>, BoxError> {
        let Some(path) = self.resolve(key) else {
            return Ok(None);
        };

        let file = match tokio::fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let metadata = file.metadata().await?;
        if !metadata.is_file() {
            return Ok(None);
        }

        Ok(Some(StoredObject {
            content_length: Some(metadata.len()),
            body: Body::from_stream(ReaderStream::new(file)),
        }))
    }

    async fn exists(&self, key: &str) -> Result<bool, BoxError> {
        let Some(path) = self.resolve(key) else {
            return Ok(false);
        };
        match tokio::fs::metadata(&path).await {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
