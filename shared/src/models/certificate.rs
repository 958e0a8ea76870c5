//! Certificate Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Certificate record with a PDF artifact in the object store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub id: String,
    pub tenant_id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub cert_type: String,
    pub status: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    /// Object store key of the artifact, never sent to clients
    #[serde(skip)]
    pub file_key: Option<String>,
}

impl Certificate {
    /// Gateway path that serves the artifact
    pub fn download_path(&self) -> String {
        format!("/api/certificates/{}/download", self.id)
    }
}

/// Certificate as listed to clients, with its download link
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateListItem {
    #[serde(flatten)]
    pub certificate: Certificate,
    pub download_url: String,
}

impl From<Certificate> for CertificateListItem {
    fn from(certificate: Certificate) -> Self {
        Self {
            download_url: certificate.download_path(),
            certificate,
        }
    }
}
