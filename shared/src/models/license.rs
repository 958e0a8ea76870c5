//! License Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Resource class a license entitles its tenant to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseType {
    Affiliate,
    Reseller,
    Enterprise,
}

impl LicenseType {
    pub const ALL: [LicenseType; 3] = [Self::Affiliate, Self::Reseller, Self::Enterprise];

    /// Parse from database string value (lowercase)
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "affiliate" => Some(Self::Affiliate),
            "reseller" => Some(Self::Reseller),
            "enterprise" => Some(Self::Enterprise),
            _ => None,
        }
    }

    /// Database string representation (lowercase)
    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Affiliate => "affiliate",
            Self::Reseller => "reseller",
            Self::Enterprise => "enterprise",
        }
    }
}

impl std::fmt::Display for LicenseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_db())
    }
}

/// License lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseStatus {
    Active,
    Inactive,
    Revoked,
}

impl LicenseStatus {
    /// Parse from database string value (lowercase)
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            "revoked" => Some(Self::Revoked),
            _ => None,
        }
    }

    /// Database string representation (lowercase)
    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Revoked => "revoked",
        }
    }
}

/// License held by exactly one tenant
///
/// `expires_at = None` means the license never expires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct License {
    pub id: String,
    pub tenant_id: String,
    pub license_type: LicenseType,
    pub status: LicenseStatus,
    pub seats: i32,
    pub starts_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    /// Opaque structured data attached at purchase time
    pub meta: Option<Value>,
}

impl License {
    /// Active and not yet expired at `now`
    pub fn is_current_at(&self, now: DateTime<Utc>) -> bool {
        self.status == LicenseStatus::Active && self.expires_at.is_none_or(|exp| exp > now)
    }
}

/// Insert payload for a purchased license (always created `active`)
#[derive(Debug, Clone)]
pub struct NewLicense {
    pub tenant_id: String,
    pub license_type: LicenseType,
    pub seats: i32,
    /// `None` defaults to the store's current time
    pub starts_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub meta: Option<Value>,
}
