//! Badge Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Badge issued to a tenant (read-only for the gateway)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub icon_url: Option<String>,
    pub status: String,
    /// Ascending sort key for display
    pub display_order: i32,
    pub issued_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}
