//! Tenant resolution: token claim, then host subdomain, then oldest tenant

use std::fmt;
use std::net::IpAddr;

use shared::error::AppError;

use crate::db::Store;
use crate::error::ServiceResult;

use super::Principal;

/// Which rule produced the tenant id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenantSource {
    Claim,
    Subdomain,
    Fallback,
}

impl fmt::Display for TenantSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Claim => "claim",
            Self::Subdomain => "subdomain",
            Self::Fallback => "fallback",
        })
    }
}

/// Candidate tenant slug from a `Host` header value
///
/// The first label of a host with at least three labels; `acme.example.com`
/// gives `acme`, `example.com` gives nothing.
pub fn host_slug(host: &str) -> Option<String> {
    let host = host.trim();
    // Bracketed IPv6, with or without a port
    if host.starts_with('[') {
        return None;
    }
    let host = match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    };
    if host.parse::<IpAddr>().is_ok() {
        return None;
    }

    let host = host.trim_end_matches('.').to_ascii_lowercase();
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 3 || labels.iter().any(|l| l.is_empty()) {
        return None;
    }
    Some(labels[0].to_string())
}

/// Resolve the tenant for one request
///
/// A tenant claim is trusted as-is and costs no store round trip.
pub async fn resolve_tenant(
    store: &dyn Store,
    principal: &Principal,
    host: Option<&str>,
) -> ServiceResult<(String, TenantSource)> {
    if let Some(claim) = &principal.tenant_claim {
        return Ok((claim.clone(), TenantSource::Claim));
    }

    if let Some(slug) = host.and_then(host_slug)
        && let Some(id) = store.find_active_tenant_by_slug(&slug).await?
    {
        return Ok((id, TenantSource::Subdomain));
    }

    match store.find_oldest_tenant().await? {
        Some(id) => {
            tracing::info!(
                tenant_id = %id,
                subject = %principal.subject,
                "No tenant claim or subdomain match, using oldest tenant"
            );
            Ok((id, TenantSource::Fallback))
        }
        None => Err(AppError::tenant_unresolved().into()),
    }
}
