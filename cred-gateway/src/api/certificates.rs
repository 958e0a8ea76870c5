//! Certificate listing and artifact download

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use shared::error::AppError;
use shared::models::CertificateListItem;

use crate::assets::DeliveryPlan;
use crate::auth::AuthContext;
use crate::error::ServiceResult;
use crate::state::AppState;

use super::ApiResult;

/// GET /api/certificates
pub async fn list_certificates(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> ApiResult<Vec<CertificateListItem>> {
    let certificates = state.store.list_certificates(&ctx.tenant_id).await?;
    Ok(Json(
        certificates
            .into_iter()
            .map(CertificateListItem::from)
            .collect(),
    ))
}

/// GET /api/certificates/{id}/download
///
/// Redirects to a signed URL when the backend can sign, otherwise streams
/// the PDF. Another tenant's certificate id reads as missing.
pub async fn download_certificate(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(certificate_id): Path<String>,
) -> ServiceResult<DeliveryPlan> {
    let certificate = state
        .store
        .find_certificate(&ctx.tenant_id, &certificate_id)
        .await?
        .ok_or_else(AppError::asset_not_found)?;

    let Some(file_key) = certificate.file_key.as_deref().filter(|k| !k.is_empty()) else {
        tracing::warn!(
            tenant_id = %ctx.tenant_id,
            certificate_id = %certificate_id,
            "Certificate has no stored artifact"
        );
        return Err(AppError::asset_not_found().into());
    };

    let plan = state
        .assets
        .deliver(file_key, &certificate.title, state.signed_url_ttl)
        .await?;

    tracing::info!(
        tenant_id = %ctx.tenant_id,
        subject = %ctx.principal.subject,
        certificate_id = %certificate_id,
        redirect = matches!(plan, DeliveryPlan::Redirect(_)),
        "Certificate download"
    );
    Ok(plan)
}
