//! API routes for cred-gateway

pub mod badges;
pub mod certificates;
pub mod health;
pub mod licenses;

use axum::routing::{get, post};
use axum::{Router, middleware};
use shared::error::AppError;
use shared::models::{LicenseType, Role};
use tower_http::trace::TraceLayer;

use crate::auth::{Guard, Requirement, authorize};
use crate::error::ServiceError;
use crate::state::AppState;

pub type ApiResult<T> = Result<axum::Json<T>, ServiceError>;

const BADGE_LICENSES: &[LicenseType] = &[
    LicenseType::Reseller,
    LicenseType::Enterprise,
    LicenseType::Affiliate,
];

const CERTIFICATE_LICENSES: &[LicenseType] = &[LicenseType::Reseller, LicenseType::Enterprise];

const PURCHASE_ROLES: &[Role] = &[Role::Admin, Role::Owner, Role::Reseller];

/// Create the combined router
///
/// Every `/api` route runs the authorization pipeline through `route_layer`,
/// so unmatched paths fall through to a plain 404 without authenticating.
pub fn create_router(state: AppState) -> Router {
    let badges = Router::new()
        .route("/api/badges", get(badges::list_badges))
        .route_layer(middleware::from_fn_with_state(
            Guard::new(state.clone(), Requirement::Licensed(BADGE_LICENSES)),
            authorize,
        ));

    let certificates = Router::new()
        .route("/api/certificates", get(certificates::list_certificates))
        .route(
            "/api/certificates/{id}/download",
            get(certificates::download_certificate),
        )
        .route_layer(middleware::from_fn_with_state(
            Guard::new(state.clone(), Requirement::Licensed(CERTIFICATE_LICENSES)),
            authorize,
        ));

    let tenant_scoped = Router::new()
        .route("/api/licenses/current", get(licenses::current_license))
        .route("/api/licenses/verify", post(licenses::verify_license))
        .route_layer(middleware::from_fn_with_state(
            Guard::new(state.clone(), Requirement::TenantScoped),
            authorize,
        ));

    let purchase = Router::new()
        .route("/api/licenses/purchase", post(licenses::purchase_license))
        .route_layer(middleware::from_fn_with_state(
            Guard::new(state.clone(), Requirement::Role(PURCHASE_ROLES)),
            authorize,
        ));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(badges)
        .merge(certificates)
        .merge(tenant_scoped)
        .merge(purchase)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found() -> AppError {
    AppError::not_found("Route")
}
