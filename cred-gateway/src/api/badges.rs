use axum::{Extension, Json, extract::State};
use shared::models::Badge;

use crate::auth::AuthContext;
use crate::state::AppState;

use super::ApiResult;

/// GET /api/badges
pub async fn list_badges(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> ApiResult<Vec<Badge>> {
    let badges = state.store.list_badges(&ctx.tenant_id).await?;
    Ok(Json(badges))
}
