//! Handlers for `/users/{id}/badges`.

use axum::extract::{Path, State};
use axum::Json;
use jejuqa_core::badges::{BadgeProgress, EarnedBadge};
use jejuqa_core::types::DbId;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/users/{id}/badges
pub async fn list_earned(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<EarnedBadge>>>> {
    let badges = state.services.badges.user_badges(user_id).await?;
    Ok(Json(DataResponse { data: badges }))
}

/// GET /api/v1/users/{id}/badges/progress
pub async fn progress(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<BadgeProgress>>>> {
    user.ensure_self_or_admin(user_id)?;
    let progress = state.services.badges.progress(user_id).await?;
    Ok(Json(DataResponse { data: progress }))
}
