//! Handlers for the `/admin` resource (point maintenance, badge runs).
//!
//! All handlers require the `admin` role via [`RequireAdmin`].

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use jejuqa_core::badges::BatchEvaluation;
use jejuqa_core::error::CoreError;
use jejuqa_core::points::{
    IntegrityReport, NewPointTransaction, PointTransaction, RepairReport, TX_ADMIN_ADJUSTMENT,
};
use jejuqa_core::types::DbId;
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Most users a single batch evaluation may cover.
pub const MAX_BATCH_USERS: usize = 500;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /admin/users/{id}/points`.
#[derive(Debug, Deserialize)]
pub struct AdjustPointsRequest {
    /// Signed: positive credits, negative debits.
    pub amount: i64,
    pub description: String,
}

/// Request body for `POST /admin/badges/evaluate`.
#[derive(Debug, Deserialize)]
pub struct EvaluateBadgesRequest {
    pub user_ids: Vec<DbId>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/users/{id}/points
///
/// Credit or debit a user through the ledger. Returns 201 with the new row.
pub async fn adjust_points(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(user_id): Path<DbId>,
    Json(input): Json<AdjustPointsRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<PointTransaction>>)> {
    let description = input.description.trim();
    if description.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "description must not be empty".into(),
        )));
    }

    let entry = NewPointTransaction::new(user_id, input.amount, TX_ADMIN_ADJUSTMENT, description)
        .with_metadata(json!({ "adminId": admin.user_id }));
    let record = state.services.ledger.add_points(entry).await?;

    tracing::info!(
        admin_id = admin.user_id,
        user_id,
        amount = input.amount,
        "Admin point adjustment"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: record })))
}

/// GET /api/v1/admin/users/{id}/points/integrity
pub async fn check_integrity(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<DataResponse<IntegrityReport>>> {
    let report = state.services.ledger.validate_integrity(user_id).await?;
    Ok(Json(DataResponse { data: report }))
}

/// POST /api/v1/admin/users/{id}/points/repair
pub async fn repair_integrity(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<DataResponse<RepairReport>>> {
    let report = state.services.ledger.repair_integrity(user_id).await?;
    Ok(Json(DataResponse { data: report }))
}

/// POST /api/v1/admin/badges/evaluate
///
/// Run badge evaluation for each listed user. Per-user failures are
/// reported in the body rather than failing the request.
pub async fn evaluate_badges(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(input): Json<EvaluateBadgesRequest>,
) -> AppResult<Json<DataResponse<BatchEvaluation>>> {
    if input.user_ids.is_empty() {
        return Err(AppError::BadRequest("user_ids must not be empty".into()));
    }
    if input.user_ids.len() > MAX_BATCH_USERS {
        return Err(AppError::BadRequest(format!(
            "At most {MAX_BATCH_USERS} users may be evaluated per request"
        )));
    }

    let result = state.services.badges.check_many(&input.user_ids).await;
    Ok(Json(DataResponse { data: result }))
}
