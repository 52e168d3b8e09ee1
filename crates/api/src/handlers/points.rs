//! Handlers for `/users/{id}/points`.

use axum::extract::{Path, Query, State};
use axum::Json;
use jejuqa_core::points::PointTransaction;
use jejuqa_core::types::DbId;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub user_id: DbId,
    pub points: i64,
}

/// GET /api/v1/users/{id}/points
pub async fn balance(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<DataResponse<BalanceResponse>>> {
    let points = state.services.ledger.balance(user_id).await?;
    Ok(Json(DataResponse {
        data: BalanceResponse { user_id, points },
    }))
}

/// GET /api/v1/users/{id}/points/transactions?limit=&offset=
///
/// Newest first. Only the user themself or an admin may read the ledger.
pub async fn list_transactions(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<PointTransaction>>>> {
    user.ensure_self_or_admin(user_id)?;
    let rows = state
        .services
        .ledger
        .list_transactions(user_id, params.limit(), params.offset())
        .await?;
    Ok(Json(DataResponse { data: rows }))
}
