//! Handlers for `/questions/{id}/adoption`.

use axum::extract::{Path, State};
use axum::Json;
use jejuqa_core::adoption::{AdoptAnswer, AdoptionResult, AdoptionStatus, CancelResult};
use jejuqa_core::types::DbId;
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /questions/{id}/adoption`.
#[derive(Debug, Deserialize)]
pub struct AdoptRequest {
    pub answer_id: DbId,
    /// The author of `answer_id`, as displayed to the adopter.
    pub answerer_id: DbId,
}

/// POST /api/v1/questions/{id}/adoption
///
/// The caller adopts an answer on their own question.
pub async fn adopt(
    State(state): State<AppState>,
    user: AuthUser,
    Path(question_id): Path<DbId>,
    Json(input): Json<AdoptRequest>,
) -> AppResult<Json<DataResponse<AdoptionResult>>> {
    let result = state
        .services
        .adoption
        .adopt(AdoptAnswer {
            question_id,
            answer_id: input.answer_id,
            adopter_id: user.user_id,
            answerer_id: input.answerer_id,
        })
        .await?;
    Ok(Json(DataResponse { data: result }))
}

/// DELETE /api/v1/questions/{id}/adoption
pub async fn cancel(
    State(state): State<AppState>,
    user: AuthUser,
    Path(question_id): Path<DbId>,
) -> AppResult<Json<DataResponse<CancelResult>>> {
    let result = state
        .services
        .adoption
        .cancel(question_id, user.user_id)
        .await?;
    Ok(Json(DataResponse { data: result }))
}

/// GET /api/v1/questions/{id}/adoption
pub async fn status(
    State(state): State<AppState>,
    Path(question_id): Path<DbId>,
) -> AppResult<Json<DataResponse<AdoptionStatus>>> {
    let status = state.services.adoption.status(question_id).await?;
    Ok(Json(DataResponse { data: status }))
}
