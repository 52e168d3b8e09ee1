use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use jejuqa_core::error::CoreError;
use jejuqa_core::store::StoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Renders as `{"error": ..., "code": ...}` JSON.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core_error(core),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    let message = err.to_string();
    match err {
        CoreError::QuestionNotFound(_) => (StatusCode::NOT_FOUND, "QUESTION_NOT_FOUND", message),
        CoreError::AnswerNotFound(_) => (StatusCode::NOT_FOUND, "ANSWER_NOT_FOUND", message),
        CoreError::UserNotFound(_) => (StatusCode::NOT_FOUND, "USER_NOT_FOUND", message),
        CoreError::NotAuthorized => (StatusCode::FORBIDDEN, "NOT_AUTHORIZED", message),
        CoreError::AnswerQuestionMismatch { .. } => {
            (StatusCode::BAD_REQUEST, "ANSWER_QUESTION_MISMATCH", message)
        }
        CoreError::AuthorMismatch { .. } => (StatusCode::BAD_REQUEST, "AUTHOR_MISMATCH", message),
        CoreError::SelfAdoptionForbidden => {
            (StatusCode::BAD_REQUEST, "SELF_ADOPTION_FORBIDDEN", message)
        }
        CoreError::NoActiveAdoption(_) => (StatusCode::CONFLICT, "NO_ACTIVE_ADOPTION", message),
        CoreError::InsufficientPoints { .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "INSUFFICIENT_POINTS",
            message,
        ),
        CoreError::DuplicateBadgeGrant { .. } => (StatusCode::CONFLICT, "CONFLICT", message),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        CoreError::BadgeCondition { .. } => {
            tracing::error!(error = %err, "Invalid badge definition");
            internal()
        }
        CoreError::Store(StoreError::UniqueViolation(constraint)) => (
            StatusCode::CONFLICT,
            "CONFLICT",
            format!("Duplicate value violates unique constraint: {constraint}"),
        ),
        CoreError::Store(StoreError::Backend(detail)) => {
            tracing::error!(error = %detail, "Storage error");
            internal()
        }
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}
