//! Routes mounted at `/questions`.

use axum::routing::get;
use axum::Router;

use crate::handlers::adoption;
use crate::state::AppState;

/// ```text
/// GET    /{id}/adoption   -> status
/// POST   /{id}/adoption   -> adopt
/// DELETE /{id}/adoption   -> cancel
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/{id}/adoption",
        get(adoption::status)
            .post(adoption::adopt)
            .delete(adoption::cancel),
    )
}
