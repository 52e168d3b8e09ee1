//! Routes mounted at `/admin`. Every handler requires the admin role.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// ```text
/// POST /users/{id}/points             -> adjust_points
/// GET  /users/{id}/points/integrity   -> check_integrity
/// POST /users/{id}/points/repair      -> repair_integrity
/// POST /badges/evaluate               -> evaluate_badges
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/{id}/points", post(admin::adjust_points))
        .route("/users/{id}/points/integrity", get(admin::check_integrity))
        .route("/users/{id}/points/repair", post(admin::repair_integrity))
        .route("/badges/evaluate", post(admin::evaluate_badges))
}
