//! Routes mounted at `/users`.

use axum::routing::get;
use axum::Router;

use crate::handlers::{badges, points};
use crate::state::AppState;

/// ```text
/// GET /{id}/points                -> balance
/// GET /{id}/points/transactions   -> list_transactions
/// GET /{id}/badges                -> list_earned
/// GET /{id}/badges/progress       -> progress
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/points", get(points::balance))
        .route("/{id}/points/transactions", get(points::list_transactions))
        .route("/{id}/badges", get(badges::list_earned))
        .route("/{id}/badges/progress", get(badges::progress))
}
