pub mod admin;
pub mod health;
pub mod questions;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /questions/{id}/adoption                     adopt (POST), cancel (DELETE), status (GET)
///
/// /users/{id}/points                           balance (public)
/// /users/{id}/points/transactions              ledger history (self or admin)
/// /users/{id}/badges                           earned badges (public)
/// /users/{id}/badges/progress                  progress toward unheld badges (self or admin)
///
/// /admin/users/{id}/points                     manual adjustment (POST)
/// /admin/users/{id}/points/integrity           balance vs ledger check (GET)
/// /admin/users/{id}/points/repair              reset balance to ledger sum (POST)
/// /admin/badges/evaluate                       batch badge evaluation (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/questions", questions::router())
        .nest("/users", users::router())
        .nest("/admin", admin::router())
}
