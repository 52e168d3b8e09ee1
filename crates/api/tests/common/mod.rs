#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use jejuqa_core::adoption::AdoptionPolicy;
use jejuqa_core::badges::BadgeCheckQueue;
use jejuqa_core::memory::InMemoryStore;
use jejuqa_core::notify::ActivityNotifier;
use jejuqa_core::roles::{ROLE_ADMIN, ROLE_MEMBER};
use jejuqa_core::store::CommunityStore;
use jejuqa_core::types::DbId;
use jejuqa_events::{EventBus, EventBusNotifier};
use tower::ServiceExt;

use jejuqa_api::auth::jwt::{generate_access_token, JwtConfig};
use jejuqa_api::config::ServerConfig;
use jejuqa_api::router::build_app_router;
use jejuqa_api::state::{AppState, Services};

/// Build a test `ServerConfig` with safe defaults and the standard payout
/// (50 points, 25 bonus).
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
        adoption: AdoptionPolicy::default(),
        badge_queue_capacity: 16,
    }
}

/// Build the full application router over an in-memory store.
///
/// No badge worker runs: post-adoption checks are dropped, so badge state
/// only changes through the admin evaluation endpoint.
pub fn build_test_app(store: InMemoryStore) -> Router {
    let config = test_config();
    let store: Arc<dyn CommunityStore> = Arc::new(store);
    let event_bus = Arc::new(EventBus::default());
    let notifier: Arc<dyn ActivityNotifier> =
        Arc::new(EventBusNotifier::new(Arc::clone(&event_bus)));
    let (badge_queue, _receiver) = BadgeCheckQueue::channel(config.badge_queue_capacity);

    let state = AppState {
        config: Arc::new(config.clone()),
        store: Arc::clone(&store),
        services: Services::new(store, &config, badge_queue, notifier),
    };

    build_app_router(state, &config)
}

/// A valid access token for `user_id` with the given role.
pub fn token(user_id: DbId, role: &str) -> String {
    generate_access_token(user_id, role, &test_config().jwt).unwrap()
}

pub fn member_token(user_id: DbId) -> String {
    token(user_id, ROLE_MEMBER)
}

pub fn admin_token(user_id: DbId) -> String {
    token(user_id, ROLE_ADMIN)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
