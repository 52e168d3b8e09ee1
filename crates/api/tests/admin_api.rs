//! Integration tests for the `/api/v1/admin` routes.

mod common;

use axum::http::StatusCode;
use common::{
    admin_token, body_json, build_test_app, get_auth, member_token, post_auth, post_json_auth,
};
use jejuqa_core::badges::BADGE_TYPE_ACHIEVEMENT;
use jejuqa_core::memory::{InMemoryStore, NewBadge};
use jejuqa_core::points::TX_ADMIN_ADJUSTMENT;
use jejuqa_core::roles::{ROLE_ADMIN, ROLE_MEMBER};
use serde_json::json;

// ---------------------------------------------------------------------------
// Point adjustments
// ---------------------------------------------------------------------------

#[tokio::test]
async fn adjustment_is_recorded_in_ledger() {
    let store = InMemoryStore::new();
    let admin = store.insert_user("관리자", ROLE_ADMIN).await;
    let user = store.insert_user("감귤", ROLE_MEMBER).await;

    let response = post_json_auth(
        build_test_app(store.clone()),
        &format!("/api/v1/admin/users/{user}/points"),
        &admin_token(admin),
        json!({"amount": 200, "description": "오류 보상"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["amount"], 200);
    assert_eq!(json["data"]["balance"], 200);
    assert_eq!(json["data"]["transaction_type"], TX_ADMIN_ADJUSTMENT);
    assert_eq!(json["data"]["metadata"]["adminId"], admin);

    assert_eq!(store.user(user).await.unwrap().points, 200);
}

#[tokio::test]
async fn overdraft_is_rejected() {
    let store = InMemoryStore::new();
    let admin = store.insert_user("관리자", ROLE_ADMIN).await;
    let user = store.insert_user("감귤", ROLE_MEMBER).await;

    let response = post_json_auth(
        build_test_app(store.clone()),
        &format!("/api/v1/admin/users/{user}/points"),
        &admin_token(admin),
        json!({"amount": -10, "description": "회수"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["code"], "INSUFFICIENT_POINTS");
    assert!(store.transactions_for(user).await.is_empty());
}

#[tokio::test]
async fn zero_amount_and_blank_description_are_invalid() {
    let store = InMemoryStore::new();
    let admin = store.insert_user("관리자", ROLE_ADMIN).await;
    let user = store.insert_user("감귤", ROLE_MEMBER).await;
    let uri = format!("/api/v1/admin/users/{user}/points");

    let response = post_json_auth(
        build_test_app(store.clone()),
        &uri,
        &admin_token(admin),
        json!({"amount": 0, "description": "nothing"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let response = post_json_auth(
        build_test_app(store),
        &uri,
        &admin_token(admin),
        json!({"amount": 5, "description": "   "}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn members_cannot_adjust_points() {
    let store = InMemoryStore::new();
    let user = store.insert_user("감귤", ROLE_MEMBER).await;

    let response = post_json_auth(
        build_test_app(store.clone()),
        &format!("/api/v1/admin/users/{user}/points"),
        &member_token(user),
        json!({"amount": 1000, "description": "셀프 보상"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(store.user(user).await.unwrap().points, 0);
}

// ---------------------------------------------------------------------------
// Integrity
// ---------------------------------------------------------------------------

#[tokio::test]
async fn integrity_detects_and_repairs_drift() {
    let store = InMemoryStore::new();
    let admin = store.insert_user("관리자", ROLE_ADMIN).await;
    let user = store.insert_user("감귤", ROLE_MEMBER).await;
    let token = admin_token(admin);

    post_json_auth(
        build_test_app(store.clone()),
        &format!("/api/v1/admin/users/{user}/points"),
        &token,
        json!({"amount": 40, "description": "이벤트"}),
    )
    .await;
    store.overwrite_points(user, 55).await;

    let response = get_auth(
        build_test_app(store.clone()),
        &format!("/api/v1/admin/users/{user}/points/integrity"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let report = body_json(response).await;
    assert_eq!(report["data"]["is_valid"], false);
    assert_eq!(report["data"]["actual_points"], 55);
    assert_eq!(report["data"]["expected_points"], 40);
    assert_eq!(report["data"]["discrepancy"], 15);
    assert_eq!(report["data"]["transaction_count"], 1);

    let response = post_auth(
        build_test_app(store.clone()),
        &format!("/api/v1/admin/users/{user}/points/repair"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let repair = body_json(response).await;
    assert_eq!(repair["data"]["repaired"], true);
    assert_eq!(repair["data"]["before"], 55);
    assert_eq!(repair["data"]["after"], 40);

    assert_eq!(store.user(user).await.unwrap().points, 40);
}

#[tokio::test]
async fn repair_of_consistent_balance_is_noop() {
    let store = InMemoryStore::new();
    let admin = store.insert_user("관리자", ROLE_ADMIN).await;
    let user = store.insert_user("감귤", ROLE_MEMBER).await;

    let response = post_auth(
        build_test_app(store),
        &format!("/api/v1/admin/users/{user}/points/repair"),
        &admin_token(admin),
    )
    .await;

    let repair = body_json(response).await;
    assert_eq!(repair["data"]["repaired"], false);
    assert_eq!(repair["data"]["after"], 0);
}

// ---------------------------------------------------------------------------
// Batch badge evaluation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn batch_evaluation_grants_and_reports_failures() {
    let store = InMemoryStore::new();
    store
        .insert_badge(NewBadge {
            code: "first_answer".to_string(),
            name: "첫 답변".to_string(),
            badge_type: BADGE_TYPE_ACHIEVEMENT.to_string(),
            condition: json!({"type": "first_answer"}),
            required_answers: 0,
            required_adopt_rate: None,
            bonus_points: 10,
            is_active: true,
        })
        .await;
    let admin = store.insert_user("관리자", ROLE_ADMIN).await;
    let user = store.insert_user("감귤", ROLE_MEMBER).await;
    let question = store.insert_question(admin, "새별오름 억새 시기?").await;
    store.insert_answer(question, user).await;

    let response = post_json_auth(
        build_test_app(store.clone()),
        "/api/v1/admin/badges/evaluate",
        &admin_token(admin),
        json!({"user_ids": [user, 4242]}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["evaluated"], 2);
    assert_eq!(json["data"]["granted"][0]["user_id"], user);
    assert_eq!(json["data"]["granted"][0]["badge_codes"], json!(["first_answer"]));
    assert_eq!(json["data"]["failures"][0]["user_id"], 4242);

    assert_eq!(store.badge_codes_for(user).await, vec!["first_answer"]);
    assert_eq!(store.user(user).await.unwrap().points, 10);
}

#[tokio::test]
async fn batch_evaluation_rejects_empty_list() {
    let store = InMemoryStore::new();
    let admin = store.insert_user("관리자", ROLE_ADMIN).await;

    let response = post_json_auth(
        build_test_app(store),
        "/api/v1/admin/badges/evaluate",
        &admin_token(admin),
        json!({"user_ids": []}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}
