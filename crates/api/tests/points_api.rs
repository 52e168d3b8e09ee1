//! Integration tests for `/api/v1/users/{id}/points`.

mod common;

use axum::http::StatusCode;
use common::{admin_token, body_json, build_test_app, get, get_auth, member_token, post_json_auth};
use jejuqa_core::memory::InMemoryStore;
use jejuqa_core::roles::{ROLE_ADMIN, ROLE_MEMBER};
use serde_json::json;

#[tokio::test]
async fn balance_is_public() {
    let store = InMemoryStore::new();
    let user = store.insert_user("감귤", ROLE_MEMBER).await;
    store.overwrite_points(user, 120).await;

    let response = get(build_test_app(store), &format!("/api/v1/users/{user}/points")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["user_id"], user);
    assert_eq!(json["data"]["points"], 120);
}

#[tokio::test]
async fn balance_of_unknown_user_is_404() {
    let response = get(build_test_app(InMemoryStore::new()), "/api/v1/users/77/points").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "USER_NOT_FOUND");
}

#[tokio::test]
async fn transactions_are_newest_first_and_paginated() {
    let store = InMemoryStore::new();
    let admin = store.insert_user("관리자", ROLE_ADMIN).await;
    let user = store.insert_user("감귤", ROLE_MEMBER).await;
    for amount in [10, 20, 30] {
        let response = post_json_auth(
            build_test_app(store.clone()),
            &format!("/api/v1/admin/users/{user}/points"),
            &admin_token(admin),
            json!({"amount": amount, "description": "이벤트 보상"}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = get_auth(
        build_test_app(store.clone()),
        &format!("/api/v1/users/{user}/points/transactions?limit=2"),
        &member_token(user),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let rows = body_json(response).await["data"].as_array().unwrap().clone();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["amount"], 30);
    assert_eq!(rows[0]["balance"], 60);
    assert_eq!(rows[1]["amount"], 20);

    let response = get_auth(
        build_test_app(store),
        &format!("/api/v1/users/{user}/points/transactions?limit=2&offset=2"),
        &member_token(user),
    )
    .await;
    let rows = body_json(response).await["data"].as_array().unwrap().clone();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["amount"], 10);
    assert_eq!(rows[0]["balance"], 10);
}

#[tokio::test]
async fn transactions_of_another_member_are_forbidden() {
    let store = InMemoryStore::new();
    let user = store.insert_user("감귤", ROLE_MEMBER).await;
    let other = store.insert_user("한라봉", ROLE_MEMBER).await;

    let response = get_auth(
        build_test_app(store),
        &format!("/api/v1/users/{user}/points/transactions"),
        &member_token(other),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "FORBIDDEN");
}

#[tokio::test]
async fn admin_may_read_any_ledger() {
    let store = InMemoryStore::new();
    let admin = store.insert_user("관리자", ROLE_ADMIN).await;
    let user = store.insert_user("감귤", ROLE_MEMBER).await;

    let response = get_auth(
        build_test_app(store),
        &format!("/api/v1/users/{user}/points/transactions"),
        &admin_token(admin),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"], json!([]));
}

#[tokio::test]
async fn transactions_require_token() {
    let store = InMemoryStore::new();
    let user = store.insert_user("감귤", ROLE_MEMBER).await;

    let response = get(
        build_test_app(store),
        &format!("/api/v1/users/{user}/points/transactions"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
