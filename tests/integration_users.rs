mod common;

use axum::http::StatusCode;
use common::{authed_request, create_test_user, json_request, make_admin, send, setup_test_app};
use docket::docket_core::crypto::verify_hash;
use docket::docket_db::Filter;
use serde_json::json;

#[tokio::test]
async fn test_get_own_user() {
    let (app, _) = setup_test_app();
    let user = create_test_user(&app).await;

    let (status, body) = send(
        &app,
        authed_request("GET", &format!("/api/user/{}", user.id), &user.token, None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payload"]["id"], user.id.to_string());
    assert_eq!(body["payload"]["username"], user.username);
    assert!(body["payload"].get("password").is_none());
}

#[tokio::test]
async fn test_get_other_user_forbidden() {
    let (app, _) = setup_test_app();
    let alice = create_test_user(&app).await;
    let bob = create_test_user(&app).await;

    let (status, body) = send(
        &app,
        authed_request("GET", &format!("/api/user/{}", bob.id), &alice.token, None),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["errors"], true);
}

#[tokio::test]
async fn test_admin_can_read_other_user() {
    let (app, state) = setup_test_app();
    let admin = create_test_user(&app).await;
    let bob = create_test_user(&app).await;
    make_admin(&state, &admin).await;

    let (status, body) = send(
        &app,
        authed_request("GET", &format!("/api/user/{}", bob.id), &admin.token, None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payload"]["username"], bob.username);
}

#[tokio::test]
async fn test_user_listing_is_scoped_to_caller() {
    let (app, state) = setup_test_app();
    let alice = create_test_user(&app).await;
    let admin = create_test_user(&app).await;
    make_admin(&state, &admin).await;

    let (status, body) = send(&app, authed_request("GET", "/api/user", &alice.token, None)).await;
    assert_eq!(status, StatusCode::OK);
    let users = body["payload"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["id"], alice.id.to_string());

    let (status, body) = send(&app, authed_request("GET", "/api/user", &admin.token, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payload"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_update_cannot_escalate_role() {
    let (app, state) = setup_test_app();
    let user = create_test_user(&app).await;

    let (status, body) = send(
        &app,
        authed_request(
            "POST",
            "/api/user/update",
            &user.token,
            Some(json!({ "id": user.id, "username": "renamed", "role": "ADMIN" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payload"]["username"], "renamed");
    assert_eq!(body["payload"]["role"], "USER");

    let stored = state.users.get(user.id).await.unwrap().unwrap();
    assert!(!stored.is_admin());
}

#[tokio::test]
async fn test_update_other_user_forbidden() {
    let (app, _) = setup_test_app();
    let alice = create_test_user(&app).await;
    let bob = create_test_user(&app).await;

    let (status, _) = send(
        &app,
        authed_request(
            "POST",
            "/api/user/update",
            &alice.token,
            Some(json!({ "id": bob.id, "username": "stolen" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_update_requires_valid_id() {
    let (app, _) = setup_test_app();
    let user = create_test_user(&app).await;

    let (status, body) = send(
        &app,
        authed_request(
            "POST",
            "/api/user/update",
            &user.token,
            Some(json!({ "id": "not-a-uuid", "username": "x" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "a valid id is required");
}

#[tokio::test]
async fn test_update_to_taken_username() {
    let (app, _) = setup_test_app();
    let alice = create_test_user(&app).await;
    let bob = create_test_user(&app).await;

    let (status, _) = send(
        &app,
        authed_request(
            "POST",
            "/api/user/update",
            &alice.token,
            Some(json!({ "id": alice.id, "username": bob.username })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_can_promote_user() {
    let (app, state) = setup_test_app();
    let admin = create_test_user(&app).await;
    let bob = create_test_user(&app).await;
    make_admin(&state, &admin).await;

    let (status, body) = send(
        &app,
        authed_request(
            "POST",
            "/api/user/update",
            &admin.token,
            Some(json!({ "id": bob.id, "role": "ADMIN" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payload"]["role"], "ADMIN");
}

#[tokio::test]
async fn test_delete_user_then_not_found() {
    let (app, state) = setup_test_app();
    let user = create_test_user(&app).await;
    let admin = create_test_user(&app).await;
    make_admin(&state, &admin).await;

    let (status, body) = send(
        &app,
        authed_request("DELETE", &format!("/api/user/{}", user.id), &user.token, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payload"], serde_json::Value::Null);

    let (status, _) = send(
        &app,
        authed_request("GET", &format!("/api/user/{}", user.id), &admin.token, None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_uuid_id() {
    let (app, _) = setup_test_app();
    let user = create_test_user(&app).await;

    let (status, _) = send(
        &app,
        authed_request("GET", "/api/user/not-an-id", &user.token, None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        authed_request("DELETE", "/api/user/not-an-id", &user.token, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_password_update_is_hashed() {
    let (app, state) = setup_test_app();
    let admin = create_test_user(&app).await;
    let bob = create_test_user(&app).await;
    make_admin(&state, &admin).await;

    let (status, body) = send(
        &app,
        authed_request(
            "POST",
            "/api/user/update",
            &admin.token,
            Some(json!({ "id": bob.id, "password": "new-password", "iv": "chosen" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["payload"].get("password").is_none());

    let stored = state.users.get(bob.id).await.unwrap().unwrap();
    assert_ne!(stored.password, "new-password");
    assert_ne!(stored.iv, "chosen");
    assert!(verify_hash("new-password", &stored.iv, &stored.password));

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/authenticate",
            json!({ "username": bob.username, "password": "new-password" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_created_user_can_authenticate() {
    let (app, state) = setup_test_app();
    let admin = create_test_user(&app).await;
    make_admin(&state, &admin).await;

    let (status, body) = send(
        &app,
        authed_request(
            "POST",
            "/api/user",
            &admin.token,
            Some(json!({ "username": "carol", "password": "carol-pass", "iv": "x" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payload"]["username"], "carol");

    let stored = state
        .users
        .find_one(&Filter::new().eq("username", "carol"))
        .await
        .unwrap()
        .unwrap();
    assert_ne!(stored.password, "carol-pass");
    assert_ne!(stored.iv, "x");

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/authenticate",
            json!({ "username": "carol", "password": "carol-pass" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["payload"]["token"].is_string());
}
