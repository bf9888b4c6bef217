use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use docket::docket_config::{CorsConfig, JwtConfig};
use docket::router::{init_router, into_service};
use docket::state::AppState;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use tower_http::normalize_path::NormalizePath;
use uuid::Uuid;

pub const TEST_SECRET: &str = "test_secret_key_for_testing_purposes";

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig::new(TEST_SECRET, 3600)
}

/// The app as served: trailing slashes trimmed before routing.
pub type TestApp = NormalizePath<Router>;

pub fn setup_test_app() -> (TestApp, AppState) {
    let state = AppState::in_memory(
        test_jwt_config(),
        CorsConfig {
            allowed_origins: vec![],
        },
    );
    (into_service(init_router(state.clone())), state)
}

#[allow(dead_code)]
pub struct TestUser {
    pub id: Uuid,
    pub username: String,
    pub password: String,
    pub token: String,
}

pub fn generate_unique_username() -> String {
    format!("user-{}", Uuid::new_v4().simple())
}

pub async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, body)
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

#[allow(dead_code)]
pub fn authed_request(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-access-token", token);

    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn register(app: &TestApp, username: &str, password: &str) -> TestUser {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/auth/register",
            json!({ "username": username, "password": password }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register failed: {body}");

    TestUser {
        id: body["payload"]["user"]["id"]
            .as_str()
            .and_then(|id| Uuid::parse_str(id).ok())
            .unwrap(),
        username: username.to_string(),
        password: password.to_string(),
        token: body["payload"]["token"].as_str().unwrap().to_string(),
    }
}

#[allow(dead_code)]
pub async fn create_test_user(app: &TestApp) -> TestUser {
    register(app, &generate_unique_username(), "testpass123").await
}

/// Grants the admin role directly through storage.
#[allow(dead_code)]
pub async fn make_admin(state: &AppState, user: &TestUser) {
    let patch = json!({ "role": "ADMIN" }).as_object().cloned().unwrap();
    state.users.edit(user.id, patch).await.unwrap().unwrap();
}

#[allow(dead_code)]
pub async fn create_device(app: &TestApp, user: &TestUser, name: &str) -> Value {
    let (status, body) = send(
        app,
        authed_request("POST", "/api/device", &user.token, Some(json!({ "name": name }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "device create failed: {body}");
    body["payload"].clone()
}
