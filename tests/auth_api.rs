mod common;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use catalog_api::jobs::token_sweep::sweep_expired_tokens;
use common::{ADMIN_EMAIL, ADMIN_PASSWORD, TestApp, read_json};
use serde_json::json;

#[tokio::test]
async fn login_issues_a_working_token() {
    let app = TestApp::new().await;
    let (status, body) = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    assert_eq!(status, StatusCode::CREATED);
    let token = body["data"]["token"].as_str().unwrap();

    let (status, body) = app.send_as(token, Method::POST, "/auth/me", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], ADMIN_EMAIL);
    assert_eq!(body["data"]["status"], "ACTIVE");
    assert!(body["data"].get("password").is_none());
}

#[tokio::test]
async fn login_distinguishes_unknown_user_from_wrong_password() {
    let app = TestApp::new().await;

    let (status, body) = app.login("nobody@example.com", "whatever").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["msg"], "User not found");

    let (status, body) = app.login(ADMIN_EMAIL, "wrong").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 400);

    let (status, _) = app.login("not-an-email", "whatever").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let app = TestApp::new().await;

    let request = Request::get("/v1/item").body(Body::empty()).unwrap();
    let (status, body) = read_json(app.request(request).await).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], 401);

    let (status, _) = app.send_as("forged", Method::GET, "/v1/option", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app
        .send_as("forged", Method::POST, "/v1/option", Some(json!({"abbr": "a", "title": "A"})))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_revokes_every_token_of_the_user() {
    let app = TestApp::new().await;
    let (_, body) = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let second = body["data"]["token"].as_str().unwrap().to_string();

    let (status, body) = app.send(Method::POST, "/auth/logout", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], true);

    let (status, _) = app.send(Method::POST, "/auth/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app.send_as(&second, Method::POST, "/auth/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_tokens_are_refused_and_swept() {
    let app = TestApp::new().await;
    sqlx::query("UPDATE auth_tokens SET expires_at = ?")
        .bind(chrono::Utc::now() - chrono::Duration::minutes(1))
        .execute(&*app.state.db)
        .await
        .unwrap();

    let (status, _) = app.send(Method::POST, "/auth/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert_eq!(sweep_expired_tokens(&app.state.db).await.unwrap(), 1);
    assert_eq!(sweep_expired_tokens(&app.state.db).await.unwrap(), 0);
}

#[tokio::test]
async fn health_and_fallback() {
    let app = TestApp::new().await;

    let request = Request::get("/healthz").body(Body::empty()).unwrap();
    let (status, body) = read_json(app.request(request).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let request = Request::get("/readyz").body(Body::empty()).unwrap();
    let (status, body) = read_json(app.request(request).await).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["checks"]["disk"]["ok"], true);
    assert!(app.disk.is_empty().await);

    let request = Request::get("/v2/nothing").body(Body::empty()).unwrap();
    let (status, body) = read_json(app.request(request).await).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"message": "Endpoint not exist."}));
}
