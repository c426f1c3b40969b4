//! Shared test harness: the full router over an in-memory database and an
//! in-memory disk, driven with `oneshot`.

#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, Response, StatusCode, header},
};
use catalog_api::{
    config::AppConfig, db, routes::routes, state::AppState, storage::MemoryDisk,
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "correct horse";
pub const PUBLIC_URL: &str = "http://test.local/storage";

/// Smallest byte string `infer` recognizes as a PNG.
pub const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];

const BOUNDARY: &str = "catalog-test-boundary";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub disk: Arc<MemoryDisk>,
    pub token: String,
}

impl TestApp {
    /// Fresh schema, one active user, and a token for that user.
    pub async fn new() -> Self {
        let pool = db::connect_in_memory().await.expect("in-memory pool");
        db::run_migrations(&pool).await.expect("migrations");

        let disk = Arc::new(MemoryDisk::new(PUBLIC_URL));
        let state = AppState::new(pool, disk.clone(), AppConfig::default());
        state
            .auth
            .create_user("Admin", ADMIN_EMAIL, ADMIN_PASSWORD)
            .await
            .expect("seed user");

        let mut app = Self {
            router: routes(state.clone()),
            state,
            disk,
            token: String::new(),
        };
        let (status, body) = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
        assert_eq!(status, StatusCode::CREATED, "login failed: {body}");
        app.token = body["data"]["token"].as_str().expect("token").to_string();
        app
    }

    /// Send a request to the test application.
    pub async fn request(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request")
    }

    pub async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
        let request = Request::post("/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                serde_json::json!({ "email": email, "password": password }).to_string(),
            ))
            .unwrap();
        read_json(self.request(request).await).await
    }

    /// Authenticated request with an optional JSON body.
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.send_as(&self.token, method, uri, body).await
    }

    pub async fn send_as(
        &self,
        token: &str,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"));
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();
        read_json(self.request(request).await).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, None).await
    }

    /// Multipart upload to `POST /v1/image`.
    pub async fn upload(&self, path: &str, file: &[u8]) -> (StatusCode, Value) {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"path\"\r\n\r\n{path}\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"upload.bin\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(file);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::post("/v1/image")
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        read_json(self.request(request).await).await
    }

    /// Upload a PNG and return its id.
    pub async fn create_image(&self) -> i64 {
        let (status, body) = self.upload("items", PNG).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["id"].as_i64().unwrap()
    }

    pub async fn create_option(&self, abbr: &str, title: &str) -> i64 {
        let (status, body) = self
            .post("/v1/option", serde_json::json!({ "abbr": abbr, "title": title }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["id"].as_i64().unwrap()
    }

    pub async fn create_item(&self, body: Value) -> Value {
        let (status, body) = self.post("/v1/item", body).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"].clone()
    }
}

pub async fn read_json(response: Response<Body>) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, body)
}

/// Sorted ids of a JSON array of resources.
pub fn ids(values: &Value) -> Vec<i64> {
    let mut ids = values
        .as_array()
        .expect("array")
        .iter()
        .map(|v| v["id"].as_i64().expect("id"))
        .collect::<Vec<_>>();
    ids.sort_unstable();
    ids
}
