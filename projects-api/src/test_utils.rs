use crate::config::ApiConfig;
use crate::create_app;
use crate::state::AppState;
use crate::store::memory::MemoryStore;
use crate::store::DataBackend;
use axum::body::Body;
use axum::Router;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use log::LevelFilter;
use projects_model::{PermissionGrant, PermissionLevel};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Build an unsigned test JWT with the given claims.
///
/// The server checks claims only (signature verification belongs to the STS
/// middleware), so an `alg: none` token is enough for in-process tests.
pub fn test_token_with_claims(claims: Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());
    format!("{header}.{payload}.sig")
}

/// A test token for `subject` with the fixture's audience and a future expiry
pub fn test_token(subject: &str) -> String {
    let exp = chrono::Utc::now().timestamp() + 3600;
    test_token_with_claims(serde_json::json!({
        "sub": subject,
        "aud": "projects-api",
        "exp": exp,
    }))
}

/// Test fixture wiring the full router around a shared in-memory store.
///
/// The fixture keeps its own handle to the store, so tests can arrange rows
/// directly and then exercise them through the HTTP surface.
pub struct TestFixture {
    pub app: Router,
    pub config: ApiConfig,
    pub store: MemoryStore,
}

impl TestFixture {
    pub async fn new() -> Self {
        let _ = env_logger::builder()
            .filter_level(LevelFilter::Debug)
            .is_test(true)
            .try_init();

        let config = ApiConfig::default();
        let store = MemoryStore::new();
        let state = AppState::with_store(config.clone(), Arc::new(store.clone()));
        let app = create_app(state).await;

        Self { app, config, store }
    }

    /// Shorthand for arranging a permission grant row
    pub async fn grant(&self, user: &str, project_id: i64, level: PermissionLevel) {
        self.store
            .insert_grant(PermissionGrant {
                user_profile_id: user.to_string(),
                project_id: Some(project_id),
                level,
            })
            .await;
    }

    fn request_builder(&self, method: Method, uri: &str, subject: &str) -> http::request::Builder {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("Authorization", format!("Bearer {}", test_token(subject)))
            .header("Content-Type", "application/json")
    }

    pub async fn get(&self, uri: &str, subject: &str) -> TestResponse {
        let request = self
            .request_builder(Method::GET, uri, subject)
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(request).await
    }

    pub async fn get_unauthenticated(&self, uri: &str) -> TestResponse {
        let request = Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(request).await
    }

    pub async fn get_with_header(&self, uri: &str, authorization: &str) -> TestResponse {
        let request = Request::builder()
            .uri(uri)
            .header("Authorization", authorization)
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(request).await
    }

    pub async fn post<T: Serialize>(&self, uri: &str, subject: &str, body: &T) -> TestResponse {
        let json_body = serde_json::to_vec(body).expect("Failed to serialize body to JSON");
        let request = self
            .request_builder(Method::POST, uri, subject)
            .body(Body::from(json_body))
            .expect("Failed to build request");
        self.send(request).await
    }

    pub async fn put<T: Serialize>(&self, uri: &str, subject: &str, body: &T) -> TestResponse {
        let json_body = serde_json::to_vec(body).expect("Failed to serialize body to JSON");
        let request = self
            .request_builder(Method::PUT, uri, subject)
            .body(Body::from(json_body))
            .expect("Failed to build request");
        self.send(request).await
    }

    pub async fn delete(&self, uri: &str, subject: &str) -> TestResponse {
        let request = self
            .request_builder(Method::DELETE, uri, subject)
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read response body")
            .to_bytes();

        let json = if !body.is_empty() {
            serde_json::from_slice(&body).unwrap_or_else(|_| serde_json::json!({}))
        } else {
            serde_json::json!({})
        };

        TestResponse { status, json }
    }
}

/// Response from a test request with convenient status and body assertions
pub struct TestResponse {
    pub status: StatusCode,
    pub json: Value,
}

impl TestResponse {
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {} but got {} with body: {}",
            expected,
            self.status,
            serde_json::to_string_pretty(&self.json).unwrap_or_default()
        );
        self
    }

    pub fn assert_ok(&self) -> &Self {
        self.assert_status(StatusCode::OK)
    }

    pub fn json_as<T: DeserializeOwned>(&self) -> T {
        serde_json::from_value(self.json.clone()).expect("Failed to deserialize response JSON")
    }
}
