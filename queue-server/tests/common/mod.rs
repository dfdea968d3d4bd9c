#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use http::{Request, Response, StatusCode};
use http_body_util::BodyExt;
use queue_server::auth::{JwtConfig, JwtService};
use queue_server::{Config, ServerState, build_app};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub struct TestApp {
    pub app: Router,
    pub state: ServerState,
    pub jwt: JwtService,
    _dir: TempDir,
}

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "integration-test-secret-with-enough-bytes".to_string(),
        expiration_minutes: 60,
        issuer: "identity".to_string(),
        audience: "queue-staff".to_string(),
    }
}

pub fn test_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let config =
        Config::with_overrides(dir.path().to_string_lossy().to_string(), jwt_config()).unwrap();
    let state = ServerState::initialize(&config).unwrap();
    let app = build_app(state.clone());
    TestApp {
        app,
        state,
        jwt: JwtService::with_config(jwt_config()),
        _dir: dir,
    }
}

impl TestApp {
    pub fn staff_token(&self) -> String {
        self.jwt.generate_token("staff-1", "Meera", "staff").unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }

    pub async fn call(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.send(request).await;
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    /// Set stock through the staff settings endpoint
    pub async fn stock(&self, inventory: Value) {
        let token = self.staff_token();
        let (status, _) = self
            .call(
                "POST",
                "/api/settings",
                Some(serde_json::json!({ "inventory": inventory })),
                Some(&token),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }
}
