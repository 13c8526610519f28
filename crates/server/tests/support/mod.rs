#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use configs::AppConfig;
use server::state::ServerState;

pub fn test_config() -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.database = models::db::in_memory_config();
    cfg.database.run_migrations = true;
    cfg.auth.jwt_secret = "test-secret".into();
    cfg.auth.argon2_memory_kib = 8;
    cfg.auth.argon2_iterations = 1;
    cfg
}

pub async fn build_app() -> anyhow::Result<(Router, ServerState)> {
    server::startup::build_app(&test_config()).await
}

pub struct TestResponse {
    pub status: StatusCode,
    pub set_cookie: Option<String>,
    pub body: Value,
}

pub async fn send(app: &Router, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> anyhow::Result<TestResponse> {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    let req = match body {
        Some(json) => req.header(header::CONTENT_TYPE, "application/json").body(Body::from(serde_json::to_vec(&json)?))?,
        None => req.body(Body::empty())?,
    };
    send_request(app, req).await
}

pub async fn send_request(app: &Router, req: Request<Body>) -> anyhow::Result<TestResponse> {
    let resp = app.clone().oneshot(req).await?;
    let status = resp.status();
    let set_cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok(TestResponse { status, set_cookie, body })
}

/// Register an owner and log in; returns the session token.
pub async fn register_and_login(app: &Router, name: &str, login: &str) -> anyhow::Result<String> {
    let password = "S3curePass!";
    let reg = send(app, "POST", "/api/v1/auth/register", None, Some(serde_json::json!({"name": name, "login": login, "password": password}))).await?;
    anyhow::ensure!(reg.status == StatusCode::CREATED, "register failed: {}", reg.body);
    login_as(app, login, password).await
}

pub async fn login_as(app: &Router, login: &str, password: &str) -> anyhow::Result<String> {
    let resp = send(app, "POST", "/api/v1/auth/login", None, Some(serde_json::json!({"login": login, "password": password}))).await?;
    anyhow::ensure!(resp.status == StatusCode::OK, "login failed: {}", resp.body);
    resp.body["token"].as_str().map(str::to_string).ok_or_else(|| anyhow::anyhow!("no token in login response"))
}
