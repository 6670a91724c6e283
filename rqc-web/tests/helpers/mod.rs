//! Test Helper Utilities
//!
//! Shared app setup and request builders for rqc-web integration tests

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request};
use axum::Router;
use rqc_common::config::Settings;
use rqc_common::db::init_memory_pool;
use rqc_common::model::load_model;
use rqc_web::{build_router, AppState};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

pub const SHIPPED_MODEL: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../models/model.json");

pub const BOUNDARY: &str = "rqc-test-boundary";

/// Four requirements: FR, NFR, FR, NFR
pub const SAMPLE_CSV: &[u8] = b"id,requirement,priority
1,The system shall allow users to create new accounts,high
2,All stored passwords must be encrypted,high
3,Users must be able to export reports to PDF,low
4,The application should be available 99.9% of the time,medium
";

/// State with the shipped model and an in-memory database
pub async fn test_state(settings: Settings) -> AppState {
    let model = load_model(Path::new(SHIPPED_MODEL)).expect("Shipped model should load");
    let db = init_memory_pool().await.expect("In-memory database");
    AppState::new(Arc::new(model), db, settings)
}

pub fn test_settings(require_login: bool) -> Settings {
    Settings {
        require_login,
        ..Settings::defaults()
    }
}

/// App plus a handle on its state for inspection
pub async fn setup_app(require_login: bool) -> (Router, AppState) {
    let state = test_state(test_settings(require_login)).await;
    (build_router(state.clone()), state)
}

pub fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// multipart/form-data body with a single `file` field
pub fn multipart_body(filename: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
            filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// Multipart form without any file field
pub fn empty_multipart_body() -> Vec<u8> {
    format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{b}--\r\n",
        b = BOUNDARY
    )
    .into_bytes()
}

pub fn multipart_request(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn upload_request(uri: &str, filename: &str, content: &[u8]) -> Request<Body> {
    multipart_request(uri, multipart_body(filename, content))
}

pub fn form_request(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, value: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(value.to_string()))
        .unwrap()
}

pub fn with_cookie(mut request: Request<Body>, cookie: &str) -> Request<Body> {
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().unwrap());
    request
}

pub async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

pub async fn extract_text(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    String::from_utf8(bytes.to_vec()).expect("Body should be UTF-8")
}
