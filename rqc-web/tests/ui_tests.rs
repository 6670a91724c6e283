//! Integration tests for the rqc-web HTML pages
//!
//! Tests cover:
//! - Home page forms, upload results and single prediction
//! - CSV download of the last upload
//! - History page deletion and the FR/NFR graph
//! - Static pages and assets

mod helpers;

use axum::http::{header, StatusCode};
use helpers::*;
use rqc_common::Label;
use tower::ServiceExt; // for `oneshot`

// =============================================================================
// Home, upload and prediction
// =============================================================================

#[tokio::test]
async fn test_home_page_has_forms() {
    let (app, _) = setup_app(false).await;

    let response = app.oneshot(test_request("GET", "/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = extract_text(response.into_body()).await;
    assert!(html.contains(r#"action="/upload""#));
    assert!(html.contains(r#"enctype="multipart/form-data""#));
    assert!(html.contains(r#"name="requirement_text""#));
    assert!(html.contains("<code>requirement</code>"));
}

#[tokio::test]
async fn test_upload_renders_results_table() {
    let (app, _) = setup_app(false).await;

    let response = app
        .oneshot(upload_request("/upload", "reqs.csv", SAMPLE_CSV))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = extract_text(response.into_body()).await;
    assert!(html.contains("Classified 4 requirements from reqs.csv"));
    assert!(html.contains("4 requirements: 2 functional, 2 non-functional"));
    assert!(html.contains("All stored passwords must be encrypted"));
    assert!(html.contains(r#"href="/download""#));
}

#[tokio::test]
async fn test_upload_error_rerenders_form_with_status() {
    let (app, _) = setup_app(false).await;

    let response = app
        .clone()
        .oneshot(upload_request("/upload", "photo.png", b"\x89PNG\r\n\x1a\n"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let html = extract_text(response.into_body()).await;
    assert!(html.contains(r#"class="notice danger""#));
    assert!(html.contains(r#"action="/upload""#));

    let response = app
        .oneshot(multipart_request("/upload", empty_multipart_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let html = extract_text(response.into_body()).await;
    assert!(html.contains("No file selected"));
}

#[tokio::test]
async fn test_predict_form_shows_label() {
    let (app, _) = setup_app(false).await;

    let response = app
        .oneshot(form_request(
            "/predict",
            "requirement_text=The+system+shall+support+1000+concurrent+users",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = extract_text(response.into_body()).await;
    assert!(html.contains("The system shall support 1000 concurrent users"));
    assert!(html.contains(r#"<span class="badge non-functional">NFR</span>"#));
}

#[tokio::test]
async fn test_predict_blank_is_400() {
    let (app, _) = setup_app(false).await;

    let response = app
        .oneshot(form_request("/predict", "requirement_text=+++"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let html = extract_text(response.into_body()).await;
    assert!(html.contains("Please enter a requirement"));
}

#[tokio::test]
async fn test_predicted_text_is_escaped() {
    let (app, _) = setup_app(false).await;

    let response = app
        .oneshot(form_request(
            "/predict",
            "requirement_text=%3Cscript%3Ealert(1)%3C%2Fscript%3E",
        ))
        .await
        .unwrap();

    let html = extract_text(response.into_body()).await;
    assert!(!html.contains("<script>alert(1)</script>"));
    assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
}

// =============================================================================
// Download
// =============================================================================

#[tokio::test]
async fn test_download_before_upload_is_404() {
    let (app, _) = setup_app(false).await;

    let response = app
        .oneshot(test_request("GET", "/download"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let html = extract_text(response.into_body()).await;
    assert!(html.contains("No file available to download"));
}

#[tokio::test]
async fn test_download_returns_last_upload_as_csv() {
    let (app, _) = setup_app(false).await;

    app.clone()
        .oneshot(upload_request("/upload", "reqs.csv", SAMPLE_CSV))
        .await
        .unwrap();
    let response = app
        .oneshot(test_request("GET", "/download"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    assert!(response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("categorized_output.csv"));

    let csv = extract_text(response.into_body()).await;
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines,
        vec![
            "requirement,prediction",
            "The system shall allow users to create new accounts,functional",
            "All stored passwords must be encrypted,non-functional",
            "Users must be able to export reports to PDF,functional",
            "The application should be available 99.9% of the time,non-functional",
        ]
    );
}

// =============================================================================
// History and graph
// =============================================================================

#[tokio::test]
async fn test_categories_lists_entries_with_delete_buttons() {
    let (app, state) = setup_app(false).await;
    state
        .history
        .record_text("Export data to PDF", Label::Functional)
        .await
        .unwrap();

    let response = app
        .oneshot(test_request("GET", "/categories"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = extract_text(response.into_body()).await;
    assert!(html.contains("Export data to PDF"));
    assert!(html.contains(r#"action="/delete/0""#));
    assert!(html.contains("Page 1 of 1 (1 entries)"));
}

#[tokio::test]
async fn test_delete_from_categories() {
    let (app, state) = setup_app(false).await;
    for text in ["keep me", "remove me"] {
        state
            .history
            .record_text(text, Label::Functional)
            .await
            .unwrap();
    }

    let response = app
        .clone()
        .oneshot(test_request("POST", "/delete/1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = extract_text(response.into_body()).await;
    assert!(html.contains("Deleted: remove me"));
    assert_eq!(state.history.count().await.unwrap(), 1);

    let response = app
        .oneshot(test_request("POST", "/delete/5"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(state.history.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_graph_without_data_warns() {
    let (app, _) = setup_app(false).await;

    let response = app.oneshot(test_request("GET", "/graph")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = extract_text(response.into_body()).await;
    assert!(html.contains("No data available to generate the graph"));
    assert!(!html.contains("<svg"));
}

#[tokio::test]
async fn test_graph_with_data_draws_pie() {
    let (app, state) = setup_app(false).await;
    state
        .history
        .record_text("Login", Label::Functional)
        .await
        .unwrap();
    state
        .history
        .record_text("Fast", Label::NonFunctional)
        .await
        .unwrap();

    let response = app.oneshot(test_request("GET", "/graph")).await.unwrap();

    let html = extract_text(response.into_body()).await;
    assert!(html.contains("<svg"));
    assert!(html.contains("Functional: 1 (50.0%)"));
    assert!(html.contains("Non-functional: 1 (50.0%)"));
}

// =============================================================================
// Static pages
// =============================================================================

#[tokio::test]
async fn test_static_pages() {
    let (app, _) = setup_app(false).await;

    for (uri, needle) in [
        ("/about", "Vocabulary"),
        ("/faq", "How accurate is the prediction?"),
    ] {
        let response = app.clone().oneshot(test_request("GET", uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
        let html = extract_text(response.into_body()).await;
        assert!(html.contains(needle), "{} missing {}", uri, needle);
    }

    let response = app
        .oneshot(test_request("GET", "/static/rqc.css"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/css");
}
