//! End-to-end tests for the HTTP surface, using fake rendering tools.

#![cfg(all(unix, feature = "axum-integration"))]

mod common;

use std::path::Path;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use html2image_api::ServiceConfigBuilder;
use html2image_api::integrations::axum::{AppState, router};
use tempfile::TempDir;

use common::*;

#[tokio::test]
async fn test_png_conversion_succeeds() {
    let dir = TempDir::new().unwrap();
    let app = app_with_tool(&write_tool(&dir, "tool", ECHO_TOOL));

    let response = send(
        &app,
        convert_request(r#"{"html":"<p>hi</p>","config":{"format":"png"}}"#),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/png"
    );
    let body = body_text(response).await;
    assert!(!body.is_empty());
    assert_eq!(body, "-f\npng\n-\n-\n<p>hi</p>");
}

#[tokio::test]
async fn test_invalid_format_is_bad_request() {
    let dir = TempDir::new().unwrap();
    let app = app_with_tool(&write_tool(&dir, "tool", ECHO_TOOL));

    let response = send(
        &app,
        convert_request(r#"{"html":"<p>hi</p>","config":{"format":"tiff"}}"#),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_text(response).await;
    assert!(body.contains("invalid format"), "body: {body}");
    assert!(body.contains("tiff"), "body: {body}");
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let dir = TempDir::new().unwrap();
    let app = app_with_tool(&write_tool(&dir, "tool", ECHO_TOOL));

    for body in [r#"{"html": "#, r#"{"html": 42}"#, "not json"] {
        let response = send(&app, convert_request(body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body:?}");
        assert!(!body_text(response).await.is_empty());
    }
}

#[tokio::test]
async fn test_options_reach_the_tool_in_order() {
    let dir = TempDir::new().unwrap();
    let app = app_with_tool(&write_tool(&dir, "tool", ECHO_TOOL));

    let response = send(
        &app,
        convert_request(
            r#"{"html":"","config":{"format":"jpg","quality":80,"crop":{"x":10,"y":0,"w":0,"h":5},"cookies":[{"key":"a","value":"b c"}]}}"#,
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/jpg"
    );
    let lines: Vec<String> = body_text(response)
        .await
        .lines()
        .map(str::to_string)
        .collect();
    assert_eq!(
        lines,
        vec![
            "-f", "jpg", "--quality", "80", "--crop-x", "10", "--crop-h", "5", "--cookie",
            "a=b+c", "-", "-",
        ]
    );
}

#[tokio::test]
async fn test_empty_html_is_forwarded() {
    let dir = TempDir::new().unwrap();
    let app = app_with_tool(&write_tool(&dir, "tool", "wc -c | tr -d ' '\n"));

    let response = send(&app, convert_request(r#"{"html":"","config":{"format":"bmp"}}"#)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await.trim(), "0");
}

#[tokio::test]
async fn test_tool_failure_is_internal_error() {
    let dir = TempDir::new().unwrap();
    let app = app_with_tool(&write_tool(&dir, "tool", FAILING_TOOL));

    let response = send(
        &app,
        convert_request(r#"{"html":"<p>hi</p>","config":{"format":"png"}}"#),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_text(response).await;
    assert!(body.contains("exit status 1"), "body: {body}");
    assert!(body.contains("Loading page failed"), "body: {body}");
}

#[tokio::test]
async fn test_tool_failure_hidden_when_configured() {
    let dir = TempDir::new().unwrap();
    let tool = write_tool(&dir, "tool", FAILING_TOOL);
    let config = ServiceConfigBuilder::new()
        .tool_path(&tool)
        .expose_tool_errors(false)
        .build()
        .unwrap();
    let app = router(AppState::new(config));

    let response = send(&app, convert_request(r#"{"config":{"format":"png"}}"#)).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_text(response).await;
    assert!(!body.contains("Loading page failed"), "body: {body}");
}

#[tokio::test]
async fn test_missing_tool_is_internal_error() {
    let app = app_with_tool(Path::new("/nonexistent/wkhtmltoimage"));

    let response = send(&app, convert_request(r#"{"config":{"format":"png"}}"#)).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_hanging_tool_times_out_and_is_killed() {
    let dir = TempDir::new().unwrap();
    let pid_file = dir.path().join("pid");
    let tool = hanging_tool(&dir, &pid_file);
    let config = ServiceConfigBuilder::new()
        .tool_path(&tool)
        .conversion_timeout(Duration::from_secs(1))
        .request_timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    let app = router(AppState::new(config));

    let started = Instant::now();
    let response = send(&app, convert_request(r#"{"config":{"format":"png"}}"#)).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(
        started.elapsed() < Duration::from_secs(4),
        "took {:?}",
        started.elapsed()
    );
    assert!(body_text(response).await.contains("timed out"));

    assert!(
        process_exits(&pid_file, Duration::ZERO).await,
        "rendering process left running after the conversion deadline"
    );
}

#[tokio::test]
async fn test_request_timeout_middleware_answers_first() {
    let dir = TempDir::new().unwrap();
    let pid_file = dir.path().join("pid");
    let tool = hanging_tool(&dir, &pid_file);
    let config = ServiceConfigBuilder::new()
        .tool_path(&tool)
        .conversion_timeout(Duration::from_secs(10))
        .request_timeout(Duration::from_millis(500))
        .build()
        .unwrap();
    let app = router(AppState::new(config));

    let started = Instant::now();
    let response = send(&app, convert_request(r#"{"config":{"format":"png"}}"#)).await;

    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    assert!(started.elapsed() < Duration::from_secs(3));

    // The dropped handler kills the child; reaping happens in the background.
    assert!(
        process_exits(&pid_file, Duration::from_secs(3)).await,
        "rendering process left running after the request deadline"
    );
}

#[tokio::test]
async fn test_null_fields_are_treated_as_unset() {
    let dir = TempDir::new().unwrap();
    let app = app_with_tool(&write_tool(&dir, "tool", ECHO_TOOL));

    for config in [
        r#"{"format":"png","cookies":null}"#,
        r#"{"format":"png","crop":null}"#,
        r#"{"format":"png","width":null,"encoding":null,"transparent":null}"#,
    ] {
        let body = format!(r#"{{"html":"<p>hi</p>","config":{config}}}"#);
        let response = send(&app, convert_request(&body)).await;
        assert_eq!(response.status(), StatusCode::OK, "config {config}");
        assert_eq!(body_text(response).await, "-f\npng\n-\n-\n<p>hi</p>");
    }

    let response = send(&app, convert_request(r#"{"html":null,"config":null}"#)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "-\n-\n");
}

#[tokio::test]
async fn test_repeated_requests_are_byte_identical() {
    let dir = TempDir::new().unwrap();
    let app = app_with_tool(&write_tool(&dir, "tool", ECHO_TOOL));
    let body = r#"{"html":"<h1>same</h1>","config":{"format":"svg","width":640}}"#;

    let first = body_bytes(send(&app, convert_request(body)).await).await;
    let second = body_bytes(send(&app, convert_request(body)).await).await;

    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_large_html_round_trips() {
    let dir = TempDir::new().unwrap();
    let app = app_with_tool(&write_tool(&dir, "tool", "cat\n"));
    let html = "a".repeat(1024 * 1024);
    let body = serde_json::json!({ "html": html, "config": { "format": "png" } }).to_string();

    let response = send(&app, convert_request(&body)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await.len(), html.len());
}

#[tokio::test]
async fn test_rate_limit_and_bypass() {
    let dir = TempDir::new().unwrap();
    let tool = write_tool(&dir, "tool", ECHO_TOOL);
    let config = ServiceConfigBuilder::new()
        .tool_path(&tool)
        .rate_limit_max_requests(2)
        .rate_limit_bypass_secret(Some("let-me-in"))
        .build()
        .unwrap();
    let app = router(AppState::new(config));
    let payload = r#"{"config":{"format":"png"}}"#;

    let first = send(&app, convert_request(payload)).await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(first.headers().get("x-ratelimit-limit").unwrap(), "2");
    assert_eq!(first.headers().get("x-ratelimit-remaining").unwrap(), "1");

    assert_eq!(send(&app, convert_request(payload)).await.status(), StatusCode::OK);

    let limited = send(&app, convert_request(payload)).await;
    assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(limited.headers().contains_key(header::RETRY_AFTER));

    let mut wrong_secret = convert_request(payload);
    wrong_secret
        .headers_mut()
        .insert("rate-bypass", "guess".parse().unwrap());
    assert_eq!(
        send(&app, wrong_secret).await.status(),
        StatusCode::TOO_MANY_REQUESTS
    );

    let mut bypass = convert_request(payload);
    bypass
        .headers_mut()
        .insert("rate-bypass", "let-me-in".parse().unwrap());
    assert_eq!(send(&app, bypass).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = app_with_tool(Path::new("/nonexistent/wkhtmltoimage"));

    let response = send(
        &app,
        Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_get_on_conversion_route_not_allowed() {
    let app = app_with_tool(Path::new("/nonexistent/wkhtmltoimage"));

    let response = send(
        &app,
        Request::builder()
            .uri("/v1/html-to-image")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
