//! Shared helpers: fake rendering tools written as shell scripts.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use html2image_api::ServiceConfigBuilder;
use html2image_api::integrations::axum::{AppState, router};
use tempfile::TempDir;
use tower::ServiceExt;

/// Tool that echoes its arguments, then the HTML it was given.
pub const ECHO_TOOL: &str = "printf '%s\\n' \"$@\"\ncat\n";

/// Tool that reports an error and exits non-zero.
pub const FAILING_TOOL: &str = "cat >/dev/null\necho 'Loading page failed' >&2\nexit 1\n";

pub fn write_tool(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, format!("#!/bin/sh\n{}", body)).expect("write script");
    let mut perms = fs::metadata(&path).expect("metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("set perms");
    path
}

/// Router wired to `tool` with generous limits.
pub fn app_with_tool(tool: &Path) -> Router {
    let config = ServiceConfigBuilder::new()
        .tool_path(tool)
        .conversion_timeout(Duration::from_secs(5))
        .request_timeout(Duration::from_secs(10))
        .build()
        .expect("valid config");
    router(AppState::new(config))
}

pub fn convert_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/v1/html-to-image")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.expect("infallible")
}

/// Fake tool that records its pid in `pid_file`, then hangs.
pub fn hanging_tool(dir: &TempDir, pid_file: &Path) -> PathBuf {
    write_tool(
        dir,
        "tool",
        &format!("echo $$ > \"{}\"\nexec sleep 30\n", pid_file.display()),
    )
}

/// Wait up to `within` for the process recorded in `pid_file` to be gone.
///
/// Returns `true` if it disappeared in time.
pub async fn process_exits(pid_file: &Path, within: Duration) -> bool {
    let pid = fs::read_to_string(pid_file).expect("pid written");
    let pid = pid.trim();
    let deadline = tokio::time::Instant::now() + within;
    loop {
        let alive = std::process::Command::new("kill")
            .arg("-0")
            .arg(pid)
            .stderr(std::process::Stdio::null())
            .status()
            .expect("run kill");
        if !alive.success() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body")
        .to_vec()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).expect("utf-8 body")
}
