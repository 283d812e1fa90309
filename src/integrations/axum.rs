//! Axum framework integration.
//!
//! Provides the HTTP surface of the service: the conversion handler, the
//! middleware stack around it and a ready-made [`router`].
//!
//! # Routes
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `POST` | `/v1/html-to-image` | [`html_to_image`] |
//! | `GET` | `/health` | [`health_check`] |
//!
//! # Middleware
//!
//! ```text
//! request ─► log_requests ─► CORS ─► compression ─► body limit
//!              │
//!              ├─► /health
//!              └─► /v1 ─► rate_limit ─► request_timeout ─► html_to_image
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use html2image_api::integrations::axum::{router, AppState};
//! use html2image_api::ServiceConfig;
//! use std::net::SocketAddr;
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = router(AppState::new(ServiceConfig::default()));
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await.unwrap();
//!     axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
//!         .await
//!         .unwrap();
//! }
//! ```

use axum::{
    Json, Router,
    body::Bytes,
    extract::{ConnectInfo, DefaultBodyLimit, Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::{compression::CompressionLayer, cors::CorsLayer};

use crate::config::ServiceConfig;
use crate::rate_limit::{RateDecision, SlidingWindowLimiter};
use crate::service::{
    self, GenerateImageRequest, HealthResponse, ImageResponse, ImageServiceError, ToolSettings,
};

// ============================================================================
// Constants
// ============================================================================

/// Header whose value is compared against the configured bypass secret.
pub const RATE_BYPASS_HEADER: &str = "rate-bypass";

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

const GENERIC_FAILURE_MESSAGE: &str = "image conversion failed";

// ============================================================================
// State
// ============================================================================

/// Shared state handed to every handler and middleware.
///
/// Cloning is cheap: configuration sits behind an `Arc` and the limiter's
/// buckets are shared.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Arc<ServiceConfig>,
    /// Per-client request limiter.
    pub limiter: SlidingWindowLimiter,
}

impl AppState {
    /// Build state, including the rate limiter, from a configuration.
    pub fn new(config: ServiceConfig) -> Self {
        let limiter =
            SlidingWindowLimiter::new(config.rate_limit_window, config.rate_limit_max_requests)
                .with_bypass_secret(config.rate_limit_bypass_secret.clone());
        Self {
            config: Arc::new(config),
            limiter,
        }
    }
}

// ============================================================================
// Router
// ============================================================================

/// Build the complete application router.
pub fn router(state: AppState) -> Router {
    let v1 = Router::new()
        .route(
            "/html-to-image",
            post(html_to_image).route_layer(middleware::from_fn_with_state(
                state.clone(),
                request_timeout,
            )),
        )
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit));

    Router::new()
        .nest("/v1", v1)
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

/// `POST /v1/html-to-image`: convert a JSON-wrapped HTML document to an image.
///
/// Parse → build arguments → run tool → respond; any stage may end the
/// request with an error response.
pub async fn html_to_image(State(state): State<AppState>, body: Bytes) -> Response {
    let request: GenerateImageRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            return build_error_response(
                &state.config,
                ImageServiceError::InvalidRequest(e.to_string()),
            );
        }
    };

    log::debug!("Image from HTML request: {} bytes", request.html.len());

    let settings = ToolSettings {
        tool: &state.config.tool_path,
        timeout: state.config.conversion_timeout,
    };

    match service::generate_image(&settings, &request).await {
        Ok(image) => build_image_response(image),
        Err(e) => build_error_response(&state.config, e),
    }
}

/// `GET /health`: liveness probe.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

// ============================================================================
// Middleware
// ============================================================================

/// Race the wrapped handler against the configured request timeout.
///
/// On expiry the handler future is dropped, which also kills any rendering
/// process it owns, and the client receives `408 Request Timeout`.
pub async fn request_timeout(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let limit = state.config.request_timeout;
    match tokio::time::timeout(limit, next.run(request)).await {
        Ok(response) => response,
        Err(_elapsed) => {
            log::error!("Request timed out after {:?}", limit);
            (StatusCode::REQUEST_TIMEOUT, "Request Timeout").into_response()
        }
    }
}

/// Apply the sliding-window limit per client IP.
///
/// Requests presenting the configured `Rate-Bypass` secret skip counting.
/// Admitted responses carry `X-RateLimit-Limit` and
/// `X-RateLimit-Remaining`; rejected ones get `429` and `Retry-After`.
pub async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let bypass = state.limiter.is_bypass(
        request
            .headers()
            .get(RATE_BYPASS_HEADER)
            .and_then(|v| v.to_str().ok()),
    );
    if bypass {
        log::trace!("Rate limit bypassed via {} header", RATE_BYPASS_HEADER);
        return next.run(request).await;
    }

    let key = client_key(&request);

    match state.limiter.check(&key) {
        RateDecision::Allowed { remaining } => {
            let mut response = next.run(request).await;
            let headers = response.headers_mut();
            headers.insert("x-ratelimit-limit", HeaderValue::from(state.limiter.limit()));
            headers.insert("x-ratelimit-remaining", HeaderValue::from(remaining));
            response
        }
        RateDecision::Limited { retry_after } => {
            log::warn!("Rate limit exceeded for client {}", key);
            let retry_secs = retry_after.as_secs().max(1);
            let mut response = (StatusCode::TOO_MANY_REQUESTS, "Too Many Requests").into_response();
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_secs));
            response
        }
    }
}

/// Log one line per request with status, method, path and latency.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started_at = Instant::now();

    let response = next.run(request).await;

    log::info!(
        "{} {} {} {:?}",
        response.status().as_u16(),
        method,
        path,
        started_at.elapsed()
    );

    response
}

// ============================================================================
// Response Builders (Internal)
// ============================================================================

fn client_key(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn build_image_response(image: ImageResponse) -> Response {
    log::debug!("Sending {} bytes as {}", image.size(), image.content_type());

    ([(header::CONTENT_TYPE, image.content_type())], image.data).into_response()
}

fn build_error_response(config: &ServiceConfig, error: ImageServiceError) -> Response {
    let status =
        StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if error.is_client_error() {
        log::warn!("Rejected request: {} (HTTP {})", error, status.as_u16());
    } else {
        log::error!(
            "Image generation error [{}]: {} (HTTP {})",
            error.error_code(),
            error,
            status.as_u16()
        );
    }

    let body = if error.is_client_error() || config.expose_tool_errors {
        error.to_string()
    } else {
        GENERIC_FAILURE_MESSAGE.to_string()
    };

    (status, body).into_response()
}

// ============================================================================
// Tests
// ============================================================================
