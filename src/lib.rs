//! # html2image-api
//!
//! HTTP service that converts HTML documents into images by driving an
//! external rendering tool (`wkhtmltoimage`) as a subprocess.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │        POST /v1/html-to-image (axum)        │
//! │  log ─ CORS ─ gzip ─ rate limit ─ timeout   │
//! └─────────────────┬───────────────────────────┘
//!                   │ GenerateImageRequest
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │                 service                     │
//! │  build_arguments(config) → ["-f","png",…]   │
//! │  run_tool(tool, html, args, deadline)       │
//! └─────────────────┬───────────────────────────┘
//!                   │ stdin: html   stdout: image
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │     wkhtmltoimage [flags] - -  (one/req)    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Every request gets its own process; nothing is pooled or cached, and
//! the only shared state is the rate limiter.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use html2image_api::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServiceConfigBuilder::new()
//!         .conversion_timeout(Duration::from_secs(5))
//!         .build()?;
//!
//!     let app = router(AppState::new(config));
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//!     axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Request Format
//!
//! ```json
//! {
//!     "html": "<p>hi</p>",
//!     "config": {
//!         "format": "png",
//!         "width": 800,
//!         "crop": { "x": 10, "h": 5 },
//!         "cookies": [{ "key": "session", "value": "a b" }]
//!     }
//! }
//! ```
//!
//! The response body is the raw image with `Content-Type: image/<format>`,
//! or a plain-text error (400 for bad input, 500 for tool failures and
//! timeouts).
//!
//! ## Environment Variables
//!
//! With the `env-config` feature, [`from_env`] reads `app.env` and:
//!
//! | Variable | Type | Default | Description |
//! |----------|------|---------|-------------|
//! | `WKHTMLTOIMAGE_PATH` | String | `wkhtmltoimage` | Rendering executable |
//! | `LISTEN_ADDR` | String | `0.0.0.0:8080` | Listen address |
//! | `CONVERSION_TIMEOUT_SECONDS` | u64 | 5 | Subprocess deadline |
//! | `REQUEST_TIMEOUT_SECONDS` | u64 | 5 | Whole-request deadline |
//! | `RATE_LIMIT_MAX_REQUESTS` | u32 | 100 | Requests per client per window |
//! | `RATE_LIMIT_WINDOW_SECONDS` | u64 | 86400 | Sliding window length |
//! | `RATE_LIMIT_BYPASS_SECRET` | String | unset | `Rate-Bypass` header secret |
//! | `EXPOSE_TOOL_ERRORS` | bool | true | Return raw tool errors to clients |
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `env-config` | Environment-based configuration (default) |
//! | `axum-integration` | Axum router, handlers and middleware (default) |

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// Modules
// ============================================================================

pub mod config;
pub mod error;
pub mod prelude;
pub mod rate_limit;
pub mod service;

// ============================================================================
// Feature-gated modules
// ============================================================================

/// Web framework integrations.
#[cfg(feature = "axum-integration")]
pub mod integrations;

// ============================================================================
// Re-exports (Public API)
// ============================================================================

pub use config::{ServiceConfig, ServiceConfigBuilder};
pub use error::{Html2ImageError, Result};
pub use rate_limit::{RateDecision, SlidingWindowLimiter};

#[cfg(feature = "env-config")]
pub use config::env::from_env;
