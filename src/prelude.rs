//! Convenient imports for common usage patterns.
//!
//! ```rust,ignore
//! use html2image_api::prelude::*;
//! ```

pub use crate::config::{ServiceConfig, ServiceConfigBuilder};
pub use crate::error::{Html2ImageError, Result};
pub use crate::rate_limit::{RateDecision, SlidingWindowLimiter};
pub use crate::service::{
    GenerateImageRequest, ImageConfig, ImageResponse, ImageServiceError, ToolSettings,
    build_arguments, generate_image,
};

#[cfg(feature = "env-config")]
pub use crate::config::env::from_env;

#[cfg(feature = "axum-integration")]
pub use crate::integrations::axum::{AppState, router};

pub use std::net::SocketAddr;
pub use std::time::Duration;
