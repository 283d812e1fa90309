//! Image generation service module.
//!
//! This module is the **framework-agnostic core** of the service: request
//! types, the error taxonomy, argument building and subprocess invocation.
//! HTTP glue lives in [`crate::integrations`].
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                   service module (this module)                │
//! │                                                               │
//! │  ┌──────────────────────┐ ┌──────────────────┐ ┌───────────┐  │
//! │  │      types.rs        │ │   arguments.rs   │ │ image.rs  │  │
//! │  │ GenerateImageRequest │ │ build_arguments()│ │ generate_ │  │
//! │  │ ImageConfig / Crop   │ │ query_escape()   │ │  image()  │  │
//! │  │ ImageResponse        │ │ VALID_FORMATS    │ │ run_tool()│  │
//! │  │ ImageServiceError    │ │                  │ │           │  │
//! │  └──────────────────────┘ └──────────────────┘ └───────────┘  │
//! └───────────────────────────────────────────────────────────────┘
//!                               │ used by
//!                               ▼
//!                  integrations::axum (handlers)
//! ```
//!
//! # Direct Usage
//!
//! ```rust,ignore
//! use html2image_api::service::{generate_image, GenerateImageRequest, ToolSettings};
//!
//! let settings = ToolSettings { tool: Path::new("wkhtmltoimage"), timeout: Duration::from_secs(5) };
//! let image = generate_image(&settings, &request).await?;
//! std::fs::write("out.png", &image.data)?;
//! ```

mod arguments;
mod image;
mod types;

// ============================================================================
// Re-exports: Types
// ============================================================================

pub use types::Cookie;
pub use types::Crop;
pub use types::GenerateImageRequest;
pub use types::HealthResponse;
pub use types::ImageConfig;
pub use types::ImageResponse;
pub use types::ImageServiceError;

// ============================================================================
// Re-exports: Functions
// ============================================================================

pub use arguments::build_arguments;
pub use arguments::is_valid_format;
pub use arguments::query_escape;
pub use image::ToolSettings;
pub use image::generate_image;
pub use image::run_tool;

// ============================================================================
// Re-exports: Constants
// ============================================================================

pub use arguments::VALID_FORMATS;
pub use image::DEFAULT_TIMEOUT_SECS;
pub use image::DEFAULT_TOOL;

// ============================================================================
// Module-level tests
// ============================================================================
