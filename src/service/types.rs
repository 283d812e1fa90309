//! Shared types for the image generation service.
//!
//! These types define the JSON contract of `POST /v1/html-to-image` and the
//! error taxonomy every integration maps to HTTP responses.
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`GenerateImageRequest`] | Request body: HTML plus rendering options |
//! | [`ImageConfig`] | Rendering options passed to the tool as flags |
//! | [`Crop`] / [`Cookie`] | Nested option types |
//! | [`ImageResponse`] | Successful conversion result |
//! | [`ImageServiceError`] | Error types with HTTP status mapping |
//! | [`HealthResponse`] | Health check response |

use serde::{Deserialize, Deserializer, Serialize};

/// Decode an explicit JSON `null` as the field's default value, the same as
/// an omitted field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

// ============================================================================
// Request Types
// ============================================================================

/// A cookie forwarded to the rendering tool as `--cookie key=value`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Cookie {
    /// Cookie name, passed through unescaped.
    #[serde(deserialize_with = "null_as_default")]
    pub key: String,
    /// Cookie value, query-escaped before it reaches the command line.
    #[serde(deserialize_with = "null_as_default")]
    pub value: String,
}

/// Crop rectangle applied by the rendering tool.
///
/// Every coordinate uses `0` to mean "not set": there is no way to request
/// an explicit zero offset or size.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Crop {
    /// Left offset in pixels.
    #[serde(deserialize_with = "null_as_default")]
    pub x: i64,
    /// Top offset in pixels.
    #[serde(deserialize_with = "null_as_default")]
    pub y: i64,
    /// Width in pixels.
    #[serde(deserialize_with = "null_as_default")]
    pub w: i64,
    /// Height in pixels.
    #[serde(deserialize_with = "null_as_default")]
    pub h: i64,
}

/// Rendering options for one conversion.
///
/// All fields are optional in JSON. Numeric fields treat `0` as unset,
/// strings treat `""` as unset and booleans only emit a flag when `true`.
///
/// # JSON Shape
///
/// ```json
/// {
///     "format": "png",
///     "width": 1024,
///     "height": 0,
///     "disableSmartWidth": false,
///     "encoding": "utf-8",
///     "crop": { "x": 0, "y": 0, "w": 0, "h": 0 },
///     "quality": 80,
///     "transparent": false,
///     "cookies": [{ "key": "session", "value": "abc" }]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageConfig {
    /// Output format: one of `png`, `jpg`, `jpeg`, `svg`, `bmp`, or empty.
    #[serde(deserialize_with = "null_as_default")]
    pub format: String,
    /// Viewport width in pixels.
    #[serde(deserialize_with = "null_as_default")]
    pub width: i64,
    /// Viewport height in pixels.
    #[serde(deserialize_with = "null_as_default")]
    pub height: i64,
    /// Use the exact `width` instead of letting the tool widen the page.
    #[serde(deserialize_with = "null_as_default")]
    pub disable_smart_width: bool,
    /// Default text encoding for the input document.
    #[serde(deserialize_with = "null_as_default")]
    pub encoding: String,
    /// Crop rectangle.
    #[serde(deserialize_with = "null_as_default")]
    pub crop: Crop,
    /// Output quality (JPEG compression).
    #[serde(deserialize_with = "null_as_default")]
    pub quality: i64,
    /// Render with a transparent background (PNG only).
    #[serde(deserialize_with = "null_as_default")]
    pub transparent: bool,
    /// Cookies to send with any resources the page fetches, in order.
    #[serde(deserialize_with = "null_as_default")]
    pub cookies: Vec<Cookie>,
}

/// Request body for HTML-to-image conversion.
///
/// Constructed fresh for every HTTP call and discarded once the response is
/// sent. An empty `html` is valid and forwarded to the tool as-is.
///
/// ```rust
/// use html2image_api::service::GenerateImageRequest;
///
/// let request: GenerateImageRequest =
///     serde_json::from_str(r#"{"html":"<p>hi</p>","config":{"format":"png"}}"#).unwrap();
///
/// assert_eq!(request.html, "<p>hi</p>");
/// assert_eq!(request.config.format, "png");
/// assert_eq!(request.config.width, 0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct GenerateImageRequest {
    /// HTML document streamed to the tool's standard input.
    #[serde(deserialize_with = "null_as_default")]
    pub html: String,
    /// Rendering options.
    #[serde(deserialize_with = "null_as_default")]
    pub config: ImageConfig,
}

// ============================================================================
// Response Types
// ============================================================================

/// Result of a successful conversion.
#[derive(Debug, Clone)]
pub struct ImageResponse {
    /// Raw bytes the tool wrote to standard output.
    pub data: Vec<u8>,
    /// Format declared in the request, used verbatim for the content type.
    pub format: String,
}

impl ImageResponse {
    /// Create a new response.
    pub fn new(data: Vec<u8>, format: String) -> Self {
        Self { data, format }
    }

    /// Returns the `Content-Type` value: `image/` followed by the declared
    /// format. The bytes are never sniffed.
    ///
    /// ```rust
    /// use html2image_api::service::ImageResponse;
    ///
    /// let response = ImageResponse::new(vec![1, 2, 3], "jpg".to_string());
    /// assert_eq!(response.content_type(), "image/jpg");
    /// ```
    pub fn content_type(&self) -> String {
        format!("image/{}", self.format)
    }

    /// Returns the image size in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"healthy"` while the process can answer.
    pub status: String,
    /// Service name.
    pub service: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
            service: "html2image-api".to_string(),
        }
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while serving a conversion request.
///
/// | Variant | HTTP | Code |
/// |---------|------|------|
/// | `InvalidRequest` | 400 | `INVALID_REQUEST` |
/// | `InvalidFormat` | 400 | `INVALID_FORMAT` |
/// | `Timeout` | 500 | `TIMEOUT` |
/// | `ToolSpawn` | 500 | `TOOL_SPAWN_FAILED` |
/// | `ToolFailed` | 500 | `TOOL_FAILED` |
/// | `Internal` | 500 | `INTERNAL_ERROR` |
///
/// Nothing here is retried by the service; clients decide whether to retry.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ImageServiceError {
    /// The request body could not be decoded as a [`GenerateImageRequest`].
    #[error("{0}")]
    InvalidRequest(String),

    /// `config.format` is not one of the supported formats.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// The rendering tool did not finish before the deadline and was killed.
    #[error("conversion timed out: {0}")]
    Timeout(String),

    /// The rendering tool could not be started.
    ///
    /// Usually the executable is missing from `PATH` or lacks execute
    /// permission.
    #[error("failed to start rendering tool: {0}")]
    ToolSpawn(String),

    /// The rendering tool exited unsuccessfully.
    #[error("{}", describe_tool_failure(.exit_code, .stderr))]
    ToolFailed {
        /// Exit code, `None` when the process was terminated by a signal.
        exit_code: Option<i32>,
        /// Everything the tool wrote to standard error.
        stderr: String,
    },

    /// Pipe I/O with the child process failed.
    #[error("Internal error: {0}")]
    Internal(String),
}

fn describe_tool_failure(exit_code: &Option<i32>, stderr: &str) -> String {
    let status = match exit_code {
        Some(code) => format!("exit status {}", code),
        None => "terminated by signal".to_string(),
    };
    let stderr = stderr.trim();
    if stderr.is_empty() {
        status
    } else {
        format!("{}: {}", status, stderr)
    }
}

impl ImageServiceError {
    /// Returns the HTTP status code for this error.
    ///
    /// ```rust
    /// use html2image_api::service::ImageServiceError;
    ///
    /// assert_eq!(ImageServiceError::InvalidFormat("tiff".into()).status_code(), 400);
    /// assert_eq!(ImageServiceError::Timeout("5s".into()).status_code(), 500);
    /// ```
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest(_) | Self::InvalidFormat(_) => 400,
            Self::Timeout(_) | Self::ToolSpawn(_) | Self::ToolFailed { .. } | Self::Internal(_) => {
                500
            }
        }
    }

    /// Returns a machine-readable error code for logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::InvalidFormat(_) => "INVALID_FORMAT",
            Self::Timeout(_) => "TIMEOUT",
            Self::ToolSpawn(_) => "TOOL_SPAWN_FAILED",
            Self::ToolFailed { .. } => "TOOL_FAILED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns `true` for errors the client caused.
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
