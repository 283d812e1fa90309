//! Configuration for the HTML-to-image service.
//!
//! This module provides [`ServiceConfig`] and [`ServiceConfigBuilder`] for
//! configuring the rendering tool, timeouts and rate limiting.
//!
//! # Example
//!
//! ```rust
//! use html2image_api::ServiceConfigBuilder;
//! use std::time::Duration;
//!
//! let config = ServiceConfigBuilder::new()
//!     .tool_path("/usr/local/bin/wkhtmltoimage")
//!     .conversion_timeout(Duration::from_secs(10))
//!     .rate_limit_max_requests(500)
//!     .build()
//!     .expect("Invalid configuration");
//!
//! assert_eq!(config.rate_limit_max_requests, 500);
//! ```
//!
//! # Environment Configuration
//!
//! When the `env-config` feature is enabled, use [`env::from_env`] to load
//! configuration from `app.env` and the process environment.

use std::path::PathBuf;
use std::time::Duration;

use crate::service::{DEFAULT_TIMEOUT_SECS, DEFAULT_TOOL};

/// Default listen address, matching the port the service has always used.
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

/// Default number of requests allowed per client per window.
pub const DEFAULT_RATE_LIMIT_MAX_REQUESTS: u32 = 100;

/// Default rate limiting window (24 hours).
pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 24 * 60 * 60;

/// Service configuration.
///
/// Use [`ServiceConfigBuilder`] for validated construction.
///
/// # Fields
///
/// | Field | Default | Description |
/// |-------|---------|-------------|
/// | `tool_path` | `wkhtmltoimage` | Rendering executable (resolved via `PATH`) |
/// | `listen_addr` | `0.0.0.0:8080` | Socket address for the HTTP server |
/// | `conversion_timeout` | 5s | Deadline for one subprocess run |
/// | `request_timeout` | 5s | Deadline for the whole HTTP handler |
/// | `rate_limit_max_requests` | 100 | Requests per client per window |
/// | `rate_limit_window` | 24h | Sliding window length |
/// | `rate_limit_bypass_secret` | `None` | `Rate-Bypass` header value that skips the limiter |
/// | `expose_tool_errors` | `true` | Return raw tool errors to clients |
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Path or program name of the external rendering tool.
    pub tool_path: PathBuf,

    /// Address the HTTP server binds to.
    pub listen_addr: String,

    /// Absolute deadline for spawning, running and tearing down the tool.
    pub conversion_timeout: Duration,

    /// Deadline for the whole conversion route, enforced by middleware.
    pub request_timeout: Duration,

    /// Maximum requests per client inside one sliding window.
    pub rate_limit_max_requests: u32,

    /// Length of the sliding rate-limit window.
    pub rate_limit_window: Duration,

    /// Shared secret that bypasses rate limiting when sent as the
    /// `Rate-Bypass` header. `None` disables bypassing entirely.
    pub rate_limit_bypass_secret: Option<String>,

    /// When `false`, 500 responses carry a generic message and the raw
    /// tool error only goes to the log.
    pub expose_tool_errors: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            tool_path: PathBuf::from(DEFAULT_TOOL),
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            conversion_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            rate_limit_max_requests: DEFAULT_RATE_LIMIT_MAX_REQUESTS,
            rate_limit_window: Duration::from_secs(DEFAULT_RATE_LIMIT_WINDOW_SECS),
            rate_limit_bypass_secret: None,
            expose_tool_errors: true,
        }
    }
}

/// Builder for [`ServiceConfig`] with validation.
///
/// # Validation Rules
///
/// - `tool_path` must not be empty
/// - `conversion_timeout` and `request_timeout` must be greater than zero
/// - `rate_limit_max_requests` must be greater than zero
/// - `rate_limit_window` must be greater than zero
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl ServiceConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self {
            config: ServiceConfig::default(),
        }
    }

    /// Set the rendering tool executable.
    pub fn tool_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.tool_path = path.into();
        self
    }

    /// Set the listen address.
    pub fn listen_addr<S: Into<String>>(mut self, addr: S) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the subprocess deadline.
    pub fn conversion_timeout(mut self, timeout: Duration) -> Self {
        self.config.conversion_timeout = timeout;
        self
    }

    /// Set the whole-request deadline.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Set the per-client request budget.
    pub fn rate_limit_max_requests(mut self, max: u32) -> Self {
        self.config.rate_limit_max_requests = max;
        self
    }

    /// Set the sliding window length.
    pub fn rate_limit_window(mut self, window: Duration) -> Self {
        self.config.rate_limit_window = window;
        self
    }

    /// Set the rate-limit bypass secret.
    ///
    /// Empty strings are treated as "no secret" so an unset environment
    /// variable can never turn into a bypass that matches an empty header.
    pub fn rate_limit_bypass_secret<S: Into<String>>(mut self, secret: Option<S>) -> Self {
        self.config.rate_limit_bypass_secret = secret.map(Into::into).filter(|s| !s.is_empty());
        self
    }

    /// Choose whether raw tool errors are returned to clients.
    pub fn expose_tool_errors(mut self, expose: bool) -> Self {
        self.config.expose_tool_errors = expose;
        self
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error message describing the first failed rule.
    pub fn build(self) -> std::result::Result<ServiceConfig, String> {
        if self.config.tool_path.as_os_str().is_empty() {
            return Err("tool_path must not be empty".to_string());
        }

        if self.config.conversion_timeout.is_zero() {
            return Err("conversion_timeout must be greater than 0".to_string());
        }

        if self.config.request_timeout.is_zero() {
            return Err("request_timeout must be greater than 0".to_string());
        }

        if self.config.rate_limit_max_requests == 0 {
            return Err("rate_limit_max_requests must be greater than 0".to_string());
        }

        if self.config.rate_limit_window.is_zero() {
            return Err("rate_limit_window must be greater than 0".to_string());
        }

        Ok(self.config)
    }
}

impl Default for ServiceConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Environment Configuration (feature-gated)
// ============================================================================

/// Environment-based configuration loading.
///
/// | Variable | Type | Default |
/// |----------|------|---------|
/// | `WKHTMLTOIMAGE_PATH` | String | `wkhtmltoimage` |
/// | `LISTEN_ADDR` | String | `0.0.0.0:8080` |
/// | `CONVERSION_TIMEOUT_SECONDS` | u64 | 5 |
/// | `REQUEST_TIMEOUT_SECONDS` | u64 | 5 |
/// | `RATE_LIMIT_MAX_REQUESTS` | u32 | 100 |
/// | `RATE_LIMIT_WINDOW_SECONDS` | u64 | 86400 |
/// | `RATE_LIMIT_BYPASS_SECRET` | String | unset |
/// | `EXPOSE_TOOL_ERRORS` | bool (`true/false`, `1/0`, `yes/no`, `on/off`) | true |
#[cfg(feature = "env-config")]
pub mod env {
    use super::*;
    use crate::error::Html2ImageError;

    /// Name of the optional environment file.
    pub const ENV_FILE_NAME: &str = "app.env";

    /// Load `app.env` into the process environment.
    pub fn load_env_file() -> Result<std::path::PathBuf, dotenvy::Error> {
        dotenvy::from_filename(ENV_FILE_NAME)
    }

    fn parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
        std::env::var(name)
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Parse an on/off switch, case-insensitively.
    ///
    /// Accepts `true/false`, `1/0`, `yes/no` and `on/off`. Anything else is
    /// a configuration error rather than a silent default.
    pub(crate) fn parse_flag(name: &str, value: &str) -> crate::Result<bool> {
        match value.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(Html2ImageError::Configuration(format!(
                "{} must be one of true/false, 1/0, yes/no, on/off (got {:?})",
                name, value
            ))),
        }
    }

    fn flag(name: &str, default: bool) -> crate::Result<bool> {
        match std::env::var(name) {
            Ok(value) => parse_flag(name, &value),
            Err(_) => Ok(default),
        }
    }

    /// Load configuration from `app.env` (if present) and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`Html2ImageError::Configuration`] if `EXPOSE_TOOL_ERRORS` is
    /// not a recognized switch value or the resulting values fail validation.
    pub fn from_env() -> crate::Result<ServiceConfig> {
        match load_env_file() {
            Ok(path) => {
                log::info!("📄 Loaded configuration from: {:?}", path);
            }
            Err(e) => {
                log::debug!(
                    "No {} file found or failed to load: {} (using environment variables and defaults)",
                    ENV_FILE_NAME,
                    e
                );
            }
        }

        let tool_path =
            std::env::var("WKHTMLTOIMAGE_PATH").unwrap_or_else(|_| DEFAULT_TOOL.to_string());
        let listen_addr =
            std::env::var("LISTEN_ADDR").unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string());
        let conversion_timeout_seconds = parsed("CONVERSION_TIMEOUT_SECONDS", DEFAULT_TIMEOUT_SECS);
        let request_timeout_seconds = parsed("REQUEST_TIMEOUT_SECONDS", DEFAULT_TIMEOUT_SECS);
        let max_requests = parsed("RATE_LIMIT_MAX_REQUESTS", DEFAULT_RATE_LIMIT_MAX_REQUESTS);
        let window_seconds = parsed("RATE_LIMIT_WINDOW_SECONDS", DEFAULT_RATE_LIMIT_WINDOW_SECS);
        let bypass_secret = std::env::var("RATE_LIMIT_BYPASS_SECRET").ok();
        let expose_tool_errors = flag("EXPOSE_TOOL_ERRORS", true)?;

        log::info!("Loading service configuration from environment:");
        log::info!("   - Rendering tool: {}", tool_path);
        log::info!("   - Listen address: {}", listen_addr);
        log::info!("   - Conversion timeout: {}s", conversion_timeout_seconds);
        log::info!("   - Request timeout: {}s", request_timeout_seconds);
        log::info!(
            "   - Rate limit: {} requests / {}s",
            max_requests,
            window_seconds
        );
        log::info!(
            "   - Rate limit bypass: {}",
            if bypass_secret.as_deref().is_some_and(|s| !s.is_empty()) {
                "configured"
            } else {
                "disabled"
            }
        );
        log::info!("   - Expose tool errors: {}", expose_tool_errors);

        ServiceConfigBuilder::new()
            .tool_path(tool_path)
            .listen_addr(listen_addr)
            .conversion_timeout(Duration::from_secs(conversion_timeout_seconds))
            .request_timeout(Duration::from_secs(request_timeout_seconds))
            .rate_limit_max_requests(max_requests)
            .rate_limit_window(Duration::from_secs(window_seconds))
            .rate_limit_bypass_secret(bypass_secret)
            .expose_tool_errors(expose_tool_errors)
            .build()
            .map_err(Html2ImageError::Configuration)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
