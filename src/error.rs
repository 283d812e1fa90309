//! Error types for service startup and configuration.
//!
//! This module provides [`Html2ImageError`], the error type for everything
//! that happens outside a single conversion request (loading configuration,
//! binding the listener), and a convenient [`Result`] type alias.
//!
//! Per-request failures use
//! [`ImageServiceError`](crate::service::ImageServiceError) instead, which
//! carries an HTTP status mapping.
//!
//! # Example
//!
//! ```rust
//! use html2image_api::{Html2ImageError, Result};
//!
//! fn load() -> Result<u64> {
//!     Err(Html2ImageError::Configuration("example error".to_string()))
//! }
//!
//! match load() {
//!     Ok(secs) => println!("timeout {}s", secs),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

/// Errors that can occur while configuring or starting the service.
#[derive(Debug, thiserror::Error)]
pub enum Html2ImageError {
    /// Invalid configuration provided.
    ///
    /// # Common Causes
    ///
    /// - A timeout set to zero
    /// - `rate_limit_max_requests` set to zero
    /// - An empty rendering tool path
    ///
    /// # Prevention
    ///
    /// Use [`ServiceConfigBuilder`](crate::ServiceConfigBuilder), which
    /// validates configuration at build time.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An I/O failure outside of a conversion, e.g. binding the listen socket.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using [`Html2ImageError`].
pub type Result<T> = std::result::Result<T, Html2ImageError>;

// ============================================================================
// Unit Tests
// ============================================================================
