//! Web framework integrations.
//!
//! | Framework | Feature Flag | Module |
//! |-----------|--------------|--------|
//! | Axum | `axum-integration` | `axum` |
//!
//! The service core in [`crate::service`] has no framework dependency;
//! integrations only translate between HTTP and its types.

#[cfg(feature = "axum-integration")]
pub mod axum;
