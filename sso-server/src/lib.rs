//! # SSO Server
//!
//! Network-facing layer for `sso-auth`: YAML configuration, per-environment
//! logging, request validation, error → status mapping, HTTP/JSON routes
//! and graceful shutdown.

pub mod app;
pub mod config;
pub mod http;
pub mod logging;
pub mod transport;

pub use app::{shutdown_signal, ServerApp};
pub use config::{ConfigError, ServerConfig};
pub use transport::{status_from, AuthTransport};
