//! Collection Gate Library
//!
//! Per-collection rate limiting and list-response field exclusion for a
//! REST-style records API.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod records;
pub mod security;

pub use config::GateConfig;
pub use http::GateServer;
pub use lifecycle::Shutdown;
