//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, per-request span)
//!     → security::rate_limit (collection policies)
//!     → records.rs / connect.rs (handlers)
//!     → response.rs (error envelope)
//!     → Send to client
//! ```

pub mod connect;
pub mod records;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::ApiError;
pub use server::{AppState, GateServer};
