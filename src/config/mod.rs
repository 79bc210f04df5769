//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GateConfig (validated, immutable)
//!     → rate limit policies built once at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; policies live for the process lifetime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::GateConfig;
pub use schema::{
    AdminConfig, ConnectConfig, LimitKey, ListenerConfig, ObservabilityConfig, PolicyConfig,
    RateLimitConfig, StoreConfig, TimeoutConfig,
};
