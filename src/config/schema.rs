//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gate.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::security::rate_limit::Operation;

/// Root configuration for the collection gate.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GateConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Per-collection rate limiting policies.
    pub rate_limit: RateLimitConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Admin credentials.
    pub admin: AdminConfig,

    /// Demo `/api/connect` route settings.
    pub connect: ConnectConfig,

    /// In-memory record store settings.
    pub store: StoreConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8090").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8090".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Policies applied in order; each protects one collection.
    pub policies: Vec<PolicyConfig>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            policies: vec![PolicyConfig {
                collection: "posts".to_string(),
                operations: vec![Operation::List, Operation::View],
                ..PolicyConfig::default()
            }],
        }
    }
}

/// How requests matching a policy are grouped into buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LimitKey {
    /// One bucket shared by every matching request.
    #[default]
    Global,
    /// One bucket per client address.
    ClientIp,
}

/// A single collection rate limit policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Collection name, used to build `/api/collections/{collection}/records`.
    pub collection: String,

    /// Operations that consume tokens.
    pub operations: Vec<Operation>,

    /// Bucket capacity (burst), refilled in full every `interval_secs`.
    pub capacity: u32,

    /// Refill interval in seconds.
    pub interval_secs: u64,

    /// Bucket keying strategy.
    pub key: LimitKey,

    /// Idle per-client buckets are dropped after this many seconds.
    pub expires_in_secs: u64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            collection: String::new(),
            operations: Vec::new(),
            capacity: 2,
            interval_secs: 1,
            key: LimitKey::Global,
            expires_in_secs: 180,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin credentials.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// API key for authentication (Bearer token).
    pub api_key: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
        }
    }
}

/// Demo connect route configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ConnectConfig {
    /// Require the admin Bearer token on `/api/connect`.
    pub require_admin_auth: bool,
}

/// In-memory store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Collections created at startup.
    pub collections: Vec<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            collections: vec!["posts".to_string()],
        }
    }
}
