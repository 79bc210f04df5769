//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → rate_limit.rs (classify collection operation, consult policy limiter)
//!     → limiter.rs (shared token buckets)
//!     → admin_auth.rs (Bearer token, only on routes that opt in)
//!     → Pass to routing
//! ```
//!
//! # Design Decisions
//! - Policies and limiters built once at startup, shared via Arc
//! - Fail closed: an exhausted bucket rejects with 429 before the handler runs
//! - Requests outside every protected collection are never metered

pub mod admin_auth;
pub mod limiter;
pub mod rate_limit;

pub use limiter::{Clock, Limiter, SystemClock, TokenBucketLimiter};
pub use rate_limit::{
    collection_endpoint, collection_rate_limit_middleware, CollectionRateLimiter, Operation,
    RateLimitPolicy,
};
