//! Per-collection rate limiting middleware.
//!
//! A policy names one collection and the operations on it that consume
//! tokens. Operations are classified from the method and path shape:
//!
//! ```text
//! GET    /api/collections/{c}/records          → list   (exact path)
//! GET    /api/collections/{c}/records...       → view   (prefix)
//! POST   /api/collections/{c}/records...       → create (prefix)
//! PATCH  /api/collections/{c}/records...       → update (prefix)
//! DELETE /api/collections/{c}/records...       → delete (prefix)
//! ```
//!
//! `list` is tested first so an exact-path GET is never also a `view`.
//! Paths are percent-decoded before classification.

use std::collections::HashSet;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Method, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};

use crate::config::{LimitKey, PolicyConfig};
use crate::http::response::ApiError;
use crate::observability::metrics;
use crate::security::limiter::{Limiter, TokenBucketLimiter, GLOBAL_KEY};

/// A record operation on a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    List,
    View,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::View => "view",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }

    /// Classify a request against a collection endpoint.
    ///
    /// Returns `None` when the path is outside the endpoint or the method is
    /// not a record operation.
    pub fn classify(method: &Method, path: &str, endpoint: &str) -> Option<Self> {
        if *method == Method::GET && path == endpoint {
            return Some(Operation::List);
        }
        if !path.starts_with(endpoint) {
            return None;
        }
        match *method {
            Method::GET => Some(Operation::View),
            Method::POST => Some(Operation::Create),
            Method::PATCH => Some(Operation::Update),
            Method::DELETE => Some(Operation::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical records endpoint of a collection.
pub fn collection_endpoint(collection: &str) -> String {
    format!("/api/collections/{}/records", collection)
}

/// Rate limit policy for one collection.
#[derive(Debug, Clone)]
pub struct RateLimitPolicy {
    collection: String,
    endpoint: String,
    operations: HashSet<Operation>,
    key: LimitKey,
    limiter: Arc<dyn Limiter>,
}

impl RateLimitPolicy {
    pub fn new(
        collection: impl Into<String>,
        operations: impl IntoIterator<Item = Operation>,
        limiter: Arc<dyn Limiter>,
    ) -> Self {
        let collection = collection.into();
        Self {
            endpoint: collection_endpoint(&collection),
            collection,
            operations: operations.into_iter().collect(),
            key: LimitKey::Global,
            limiter,
        }
    }

    pub fn from_config(config: &PolicyConfig) -> Self {
        Self::new(
            config.collection.clone(),
            config.operations.iter().copied(),
            Arc::new(TokenBucketLimiter::from_config(config)),
        )
        .with_key(config.key)
    }

    pub fn with_key(mut self, key: LimitKey) -> Self {
        self.key = key;
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// The operation this policy meters for the request, if any. `path` is
    /// expected percent-decoded.
    pub fn matched_operation(&self, method: &Method, path: &str) -> Option<Operation> {
        Operation::classify(method, path, &self.endpoint)
            .filter(|operation| self.operations.contains(operation))
    }

    pub fn should_rate_limit(&self, method: &Method, path: &str) -> bool {
        self.matched_operation(method, path).is_some()
    }
}

/// All configured collection policies, applied in order.
#[derive(Debug, Clone, Default)]
pub struct CollectionRateLimiter {
    policies: Vec<RateLimitPolicy>,
}

impl CollectionRateLimiter {
    pub fn new(policies: Vec<RateLimitPolicy>) -> Self {
        Self { policies }
    }

    pub fn from_config(policies: &[PolicyConfig]) -> Self {
        Self::new(policies.iter().map(RateLimitPolicy::from_config).collect())
    }

    pub fn policies(&self) -> &[RateLimitPolicy] {
        &self.policies
    }
}

/// Client identity for per-client buckets.
///
/// Prefers `X-Real-IP`, then the first `X-Forwarded-For` hop, then the peer address.
fn client_key(request: &Request<Body>) -> Option<String> {
    let headers = request.headers();
    if let Some(ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        let ip = ip.trim();
        if !ip.is_empty() {
            return Some(ip.to_string());
        }
    }
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').map(str::trim).find(|s| !s.is_empty()) {
            return Some(first.to_string());
        }
    }
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
}

/// Middleware applying every matching collection policy before `next`.
pub async fn collection_rate_limit_middleware(
    State(state): State<Arc<CollectionRateLimiter>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().clone();
    // Match the path the router's extractors see, so `po%73ts` is `posts`.
    let path = percent_decode_str(request.uri().path())
        .decode_utf8_lossy()
        .into_owned();

    for policy in state.policies() {
        let Some(operation) = policy.matched_operation(&method, &path) else {
            continue;
        };

        let key = match policy.key {
            LimitKey::Global => GLOBAL_KEY.to_string(),
            LimitKey::ClientIp => match client_key(&request) {
                Some(key) => key,
                None => {
                    tracing::warn!(
                        collection = %policy.collection,
                        "Unable to identify client for rate limiting"
                    );
                    return ApiError::Forbidden("Error while extracting identifier.".to_string())
                        .into_response();
                }
            },
        };

        if !policy.limiter.check(&key) {
            tracing::warn!(
                collection = %policy.collection,
                operation = %operation,
                client = %key,
                "Rate limit exceeded"
            );
            metrics::record_rate_limited(&policy.collection, operation);
            return ApiError::TooManyRequests.into_response();
        }
    }

    next.run(request).await
}
