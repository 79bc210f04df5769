//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, capacities > 0, expiry >= interval)
//! - Detect duplicate collection policies
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GateConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use crate::config::schema::GateConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    BindAddress(String),

    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),

    #[error("request timeout must be greater than zero")]
    ZeroTimeout,

    #[error("policy #{index}: collection name must not be empty")]
    EmptyCollection { index: usize },

    #[error("policy #{index}: collection name '{name}' must not contain '/'")]
    InvalidCollection { index: usize, name: String },

    #[error("policy '{0}' has no operations")]
    NoOperations(String),

    #[error("policy '{0}' capacity must be greater than zero")]
    ZeroCapacity(String),

    #[error("policy '{0}' interval must be greater than zero")]
    ZeroInterval(String),

    #[error("policy '{0}' expires_in_secs must be greater than zero and at least interval_secs")]
    ExpiryTooShort(String),

    #[error("duplicate policy for collection '{0}'")]
    DuplicatePolicy(String),
}

pub fn validate_config(config: &GateConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    let mut seen = HashSet::new();
    for (index, policy) in config.rate_limit.policies.iter().enumerate() {
        let name = &policy.collection;
        if name.is_empty() {
            errors.push(ValidationError::EmptyCollection { index });
        } else if name.contains('/') {
            errors.push(ValidationError::InvalidCollection { index, name: name.clone() });
        } else if !seen.insert(name.as_str()) {
            errors.push(ValidationError::DuplicatePolicy(name.clone()));
        }

        if policy.operations.is_empty() {
            errors.push(ValidationError::NoOperations(name.clone()));
        }
        if policy.capacity == 0 {
            errors.push(ValidationError::ZeroCapacity(name.clone()));
        }
        if policy.interval_secs == 0 {
            errors.push(ValidationError::ZeroInterval(name.clone()));
        }
        if policy.expires_in_secs == 0 || policy.expires_in_secs < policy.interval_secs {
            errors.push(ValidationError::ExpiryTooShort(name.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::PolicyConfig;
    use crate::security::rate_limit::Operation;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&GateConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = GateConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.timeouts.request_secs = 0;
        config.rate_limit.policies.push(PolicyConfig {
            collection: "a/b".into(),
            operations: vec![Operation::List],
            capacity: 0,
            ..PolicyConfig::default()
        });

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::BindAddress("not-an-address".into()),
                ValidationError::ZeroTimeout,
                ValidationError::InvalidCollection { index: 1, name: "a/b".into() },
                ValidationError::ZeroCapacity("a/b".into()),
            ]
        );
    }

    #[test]
    fn test_duplicate_policy() {
        let mut config = GateConfig::default();
        config.rate_limit.policies.push(PolicyConfig {
            collection: "posts".into(),
            operations: vec![Operation::Create],
            ..PolicyConfig::default()
        });

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::DuplicatePolicy("posts".into())]);
    }

    #[test]
    fn test_bucket_expiry_must_cover_interval() {
        let mut config = GateConfig::default();
        config.rate_limit.policies = vec![
            PolicyConfig {
                collection: "posts".into(),
                operations: vec![Operation::List],
                expires_in_secs: 0,
                ..PolicyConfig::default()
            },
            PolicyConfig {
                collection: "articles".into(),
                operations: vec![Operation::List],
                interval_secs: 60,
                expires_in_secs: 10,
                ..PolicyConfig::default()
            },
            PolicyConfig {
                collection: "notes".into(),
                operations: vec![Operation::List],
                interval_secs: 60,
                expires_in_secs: 60,
                ..PolicyConfig::default()
            },
        ];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::ExpiryTooShort("posts".into()),
                ValidationError::ExpiryTooShort("articles".into()),
            ]
        );
    }
}
