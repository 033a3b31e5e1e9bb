//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0)
//! - Check the holding target can form a request URI
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::uri::Authority;
use thiserror::Error;

use crate::config::schema::ProxyConfig;

/// Paths served by the control endpoints.
const CONTROL_PATHS: [&str; 3] = ["/health", "/register", "/routes"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("routing.probe_timeout_ms must be greater than zero")]
    ZeroProbeTimeout,

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("routing.holding_host must not be empty")]
    EmptyHoldingHost,

    #[error("routing.holding_host is not a valid URI host (got {0:?})")]
    InvalidHoldingHost(String),

    #[error("routing.holding_path must start with '/' (got {0:?})")]
    InvalidHoldingPath(String),

    #[error("routing.holding_path {0:?} collides with a control endpoint")]
    ReservedHoldingPath(String),

    #[error("observability.metrics_address is not a socket address: {0:?}")]
    InvalidMetricsAddress(String),
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.routing.probe_timeout_ms == 0 {
        errors.push(ValidationError::ZeroProbeTimeout);
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }
    let holding_host = &config.routing.holding_host;
    if holding_host.trim().is_empty() {
        errors.push(ValidationError::EmptyHoldingHost);
    } else if format!("{holding_host}:{}", config.listener.port)
        .parse::<Authority>()
        .is_err()
    {
        // The port is appended at runtime, so a host carrying its own is rejected
        errors.push(ValidationError::InvalidHoldingHost(holding_host.clone()));
    }
    let holding_path = &config.routing.holding_path;
    if !holding_path.starts_with('/') || holding_path.contains(['?', '#', ' ']) {
        errors.push(ValidationError::InvalidHoldingPath(holding_path.clone()));
    } else if CONTROL_PATHS.contains(&holding_path.as_str()) {
        errors.push(ValidationError::ReservedHoldingPath(holding_path.clone()));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
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

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&ProxyConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ProxyConfig::default();
        config.routing.probe_timeout_ms = 0;
        config.timeouts.request_secs = 0;
        config.routing.holding_path = "wait".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::ZeroProbeTimeout,
                ValidationError::ZeroRequestTimeout,
                ValidationError::InvalidHoldingPath("wait".into()),
            ]
        );
    }

    #[test]
    fn test_holding_host_must_form_authority() {
        for host in ["bad host", "localhost:9000", "a/b"] {
            let mut config = ProxyConfig::default();
            config.routing.holding_host = host.into();
            assert_eq!(
                validate_config(&config),
                Err(vec![ValidationError::InvalidHoldingHost(host.into())])
            );
        }

        let mut config = ProxyConfig::default();
        config.routing.holding_host = "[::1]".into();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_holding_path_cannot_shadow_control_endpoint() {
        let mut config = ProxyConfig::default();
        config.routing.holding_path = "/routes".into();

        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::ReservedHoldingPath("/routes".into())])
        );
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = ProxyConfig::default();
        config.observability.metrics_address = "nowhere".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::InvalidMetricsAddress("nowhere".into())])
        );
    }
}
