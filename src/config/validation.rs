//! Configuration validation.
//!
//! Semantic checks only; serde handles syntax. Every problem is reported,
//! not just the first.

use crate::config::schema::AppConfig;
use crate::ledger::types::ring_fee;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn is_hex_id(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| b.is_ascii_hexdigit())
}

pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut push = |field: &'static str, message: String| {
        errors.push(ValidationError { field, message });
    };

    if !is_hex_id(&config.ledger.scid) {
        push(
            "ledger.scid",
            format!("expected 64 hex characters, got '{}'", config.ledger.scid),
        );
    }

    if ring_fee(config.ledger.ringsize).is_none() {
        push(
            "ledger.ringsize",
            format!("unsupported ring size {}", config.ledger.ringsize),
        );
    }

    if config.bridge.request_timeout_secs == 0 {
        push("bridge.request_timeout_secs", "must be greater than 0".to_string());
    }

    if config.bridge.rate_limit == 0 {
        push("bridge.rate_limit", "must be greater than 0".to_string());
    }

    if let Err(e) = url::Url::parse(&config.bridge.endpoint()) {
        push("bridge.address", format!("invalid endpoint: {}", e));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        push(
            "observability.metrics_address",
            format!("invalid socket address '{}'", config.observability.metrics_address),
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
