//! Settings validation.
//!
//! # Responsibilities
//! - Semantic validation (the loader handles parsing)
//! - Validate value ranges (timeouts > 0, ports valid, limits positive)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: Settings → Result<(), Vec<ValidationError>>
//! - Runs before settings are accepted into the system

use std::time::Duration;

use thiserror::Error;

use crate::config::schema::Settings;

/// A single problem with one configuration key.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// The raw value could not be parsed into the field's type.
    #[error("{key}: cannot parse '{value}': {reason}")]
    Unparseable {
        key: &'static str,
        value: String,
        reason: String,
    },

    /// The value parsed but is outside the accepted range.
    #[error("{key}: {reason}")]
    OutOfRange { key: &'static str, reason: String },
}

impl ValidationError {
    /// The configuration key this error refers to.
    pub fn key(&self) -> &'static str {
        match self {
            ValidationError::Unparseable { key, .. } => key,
            ValidationError::OutOfRange { key, .. } => key,
        }
    }
}

/// Check value ranges of already-parsed settings.
pub fn validate_settings(settings: &Settings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if settings.api_host.trim().is_empty() {
        errors.push(out_of_range("api_host", "must not be empty"));
    }
    if settings.api_port == 0 {
        errors.push(out_of_range("api_port", "must be between 1 and 65535"));
    }
    if !matches!(settings.model_server_url.scheme(), "http" | "https") {
        errors.push(out_of_range("model_server_url", "scheme must be http or https"));
    }
    if settings.model_server_url.host_str().is_none() {
        errors.push(out_of_range("model_server_url", "must include a host"));
    }
    if settings.max_request_body_size == 0 {
        errors.push(out_of_range("max_request_body_size", "must be greater than zero"));
    }
    if !settings.model_timeout_seconds.is_finite() || settings.model_timeout_seconds <= 0.0 {
        errors.push(out_of_range(
            "model_timeout_seconds",
            "must be a positive number of seconds",
        ));
    } else if Duration::try_from_secs_f64(settings.model_timeout_seconds).is_err() {
        errors.push(out_of_range(
            "model_timeout_seconds",
            "is too large to represent as a timeout",
        ));
    }
    if settings.rate_limit_per_minute == 0 {
        errors.push(out_of_range("rate_limit_per_minute", "must be at least 1"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn out_of_range(key: &'static str, reason: &str) -> ValidationError {
    ValidationError::OutOfRange {
        key,
        reason: reason.to_string(),
    }
}
