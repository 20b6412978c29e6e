//! Configuration schema definitions.
//!
//! This module defines the complete settings structure for the gateway.
//! Every field has a default so an empty environment yields a usable config.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;
use url::Url;

use crate::security::rate_limit::{RateLimitConfig, WINDOW};

pub const DEFAULT_MODEL_TIMEOUT: Duration = Duration::from_secs(30);

/// Root settings for the gateway.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    /// Bind address (e.g., "0.0.0.0").
    pub api_host: String,

    /// Bind port.
    pub api_port: u16,

    /// Upstream model server used by the nanocode router.
    pub model_server_url: Url,

    /// Logging verbosity.
    pub log_level: LogLevel,

    /// Maximum request body size in bytes.
    pub max_request_body_size: usize,

    /// Timeout for model server calls in seconds.
    pub model_timeout_seconds: f64,

    /// Requests per minute admitted per client IP.
    pub rate_limit_per_minute: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_host: "0.0.0.0".to_string(),
            api_port: 8000,
            model_server_url: default_model_server_url(),
            log_level: LogLevel::Info,
            max_request_body_size: 1_000_000,
            model_timeout_seconds: DEFAULT_MODEL_TIMEOUT.as_secs_f64(),
            rate_limit_per_minute: 60,
        }
    }
}

pub(crate) fn default_model_server_url() -> Url {
    Url::parse("http://localhost:9000").expect("default model server url is valid")
}

impl Settings {
    /// Host/port pair accepted by `TcpListener::bind`.
    pub fn bind_address(&self) -> (&str, u16) {
        (self.api_host.as_str(), self.api_port)
    }

    /// Upstream call timeout.
    ///
    /// Values rejected by validation (non-positive, non-finite, overflowing)
    /// fall back to the default timeout.
    pub fn model_timeout(&self) -> Duration {
        match Duration::try_from_secs_f64(self.model_timeout_seconds) {
            Ok(timeout) if !timeout.is_zero() => timeout,
            _ => DEFAULT_MODEL_TIMEOUT,
        }
    }

    /// Limiter configuration derived from `rate_limit_per_minute`.
    pub fn rate_limit(&self) -> RateLimitConfig {
        RateLimitConfig {
            threshold: self.rate_limit_per_minute,
            window: WINDOW,
        }
    }
}

/// Log verbosity as written in `LOG_LEVEL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// The `tracing` filter directive for this level.
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            // tracing has nothing above error
            LogLevel::Error | LogLevel::Critical => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warning),
            "ERROR" => Ok(LogLevel::Error),
            "CRITICAL" => Ok(LogLevel::Critical),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let settings = Settings::default();
        assert_eq!(settings.bind_address(), ("0.0.0.0", 8000));
        assert_eq!(settings.model_server_url.as_str(), "http://localhost:9000/");
        assert_eq!(settings.log_level, LogLevel::Info);
        assert_eq!(settings.max_request_body_size, 1_000_000);
        assert_eq!(settings.model_timeout(), Duration::from_secs(30));
        assert_eq!(settings.rate_limit().threshold, 60);
        assert_eq!(settings.rate_limit().window, Duration::from_secs(60));
    }

    #[test]
    fn model_timeout_never_panics_on_unvalidated_values() {
        for secs in [1e20, f64::INFINITY, f64::NAN, -5.0, 0.0] {
            let settings = Settings {
                model_timeout_seconds: secs,
                ..Settings::default()
            };
            assert_eq!(settings.model_timeout(), DEFAULT_MODEL_TIMEOUT);
        }

        let settings = Settings {
            model_timeout_seconds: 0.25,
            ..Settings::default()
        };
        assert_eq!(settings.model_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn log_level_accepts_python_style_names() {
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warning);
        assert_eq!("WARN".parse::<LogLevel>().unwrap(), LogLevel::Warning);
        assert_eq!("Critical".parse::<LogLevel>().unwrap().as_directive(), "error");
        assert!("verbose".parse::<LogLevel>().is_err());
    }
}
