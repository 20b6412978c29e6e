//! Settings loading from the environment and `.env`.

use std::collections::HashMap;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;

use thiserror::Error;

use crate::config::schema::{default_model_server_url, LogLevel, Settings};
use crate::config::validation::{validate_settings, ValidationError};

/// Dotenv file read from the working directory.
pub const ENV_FILE: &str = ".env";

static SETTINGS: OnceLock<Settings> = OnceLock::new();

/// Error type for settings loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    #[error("invalid configuration: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Process-wide settings, loaded on first call.
///
/// Subsequent calls return the same instance; environment changes made after
/// the first call are not observed.
pub fn settings() -> Result<&'static Settings, ConfigError> {
    if let Some(settings) = SETTINGS.get() {
        return Ok(settings);
    }
    let loaded = load_settings()?;
    Ok(SETTINGS.get_or_init(|| loaded))
}

/// Load settings from `./.env` overlaid with the process environment.
pub fn load_settings() -> Result<Settings, ConfigError> {
    let vars = std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)));
    load_from(Path::new(ENV_FILE), vars)
}

/// Load settings from a dotenv file (optional) overlaid with `vars`.
pub fn load_from<I>(env_file: &Path, vars: I) -> Result<Settings, ConfigError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut source = read_env_file(env_file)?;
    source.extend(vars);
    Settings::from_vars(source)
}

fn read_env_file(path: &Path) -> Result<Vec<(String, String)>, ConfigError> {
    if !path.is_file() {
        return Ok(Vec::new());
    }

    let to_error = |source| ConfigError::EnvFile {
        path: path.to_path_buf(),
        source,
    };

    let entries = dotenvy::from_path_iter(path).map_err(to_error)?;
    let pairs = entries.collect::<Result<Vec<_>, _>>().map_err(to_error)?;

    tracing::debug!(path = %path.display(), entries = pairs.len(), "Loaded env file");
    Ok(pairs)
}

impl Settings {
    /// Build settings from key/value pairs.
    ///
    /// Keys match case-insensitively; later pairs override earlier ones;
    /// unrecognized keys are ignored. Missing keys take their defaults.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let source: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_ascii_lowercase(), v.into()))
            .collect();

        let defaults = Settings::default();
        let mut errors = Vec::new();

        let settings = Settings {
            api_host: source
                .get("api_host")
                .map(|v| v.trim().to_string())
                .unwrap_or(defaults.api_host),
            api_port: parse_field(&source, "api_port", defaults.api_port, &mut errors),
            model_server_url: parse_field(
                &source,
                "model_server_url",
                default_model_server_url(),
                &mut errors,
            ),
            log_level: parse_field::<LogLevel>(&source, "log_level", defaults.log_level, &mut errors),
            max_request_body_size: parse_field(
                &source,
                "max_request_body_size",
                defaults.max_request_body_size,
                &mut errors,
            ),
            model_timeout_seconds: parse_field(
                &source,
                "model_timeout_seconds",
                defaults.model_timeout_seconds,
                &mut errors,
            ),
            rate_limit_per_minute: parse_field(
                &source,
                "rate_limit_per_minute",
                defaults.rate_limit_per_minute,
                &mut errors,
            ),
        };

        if let Err(mut semantic) = validate_settings(&settings) {
            errors.append(&mut semantic);
        }

        if errors.is_empty() {
            Ok(settings)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

fn parse_field<T>(
    source: &HashMap<String, String>,
    key: &'static str,
    default: T,
    errors: &mut Vec<ValidationError>,
) -> T
where
    T: FromStr,
    T::Err: Display,
{
    let Some(raw) = source.get(key) else {
        return default;
    };

    match raw.trim().parse() {
        Ok(value) => value,
        Err(e) => {
            errors.push(ValidationError::Unparseable {
                key,
                value: raw.clone(),
                reason: e.to_string(),
            });
            default
        }
    }
}
