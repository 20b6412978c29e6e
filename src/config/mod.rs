//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! .env file (optional) + process environment
//!     → loader.rs (merge, parse typed values)
//!     → validation.rs (semantic checks)
//!     → Settings (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Settings are immutable once loaded; changes require a restart
//! - All fields have defaults to allow an empty environment
//! - Unknown keys are ignored; malformed known keys fail startup

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_settings, settings, ConfigError};
pub use schema::{LogLevel, Settings};
pub use validation::ValidationError;
