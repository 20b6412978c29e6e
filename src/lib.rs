//! Nanocode API gateway library.

pub mod admin;
pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod nanocode;
pub mod observability;
pub mod security;

pub use config::Settings;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
