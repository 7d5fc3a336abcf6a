#![allow(clippy::must_use_candidate)]

pub mod auth;
pub mod database;
mod env;
pub mod errors;
pub mod health;
mod loader;
pub mod server;
pub mod telemetry;

use serde::Deserialize;

pub use auth::*;
pub use database::*;
pub use errors::*;
pub use health::*;
pub use server::*;
pub use telemetry::*;

/// Top-level Rota configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Error registry and message catalog
    #[serde(default)]
    pub errors: ErrorsConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}
