//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;

use rota_config::{AuthConfig, Config, DatabaseConfig, HealthConfig, ServerConfig};
use secrecy::SecretString;

pub const SECRET: &str = "integration-test-secret";

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// In-memory database, health enabled, auth on with [`SECRET`]
    pub fn new() -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    health: HealthConfig {
                        enabled: true,
                        ..HealthConfig::default()
                    },
                    ..ServerConfig::default()
                },
                database: DatabaseConfig::default(),
                auth: AuthConfig {
                    access_token_secret: SecretString::from(SECRET.to_owned()),
                    password_iterations: 1_000,
                    ..AuthConfig::default()
                },
                ..Config::default()
            },
        }
    }

    /// Disable bearer token checks
    pub fn without_auth(mut self) -> Self {
        self.config.auth.enabled = false;
        self
    }

    /// Paths reachable without a token
    pub fn with_public_paths(mut self, paths: &[&str]) -> Self {
        self.config.auth.public_paths = paths.iter().map(|p| (*p).to_owned()).collect();
        self
    }

    /// Load the message catalog from `path`
    pub fn with_catalog(mut self, path: &std::path::Path) -> Self {
        self.config.errors.catalog_path = Some(path.to_path_buf());
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    pub fn with_api_prefix(mut self, prefix: &str) -> Self {
        self.config.server.api_prefix = prefix.to_owned();
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
