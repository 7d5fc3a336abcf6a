use std::net::SocketAddr;

use serde::Deserialize;

use crate::health::HealthConfig;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub listen_address: Option<SocketAddr>,
    #[serde(default)]
    pub health: HealthConfig,
    /// Prefix for every API route
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
    /// Prefix of generated request and trace ids
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: None,
            health: HealthConfig::default(),
            api_prefix: default_api_prefix(),
            namespace: default_namespace(),
        }
    }
}

fn default_api_prefix() -> String {
    "/api/v1".to_string()
}

fn default_namespace() -> String {
    "rota".to_string()
}
