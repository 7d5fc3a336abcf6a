use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;

/// Bearer-token authentication and account credentials
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// HS256 key used to sign and verify access tokens
    #[serde(default = "empty_secret")]
    pub access_token_secret: SecretString,
    /// Paths reachable without a token, matched on whole segments
    #[serde(default)]
    pub public_paths: Vec<String>,
    /// Lifetime of tokens issued at sign-in, e.g. `"28d"`
    #[serde(default = "default_token_ttl")]
    pub token_ttl: String,
    /// PBKDF2 rounds for new password hashes
    #[serde(default = "default_password_iterations")]
    pub password_iterations: u32,
}

impl AuthConfig {
    /// Parsed token lifetime
    ///
    /// # Errors
    ///
    /// Returns an error if `token_ttl` is not a valid duration
    pub fn token_ttl(&self) -> anyhow::Result<Duration> {
        duration_str::parse(&self.token_ttl)
            .map_err(|e| anyhow::anyhow!("invalid auth.token_ttl '{}': {e}", self.token_ttl))
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            access_token_secret: empty_secret(),
            public_paths: Vec::new(),
            token_ttl: default_token_ttl(),
            password_iterations: default_password_iterations(),
        }
    }
}

#[allow(clippy::missing_const_for_fn)]
fn default_enabled() -> bool {
    true
}

fn empty_secret() -> SecretString {
    SecretString::from(String::new())
}

fn default_token_ttl() -> String {
    "28d".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_password_iterations() -> u32 {
    100_000
}
