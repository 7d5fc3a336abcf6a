use serde::Deserialize;

/// SQLite connection settings
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// `sqlite::memory:` or `sqlite://path/to/file.db`
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Apply the embedded schema at startup
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

impl DatabaseConfig {
    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            max_connections: default_max_connections(),
            run_migrations: true,
        }
    }
}

fn default_url() -> String {
    "sqlite::memory:".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_max_connections() -> u32 {
    5
}

#[allow(clippy::missing_const_for_fn)]
fn default_run_migrations() -> bool {
    true
}
