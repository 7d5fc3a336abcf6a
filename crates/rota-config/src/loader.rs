use std::path::Path;

use secrecy::ExposeSecret;

use crate::Config;

impl Config {
    /// Load, expand, parse, and validate a TOML config file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, a placeholder cannot be
    /// expanded, the TOML is invalid, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        let config = Self::from_toml(&raw)?;
        tracing::debug!(path = %path.display(), "configuration loaded");

        Ok(config)
    }

    /// Parse and validate config text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing, or validation fails
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let expanded = crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Check cross-field constraints
    ///
    /// # Errors
    ///
    /// Returns an error describing the first violated constraint
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_server()?;
        self.validate_database()?;
        self.validate_errors()?;
        self.validate_auth()?;
        Ok(())
    }

    fn validate_server(&self) -> anyhow::Result<()> {
        let namespace = &self.server.namespace;
        if namespace.is_empty() || namespace.contains('.') {
            anyhow::bail!("server.namespace must be non-empty and must not contain '.'");
        }

        if !self.server.api_prefix.starts_with('/') {
            anyhow::bail!("server.api_prefix must start with '/'");
        }

        if self.server.health.enabled && !self.server.health.path.starts_with('/') {
            anyhow::bail!("server.health.path must start with '/'");
        }

        Ok(())
    }

    fn validate_database(&self) -> anyhow::Result<()> {
        if self.database.max_connections == 0 {
            anyhow::bail!("database.max_connections must be greater than 0");
        }

        Ok(())
    }

    fn validate_errors(&self) -> anyhow::Result<()> {
        if self.errors.registry_capacity == 0 {
            anyhow::bail!("errors.registry_capacity must be greater than 0");
        }

        if self.errors.registry_ttl()?.is_zero() {
            anyhow::bail!("errors.registry_ttl must be greater than 0");
        }

        Ok(())
    }

    fn validate_auth(&self) -> anyhow::Result<()> {
        if self.auth.enabled && self.auth.access_token_secret.expose_secret().is_empty() {
            anyhow::bail!("auth.access_token_secret must not be empty when auth is enabled");
        }

        if self.auth.token_ttl()?.is_zero() {
            anyhow::bail!("auth.token_ttl must be greater than 0");
        }

        if self.auth.password_iterations == 0 {
            anyhow::bail!("auth.password_iterations must be greater than 0");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{io::Write, time::Duration};

    use crate::{Config, LogFormat};

    const MINIMAL: &str = r#"
        [auth]
        access_token_secret = "s3cret"
    "#;

    #[test]
    fn defaults() {
        let config = Config::from_toml(MINIMAL).unwrap();

        assert_eq!(config.server.api_prefix, "/api/v1");
        assert_eq!(config.server.namespace, "rota");
        assert!(config.server.health.enabled);
        assert_eq!(config.server.health.path, "/health");
        assert!(config.database.is_in_memory());
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.errors.registry_capacity, 10_000);
        assert_eq!(config.errors.registry_ttl().unwrap(), Duration::from_secs(300));
        assert_eq!(config.telemetry.format, LogFormat::Text);
        assert_eq!(config.telemetry.log_filter, "info");
        assert_eq!(config.auth.token_ttl().unwrap(), Duration::from_secs(28 * 24 * 60 * 60));
        assert_eq!(config.auth.password_iterations, 100_000);
    }

    #[test]
    fn full_config() {
        let raw = r#"
            [server]
            listen_address = "127.0.0.1:4000"
            api_prefix = "/api/v2"
            namespace = "acme"

            [server.health]
            path = "/healthz"

            [database]
            url = "sqlite://rota.db"
            max_connections = 8
            run_migrations = false

            [errors]
            registry_capacity = 500
            registry_ttl = "90s"
            catalog_path = "codes.json"

            [auth]
            access_token_secret = "key"
            public_paths = ["/api/v2/share-links"]
            token_ttl = "1h"
            password_iterations = 1000

            [telemetry]
            log_filter = "rota=debug"
            format = "json"
        "#;

        let config = Config::from_toml(raw).unwrap();

        assert_eq!(config.server.listen_address.unwrap().port(), 4000);
        assert_eq!(config.server.namespace, "acme");
        assert_eq!(config.server.health.path, "/healthz");
        assert!(!config.database.is_in_memory());
        assert!(!config.database.run_migrations);
        assert_eq!(config.errors.registry_ttl().unwrap(), Duration::from_secs(90));
        assert_eq!(config.errors.catalog_path.as_deref().unwrap().to_str(), Some("codes.json"));
        assert_eq!(config.auth.public_paths, vec!["/api/v2/share-links"]);
        assert_eq!(config.auth.token_ttl().unwrap(), Duration::from_secs(3600));
        assert_eq!(config.auth.password_iterations, 1000);
        assert_eq!(config.telemetry.format, LogFormat::Json);
    }

    #[test]
    fn secret_is_required_when_auth_enabled() {
        let err = Config::from_toml("").unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"auth.access_token_secret must not be empty when auth is enabled");

        assert!(Config::from_toml("[auth]\nenabled = false").is_ok());
    }

    #[test]
    fn rejects_dotted_namespace() {
        let raw = format!("{MINIMAL}\n[server]\nnamespace = \"a.b\"");
        let err = Config::from_toml(&raw).unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"server.namespace must be non-empty and must not contain '.'");
    }

    #[test]
    fn rejects_zero_capacity_and_bad_ttl() {
        let raw = format!("{MINIMAL}\n[errors]\nregistry_capacity = 0");
        let err = Config::from_toml(&raw).unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"errors.registry_capacity must be greater than 0");

        let raw = format!("{MINIMAL}\n[errors]\nregistry_ttl = \"soon\"");
        assert!(Config::from_toml(&raw).unwrap_err().to_string().contains("registry_ttl"));
    }

    #[test]
    fn rejects_zero_token_settings() {
        let raw = "[auth]\naccess_token_secret = \"k\"\npassword_iterations = 0";
        let err = Config::from_toml(raw).unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"auth.password_iterations must be greater than 0");

        let raw = "[auth]\naccess_token_secret = \"k\"\ntoken_ttl = \"0s\"";
        let err = Config::from_toml(raw).unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"auth.token_ttl must be greater than 0");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let raw = format!("{MINIMAL}\n[database]\nusername = \"x\"");
        let err = Config::from_toml(&raw).unwrap_err();
        assert!(err.to_string().contains("unknown field"));
    }

    #[test]
    fn secret_from_environment() {
        temp_env::with_var("ROTA_TEST_TOKEN_KEY", Some("from-env"), || {
            let config = Config::from_toml("[auth]\naccess_token_secret = \"{{ env.ROTA_TEST_TOKEN_KEY }}\"").unwrap();
            assert!(config.auth.enabled);
        });
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert!(config.auth.enabled);

        let err = Config::load(std::path::Path::new("/no/such/rota.toml")).unwrap_err();
        assert!(err.to_string().contains("/no/such/rota.toml"));
    }
}
