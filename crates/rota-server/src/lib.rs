//! HTTP surface of the scheduling backend

mod auth;
mod extract;
mod request_context;
mod routes;
mod state;

use std::{net::SocketAddr, num::NonZeroU32};

use anyhow::Context;
use axum::Router;
use rota_auth::{PasswordHasher, TokenVerifier};
use rota_config::Config;
use rota_core::{MessageCatalog, catalog};
use rota_errors::ErrorHandler;
use rota_scheduler::AccountService;
use rota_storage::QueryExecutor;
use tower_http::trace::TraceLayer;

pub use extract::{Caller, PathParams, QueryParams, ValidatedJson};
pub use request_context::REQUEST_ID_HEADER;
pub use routes::ANONYMOUS_USER;
pub use state::AppState;

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
    errors: ErrorHandler,
}

impl Server {
    /// Build the server from configuration
    ///
    /// Installs the message catalog and identifier namespace, opens the
    /// database, and applies the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded or the database
    /// cannot be opened or migrated
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let listen_address = config
            .server
            .listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

        if let Some(path) = &config.errors.catalog_path {
            let loaded = MessageCatalog::load(path)?;
            catalog::install(loaded).with_context(|| format!("cannot use catalog {}", path.display()))?;
        }

        if !rota_core::set_namespace(config.server.namespace.clone()) && rota_core::namespace() != config.server.namespace
        {
            tracing::warn!(
                configured = %config.server.namespace,
                active = rota_core::namespace(),
                "identifier namespace already set"
            );
        }

        let errors = ErrorHandler::new(config.errors.registry_capacity, config.errors.registry_ttl()?);

        let pool = rota_storage::connect(&config.database).await?;
        let db = QueryExecutor::new(pool, errors.clone());

        if config.database.run_migrations {
            rota_storage::migrate(&db).await.context("schema migration failed")?;
        }

        let verifier = TokenVerifier::new(&config.auth.access_token_secret);
        let token_ttl =
            chrono::Duration::from_std(config.auth.token_ttl()?).context("auth.token_ttl is out of range")?;
        let iterations = NonZeroU32::new(config.auth.password_iterations)
            .context("auth.password_iterations must be greater than 0")?;
        let accounts = AccountService::new(&db, verifier.clone(), PasswordHasher::new(iterations), token_ttl);

        let state = AppState::new(&db, accounts, config.auth.enabled);
        let responses = state.responses.clone();

        // Build base router with feature routes
        let mut app = Router::new()
            .nest(&config.server.api_prefix, routes::api_router())
            .fallback(routes::not_found_handler);

        // Health check
        if config.server.health.enabled {
            app = app.route(&config.server.health.path, axum::routing::get(routes::health_handler));
        }

        let mut app = app.with_state(state);

        // Apply middleware layers (innermost first)

        // Bearer token authentication
        if config.auth.enabled {
            let api_prefix = config.server.api_prefix.trim_end_matches('/');
            let mut public_paths = config.auth.public_paths.clone();
            public_paths.push(config.server.health.path.clone());
            public_paths.extend(routes::ACCOUNT_PUBLIC_PATHS.iter().map(|p| format!("{api_prefix}{p}")));

            app = app.layer(axum::middleware::from_fn(move |req, next| {
                let verifier = verifier.clone();
                let public_paths = public_paths.clone();
                let responses = responses.clone();
                async move { auth::auth_middleware(verifier, public_paths, responses, req, next).await }
            }));
        } else {
            tracing::warn!("authentication disabled; all data belongs to `{}`", routes::ANONYMOUS_USER);
        }

        // Request context (outside auth so failures there are released too)
        let registry = errors.clone();
        app = app.layer(axum::middleware::from_fn(move |req, next| {
            let errors = registry.clone();
            async move { request_context::request_context_middleware(errors, req, next).await }
        }));

        // Tracing
        app = app.layer(TraceLayer::new_for_http());

        Ok(Self {
            router: app,
            listen_address,
            errors,
        })
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Registry shared by every component of this server
    #[must_use]
    pub const fn error_handler(&self) -> &ErrorHandler {
        &self.errors
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}
