//! Test server wrapper that starts rota on a random port

use std::net::SocketAddr;

use reqwest::{RequestBuilder, Response};
use rota_auth::TokenVerifier;
use rota_config::Config;
use rota_server::Server;
use secrecy::SecretString;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use super::config::SECRET;

/// A running test server instance
pub struct TestServer {
    addr: SocketAddr,
    shutdown: CancellationToken,
    client: reqwest::Client,
    tokens: TokenVerifier,
}

impl TestServer {
    /// Start a test server with the given configuration
    ///
    /// Binds to port 0 for automatic port assignment
    pub async fn start(config: Config) -> anyhow::Result<Self> {
        let server = Server::new(config).await?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        // Bind the listener here so we know the actual port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        tokio::spawn(async move {
            axum::serve(listener, server.into_router())
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self {
            addr,
            shutdown,
            client: reqwest::Client::new(),
            tokens: TokenVerifier::new(&SecretString::from(SECRET.to_owned())),
        })
    }

    /// Base URL of the running test server
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Get a reference to the HTTP client
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Access token for `user_id`, valid for five minutes
    pub fn token(&self, user_id: &str) -> String {
        self.tokens
            .issue(user_id, chrono::Duration::minutes(5))
            .expect("token signs")
    }

    /// Request to an API path carrying `user_id`'s token
    pub fn as_user(&self, method: reqwest::Method, user_id: &str, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.url(&format!("/api/v1{path}")))
            .bearer_auth(self.token(user_id))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Status and parsed envelope of a response
pub async fn envelope(response: Response) -> (u16, Value) {
    let status = response.status().as_u16();
    let body = response.json().await.expect("JSON envelope");
    (status, body)
}
