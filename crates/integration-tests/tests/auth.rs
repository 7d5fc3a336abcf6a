mod harness;

use harness::config::ConfigBuilder;
use harness::server::{TestServer, envelope};
use rota_auth::TokenVerifier;
use secrecy::SecretString;

#[tokio::test]
async fn missing_token_is_token_missing() {
    let server = TestServer::start(ConfigBuilder::new().build()).await.unwrap();

    let resp = server.client().get(server.url("/api/v1/staffs")).send().await.unwrap();
    let request_id = resp.headers()["x-request-id"].to_str().unwrap().to_owned();
    let (status, body) = envelope(resp).await;

    assert_eq!(status, 401);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"]["code"], "A0002");
    assert_eq!(body["requestId"], request_id.as_str());
    assert!(body["traceId"].as_str().unwrap().starts_with("rota.traceId."));
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn foreign_signature_is_token_invalid() {
    let server = TestServer::start(ConfigBuilder::new().build()).await.unwrap();
    let forged = TokenVerifier::new(&SecretString::from("another-secret".to_owned()))
        .issue("mallory", chrono::Duration::minutes(5))
        .unwrap();

    let resp = server
        .client()
        .get(server.url("/api/v1/staffs"))
        .bearer_auth(forged)
        .send()
        .await
        .unwrap();
    let (status, body) = envelope(resp).await;

    assert_eq!(status, 401);
    assert_eq!(body["message"]["code"], "A0004");
}

#[tokio::test]
async fn expired_token_is_token_expired() {
    let server = TestServer::start(ConfigBuilder::new().build()).await.unwrap();
    let expired = TokenVerifier::new(&SecretString::from(harness::config::SECRET.to_owned()))
        .issue("u1", chrono::Duration::hours(-2))
        .unwrap();

    let resp = server
        .client()
        .get(server.url("/api/v1/staffs"))
        .bearer_auth(expired)
        .send()
        .await
        .unwrap();
    let (status, body) = envelope(resp).await;

    assert_eq!(status, 401);
    assert_eq!(body["message"]["code"], "A0003");
}

#[tokio::test]
async fn public_paths_skip_verification() {
    let config = ConfigBuilder::new().with_public_paths(&["/api/v1/share-links/"]).build();
    let server = TestServer::start(config).await.unwrap();

    let resp = server
        .client()
        .get(server.url("/api/v1/share-links/does-not-exist"))
        .send()
        .await
        .unwrap();
    let (status, body) = envelope(resp).await;

    assert_eq!(status, 404);
    assert_eq!(body["message"]["code"], "S0006");
}

#[tokio::test]
async fn public_path_still_needs_a_caller_to_write() {
    let config = ConfigBuilder::new().with_public_paths(&["/api/v1/share-links"]).build();
    let server = TestServer::start(config).await.unwrap();

    let resp = server
        .client()
        .post(server.url("/api/v1/share-links"))
        .json(&serde_json::json!({ "permission": "write" }))
        .send()
        .await
        .unwrap();
    let (status, body) = envelope(resp).await;

    assert_eq!(status, 401);
    assert_eq!(body["message"]["code"], "A0002");
}

#[tokio::test]
async fn public_paths_match_whole_segments() {
    let config = ConfigBuilder::new().with_public_paths(&["/api/v1/share"]).build();
    let server = TestServer::start(config).await.unwrap();

    let resp = server
        .client()
        .get(server.url("/api/v1/share-links/does-not-exist"))
        .send()
        .await
        .unwrap();
    let (status, body) = envelope(resp).await;

    assert_eq!(status, 401);
    assert_eq!(body["message"]["code"], "A0002");
}
