mod harness;

use harness::config::ConfigBuilder;
use harness::server::{TestServer, envelope};
use serde_json::{Value, json};

fn registration(email: &str) -> Value {
    json!({
        "firstName": "Ana",
        "lastName": "Lima",
        "email": email,
        "password": "correct horse",
        "color": "#1e90ff",
        "phoneNumber": "+5511987654321"
    })
}

async fn post(server: &TestServer, path: &str, payload: &Value) -> (u16, Value) {
    let resp = server
        .client()
        .post(server.url(&format!("/api/v1{path}")))
        .json(payload)
        .send()
        .await
        .unwrap();
    envelope(resp).await
}

#[tokio::test]
async fn registration_hides_the_password_hash() {
    let server = TestServer::start(ConfigBuilder::new().build()).await.unwrap();

    let (status, body) = post(&server, "/auth/register", &registration("Ana@Example.com")).await;

    assert_eq!(status, 201);
    assert_eq!(body["data"]["email"], "ana@example.com");
    assert_eq!(body["data"]["phoneNumber"], "+5511987654321");
    assert!(body["data"].get("passwordHash").is_none());
}

#[tokio::test]
async fn second_registration_is_a_conflict() {
    let server = TestServer::start(ConfigBuilder::new().build()).await.unwrap();
    post(&server, "/auth/register", &registration("ana@example.com")).await;

    let (status, body) = post(&server, "/auth/register", &registration("ANA@example.com")).await;

    assert_eq!(status, 409);
    assert_eq!(body["message"]["code"], "A0008");
}

#[tokio::test]
async fn issued_token_reaches_protected_routes() {
    let server = TestServer::start(ConfigBuilder::new().build()).await.unwrap();
    let (_, registered) = post(&server, "/auth/register", &registration("ana@example.com")).await;

    let (status, body) = post(
        &server,
        "/auth/signin",
        &json!({ "email": "ana@example.com", "password": "correct horse" }),
    )
    .await;
    assert_eq!(status, 200);
    let token = body["data"]["accessToken"].as_str().unwrap().to_owned();

    let resp = server
        .client()
        .get(server.url("/api/v1/auth/me"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let (status, me) = envelope(resp).await;
    assert_eq!(status, 200);
    assert_eq!(me["data"]["id"], registered["data"]["id"]);

    let resp = server
        .client()
        .get(server.url("/api/v1/staffs"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(envelope(resp).await.0, 200);
}

#[tokio::test]
async fn sign_in_failures_name_what_was_wrong() {
    let server = TestServer::start(ConfigBuilder::new().build()).await.unwrap();
    post(&server, "/auth/register", &registration("ana@example.com")).await;

    let (status, body) = post(
        &server,
        "/auth/signin",
        &json!({ "email": "bea@example.com", "password": "correct horse" }),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["message"]["code"], "A0005");

    let (status, body) = post(
        &server,
        "/auth/signin",
        &json!({ "email": "ana@example.com", "password": "wrong horse" }),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["message"]["code"], "A0006");
}

#[tokio::test]
async fn token_for_unknown_account_is_invalid_credentials() {
    let server = TestServer::start(ConfigBuilder::new().build()).await.unwrap();

    let resp = server.as_user(reqwest::Method::GET, "nobody", "/auth/me").send().await.unwrap();
    let (status, body) = envelope(resp).await;

    assert_eq!(status, 401);
    assert_eq!(body["message"]["code"], "A0007");
}

#[tokio::test]
async fn registration_rules_are_validation_errors() {
    let server = TestServer::start(ConfigBuilder::new().build()).await.unwrap();
    let mut bad = registration("not-an-email");
    bad["password"] = json!("short");

    let (status, body) = post(&server, "/auth/register", &bad).await;

    assert_eq!(status, 400);
    assert_eq!(body["message"]["code"], "V0001");
    let message = body["message"]["message"].as_str().unwrap();
    assert!(message.contains("email"));
    assert!(message.contains("password"));
}
