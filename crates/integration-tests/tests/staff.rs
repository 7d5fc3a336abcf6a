mod harness;

use harness::config::ConfigBuilder;
use harness::server::{TestServer, envelope};
use reqwest::Method;
use serde_json::json;

async fn create(server: &TestServer, user: &str, name: &str) -> serde_json::Value {
    let resp = server
        .as_user(Method::POST, user, "/staffs")
        .json(&json!({ "name": name, "color": "#1e90ff" }))
        .send()
        .await
        .unwrap();
    let (status, body) = envelope(resp).await;
    assert_eq!(status, 201, "{body}");
    body["data"].clone()
}

#[tokio::test]
async fn create_find_and_list() {
    let server = TestServer::start(ConfigBuilder::new().build()).await.unwrap();
    let created = create(&server, "u1", "ana").await;
    assert_eq!(created["name"], "ana");
    assert_eq!(created["userId"], "u1");

    let resp = server.as_user(Method::GET, "u1", "/staffs/ana").send().await.unwrap();
    let (status, body) = envelope(resp).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"]["code"], "C0000");
    assert_eq!(body["data"]["id"], created["id"]);
    assert!(body.get("traceId").is_none());

    let resp = server.as_user(Method::GET, "u2", "/staffs").send().await.unwrap();
    let (_, body) = envelope(resp).await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn missing_staff_resolves_to_record_not_found() {
    let server = TestServer::start(ConfigBuilder::new().build()).await.unwrap();

    let resp = server.as_user(Method::GET, "u1", "/staffs/nobody").send().await.unwrap();
    let (status, body) = envelope(resp).await;

    assert_eq!(status, 404);
    assert_eq!(body["message"]["code"], "S0006");
    assert_eq!(body["message"]["message"], "Staff name \"nobody\" not found");
}

#[tokio::test]
async fn duplicate_name_conflicts() {
    let server = TestServer::start(ConfigBuilder::new().build()).await.unwrap();
    create(&server, "u1", "ana").await;

    let resp = server
        .as_user(Method::POST, "u1", "/staffs")
        .json(&json!({ "name": "ana", "color": "#000" }))
        .send()
        .await
        .unwrap();
    let (status, body) = envelope(resp).await;

    assert_eq!(status, 409);
    assert_eq!(body["message"]["code"], "S0007");
}

#[tokio::test]
async fn update_by_id() {
    let server = TestServer::start(ConfigBuilder::new().build()).await.unwrap();
    let ana = create(&server, "u1", "ana").await;
    let id = ana["id"].as_str().unwrap();

    let resp = server
        .as_user(Method::PUT, "u1", &format!("/staffs/{id}"))
        .json(&json!({ "name": "ana", "color": "#ff0000", "email": "ana@example.com" }))
        .send()
        .await
        .unwrap();
    let (status, body) = envelope(resp).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["color"], "#ff0000");

    let resp = server
        .as_user(Method::PUT, "u1", "/staffs/unknown-id")
        .json(&json!({ "name": "x", "color": "#ff0000" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn malformed_body_is_invalid_form() {
    let server = TestServer::start(ConfigBuilder::new().build()).await.unwrap();

    let resp = server
        .as_user(Method::POST, "u1", "/staffs")
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    let (status, body) = envelope(resp).await;

    assert_eq!(status, 400);
    assert_eq!(body["message"]["code"], "V0002");
}

#[tokio::test]
async fn delete_removes_appointments_too() {
    let server = TestServer::start(ConfigBuilder::new().build()).await.unwrap();
    create(&server, "u1", "ana").await;

    let resp = server
        .as_user(Method::POST, "u1", "/appointments")
        .json(&json!({ "appointments": [
            { "staffName": "ana", "weekViewId": "w1", "startDate": "2024-01-01T09:00:00Z", "endDate": "2024-01-01T10:00:00Z" },
            { "staffName": "ana", "weekViewId": "w2", "startDate": "2024-01-08T09:00:00Z", "endDate": "2024-01-08T10:00:00Z" }
        ]}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    let resp = server.as_user(Method::DELETE, "u1", "/staffs/ana").send().await.unwrap();
    let (status, body) = envelope(resp).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["appointmentsRemoved"], 2);

    let resp = server.as_user(Method::GET, "u1", "/appointments").send().await.unwrap();
    let (_, body) = envelope(resp).await;
    assert_eq!(body["data"], json!([]));

    let resp = server.as_user(Method::DELETE, "u1", "/staffs/ana").send().await.unwrap();
    assert_eq!(resp.status(), 404);
}
