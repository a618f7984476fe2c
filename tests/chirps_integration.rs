mod common;

use common::{spawn_app, POLKA_KEY};
use serde_json::{json, Value};

async fn post_chirp(app: &common::TestApp, token: &str, body: &str) -> Value {
    let response = app
        .client
        .post(app.url("/api/chirps"))
        .bearer_auth(token)
        .json(&json!({ "body": body }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(201, response.status().as_u16());
    response.json().await.unwrap()
}

// --- Chirp Tests ---

#[tokio::test]
async fn create_chirp_is_owned_by_caller() {
    let app = spawn_app().await;
    let (user_id, token, _) = app.signed_in_user("a@x.com").await;

    let chirp = post_chirp(&app, &token, "I had something interesting for breakfast").await;

    assert_eq!(chirp["user_id"], user_id.as_str());
    assert_eq!(chirp["body"], "I had something interesting for breakfast");
}

#[tokio::test]
async fn create_chirp_requires_access_token() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/api/chirps"))
        .json(&json!({ "body": "anonymous" }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn create_chirp_rejects_empty_body() {
    let app = spawn_app().await;
    let (_, token, _) = app.signed_in_user("a@x.com").await;

    let response = app
        .client
        .post(app.url("/api/chirps"))
        .bearer_auth(&token)
        .json(&json!({ "body": "   " }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn list_chirps_filters_and_sorts() {
    let app = spawn_app().await;
    let (alice_id, alice, _) = app.signed_in_user("alice@x.com").await;
    let (_, bob, _) = app.signed_in_user("bob@x.com").await;
    post_chirp(&app, &alice, "first").await;
    post_chirp(&app, &bob, "second").await;
    post_chirp(&app, &alice, "third").await;

    let all: Vec<Value> = app
        .client
        .get(app.url("/api/chirps"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(all.len(), 3);

    let mine: Vec<Value> = app
        .client
        .get(app.url(&format!("/api/chirps?author_id={}", alice_id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|c| c["user_id"] == alice_id.as_str()));

    let desc: Vec<Value> = app
        .client
        .get(app.url("/api/chirps?sort=desc"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let first = desc.first().unwrap()["created_at"].as_str().unwrap().to_string();
    let last = desc.last().unwrap()["created_at"].as_str().unwrap().to_string();
    let first = chrono::DateTime::parse_from_rfc3339(&first).unwrap();
    let last = chrono::DateTime::parse_from_rfc3339(&last).unwrap();
    assert!(first >= last);
}

#[tokio::test]
async fn list_chirps_rejects_malformed_author() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(app.url("/api/chirps?author_id=not-a-uuid"))
        .send()
        .await
        .unwrap();

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn get_chirp_returns_404_when_missing() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(app.url(&format!("/api/chirps/{}", uuid::Uuid::new_v4())))
        .send()
        .await
        .unwrap();

    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn delete_chirp_by_owner() {
    let app = spawn_app().await;
    let (_, token, _) = app.signed_in_user("a@x.com").await;
    let chirp = post_chirp(&app, &token, "short lived").await;
    let url = app.url(&format!("/api/chirps/{}", chirp["id"].as_str().unwrap()));

    let response = app.client.delete(&url).bearer_auth(&token).send().await.unwrap();
    assert_eq!(204, response.status().as_u16());

    let response = app.client.get(&url).send().await.unwrap();
    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn delete_chirp_by_other_user_is_forbidden_not_hidden() {
    let app = spawn_app().await;
    let (_, owner, _) = app.signed_in_user("owner@x.com").await;
    let (_, intruder, _) = app.signed_in_user("intruder@x.com").await;
    let chirp = post_chirp(&app, &owner, "mine").await;
    let url = app.url(&format!("/api/chirps/{}", chirp["id"].as_str().unwrap()));

    let response = app.client.delete(&url).bearer_auth(&intruder).send().await.unwrap();
    assert_eq!(403, response.status().as_u16());

    // Still there
    let response = app.client.get(&url).send().await.unwrap();
    assert_eq!(200, response.status().as_u16());
}

#[tokio::test]
async fn delete_missing_chirp_is_404() {
    let app = spawn_app().await;
    let (_, token, _) = app.signed_in_user("a@x.com").await;

    let response = app
        .client
        .delete(app.url(&format!("/api/chirps/{}", uuid::Uuid::new_v4())))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(404, response.status().as_u16());
}

// --- Webhook Tests ---

async fn send_webhook(app: &common::TestApp, key: Option<&str>, body: Value) -> u16 {
    let mut request = app.client.post(app.url("/api/polka/webhooks")).json(&body);
    if let Some(key) = key {
        request = request.header("Authorization", format!("ApiKey {}", key));
    }
    request.send().await.expect("Failed to execute request.").status().as_u16()
}

#[tokio::test]
async fn webhook_upgrades_user() {
    let app = spawn_app().await;
    let (user_id, _, _) = app.signed_in_user("a@x.com").await;

    let status = send_webhook(
        &app,
        Some(POLKA_KEY),
        json!({ "event": "user.upgraded", "data": { "user_id": user_id } }),
    )
    .await;
    assert_eq!(204, status);

    let body = app.login("a@x.com", "04234").await;
    assert_eq!(body["is_chirpy_red"], true);
}

#[tokio::test]
async fn webhook_rejects_wrong_or_missing_key() {
    let app = spawn_app().await;
    let (user_id, _, _) = app.signed_in_user("a@x.com").await;
    let body = json!({ "event": "user.upgraded", "data": { "user_id": user_id } });

    assert_eq!(401, send_webhook(&app, None, body.clone()).await);
    assert_eq!(401, send_webhook(&app, Some("wrong-key"), body).await);

    let login = app.login("a@x.com", "04234").await;
    assert_eq!(login["is_chirpy_red"], false);
}

#[tokio::test]
async fn webhook_ignores_other_events() {
    let app = spawn_app().await;
    let (user_id, _, _) = app.signed_in_user("a@x.com").await;

    let status = send_webhook(
        &app,
        Some(POLKA_KEY),
        json!({ "event": "user.payment_failed", "data": { "user_id": user_id } }),
    )
    .await;
    assert_eq!(204, status);

    let login = app.login("a@x.com", "04234").await;
    assert_eq!(login["is_chirpy_red"], false);
}

#[tokio::test]
async fn webhook_unknown_user_is_404() {
    let app = spawn_app().await;

    let status = send_webhook(
        &app,
        Some(POLKA_KEY),
        json!({ "event": "user.upgraded", "data": { "user_id": uuid::Uuid::new_v4() } }),
    )
    .await;

    assert_eq!(404, status);
}
