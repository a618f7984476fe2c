#![allow(dead_code)]

use std::net::TcpListener;

use chirpy::configuration::{ApplicationSettings, AuthSettings, DatabaseSettings, Settings};
use chirpy::startup::{run, AppContext};
use chirpy::store::InMemoryStore;
use serde_json::{json, Value};

pub const JWT_SECRET: &str = "integration-test-secret";
pub const POLKA_KEY: &str = "f271c81ff7084ee5b99a5091b42d486e";

pub struct TestApp {
    pub address: String,
    pub store: InMemoryStore,
    pub client: reqwest::Client,
}

pub fn test_settings(platform: &str) -> Settings {
    Settings {
        database: DatabaseSettings {
            username: "postgres".to_string(),
            password: "password".to_string(),
            port: 5432,
            host: "localhost".to_string(),
            database_name: "unused".to_string(),
        },
        application: ApplicationSettings {
            port: 0,
            platform: platform.to_string(),
        },
        auth: AuthSettings {
            jwt_secret: JWT_SECRET.to_string(),
            polka_key: POLKA_KEY.to_string(),
            password_hash_cost: 4,
        },
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_on("dev").await
}

pub async fn spawn_app_on(platform: &str) -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let store = InMemoryStore::new();
    let context = AppContext::build(&test_settings(platform), store.clone())
        .expect("Failed to build application context");
    let server = run(listener, context).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        store,
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn register(&self, email: &str, password: &str) -> Value {
        let response = self
            .client
            .post(self.url("/api/users"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request.");
        assert_eq!(201, response.status().as_u16());
        response.json().await.expect("Failed to parse response")
    }

    pub async fn login(&self, email: &str, password: &str) -> Value {
        let response = self
            .client
            .post(self.url("/api/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request.");
        assert_eq!(200, response.status().as_u16());
        response.json().await.expect("Failed to parse response")
    }

    /// Register and log in, returning (user id, access token, refresh token)
    pub async fn signed_in_user(&self, email: &str) -> (String, String, String) {
        self.register(email, "04234").await;
        let body = self.login(email, "04234").await;
        (
            body["id"].as_str().unwrap().to_string(),
            body["token"].as_str().unwrap().to_string(),
            body["refresh_token"].as_str().unwrap().to_string(),
        )
    }
}
