#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use uuid::Uuid;

use study_api::auth::{generate_jwt, Claims};
use study_api::config::AppConfig;
use study_api::services::{MemoryStudyStore, MemoryUserDirectory};
use study_api::AppState;

pub const JWT_SECRET: &str = "integration-test-secret";
pub const PUBLIC_URL: &str = "https://sort.example.com/";
pub const AUTH_LOCATION: &str = "https://sort.example.com/auth/";

pub struct TestUser {
    pub id: Uuid,
    pub username: String,
    pub token: String,
}

impl TestUser {
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// An in-process server on its own port, backed by memory storage
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub store: Arc<MemoryStudyStore>,
    pub alice: TestUser,
    pub bob: TestUser,
    pub client: reqwest::Client,
}

impl TestServer {
    pub fn study_url(&self) -> String {
        format!("{}/study", self.base_url)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = self.client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

async fn register(users: &MemoryUserDirectory, username: &str) -> Result<TestUser> {
    let user = users.add_user(Uuid::new_v4(), username).await;
    let token = generate_jwt(&Claims::new(user.id, 1), JWT_SECRET)?;
    Ok(TestUser {
        id: user.id,
        username: user.username,
        token,
    })
}

pub async fn spawn_server() -> Result<TestServer> {
    // Pick an unused port for isolation
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let base_url = format!("http://127.0.0.1:{}", port);

    let mut config = AppConfig::from_env();
    config.api.public_url = PUBLIC_URL.to_string();
    config.api.enable_request_logging = false;
    config.security.jwt_secret = JWT_SECRET.to_string();

    let store = Arc::new(MemoryStudyStore::new());
    let users = MemoryUserDirectory::new(JWT_SECRET);
    let alice = register(&users, "alice").await?;
    let bob = register(&users, "bob").await?;

    let state = AppState::new(store.clone(), Arc::new(users), config.auth_redirect());
    let app = study_api::app(state, &config);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .with_context(|| format!("failed to bind port {}", port))?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("test server stopped: {}", e);
        }
    });

    let server = TestServer {
        port,
        base_url,
        store,
        alice,
        bob,
        client: reqwest::Client::new(),
    };
    server.wait_ready(Duration::from_secs(5)).await?;
    Ok(server)
}

/// Create a study through the API and return its id
pub async fn create_study(server: &TestServer, user: &TestUser, title: &str) -> Result<String> {
    let res = server
        .client
        .post(server.study_url())
        .header("Authorization", user.bearer())
        .json(&serde_json::json!({
            "title": title,
            "description": "Where would you look for these?",
            "cards": [{"id": 1, "name": "Invoices"}, {"id": 2, "name": "Profile"}],
            "message": "Thanks for taking part"
        }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "create failed: {}", res.status());

    let body = res.json::<serde_json::Value>().await?;
    body["study"]["id"]
        .as_str()
        .map(str::to_owned)
        .context("created study has no id")
}
