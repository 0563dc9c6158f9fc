#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tokio::net::TcpListener;

use smart_todo_api::auth::{issue_token, Identity, JwtVerifier};
use smart_todo_api::storage::MemoryStore;
use smart_todo_api::{app, AppConfig, AppState};

pub const SECRET: &str = "integration-test-secret";
pub const AUDIENCE: &str = "authenticated";

/// In-process server over a fresh in-memory store
pub struct TestServer {
    pub base_url: String,
    client: reqwest::Client,
}

impl TestServer {
    async fn spawn() -> Result<Self> {
        let mut config = AppConfig::default();
        config.security.jwt_secret = Some(SECRET.to_string());
        config.api.enable_request_logging = false;

        let verifier = JwtVerifier::new(SECRET, Some(AUDIENCE)).context("verifier")?;
        let state = AppState::new(Arc::new(MemoryStore::new()), Arc::new(verifier));
        let router = app(state, &config);

        // Port 0 lets the OS pick a free port for isolation
        let listener = TcpListener::bind("127.0.0.1:0").await.context("failed to bind test listener")?;
        let base_url = format!("http://{}", listener.local_addr()?);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                eprintln!("test server stopped: {}", e);
            }
        });

        Ok(Self {
            base_url,
            client: reqwest::Client::new(),
        })
    }

    /// Bearer token for `user`, signed the way the identity provider would
    pub fn token(&self, user: &str) -> String {
        issue_token(&Identity::new(user), SECRET, Some(AUDIENCE), chrono::Duration::hours(1))
            .unwrap_or_else(|e| panic!("failed to issue test token: {}", e))
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        user: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut req = self.client.request(method, format!("{}{}", self.base_url, path));
        if let Some(user) = user {
            req = req.bearer_auth(self.token(user));
        }
        if let Some(body) = body {
            req = req.json(&body);
        }

        let res = req.send().await?;
        let status = res.status();
        let text = res.text().await?;
        let json = if text.is_empty() { Value::Null } else { serde_json::from_str(&text)? };
        Ok((status, json))
    }

    pub async fn get(&self, path: &str, user: &str) -> Result<(StatusCode, Value)> {
        self.request(Method::GET, path, Some(user), None).await
    }

    pub async fn post(&self, path: &str, user: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::POST, path, Some(user), Some(body)).await
    }

    pub async fn put(&self, path: &str, user: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::PUT, path, Some(user), Some(body)).await
    }

    pub async fn delete(&self, path: &str, user: &str) -> Result<(StatusCode, Value)> {
        self.request(Method::DELETE, path, Some(user), None).await
    }

    /// POST and return the created row's id, failing unless the server answered 201
    pub async fn create(&self, path: &str, user: &str, body: Value) -> Result<i64> {
        let (status, res) = self.post(path, user, body).await?;
        anyhow::ensure!(status == StatusCode::CREATED, "expected 201 from {}, got {}: {}", path, status, res);
        res["data"]["id"].as_i64().context("created row has no id")
    }
}

pub async fn start_server() -> Result<TestServer> {
    TestServer::spawn().await
}
