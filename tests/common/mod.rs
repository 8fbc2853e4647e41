#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{Client, Method, StatusCode};
use serde_json::{json, Value};

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Cargo builds the binary for integration tests and tells us where it is
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_formspace"));
        cmd.args(["serve", "--port", &port.to_string()])
            .env("APP_ENV", "development")
            .env("STORE_BACKEND", "memory")
            .env("JWT_SECRET", "integration-test-secret")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = Client::new();
        let deadline = Instant::now() + timeout;
        let url = format!("{}/health", self.base_url);
        while Instant::now() < deadline {
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(15)).await?;
    Ok(server)
}

/// Thin JSON client bound to the test server, optionally carrying a bearer token
#[derive(Clone)]
pub struct Api {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl Api {
    pub async fn anonymous() -> Result<Self> {
        let server = ensure_server().await?;
        Ok(Self {
            client: Client::new(),
            base_url: server.base_url.clone(),
            token: None,
        })
    }

    /// Sign up a fresh account and log it in. Returns the client and the user object.
    pub async fn user(name: &str) -> Result<(Self, Value)> {
        let anon = Self::anonymous().await?;
        let email = format!("{}-{}@example.com", name, uuid::Uuid::new_v4().simple());

        let (status, _) = anon
            .post("/auth/signup", json!({"username": name, "email": email, "password": "secret1"}))
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "signup failed: {}", status);

        let (status, body) = anon
            .post("/auth/login", json!({"email": email, "password": "secret1"}))
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "login failed: {}", status);

        let token = body["data"]["token"].as_str().context("missing token")?.to_string();
        let user = body["data"]["user"].clone();
        Ok((Self { token: Some(token), ..anon }, user))
    }

    pub async fn request(&self, method: Method, path: &str, body: Option<Value>) -> Result<(StatusCode, Value)> {
        let mut req = self.client.request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
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

    pub async fn get(&self, path: &str) -> Result<(StatusCode, Value)> {
        self.request(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::PUT, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<(StatusCode, Value)> {
        self.request(Method::DELETE, path, None).await
    }
}

pub fn workspace_id(user: &Value) -> String {
    user["workspace_id"].as_str().unwrap_or_default().to_string()
}

pub fn id_of(body: &Value) -> String {
    body["data"]["id"].as_str().unwrap_or_default().to_string()
}
