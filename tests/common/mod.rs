//! Common test utilities for E2E tests

use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    routing::{delete, post},
};
use clipnest::{AppState, config};
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Recorded traffic of the fake media host
#[derive(Debug, Default)]
pub struct MediaHostLog {
    pub uploads: Vec<String>,
    pub deletes: Vec<String>,
}

/// In-process stand-in for the remote media host API.
///
/// Accepts the same `/v1/assets` surface the real provider exposes and
/// records every upload and delete for assertions.
pub struct FakeMediaHost {
    pub base_url: String,
    log: Arc<Mutex<MediaHostLog>>,
}

#[derive(Clone)]
struct FakeMediaHostState {
    log: Arc<Mutex<MediaHostLog>>,
    counter: Arc<Mutex<u64>>,
    base_url: String,
}

impl FakeMediaHost {
    pub async fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let log = Arc::new(Mutex::new(MediaHostLog::default()));
        let state = FakeMediaHostState {
            log: log.clone(),
            counter: Arc::new(Mutex::new(0u64)),
            base_url: base_url.clone(),
        };

        let app = Router::new()
            .route("/v1/assets", post(upload_asset))
            .route("/v1/assets/:id", delete(delete_asset))
            .with_state(state);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, log }
    }

    pub fn upload_count(&self) -> usize {
        self.log.lock().unwrap().uploads.len()
    }

    pub fn deleted_ids(&self) -> Vec<String> {
        self.log.lock().unwrap().deletes.clone()
    }
}

async fn upload_asset(
    State(state): State<FakeMediaHostState>,
    mut multipart: Multipart,
) -> Json<serde_json::Value> {
    let mut kind = "image".to_string();
    while let Some(field) = multipart.next_field().await.unwrap() {
        match field.name().unwrap_or("") {
            "kind" => kind = field.text().await.unwrap(),
            // Drain the file body
            _ => {
                let _ = field.bytes().await.unwrap();
            }
        }
    }

    let asset_id = {
        let mut counter = state.counter.lock().unwrap();
        *counter += 1;
        format!("asset{:04}", *counter)
    };
    state.log.lock().unwrap().uploads.push(asset_id.clone());

    let extension = if kind == "video" { "mp4" } else { "webp" };
    let duration = (kind == "video").then_some(123.5);

    Json(serde_json::json!({
        "asset_id": asset_id,
        "url": format!("{}/assets/{}.{}", state.base_url, asset_id, extension),
        "duration": duration,
    }))
}

async fn delete_asset(
    State(state): State<FakeMediaHostState>,
    Path(asset_id): Path<String>,
) -> Json<serde_json::Value> {
    state.log.lock().unwrap().deletes.push(asset_id);
    Json(serde_json::json!({ "deleted": true }))
}

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub media: FakeMediaHost,
    pub _temp_dir: TempDir,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Create a new test server instance backed by a temp database and
    /// the fake media host.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let media = FakeMediaHost::spawn().await;

        let config = config::AppConfig {
            server: config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                domain: "localhost".to_string(),
                protocol: "http".to_string(),
            },
            database: config::DatabaseConfig {
                path: db_path.clone(),
            },
            media_host: config::MediaHostConfig {
                base_url: media.base_url.clone(),
                api_key: "test-key".to_string(),
                api_secret: "test-secret".to_string(),
                timeout_seconds: 10,
            },
            auth: config::AuthConfig {
                access_token_secret: "test-access-secret-32-bytes-long".to_string(),
                access_token_max_age: 900,
                refresh_token_secret: "test-refresh-secret-32-bytes-ok!".to_string(),
                refresh_token_max_age: 864_000,
            },
            logging: config::LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        };

        let state = AppState::new(config.clone()).await.unwrap();

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        let app = clipnest::build_router(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait a bit for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Self {
            addr: addr_str,
            state,
            media,
            _temp_dir: temp_dir,
            client,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// Multipart registration form with an avatar part
    pub fn registration_form(username: &str, email: &str) -> reqwest::multipart::Form {
        reqwest::multipart::Form::new()
            .text("username", username.to_string())
            .text("email", email.to_string())
            .text("fullname", format!("{} Fullname", username))
            .text("password", "hunter2 is not enough".to_string())
            .part(
                "avatar",
                reqwest::multipart::Part::bytes(vec![0u8; 64])
                    .file_name("avatar.png")
                    .mime_str("image/png")
                    .unwrap(),
            )
    }

    /// Register a user; returns the response
    pub async fn register(&self, username: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/v1/users/register"))
            .multipart(Self::registration_form(
                username,
                &format!("{}@example.com", username),
            ))
            .send()
            .await
            .unwrap()
    }

    /// Login; returns the parsed response body
    pub async fn login(&self, username: &str, password: &str) -> serde_json::Value {
        let response = self
            .client
            .post(self.url("/api/v1/users/login"))
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200, "login should succeed");
        response.json().await.unwrap()
    }

    /// Register a user and return their access token
    pub async fn register_and_login(&self, username: &str) -> String {
        let response = self.register(username).await;
        assert_eq!(response.status(), 201, "registration should succeed");

        let body = self.login(username, "hunter2 is not enough").await;
        body["data"]["accessToken"].as_str().unwrap().to_string()
    }

    /// Publish a video as the given user; returns the parsed body
    pub async fn publish_video(
        &self,
        token: &str,
        title: &str,
        tags: &str,
    ) -> serde_json::Value {
        let form = reqwest::multipart::Form::new()
            .text("title", title.to_string())
            .text("description", format!("{} description", title))
            .text("tags", tags.to_string())
            .part(
                "videoFile",
                reqwest::multipart::Part::bytes(vec![1u8; 256])
                    .file_name("clip.mp4")
                    .mime_str("video/mp4")
                    .unwrap(),
            )
            .part(
                "thumbnail",
                reqwest::multipart::Part::bytes(vec![2u8; 64])
                    .file_name("thumb.png")
                    .mime_str("image/png")
                    .unwrap(),
            );

        let response = self
            .client
            .post(self.url("/api/v1/videos"))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 201, "publish should succeed");
        response.json().await.unwrap()
    }

    /// GET with bearer auth, parsed
    pub async fn get_json(&self, path: &str, token: Option<&str>) -> (u16, serde_json::Value) {
        let mut request = self.client.get(self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.unwrap();
        let status = response.status().as_u16();
        let body = response.json().await.unwrap_or(serde_json::json!(null));
        (status, body)
    }

    /// POST a JSON body with optional bearer auth, parsed
    pub async fn post_json(
        &self,
        path: &str,
        token: Option<&str>,
        body: serde_json::Value,
    ) -> (u16, serde_json::Value) {
        let mut request = self.client.post(self.url(path)).json(&body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.unwrap();
        let status = response.status().as_u16();
        let body = response.json().await.unwrap_or(serde_json::json!(null));
        (status, body)
    }
}
