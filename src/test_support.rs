use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use crate::api::ConfigClient;

/// Backend that keeps the last posted config in memory and serves it back.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    stored: Arc<Mutex<Value>>,
    content_type: Arc<Mutex<Option<String>>>,
}

impl MemoryBackend {
    pub fn with(initial: Value) -> Self {
        MemoryBackend {
            stored: Arc::new(Mutex::new(initial)),
            content_type: Arc::default(),
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/config", get(get_config).post(post_config))
            .with_state(self.clone())
    }

    pub fn stored(&self) -> Value {
        self.stored.lock().unwrap().clone()
    }

    pub fn last_content_type(&self) -> Option<String> {
        self.content_type.lock().unwrap().clone()
    }
}

async fn get_config(State(backend): State<MemoryBackend>) -> Json<Value> {
    Json(backend.stored())
}

async fn post_config(
    State(backend): State<MemoryBackend>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, Json<Value>) {
    *backend.content_type.lock().unwrap() = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    match serde_json::from_str::<Value>(&body) {
        Ok(config) => {
            *backend.stored.lock().unwrap() = config;
            (StatusCode::OK, Json(json!({ "status": "success" })))
        }
        Err(_) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "status": "error", "message": "Invalid JSON" })),
        ),
    }
}

/// Backend that answers every GET and POST with a canned status and body.
pub fn fixed_backend(
    get_status: StatusCode,
    get_body: &str,
    post_status: StatusCode,
    post_body: &str,
) -> Router {
    let get_body = get_body.to_string();
    let post_body = post_body.to_string();

    Router::new().route(
        "/api/config",
        get(move || {
            let body = get_body.clone();
            async move { (get_status, body) }
        })
        .post(move || {
            let body = post_body.clone();
            async move { (post_status, body) }
        }),
    )
}

/// Backend whose GET and POST each answer successfully after their own delay.
pub fn delayed_backend(get_delay: Duration, post_delay: Duration, config: Value) -> Router {
    Router::new().route(
        "/api/config",
        get(move || {
            let config = config.clone();
            async move {
                tokio::time::sleep(get_delay).await;
                Json(config)
            }
        })
        .post(move || async move {
            tokio::time::sleep(post_delay).await;
            Json(json!({ "status": "success" }))
        }),
    )
}

/// Serves `router` on an ephemeral localhost port and returns its base URL.
pub async fn spawn_backend(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Client for a backend started by [`spawn_backend`], ignoring proxy settings
/// from the environment.
pub fn local_client(server: &str) -> ConfigClient {
    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    ConfigClient::with_http(http, server, "/api")
}
