use reqwest::{Client, Response};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::config::AppConfig;

#[derive(Debug, Error)]
pub enum ApiError {
    /// No response was obtained.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {code}: {reason}")]
    Http { code: u16, reason: String },

    /// The body was not the JSON we expected.
    #[error("{0}")]
    Decode(String),

    /// The backend answered but refused the update.
    #[error("{0}")]
    Rejected(String),
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct ConfigClient {
    http: Client,
    endpoint: String,
}

impl ConfigClient {
    pub fn new(server: &str, api_base: &str) -> Self {
        Self::with_http(Client::new(), server, api_base)
    }

    pub fn with_http(http: Client, server: &str, api_base: &str) -> Self {
        let endpoint = format!(
            "{}{}/config",
            server.trim_end_matches('/'),
            api_base.trim_end_matches('/')
        );

        ConfigClient { http, endpoint }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn fetch(&self) -> Result<AppConfig, ApiError> {
        debug!(url = %self.endpoint, "GET config");
        let response = self.http.get(&self.endpoint).send().await?;
        let body = read_success(response).await?;

        let value: Value = serde_json::from_str(&body)?;
        AppConfig::from_json(&value)
            .ok_or_else(|| ApiError::Decode("expected a JSON object".to_string()))
    }

    pub async fn store(&self, config: &AppConfig) -> Result<(), ApiError> {
        debug!(url = %self.endpoint, "POST config");
        // .json() sets Content-Type: application/json
        let response = self.http.post(&self.endpoint).json(config).send().await?;
        let body = read_success(response).await?;

        let reply: Value = serde_json::from_str(&body)?;
        if reply.get("status").and_then(Value::as_str) == Some("success") {
            return Ok(());
        }

        // Any other status is a refusal, whatever its JSON type
        let message = match reply.get("message") {
            Some(Value::String(m)) if !m.is_empty() => m.clone(),
            Some(Value::String(_)) | Some(Value::Null) | None => "Unknown error".to_string(),
            Some(other) => other.to_string(),
        };
        Err(ApiError::Rejected(message))
    }
}

async fn read_success(response: Response) -> Result<String, ApiError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::Http {
            code: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
        });
    }
    Ok(response.text().await?)
}
