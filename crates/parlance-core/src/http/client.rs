//! HTTP client for a running parlance server.
//!
//! Used by the CLI to resolve queries against, inspect, and stop a
//! server without linking the engine into every command path.

use super::types::*;

/// Errors from client requests.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Api { status: u16, message: String },
}

/// Typed client over the server's JSON API.
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// Create a client for the given base URL, e.g. `http://127.0.0.1:8088`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    /// `GET /health`
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        self.get_json("/health", &[]).await
    }

    /// `GET /status`
    pub async fn status(&self) -> Result<StatusResponse, ClientError> {
        self.get_json("/status", &[]).await
    }

    /// `GET /functions`
    pub async fn functions(&self) -> Result<FunctionsResponse, ClientError> {
        self.get_json("/functions", &[]).await
    }

    /// `GET /rules`
    pub async fn rules(&self) -> Result<RulesResponse, ClientError> {
        self.get_json("/rules", &[]).await
    }

    /// `GET /execute?q=…`
    pub async fn execute(&self, query: &str) -> Result<ExecuteResponse, ClientError> {
        self.get_json("/execute", &[("q", query)]).await
    }

    /// `POST /stop`
    pub async fn stop(&self) -> Result<StopResponse, ClientError> {
        let response = self
            .http
            .post(format!("{}/stop", self.base_url))
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ClientError> {
        let response = self
            .http
            .get(format!("{}{path}", self.base_url))
            .query(query)
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let message = match response.json::<ErrorResponse>().await {
            Ok(body) => body.error,
            Err(_) => "unreadable error body".to_string(),
        };
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }
}
