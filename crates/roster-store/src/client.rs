//! HTTP connection management for the REST union store.

use std::time::Duration;

use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;

use roster_core::config::StoreSettings;

/// Errors from union store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Union store connection error: {0}")]
    Connection(String),

    #[error("Union store request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Union store returned {status} for {method} {path}: {body}")]
    Status {
        method: String,
        path: String,
        status: u16,
        body: String,
    },

    #[error("Not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Configuration for connecting to the union store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::from(&StoreSettings::default())
    }
}

impl From<&StoreSettings> for StoreConfig {
    fn from(settings: &StoreSettings) -> Self {
        Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }
}

/// REST client for the union store.
///
/// Clone is cheap (inner Arc).
#[derive(Clone)]
pub struct HttpUnionStore {
    http: Client,
    base_url: String,
}

impl HttpUnionStore {
    pub fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        tracing::info!(base_url = %config.base_url, "Union store client ready");
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Execute a GET and decode the JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, StoreError> {
        let response = self.execute::<()>(Method::GET, path, None).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| StoreError::Serialization(format!("{path}: {e}")))
    }

    /// Execute a request with a JSON body and decode the JSON response.
    pub(crate) async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, StoreError> {
        let response = self.execute(method, path, Some(body)).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| StoreError::Serialization(format!("{path}: {e}")))
    }

    /// Execute a request whose response body is ignored.
    pub(crate) async fn send<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<(), StoreError> {
        self.execute(method, path, body).await?;
        Ok(())
    }

    async fn execute<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<reqwest::Response, StoreError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method.clone(), &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(%method, path, status = status.as_u16(), "Union store request failed");
            return Err(StoreError::Status {
                method: method.to_string(),
                path: path.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}
