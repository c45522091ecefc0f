//! HTTP implementation of [`RangeBackend`]

use crate::backend::RangeBackend;
use crate::config::ClientConfig;
use crate::error::BackendError;
use async_trait::async_trait;
use range_topology::{DeleteResponse, DeploymentRequest, DeploymentResponse};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Range backend reached over its JSON API
#[derive(Debug, Clone)]
pub struct HttpRangeBackend {
    client: Client,
    config: ClientConfig,
}

impl HttpRangeBackend {
    /// Build a client for `config`
    ///
    /// # Errors
    /// - `BackendError::Transport` if the HTTP client cannot be built
    pub fn new(config: ClientConfig) -> Result<Self, BackendError> {
        let client = Client::builder().timeout(config.request_timeout()).build()?;
        Ok(Self { client, config })
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

#[async_trait]
impl RangeBackend for HttpRangeBackend {
    async fn list_ranges(&self) -> Result<Vec<Value>, BackendError> {
        let url = self.config.endpoint("/ranges");
        tracing::debug!(%url, "fetching ranges");
        let response = self.client.get(&url).send().await.map_err(BackendError::from_send)?;
        decode(response).await
    }

    async fn deploy(&self, request: &DeploymentRequest) -> Result<DeploymentResponse, BackendError> {
        let url = self.config.endpoint("/range");
        tracing::debug!(%url, nodes = request.nodes.len(), links = request.links.len(), "posting range");
        let response = self.client.post(&url).json(request).send().await.map_err(BackendError::from_send)?;
        decode(response).await
    }

    async fn delete_range(&self, range_id: &str) -> Result<DeleteResponse, BackendError> {
        let url = self.config.endpoint(&format!("/range/{range_id}"));
        tracing::debug!(%url, "deleting range");
        let response = self.client.delete(&url).send().await.map_err(BackendError::from_send)?;
        decode(response).await
    }
}

/// Decode a success body, or turn an error status into `BackendError::Status`
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        let detail = error_detail(&body);
        return Err(BackendError::status(status.as_u16(), detail));
    }

    serde_json::from_slice(&body).map_err(BackendError::Decode)
}

/// The `detail` member of an error body, or the raw body
fn error_detail(body: &[u8]) -> String {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => match map.get("detail") {
            Some(Value::String(detail)) => detail.clone(),
            Some(other) => other.to_string(),
            None => Value::Object(map).to_string(),
        },
        _ => String::from_utf8_lossy(body).into_owned(),
    }
}
