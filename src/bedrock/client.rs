//! Bedrock runtime client
//!
//! [`ModelTransport`] is the network seam: it posts a wire body for a model ID
//! and hands back the raw JSON response. [`BackendAdapter`] sits on top of it,
//! serializing prompts per model family, bounding each call with a timeout, and
//! parsing the family's response.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde_json::Value;

use crate::bedrock::family::ModelFamily;
use crate::bedrock::types::GenerationParams;
use crate::config::{BearerToken, Config, ModelIds};
use crate::error::{DispatchError, Result};

/// Sends a request body to a model and returns the raw response body.
///
/// Implementations must report every transport fault as
/// [`DispatchError::BackendUnavailable`].
#[async_trait]
pub trait ModelTransport: Send + Sync {
    async fn invoke_model(&self, model_id: &str, body: &Value) -> std::result::Result<Value, DispatchError>;
}

/// HTTP transport for the Bedrock runtime `InvokeModel` API
pub struct BedrockClient {
    /// HTTP client
    http_client: reqwest::Client,

    /// Runtime endpoint, e.g. `https://bedrock-runtime.us-east-1.amazonaws.com`
    endpoint_url: String,

    /// Optional Bedrock API key
    bearer_token: Option<BearerToken>,
}

impl BedrockClient {
    /// Create a new Bedrock client
    pub fn new(config: &Config) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http_client,
            endpoint_url: config.endpoint_url.trim_end_matches('/').to_string(),
            bearer_token: config.bearer_token.clone(),
        })
    }

    /// `InvokeModel` URL for a model
    fn invoke_url(&self, model_id: &str) -> String {
        format!(
            "{}/model/{}/invoke",
            self.endpoint_url,
            urlencoding::encode(model_id)
        )
    }
}

#[async_trait]
impl ModelTransport for BedrockClient {
    async fn invoke_model(&self, model_id: &str, body: &Value) -> std::result::Result<Value, DispatchError> {
        let mut request = self
            .http_client
            .post(self.invoke_url(model_id))
            .header(ACCEPT, "application/json")
            .json(body);

        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token.expose());
        }

        let response = request.send().await.map_err(|e| {
            let message = if e.is_timeout() {
                format!("request to {} timed out", model_id)
            } else {
                format!("request to {} failed: {}", model_id, e)
            };
            DispatchError::BackendUnavailable { message }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(DispatchError::BackendUnavailable {
                message: format!("{} returned {}: {}", model_id, status, text),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| DispatchError::BackendUnavailable {
                message: format!("malformed response body from {}: {}", model_id, e),
            })
    }
}

/// Turns prompts into generated text for any model family
pub struct BackendAdapter {
    transport: Arc<dyn ModelTransport>,
    models: ModelIds,
    params: GenerationParams,
    timeout: Duration,
}

impl BackendAdapter {
    /// Create an adapter using the models, generation options and timeout from `config`
    pub fn new(transport: Arc<dyn ModelTransport>, config: &Config) -> Self {
        Self::with_settings(
            transport,
            config.models.clone(),
            config.generation,
            config.request_timeout,
        )
    }

    pub fn with_settings(
        transport: Arc<dyn ModelTransport>,
        models: ModelIds,
        params: GenerationParams,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            models,
            params,
            timeout,
        }
    }

    /// Generate text for `prompt` with the model configured for `family`
    pub async fn generate(&self, family: ModelFamily, prompt: &str) -> std::result::Result<String, DispatchError> {
        let model_id = self.models.for_family(family);
        let body = family.serialize(prompt, &self.params);

        tracing::debug!(family = %family, model_id, "Invoking model");

        let response = tokio::time::timeout(self.timeout, self.transport.invoke_model(model_id, &body))
            .await
            .map_err(|_| DispatchError::BackendUnavailable {
                message: format!("{} did not respond within {:?}", model_id, self.timeout),
            })??;

        family.deserialize(response)
    }
}
