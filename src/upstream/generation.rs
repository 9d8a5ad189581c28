//! Text generation call against a watsonx.ai deployment.

use std::time::Duration;

use serde_json::Value;

use super::iam::{describe, truncate};
use crate::errors::AppError;
use crate::models::generation::GenerationRequest;
use crate::models::llm::extract_text;
use crate::models::token::TokenInfo;

pub const GENERATION_TIMEOUT: Duration = Duration::from_secs(60);

pub struct GenerationClient {
    client: reqwest::Client,
    base_url: Option<String>,
    model_id: String,
    api_version: String,
}

impl GenerationClient {
    pub fn new(
        base_url: Option<String>,
        model_id: &str,
        api_version: &str,
    ) -> Result<Self, AppError> {
        Self::with_timeout(base_url, model_id, api_version, GENERATION_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: Option<String>,
        model_id: &str,
        api_version: &str,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| {
                AppError::Internal(anyhow::anyhow!("failed to build generation client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.map(|u| u.trim_end_matches('/').to_string()),
            model_id: model_id.to_string(),
            api_version: api_version.to_string(),
        })
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn is_configured(&self) -> bool {
        self.base_url.is_some()
    }

    /// `{base}/v1/generation/{model}/actions?version={version}`
    pub fn endpoint(&self) -> Result<String, AppError> {
        let base = self.base_url.as_deref().ok_or(AppError::MissingBaseUrl)?;
        Ok(format!(
            "{}/v1/generation/{}/actions?version={}",
            base, self.model_id, self.api_version
        ))
    }

    /// One POST, no retries. Unrecognised success bodies come back as
    /// pretty-printed JSON rather than an error.
    pub async fn generate(
        &self,
        token: &TokenInfo,
        request: &GenerationRequest,
    ) -> Result<String, AppError> {
        let url = self.endpoint()?;

        tracing::info!(
            model = %self.model_id,
            max_new_tokens = request.max_tokens,
            temperature = request.temperature,
            prompt_chars = request.prompt.chars().count(),
            "sending generation request"
        );

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&token.access_token)
            .json(&request.payload())
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("generation request failed: {}", e);
                AppError::Generation(describe(&e))
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "generation endpoint returned an error");
            return Err(AppError::Generation(format!(
                "upstream returned {}: {}",
                status,
                truncate(&body, 500)
            )));
        }

        let json: Value = resp.json().await.map_err(|e| {
            tracing::warn!("generation response was not JSON: {}", e);
            AppError::Generation(describe(&e))
        })?;

        Ok(extract_text(&json))
    }
}
