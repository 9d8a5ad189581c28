//! IBM Cloud IAM API-key → bearer token exchange.

use std::time::Duration;

use serde::Deserialize;

use crate::clock::Clock;
use crate::errors::AppError;
use crate::models::token::{TokenInfo, MAX_EXPIRES_IN_SECS};

pub const GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";
pub const IAM_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct IamTokenResponse {
    access_token: String,
    expires_in: i64,
}

pub struct IamClient {
    client: reqwest::Client,
    url: String,
}

impl IamClient {
    pub fn new(url: &str) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(IAM_TIMEOUT)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to build IAM client: {}", e)))?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    /// Exchange `api_key` for a bearer token. No request is made when the key
    /// is absent or blank.
    pub async fn obtain_token(
        &self,
        api_key: Option<&str>,
        clock: &dyn Clock,
    ) -> Result<TokenInfo, AppError> {
        let api_key = match api_key.map(str::trim) {
            Some(k) if !k.is_empty() => k,
            _ => return Err(AppError::MissingCredential),
        };

        tracing::info!(url = %self.url, "requesting IAM token");

        let resp = self
            .client
            .post(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[("grant_type", GRANT_TYPE), ("apikey", api_key)])
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("IAM request failed: {}", e);
                AppError::TokenExchange(describe(&e))
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "IAM returned an error");
            return Err(AppError::TokenExchange(format!(
                "identity service returned {}: {}",
                status,
                truncate(&body, 300)
            )));
        }

        let parsed: IamTokenResponse = resp.json().await.map_err(|e| {
            tracing::warn!("IAM response could not be parsed: {}", e);
            AppError::TokenExchange(format!("malformed token response: {}", e))
        })?;

        if parsed.expires_in <= 0 || parsed.expires_in > MAX_EXPIRES_IN_SECS {
            tracing::warn!(expires_in = parsed.expires_in, "IAM returned an unusable token lifetime");
            return Err(AppError::TokenExchange(format!(
                "malformed token response: expires_in {} is outside 1..={}",
                parsed.expires_in, MAX_EXPIRES_IN_SECS
            )));
        }

        let token = TokenInfo {
            access_token: parsed.access_token,
            expires_in: parsed.expires_in,
            fetched_at: clock.now(),
        };
        tracing::info!(expires_in = token.expires_in, "IAM token acquired");
        Ok(token)
    }
}

pub(crate) fn describe(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("request timed out ({})", e)
    } else {
        e.to_string()
    }
}

pub(crate) fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
