//! OpenAI chat-completions backend over plain `reqwest`.

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;

use super::provider::{CompletionRequest, CompletionResponse, FinishReason, LlmProvider};
use crate::error::LlmError;

const PROVIDER: &str = "openai";

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiProvider {
    api_key: Option<SecretString>,
    model: String,
    api_base: String,
    client: reqwest::Client,
}

impl OpenAiProvider {
    /// `api_key` may be absent; requests then fail with `AuthFailed`
    /// without touching the network.
    pub fn new(api_key: Option<SecretString>, model: &str, api_base: &str) -> Self {
        Self {
            api_key,
            model: model.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let api_key = self.api_key.as_ref().ok_or_else(|| LlmError::AuthFailed {
            provider: PROVIDER.to_string(),
            reason: "OPENAI_API_KEY is not set".to_string(),
        })?;

        let body = json!({
            "model": self.model,
            "messages": request.messages,
        });

        let resp = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed {
                provider: PROVIDER.to_string(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::AuthFailed {
                    provider: PROVIDER.to_string(),
                    reason: format!("status {status}: {error_text}"),
                },
                StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimited {
                    provider: PROVIDER.to_string(),
                    reason: error_text,
                },
                _ => LlmError::RequestFailed {
                    provider: PROVIDER.to_string(),
                    reason: format!("status {status}: {error_text}"),
                },
            });
        }

        let json: serde_json::Value = resp.json().await.map_err(|e| LlmError::InvalidResponse {
            provider: PROVIDER.to_string(),
            reason: e.to_string(),
        })?;

        parse_chat_response(&json)
    }
}

/// Pull `choices[0].message.content` and usage out of a chat response body.
fn parse_chat_response(json: &serde_json::Value) -> Result<CompletionResponse, LlmError> {
    let content = json
        .pointer("/choices/0/message/content")
        .and_then(|v| v.as_str())
        .ok_or_else(|| LlmError::InvalidResponse {
            provider: PROVIDER.to_string(),
            reason: "response missing choices[0].message.content".to_string(),
        })?
        .to_string();

    let usage = |field: &str| {
        json.pointer(&format!("/usage/{field}"))
            .and_then(|v| v.as_u64())
            .map_or(0, |n| u32::try_from(n).unwrap_or(u32::MAX))
    };

    Ok(CompletionResponse {
        content,
        input_tokens: usage("prompt_tokens"),
        output_tokens: usage("completion_tokens"),
        finish_reason: FinishReason::from_api(
            json.pointer("/choices/0/finish_reason")
                .and_then(|v| v.as_str()),
        ),
        response_id: json.get("id").and_then(|v| v.as_str()).map(String::from),
    })
}
