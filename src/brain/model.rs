// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The external model API (spec §1: out of scope, only its interface is
//! specified). `HttpModelClient` is a thin `reqwest` wrapper matching that
//! interface; `StubModelClient` backs tests and the no-`model_api_base`
//! configuration so brain triggers keep working without a configured key.

use async_trait::async_trait;
use serde::Deserialize;

use crate::brain::importance::{max_tokens, model_tier, Importance};

/// Parameters the spec names explicitly for a model call.
pub struct ModelRequest<'a> {
    pub prompt: &'a str,
    pub importance: Importance,
    pub vision: bool,
    pub screen_image_base64: Option<&'a str>,
}

/// Parsed `{speech?, action?, emotion?}` response (spec §4.7).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelResponse {
    pub speech: Option<String>,
    pub action: Option<String>,
    pub emotion: Option<String>,
}

#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn call(&self, req: ModelRequest<'_>) -> Option<ModelResponse>;
}

/// Calls an external, Anthropic-message-shaped HTTP endpoint. Unparsable or
/// failed responses are dropped (spec §4.7: "unparsable -> drop"), never
/// propagated, matching the `TransientIO`/`ParseError` absorption policy
/// (spec §7).
pub struct HttpModelClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    timeout: std::time::Duration,
}

impl HttpModelClient {
    pub fn new(base_url: String, api_key: String, timeout: std::time::Duration) -> Self {
        Self { client: reqwest::Client::new(), base_url, api_key, timeout }
    }
}

#[async_trait]
impl ModelClient for HttpModelClient {
    async fn call(&self, req: ModelRequest<'_>) -> Option<ModelResponse> {
        let body = serde_json::json!({
            "model": model_tier(req.importance),
            "max_tokens": max_tokens(req.importance),
            "priority": format!("{:?}", req.importance).to_lowercase(),
            "vision": req.vision,
            "prompt": req.prompt,
            "image": req.screen_image_base64,
        });

        let result = tokio::time::timeout(
            self.timeout,
            self.client
                .post(format!("{}/v1/companion/respond", self.base_url))
                .bearer_auth(&self.api_key)
                .json(&body)
                .send(),
        )
        .await;

        let response = match result {
            Ok(Ok(resp)) => resp,
            _ => {
                let err = crate::error::HubError::TransientIo(format!(
                    "model API call to {} timed out or failed",
                    self.base_url
                ));
                tracing::debug!(%err, "dropping trigger, no model response");
                return None;
            }
        };

        match response.json::<ModelResponse>().await {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                let err = crate::error::HubError::Parse(format!("model API response: {e}"));
                tracing::debug!(%err, "dropping unparsable model response");
                None
            }
        }
    }
}

/// A deterministic stand-in used when no `model_api_base` is configured, and
/// by tests. Echoes a minimal in-character response without calling out.
pub struct StubModelClient;

#[async_trait]
impl ModelClient for StubModelClient {
    async fn call(&self, req: ModelRequest<'_>) -> Option<ModelResponse> {
        Some(ModelResponse {
            speech: Some(format!("(thinking about {} things...)", req.prompt.split_whitespace().count())),
            action: None,
            emotion: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stub_client_always_returns_a_response() {
        let client = StubModelClient;
        let req = ModelRequest {
            prompt: "hello world",
            importance: Importance::Low,
            vision: false,
            screen_image_base64: None,
        };
        let resp = client.call(req).await.expect("stub always responds");
        assert!(resp.speech.is_some());
    }
}
