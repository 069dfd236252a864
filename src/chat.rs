//! Chat-completion client.
//!
//! [`ChatModel`] is the seam the composer talks to; [`OpenAIChat`] sends
//! the composed prompt as a single user message to the OpenAI chat
//! completions API and returns the first choice's content.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::ChatConfig;
use crate::error::ChatServiceError;

/// A language model that turns a prompt into a text completion.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Returns the model identifier (e.g. `"gpt-3.5-turbo"`).
    fn model_name(&self) -> &str;

    /// Complete `prompt` at the given sampling temperature.
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, ChatServiceError>;
}

/// Chat model backed by `POST {base_url}/chat/completions`.
pub struct OpenAIChat {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAIChat {
    pub fn new(config: &ChatConfig, api_key: String) -> Result<Self, ChatServiceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl ChatModel for OpenAIChat {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, ChatServiceError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": temperature,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(ChatServiceError::Api {
                status: status.as_u16(),
                body: body_text,
            });
        }

        let json: serde_json::Value = response.json().await?;
        parse_completion(json)
    }
}

/// Extract `choices[0].message.content` from a chat completions response.
fn parse_completion(json: serde_json::Value) -> Result<String, ChatServiceError> {
    let parsed: CompletionResponse = serde_json::from_value(json)
        .map_err(|e| ChatServiceError::InvalidResponse(e.to_string()))?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or(ChatServiceError::EmptyCompletion)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_first_choice() {
        let json = json!({
            "id": "chatcmpl-1",
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": "We open at 8am." } },
                { "index": 1, "message": { "role": "assistant", "content": "ignored" } }
            ]
        });
        assert_eq!(parse_completion(json).unwrap(), "We open at 8am.");
    }

    #[test]
    fn test_parse_no_choices() {
        let err = parse_completion(json!({ "choices": [] })).unwrap_err();
        assert!(matches!(err, ChatServiceError::EmptyCompletion));
    }

    #[test]
    fn test_parse_null_content() {
        let json = json!({ "choices": [ { "message": { "role": "assistant", "content": null } } ] });
        assert!(matches!(
            parse_completion(json).unwrap_err(),
            ChatServiceError::EmptyCompletion
        ));
    }

    #[test]
    fn test_parse_malformed() {
        let err = parse_completion(json!({ "error": { "message": "bad key" } })).unwrap_err();
        assert!(matches!(err, ChatServiceError::InvalidResponse(_)));
    }
}
