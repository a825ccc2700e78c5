use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::llm_interface::{ModelClient, ModelInvocationError};
use crate::config::{ApiKey, LlmConfig};

/// OpenAI compatible LLM implementation
/// Sends a single user message to `<base_url>/chat/completions`
pub struct OpenAICompatibleLLM {
    client: Client,
    model: String,
    base_url: String,
    api_key: ApiKey,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAICompatibleLLM {
    pub fn new(config: &LlmConfig, api_key: ApiKey) -> Result<Self, ModelInvocationError> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        info!(
            "Initialized OpenAICompatibleLLM: model={}, base_url={}",
            config.model, config.base_url
        );
        Ok(Self {
            client,
            model: config.model.clone(),
            base_url: config.base_url.clone(),
            api_key,
            temperature: config.temperature,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        }
    }
}

fn extract_content(body: &str) -> Result<String, ModelInvocationError> {
    let response: ChatCompletionResponse = serde_json::from_str(body).map_err(|e| {
        ModelInvocationError::InvalidResponse(format!("Failed to parse JSON: {}", e))
    })?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| {
            ModelInvocationError::InvalidResponse(
                "missing choices[0].message.content".to_string(),
            )
        })
}

#[async_trait]
impl ModelClient for OpenAICompatibleLLM {
    async fn invoke(&self, prompt: &str) -> Result<String, ModelInvocationError> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(self.api_key.expose())
            .json(&self.request_body(prompt))
            .send()
            .await?;

        let status = response.status();
        // Read as text first so an error body is not lost when it isn't JSON
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ModelInvocationError::Api { status, body });
        }

        let content = extract_content(&body)?;
        debug!("Model replied with {} bytes", content.len());
        Ok(content)
    }
}
