//! OpenAI-compatible chat completions client.

use serde::{Deserialize, Serialize};

use super::{GenerationConfig, GenerationError, Generator};
use crate::context::GenerationPayload;
use crate::http_client::LazyClient;

const SYSTEM_PROMPT: &str = "You are an HR assistant. Only recommend employees that appear in \
    the provided list and never invent details about them.";

pub struct OpenAiChatGenerator {
    client: LazyClient,
    endpoint: String,
    model: String,
    max_tokens: usize,
    temperature: f32,
}

impl OpenAiChatGenerator {
    pub fn new(api_key: String, config: &GenerationConfig) -> Result<Self, GenerationError> {
        if api_key.trim().is_empty() {
            return Err(GenerationError::Config("missing OpenAI API key".into()));
        }

        let client =
            LazyClient::bearer(&api_key, config.timeout).map_err(GenerationError::Config)?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }
}

impl Generator for OpenAiChatGenerator {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn generate(&self, payload: &GenerationPayload) -> Result<String, GenerationError> {
        let prompt = payload.render_prompt();
        let body = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
        };

        let client = self.client.get().map_err(GenerationError::Config)?;
        let resp = client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .map_err(|err| {
                if err.is_timeout() {
                    GenerationError::Timeout(self.client.timeout())
                } else {
                    GenerationError::Request(err.to_string())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp
                .text()
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(GenerationError::Request(format!(
                "chat endpoint returned {status}: {text}"
            )));
        }

        let parsed: ChatResponse = resp
            .json()
            .map_err(|err| GenerationError::InvalidResponse(err.to_string()))?;
        parsed
            .choices
            .into_iter()
            .map(|choice| choice.message.content.trim().to_string())
            .find(|content| !content.is_empty())
            .ok_or_else(|| GenerationError::InvalidResponse("no completion text".into()))
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: usize,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_chat_endpoint() {
        let config = GenerationConfig {
            base_url: "http://localhost:11434/v1/".into(),
            ..GenerationConfig::default()
        };
        let generator = OpenAiChatGenerator::new("sk-test".into(), &config).unwrap();
        assert_eq!(generator.endpoint, "http://localhost:11434/v1/chat/completions");
        assert_eq!(generator.name(), "openai");
    }

    #[test]
    fn rejects_blank_key() {
        let result = OpenAiChatGenerator::new(" ".into(), &GenerationConfig::default());
        assert!(matches!(result, Err(GenerationError::Config(_))));
    }

    #[test]
    fn parses_first_non_empty_choice() {
        let parsed: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"content":"  "}},{"message":{"content":"Alice fits."}}]}"#,
        )
        .unwrap();
        let text = parsed
            .choices
            .into_iter()
            .map(|c| c.message.content.trim().to_string())
            .find(|c| !c.is_empty());
        assert_eq!(text.as_deref(), Some("Alice fits."));
    }
}
