//! Chat-completion client speaking the OpenAI REST wire format.
//!
//! Any endpoint implementing `POST {base_url}/chat/completions` works; base
//! URL, model name, key and temperature come from server configuration, so
//! swapping providers is an environment change.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use gil_types::ChatTurn;

use crate::error::ProviderError;

/// Anything that can turn a conversation into a completion. The orchestrator
/// depends on this trait so tests can substitute a scripted model.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, turns: &[ChatTurn]) -> Result<String, ProviderError>;
}

// ── Wire types ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatTurn],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

// ── Client ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl LlmClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            temperature,
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ChatModel for LlmClient {
    async fn complete(&self, turns: &[ChatTurn]) -> Result<String, ProviderError> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: turns,
            stream: false,
            temperature: Some(self.temperature),
        };

        let mut req = self.http.post(self.completions_url()).json(&body);
        // Local OpenAI-compatible servers often run keyless.
        if !self.api_key.is_empty() {
            req = req.bearer_auth(&self.api_key);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Upstream {
                provider: "llm",
                detail: format!("{status}: {detail}"),
            });
        }

        let parsed: ChatCompletionResponse = resp.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(ProviderError::Payload {
                provider: "llm",
                detail: "response carried no choices".to_owned(),
            })
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn request_serializes_to_wire_shape() {
        let turns = vec![
            ChatTurn::system("너는 여행 전문가다."),
            ChatTurn::user("부산 맛집 알려줘"),
        ];
        let body = ChatCompletionRequest {
            model: "gpt-4o-mini",
            messages: &turns,
            stream: false,
            temperature: Some(0.7),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "부산 맛집 알려줘");
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn response_parses_first_choice() {
        let raw = r#"{
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 1726000000,
            "model": "gpt-4o-mini",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "돼지국밥을 추천합니다."}, "finish_reason": "stop"}
            ]
        }"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content, "돼지국밥을 추천합니다.");
    }

    #[test]
    fn completions_url_tolerates_trailing_slash() {
        let http = reqwest::Client::new();
        let a = LlmClient::new(http.clone(), "https://api.openai.com/v1/", "", "m", 0.7);
        let b = LlmClient::new(http, "https://api.openai.com/v1", "", "m", 0.7);
        assert_eq!(a.completions_url(), b.completions_url());
        assert_eq!(a.completions_url(), "https://api.openai.com/v1/chat/completions");
    }
}
