//! OpenAI-compatible wire types.
//!
//! Providers behind an OpenAI-style base URL do not all answer in the same
//! shape. Chat-completions endpoints return `choices[].message.content`
//! with `prompt_tokens`/`completion_tokens`; Responses-style endpoints
//! return `output_text` or `output[].content[].text` with
//! `input_tokens`/`output_tokens`. Both deserialize into
//! [`ChatCompletionResponse`].

use serde::{Deserialize, Serialize};

use parley_types::llm::Usage;

/// Request body for `POST {base}/chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Response body in either chat-completions or Responses shape.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub output_text: Option<String>,
    #[serde(default)]
    pub output: Vec<OutputItem>,
    #[serde(default)]
    pub usage: Option<OpenAiUsage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
    /// Legacy completions put the text directly on the choice.
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputItem {
    #[serde(default)]
    pub content: Vec<OutputContent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputContent {
    #[serde(default)]
    pub text: Option<String>,
}

/// Usage under either naming scheme. Some gateways send both, so each
/// name is its own field and chat-completions names win.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenAiUsage {
    #[serde(default)]
    pub prompt_tokens: Option<u32>,
    #[serde(default)]
    pub input_tokens: Option<u32>,
    #[serde(default)]
    pub completion_tokens: Option<u32>,
    #[serde(default)]
    pub output_tokens: Option<u32>,
    #[serde(default)]
    pub total_tokens: Option<u32>,
}

impl OpenAiUsage {
    /// Normalized usage; a missing or zero total is derived.
    pub fn normalize(&self) -> Usage {
        let prompt = self.prompt_tokens.or(self.input_tokens).unwrap_or(0);
        let completion = self.completion_tokens.or(self.output_tokens).unwrap_or(0);
        let mut usage = Usage::new(prompt, completion);
        if let Some(total) = self.total_tokens.filter(|t| *t > 0) {
            usage.total_tokens = total;
        }
        usage
    }
}

impl ChatCompletionResponse {
    /// Generated text, whichever shape carried it.
    pub fn text(&self) -> String {
        if let Some(choice) = self.choices.first() {
            let content = choice
                .message
                .as_ref()
                .and_then(|m| m.content.clone())
                .or_else(|| choice.text.clone());
            if let Some(content) = content {
                return content;
            }
        }

        if let Some(text) = &self.output_text {
            return text.clone();
        }

        self.output
            .iter()
            .flat_map(|item| item.content.iter())
            .filter_map(|c| c.text.as_deref())
            .collect()
    }

    pub fn finish_reason(&self) -> Option<&str> {
        self.choices.first()?.finish_reason.as_deref()
    }

    pub fn normalized_usage(&self) -> Usage {
        self.usage
            .as_ref()
            .map(OpenAiUsage::normalize)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_completions_shape() {
        let json = r#"{
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "model": "llama-3.3-70b-versatile",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Hello"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 20, "completion_tokens": 3, "total_tokens": 23, "queue_time": 0.01}
        }"#;
        let resp: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.text(), "Hello");
        assert_eq!(resp.finish_reason(), Some("stop"));
        assert_eq!(resp.normalized_usage(), Usage::new(20, 3));
    }

    #[test]
    fn test_responses_shape_with_input_output_tokens() {
        let json = r#"{
            "id": "resp_1",
            "model": "gpt-4o-mini",
            "output": [{"type": "message", "content": [{"type": "output_text", "text": "Hi"}, {"type": "output_text", "text": " there"}]}],
            "usage": {"input_tokens": 7, "output_tokens": 2}
        }"#;
        let resp: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.text(), "Hi there");
        assert_eq!(resp.finish_reason(), None);
        let usage = resp.normalized_usage();
        assert_eq!(usage, Usage::new(7, 2));
        assert_eq!(usage.total_tokens, 9);
    }

    #[test]
    fn test_usage_with_both_namings() {
        let json = r#"{
            "choices": [{"message": {"content": "Hi"}}],
            "usage": {"prompt_tokens": 5, "completion_tokens": 2, "input_tokens": 6, "output_tokens": 3}
        }"#;
        let resp: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.text(), "Hi");
        assert_eq!(resp.normalized_usage(), Usage::new(5, 2));
    }

    #[test]
    fn test_output_text_shortcut() {
        let resp: ChatCompletionResponse =
            serde_json::from_str(r#"{"output_text": "direct", "usage": {"input_tokens": 1, "output_tokens": 1, "total_tokens": 2}}"#)
                .unwrap();
        assert_eq!(resp.text(), "direct");
        assert_eq!(resp.normalized_usage().total_tokens, 2);
    }

    #[test]
    fn test_missing_usage_is_zero() {
        let resp: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"content": null}}]}"#).unwrap();
        assert_eq!(resp.text(), "");
        assert!(resp.normalized_usage().is_empty());
    }

    #[test]
    fn test_request_skips_absent_temperature() {
        let req = ChatCompletionRequest {
            model: "m".to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: "hi".to_string(),
            }],
            max_tokens: 10,
            temperature: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("temperature").is_none());
        assert_eq!(json["messages"][0]["role"], "user");
    }
}
