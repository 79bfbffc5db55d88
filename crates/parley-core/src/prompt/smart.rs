//! Smart prompt: ask a secondary model to tighten a draft prompt.
//!
//! The model is asked for a JSON object, but small models routinely wrap it
//! in code fences, surround it with prose, leave trailing commas, or put raw
//! newlines inside strings. Parsing therefore runs a short ladder of
//! repairs and, when every rung fails, hands back the draft unchanged.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use parley_types::llm::{CompletionRequest, Message};
use parley_types::prompt::SmartPromptResult;

use crate::llm::box_provider::BoxLlmProvider;
use crate::tokens::TokenCounter;

/// System prompt for the optimization call.
pub const SMART_PROMPT_SYSTEM: &str = r#"You improve prompts that users are about to send to an AI assistant.

Review the draft prompt for problems such as ambiguity, missing context, unclear output format, redundancy or filler words. Then rewrite it to be shorter and clearer while keeping the user's intent, language and every concrete detail.

Reply with ONLY a JSON object, no commentary, in exactly this shape:
{"issues": ["short description of each problem found"], "optimizedPrompt": "the rewritten prompt"}

If the draft is already good, return an empty issues list and the draft unchanged."#;

const OPTIMIZED_KEYS: &[&str] = &["optimizedPrompt", "optimized_prompt", "optimized", "prompt"];
const ISSUE_LIST_KEYS: &[&str] = &["issues", "problems"];
const ISSUE_TEXT_KEYS: &[&str] = &["issue", "description", "message"];

const OPTIMIZATION_MAX_TOKENS: u32 = 1024;

/// Build the completion request sent to the secondary model.
pub fn build_optimization_request(prompt: &str) -> CompletionRequest {
    CompletionRequest {
        model: String::new(),
        messages: vec![Message::user(format!(
            "Draft prompt:\n<<<\n{prompt}\n>>>"
        ))],
        system: Some(SMART_PROMPT_SYSTEM.to_string()),
        max_tokens: OPTIMIZATION_MAX_TOKENS,
        temperature: None,
    }
}

/// Parse the model's reply into `(issues, optimized_prompt)`.
///
/// Never fails: unparseable output, or output without a usable optimized
/// prompt, yields `(vec![], original)`.
pub fn parse_optimization(raw: &str, original: &str) -> (Vec<String>, String) {
    let Some(object) = parse_object(raw) else {
        debug!("Optimization reply is not parseable JSON, keeping original prompt");
        return (Vec::new(), original.to_string());
    };

    let optimized = OPTIMIZED_KEYS
        .iter()
        .filter_map(|key| object.get(*key))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty());

    let Some(optimized) = optimized else {
        debug!("Optimization reply has no optimized prompt, keeping original prompt");
        return (Vec::new(), original.to_string());
    };

    let issues = ISSUE_LIST_KEYS
        .iter()
        .find_map(|key| object.get(*key))
        .map(issues_from)
        .unwrap_or_default();

    (issues, optimized.to_string())
}

fn parse_object(raw: &str) -> Option<Value> {
    let text = strip_code_fences(raw);

    let mut candidates = vec![text];
    if let Some(slice) = outermost_braces(text) {
        if slice != text {
            candidates.push(slice);
        }
    }

    candidates.into_iter().find_map(|candidate| {
        serde_json::from_str::<Value>(candidate)
            .ok()
            .or_else(|| serde_json::from_str::<Value>(&repair_json(candidate)).ok())
            .filter(Value::is_object)
    })
}

fn issues_from(value: &Value) -> Vec<String> {
    let text = |v: &Value| -> Option<String> {
        let raw = match v {
            Value::String(s) => Some(s.as_str()),
            Value::Object(_) => ISSUE_TEXT_KEYS
                .iter()
                .filter_map(|key| v.get(*key))
                .find_map(Value::as_str),
            _ => None,
        };
        raw.map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    match value {
        Value::Array(items) => items.iter().filter_map(text).collect(),
        other => text(other).into_iter().collect(),
    }
}

/// Remove a surrounding Markdown code fence, with or without a language tag.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip the info string ("json", "JSON", ...) on the opening line.
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

fn outermost_braces(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Escape raw control characters inside strings and drop trailing commas.
fn repair_json(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
                out.push(c);
                continue;
            }
            match c {
                '\\' => {
                    escaped = true;
                    out.push(c);
                }
                '"' => {
                    in_string = false;
                    out.push(c);
                }
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
                c => out.push(c),
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' => {
                let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
                if !matches!(next, Some('}') | Some(']')) {
                    out.push(c);
                }
            }
            c => out.push(c),
        }
    }

    out
}

/// Runs the optimization call and reports token counts.
pub struct SmartPromptService {
    provider: Arc<BoxLlmProvider>,
    counter: Arc<dyn TokenCounter>,
}

impl SmartPromptService {
    pub fn new(provider: Arc<BoxLlmProvider>, counter: Arc<dyn TokenCounter>) -> Self {
        Self { provider, counter }
    }

    pub fn counter(&self) -> &dyn TokenCounter {
        self.counter.as_ref()
    }

    /// Optimize a draft prompt. Provider failures return the draft unchanged.
    #[tracing::instrument(name = "smart_prompt", skip_all, fields(provider = %self.provider.name()))]
    pub async fn optimize(&self, prompt: &str) -> SmartPromptResult {
        let original_tokens = self.counter.count(prompt);
        let request = build_optimization_request(prompt);

        let raw = match self.provider.complete(&request).await {
            Ok(response) => response.content,
            Err(e) => {
                warn!(error = %e, "Smart prompt call failed, returning original prompt");
                return SmartPromptResult::unchanged(prompt, original_tokens);
            }
        };

        let (issues, optimized) = parse_optimization(&raw, prompt);
        let optimized_tokens = self.counter.count(&optimized);

        info!(
            issues = issues.len(),
            original_tokens,
            optimized_tokens,
            counter = self.counter.name(),
            "Prompt optimized"
        );

        SmartPromptResult {
            issues,
            optimized_prompt: optimized,
            original_tokens,
            optimized_tokens,
        }
    }
}
