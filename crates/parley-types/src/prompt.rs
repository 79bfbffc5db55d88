//! Smart prompt optimization result.

use serde::{Deserialize, Serialize};

/// Outcome of asking the secondary model to tighten a draft prompt.
///
/// Serialized in camelCase to match the `POST /smart-prompt` response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartPromptResult {
    pub issues: Vec<String>,
    pub optimized_prompt: String,
    pub original_tokens: usize,
    pub optimized_tokens: usize,
}

impl SmartPromptResult {
    /// The draft returned as-is, used whenever optimization fails.
    pub fn unchanged(prompt: &str, tokens: usize) -> Self {
        Self {
            issues: Vec::new(),
            optimized_prompt: prompt.to_string(),
            original_tokens: tokens,
            optimized_tokens: tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_camel_case() {
        let result = SmartPromptResult::unchanged("hi", 1);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["optimizedPrompt"], "hi");
        assert_eq!(json["originalTokens"], 1);
        assert_eq!(json["optimizedTokens"], 1);
        assert!(json["issues"].as_array().unwrap().is_empty());
    }
}
