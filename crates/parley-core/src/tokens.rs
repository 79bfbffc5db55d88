//! Token counting port.
//!
//! Smart prompt reports token counts for the draft and the optimized
//! prompt. A real tokenizer lives in parley-infra; this module holds the
//! trait and the character-based estimate used when no tokenizer loads.

/// Counts tokens in a piece of text.
pub trait TokenCounter: Send + Sync {
    /// Short label for logs (e.g., "estimate", "hf-tokenizer").
    fn name(&self) -> &str;

    fn count(&self, text: &str) -> usize;
}

/// Average characters per token for English text.
const CHARS_PER_TOKEN: usize = 4;

/// Crude fallback: about four characters per token.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharEstimateCounter;

impl TokenCounter for CharEstimateCounter {
    fn name(&self) -> &str {
        "estimate"
    }

    fn count(&self, text: &str) -> usize {
        text.chars().count().div_ceil(CHARS_PER_TOKEN)
    }
}
