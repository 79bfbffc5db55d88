//! Hugging Face tokenizer-backed token counting.
//!
//! Smart prompt reports token counts before and after optimization. When a
//! `tokenizer.json` is configured it is loaded with the `tokenizers` crate;
//! otherwise, or when loading fails, counting falls back to the character
//! estimate from `parley-core`.

use std::path::Path;
use std::sync::Arc;

use tokenizers::Tokenizer;
use tracing::{info, warn};

use parley_core::tokens::{CharEstimateCounter, TokenCounter};

/// Exact token counts from a Hugging Face tokenizer definition.
pub struct HfTokenCounter {
    tokenizer: Tokenizer,
}

impl HfTokenCounter {
    /// Load a tokenizer from a `tokenizer.json` file.
    pub fn from_file(path: &Path) -> Result<Self, tokenizers::Error> {
        let tokenizer = Tokenizer::from_file(path)?;
        Ok(Self { tokenizer })
    }
}

impl TokenCounter for HfTokenCounter {
    fn name(&self) -> &str {
        "hf-tokenizer"
    }

    fn count(&self, text: &str) -> usize {
        match self.tokenizer.encode(text, false) {
            Ok(encoding) => encoding.len(),
            Err(e) => {
                warn!(error = %e, "Tokenizer failed to encode, using estimate");
                CharEstimateCounter.count(text)
            }
        }
    }
}

/// The configured tokenizer, or the character estimate.
pub fn load_token_counter(path: Option<&Path>) -> Arc<dyn TokenCounter> {
    let Some(path) = path else {
        return Arc::new(CharEstimateCounter);
    };

    match HfTokenCounter::from_file(path) {
        Ok(counter) => {
            info!(path = %path.display(), "Loaded tokenizer");
            Arc::new(counter)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to load tokenizer, using estimate");
            Arc::new(CharEstimateCounter)
        }
    }
}
