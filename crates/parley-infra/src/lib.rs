//! Infrastructure layer for Parley.
//!
//! Implementations of the ports defined in `parley-core`: SQLite chat
//! storage, OpenAI-compatible and Anthropic model clients, the web search
//! HTTP client and Hugging Face token counting, plus configuration loading.

pub mod config;
pub mod llm;
pub mod search;
pub mod sqlite;
pub mod tokenizer;
