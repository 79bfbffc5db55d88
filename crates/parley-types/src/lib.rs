//! Shared domain types for Parley.
//!
//! Chats, messages, LLM request/response shapes, depth tiers, search
//! sources, smart-prompt results, configuration and error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod depth;
pub mod error;
pub mod llm;
pub mod prompt;
pub mod search;
