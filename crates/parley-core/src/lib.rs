//! Business logic and port trait definitions for Parley.
//!
//! This crate defines the "ports" (provider, search, repository and token
//! counter traits) that the infrastructure layer implements, plus the chat
//! orchestration built on top of them. It depends only on `parley-types` --
//! never on `parley-infra` or any database/IO crate.

pub mod chat;
pub mod llm;
pub mod orchestrator;
pub mod prompt;
pub mod search;
pub mod tokens;

#[cfg(test)]
pub(crate) mod test_support;
