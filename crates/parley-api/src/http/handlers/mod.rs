//! HTTP request handlers, one module per resource.

pub mod chat;
pub mod health;
pub mod smart_prompt;
