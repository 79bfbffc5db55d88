//! Prompt construction for the direct, search and smart-prompt model calls.

pub mod assembly;
pub mod smart;
