//! Request assembly for the direct and search-augmented chat paths.
//!
//! The system prompt is the base assistant persona followed by the depth
//! instruction. Replayed history is normalized so that the message list
//! always starts with a user turn and alternates roles, which the
//! Anthropic Messages API requires and OpenAI-style endpoints tolerate.

use std::fmt::Write as _;

use parley_types::chat::ChatMessage;
use parley_types::depth::Depth;
use parley_types::llm::{CompletionRequest, Message, MessageRole};
use parley_types::search::SearchSource;

/// Persona shared by every chat completion.
pub const BASE_SYSTEM_PROMPT: &str = "You are Parley, a helpful and knowledgeable assistant. \
Answer accurately and say so plainly when you are unsure. Use Markdown for lists, \
code and emphasis where it improves readability.";

/// Persona for synthesizing an answer from web search snippets.
pub const SEARCH_SYSTEM_PROMPT: &str = "You are Parley, a research assistant. \
Answer the user's question using the numbered web search results provided. \
Cite the results you rely on inline as [n], where n is the result number. \
If the results do not contain the answer, say so and answer from general knowledge, \
making clear which parts are not backed by the results.";

/// System prompt for a direct completion at the given depth.
pub fn system_prompt(depth: Depth) -> String {
    format!("{BASE_SYSTEM_PROMPT}\n\n{}", depth.instruction())
}

/// Build the completion request for the direct path.
///
/// `history` is the stored conversation (oldest first, already capped);
/// the new user message is appended last. An empty `model` selects the
/// provider's configured model.
pub fn build_direct_request(
    history: &[ChatMessage],
    message: &str,
    depth: Depth,
    model: &str,
) -> CompletionRequest {
    let mut messages: Vec<Message> = history
        .iter()
        .filter(|m| m.role != MessageRole::System)
        .map(|m| Message {
            role: m.role,
            content: m.content.clone(),
        })
        .collect();
    messages.push(Message::user(message));

    CompletionRequest {
        model: model.to_string(),
        messages: normalize_turns(messages),
        system: Some(system_prompt(depth)),
        max_tokens: depth.max_tokens(),
        temperature: None,
    }
}

/// Build the synthesis request for the web search path.
///
/// The user turn carries the question, an optional direct answer reported
/// by the search API, and the numbered snippets. With no sources the model
/// is told explicitly that the search came back empty.
pub fn build_search_request(
    message: &str,
    sources: &[SearchSource],
    answer: Option<&str>,
    depth: Depth,
    model: &str,
) -> CompletionRequest {
    let mut content = format!("Question: {}\n\n", message.trim());

    if let Some(answer) = answer.map(str::trim).filter(|a| !a.is_empty()) {
        let _ = write!(content, "Search engine summary: {answer}\n\n");
    }

    if sources.is_empty() {
        content.push_str(
            "Web search returned no results. Answer from general knowledge and \
             mention that no sources were found.",
        );
    } else {
        content.push_str("Search results:\n");
        for (i, source) in sources.iter().enumerate() {
            let _ = write!(content, "\n[{}] {} ({})\n", i + 1, source.title, source.url);
            if !source.snippet.is_empty() {
                let _ = writeln!(content, "{}", source.snippet);
            }
        }
    }

    CompletionRequest {
        model: model.to_string(),
        messages: vec![Message::user(content)],
        system: Some(format!("{SEARCH_SYSTEM_PROMPT}\n\n{}", depth.instruction())),
        max_tokens: depth.max_tokens(),
        temperature: None,
    }
}

/// Markdown "Sources" section appended to search-backed replies.
///
/// Returns an empty string when there are no sources.
pub fn format_sources_section(sources: &[SearchSource]) -> String {
    if sources.is_empty() {
        return String::new();
    }

    let mut section = String::from("\n\n**Sources:**");
    for (i, source) in sources.iter().enumerate() {
        let _ = write!(section, "\n{}. [{}]({})", i + 1, source.title, source.url);
    }
    section
}

/// Drop leading assistant turns and merge consecutive same-role turns.
fn normalize_turns(messages: Vec<Message>) -> Vec<Message> {
    let mut normalized: Vec<Message> = Vec::with_capacity(messages.len());

    for message in messages {
        if normalized.is_empty() && message.role != MessageRole::User {
            continue;
        }
        match normalized.last_mut() {
            Some(last) if last.role == message.role => {
                last.content.push_str("\n\n");
                last.content.push_str(&message.content);
            }
            _ => normalized.push(message),
        }
    }

    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(n: usize) -> SearchSource {
        SearchSource {
            title: format!("Title {n}"),
            url: format!("https://example.com/{n}"),
            snippet: format!("snippet {n}"),
        }
    }

    #[test]
    fn test_system_prompt_includes_depth_instruction() {
        for depth in Depth::ALL {
            let prompt = system_prompt(depth);
            assert!(prompt.starts_with(BASE_SYSTEM_PROMPT));
            assert!(prompt.ends_with(depth.instruction()));
        }
    }

    #[test]
    fn test_direct_request_appends_message_after_history() {
        let history = vec![
            ChatMessage::new("c", MessageRole::User, "hi"),
            ChatMessage::new("c", MessageRole::Assistant, "hello"),
        ];
        let request = build_direct_request(&history, "how are you?", Depth::Short, "");

        assert_eq!(request.messages.len(), 3);
        assert_eq!(request.messages[2].role, MessageRole::User);
        assert_eq!(request.messages[2].content, "how are you?");
        assert_eq!(request.max_tokens, Depth::Short.max_tokens());
        assert!(request.model.is_empty());
    }

    #[test]
    fn test_direct_request_normalizes_history() {
        let history = vec![
            ChatMessage::new("c", MessageRole::Assistant, "orphan reply"),
            ChatMessage::new("c", MessageRole::User, "first"),
            ChatMessage::new("c", MessageRole::User, "second"),
            ChatMessage::new("c", MessageRole::Assistant, "answer"),
        ];
        let request = build_direct_request(&history, "third", Depth::Medium, "m");

        let roles: Vec<MessageRole> = request.messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![MessageRole::User, MessageRole::Assistant, MessageRole::User]
        );
        assert_eq!(request.messages[0].content, "first\n\nsecond");
        assert_eq!(request.model, "m");
    }

    #[test]
    fn test_search_request_numbers_sources() {
        let request = build_search_request(
            "what is rust?",
            &[source(1), source(2)],
            Some("A language."),
            Depth::Large,
            "",
        );
        let content = &request.messages[0].content;
        assert!(content.contains("Question: what is rust?"));
        assert!(content.contains("Search engine summary: A language."));
        assert!(content.contains("[1] Title 1 (https://example.com/1)"));
        assert!(content.contains("[2] Title 2 (https://example.com/2)\nsnippet 2"));
        assert_eq!(request.max_tokens, Depth::Large.max_tokens());
        assert!(request.system.unwrap().contains("[n]"));
    }

    #[test]
    fn test_search_request_without_sources_says_so() {
        let request = build_search_request("q", &[], None, Depth::Concise, "");
        let content = &request.messages[0].content;
        assert!(content.contains("no results"));
        assert!(!content.contains("Search engine summary"));
    }

    #[test]
    fn test_format_sources_section() {
        assert_eq!(format_sources_section(&[]), "");
        assert_eq!(
            format_sources_section(&[source(1), source(2)]),
            "\n\n**Sources:**\n1. [Title 1](https://example.com/1)\n2. [Title 2](https://example.com/2)"
        );
    }
}
