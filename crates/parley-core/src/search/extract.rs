//! Source extraction from search API responses.
//!
//! Search backends disagree on where the hit list lives and what each hit's
//! fields are called, and the same backend is not always consistent between
//! calls. Extraction is a fixed sequence of fallback lookups; nothing here
//! fails, a response with no recognizable hits simply yields no sources.

use std::collections::HashSet;

use serde_json::Value;

use parley_types::search::SearchSource;

/// Longest snippet forwarded to the synthesis prompt, in characters.
pub const MAX_SNIPPET_CHARS: usize = 500;

/// Paths probed for the hit list, first non-empty array wins.
const LIST_PATHS: &[&[&str]] = &[
    &["results"],
    &["organic_results"],
    &["organic"],
    &["items"],
    &["web", "results"],
    &["data", "results"],
    &["data"],
    &["news", "results"],
];

const TITLE_KEYS: &[&str] = &["title", "name", "heading"];
const URL_KEYS: &[&str] = &["url", "link", "href", "source_url"];
const SNIPPET_KEYS: &[&str] = &["snippet", "content", "description", "text", "body"];

/// Extract at most `limit` sources from a raw search response.
///
/// Hits without a URL are dropped, duplicate URLs keep their first
/// occurrence, and a missing title falls back to the URL.
pub fn extract_sources(body: &Value, limit: usize) -> Vec<SearchSource> {
    let Some(items) = locate_results(body) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut sources = Vec::new();

    for item in items {
        if sources.len() >= limit {
            break;
        }
        let Some(source) = source_from_item(item) else {
            continue;
        };
        if seen.insert(source.url.clone()) {
            sources.push(source);
        }
    }

    sources
}

/// A direct answer some search APIs compute alongside the hits.
pub fn extract_answer(body: &Value) -> Option<String> {
    ["answer", "answer_box"]
        .iter()
        .filter_map(|key| body.get(*key))
        .find_map(|value| match value {
            Value::Object(_) => first_text(value, &["answer", "snippet"]),
            other => text_of(other),
        })
}

fn locate_results(body: &Value) -> Option<&Vec<Value>> {
    if let Value::Array(items) = body {
        if !items.is_empty() {
            return Some(items);
        }
    }

    LIST_PATHS.iter().find_map(|path| {
        let mut cursor = body;
        for key in *path {
            cursor = cursor.get(*key)?;
        }
        cursor.as_array().filter(|items| !items.is_empty())
    })
}

fn source_from_item(item: &Value) -> Option<SearchSource> {
    if !item.is_object() {
        return None;
    }

    let url = first_text(item, URL_KEYS)?;
    let title = first_text(item, TITLE_KEYS).unwrap_or_else(|| url.clone());
    let snippet = first_text(item, SNIPPET_KEYS)
        .map(|s| truncate_chars(&s, MAX_SNIPPET_CHARS))
        .unwrap_or_default();

    Some(SearchSource {
        title,
        url,
        snippet,
    })
}

/// First key whose value renders to non-blank text.
fn first_text(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| item.get(*key))
        .find_map(text_of)
}

fn text_of(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(parts) => parts
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", text[..idx].trim_end()),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tavily_shape() {
        let body = json!({
            "answer": "Rust 1.0 shipped in 2015.",
            "results": [
                {"title": "Rust blog", "url": "https://blog.rust-lang.org", "content": "Announcing Rust 1.0"},
                {"title": "Wikipedia", "url": "https://en.wikipedia.org/wiki/Rust", "content": "Rust is a language"}
            ]
        });
        let sources = extract_sources(&body, 5);
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].title, "Rust blog");
        assert_eq!(sources[0].snippet, "Announcing Rust 1.0");
        assert_eq!(
            extract_answer(&body).as_deref(),
            Some("Rust 1.0 shipped in 2015.")
        );
    }

    #[test]
    fn test_serp_shape_with_link_and_snippet() {
        let body = json!({
            "organic_results": [
                {"position": 1, "title": "Tokio", "link": "https://tokio.rs", "snippet": "An async runtime"}
            ]
        });
        let sources = extract_sources(&body, 5);
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].url, "https://tokio.rs");
        assert_eq!(sources[0].snippet, "An async runtime");
    }

    #[test]
    fn test_nested_web_results_shape() {
        let body = json!({
            "web": {"results": [{"name": "Axum", "href": "https://docs.rs/axum", "description": "Web framework"}]}
        });
        let sources = extract_sources(&body, 5);
        assert_eq!(
            sources,
            vec![SearchSource {
                title: "Axum".to_string(),
                url: "https://docs.rs/axum".to_string(),
                snippet: "Web framework".to_string(),
            }]
        );
    }

    #[test]
    fn test_top_level_array_shape() {
        let body = json!([{"title": "A", "url": "https://a.example"}]);
        let sources = extract_sources(&body, 5);
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].snippet, "");
    }

    #[test]
    fn test_empty_results_falls_through_to_next_path() {
        let body = json!({
            "results": [],
            "data": [{"title": "B", "link": "https://b.example", "text": "bee"}]
        });
        let sources = extract_sources(&body, 5);
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].url, "https://b.example");
    }

    #[test]
    fn test_drops_items_without_url_and_duplicates() {
        let body = json!({
            "results": [
                {"title": "no url", "content": "x"},
                "not an object",
                {"title": "first", "url": "https://dup.example"},
                {"title": "second", "url": "https://dup.example"},
                {"url": "https://untitled.example", "snippet": ["part one", "part two"]}
            ]
        });
        let sources = extract_sources(&body, 10);
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].title, "first");
        assert_eq!(sources[1].title, "https://untitled.example");
        assert_eq!(sources[1].snippet, "part one part two");
    }

    #[test]
    fn test_respects_limit() {
        let items: Vec<Value> = (0..10)
            .map(|i| json!({"title": format!("t{i}"), "url": format!("https://{i}.example")}))
            .collect();
        let body = json!({ "items": items });
        assert_eq!(extract_sources(&body, 3).len(), 3);
    }

    #[test]
    fn test_unrecognized_shape_yields_nothing() {
        assert!(extract_sources(&json!({"status": "ok"}), 5).is_empty());
        assert!(extract_sources(&json!(null), 5).is_empty());
        assert!(extract_answer(&json!({"results": []})).is_none());
    }

    #[test]
    fn test_long_snippet_truncated_on_char_boundary() {
        let long = "é".repeat(MAX_SNIPPET_CHARS + 20);
        let body = json!({"results": [{"url": "https://long.example", "content": long}]});
        let sources = extract_sources(&body, 1);
        assert!(sources[0].snippet.ends_with("..."));
        assert_eq!(sources[0].snippet.chars().count(), MAX_SNIPPET_CHARS + 3);
    }

    #[test]
    fn test_answer_box_object() {
        let body = json!({"answer_box": {"answer": "42"}});
        assert_eq!(extract_answer(&body).as_deref(), Some("42"));
    }
}
