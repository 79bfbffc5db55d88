//! Chat browsing CLI commands: list chats and print history.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use parley_core::chat::service::ChatService;
use parley_core::chat::repository::ChatRepository;
use parley_types::chat::{ChatMessage, MessageRole};

/// Longest message preview shown in tables.
const PREVIEW_CHARS: usize = 60;

/// List chats with creation time, message count and the latest message.
///
/// # Examples
///
/// ```bash
/// parley chats
/// parley chats --limit 5 --json
/// ```
pub async fn list_chats<C: ChatRepository>(
    chats: &ChatService<C>,
    limit: i64,
    json: bool,
) -> Result<()> {
    let list = chats.list_chats(Some(limit)).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }

    if list.is_empty() {
        println!();
        println!(
            "  {} No chats yet. Start the server with: {}",
            style("i").blue().bold(),
            style("parley serve").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Chat").fg(Color::White),
        Cell::new("Created").fg(Color::White),
        Cell::new("Messages").fg(Color::White),
        Cell::new("Last message").fg(Color::White),
    ]);

    for chat in &list {
        let count = chats.chat_repo().count_messages(&chat.id).await.unwrap_or(0);
        let last = chats
            .history(&chat.id, Some(1))
            .await
            .pop()
            .map(|m| preview(&m.content))
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(&chat.id).fg(Color::Cyan),
            Cell::new(chat.created_at.format("%Y-%m-%d %H:%M").to_string()),
            Cell::new(count),
            Cell::new(last),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    Ok(())
}

/// Print every message of a chat in order.
pub async fn show_history<C: ChatRepository>(
    chats: &ChatService<C>,
    chat_id: &str,
    json: bool,
) -> Result<()> {
    let messages = chats.history(chat_id, None).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&messages)?);
        return Ok(());
    }

    if messages.is_empty() {
        println!();
        println!(
            "  {} No messages for chat '{}'",
            style("i").blue().bold(),
            style(chat_id).cyan()
        );
        println!();
        return Ok(());
    }

    println!();
    for message in &messages {
        println!("{}", format_message_header(message));
        for line in message.content.lines() {
            println!("    {line}");
        }
        println!();
    }
    Ok(())
}

fn format_message_header(message: &ChatMessage) -> String {
    let time = message.created_at.format("%H:%M:%S");
    let label = match message.role {
        MessageRole::User => style("you").green().bold(),
        MessageRole::Assistant => style("assistant").magenta().bold(),
        MessageRole::System => style("system").dim(),
    };
    format!("  {label} {}", style(time).dim())
}

/// First line of `content`, shortened for table cells.
fn preview(content: &str) -> String {
    let first = content.lines().next().unwrap_or_default();
    if first.chars().count() > PREVIEW_CHARS {
        let cut: String = first.chars().take(PREVIEW_CHARS - 3).collect();
        format!("{cut}...")
    } else {
        first.to_string()
    }
}
