//! Formatting utilities (Telegram HTML for headline lists and notices).

use crate::domain::Article;

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Numbered headline list, one blank line between entries.
pub fn format_article_list(articles: &[Article]) -> String {
    articles
        .iter()
        .enumerate()
        .map(|(i, a)| format_article(i + 1, a))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn format_article(n: usize, a: &Article) -> String {
    format!(
        "{n}.) Headline: <b>{}</b>\n     Source: <i>{}</i>\n     Read more: {}",
        escape_html(&a.headline),
        escape_html(&a.source),
        escape_html(&a.url)
    )
}

/// Body of the scheduled daily message.
pub fn format_digest(first_name: Option<&str>, articles: &[Article]) -> String {
    let greeting = match first_name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => format!("Hello {}, here are your updates for today!", escape_html(name)),
        None => "Hello, here are your updates for today!".to_string(),
    };
    format!(
        "{greeting}\n\n{}\n\nHave a great day!",
        format_article_list(articles)
    )
}

pub fn format_schedule_confirmation(category: &str, sources: &[String]) -> String {
    let sources = if sources.is_empty() {
        "any (random picks)".to_string()
    } else {
        escape_html(&sources.join(", "))
    };
    format!(
        "✅ Your selection has been recorded!\n\n📰 <b>Category:</b> {}\n📡 <b>Sources:</b> {sources}\n\n📅 Your news is now scheduled to be sent <i>everyday</i>.",
        escape_html(category)
    )
}
