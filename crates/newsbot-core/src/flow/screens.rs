//! Texts and keyboards for each conversation step.
//!
//! Everything here is a pure function of its inputs, so re-rendering the same
//! state always produces the same layout.

use std::collections::BTreeSet;

use crate::{
    catalog::Catalog,
    flow::action::Action,
    formatting::escape_html,
    messaging::types::{InlineButton, InlineKeyboard},
};

pub const CATEGORY_PROMPT: &str = "Choose a category:";
pub const UNSUBSCRIBED: &str = "✅ You have unsubscribed from daily updates.\nHope to see you soon!";
pub const ALREADY_UNSUBSCRIBED: &str = "You've already been unsubscribed";
pub const SESSION_EXPIRED: &str = "Session expired, please send /start";
pub const UNKNOWN_ACTION: &str = "This button is no longer available";
pub const FETCH_FAILED: &str =
    "⚠️ Couldn't fetch news right now. Tap ✅ Done to try again.";
pub const COMMAND_HINT: &str = "Send /start to pick a news category.";
pub const GENERIC_FAILURE: &str = "⚠️ Something went wrong, please try again.";

const SELECTED_MARK: &str = "✅ ";

pub fn category_keyboard(catalog: &Catalog) -> InlineKeyboard {
    InlineKeyboard::one_per_row(catalog.categories().map(|c| {
        InlineButton::new(c, Action::SelectCategory(c.to_string()).callback_data())
    }))
}

pub fn source_prompt(category: &str) -> String {
    format!(
        "Category: {}\nSelect your preferred sources (tap again to unselect):",
        escape_html(category)
    )
}

/// One toggle button per configured source, then "Done".
pub fn source_keyboard(sources: &[String], selected: &BTreeSet<String>) -> InlineKeyboard {
    InlineKeyboard::one_per_row(sources.iter().map(|s| {
        let label = if selected.contains(s) {
            format!("{SELECTED_MARK}{s}")
        } else {
            s.clone()
        };
        InlineButton::new(label, Action::ToggleSource(s.clone()).callback_data())
    }))
    .push_row(vec![InlineButton::new(
        "✅ Done",
        Action::Done.callback_data(),
    )])
}

pub fn results_keyboard() -> InlineKeyboard {
    InlineKeyboard::default().push_row(vec![
        InlineButton::new("🔄 Start Again", Action::StartAgain.callback_data()),
        InlineButton::new("📅 Schedule", Action::Schedule.callback_data()),
    ])
}

pub fn digest_keyboard() -> InlineKeyboard {
    InlineKeyboard::default().push_row(vec![
        InlineButton::new("❌ Unsubscribe", Action::Unsubscribe.callback_data()),
        InlineButton::new("🔧 Customize", Action::Customize.callback_data()),
    ])
}

pub fn no_news(category: &str) -> String {
    format!(
        "No news found for {} from selected sources.",
        escape_html(category)
    )
}

pub fn unknown_source(category: &str) -> String {
    format!("That source is not offered for {category}")
}
