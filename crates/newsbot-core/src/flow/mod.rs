//! Conversation state machine: category → source toggles → done →
//! schedule / unsubscribe, re-entrant through "start again".
//!
//! The flow only talks to ports (`MessagingPort`, `HeadlineSource`) plus the
//! row store and the session store, so it can be driven by any adapter.

pub mod action;
pub mod screens;

use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    catalog::Catalog,
    config::Config,
    domain::{ChatId, MessageRef},
    errors::Error,
    filter::{filter_news, SelectionPolicy},
    formatting::{format_article_list, format_schedule_confirmation},
    messaging::{
        port::MessagingPort,
        types::{CallbackQuery, Command, IncomingUpdate},
    },
    news::HeadlineSource,
    session::{Selection, SessionStore},
    store::{Store, Subscription},
    utils::split_message,
    Result,
};

use action::Action;

/// Knobs shared by the interactive flow and the digest run.
#[derive(Clone, Debug)]
pub struct FlowSettings {
    pub policy: SelectionPolicy,
    pub language: String,
    /// Longest message body we send in one piece.
    pub message_limit: usize,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            policy: SelectionPolicy::default(),
            language: "en".to_string(),
            message_limit: 4000,
        }
    }
}

impl FlowSettings {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            policy: SelectionPolicy {
                min_count: cfg.min_articles,
                threshold: cfg.match_threshold,
            },
            language: cfg.news_language.clone(),
            message_limit: cfg
                .telegram_safe_limit
                .min(cfg.telegram_message_limit)
                .max(200),
        }
    }
}

/// Everything the handlers need, injected by the adapter.
#[derive(Clone)]
pub struct FlowDeps {
    pub catalog: Arc<Catalog>,
    pub headlines: Arc<dyn HeadlineSource>,
    pub store: Arc<Store>,
    pub sessions: Arc<SessionStore>,
    pub messenger: Arc<dyn MessagingPort>,
}

pub struct NewsFlow {
    deps: FlowDeps,
    settings: FlowSettings,
}

impl NewsFlow {
    pub fn new(deps: FlowDeps, mut settings: FlowSettings) -> Self {
        let max_len = deps.messenger.capabilities().max_message_len;
        settings.message_limit = settings.message_limit.min(max_len);
        Self { deps, settings }
    }

    pub fn messenger(&self) -> &Arc<dyn MessagingPort> {
        &self.deps.messenger
    }

    pub async fn handle(&self, update: &IncomingUpdate) -> Result<()> {
        match update {
            IncomingUpdate::Command(cmd) => self.handle_command(cmd).await,
            IncomingUpdate::Callback(q) => self.handle_callback(q).await,
        }
    }

    pub async fn handle_command(&self, cmd: &Command) -> Result<()> {
        match cmd.name.as_str() {
            "start" => {
                self.start(cmd.chat_id).await?;
            }
            _ => {
                self.deps
                    .messenger
                    .send_html(cmd.chat_id, screens::COMMAND_HINT, None)
                    .await?;
            }
        }
        Ok(())
    }

    /// Route a button press. A missing session is answered with a restart
    /// hint instead of failing.
    pub async fn handle_callback(&self, q: &CallbackQuery) -> Result<()> {
        let Some(action) = Action::parse(&q.data) else {
            return self.toast(q, screens::UNKNOWN_ACTION).await;
        };

        let res = match action {
            Action::SelectCategory(cat) => self.select_category(q, &cat).await,
            Action::ToggleSource(src) => self.toggle_source(q, &src).await,
            Action::Done => self.done(q).await,
            Action::Schedule => self.schedule(q).await,
            Action::Unsubscribe => self.unsubscribe(q).await,
            Action::StartAgain | Action::Customize => self.start_again(q).await,
        };

        match res {
            Err(Error::SessionMissing(user)) => {
                info!(user_id = user.0, data = %q.data, "selection event without a session");
                self.toast(q, screens::SESSION_EXPIRED).await
            }
            Err(Error::UnknownCategory(cat)) => {
                warn!(user_id = q.user_id.0, category = %cat, "unknown category");
                self.toast(q, screens::UNKNOWN_ACTION).await
            }
            other => other,
        }
    }

    /// Send the category picker.
    pub async fn start(&self, chat_id: ChatId) -> Result<MessageRef> {
        self.deps
            .messenger
            .send_html(
                chat_id,
                screens::CATEGORY_PROMPT,
                Some(screens::category_keyboard(&self.deps.catalog)),
            )
            .await
    }

    pub async fn select_category(&self, q: &CallbackQuery, category: &str) -> Result<()> {
        let sources = self
            .deps
            .catalog
            .sources_for(category)
            .ok_or_else(|| Error::UnknownCategory(category.to_string()))?;

        let selection = self.deps.sessions.begin(q.user_id, category).await;
        self.deps
            .messenger
            .edit_html(
                q.message,
                &screens::source_prompt(category),
                Some(screens::source_keyboard(sources, &selection.sources)),
            )
            .await?;
        self.ack(q).await;
        Ok(())
    }

    pub async fn toggle_source(&self, q: &CallbackQuery, source: &str) -> Result<()> {
        let current = self.deps.sessions.get(q.user_id).await?;
        let offered = self.offered_sources(&current)?;
        // Buttons from an older category keyboard must not leak into this one.
        if !offered.iter().any(|s| s == source) {
            return self.toast(q, &screens::unknown_source(&current.category)).await;
        }

        let selection = self.deps.sessions.toggle(q.user_id, source).await?;
        self.deps
            .messenger
            .edit_keyboard(
                q.message,
                Some(screens::source_keyboard(offered, &selection.sources)),
            )
            .await?;
        self.ack(q).await;
        Ok(())
    }

    pub async fn done(&self, q: &CallbackQuery) -> Result<()> {
        let selection = self.deps.sessions.get(q.user_id).await?;
        let sources = selection.source_list();

        let articles = match filter_news(
            self.deps.headlines.as_ref(),
            &sources,
            &selection.category,
            &self.settings.language,
            self.settings.policy,
        )
        .await
        {
            Ok(v) => v,
            Err(e) => {
                warn!(user_id = q.user_id.0, category = %selection.category, error = %e, "news fetch failed");
                let offered = self.offered_sources(&selection)?;
                self.deps
                    .messenger
                    .edit_html(
                        q.message,
                        screens::FETCH_FAILED,
                        Some(screens::source_keyboard(offered, &selection.sources)),
                    )
                    .await?;
                self.ack(q).await;
                return Ok(());
            }
        };

        if articles.is_empty() {
            self.deps
                .messenger
                .edit_html(q.message, &screens::no_news(&selection.category), None)
                .await?;
            self.ack(q).await;
            return Ok(());
        }

        let list = format_article_list(&articles);
        let text = split_message(&list, self.settings.message_limit)
            .into_iter()
            .next()
            .unwrap_or_default();
        self.deps
            .messenger
            .edit_html(q.message, &text, Some(screens::results_keyboard()))
            .await?;

        self.deps
            .store
            .log_news(q.user_id, &sources, &selection.category, false)?;
        self.deps.store.upsert_subscription(&Subscription::new(
            q.user_id,
            &selection.category,
            sources,
            q.first_name.clone(),
        ))?;

        info!(
            user_id = q.user_id.0,
            category = %selection.category,
            articles = articles.len(),
            "selection done"
        );
        self.ack(q).await;
        Ok(())
    }

    pub async fn schedule(&self, q: &CallbackQuery) -> Result<()> {
        let selection = self.deps.sessions.get(q.user_id).await?;
        let sources = selection.source_list();

        self.deps.store.upsert_subscription(&Subscription::new(
            q.user_id,
            &selection.category,
            sources.clone(),
            q.first_name.clone(),
        ))?;
        self.deps
            .store
            .log_news(q.user_id, &sources, &selection.category, true)?;
        info!(user_id = q.user_id.0, category = %selection.category, "scheduled daily digest");

        self.ack(q).await;
        self.deps
            .messenger
            .send_html(
                q.chat_id,
                &format_schedule_confirmation(&selection.category, &sources),
                None,
            )
            .await?;
        Ok(())
    }

    pub async fn unsubscribe(&self, q: &CallbackQuery) -> Result<()> {
        let removed = self.deps.store.delete_subscription(q.user_id)?;
        if removed == 0 {
            return self.toast(q, screens::ALREADY_UNSUBSCRIBED).await;
        }

        info!(user_id = q.user_id.0, "unsubscribed");
        self.deps.messenger.edit_keyboard(q.message, None).await?;
        self.deps
            .messenger
            .send_html(q.chat_id, screens::UNSUBSCRIBED, None)
            .await?;
        self.ack(q).await;
        Ok(())
    }

    pub async fn start_again(&self, q: &CallbackQuery) -> Result<()> {
        self.ack(q).await;
        self.deps.messenger.edit_keyboard(q.message, None).await?;
        self.start(q.chat_id).await?;
        Ok(())
    }

    fn offered_sources(&self, selection: &Selection) -> Result<&[String]> {
        self.deps
            .catalog
            .sources_for(&selection.category)
            .ok_or_else(|| Error::UnknownCategory(selection.category.clone()))
    }

    /// Stop the client's loading spinner (best-effort).
    async fn ack(&self, q: &CallbackQuery) {
        if let Err(e) = self
            .deps
            .messenger
            .answer_callback_query(&q.callback_id, None)
            .await
        {
            warn!(error = %e, "failed to answer callback query");
        }
    }

    async fn toast(&self, q: &CallbackQuery, text: &str) -> Result<()> {
        self.deps
            .messenger
            .answer_callback_query(&q.callback_id, Some(text))
            .await
    }
}
