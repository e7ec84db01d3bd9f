//! Daily digest run: one message per stored subscription.
//!
//! Invoked externally (cron, a hosted scheduled task, ...) and runs once to
//! completion. There is no checkpoint; an interrupted run simply sends nothing
//! to the remaining subscribers.

use std::collections::HashMap;

use tracing::{info, warn};

use crate::{
    domain::{Article, ChatId},
    errors::Error,
    filter::select_articles,
    flow::{screens::digest_keyboard, FlowSettings},
    formatting::format_digest,
    messaging::port::MessagingPort,
    news::{fetch_by_category, HeadlineSource, SourceGroups},
    store::{Store, Subscription},
    utils::split_message,
    Result,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DigestReport {
    pub sent: usize,
    /// Subscriptions for which no article was available.
    pub skipped: usize,
    pub failed: usize,
}

pub struct DigestRunner<'a> {
    pub store: &'a Store,
    pub headlines: &'a dyn HeadlineSource,
    pub messenger: &'a dyn MessagingPort,
    pub settings: &'a FlowSettings,
}

enum Outcome {
    Sent,
    Skipped,
}

impl DigestRunner<'_> {
    /// Send every subscriber their digest. Reading the subscriptions is the
    /// only fatal step; a failing row is logged and the loop moves on.
    ///
    /// Headlines are fetched once per category and shared by every row in it;
    /// a failed fetch fails the whole category for this run.
    pub async fn run(&self) -> Result<DigestReport> {
        let subscriptions = self.store.subscriptions()?;
        info!(subscriptions = subscriptions.len(), "digest run started");

        let mut by_category: HashMap<String, Option<SourceGroups>> = HashMap::new();
        let mut report = DigestReport::default();
        for sub in &subscriptions {
            if !by_category.contains_key(&sub.category) {
                let groups = self.fetch(&sub.category).await;
                by_category.insert(sub.category.clone(), groups);
            }
            let outcome = match by_category.get(&sub.category).and_then(Option::as_ref) {
                Some(groups) => {
                    let articles = select_articles(
                        groups,
                        &sub.sources,
                        self.settings.policy,
                        &mut rand::rng(),
                    );
                    self.deliver(sub, &articles).await
                }
                None => Err(Error::Upstream(format!(
                    "headlines unavailable for {}",
                    sub.category
                ))),
            };
            match outcome {
                Ok(Outcome::Sent) => report.sent += 1,
                Ok(Outcome::Skipped) => {
                    info!(user_id = sub.uid.0, category = %sub.category, "no articles, digest skipped");
                    report.skipped += 1;
                }
                Err(e) => {
                    warn!(user_id = sub.uid.0, category = %sub.category, error = %e, "digest delivery failed");
                    report.failed += 1;
                }
            }
        }

        info!(
            sent = report.sent,
            skipped = report.skipped,
            failed = report.failed,
            categories = by_category.len(),
            "digest run finished"
        );
        Ok(report)
    }

    async fn fetch(&self, category: &str) -> Option<SourceGroups> {
        match fetch_by_category(self.headlines, category, &self.settings.language).await {
            Ok(groups) => {
                info!(category, articles = groups.total_articles(), "headlines fetched");
                Some(groups)
            }
            Err(e) => {
                warn!(category, error = %e, "headline fetch failed");
                None
            }
        }
    }

    async fn deliver(&self, sub: &Subscription, articles: &[Article]) -> Result<Outcome> {
        if articles.is_empty() {
            return Ok(Outcome::Skipped);
        }

        let body = format_digest(sub.first_name.as_deref(), articles);
        let limit = self
            .settings
            .message_limit
            .min(self.messenger.capabilities().max_message_len);
        let chunks = split_message(&body, limit);
        let last = chunks.len().saturating_sub(1);
        let chat_id = ChatId::from(sub.uid);
        for (i, chunk) in chunks.iter().enumerate() {
            // Controls go on the final piece only.
            let keyboard = (i == last).then(digest_keyboard);
            self.messenger.send_html(chat_id, chunk, keyboard).await?;
        }
        Ok(Outcome::Sent)
    }
}
