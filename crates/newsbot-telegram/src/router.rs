use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};

use tokio::sync::Mutex;
use tracing::{error, info, warn};

use newsbot_core::messaging::throttled::{ThrottleConfig, ThrottledMessenger};
use newsbot_core::{
    catalog::Catalog,
    config::Config,
    flow::{screens, FlowDeps, FlowSettings, NewsFlow},
    messaging::{port::MessagingPort, types::IncomingUpdate},
    news::HeadlineSource,
    session::SessionStore,
    store::Store,
};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub bot: Bot,
    pub flow: Arc<NewsFlow>,
    /// Held for the whole handling of one update: events never overlap.
    pub event_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(cfg: Arc<Config>, bot: Bot, flow: NewsFlow) -> Self {
        Self {
            cfg,
            bot,
            flow: Arc::new(flow),
            event_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Wire the production flow: throttled Telegram messenger, fresh session
    /// store, the configured catalog.
    pub fn build(
        cfg: Arc<Config>,
        bot: Bot,
        headlines: Arc<dyn HeadlineSource>,
        store: Arc<Store>,
    ) -> Self {
        let flow = NewsFlow::new(
            FlowDeps {
                catalog: Arc::new(cfg.catalog.clone()),
                headlines,
                store,
                sessions: Arc::new(SessionStore::default()),
                messenger: telegram_messenger(bot.clone()),
            },
            FlowSettings::from_config(&cfg),
        );
        Self::new(cfg, bot, flow)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.cfg.catalog
    }
}

/// Raw Telegram messenger behind a throttling decorator. We still keep a 429
/// RetryAfter retry at the Telegram adapter layer.
pub fn telegram_messenger(bot: Bot) -> Arc<dyn MessagingPort> {
    let raw: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot));
    Arc::new(ThrottledMessenger::new(raw, ThrottleConfig::default()))
}

/// Run one update through the flow under the event lock. Errors stop here:
/// they are logged and the user gets a generic notice.
pub async fn dispatch(state: &AppState, update: IncomingUpdate) {
    let _guard = state.event_lock.lock().await;
    if let Err(e) = state.flow.handle(&update).await {
        let messenger = state.flow.messenger();
        match &update {
            IncomingUpdate::Command(cmd) => {
                error!(user_id = cmd.user_id.0, command = %cmd.name, error = %e, "command failed");
                if let Err(e) = messenger
                    .send_html(cmd.chat_id, screens::GENERIC_FAILURE, None)
                    .await
                {
                    warn!(chat_id = cmd.chat_id.0, error = %e, "failure notice not delivered");
                }
            }
            IncomingUpdate::Callback(q) => {
                error!(user_id = q.user_id.0, data = %q.data, error = %e, "callback failed");
                if let Err(e) = messenger
                    .answer_callback_query(&q.callback_id, Some(screens::GENERIC_FAILURE))
                    .await
                {
                    warn!(chat_id = q.chat_id.0, error = %e, "failure notice not delivered");
                }
            }
        }
    }
}

/// Long-polling mode, used when no webhook URL is configured.
pub async fn run_polling(state: Arc<AppState>) -> anyhow::Result<()> {
    let bot = state.bot.clone();

    // getUpdates is refused while a webhook is registered.
    bot.delete_webhook().await?;
    if let Ok(me) = bot.get_me().await {
        info!(username = %me.username(), "newsbot started (long polling)");
    }
    info!(categories = state.catalog().categories().count(), "catalog loaded");

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
