use std::sync::Arc;

use teloxide::Bot;
use tracing::info;

use newsbot_core::{config::Config, news::HeadlineSource, store::Store};
use newsbot_newsapi::NewsApiClient;
use newsbot_telegram::{router, router::AppState, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    newsbot_core::logging::init("newsbot")?;

    let cfg = Arc::new(Config::load()?);
    let store = Arc::new(Store::open(&cfg.db_path)?);
    info!(db = %store.path().display(), "store ready");

    let headlines: Arc<dyn HeadlineSource> = Arc::new(NewsApiClient::from_config(&cfg)?);
    let bot = Bot::new(cfg.telegram_bot_token.clone());
    let state = Arc::new(AppState::build(cfg.clone(), bot, headlines, store));

    match cfg.webhook_url {
        Some(_) => server::serve(state).await,
        None => router::run_polling(state).await,
    }
}
