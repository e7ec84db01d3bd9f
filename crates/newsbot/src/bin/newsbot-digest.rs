//! Daily digest sender. Runs once and exits; schedule it externally.

use teloxide::Bot;

use newsbot_core::{config::Config, digest::DigestRunner, flow::FlowSettings, store::Store};
use newsbot_newsapi::NewsApiClient;
use newsbot_telegram::router::telegram_messenger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    newsbot_core::logging::init("newsbot_digest")?;

    let cfg = Config::load()?;
    let store = Store::open(&cfg.db_path)?;
    let headlines = NewsApiClient::from_config(&cfg)?;
    let messenger = telegram_messenger(Bot::new(cfg.telegram_bot_token.clone()));
    let settings = FlowSettings::from_config(&cfg);

    let report = DigestRunner {
        store: &store,
        headlines: &headlines,
        messenger: messenger.as_ref(),
        settings: &settings,
    }
    .run()
    .await?;

    if report.failed > 0 {
        let total = report.sent + report.skipped + report.failed;
        anyhow::bail!("{} of {total} digests failed", report.failed);
    }
    Ok(())
}
