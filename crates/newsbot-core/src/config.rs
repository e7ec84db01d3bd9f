use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{catalog::Catalog, errors::Error, matcher::DEFAULT_THRESHOLD, Result};

/// Typed configuration, read once at process start.
#[derive(Clone, Debug)]
pub struct Config {
    // Credentials
    pub telegram_bot_token: String,
    pub news_api_key: String,

    // Webhook server
    pub webhook_url: Option<String>,
    pub listen_addr: String,

    // Storage
    pub db_path: PathBuf,

    // News API
    pub news_api_base_url: String,
    pub news_language: String,
    pub http_timeout: Duration,

    // Selection
    pub min_articles: usize,
    pub match_threshold: u8,
    pub catalog: Catalog,

    // Telegram limits
    pub telegram_message_limit: usize,
    pub telegram_safe_limit: usize,
}

impl Config {
    /// Read the process environment, after merging a `.env` file if present.
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let vars = Vars(lookup);

        // Required env vars
        let telegram_bot_token = vars.str("TELEGRAM_BOT_TOKEN").unwrap_or_default();
        if telegram_bot_token.trim().is_empty() {
            return Err(Error::Config(
                "TELEGRAM_BOT_TOKEN environment variable is required".to_string(),
            ));
        }
        let news_api_key = vars.str("NEWS_API_KEY").unwrap_or_default();
        if news_api_key.trim().is_empty() {
            return Err(Error::Config(
                "NEWS_API_KEY environment variable is required".to_string(),
            ));
        }

        let webhook_url = vars.str("WEBHOOK_URL").and_then(non_empty);
        let listen_addr = vars.str("LISTEN_ADDR").unwrap_or("0.0.0.0:8080".to_string());

        let db_path = vars
            .path("NEWSBOT_DB_PATH")
            .unwrap_or_else(|| PathBuf::from("newsbot.db"));

        let news_api_base_url = vars
            .str("NEWS_API_BASE_URL")
            .and_then(non_empty)
            .unwrap_or("https://newsapi.org".to_string())
            .trim_end_matches('/')
            .to_string();
        let news_language = vars
            .str("NEWS_LANGUAGE")
            .and_then(non_empty)
            .unwrap_or("en".to_string());
        let http_timeout = Duration::from_secs(vars.u64("HTTP_TIMEOUT_SECS").unwrap_or(10));

        let min_articles = vars.usize("DIGEST_MIN_ARTICLES").unwrap_or(5);
        let match_threshold = vars
            .u32("MATCH_THRESHOLD")
            .map(|t| t.min(100) as u8)
            .unwrap_or(DEFAULT_THRESHOLD);

        let catalog = match vars.path("NEWSBOT_CATALOG_PATH") {
            Some(path) => Catalog::load(&path)?,
            None => Catalog::default(),
        };

        let telegram_message_limit = vars.usize("TELEGRAM_MESSAGE_LIMIT").unwrap_or(4096);
        let telegram_safe_limit = vars.usize("TELEGRAM_SAFE_LIMIT").unwrap_or(4000);

        Ok(Self {
            telegram_bot_token,
            news_api_key,
            webhook_url,
            listen_addr,
            db_path,
            news_api_base_url,
            news_language,
            http_timeout,
            min_articles,
            match_threshold,
            catalog,
            telegram_message_limit,
            telegram_safe_limit,
        })
    }
}

/// Typed reads over a variable lookup; unparsable numbers count as unset.
struct Vars<F>(F);

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    fn str(&self, key: &str) -> Option<String> {
        (self.0)(key)
    }

    fn u64(&self, key: &str) -> Option<u64> {
        self.str(key).and_then(|s| s.trim().parse::<u64>().ok())
    }

    fn u32(&self, key: &str) -> Option<u32> {
        self.str(key).and_then(|s| s.trim().parse::<u32>().ok())
    }

    fn usize(&self, key: &str) -> Option<usize> {
        self.str(key).and_then(|s| s.trim().parse::<usize>().ok())
    }

    fn path(&self, key: &str) -> Option<PathBuf> {
        self.str(key).filter(|v| !v.is_empty()).map(PathBuf::from)
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim().trim_start_matches("export ").trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        out.push((key.to_string(), val));
    }
    out
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn dotenv_parsing_skips_comments_and_strips_quotes() {
        let parsed = parse_dotenv(
            "# creds\nTELEGRAM_BOT_TOKEN=\"123:abc\"\n\nexport NEWS_API_KEY='k'\nbroken line\nNEWSBOT_DB_PATH = /var/lib/newsbot.db\n",
        );
        assert_eq!(
            parsed,
            vec![
                ("TELEGRAM_BOT_TOKEN".to_string(), "123:abc".to_string()),
                ("NEWS_API_KEY".to_string(), "k".to_string()),
                (
                    "NEWSBOT_DB_PATH".to_string(),
                    "/var/lib/newsbot.db".to_string()
                ),
            ]
        );
    }

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    const CREDS: [(&str, &str); 2] = [("TELEGRAM_BOT_TOKEN", "123:abc"), ("NEWS_API_KEY", "k")];

    #[test]
    fn credentials_are_required() {
        let err = Config::from_lookup(lookup(&[("NEWS_API_KEY", "k")])).unwrap_err();
        assert!(matches!(err, Error::Config(m) if m.contains("TELEGRAM_BOT_TOKEN")));

        let err = Config::from_lookup(lookup(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("NEWS_API_KEY", "  "),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(m) if m.contains("NEWS_API_KEY")));
    }

    #[test]
    fn defaults_select_polling_and_builtin_catalog() {
        let cfg = Config::from_lookup(lookup(&CREDS)).unwrap();
        assert_eq!(cfg.webhook_url, None);
        assert_eq!(cfg.listen_addr, "0.0.0.0:8080");
        assert_eq!(cfg.db_path, PathBuf::from("newsbot.db"));
        assert_eq!(cfg.news_api_base_url, "https://newsapi.org");
        assert_eq!(cfg.news_language, "en");
        assert_eq!(cfg.http_timeout, Duration::from_secs(10));
        assert_eq!(cfg.min_articles, 5);
        assert_eq!(cfg.match_threshold, DEFAULT_THRESHOLD);
        assert_eq!(cfg.catalog, Catalog::default());
        assert_eq!(cfg.telegram_safe_limit, 4000);

        let blank =
            Config::from_lookup(lookup(&[CREDS[0], CREDS[1], ("WEBHOOK_URL", " ")])).unwrap();
        assert_eq!(blank.webhook_url, None);
    }

    #[test]
    fn overrides_are_parsed_and_threshold_is_clamped() {
        let cfg = Config::from_lookup(lookup(&[
            CREDS[0],
            CREDS[1],
            ("WEBHOOK_URL", "https://bot.example/webhook"),
            ("NEWS_API_BASE_URL", "http://127.0.0.1:9000/"),
            ("MATCH_THRESHOLD", "250"),
            ("DIGEST_MIN_ARTICLES", "not a number"),
            ("HTTP_TIMEOUT_SECS", " 3 "),
        ]))
        .unwrap();
        assert_eq!(cfg.webhook_url.as_deref(), Some("https://bot.example/webhook"));
        assert_eq!(cfg.news_api_base_url, "http://127.0.0.1:9000");
        assert_eq!(cfg.match_threshold, 100);
        assert_eq!(cfg.min_articles, 5);
        assert_eq!(cfg.http_timeout, Duration::from_secs(3));
    }

    #[test]
    fn unreadable_catalog_path_is_an_error() {
        let missing = env::temp_dir()
            .join(format!("newsbot-no-catalog-{}.json", std::process::id()))
            .to_string_lossy()
            .to_string();
        let res = Config::from_lookup(lookup(&[
            CREDS[0],
            CREDS[1],
            ("NEWSBOT_CATALOG_PATH", missing.as_str()),
        ]));
        assert!(res.is_err());
    }

    #[test]
    fn blank_values_are_treated_as_missing() {
        assert_eq!(non_empty("   ".to_string()), None);
        assert_eq!(non_empty("x".to_string()), Some("x".to_string()));
    }
}
