//! NewsAPI adapter (top headlines by category).
//!
//! Uses the `v2/top-headlines` endpoint with the key in the `X-Api-Key` header.

use std::time::Duration;

use async_trait::async_trait;
use newsbot_core::{
    config::Config,
    errors::Error,
    news::{Headline, HeadlineSource},
    Result,
};
use serde::Deserialize;
use tracing::debug;

#[derive(Clone, Debug)]
pub struct NewsApiClient {
    api_key: String,
    base_url: String,
    http: reqwest::Client,
}

impl NewsApiClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("news api client build error: {e}")))?;
        Ok(Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::new(&cfg.news_api_key, &cfg.news_api_base_url, cfg.http_timeout)
    }

    fn endpoint(&self) -> String {
        format!("{}/v2/top-headlines", self.base_url)
    }
}

#[async_trait]
impl HeadlineSource for NewsApiClient {
    async fn top_headlines(&self, category: &str, language: &str) -> Result<Vec<Headline>> {
        let resp = self
            .http
            .get(self.endpoint())
            .header("X-Api-Key", &self.api_key)
            .query(&[("category", category), ("language", language)])
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("news api request error: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| Error::Upstream(format!("news api read error: {e}")))?;

        if !status.is_success() {
            return Err(Error::Upstream(format!(
                "news api request failed: {status} {}",
                api_error_message(&body)
            )));
        }

        let headlines = parse_top_headlines(&body)?;
        debug!(category, count = headlines.len(), "fetched top headlines");
        Ok(headlines)
    }
}

#[derive(Debug, Deserialize)]
struct TopHeadlinesResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
struct RawArticle {
    #[serde(default)]
    source: Option<RawSource>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    #[serde(default)]
    name: Option<String>,
}

/// Decode a top-headlines response body.
///
/// Entries without a source name, title or url are dropped; NewsAPI marks
/// removed stories with the literal title "[Removed]", which is dropped too.
pub fn parse_top_headlines(body: &str) -> Result<Vec<Headline>> {
    let resp: TopHeadlinesResponse = serde_json::from_str(body)
        .map_err(|e| Error::Upstream(format!("news api json error: {e}")))?;

    if resp.status != "ok" {
        return Err(Error::Upstream(format!(
            "news api returned status {}: {}",
            resp.status,
            resp.message.unwrap_or_default()
        )));
    }

    Ok(resp
        .articles
        .into_iter()
        .filter_map(|a| {
            let source_name = non_empty(a.source.and_then(|s| s.name))?;
            let title = non_empty(a.title).filter(|t| t != "[Removed]")?;
            let url = non_empty(a.url)?;
            Some(Headline {
                source_name,
                title,
                url,
            })
        })
        .collect())
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.chars().take(200).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_articles_and_skips_incomplete_ones() {
        let body = r#"{
            "status": "ok",
            "totalResults": 4,
            "articles": [
                {"source": {"id": "bbc-news", "name": "BBC News"}, "title": "Storm hits coast", "url": "https://bbc.example/1", "description": null},
                {"source": {"id": null, "name": "CNN"}, "title": null, "url": "https://cnn.example/2"},
                {"source": {"id": null, "name": ""}, "title": "Anonymous", "url": "https://x.example/3"},
                {"source": {"id": null, "name": "Reuters"}, "title": "[Removed]", "url": "https://removed.com"},
                {"source": {"id": null, "name": "Reuters"}, "title": "Rates hold", "url": "https://reuters.example/4"}
            ]
        }"#;

        let headlines = parse_top_headlines(body).unwrap();

        assert_eq!(
            headlines,
            vec![
                Headline {
                    source_name: "BBC News".to_string(),
                    title: "Storm hits coast".to_string(),
                    url: "https://bbc.example/1".to_string(),
                },
                Headline {
                    source_name: "Reuters".to_string(),
                    title: "Rates hold".to_string(),
                    url: "https://reuters.example/4".to_string(),
                },
            ]
        );
    }

    #[test]
    fn error_status_is_upstream_failure() {
        let body = r#"{"status":"error","code":"apiKeyInvalid","message":"Your API key is invalid."}"#;
        let err = parse_top_headlines(body).unwrap_err();
        match err {
            Error::Upstream(msg) => assert!(msg.contains("Your API key is invalid.")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(matches!(
            parse_top_headlines("<html>"),
            Err(Error::Upstream(_))
        ));
    }

    #[test]
    fn error_message_falls_back_to_body_prefix() {
        assert_eq!(api_error_message(r#"{"message":"rate limited"}"#), "rate limited");
        assert_eq!(api_error_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn endpoint_ignores_trailing_slash() {
        let client =
            NewsApiClient::new("k", "https://newsapi.org/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.endpoint(), "https://newsapi.org/v2/top-headlines");
    }

    #[tokio::test]
    async fn unreachable_upstream_maps_to_upstream_error() {
        let client =
            NewsApiClient::new("k", "http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let err = client.top_headlines("general", "en").await.unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
    }
}
