//! Headline fetching: the upstream port and per-source grouping.

use async_trait::async_trait;

use crate::{domain::Article, Result};

/// One headline as reported by the upstream search service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Headline {
    pub source_name: String,
    pub title: String,
    pub url: String,
}

/// Port for the external top-headlines service.
///
/// Implementations map transport and decoding failures into `Error::Upstream`.
#[async_trait]
pub trait HeadlineSource: Send + Sync {
    async fn top_headlines(&self, category: &str, language: &str) -> Result<Vec<Headline>>;
}

/// Articles from one reported source, in upstream order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceGroup {
    pub source: String,
    pub articles: Vec<Article>,
}

/// Articles grouped by source; groups keep the order in which each source
/// first appeared upstream.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceGroups {
    groups: Vec<SourceGroup>,
}

impl SourceGroups {
    pub fn from_headlines(category: &str, headlines: Vec<Headline>) -> Self {
        let mut groups: Vec<SourceGroup> = Vec::new();
        for h in headlines {
            let article = Article {
                source: h.source_name,
                headline: h.title,
                url: h.url,
                category: category.to_string(),
            };
            match groups.iter_mut().find(|g| g.source == article.source) {
                Some(g) => g.articles.push(article),
                None => groups.push(SourceGroup {
                    source: article.source.clone(),
                    articles: vec![article],
                }),
            }
        }
        Self { groups }
    }

    pub fn groups(&self) -> &[SourceGroup] {
        &self.groups
    }

    pub fn total_articles(&self) -> usize {
        self.groups.iter().map(|g| g.articles.len()).sum()
    }
}

/// Fetch the top headlines for `category` and group them by source.
///
/// The upstream is queried with the lowercased category; articles keep the
/// category as the user picked it.
pub async fn fetch_by_category(
    source: &dyn HeadlineSource,
    category: &str,
    language: &str,
) -> Result<SourceGroups> {
    let headlines = source
        .top_headlines(&category.to_lowercase(), language)
        .await?;
    Ok(SourceGroups::from_headlines(category, headlines))
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;
    use crate::errors::Error;

    /// Canned upstream that records the categories it was asked for.
    #[derive(Default)]
    pub struct FakeHeadlines {
        pub headlines: Vec<Headline>,
        pub fail: bool,
        pub calls: Mutex<Vec<(String, String)>>,
    }

    impl FakeHeadlines {
        pub fn with(headlines: Vec<Headline>) -> Self {
            Self {
                headlines,
                ..Default::default()
            }
        }

        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }
    }

    pub fn headline(source: &str, n: usize) -> Headline {
        Headline {
            source_name: source.to_string(),
            title: format!("{source} story {n}"),
            url: format!("https://news.example/{}/{n}", source.to_lowercase().replace(' ', "-")),
        }
    }

    #[async_trait]
    impl HeadlineSource for FakeHeadlines {
        async fn top_headlines(&self, category: &str, language: &str) -> Result<Vec<Headline>> {
            self.calls
                .lock()
                .unwrap()
                .push((category.to_string(), language.to_string()));
            if self.fail {
                return Err(Error::Upstream("news api unavailable".to_string()));
            }
            Ok(self.headlines.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{headline, FakeHeadlines};
    use super::*;

    #[tokio::test]
    async fn groups_by_source_in_first_appearance_order() {
        let fake = FakeHeadlines::with(vec![
            headline("Wired", 1),
            headline("CNN", 1),
            headline("Wired", 2),
            headline("TechCrunch", 1),
        ]);

        let groups = fetch_by_category(&fake, "Technology", "en").await.unwrap();

        let names: Vec<&str> = groups.groups().iter().map(|g| g.source.as_str()).collect();
        assert_eq!(names, vec!["Wired", "CNN", "TechCrunch"]);
        assert_eq!(groups.groups()[0].articles.len(), 2);
        assert_eq!(groups.groups()[0].articles[1].headline, "Wired story 2");
        assert_eq!(groups.total_articles(), 4);
        assert!(groups
            .groups()
            .iter()
            .flat_map(|g| &g.articles)
            .all(|a| a.category == "Technology"));

        let calls = fake.calls.lock().unwrap().clone();
        assert_eq!(calls, vec![("technology".to_string(), "en".to_string())]);
    }

    #[tokio::test]
    async fn upstream_failure_propagates() {
        let fake = FakeHeadlines::failing();
        let err = fetch_by_category(&fake, "Health", "en").await.unwrap_err();
        assert!(matches!(err, crate::Error::Upstream(_)));
    }
}
