//! Selection filter: preferred-source articles first, random backfill after.

use rand::{seq::index, Rng};

use crate::{
    domain::Article,
    matcher::{self, DEFAULT_THRESHOLD},
    news::{fetch_by_category, HeadlineSource, SourceGroups},
    Result,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectionPolicy {
    /// Best-effort lower bound on the result size; never a guarantee.
    pub min_count: usize,
    pub threshold: u8,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            min_count: 5,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Fetch `category` and run [`select_articles`] with a thread-local RNG.
pub async fn filter_news<S: AsRef<str>>(
    upstream: &dyn HeadlineSource,
    sources: &[S],
    category: &str,
    language: &str,
    policy: SelectionPolicy,
) -> Result<Vec<Article>> {
    let groups = fetch_by_category(upstream, category, language).await?;
    Ok(select_articles(&groups, sources, policy, &mut rand::rng()))
}

/// Pick the articles for a digest.
///
/// Every article from a source that fuzzy-matches one of `sources` is kept, in
/// group order. If that yields fewer than `policy.min_count`, the rest is
/// sampled uniformly without replacement from the other articles and appended
/// in sampled order.
pub fn select_articles<S, R>(
    groups: &SourceGroups,
    sources: &[S],
    policy: SelectionPolicy,
    rng: &mut R,
) -> Vec<Article>
where
    S: AsRef<str>,
    R: Rng + ?Sized,
{
    let is_preferred = |name: &str| {
        sources
            .iter()
            .any(|s| matcher::matches(name, s.as_ref(), policy.threshold))
    };

    let (preferred, others): (Vec<_>, Vec<_>) =
        groups.groups().iter().partition(|g| is_preferred(&g.source));

    let mut selected: Vec<Article> = preferred
        .into_iter()
        .flat_map(|g| g.articles.iter().cloned())
        .collect();

    if selected.len() >= policy.min_count {
        return selected;
    }

    let pool: Vec<&Article> = others
        .into_iter()
        .flat_map(|g| g.articles.iter())
        .filter(|a| !selected.iter().any(|p| p.same_story(a)))
        .collect();

    let needed = (policy.min_count - selected.len()).min(pool.len());
    if needed == 0 {
        return selected;
    }

    selected.extend(
        index::sample(rng, pool.len(), needed)
            .into_iter()
            .map(|i| pool[i].clone()),
    );
    selected
}
