//! Category → preferred-source catalog offered in the selection keyboards.

use std::{fs, path::Path};

use serde::Deserialize;

use crate::{errors::Error, Result};

/// Telegram rejects callback data longer than this many bytes.
const MAX_CALLBACK_DATA_LEN: usize = 64;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CategorySources {
    pub name: String,
    pub sources: Vec<String>,
}

/// Ordered list of categories, each with the sources a user may toggle.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    categories: Vec<CategorySources>,
}

impl Default for Catalog {
    fn default() -> Self {
        let entry = |name: &str, sources: &[&str]| CategorySources {
            name: name.to_string(),
            sources: sources.iter().map(|s| s.to_string()).collect(),
        };
        Self {
            categories: vec![
                entry(
                    "General",
                    &["BBC News", "CNN", "Reuters", "Associated Press"],
                ),
                entry("Technology", &["TechCrunch", "The Verge", "Wired"]),
                entry(
                    "Business",
                    &["Bloomberg", "Business Insider", "CBS News"],
                ),
                entry(
                    "Entertainment",
                    &["BuzzFeed", "Entertainment Weekly", "Polygon"],
                ),
                entry("Health", &["Medical News Today", "NBC News", "HuffPost"]),
                entry(
                    "Science",
                    &[
                        "National Geographic",
                        "New Scientist",
                        "Scientific American",
                    ],
                ),
                entry("Sports", &["ESPN", "BBC Sport", "Fox Sports"]),
            ],
        }
    }
}

impl Catalog {
    pub fn new(categories: Vec<CategorySources>) -> Result<Self> {
        let catalog = Self { categories };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog from a JSON file: `[{"name": "...", "sources": ["..."]}]`.
    pub fn load(path: &Path) -> Result<Self> {
        let txt = fs::read_to_string(path)?;
        let catalog: Catalog = serde_json::from_str(&txt)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }

    pub fn sources_for(&self, category: &str) -> Option<&[String]> {
        self.categories
            .iter()
            .find(|c| c.name == category)
            .map(|c| c.sources.as_slice())
    }

    fn validate(&self) -> Result<()> {
        if self.categories.is_empty() {
            return Err(Error::Config("catalog has no categories".to_string()));
        }
        for c in &self.categories {
            if c.name.trim().is_empty() {
                return Err(Error::Config("catalog category name is empty".to_string()));
            }
            if self.categories.iter().filter(|o| o.name == c.name).count() > 1 {
                return Err(Error::Config(format!(
                    "catalog category listed twice: {}",
                    c.name
                )));
            }
            // Callback data is `cat_<name>` / `src_<source>`.
            if c.name.len() + 4 > MAX_CALLBACK_DATA_LEN {
                return Err(Error::Config(format!(
                    "catalog category name too long: {}",
                    c.name
                )));
            }
            // Stored subscriptions keep sources in one comma-joined column.
            if let Some(s) = c.sources.iter().find(|s| {
                s.trim().is_empty() || s.contains(',') || s.len() + 4 > MAX_CALLBACK_DATA_LEN
            }) {
                return Err(Error::Config(format!(
                    "invalid source {s:?} in category {}",
                    c.name
                )));
            }
        }
        Ok(())
    }
}
