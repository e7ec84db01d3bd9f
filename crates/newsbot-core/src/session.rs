use std::collections::{BTreeSet, HashMap};

use tokio::sync::Mutex;

use crate::{domain::UserId, errors::Error, Result};

/// A user's in-progress choice: one category plus the toggled source labels.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub category: String,
    pub sources: BTreeSet<String>,
}

impl Selection {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            sources: BTreeSet::new(),
        }
    }

    /// Flip membership of `source`; returns whether it is now selected.
    pub fn toggle(&mut self, source: &str) -> bool {
        if self.sources.remove(source) {
            false
        } else {
            self.sources.insert(source.to_string());
            true
        }
    }

    pub fn source_list(&self) -> Vec<String> {
        self.sources.iter().cloned().collect()
    }
}

/// Per-user selection sessions, kept in process memory.
///
/// A session lives from a category pick until the next category pick (which
/// replaces it) or process exit.
#[derive(Debug, Default)]
pub struct SessionStore {
    inner: Mutex<HashMap<UserId, Selection>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) a session for `user` with an empty source set.
    pub async fn begin(&self, user: UserId, category: &str) -> Selection {
        let selection = Selection::new(category);
        self.inner.lock().await.insert(user, selection.clone());
        selection
    }

    pub async fn toggle(&self, user: UserId, source: &str) -> Result<Selection> {
        let mut map = self.inner.lock().await;
        let selection = map.get_mut(&user).ok_or(Error::SessionMissing(user))?;
        selection.toggle(source);
        Ok(selection.clone())
    }

    pub async fn get(&self, user: UserId) -> Result<Selection> {
        self.inner
            .lock()
            .await
            .get(&user)
            .cloned()
            .ok_or(Error::SessionMissing(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn toggle_is_its_own_inverse() {
        let store = SessionStore::new();
        let user = UserId(42);
        store.begin(user, "Technology").await;
        store.toggle(user, "Wired").await.unwrap();
        let before = store.get(user).await.unwrap();

        store.toggle(user, "TechCrunch").await.unwrap();
        let after = store.toggle(user, "TechCrunch").await.unwrap();

        assert_eq!(after, before);
        assert_eq!(after.source_list(), vec!["Wired".to_string()]);
    }

    #[tokio::test]
    async fn missing_session_is_an_error() {
        let store = SessionStore::new();
        let err = store.toggle(UserId(7), "CNN").await.unwrap_err();
        assert!(matches!(err, Error::SessionMissing(UserId(7))));
        assert!(matches!(
            store.get(UserId(7)).await,
            Err(Error::SessionMissing(_))
        ));
    }

    #[tokio::test]
    async fn new_category_replaces_previous_session() {
        let store = SessionStore::new();
        let user = UserId(1);
        store.begin(user, "Sports").await;
        store.toggle(user, "ESPN").await.unwrap();

        let fresh = store.begin(user, "Health").await;

        assert_eq!(fresh.category, "Health");
        assert!(fresh.sources.is_empty());
        assert_eq!(store.get(user).await.unwrap(), fresh);
    }
}
