//! SQLite row store for the `news` history log and the `schedules` table.
//!
//! Every public operation opens its own connection, runs inside a single
//! transaction and commits before the connection is dropped. Nothing is held
//! open between user interactions.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};

use crate::{domain::UserId, utils::local_timestamp, Result};

/// A table created lazily from its column schema.
#[derive(Clone, Copy, Debug)]
pub struct Table {
    pub name: &'static str,
    pub schema: &'static str,
}

pub const NEWS_TABLE: Table = Table {
    name: "news",
    schema: r#"
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        uid INTEGER NOT NULL,
        sources TEXT NOT NULL,
        category TEXT NOT NULL,
        schedule TEXT DEFAULT 'No',
        date_added TEXT NOT NULL
    "#,
};

// `uid` is the primary key so scheduling twice updates the one row.
pub const SCHEDULES_TABLE: Table = Table {
    name: "schedules",
    schema: r#"
        uid INTEGER PRIMARY KEY NOT NULL,
        sources TEXT NOT NULL,
        category TEXT NOT NULL,
        first_name TEXT,
        date_added TEXT NOT NULL
    "#,
};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// One active daily-digest subscription.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Subscription {
    pub uid: UserId,
    pub sources: Vec<String>,
    pub category: String,
    pub first_name: Option<String>,
    pub date_added: String,
}

impl Subscription {
    /// New subscription stamped with the current local time.
    pub fn new(
        uid: UserId,
        category: impl Into<String>,
        sources: Vec<String>,
        first_name: Option<String>,
    ) -> Self {
        Self {
            uid,
            sources,
            category: category.into(),
            first_name,
            date_added: local_timestamp(),
        }
    }
}

/// One row of the append-only `news` history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewsLogEntry {
    pub id: i64,
    pub uid: UserId,
    pub sources: Vec<String>,
    pub category: String,
    pub scheduled: bool,
    pub date_added: String,
}

#[derive(Clone, Debug)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    /// Point the store at `path` and create both tables if absent.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let store = Self {
            path: path.as_ref().to_path_buf(),
        };
        store.create_table(&NEWS_TABLE)?;
        store.create_table(&SCHEDULES_TABLE)?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn create_table(&self, table: &Table) -> Result<()> {
        self.with_tx(|tx| {
            tx.execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {} ({})",
                table.name, table.schema
            ))
        })
    }

    /// Append one history row; returns its id.
    pub fn log_news(
        &self,
        uid: UserId,
        sources: &[String],
        category: &str,
        scheduled: bool,
    ) -> Result<i64> {
        let sources = encode_sources(sources);
        let schedule = if scheduled { "Yes" } else { "No" };
        let date_added = local_timestamp();
        self.with_tx(|tx| {
            tx.execute(
                "INSERT INTO news (uid, sources, category, schedule, date_added) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![uid.0, sources, category, schedule, date_added],
            )?;
            Ok(tx.last_insert_rowid())
        })
    }

    pub fn history_for(&self, uid: UserId) -> Result<Vec<NewsLogEntry>> {
        self.with_tx(|tx| {
            let mut stmt = tx.prepare(
                "SELECT id, uid, sources, category, schedule, date_added FROM news WHERE uid = ?1 ORDER BY id",
            )?;
            let rows = stmt
                .query_map(params![uid.0], news_entry_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Insert or replace the subscription keyed by `sub.uid`.
    pub fn upsert_subscription(&self, sub: &Subscription) -> Result<()> {
        let sources = encode_sources(&sub.sources);
        self.with_tx(|tx| {
            tx.execute(
                r#"INSERT INTO schedules (uid, sources, category, first_name, date_added)
                   VALUES (?1, ?2, ?3, ?4, ?5)
                   ON CONFLICT(uid) DO UPDATE SET
                       sources = excluded.sources,
                       category = excluded.category,
                       first_name = COALESCE(excluded.first_name, schedules.first_name),
                       date_added = excluded.date_added"#,
                params![
                    sub.uid.0,
                    sources,
                    sub.category,
                    sub.first_name,
                    sub.date_added
                ],
            )?;
            Ok(())
        })
    }

    pub fn subscription(&self, uid: UserId) -> Result<Option<Subscription>> {
        self.with_tx(|tx| {
            tx.query_row(
                "SELECT uid, sources, category, first_name, date_added FROM schedules WHERE uid = ?1 ORDER BY rowid DESC LIMIT 1",
                params![uid.0],
                subscription_from_row,
            )
            .optional()
        })
    }

    pub fn subscriptions(&self) -> Result<Vec<Subscription>> {
        self.with_tx(|tx| {
            let mut stmt = tx.prepare(
                "SELECT uid, sources, category, first_name, date_added FROM schedules ORDER BY date_added, uid",
            )?;
            let rows = stmt
                .query_map([], subscription_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Remove the subscription for `uid`; returns the number of rows deleted.
    pub fn delete_subscription(&self, uid: UserId) -> Result<usize> {
        self.with_tx(|tx| tx.execute("DELETE FROM schedules WHERE uid = ?1", params![uid.0]))
    }

    fn with_tx<T>(&self, op: impl FnOnce(&Transaction<'_>) -> rusqlite::Result<T>) -> Result<T> {
        let mut conn = Connection::open(&self.path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let tx = conn.transaction()?;
        let out = op(&tx)?;
        tx.commit()?;
        Ok(out)
    }
}

/// Sources are stored as one comma-joined column.
pub fn encode_sources(sources: &[String]) -> String {
    sources.join(", ")
}

pub fn decode_sources(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

fn subscription_from_row(row: &Row<'_>) -> rusqlite::Result<Subscription> {
    let sources: String = row.get(1)?;
    Ok(Subscription {
        uid: UserId(row.get(0)?),
        sources: decode_sources(&sources),
        category: row.get(2)?,
        first_name: row.get(3)?,
        date_added: row.get(4)?,
    })
}

fn news_entry_from_row(row: &Row<'_>) -> rusqlite::Result<NewsLogEntry> {
    let sources: String = row.get(2)?;
    let schedule: Option<String> = row.get(4)?;
    Ok(NewsLogEntry {
        id: row.get(0)?,
        uid: UserId(row.get(1)?),
        sources: decode_sources(&sources),
        category: row.get(3)?,
        scheduled: schedule.as_deref() == Some("Yes"),
        date_added: row.get(5)?,
    })
}

#[cfg(test)]
pub(crate) mod testing {
    use std::path::PathBuf;

    use super::Store;

    /// A store backed by a fresh file under the temp dir, removed on drop.
    pub struct TempStore {
        pub store: Store,
        path: PathBuf,
    }

    impl TempStore {
        pub fn new(name: &str) -> Self {
            let path = std::env::temp_dir().join(format!(
                "newsbot-{}-{name}.db",
                std::process::id()
            ));
            let _ = std::fs::remove_file(&path);
            let store = Store::open(&path).unwrap();
            Self { store, path }
        }
    }

    impl Drop for TempStore {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::TempStore;
    use super::*;

    fn sources(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn scheduling_twice_keeps_one_row_with_latest_sources() {
        let tmp = TempStore::new("upsert");
        let store = &tmp.store;
        let uid = UserId(1001);

        store
            .upsert_subscription(&Subscription::new(
                uid,
                "Technology",
                sources(&["TechCrunch"]),
                Some("Ada".to_string()),
            ))
            .unwrap();
        store
            .upsert_subscription(&Subscription::new(
                uid,
                "Technology",
                sources(&["The Verge", "Wired"]),
                None,
            ))
            .unwrap();

        let all = store.subscriptions().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].sources, sources(&["The Verge", "Wired"]));
        // A missing name does not erase the one we already had.
        assert_eq!(all[0].first_name.as_deref(), Some("Ada"));
        assert_eq!(store.subscription(uid).unwrap().unwrap(), all[0]);
    }

    #[test]
    fn delete_reports_rows_removed() {
        let tmp = TempStore::new("delete");
        let store = &tmp.store;
        let uid = UserId(5);

        assert_eq!(store.delete_subscription(uid).unwrap(), 0);

        store
            .upsert_subscription(&Subscription::new(uid, "Sports", sources(&["ESPN"]), None))
            .unwrap();
        assert_eq!(store.delete_subscription(uid).unwrap(), 1);
        assert_eq!(store.delete_subscription(uid).unwrap(), 0);
        assert!(store.subscription(uid).unwrap().is_none());
    }

    #[test]
    fn news_log_is_append_only() {
        let tmp = TempStore::new("history");
        let store = &tmp.store;
        let uid = UserId(9);

        let first = store
            .log_news(uid, &sources(&["CNN", "Reuters"]), "General", false)
            .unwrap();
        let second = store.log_news(uid, &[], "General", true).unwrap();
        store.log_news(UserId(10), &[], "Health", false).unwrap();

        let history = store.history_for(uid).unwrap();
        assert_eq!(history.len(), 2);
        assert!(second > first);
        assert_eq!(history[0].sources, sources(&["CNN", "Reuters"]));
        assert!(!history[0].scheduled);
        assert!(history[1].sources.is_empty());
        assert!(history[1].scheduled);
    }

    #[test]
    fn reopening_keeps_existing_rows() {
        let tmp = TempStore::new("reopen");
        tmp.store
            .upsert_subscription(&Subscription::new(UserId(3), "Science", vec![], None))
            .unwrap();

        let again = Store::open(tmp.store.path()).unwrap();
        assert_eq!(again.subscriptions().unwrap().len(), 1);
    }

    #[test]
    fn source_column_round_trips_with_whitespace() {
        assert_eq!(
            decode_sources("BBC News, CNN,Reuters , "),
            sources(&["BBC News", "CNN", "Reuters"])
        );
        assert!(decode_sources("").is_empty());
        assert_eq!(encode_sources(&sources(&["A", "B"])), "A, B");
    }

    #[test]
    fn catalog_sources_survive_the_source_column() {
        let catalog = crate::catalog::Catalog::default();
        for category in catalog.categories() {
            let all = catalog.sources_for(category).unwrap().to_vec();
            assert_eq!(decode_sources(&encode_sources(&all)), all, "{category}");
        }
    }
}
