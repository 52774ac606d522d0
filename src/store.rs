//! `SQLite` persistence for tweets.
//!
//! One table keyed by rowid, with an explicit schema instead of any ORM
//! mapping. Timestamps are stored as fixed-width RFC 3339 UTC text so that
//! lexicographic `ORDER BY` is chronological.

use crate::error::Result;
use crate::model::{MIGRATION_EXCLUDED_FLAG, Tweet, TweetId};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, params};
use std::path::Path;
use tracing::info;

const SCHEMA_VERSION: i32 = 1;

/// Persistence contract for the tweet lifecycle.
///
/// Exactly five operations; every one executes as a single SQL statement,
/// so each call is its own transaction boundary.
pub trait TweetStore {
    /// Insert a new published tweet. The store assigns the id and the
    /// publication timestamp. Returns the assigned id.
    fn create(&self, publisher: &str, text: &str) -> Result<TweetId>;

    /// Fetch a tweet by id, `None` if absent.
    fn find_by_id(&self, id: TweetId) -> Result<Option<Tweet>>;

    /// Atomically mark a tweet discarded: one guarded UPDATE matching
    /// `id = ? AND discarded = false`. Returns the number of rows affected
    /// (0 or 1). Under concurrent calls for the same id, at most one caller
    /// observes 1.
    fn conditional_discard(&self, id: TweetId) -> Result<usize>;

    /// All tweets in the given state, excluding rows whose migration flag
    /// carries the legacy sentinel. Published tweets come back newest-first
    /// by publication time; discarded tweets newest-first by discard time.
    /// Timestamp ties break in store-defined order.
    fn list_by_state(&self, discarded: bool) -> Result<Vec<Tweet>>;

    /// Delete every tweet unconditionally. Returns the count removed.
    fn delete_all(&self) -> Result<usize>;
}

fn to_stored_timestamp(dt: DateTime<Utc>) -> String {
    // Fixed width keeps string comparison equal to time comparison.
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_stored_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
}

/// `SQLite`-backed tweet store.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open or create the database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(db_path.as_ref())?;

        // Set pragmas for performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
            ",
        )?;

        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be initialized.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
            ",
        )?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Get a reference to the underlying database connection.
    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }

    fn migrate(&self) -> Result<()> {
        let current_version = self.get_schema_version();

        if current_version < SCHEMA_VERSION {
            info!(
                "Migrating database from version {} to {}",
                current_version, SCHEMA_VERSION
            );
            self.create_schema()?;
            self.set_schema_version(SCHEMA_VERSION)?;
        }

        Ok(())
    }

    fn get_schema_version(&self) -> i32 {
        let result: std::result::Result<i32, _> = self.conn.query_row(
            "SELECT value FROM meta WHERE key = 'schema_version'",
            [],
            |row| {
                let value: String = row.get(0)?;
                Ok(value.parse().unwrap_or(0))
            },
        );

        // Treat missing schema table as version 0.
        result.unwrap_or_default()
    }

    fn set_schema_version(&self, version: i32) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO meta (key, value) VALUES ('schema_version', ?)",
            params![version.to_string()],
        )?;
        Ok(())
    }

    fn create_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r"
            -- Metadata table
            CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            -- Tweets
            CREATE TABLE IF NOT EXISTS tweets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                publisher TEXT NOT NULL,
                text TEXT NOT NULL,
                discarded INTEGER NOT NULL DEFAULT 0,
                published_at TEXT NOT NULL,
                discarded_at TEXT,
                pre2015_migration_status INTEGER NOT NULL DEFAULT 0
            );
            CREATE INDEX IF NOT EXISTS idx_tweets_published_at
                ON tweets(discarded, published_at);
            CREATE INDEX IF NOT EXISTS idx_tweets_discarded_at
                ON tweets(discarded, discarded_at);
            ",
        )?;

        Ok(())
    }

    fn row_to_tweet(row: &rusqlite::Row<'_>) -> rusqlite::Result<Tweet> {
        let discarded_at: Option<String> = row.get(5)?;
        Ok(Tweet {
            id: row.get(0)?,
            publisher: row.get(1)?,
            text: row.get(2)?,
            discarded: row.get::<_, i32>(3)? != 0,
            published_at: parse_stored_timestamp(&row.get::<_, String>(4)?),
            discarded_at: discarded_at.as_deref().map(parse_stored_timestamp),
            pre2015_migration_status: row.get(6)?,
        })
    }
}

impl TweetStore for SqliteStore {
    fn create(&self, publisher: &str, text: &str) -> Result<TweetId> {
        self.conn.execute(
            r"
            INSERT INTO tweets (publisher, text, discarded, published_at, pre2015_migration_status)
            VALUES (?, ?, 0, ?, 0)
            ",
            params![publisher, text, to_stored_timestamp(Utc::now())],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn find_by_id(&self, id: TweetId) -> Result<Option<Tweet>> {
        let result = self.conn.query_row(
            r"
            SELECT id, publisher, text, discarded, published_at, discarded_at,
                   pre2015_migration_status
            FROM tweets WHERE id = ?
            ",
            params![id],
            Self::row_to_tweet,
        );

        match result {
            Ok(tweet) => Ok(Some(tweet)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn conditional_discard(&self, id: TweetId) -> Result<usize> {
        // Single guarded UPDATE, never a read-then-write pair: under
        // concurrent calls at most one of them matches the discarded = 0 row.
        let affected = self.conn.execute(
            "UPDATE tweets SET discarded = 1, discarded_at = ? WHERE id = ? AND discarded = 0",
            params![to_stored_timestamp(Utc::now()), id],
        )?;
        Ok(affected)
    }

    fn list_by_state(&self, discarded: bool) -> Result<Vec<Tweet>> {
        let order_column = if discarded {
            "discarded_at"
        } else {
            "published_at"
        };
        let query = format!(
            r"
            SELECT id, publisher, text, discarded, published_at, discarded_at,
                   pre2015_migration_status
            FROM tweets
            WHERE discarded = ? AND pre2015_migration_status != ?
            ORDER BY {order_column} DESC
            "
        );

        let mut stmt = self.conn.prepare(&query)?;
        let tweets = stmt
            .query_map(
                params![i32::from(discarded), MIGRATION_EXCLUDED_FLAG],
                Self::row_to_tweet,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(tweets)
    }

    fn delete_all(&self) -> Result<usize> {
        let removed = self.conn.execute("DELETE FROM tweets", [])?;
        info!("Purged {} tweets", removed);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SqliteStore {
        SqliteStore::open_memory().unwrap()
    }

    #[test]
    fn create_assigns_increasing_ids() {
        let store = store();
        let first = store.create("Yo", "Tweet 1").unwrap();
        let second = store.create("Yo", "Tweet 2").unwrap();
        assert!(second > first);
    }

    #[test]
    fn find_by_id_returns_stored_row() {
        let store = store();
        let id = store.create("Guybrush", "mighty pirate").unwrap();

        let tweet = store.find_by_id(id).unwrap().unwrap();
        assert_eq!(tweet.id, id);
        assert_eq!(tweet.publisher, "Guybrush");
        assert_eq!(tweet.text, "mighty pirate");
        assert!(!tweet.discarded);
        assert!(tweet.discarded_at.is_none());
        assert_eq!(tweet.pre2015_migration_status, 0);
    }

    #[test]
    fn find_by_id_absent_is_none() {
        let store = store();
        assert!(store.find_by_id(12345).unwrap().is_none());
    }

    #[test]
    fn conditional_discard_affects_exactly_once() {
        let store = store();
        let id = store.create("Yo", "How are you?").unwrap();

        assert_eq!(store.conditional_discard(id).unwrap(), 1);
        assert_eq!(store.conditional_discard(id).unwrap(), 0);

        let tweet = store.find_by_id(id).unwrap().unwrap();
        assert!(tweet.discarded);
        assert!(tweet.discarded_at.is_some());
    }

    #[test]
    fn conditional_discard_missing_row_affects_nothing() {
        let store = store();
        assert_eq!(store.conditional_discard(777).unwrap(), 0);
    }

    #[test]
    fn discarded_at_set_iff_discarded() {
        let store = store();
        let keep = store.create("Yo", "staying").unwrap();
        let drop = store.create("Yo", "going").unwrap();
        store.conditional_discard(drop).unwrap();

        let kept = store.find_by_id(keep).unwrap().unwrap();
        assert!(!kept.discarded && kept.discarded_at.is_none());

        let dropped = store.find_by_id(drop).unwrap().unwrap();
        assert!(dropped.discarded && dropped.discarded_at.is_some());
    }

    #[test]
    fn listings_split_by_state() {
        let store = store();
        let a = store.create("Yo", "a").unwrap();
        let b = store.create("Yo", "b").unwrap();
        store.conditional_discard(a).unwrap();

        let published = store.list_by_state(false).unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].id, b);

        let discarded = store.list_by_state(true).unwrap();
        assert_eq!(discarded.len(), 1);
        assert_eq!(discarded[0].id, a);
    }

    #[test]
    fn listings_exclude_migration_sentinel_rows() {
        let store = store();
        store.create("Yo", "visible").unwrap();
        let hidden = store.create("Yo", "hidden").unwrap();
        store
            .connection()
            .execute(
                "UPDATE tweets SET pre2015_migration_status = ? WHERE id = ?",
                params![MIGRATION_EXCLUDED_FLAG, hidden],
            )
            .unwrap();

        let published = store.list_by_state(false).unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].text, "visible");

        store.conditional_discard(hidden).unwrap();
        assert!(store.list_by_state(true).unwrap().is_empty());
    }

    #[test]
    fn published_listing_is_newest_first() {
        let store = store();
        // Seed distinct timestamps directly so ordering is unambiguous.
        for (text, at) in [
            ("oldest", "2024-01-01T00:00:00.000000Z"),
            ("middle", "2024-06-01T00:00:00.000000Z"),
            ("newest", "2025-01-01T00:00:00.000000Z"),
        ] {
            store
                .connection()
                .execute(
                    "INSERT INTO tweets (publisher, text, discarded, published_at) VALUES ('Yo', ?, 0, ?)",
                    params![text, at],
                )
                .unwrap();
        }

        let texts: Vec<String> = store
            .list_by_state(false)
            .unwrap()
            .into_iter()
            .map(|t| t.text)
            .collect();
        assert_eq!(texts, vec!["newest", "middle", "oldest"]);
    }

    #[test]
    fn identical_timestamps_tie_break_is_store_defined() {
        // Ordering between rows with the same timestamp is deliberately
        // unspecified; only membership is asserted here.
        let store = store();
        for text in ["x", "y"] {
            store
                .connection()
                .execute(
                    "INSERT INTO tweets (publisher, text, discarded, published_at) VALUES ('Yo', ?, 0, '2024-01-01T00:00:00.000000Z')",
                    params![text],
                )
                .unwrap();
        }

        let texts: Vec<String> = store
            .list_by_state(false)
            .unwrap()
            .into_iter()
            .map(|t| t.text)
            .collect();
        assert_eq!(texts.len(), 2);
        assert!(texts.contains(&"x".to_string()));
        assert!(texts.contains(&"y".to_string()));
    }

    #[test]
    fn concurrent_discards_have_exactly_one_winner() {
        use std::sync::{Arc, Barrier};

        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("race.db");
        let id = SqliteStore::open(&db).unwrap().create("Yo", "contested").unwrap();

        let barrier = Arc::new(Barrier::new(8));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let barrier = barrier.clone();
                let db = db.clone();
                std::thread::spawn(move || {
                    let store = SqliteStore::open(&db).unwrap();
                    store
                        .connection()
                        .busy_timeout(std::time::Duration::from_secs(5))
                        .unwrap();
                    barrier.wait();
                    loop {
                        match store.conditional_discard(id) {
                            Ok(affected) => return affected,
                            // SQLITE_BUSY past the timeout under heavy
                            // write contention; retry.
                            Err(crate::error::ChirpError::Database(_)) => {
                                std::thread::yield_now();
                            }
                            Err(e) => panic!("unexpected discard failure: {e}"),
                        }
                    }
                })
            })
            .collect();

        let winners: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(winners, 1);

        let tweet = SqliteStore::open(&db).unwrap().find_by_id(id).unwrap().unwrap();
        assert!(tweet.discarded);
    }

    #[test]
    fn delete_all_reports_count_and_ids_are_not_reused() {
        let store = store();
        store.create("Yo", "one").unwrap();
        let last = store.create("Yo", "two").unwrap();

        assert_eq!(store.delete_all().unwrap(), 2);
        assert!(store.list_by_state(false).unwrap().is_empty());

        // AUTOINCREMENT keeps ids monotonic across a purge.
        let next = store.create("Yo", "three").unwrap();
        assert!(next > last);
    }

    #[test]
    fn stored_timestamps_are_fixed_width() {
        let stamp = to_stored_timestamp(Utc::now());
        assert_eq!(stamp.len(), "2024-01-01T00:00:00.000000Z".len());
        assert!(stamp.ends_with('Z'));
    }
}
