//! Data models for the tweet lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum body length of a tweet once well-formed links are stripped.
pub const TWEET_MAX_LENGTH: usize = 140;

/// Hard limit on the raw tweet text, links included.
pub const TWEET_MAX_LENGTH_WITH_LINKS: usize = 500;

/// Sentinel value of the pre-2015 migration flag. Rows carrying it are
/// excluded from both listings (legacy compatibility filter).
pub const MIGRATION_EXCLUDED_FLAG: i64 = 99;

/// Identifier assigned by the store on creation.
pub type TweetId = i64;

/// A stored tweet with its lifecycle state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tweet {
    pub id: TweetId,
    pub publisher: String,
    pub text: String,
    /// Monotonic: flips false -> true exactly once, never back.
    pub discarded: bool,
    /// Set at creation; sort key for the published listing.
    pub published_at: DateTime<Utc>,
    /// Set when `discarded` flips; non-null iff `discarded` is true.
    /// Sort key for the discarded listing.
    pub discarded_at: Option<DateTime<Utc>>,
    /// Legacy filter flag, default 0. Opaque to new logic.
    pub pre2015_migration_status: i64,
}

/// Wire shape returned by the listing operations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TweetDto {
    pub id: TweetId,
    pub publisher: String,
    pub tweet: String,
    pub pre2015_migration_status: i64,
}

impl From<&Tweet> for TweetDto {
    fn from(tweet: &Tweet) -> Self {
        Self {
            id: tweet.id,
            publisher: tweet.publisher.clone(),
            tweet: tweet.text.clone(),
            pre2015_migration_status: tweet.pre2015_migration_status,
        }
    }
}
