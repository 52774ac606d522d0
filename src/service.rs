//! Tweet lifecycle orchestration.
//!
//! Composes the validation rules, the store, and the metrics side-channel.
//! Each operation is one store call inside its own transaction boundary;
//! the service holds no locks and no shared mutable state of its own.

use crate::error::{ChirpError, Result};
use crate::metrics::{
    METRIC_DISCARDED_TWEETS, METRIC_PUBLISHED_TWEETS, METRIC_TIMES_QUERIED_DISCARDED_TWEETS,
    METRIC_TIMES_QUERIED_PUBLISHED_TWEETS, MetricsRecorder,
};
use crate::model::{Tweet, TweetDto, TweetId};
use crate::store::TweetStore;
use crate::validation;
use std::sync::Arc;
use tracing::{debug, info};

/// Orchestrator for publish, discard, retrieve, list, and purge.
pub struct TweetService<S> {
    store: S,
    metrics: Arc<dyn MetricsRecorder>,
}

impl<S: TweetStore> TweetService<S> {
    pub fn new(store: S, metrics: Arc<dyn MetricsRecorder>) -> Self {
        Self { store, metrics }
    }

    /// Access the underlying store (administrative callers).
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Validate and create a new published tweet.
    ///
    /// Validation runs before any side effect: a rejected tweet bumps no
    /// counter and touches no row.
    ///
    /// # Errors
    ///
    /// Returns a validation error for unacceptable input, or a database
    /// error if the insert fails.
    pub fn publish(&self, publisher: &str, text: &str) -> Result<()> {
        validation::validate(publisher, text)?;

        self.metrics.increment(METRIC_PUBLISHED_TWEETS, 1);
        let id = self.store.create(publisher, text)?;
        debug!(id, publisher, "Published tweet");
        Ok(())
    }

    /// Move a tweet from published to discarded, at most once.
    ///
    /// Returns `true` when exactly one row was affected; `false` covers
    /// both "not found" and "already discarded" uniformly.
    ///
    /// # Errors
    ///
    /// Returns `MissingIdentifier` when `id` is absent, or a database error.
    pub fn discard(&self, id: Option<TweetId>) -> Result<bool> {
        // The counter bumps before the id is even checked. Inherited
        // behavior, pinned by the test suite: the attempt is counted,
        // not the outcome. See DESIGN.md.
        self.metrics.increment(METRIC_DISCARDED_TWEETS, 1);

        let Some(id) = id else {
            return Err(ChirpError::MissingIdentifier);
        };

        let affected = self.store.conditional_discard(id)?;
        debug!(id, affected, "Discard attempt");
        Ok(affected == 1)
    }

    /// Fetch a tweet by id. Read-only, no counter.
    ///
    /// # Errors
    ///
    /// Returns a database error if the lookup fails.
    pub fn get_tweet(&self, id: TweetId) -> Result<Option<Tweet>> {
        self.store.find_by_id(id)
    }

    /// All published tweets, newest first, legacy-flagged rows excluded.
    ///
    /// # Errors
    ///
    /// Returns a database error if the listing fails.
    pub fn list_all_published(&self) -> Result<Vec<TweetDto>> {
        self.metrics.increment(METRIC_TIMES_QUERIED_PUBLISHED_TWEETS, 1);
        let tweets = self.store.list_by_state(false)?;
        Ok(tweets.iter().map(TweetDto::from).collect())
    }

    /// All discarded tweets, most recently discarded first, legacy-flagged
    /// rows excluded.
    ///
    /// # Errors
    ///
    /// Returns a database error if the listing fails.
    pub fn list_all_discarded(&self) -> Result<Vec<TweetDto>> {
        self.metrics.increment(METRIC_TIMES_QUERIED_DISCARDED_TWEETS, 1);
        let tweets = self.store.list_by_state(true)?;
        Ok(tweets.iter().map(TweetDto::from).collect())
    }

    /// Administrative purge: delete every tweet. No validation, no counter.
    ///
    /// # Errors
    ///
    /// Returns a database error if the delete fails.
    pub fn delete_all_tweets(&self) -> Result<usize> {
        let removed = self.store.delete_all()?;
        info!(removed, "Deleted all tweets");
        Ok(removed)
    }
}
