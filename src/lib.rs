//! chirp - micro-blogging backend core
//!
//! This library implements the tweet lifecycle: validation of candidate
//! tweets against link-aware length rules, publication, a one-way discard
//! transition, ordered listings, and an administrative purge.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface definitions
//! - [`config`] - Layered configuration (file, environment, defaults)
//! - [`error`] - Error taxonomy with boundary mapping
//! - [`logging`] - Tracing setup for the CLI
//! - [`model`] - The `Tweet` entity and its wire shape
//! - [`validation`] - Acceptability rules for candidate tweets
//! - [`metrics`] - Fire-and-forget counter side-channel
//! - [`store`] - `SQLite` persistence behind the `TweetStore` contract
//! - [`service`] - The orchestrating `TweetService`

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod model;
pub mod service;
pub mod store;
pub mod validation;

pub use error::{ChirpError, Result};
pub use metrics::{CounterRecorder, MetricsRecorder, NullRecorder};
pub use model::{
    MIGRATION_EXCLUDED_FLAG, TWEET_MAX_LENGTH, TWEET_MAX_LENGTH_WITH_LINKS, Tweet, TweetDto,
    TweetId,
};
pub use service::TweetService;
pub use store::{SqliteStore, TweetStore};

/// Default database filename
pub const DEFAULT_DB_NAME: &str = "chirp.db";

/// Get the default data directory for chirp
#[must_use]
pub fn default_data_dir() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("chirp")
}

/// Get the default database path
#[must_use]
pub fn default_db_path() -> std::path::PathBuf {
    default_data_dir().join(DEFAULT_DB_NAME)
}
