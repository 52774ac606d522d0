//! CLI definitions for chirp.
//!
//! Uses clap for argument parsing with derive macros. The CLI is the
//! boundary in front of the service: it maps validation failures to a
//! `{message, errorKind}` report and discard outcomes to plain
//! `true`/`false`, mirroring the wire contract of the original HTTP layer.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// chirp - micro-blogging backend core
#[derive(Parser, Debug)]
#[command(name = "chirp")]
#[command(version)]
#[command(about = "Publish, discard and list short text posts")]
#[command(long_about = r#"
chirp - a micro-blogging backend core.

Tweets are validated on publish (140-char body once well-formed links are
stripped, 500-char hard limit with links), stored in SQLite, and can later
be moved to a discarded state exactly once. Nothing is physically deleted
except through an explicit purge.

Quick start:
  1. chirp publish "Guybrush" "I am Guybrush Threepwood, mighty pirate."
  2. chirp list
  3. chirp discard <id>
  4. chirp list --discarded
"#)]
pub struct Cli {
    /// Path to the database file
    #[arg(long, env = "CHIRP_DB", global = true)]
    pub db: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Be verbose (show debug info)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Be quiet (suppress non-error output)
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Publish a new tweet
    Publish(PublishArgs),

    /// Discard a published tweet (one-way, idempotent-safe)
    Discard(DiscardArgs),

    /// Show a single tweet by id
    Show(ShowArgs),

    /// List published (default) or discarded tweets
    List(ListArgs),

    /// Delete every tweet (administrative)
    Purge(PurgeArgs),

    /// Show process-local metric counters
    Metrics,
}

#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Author handle
    pub publisher: String,

    /// Tweet text
    pub text: String,
}

#[derive(Args, Debug)]
pub struct DiscardArgs {
    /// Id of the tweet to discard
    pub id: Option<i64>,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Id of the tweet to show
    pub id: i64,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// List discarded tweets instead of published ones
    #[arg(long)]
    pub discarded: bool,
}

#[derive(Args, Debug)]
pub struct PurgeArgs {
    /// Confirm the purge (required)
    #[arg(long)]
    pub yes: bool,
}

/// Output format for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Text,
    /// JSON array
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_publish() {
        let cli = Cli::parse_from(["chirp", "publish", "Yo", "How are you?"]);
        match cli.command {
            Commands::Publish(args) => {
                assert_eq!(args.publisher, "Yo");
                assert_eq!(args.text, "How are you?");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_discard_without_id() {
        let cli = Cli::parse_from(["chirp", "discard"]);
        match cli.command {
            Commands::Discard(args) => assert!(args.id.is_none()),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_list_discarded() {
        let cli = Cli::parse_from(["chirp", "--format", "json", "list", "--discarded"]);
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::List(args) => assert!(args.discarded),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
