//! chirp - micro-blogging backend CLI
//!
//! Main entry point. Maps service errors to the boundary contract:
//! client-input errors become a `{message, errorKind}` report with a
//! distinct exit code; discard outcomes are reported as `true`/`false`
//! with a successful exit either way.

use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use tracing::debug;

use chirp::cli::{Cli, Commands, OutputFormat};
use chirp::config::Config;
use chirp::error::{ChirpError, Result};
use chirp::metrics::CounterRecorder;
use chirp::model::TweetDto;
use chirp::service::TweetService;
use chirp::store::SqliteStore;

/// Exit code for client-input errors (the 400-equivalent).
const EXIT_CLIENT_ERROR: i32 = 2;

fn main() {
    let cli = Cli::parse();
    chirp::logging::init_cli_logging(cli.quiet, cli.verbose);

    if let Err(err) = run(&cli) {
        report_error(&err);
        let code = if err.is_client_error() {
            EXIT_CLIENT_ERROR
        } else {
            1
        };
        std::process::exit(code);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = Config::load();
    let db_path = resolve_db_path(cli, &config)?;
    debug!("Using database at {}", db_path.display());

    let metrics = CounterRecorder::shared();
    let service = TweetService::new(SqliteStore::open(&db_path)?, metrics.clone());

    match &cli.command {
        Commands::Publish(args) => {
            service.publish(&args.publisher, &args.text)?;
            if !cli.quiet {
                println!("{} tweet published", "✓".green());
            }
        }
        Commands::Discard(args) => {
            let affected = service.discard(args.id)?;
            // true/false either way, mirroring the 200-regardless contract.
            println!("{affected}");
        }
        Commands::Show(args) => match service.get_tweet(args.id)? {
            Some(tweet) => match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&tweet)?),
                OutputFormat::Text => print_tweet(&tweet),
            },
            None => println!("{} tweet {} not found", "∅".dimmed(), args.id),
        },
        Commands::List(args) => {
            let dtos = if args.discarded {
                service.list_all_discarded()?
            } else {
                service.list_all_published()?
            };
            print_listing(&dtos, cli.format)?;
        }
        Commands::Purge(args) => {
            if !args.yes {
                return Err(
                    anyhow::anyhow!("purge deletes every tweet; pass --yes to confirm").into(),
                );
            }
            let removed = service.delete_all_tweets()?;
            println!("{removed}");
        }
        Commands::Metrics => {
            // Counters are process-local; outside a long-lived embedding
            // this shows the known counter names with their current values.
            for name in [
                chirp::metrics::METRIC_PUBLISHED_TWEETS,
                chirp::metrics::METRIC_DISCARDED_TWEETS,
                chirp::metrics::METRIC_TIMES_QUERIED_PUBLISHED_TWEETS,
                chirp::metrics::METRIC_TIMES_QUERIED_DISCARDED_TWEETS,
            ] {
                println!("{name} {}", metrics.get(name));
            }
        }
    }

    Ok(())
}

fn resolve_db_path(cli: &Cli, config: &Config) -> Result<PathBuf> {
    let db_path = cli.db.clone().unwrap_or_else(|| config.db_path());
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(db_path)
}

fn print_tweet(tweet: &chirp::model::Tweet) {
    println!("{} {}", "id:".dimmed(), tweet.id);
    println!("{} {}", "publisher:".dimmed(), tweet.publisher);
    println!("{} {}", "tweet:".dimmed(), tweet.text);
    println!("{} {}", "published:".dimmed(), tweet.published_at.to_rfc3339());
    if let Some(discarded_at) = tweet.discarded_at {
        println!("{} {}", "discarded:".dimmed(), discarded_at.to_rfc3339());
    }
}

fn print_listing(dtos: &[TweetDto], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(dtos)?),
        OutputFormat::Text => {
            if dtos.is_empty() {
                println!("{}", "no tweets".dimmed());
            } else {
                for dto in dtos {
                    println!("{:>6}  {}  {}", dto.id, dto.publisher.bold(), dto.tweet);
                }
            }
        }
    }
    Ok(())
}

fn report_error(err: &ChirpError) {
    if err.is_client_error() {
        // The 400-equivalent body shape of the original boundary.
        let body = serde_json::json!({
            "message": err.to_string(),
            "errorKind": err.kind(),
        });
        eprintln!("{body}");
    } else {
        eprintln!("{} {err}", "✗".red().bold());
    }
}
