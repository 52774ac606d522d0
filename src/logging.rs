//! Logging setup for chirp.
//!
//! Uses the `tracing` ecosystem. The CLI runs with a compact, untimed
//! format; `RUST_LOG` always wins over the configured level.

use tracing_subscriber::{
    EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level to display.
    pub level: LogLevel,
    /// Include timestamps in log output.
    pub timestamps: bool,
    /// Include target (module path) in log output.
    pub target: bool,
    /// Enable ANSI colors in output.
    pub colors: bool,
}

/// Log level configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
    Off,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            timestamps: false,
            target: false,
            colors: true,
        }
    }
}

impl LogConfig {
    /// Create a config for quiet mode (errors only).
    #[must_use]
    pub const fn quiet() -> Self {
        Self {
            level: LogLevel::Error,
            timestamps: false,
            target: false,
            colors: true,
        }
    }

    /// Create a config for verbose mode (debug level).
    #[must_use]
    pub const fn verbose() -> Self {
        Self {
            level: LogLevel::Debug,
            timestamps: true,
            target: true,
            colors: true,
        }
    }
}

impl LogLevel {
    /// Convert to env filter directive string.
    const fn to_filter_string(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
            Self::Off => "off",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" | "e" => Ok(Self::Error),
            "warn" | "warning" | "w" => Ok(Self::Warn),
            "info" | "i" => Ok(Self::Info),
            "debug" | "d" => Ok(Self::Debug),
            "trace" | "t" => Ok(Self::Trace),
            "off" | "none" | "quiet" => Ok(Self::Off),
            _ => Err(format!("Invalid log level: {s}")),
        }
    }
}

/// Initialize the logging system with the given configuration.
///
/// This should be called once at the start of the application.
/// Subsequent calls will be ignored.
pub fn init_logging(config: &LogConfig) {
    // Check if RUST_LOG is set, use that instead
    let env_filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(format!("chirp={}", config.level.to_filter_string()))
    };

    // Logs go to stderr; stdout is reserved for command output.
    let layer = fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(config.colors)
        .with_target(config.target);

    if config.timestamps {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(layer)
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(layer.without_time())
            .try_init()
            .ok();
    }
}

/// Initialize logging with defaults suitable for CLI use.
pub fn init_cli_logging(quiet: bool, verbose: bool) {
    let config = if quiet {
        LogConfig::quiet()
    } else if verbose {
        LogConfig::verbose()
    } else {
        LogConfig::default()
    };
    init_logging(&config);
}
