//! Runtime configuration for the vanity search.

use std::convert::Infallible;
use std::time::Duration;

use clap::{ArgAction, Parser};

use crate::matcher::Position;

/// Longest pattern that fits in an address body.
pub const MAX_PATTERN_LEN: usize = 40;

/// Upper bound on worker threads for one search.
pub const MAX_WORKERS: usize = 1024;

/// Default wall-clock cadence of throughput reports.
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(2);

/// Default timeout of a single coordinator channel poll.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// EVM Vanity Address Generator
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Pattern to search for (hex characters only: 0-9, a-f, A-F)
    pub pattern: String,

    /// Where the pattern must appear: prefix or suffix
    #[arg(default_value = "prefix")]
    pub position: Position,

    /// Case sensitive matching ("true" enables it, anything else disables it)
    #[arg(default_value = "false", action = ArgAction::Set, value_parser = parse_textual_bool)]
    pub case_sensitive: bool,

    /// Number of worker threads (default: number of CPU cores)
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Progress report interval in seconds
    #[arg(short = 'r', long, default_value = "2")]
    pub report_interval: u64,
}

fn parse_textual_bool(value: &str) -> Result<bool, Infallible> {
    Ok(value.eq_ignore_ascii_case("true"))
}

impl Cli {
    /// Returns the number of workers, defaulting to CPU count
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get)
    }

    /// Builds the validated search configuration.
    pub fn search_config(&self) -> Result<SearchConfig, ConfigError> {
        SearchConfig::new(
            self.pattern.clone(),
            self.position,
            self.case_sensitive,
            self.worker_count(),
        )
        .map(|config| config.with_report_interval(Duration::from_secs(self.report_interval.max(1))))
    }
}

/// Immutable parameters of one search run, shared read-only by every worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    pattern: String,
    position: Position,
    case_sensitive: bool,
    worker_count: usize,
    report_interval: Duration,
    poll_interval: Duration,
}

impl SearchConfig {
    /// Creates a validated configuration.
    ///
    /// The pattern keeps the case it was given in; case-insensitive matching
    /// lowers both sides at comparison time.
    pub fn new(
        pattern: impl Into<String>,
        position: Position,
        case_sensitive: bool,
        worker_count: usize,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            pattern: pattern.into(),
            position,
            case_sensitive,
            worker_count,
            report_interval: DEFAULT_REPORT_INTERVAL,
            poll_interval: DEFAULT_POLL_INTERVAL,
        };
        config.validate()?;
        Ok(config)
    }

    /// Overrides the throughput report cadence.
    pub fn with_report_interval(mut self, interval: Duration) -> Self {
        self.report_interval = interval;
        self
    }

    /// Overrides the coordinator poll timeout.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_pattern(&self.pattern)?;

        if self.worker_count == 0 {
            return Err(ConfigError::InvalidWorkerCount);
        }

        if self.worker_count > MAX_WORKERS {
            return Err(ConfigError::TooManyWorkers(self.worker_count));
        }

        Ok(())
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn report_interval(&self) -> Duration {
        self.report_interval
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

/// Checks that a pattern is non-empty hex that fits in an address body.
pub fn validate_pattern(pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern("Pattern cannot be empty".into()));
    }

    if !pattern.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ConfigError::InvalidPattern(format!(
            "'{}' is not valid hex (use only 0-9, a-f)",
            pattern
        )));
    }

    if pattern.len() > MAX_PATTERN_LEN {
        return Err(ConfigError::InvalidPattern(format!(
            "Pattern cannot be longer than {} characters (full address)",
            MAX_PATTERN_LEN
        )));
    }

    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("Worker count must be at least 1")]
    InvalidWorkerCount,

    #[error("Worker count {0} exceeds the maximum of {max}", max = MAX_WORKERS)]
    TooManyWorkers(usize),
}
