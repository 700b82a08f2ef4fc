use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ListEditError;

const DEFAULT_SAVE_DELAY_MS: u64 = 3000;
const DEFAULT_OUTCOME_BUFFER: usize = 64;

/// How saves targeting the same item relate to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveOrdering {
    /// Every save runs independently; the last reconciliation to arrive wins.
    #[default]
    Concurrent,
    /// Saves for one item run one at a time, in request order.
    PerItem,
}

impl FromStr for SaveOrdering {
    type Err = ListEditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "concurrent" => Ok(Self::Concurrent),
            "per_item" | "per-item" => Ok(Self::PerItem),
            other => Err(ListEditError::Config(format!(
                "unknown save ordering '{other}' (expected 'concurrent' or 'per_item')"
            ))),
        }
    }
}

impl fmt::Display for SaveOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Concurrent => f.write_str("concurrent"),
            Self::PerItem => f.write_str("per_item"),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Simulated remote store latency.
    pub save_delay: Duration,
    pub save_ordering: SaveOrdering,
    /// Capacity of the save outcome broadcast channel.
    pub outcome_buffer: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            save_delay: Duration::from_millis(DEFAULT_SAVE_DELAY_MS),
            save_ordering: SaveOrdering::default(),
            outcome_buffer: DEFAULT_OUTCOME_BUFFER,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults
    /// for anything unset.
    pub fn from_env() -> Result<Self, ListEditError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env`, reading values through `lookup` instead of the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ListEditError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let save_delay = match lookup("LISTEDIT_SAVE_DELAY_MS") {
            Some(raw) => Duration::from_millis(parse_number("LISTEDIT_SAVE_DELAY_MS", &raw)?),
            None => defaults.save_delay,
        };

        let save_ordering = match lookup("LISTEDIT_SAVE_ORDERING") {
            Some(raw) => raw.parse()?,
            None => defaults.save_ordering,
        };

        let outcome_buffer = match lookup("LISTEDIT_OUTCOME_BUFFER") {
            Some(raw) => parse_number("LISTEDIT_OUTCOME_BUFFER", &raw)?,
            None => defaults.outcome_buffer,
        };
        if outcome_buffer == 0 {
            return Err(ListEditError::Config(
                "LISTEDIT_OUTCOME_BUFFER must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            save_delay,
            save_ordering,
            outcome_buffer,
        })
    }

    pub fn with_save_delay(mut self, delay: Duration) -> Self {
        self.save_delay = delay;
        self
    }

    pub fn with_save_ordering(mut self, ordering: SaveOrdering) -> Self {
        self.save_ordering = ordering;
        self
    }

    /// Log the effective configuration. Nothing here is secret, but the name
    /// matches the other binaries' startup call.
    pub fn log_redacted(&self) {
        tracing::info!(
            save_delay_ms = self.save_delay.as_millis() as u64,
            save_ordering = %self.save_ordering,
            outcome_buffer = self.outcome_buffer,
            "Loaded configuration"
        );
    }
}

fn parse_number<T: FromStr>(key: &str, raw: &str) -> Result<T, ListEditError> {
    raw.trim()
        .parse()
        .map_err(|_| ListEditError::Config(format!("{key} must be a non-negative number, got '{raw}'")))
}
