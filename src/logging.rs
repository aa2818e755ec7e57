//! Structured logging setup
//!
//! Logging goes through `tracing`. This module turns the configured level,
//! format and the verbose/debug switches into a `tracing-subscriber` pipeline:
//! - `console`: human-readable multi-field lines
//! - `compact`: single-line output without targets
//! - `json`: one JSON object per event for log aggregators
//!
//! `RUST_LOG` wins over the configured level when it is set.

use crate::error::{AppError, Result};
use crate::models::Config;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable console format
    #[default]
    Console,
    /// JSON format for structured logging
    Json,
    /// Compact single-line format
    Compact,
}

impl FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "console" | "pretty" | "text" => Ok(Self::Console),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            _ => Err(AppError::parse(format!("Invalid log format: {}", s))),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Console => "console",
            Self::Json => "json",
            Self::Compact => "compact",
        };
        f.write_str(name)
    }
}

/// Filter directive derived from the configuration.
///
/// `--debug` forces `trace`, `--verbose` forces `debug`, otherwise the
/// configured level is used as-is.
pub fn filter_directive(config: &Config) -> String {
    if config.debug {
        "trace".to_string()
    } else if config.verbose {
        "debug".to_string()
    } else {
        config.log_level.clone()
    }
}

/// Build the env filter, preferring `RUST_LOG` when present
fn build_filter(directive: &str) -> Result<EnvFilter> {
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
    }
    EnvFilter::try_new(directive)
        .map_err(|e| AppError::config(format!("Invalid log level '{}': {}", directive, e)))
}

/// Install the global subscriber. Calling it twice is harmless; the second
/// call keeps the existing subscriber.
pub fn init_logging(config: &Config) -> Result<()> {
    let filter = build_filter(&filter_directive(config))?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match config.log_format {
        LogFormat::Console => builder.with_target(true).try_init(),
        LogFormat::Compact => builder.compact().with_target(false).try_init(),
        LogFormat::Json => builder
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .try_init(),
    };

    if installed.is_err() {
        tracing::debug!("Global tracing subscriber already initialized, skipping");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("console".parse::<LogFormat>().unwrap(), LogFormat::Console);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(" compact ".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_log_format_display_roundtrips() {
        for format in [LogFormat::Console, LogFormat::Json, LogFormat::Compact] {
            assert_eq!(format.to_string().parse::<LogFormat>().unwrap(), format);
        }
    }

    #[test]
    fn test_filter_directive_precedence() {
        let mut config = Config {
            log_level: "warn".to_string(),
            ..Config::default()
        };
        assert_eq!(filter_directive(&config), "warn");

        config.verbose = true;
        assert_eq!(filter_directive(&config), "debug");

        config.debug = true;
        assert_eq!(filter_directive(&config), "trace");
    }

    #[test]
    fn test_init_logging_twice_is_ok() {
        let config = Config::default();
        assert!(init_logging(&config).is_ok());
        assert!(init_logging(&config).is_ok());
    }
}
