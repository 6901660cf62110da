//! Logging configuration.

use crate::config::LoggingSettings;
use std::path::PathBuf;

/// Environment variable selecting the log format.
pub const LOG_FORMAT_ENV: &str = "FACTSIEVE_LOG_FORMAT";
/// Environment variable naming a log file.
pub const LOG_FILE_ENV: &str = "FACTSIEVE_LOG_FILE";
/// Standard filter directive variable.
pub const RUST_LOG_ENV: &str = "RUST_LOG";

const DEFAULT_FILTER: &str = "factsieve=warn";
const VERBOSE_FILTER: &str = "factsieve=debug";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable, multi-line output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Parses a format string; anything but "json" is pretty.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Pretty
        }
    }
}

/// Resolved logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// `EnvFilter` directive.
    pub filter: String,
    /// Append to this file instead of stderr.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            filter: DEFAULT_FILTER.to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Builds the config from file settings with environment overrides.
    ///
    /// Precedence, highest first: `RUST_LOG` / `FACTSIEVE_LOG_*`, the config
    /// file, then the `verbose` flag.
    #[must_use]
    pub fn from_settings(settings: &LoggingSettings, verbose: bool) -> Self {
        Self::resolve(settings, verbose, |key| std::env::var(key).ok())
    }

    fn resolve(
        settings: &LoggingSettings,
        verbose: bool,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let format = non_empty(LOG_FORMAT_ENV)
            .or_else(|| settings.format.clone())
            .map_or(LogFormat::Pretty, |f| LogFormat::parse(&f));

        let filter = non_empty(RUST_LOG_ENV)
            .or_else(|| settings.filter.clone())
            .unwrap_or_else(|| {
                if verbose {
                    VERBOSE_FILTER.to_string()
                } else {
                    DEFAULT_FILTER.to_string()
                }
            });

        let file = non_empty(LOG_FILE_ENV)
            .map(PathBuf::from)
            .or_else(|| settings.file.clone());

        Self {
            format,
            filter,
            file,
        }
    }
}
