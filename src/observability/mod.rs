//! Observability: structured logging via `tracing`.
//!
//! Retrieval also reports through the `metrics` facade
//! (`retrieval_requests_total`, `retrieval_candidates_discarded_total`,
//! `retrieval_duration_ms`). No recorder is installed here; embedders of the
//! library choose their own exporter.

mod logging;

pub use logging::{LOG_FILE_ENV, LOG_FORMAT_ENV, LogFormat, LoggingConfig, RUST_LOG_ENV};

use crate::{Error, Result};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

static LOGGING_INIT: OnceLock<()> = OnceLock::new();

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Installs the global `tracing` subscriber.
///
/// Events go to stderr unless a log file is configured, so command output on
/// stdout stays machine-readable.
///
/// # Errors
///
/// Returns an error if logging has already been initialized, the filter
/// directive is invalid, or the log file cannot be opened.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    if LOGGING_INIT.get().is_some() {
        return Err(Error::failed("logging_init", "logging already initialized"));
    }

    let filter = EnvFilter::try_new(&config.filter)
        .map_err(|e| Error::InvalidConfig(format!("log filter '{}': {e}", config.filter)))?;

    let layer: BoxedLayer = match (&config.file, config.format) {
        (Some(log_file), LogFormat::Json) => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(open_log_file(log_file)?)
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        (Some(log_file), LogFormat::Pretty) => tracing_subscriber::fmt::layer()
            .with_writer(open_log_file(log_file)?)
            .with_ansi(false)
            .with_target(true)
            .boxed(),
        (None, LogFormat::Json) => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(io::stderr)
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        (None, LogFormat::Pretty) => tracing_subscriber::fmt::layer()
            .pretty()
            .with_writer(io::stderr)
            .with_target(true)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .try_init()
        .map_err(init_error)?;

    LOGGING_INIT
        .set(())
        .map_err(|()| Error::failed("logging_init", "failed to mark logging initialized"))?;

    tracing::debug!(format = ?config.format, filter = %config.filter, "Logging initialized");
    Ok(())
}

/// Thread-safe file writer for logging.
#[derive(Clone)]
struct LogFileWriter {
    file: Arc<Mutex<File>>,
}

impl Write for LogFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .file
            .lock()
            .map_err(|e| io::Error::other(e.to_string()))?;
        guard.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut guard = self
            .file
            .lock()
            .map_err(|e| io::Error::other(e.to_string()))?;
        guard.flush()
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogFileWriter {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Opens a log file for appending.
fn open_log_file(path: &Path) -> Result<LogFileWriter> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::failed("create_log_dir", e))?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| Error::failed("open_log_file", format!("{}: {e}", path.display())))?;

    Ok(LogFileWriter {
        file: Arc::new(Mutex::new(file)),
    })
}

#[allow(clippy::needless_pass_by_value)]
fn init_error(e: tracing_subscriber::util::TryInitError) -> Error {
    Error::failed("logging_init", e)
}
