//! Logging init for applications embedding enquiries: file under the XDG
//! state dir, or stderr.
//!
//! Both initialisers leave an already-installed global subscriber alone.
//!
//! The file sink exists for hosts (daemons, GUI apps) whose stderr goes
//! nowhere. The subscriber asks for a writer per event; each one is a clone
//! of the single log file handle, and an event whose clone fails is written
//! to stderr instead of being dropped.

use anyhow::Result;
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,url_enquiry=debug";

/// Per-event writer handed out by [`LogFileWriter`].
enum LogSink {
    File(std::fs::File),
    Stderr,
}

impl io::Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            LogSink::File(f) => f.write(buf),
            LogSink::Stderr => io::stderr().lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            LogSink::File(f) => f.flush(),
            LogSink::Stderr => io::stderr().lock().flush(),
        }
    }
}

/// Shares one open log file across events.
struct LogFileWriter(std::fs::File);

impl<'a> MakeWriter<'a> for LogFileWriter {
    type Writer = LogSink;

    fn make_writer(&'a self) -> Self::Writer {
        self.0
            .try_clone()
            .map(LogSink::File)
            .unwrap_or(LogSink::Stderr)
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Log to `~/.local/state/url-enquiry/url-enquiry.log`.
///
/// Returns Err when the log dir is unwritable or a subscriber is already set;
/// callers can fall back to [`init_logging_stderr`].
pub fn init_logging() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("url-enquiry")?;
    let log_file_path = xdg_dirs.place_state_file("url-enquiry.log")?;

    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(BoxMakeWriter::new(LogFileWriter(file)))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!("url-enquiry logging initialized at {}", log_file_path.display());

    Ok(log_file_path)
}

/// Log to stderr. Returns false if a global subscriber was already installed.
pub fn init_logging_stderr() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init()
        .is_ok()
}
