//! User-facing output.
//!
//! Distinct from `tracing` diagnostics: this is what commands print. Text
//! goes through a leveled sink; structured results go through a JSON sink
//! that is only connected when `--json` is given.

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::debug;

/// Output severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    /// Troubleshooting detail, shown with `--debug`.
    Debug,
    /// Normal command output.
    Info,
    /// Problems that did not stop the command.
    Warn,
    /// Failures.
    Error,
}

type Sink = Arc<Mutex<dyn Write + Send>>;

/// Cheap-to-clone output handle given to commands.
#[derive(Clone)]
pub struct Logger {
    level: Level,
    leveled: Sink,
    json: Option<Sink>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level)
            .field("json", &self.json.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::discard()
    }
}

impl Logger {
    /// Leveled output to `out`, JSON output discarded.
    pub fn new(level: Level, out: impl Write + Send + 'static) -> Self {
        Self {
            level,
            leveled: Arc::new(Mutex::new(out)),
            json: None,
        }
    }

    /// Route [`Logger::json`] values to `out`.
    #[must_use]
    pub fn with_json(mut self, out: impl Write + Send + 'static) -> Self {
        self.json = Some(Arc::new(Mutex::new(out)));
        self
    }

    /// The CLI's terminal logger. With `json` set, only warnings and errors
    /// are printed as text and results are printed as JSON on stdout.
    pub fn stdout(json: bool, debug: bool) -> Self {
        let level = if json {
            Level::Warn
        } else if debug {
            Level::Debug
        } else {
            Level::Info
        };
        let logger = Self::new(level, io::stdout());
        if json {
            logger.with_json(io::stdout())
        } else {
            logger
        }
    }

    /// Drops everything.
    pub fn discard() -> Self {
        Self::new(Level::Error, io::sink())
    }

    /// Logger recording every message at debug level and every JSON value,
    /// for tests.
    pub fn capture() -> (Self, Captured) {
        let leveled = SharedBuffer::default();
        let json = SharedBuffer::default();
        let logger = Self::new(Level::Debug, leveled.clone()).with_json(json.clone());
        (logger, Captured { leveled, json })
    }

    /// Threshold below which messages are dropped.
    pub fn level(&self) -> Level {
        self.level
    }

    /// Debug message.
    pub fn debug(&self, msg: impl AsRef<str>) {
        self.log(Level::Debug, msg.as_ref());
    }

    /// Normal output.
    pub fn info(&self, msg: impl AsRef<str>) {
        self.log(Level::Info, msg.as_ref());
    }

    /// Warning.
    pub fn warn(&self, msg: impl AsRef<str>) {
        self.log(Level::Warn, msg.as_ref());
    }

    /// Error.
    pub fn error(&self, msg: impl AsRef<str>) {
        self.log(Level::Error, msg.as_ref());
    }

    /// Pretty-printed JSON of `value`, when a JSON sink is connected.
    pub fn json<T: Serialize + ?Sized>(&self, value: &T) {
        let Some(sink) = &self.json else {
            return;
        };
        let mut out = sink.lock();
        let written = serde_json::to_writer_pretty(&mut *out, value)
            .map_err(io::Error::from)
            .and_then(|()| out.write_all(b"\n"))
            .and_then(|()| out.flush());
        if let Err(e) = written {
            debug!(error = %e, "could not write JSON output");
        }
    }

    /// Text that is shown whatever the level, such as help output.
    pub fn print(&self, msg: impl AsRef<str>) {
        self.write_text(msg.as_ref());
    }

    fn log(&self, level: Level, msg: &str) {
        if level >= self.level {
            self.write_text(msg);
        }
    }

    fn write_text(&self, msg: &str) {
        let mut out = self.leveled.lock();
        let mut written = out.write_all(msg.as_bytes());
        if !msg.ends_with('\n') {
            written = written.and_then(|()| out.write_all(b"\n"));
        }
        if let Err(e) = written.and_then(|()| out.flush()) {
            debug!(error = %e, "could not write output");
        }
    }
}

/// Writer backed by a shared in-memory buffer.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    /// Everything written so far.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Output recorded by [`Logger::capture`].
#[derive(Debug, Clone)]
pub struct Captured {
    leveled: SharedBuffer,
    json: SharedBuffer,
}

impl Captured {
    /// Text messages.
    pub fn leveled_output(&self) -> String {
        self.leveled.contents()
    }

    /// JSON values.
    pub fn json_output(&self) -> String {
        self.json.contents()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn messages_end_with_newline() {
        let (logger, out) = Logger::capture();
        logger.info("one");
        logger.info("two\n");
        assert_eq!(out.leveled_output(), "one\ntwo\n");
    }

    #[test]
    fn below_threshold_is_dropped() {
        let buf = SharedBuffer::default();
        let logger = Logger::new(Level::Warn, buf.clone());
        logger.debug("debug");
        logger.info("info");
        logger.warn("warn");
        logger.error("error");
        assert_eq!(buf.contents(), "warn\nerror\n");
    }

    #[test]
    fn print_ignores_threshold() {
        let buf = SharedBuffer::default();
        let logger = Logger::new(Level::Warn, buf.clone());
        logger.print("Usage: meroxa");
        assert_eq!(buf.contents(), "Usage: meroxa\n");
    }

    #[test]
    fn json_is_pretty_printed() {
        let (logger, out) = Logger::capture();
        logger.json(&json!({"name": "pg"}));
        assert_eq!(out.json_output(), "{\n  \"name\": \"pg\"\n}\n");
        assert!(out.leveled_output().is_empty());
    }

    #[test]
    fn json_without_sink_is_dropped() {
        let buf = SharedBuffer::default();
        let logger = Logger::new(Level::Info, buf.clone());
        logger.json(&json!([1, 2]));
        assert!(buf.contents().is_empty());
    }

    #[test]
    fn clones_share_sinks() {
        let (logger, out) = Logger::capture();
        let clone = logger.clone();
        logger.info("a");
        clone.info("b");
        assert_eq!(out.leveled_output(), "a\nb\n");
    }
}
