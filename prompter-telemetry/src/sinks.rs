//! Logger implementations for common destinations.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{info, warn};

use crate::event::{DEFAULT_PADDING, LogEvent, Logger, format_event};

/// Emits every event as a structured `tracing` record.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, event: &LogEvent<'_>) {
        info!(
            tag = event.tag.unwrap_or_default(),
            role = event.message.role().as_str(),
            idx = event.index,
            chars = event.message.len_chars(),
            "{}",
            event.message.content()
        );
    }
}

/// Prints formatted events to stdout, separated by blank lines.
#[derive(Clone, Debug)]
pub struct PrintLogger {
    padding: String,
}

impl PrintLogger {
    /// Creates a printer using [`DEFAULT_PADDING`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            padding: DEFAULT_PADDING.to_owned(),
        }
    }

    /// Overrides the prefix applied to message lines.
    #[must_use]
    pub fn with_padding(mut self, padding: impl Into<String>) -> Self {
        self.padding = padding.into();
        self
    }
}

impl Default for PrintLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for PrintLogger {
    fn log(&self, event: &LogEvent<'_>) {
        println!("{}\n", format_event(event, &self.padding));
    }
}

/// Writes formatted events to a file, truncating it on creation.
pub struct FileLogger {
    path: PathBuf,
    padding: String,
    writer: Mutex<Option<BufWriter<File>>>,
}

impl fmt::Debug for FileLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileLogger")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl FileLogger {
    /// Creates (or truncates) the log file, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns any I/O error raised while creating the directories or file.
    pub fn create(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(&path)?;
        Ok(Self {
            path,
            padding: DEFAULT_PADDING.to_owned(),
            writer: Mutex::new(Some(BufWriter::new(file))),
        })
    }

    /// Overrides the prefix applied to message lines.
    #[must_use]
    pub fn with_padding(mut self, padding: impl Into<String>) -> Self {
        self.padding = padding.into();
        self
    }

    /// Path of the log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn writer(&self) -> MutexGuard<'_, Option<BufWriter<File>>> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Logger for FileLogger {
    fn log(&self, event: &LogEvent<'_>) {
        let mut guard = self.writer();
        let Some(writer) = guard.as_mut() else {
            return;
        };
        let rendered = format_event(event, &self.padding);
        if let Err(err) = writeln!(writer, "{rendered}\n").and_then(|()| writer.flush()) {
            warn!(path = %self.path.display(), error = %err, "failed to write log event");
        }
    }

    fn close(&self) {
        if let Some(mut writer) = self.writer().take() {
            if let Err(err) = writer.flush() {
                warn!(path = %self.path.display(), error = %err, "failed to flush log file");
            }
        }
    }
}

type LineSink = dyn Fn(&str) + Send + Sync;

/// Hands every formatted event to a closure.
pub struct FnLogger {
    sink: Box<LineSink>,
    padding: String,
}

impl fmt::Debug for FnLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnLogger")
            .field("padding", &self.padding)
            .finish_non_exhaustive()
    }
}

impl FnLogger {
    /// Wraps `sink`.
    #[must_use]
    pub fn new(sink: impl Fn(&str) + Send + Sync + 'static) -> Self {
        Self {
            sink: Box::new(sink),
            padding: DEFAULT_PADDING.to_owned(),
        }
    }

    /// Overrides the prefix applied to message lines.
    #[must_use]
    pub fn with_padding(mut self, padding: impl Into<String>) -> Self {
        self.padding = padding.into();
        self
    }
}

impl Logger for FnLogger {
    fn log(&self, event: &LogEvent<'_>) {
        (self.sink)(&format_event(event, &self.padding));
    }
}

/// Forwards every event to each inner logger in order.
#[derive(Clone, Default)]
pub struct ListLogger {
    loggers: Vec<Arc<dyn Logger>>,
}

impl fmt::Debug for ListLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListLogger")
            .field("loggers", &self.loggers.len())
            .finish()
    }
}

impl ListLogger {
    /// Creates a fan-out over `loggers`.
    #[must_use]
    pub fn new(loggers: Vec<Arc<dyn Logger>>) -> Self {
        Self { loggers }
    }

    /// Adds another logger.
    #[must_use]
    pub fn with(mut self, logger: Arc<dyn Logger>) -> Self {
        self.loggers.push(logger);
        self
    }
}

impl Logger for ListLogger {
    fn log(&self, event: &LogEvent<'_>) {
        for logger in &self.loggers {
            logger.log(event);
        }
    }

    fn close(&self) {
        for logger in &self.loggers {
            logger.close();
        }
    }
}
