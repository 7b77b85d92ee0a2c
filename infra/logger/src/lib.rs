//! # Logger
//!
//! Tracing setup shared by the relay allowed-list binaries.
//!
//! Console output goes to **stderr** so that stdout stays reserved for machine-readable
//! command output (event lines, JSON listings). An optional rolling file sink writes either
//! plain text or JSON records through a non-blocking worker.
//!
//! Use [`LoggerBuilder::directives`] for module-directed filters
//! (e.g. `"rlist_registry=debug,rlist_storage=info"`); `RUST_LOG` is honoured otherwise.
//!
//! ## Example
//!
//! ```rust
//! # use rlist_logger::{Logger, LevelFilter};
//!
//! let _logger = Logger::builder()
//!     .name("rlist")
//!     .level(LevelFilter::DEBUG)
//!     .init()
//!     .unwrap();
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use private::Sealed;
use std::fs;
use std::io::IsTerminal;
use std::marker::PhantomData;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const DEFAULT_MAX_FILES: usize = 7;
const LOG_FILE_SUFFIX: &str = "log";

#[derive(Debug)]
struct LoggerSettings {
    console: bool,
    directory: Option<PathBuf>,
    level: LevelFilter,
    rotation: Rotation,
    max_files: usize,
    json: bool,
    directives: Option<String>,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            console: true,
            directory: None,
            level: LevelFilter::INFO,
            rotation: Rotation::DAILY,
            max_files: DEFAULT_MAX_FILES,
            json: false,
            directives: None,
        }
    }
}

#[derive(Debug)]
pub struct NoName;
#[derive(Debug)]
pub struct WithName(String);
#[derive(Debug)]
pub struct NoFile;
#[derive(Debug)]
pub struct WithFile;

mod private {
    pub trait Sealed {}
}
impl Sealed for NoName {}
impl Sealed for WithName {}
impl Sealed for NoFile {}
impl Sealed for WithFile {}

/// Builder for the global tracing subscriber.
///
/// A name is required before the logger can be initialized; file-only knobs
/// (`rotation`, `max_files`, `json`) become available once a directory is set.
#[derive(Debug)]
pub struct LoggerBuilder<N: Sealed = NoName, F: Sealed = NoFile> {
    settings: LoggerSettings,
    name: N,
    file_state: PhantomData<F>,
}

impl<F: Sealed> LoggerBuilder<NoName, F> {
    /// Sets the name used as the log file prefix.
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<WithName, F> {
        LoggerBuilder { name: WithName(name.into()), settings: self.settings, file_state: PhantomData }
    }
}

impl LoggerBuilder<WithName, WithFile> {
    /// Maximum number of rotated files kept on disk.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn max_files(mut self, max: usize) -> Self {
        self.settings.max_files = max;
        self
    }

    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn rotation(mut self, rotation: Rotation) -> Self {
        self.settings.rotation = rotation;
        self
    }

    /// Writes file records as JSON objects instead of plain text.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn json(mut self, enabled: bool) -> Self {
        self.settings.json = enabled;
        self
    }
}

impl<F: Sealed> LoggerBuilder<WithName, F> {
    /// Minimum level emitted when no directive matches.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.settings.level = level;
        self
    }

    /// Parses a textual level such as `"debug"` or `"warn"`.
    ///
    /// # Errors
    /// Returns [`LoggerError::InvalidConfiguration`] if `level` is not a known level name.
    pub fn level_name(mut self, level: &str) -> Result<Self, LoggerError> {
        self.settings.level = level.trim().parse().map_err(|_| LoggerError::InvalidConfiguration {
            message: format!("Unknown log level '{level}'").into(),
            context: None,
        })?;
        Ok(self)
    }

    /// Programmatic filter directives (e.g. `rlist_registry=debug`).
    ///
    /// Invalid directives make [`LoggerBuilder::init`] fail.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn directives(mut self, directives: impl Into<String>) -> Self {
        self.settings.directives = Some(directives.into());
        self
    }

    /// Toggles the stderr console sink.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn console(mut self, enabled: bool) -> Self {
        self.settings.console = enabled;
        self
    }

    /// Enables the rolling file sink in `directory`.
    pub fn directory(self, directory: impl Into<PathBuf>) -> LoggerBuilder<WithName, WithFile> {
        let mut settings = self.settings;
        settings.directory = Some(directory.into());
        LoggerBuilder { settings, name: self.name, file_state: PhantomData }
    }

    /// Installs the global tracing subscriber.
    ///
    /// The returned [`Logger`] owns the non-blocking worker guard; keep it alive until
    /// shutdown so buffered file records are flushed.
    ///
    /// # Errors
    /// Returns [`LoggerError::Subscriber`] if a global subscriber has already been set,
    /// [`LoggerError::InvalidConfiguration`] for inconsistent settings and
    /// [`LoggerError::Directory`] / [`LoggerError::Appender`] when the file sink cannot be opened.
    pub fn init(self) -> Result<Logger, LoggerError> {
        let Self { settings, name: WithName(name), .. } = self;
        validate_settings(&settings, &name)?;

        let env_filter = build_env_filter(&settings)?;
        let mut layers = Vec::new();

        if settings.console {
            let ansi = std::io::stderr().is_terminal();
            layers.push(layer().compact().with_writer(std::io::stderr).with_ansi(ansi).boxed());
        }

        let guard = if let Some(directory) = settings.directory {
            fs::create_dir_all(&directory)
                .context(format!("Failed to create log directory {}", directory.display()))?;

            let appender = RollingFileAppender::builder()
                .rotation(settings.rotation)
                .filename_prefix(&name)
                .filename_suffix(LOG_FILE_SUFFIX)
                .max_log_files(settings.max_files)
                .build(&directory)?;

            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file_layer = layer().with_writer(writer).with_ansi(false);
            layers.push(if settings.json { file_layer.json().boxed() } else { file_layer.boxed() });
            Some(guard)
        } else {
            None
        };

        tracing_subscriber::registry().with(env_filter).with(layers).try_init()?;

        Ok(Logger { guard })
    }
}

/// Handle to the installed logging system.
///
/// Holds the file worker guard, if any. Drop it only on shutdown.
#[must_use = "Dropping this handle stops the background log writer."]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    /// Returns a new [`LoggerBuilder`].
    ///
    /// The name prefixes rolling log files (e.g. `rlist.2026-10-16.log`).
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder { settings: LoggerSettings::default(), name: NoName, file_state: PhantomData }
    }

    /// Whether records are also written to a rolling file.
    #[must_use]
    pub const fn writes_file(&self) -> bool {
        self.guard.is_some()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::debug!("Logging system shutting down, flushing buffers");
        }
    }
}

fn validate_settings(settings: &LoggerSettings, name: &str) -> Result<(), LoggerError> {
    if name.trim().is_empty() {
        return Err(LoggerError::InvalidConfiguration {
            message: "Logger name cannot be empty".into(),
            context: None,
        });
    }

    if settings.directory.is_some() && settings.max_files == 0 {
        return Err(LoggerError::InvalidConfiguration {
            message: "max_files must be greater than zero".into(),
            context: None,
        });
    }

    if !settings.console && settings.directory.is_none() {
        return Err(LoggerError::InvalidConfiguration {
            message: "No logging sink enabled. Enable the console or set a log directory.".into(),
            context: None,
        });
    }

    Ok(())
}

fn build_env_filter(settings: &LoggerSettings) -> Result<EnvFilter, LoggerError> {
    let builder = EnvFilter::builder().with_default_directive(settings.level.into());
    settings.directives.as_ref().map_or_else(
        || Ok(builder.from_env_lossy()),
        |directives| {
            builder.parse(directives).map_err(|e| LoggerError::InvalidConfiguration {
                message: format!("Invalid filter directives '{directives}': {e}").into(),
                context: None,
            })
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    #[test]
    fn builder_defaults() {
        let builder = Logger::builder().name("rlist").directives("rlist_registry=debug");
        assert!(builder.settings.console);
        assert_eq!(builder.settings.level, LevelFilter::INFO);
        assert_eq!(builder.settings.directives.as_deref(), Some("rlist_registry=debug"));
        assert!(builder.settings.directory.is_none());
        assert!(!builder.settings.json);
    }

    #[test]
    fn builder_file_settings() {
        let tmp = tempdir().unwrap();
        let builder = Logger::builder()
            .name("rlist")
            .console(false)
            .directory(tmp.path())
            .max_files(3)
            .json(true)
            .rotation(Rotation::HOURLY)
            .level(LevelFilter::DEBUG);

        assert!(!builder.settings.console);
        assert!(builder.settings.json);
        assert_eq!(builder.settings.max_files, 3);
        assert_eq!(builder.settings.level, LevelFilter::DEBUG);
        assert_eq!(builder.settings.directory.as_deref(), Some(tmp.path()));
    }

    #[test]
    fn level_names_are_parsed() {
        let builder = Logger::builder().name("rlist").level_name(" warn ").unwrap();
        assert_eq!(builder.settings.level, LevelFilter::WARN);

        let err = Logger::builder().name("rlist").level_name("loud").unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
        assert!(err.to_string().contains("Unknown log level 'loud'"));
    }

    #[test]
    #[serial]
    fn empty_name_is_rejected_before_install() {
        let err = Logger::builder().name("  ").init().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    #[serial]
    fn disabling_every_sink_is_rejected() {
        let err = Logger::builder().name("rlist").console(false).init().unwrap_err();
        assert!(err.to_string().contains("No logging sink enabled"));
    }

    #[test]
    #[serial]
    fn bad_directives_are_rejected() {
        let err = Logger::builder().name("rlist").directives("rlist=[").init().unwrap_err();
        assert_eq!(err.variant(), "InvalidConfiguration");
    }
}
