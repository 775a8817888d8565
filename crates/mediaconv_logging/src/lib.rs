#![deny(missing_docs)]
//! Shared logging utilities for the mediaconv workspace.
//!
//! This crate provides the `batch_*` logging macros used across the codebase,
//! the active-batch context they prefix every record with, and the
//! `simplelog` initialization used by the binary and by tests.

use std::fmt;
use std::fs::File;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

#[doc(hidden)]
pub use log as __log;

/// Generation of the batch currently being tracked; zero when none is active.
static ACTIVE_BATCH: AtomicU64 = AtomicU64::new(0);

/// Records the generation of the batch the process is currently tracking.
///
/// Only one batch is active at a time: a new batch replaces the previous one.
pub fn set_active_batch(generation: u64) {
    ACTIVE_BATCH.store(generation, Ordering::Relaxed);
}

/// Clears the active batch, e.g. after a reset.
pub fn clear_active_batch() {
    ACTIVE_BATCH.store(0, Ordering::Relaxed);
}

/// Returns the active batch tag used as a log prefix.
pub fn active_batch() -> ActiveBatch {
    ActiveBatch(ACTIVE_BATCH.load(Ordering::Relaxed))
}

/// Display wrapper for the active batch generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveBatch(pub u64);

impl fmt::Display for ActiveBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            0 => write!(f, "-"),
            generation => write!(f, "{generation}"),
        }
    }
}

/// Logs a trace-level message tagged with the active batch.
#[macro_export]
macro_rules! batch_trace {
    ($($arg:tt)*) => {{
        $crate::__log::trace!("[batch {}] {}", $crate::active_batch(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message tagged with the active batch.
#[macro_export]
macro_rules! batch_debug {
    ($($arg:tt)*) => {{
        $crate::__log::debug!("[batch {}] {}", $crate::active_batch(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message tagged with the active batch.
#[macro_export]
macro_rules! batch_info {
    ($($arg:tt)*) => {{
        $crate::__log::info!("[batch {}] {}", $crate::active_batch(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message tagged with the active batch.
#[macro_export]
macro_rules! batch_warn {
    ($($arg:tt)*) => {{
        $crate::__log::warn!("[batch {}] {}", $crate::active_batch(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message tagged with the active batch.
#[macro_export]
macro_rules! batch_error {
    ($($arg:tt)*) => {{
        $crate::__log::error!("[batch {}] {}", $crate::active_batch(), format_args!($($arg)*));
    }};
}

/// Destination for log output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDestination {
    /// Write to the given file, truncating it.
    File(std::path::PathBuf),
    /// Write to the terminal (stderr for warnings and errors).
    Terminal,
    /// Write to both a file and the terminal.
    Both(std::path::PathBuf),
}

/// Initializes the global logger.
///
/// A file that cannot be created is reported on stderr and skipped; the
/// terminal logger (if requested) is still installed. Calling this twice
/// leaves the first logger in place.
pub fn initialize(destination: LogDestination, level: LevelFilter) {
    let config = build_config();

    let loggers: Vec<Box<dyn SharedLogger>> = match destination {
        LogDestination::File(path) => create_file_logger(&path, level, config)
            .into_iter()
            .map(|logger| logger as Box<dyn SharedLogger>)
            .collect(),
        LogDestination::Terminal => vec![TermLogger::new(
            level,
            config,
            TerminalMode::Mixed,
            ColorChoice::Auto,
        )],
        LogDestination::Both(path) => {
            let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
                level,
                config.clone(),
                TerminalMode::Mixed,
                ColorChoice::Auto,
            )];
            if let Some(file_logger) = create_file_logger(&path, level, config) {
                loggers.push(file_logger);
            }
            loggers
        }
    };

    if loggers.is_empty() {
        return;
    }
    let _ = CombinedLogger::init(loggers);
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

fn create_file_logger(
    path: &Path,
    level: LevelFilter,
    config: Config,
) -> Option<Box<WriteLogger<File>>> {
    match File::create(path) {
        Ok(file) => Some(WriteLogger::new(level, config, file)),
        Err(err) => {
            eprintln!("Warning: could not create log file at {path:?}: {err}");
            None
        }
    }
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
