use std::path::PathBuf;

use log::LevelFilter;
use mediaconv_logging::LogDestination;

use super::persistence::{Config, LOG_FILE};

/// Routes log records to the terminal, plus `mediaconv.log` when the config
/// asks for a file.
pub fn init(config: &Config, verbose: bool) {
    mediaconv_logging::initialize(destination(config), level(verbose));
}

fn destination(config: &Config) -> LogDestination {
    if config.log_to_file {
        LogDestination::Both(PathBuf::from(LOG_FILE))
    } else {
        LogDestination::Terminal
    }
}

fn level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}
