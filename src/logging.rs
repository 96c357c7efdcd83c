// Stratum Miner - Free and Open Source Software Statement
//
// This project, stratum-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/logging.rs
// Version: 1.0.0
//
// This file sets up log4rs for the stratum miner: a coloured console appender
// and an optional plain file appender, each behind its own threshold filter.
//
// Tree Location:
// - src/logging.rs (logger initialisation)
// - Depends on: log, log4rs

use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::runtime::ConfigErrors;
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::filter::threshold::ThresholdFilter;
use std::path::PathBuf;
use thiserror::Error;

const CONSOLE_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {h({l:<5})} {m}{n}";
const FILE_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} {l:<5} [{t}] {m}{n}";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to open log file: {0}")]
    File(#[from] std::io::Error),

    #[error("invalid logging configuration: {0}")]
    Config(#[from] ConfigErrors),

    #[error("logger already initialised: {0}")]
    Init(#[from] log::SetLoggerError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub console_level: LevelFilter,
    pub file_level: LevelFilter,
    /// Plain-text log file; `None` logs to the console only
    pub file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            console_level: LevelFilter::Info,
            file_level: LevelFilter::Info,
            file: Some(Self::default_log_path()),
        }
    }
}

impl LogSettings {
    /// `<executable>.log` next to the running binary
    pub fn default_log_path() -> PathBuf {
        std::env::current_exe()
            .map(|exe| exe.with_extension("log"))
            .unwrap_or_else(|_| PathBuf::from(concat!(env!("CARGO_PKG_NAME"), ".log")))
    }

    /// Raise both thresholds to at least debug
    pub fn with_debug(mut self) -> Self {
        self.console_level = self.console_level.max(LevelFilter::Debug);
        self.file_level = self.file_level.max(LevelFilter::Debug);
        self
    }

    /// Most verbose level any appender accepts
    pub fn root_level(&self) -> LevelFilter {
        match self.file {
            Some(_) => self.console_level.max(self.file_level),
            None => self.console_level,
        }
    }
}

/// Build the log4rs configuration without installing it
pub fn build_config(settings: &LogSettings) -> Result<Config, LoggingError> {
    let console = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(CONSOLE_PATTERN)))
        .build();
    let mut builder = Config::builder()
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(settings.console_level)))
                .build("console", Box::new(console)),
        )
        // rustls is chatty at debug
        .logger(Logger::builder().build("rustls", LevelFilter::Warn));
    let mut root = Root::builder().appender("console");

    if let Some(path) = &settings.file {
        let file = FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new(FILE_PATTERN)))
            .build(path)?;
        builder = builder.appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(settings.file_level)))
                .build("file", Box::new(file)),
        );
        root = root.appender("file");
    }

    Ok(builder.build(root.build(settings.root_level()))?)
}

/// Install the global logger
pub fn init(settings: &LogSettings) -> Result<log4rs::Handle, LoggingError> {
    let config = build_config(settings)?;
    Ok(log4rs::init_config(config)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn console_only(level: LevelFilter) -> LogSettings {
        LogSettings {
            console_level: level,
            file_level: LevelFilter::Trace,
            file: None,
        }
    }

    #[test]
    fn test_debug_only_raises_levels() {
        let settings = console_only(LevelFilter::Warn).with_debug();
        assert_eq!(settings.console_level, LevelFilter::Debug);
        assert_eq!(settings.file_level, LevelFilter::Trace);
    }

    #[test]
    fn test_root_level_ignores_missing_file() {
        assert_eq!(console_only(LevelFilter::Warn).root_level(), LevelFilter::Warn);
        let with_file = LogSettings {
            file: Some(PathBuf::from("unused.log")),
            ..console_only(LevelFilter::Warn)
        };
        assert_eq!(with_file.root_level(), LevelFilter::Trace);
    }

    #[test]
    fn test_console_only_config() {
        let config = build_config(&console_only(LevelFilter::Info)).unwrap();
        assert_eq!(config.appenders().len(), 1);
        assert_eq!(config.root().level(), LevelFilter::Info);
    }

    #[test]
    fn test_default_log_path_has_log_extension() {
        let path = LogSettings::default_log_path();
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("log"));
    }
}

// Changelog:
// - v1.0.0 (2026-10-16): Initial logger setup.
//   - Console and optional file appenders configured in code, replacing the
//     YAML log4rs config.
//   - Separate console and file thresholds; debug raises both.
