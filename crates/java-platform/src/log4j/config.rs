use std::collections::HashMap;
use std::path::Path;

use crate::error::{ConstructionError, FormatError};
use crate::paths::normalize_separators;
use crate::properties::PropertiesFile;

use super::appender::{AppenderDefinition, PatternLayout};
use super::level::TraceLevel;
use super::logger::{LoggerDefinition, NamedLogger, RootLogger, ensure_wired};

/// Complete logging configuration for one JVM service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Log4jConfig {
    root: RootLogger,
    loggers: Vec<NamedLogger>,
}

impl Log4jConfig {
    /// Builds a configuration around the root logger.
    #[must_use]
    pub const fn new(root: RootLogger) -> Self {
        Self {
            root,
            loggers: Vec::new(),
        }
    }

    /// Adds a named logger after those already present.
    #[must_use]
    pub fn with_logger(mut self, logger: NamedLogger) -> Self {
        self.loggers.push(logger);
        self
    }

    /// The root logger.
    #[must_use]
    pub const fn root(&self) -> &RootLogger {
        &self.root
    }

    /// Named loggers in insertion order.
    #[must_use]
    pub fn loggers(&self) -> &[NamedLogger] {
        &self.loggers
    }

    /// Flattens every logger and each distinct appender into one document.
    ///
    /// Logger lines come first (root, then named loggers in order), followed
    /// by appender settings in first-reference order. An appender shared by
    /// several loggers is written once.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::EmptyAppenders`] for an emitting logger without
    /// appenders and [`FormatError::DuplicateAppender`] when one name is bound
    /// to two different appenders.
    pub fn to_properties(&self) -> Result<PropertiesFile, FormatError> {
        let loggers: Vec<&dyn LoggerDefinition> = std::iter::once(&self.root as &dyn LoggerDefinition)
            .chain(self.loggers.iter().map(|logger| logger as &dyn LoggerDefinition))
            .collect();

        let mut file = PropertiesFile::new();
        let mut appenders: Vec<&AppenderDefinition> = Vec::new();
        let mut by_name: HashMap<&str, &AppenderDefinition> = HashMap::new();

        for logger in loggers.iter().copied() {
            ensure_wired(logger)?;
            file.push(logger.property_key(), logger.definition_line());
            for (key, value) in logger.extra_properties() {
                file.push(key, value);
            }
            for appender in logger.appenders() {
                match by_name.get(appender.name()) {
                    Some(existing) if *existing == appender => {}
                    Some(_) => {
                        return Err(FormatError::DuplicateAppender {
                            name: appender.name().to_owned(),
                        });
                    }
                    None => {
                        by_name.insert(appender.name(), appender);
                        appenders.push(appender);
                    }
                }
            }
        }

        for appender in appenders {
            for (key, value) in appender.properties() {
                file.push(key, value);
            }
        }
        Ok(file)
    }

    /// Renders the configuration to a properties file at `path`.
    ///
    /// # Errors
    ///
    /// Propagates [`Log4jConfig::to_properties`] and write failures.
    pub fn write_to_file(&self, path: &Path) -> Result<(), FormatError> {
        self.to_properties()?.write_to_file(path)
    }
}

/// Stock logging layout for a service node.
///
/// The root logger writes `INFO` and above to the console (`stdout`) and to a
/// `server.log` under `logs_dir` that rolls over hourly (`file`).
///
/// # Errors
///
/// Rejects a `logs_dir` that is not valid UTF-8.
pub fn service_log4j_config(logs_dir: &Path) -> Result<Log4jConfig, ConstructionError> {
    let (console, file) = service_appenders(logs_dir)?;
    Ok(Log4jConfig::new(RootLogger::new(TraceLevel::Info, [console, file])))
}

/// [`service_log4j_config`] for a Zookeeper node.
///
/// Per-connection chatter from the NIO server stays at `WARN` and goes to
/// the file only.
///
/// # Errors
///
/// Rejects a `logs_dir` that is not valid UTF-8.
pub fn zookeeper_log4j_config(logs_dir: &Path) -> Result<Log4jConfig, ConstructionError> {
    let (console, file) = service_appenders(logs_dir)?;
    let connections = NamedLogger::new(
        "org.apache.zookeeper.server.NIOServerCnxn",
        TraceLevel::Warn,
        [file.clone()],
    )?
    .with_additivity(false);
    let root = RootLogger::new(TraceLevel::Info, [console, file]);
    Ok(Log4jConfig::new(root).with_logger(connections))
}

fn service_appenders(
    logs_dir: &Path,
) -> Result<(AppenderDefinition, AppenderDefinition), ConstructionError> {
    let logs_text = logs_dir
        .to_str()
        .ok_or_else(|| ConstructionError::InvalidValue {
            field: "logs directory",
            message: format!("'{}' is not valid UTF-8", logs_dir.display()),
        })?;
    let log_file = format!("{}/server.log", normalize_separators(logs_text));

    let console = AppenderDefinition::console("stdout", PatternLayout::default())?;
    let file = AppenderDefinition::daily_rolling_file("file", log_file, PatternLayout::default())?;
    Ok((console, file))
}
