//! Typed log4j definitions and their properties rendering.
//!
//! A [`Log4jConfig`] aggregates a root logger, optional named loggers and the
//! appenders they reference. Each logger renders a canonical definition line
//! (`LEVEL,appender,appender`) that log4j uses to wire appenders, so the line
//! must be byte-for-byte reproducible from the same inputs.

mod appender;
mod config;
mod level;
mod logger;

pub use appender::{AppenderDefinition, AppenderKind, ConsoleTarget, PatternLayout};
pub use config::{Log4jConfig, service_log4j_config, zookeeper_log4j_config};
pub use level::{TraceLevel, TraceLevelParseError};
pub use logger::{LoggerDefinition, NamedLogger, RootLogger};
