use crate::error::{ConstructionError, FormatError};
use crate::properties::PropertiesFile;

use super::appender::AppenderDefinition;
use super::level::TraceLevel;

/// Shared capability of root and named loggers.
pub trait LoggerDefinition {
    /// Level at which the logger emits.
    fn level(&self) -> TraceLevel;

    /// Appenders in wiring order.
    fn appenders(&self) -> &[AppenderDefinition];

    /// Properties key carrying the definition line.
    fn property_key(&self) -> String;

    /// Extra logger-scoped settings written after the definition line.
    fn extra_properties(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Level name followed by each appender name, comma-joined without
    /// spaces, in sequence order.
    fn definition_line(&self) -> String {
        let mut line = String::from(self.level().as_str());
        for appender in self.appenders() {
            line.push(',');
            line.push_str(appender.name());
        }
        line
    }

    /// Complete properties describing this logger and its appenders.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::EmptyAppenders`] when the logger is expected to
    /// emit but references no appenders.
    fn full_properties(&self) -> Result<PropertiesFile, FormatError> {
        ensure_wired(self)?;
        let mut file = PropertiesFile::new().with(self.property_key(), self.definition_line());
        for (key, value) in self.extra_properties() {
            file.push(key, value);
        }
        for appender in self.appenders() {
            for (key, value) in appender.properties() {
                file.push(key, value);
            }
        }
        Ok(file)
    }
}

pub(super) fn ensure_wired<L: LoggerDefinition + ?Sized>(logger: &L) -> Result<(), FormatError> {
    if logger.level().emits() && logger.appenders().is_empty() {
        return Err(FormatError::EmptyAppenders {
            logger: logger.property_key(),
            level: logger.level().as_str(),
        });
    }
    Ok(())
}

/// The log4j root logger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootLogger {
    level: TraceLevel,
    appenders: Vec<AppenderDefinition>,
}

impl RootLogger {
    /// Builds the root logger.
    pub fn new(level: TraceLevel, appenders: impl IntoIterator<Item = AppenderDefinition>) -> Self {
        Self {
            level,
            appenders: appenders.into_iter().collect(),
        }
    }
}

impl LoggerDefinition for RootLogger {
    fn level(&self) -> TraceLevel {
        self.level
    }

    fn appenders(&self) -> &[AppenderDefinition] {
        &self.appenders
    }

    fn property_key(&self) -> String {
        String::from("log4j.rootLogger")
    }
}

/// A logger scoped to a class or package name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedLogger {
    name: String,
    level: TraceLevel,
    appenders: Vec<AppenderDefinition>,
    additivity: Option<bool>,
}

impl NamedLogger {
    /// Builds a named logger.
    ///
    /// # Errors
    ///
    /// Rejects an empty logger name.
    pub fn new(
        name: impl Into<String>,
        level: TraceLevel,
        appenders: impl IntoIterator<Item = AppenderDefinition>,
    ) -> Result<Self, ConstructionError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ConstructionError::EmptyField {
                field: "logger name",
            });
        }
        Ok(Self {
            name,
            level,
            appenders: appenders.into_iter().collect(),
            additivity: None,
        })
    }

    /// Sets whether events also propagate to ancestor loggers.
    #[must_use]
    pub const fn with_additivity(mut self, additivity: bool) -> Self {
        self.additivity = Some(additivity);
        self
    }

    /// Logger name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Explicit additivity, when set.
    #[must_use]
    pub const fn additivity(&self) -> Option<bool> {
        self.additivity
    }
}

impl LoggerDefinition for NamedLogger {
    fn level(&self) -> TraceLevel {
        self.level
    }

    fn appenders(&self) -> &[AppenderDefinition] {
        &self.appenders
    }

    fn property_key(&self) -> String {
        format!("log4j.logger.{}", self.name)
    }

    fn extra_properties(&self) -> Vec<(String, String)> {
        self.additivity
            .map(|additivity| {
                vec![(
                    format!("log4j.additivity.{}", self.name),
                    additivity.to_string(),
                )]
            })
            .unwrap_or_default()
    }
}
