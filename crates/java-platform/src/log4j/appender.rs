use crate::error::ConstructionError;
use crate::paths::normalize_separators;

const APPENDER_PREFIX: &str = "log4j.appender";
const DEFAULT_PATTERN: &str = "[%d] %p %m (%c)%n";
const DEFAULT_MAX_FILE_SIZE: &str = "10MB";
const DEFAULT_MAX_BACKUP_INDEX: u32 = 10;
const DEFAULT_DATE_PATTERN: &str = "'.'yyyy-MM-dd-HH";

/// Stream a console appender writes to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConsoleTarget {
    /// Standard output.
    #[default]
    SystemOut,
    /// Standard error.
    SystemErr,
}

impl ConsoleTarget {
    const fn as_str(self) -> &'static str {
        match self {
            Self::SystemOut => "System.out",
            Self::SystemErr => "System.err",
        }
    }
}

/// Pattern layout shared by every appender kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternLayout {
    conversion_pattern: String,
}

impl PatternLayout {
    /// Builds a layout from a log4j conversion pattern.
    ///
    /// # Errors
    ///
    /// Rejects an empty pattern.
    pub fn new(conversion_pattern: impl Into<String>) -> Result<Self, ConstructionError> {
        let conversion_pattern = conversion_pattern.into();
        if conversion_pattern.is_empty() {
            return Err(ConstructionError::EmptyField {
                field: "conversion pattern",
            });
        }
        Ok(Self { conversion_pattern })
    }

    /// The log4j conversion pattern.
    #[must_use]
    pub fn conversion_pattern(&self) -> &str {
        &self.conversion_pattern
    }
}

impl Default for PatternLayout {
    fn default() -> Self {
        Self {
            conversion_pattern: DEFAULT_PATTERN.to_owned(),
        }
    }
}

/// Kind-specific appender settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppenderKind {
    /// `org.apache.log4j.ConsoleAppender`.
    Console {
        /// Stream written to.
        target: ConsoleTarget,
        /// Line layout.
        layout: PatternLayout,
    },
    /// `org.apache.log4j.RollingFileAppender`.
    RollingFile {
        /// Log file path.
        file: String,
        /// Size at which the file rolls, in log4j notation (`10MB`).
        max_file_size: String,
        /// Number of rolled files kept.
        max_backup_index: u32,
        /// Line layout.
        layout: PatternLayout,
    },
    /// `org.apache.log4j.DailyRollingFileAppender`.
    DailyRollingFile {
        /// Log file path.
        file: String,
        /// Java date pattern controlling the roll schedule.
        date_pattern: String,
        /// Line layout.
        layout: PatternLayout,
    },
}

impl AppenderKind {
    const fn class_name(&self) -> &'static str {
        match self {
            Self::Console { .. } => "org.apache.log4j.ConsoleAppender",
            Self::RollingFile { .. } => "org.apache.log4j.RollingFileAppender",
            Self::DailyRollingFile { .. } => "org.apache.log4j.DailyRollingFileAppender",
        }
    }

    const fn layout(&self) -> &PatternLayout {
        match self {
            Self::Console { layout, .. }
            | Self::RollingFile { layout, .. }
            | Self::DailyRollingFile { layout, .. } => layout,
        }
    }
}

/// A named log4j appender.
///
/// The name is embedded literally in logger definition lines and keys the
/// appender's own settings, so it must be unique within one configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppenderDefinition {
    name: String,
    kind: AppenderKind,
}

impl AppenderDefinition {
    /// Builds an appender.
    ///
    /// # Errors
    ///
    /// Rejects empty names and names containing commas, `=` or whitespace,
    /// which would corrupt the definition line.
    pub fn new(name: impl Into<String>, kind: AppenderKind) -> Result<Self, ConstructionError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ConstructionError::EmptyField {
                field: "appender name",
            });
        }
        if name
            .chars()
            .any(|ch| matches!(ch, ',' | '=') || ch.is_whitespace())
        {
            return Err(ConstructionError::InvalidValue {
                field: "appender name",
                message: format!("'{name}' contains a separator"),
            });
        }
        Ok(Self { name, kind })
    }

    /// Console appender writing to standard output.
    ///
    /// # Errors
    ///
    /// See [`AppenderDefinition::new`].
    pub fn console(name: impl Into<String>, layout: PatternLayout) -> Result<Self, ConstructionError> {
        Self::new(
            name,
            AppenderKind::Console {
                target: ConsoleTarget::SystemOut,
                layout,
            },
        )
    }

    /// Size-rolled file appender with default size and backup limits.
    ///
    /// # Errors
    ///
    /// See [`AppenderDefinition::new`]; also rejects an empty file path.
    pub fn rolling_file(
        name: impl Into<String>,
        file: impl AsRef<str>,
        layout: PatternLayout,
    ) -> Result<Self, ConstructionError> {
        let file = required_path(file.as_ref())?;
        Self::new(
            name,
            AppenderKind::RollingFile {
                file,
                max_file_size: DEFAULT_MAX_FILE_SIZE.to_owned(),
                max_backup_index: DEFAULT_MAX_BACKUP_INDEX,
                layout,
            },
        )
    }

    /// Time-rolled file appender rolling hourly.
    ///
    /// # Errors
    ///
    /// See [`AppenderDefinition::new`]; also rejects an empty file path.
    pub fn daily_rolling_file(
        name: impl Into<String>,
        file: impl AsRef<str>,
        layout: PatternLayout,
    ) -> Result<Self, ConstructionError> {
        let file = required_path(file.as_ref())?;
        Self::new(
            name,
            AppenderKind::DailyRollingFile {
                file,
                date_pattern: DEFAULT_DATE_PATTERN.to_owned(),
                layout,
            },
        )
    }

    /// Appender name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kind-specific settings.
    #[must_use]
    pub const fn kind(&self) -> &AppenderKind {
        &self.kind
    }

    /// Settings rooted at `log4j.appender.<name>`, in log4j's usual order.
    #[must_use]
    pub fn properties(&self) -> Vec<(String, String)> {
        let root = format!("{APPENDER_PREFIX}.{}", self.name);
        let mut lines = vec![(root.clone(), self.kind.class_name().to_owned())];
        match &self.kind {
            AppenderKind::Console { target, .. } => {
                lines.push((format!("{root}.Target"), target.as_str().to_owned()));
            }
            AppenderKind::RollingFile {
                file,
                max_file_size,
                max_backup_index,
                ..
            } => {
                lines.push((format!("{root}.File"), file.clone()));
                lines.push((format!("{root}.MaxFileSize"), max_file_size.clone()));
                lines.push((format!("{root}.MaxBackupIndex"), max_backup_index.to_string()));
            }
            AppenderKind::DailyRollingFile {
                file, date_pattern, ..
            } => {
                lines.push((format!("{root}.DatePattern"), date_pattern.clone()));
                lines.push((format!("{root}.File"), file.clone()));
            }
        }
        lines.push((
            format!("{root}.layout"),
            "org.apache.log4j.PatternLayout".to_owned(),
        ));
        lines.push((
            format!("{root}.layout.ConversionPattern"),
            self.kind.layout().conversion_pattern().to_owned(),
        ));
        lines
    }
}

fn required_path(file: &str) -> Result<String, ConstructionError> {
    if file.is_empty() {
        return Err(ConstructionError::EmptyField {
            field: "appender file",
        });
    }
    Ok(normalize_separators(file))
}
