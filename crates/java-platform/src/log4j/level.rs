use strum::{Display, EnumString, IntoStaticStr};

/// Log4j trace level, ordered from silent to most verbose.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum TraceLevel {
    /// Logging disabled.
    Off,
    /// Fatal events only.
    Fatal,
    /// Errors and above.
    Error,
    /// Warnings and above.
    Warn,
    /// Informational events and above.
    Info,
    /// Debug events and above.
    Debug,
    /// Everything.
    Trace,
}

impl TraceLevel {
    /// Upper-case log4j name of the level.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Returns `true` when a logger at this level is expected to emit output.
    #[must_use]
    pub const fn emits(self) -> bool {
        !matches!(self, Self::Off)
    }
}

/// Errors encountered while parsing a [`TraceLevel`] from text.
pub type TraceLevelParseError = strum::ParseError;
