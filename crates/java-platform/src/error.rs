//! Error taxonomy for definition, rendering, staging and launch failures.
//!
//! I/O errors are wrapped in `Arc` to satisfy the `result_large_err` Clippy
//! lint and to keep the enums cheap to clone into diagnostic records.

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Raised when a definition is built from missing or invalid input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConstructionError {
    /// A required text field was empty.
    #[error("{field} must not be empty")]
    EmptyField {
        /// Name of the offending field.
        field: &'static str,
    },
    /// A host list that must name at least one host was empty.
    #[error("{field} must list at least one host")]
    EmptyHostList {
        /// Name of the offending list.
        field: &'static str,
    },
    /// A value was present but unusable.
    #[error("invalid {field}: {message}")]
    InvalidValue {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        message: String,
    },
}

/// Raised when a definition cannot be rendered into its target format.
#[derive(Debug, Clone, Error)]
pub enum FormatError {
    /// A logger that should emit output has no appenders.
    #[error("logger '{logger}' at level {level} has no appenders")]
    EmptyAppenders {
        /// Property key of the logger.
        logger: String,
        /// Level name of the logger.
        level: &'static str,
    },
    /// Two different appenders share a name within one configuration.
    #[error("appender name '{name}' is bound to conflicting definitions")]
    DuplicateAppender {
        /// Shared appender name.
        name: String,
    },
    /// A properties document repeats a key.
    #[error("property key '{key}' appears more than once")]
    DuplicateKey {
        /// Repeated key.
        key: String,
    },
    /// A properties key cannot be written without escaping.
    #[error("property key '{key}' is empty or contains separators")]
    InvalidKey {
        /// Offending key.
        key: String,
    },
    /// The YAML serializer rejected the document.
    #[error("failed to serialize YAML: {message}")]
    Yaml {
        /// Serializer message.
        message: String,
    },
    /// Writing the rendered document failed.
    #[error("failed to write rendered configuration{}: {source}", display_path(.path))]
    Write {
        /// Destination, when writing to a file.
        path: Option<PathBuf>,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },
}

impl FormatError {
    pub(crate) fn write(path: Option<PathBuf>, source: io::Error) -> Self {
        Self::Write {
            path,
            source: Arc::new(source),
        }
    }
}

fn display_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|path| format!(" to '{}'", path.display()))
        .unwrap_or_default()
}

/// Raised when bundled artefacts cannot be materialised on disk.
#[derive(Debug, Clone, Error)]
pub enum StagingError {
    /// The archive could not be opened.
    #[error("failed to open archive '{path}': {source}")]
    OpenArchive {
        /// Archive location.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },
    /// The archive is not a readable zip archive.
    #[error("archive '{archive}' is corrupt: {message}")]
    CorruptArchive {
        /// Archive label.
        archive: String,
        /// Description of the decoding failure.
        message: String,
    },
    /// An entry would be written outside the target directory.
    #[error("archive '{archive}' contains unsafe entry '{entry}'")]
    UnsafeEntry {
        /// Archive label.
        archive: String,
        /// Raw entry name.
        entry: String,
    },
    /// A directory could not be created.
    #[error("failed to create directory '{path}': {source}")]
    CreateDirectory {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },
    /// An extracted file could not be written.
    #[error("failed to write '{path}': {source}")]
    WriteEntry {
        /// File being written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },
    /// A runtime package could not be unpacked.
    #[error("failed to unpack runtime package '{path}': {source}")]
    Unpack {
        /// Package location.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },
}

/// Raised when the JVM cannot be started or exits unsuccessfully.
#[derive(Debug, Clone, Error)]
pub enum ProcessFailure {
    /// No runtime executable exists under the Java home.
    #[error("java runtime not found at '{path}'")]
    MissingRuntime {
        /// Expected executable location.
        path: PathBuf,
    },
    /// A classpath directory could not be enumerated.
    #[error("failed to enumerate jars under '{path}': {message}")]
    Classpath {
        /// Directory being scanned.
        path: PathBuf,
        /// Description of the failure.
        message: String,
    },
    /// A classpath entry contains the platform path-list separator.
    #[error("classpath entry cannot be joined: {message}")]
    InvalidClasspath {
        /// Description of the failure.
        message: String,
    },
    /// The process could not be spawned.
    #[error("failed to start {program:?}: {source}")]
    Spawn {
        /// Executable being started.
        program: OsString,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },
    /// Waiting on the process failed.
    #[error("failed to await '{main_class}': {source}")]
    Wait {
        /// Entry point of the awaited process.
        main_class: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },
    /// The process exited unsuccessfully.
    #[error("'{main_class}' exited with status {}", display_code(.code))]
    NonZeroExit {
        /// Entry point of the failed process.
        main_class: String,
        /// Exit code; `None` when the process was terminated by a signal.
        code: Option<i32>,
    },
}

fn display_code(code: &Option<i32>) -> String {
    code.map_or_else(|| String::from("<signal>"), |code| code.to_string())
}
