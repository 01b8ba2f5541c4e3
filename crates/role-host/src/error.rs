//! Failures surfaced by the node lifecycle.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use java_platform::{ConstructionError, FormatError, ProcessFailure, StagingError};
use thiserror::Error;

use crate::environment::DiscoveryError;
use crate::lifecycle::NodeState;

/// Errors returned to the host runtime from a lifecycle phase.
///
/// Each variant wraps the failure of one stage unchanged, so callers can
/// match on the original error after the diagnostic record has been written.
#[derive(Debug, Clone, Error)]
pub enum NodeError {
    /// Local resources could not be resolved or prepared.
    #[error("directory discovery failed: {source}")]
    Discovery {
        /// Underlying discovery error.
        #[from]
        source: DiscoveryError,
    },
    /// Bundled artefacts could not be unpacked.
    #[error("artefact staging failed: {source}")]
    Staging {
        /// Underlying staging error.
        #[from]
        source: StagingError,
    },
    /// Service settings were invalid.
    #[error("invalid service settings: {source}")]
    Construction {
        /// Underlying construction error.
        #[from]
        source: ConstructionError,
    },
    /// A configuration file could not be rendered or written.
    #[error("failed to render configuration: {source}")]
    Format {
        /// Underlying rendering error.
        #[from]
        source: FormatError,
    },
    /// An auxiliary node file could not be written.
    #[error("failed to write '{path}': {source}")]
    WriteFile {
        /// Destination file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },
    /// The service process could not be started or failed.
    #[error("service process failed: {source}")]
    Process {
        /// Underlying launch failure.
        #[from]
        source: ProcessFailure,
    },
    /// `run` was invoked before `on_start` completed.
    #[error("node is not ready to run (state: {state})")]
    NotReady {
        /// State observed when `run` was invoked.
        state: NodeState,
    },
}

impl NodeError {
    pub(crate) fn write_file(path: PathBuf, source: io::Error) -> Self {
        Self::WriteFile {
            path,
            source: Arc::new(source),
        }
    }
}
