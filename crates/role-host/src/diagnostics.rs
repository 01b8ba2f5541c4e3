//! Durable records of fatal node failures.
//!
//! A failure in either lifecycle phase is rendered, together with its chain
//! of causes, into a [`DiagnosticRecord`] and handed to a
//! [`DiagnosticSink`] before the original error is returned. Records are
//! named from the instance identity and the UTC time of the failure and are
//! written once; the sink never appends to or replaces an existing record.
//! A failing sink is logged and otherwise ignored so the original error is
//! always what the caller sees.

use std::error::Error;
use std::fmt::Write as _;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use tracing::{error, info, warn};

use crate::environment::{DIAGNOSTICS_SINK_SETTING, RoleEnvironment};
use crate::lifecycle::NodePhase;

const DIAGNOSTICS_TARGET: &str = "role_host::diagnostics";

const RECORD_TIMESTAMP: &[BorrowedFormatItem<'static>] =
    format_description!("[year][month][day]T[hour][minute][second].[subsecond digits:3]Z");

/// Failure text captured for one fatal error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticRecord {
    instance_id: String,
    phase: NodePhase,
    occurred_at: OffsetDateTime,
    text: String,
}

impl DiagnosticRecord {
    /// Captures `error` and its causes as raised during `phase`.
    #[must_use]
    pub fn new(
        instance_id: impl Into<String>,
        phase: NodePhase,
        error: &dyn Error,
        occurred_at: OffsetDateTime,
    ) -> Self {
        Self {
            instance_id: instance_id.into(),
            phase,
            occurred_at: occurred_at.to_offset(time::UtcOffset::UTC),
            text: render_error_chain(error),
        }
    }

    /// Instance the failure occurred on.
    #[must_use]
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Lifecycle phase that failed.
    #[must_use]
    pub const fn phase(&self) -> NodePhase {
        self.phase
    }

    /// Time of the failure, in UTC.
    #[must_use]
    pub const fn occurred_at(&self) -> OffsetDateTime {
        self.occurred_at
    }

    /// Rendered error and causes.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Record name: `exception-from-<instance>-on-<timestamp>.txt`.
    ///
    /// Characters outside `[A-Za-z0-9._-]` in the instance id are replaced
    /// with `_` so the name is usable as a file or object name anywhere.
    #[must_use]
    pub fn name(&self) -> String {
        let instance: String = self
            .instance_id
            .chars()
            .map(|ch| {
                if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-') {
                    ch
                } else {
                    '_'
                }
            })
            .collect();
        let timestamp = self
            .occurred_at
            .format(RECORD_TIMESTAMP)
            .unwrap_or_else(|_| self.occurred_at.unix_timestamp().to_string());
        format!("exception-from-{instance}-on-{timestamp}.txt")
    }

    /// Full record body.
    #[must_use]
    pub fn contents(&self) -> String {
        format!(
            "instance: {}\nphase: {}\n\n{}\n",
            self.instance_id, self.phase, self.text
        )
    }
}

/// Renders an error followed by each of its sources on its own line.
#[must_use]
pub fn render_error_chain(error: &dyn Error) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        if writeln!(text).is_err() || write!(text, "caused by: {cause}").is_err() {
            break;
        }
        source = cause.source();
    }
    text
}

/// Errors raised while persisting a diagnostic record.
#[derive(Debug, Clone, Error)]
pub enum DiagnosticSinkError {
    /// The sink container could not be created.
    #[error("failed to create diagnostics container '{path}': {source}")]
    CreateContainer {
        /// Container location.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },
    /// The record could not be written.
    #[error("failed to write diagnostic record '{path}': {source}")]
    Write {
        /// Record location.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },
}

/// Append-only store for fatal failure records.
pub trait DiagnosticSink {
    /// Stores `record`.
    ///
    /// # Errors
    ///
    /// Returns [`DiagnosticSinkError`] when the record cannot be stored.
    fn persist(&self, record: &DiagnosticRecord) -> Result<(), DiagnosticSinkError>;
}

impl<T> DiagnosticSink for Arc<T>
where
    T: DiagnosticSink + ?Sized,
{
    fn persist(&self, record: &DiagnosticRecord) -> Result<(), DiagnosticSinkError> {
        (**self).persist(record)
    }
}

/// Sink writing each record as a new file inside a container directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySink {
    container: PathBuf,
}

impl DirectorySink {
    /// Targets `container`, which is created on first use.
    pub fn new(container: impl Into<PathBuf>) -> Self {
        Self {
            container: container.into(),
        }
    }

    /// Container directory.
    #[must_use]
    pub fn container(&self) -> &Path {
        &self.container
    }
}

impl DiagnosticSink for DirectorySink {
    fn persist(&self, record: &DiagnosticRecord) -> Result<(), DiagnosticSinkError> {
        fs::create_dir_all(&self.container).map_err(|source| {
            DiagnosticSinkError::CreateContainer {
                path: self.container.clone(),
                source: Arc::new(source),
            }
        })?;
        let path = self.container.join(record.name());
        let write_error = |source: io::Error| DiagnosticSinkError::Write {
            path: path.clone(),
            source: Arc::new(source),
        };
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(write_error)?;
        file.write_all(record.contents().as_bytes())
            .and_then(|()| file.sync_all())
            .map_err(write_error)?;
        info!(
            target: DIAGNOSTICS_TARGET,
            record = %path.display(),
            "persisted diagnostic record"
        );
        Ok(())
    }
}

/// Sink used when no container is configured: the record is only logged.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOnlySink;

impl DiagnosticSink for LogOnlySink {
    fn persist(&self, record: &DiagnosticRecord) -> Result<(), DiagnosticSinkError> {
        error!(
            target: DIAGNOSTICS_TARGET,
            record = %record.name(),
            instance = record.instance_id(),
            phase = %record.phase(),
            failure = record.text(),
            "no diagnostics sink configured; failure recorded in logs only"
        );
        Ok(())
    }
}

/// Chooses the sink named by the `diagnostics_sink` setting, falling back to
/// [`LogOnlySink`].
#[must_use]
pub fn sink_for(environment: &dyn RoleEnvironment) -> Box<dyn DiagnosticSink> {
    match environment.setting(DIAGNOSTICS_SINK_SETTING) {
        Some(container) if !container.trim().is_empty() => Box::new(DirectorySink::new(container)),
        _ => Box::new(LogOnlySink),
    }
}

/// Persists a record for a failed `result` and hands `result` back unchanged.
///
/// A sink failure is logged; it never replaces the original error.
pub fn capture_failure<T, E>(
    sink: &dyn DiagnosticSink,
    instance_id: &str,
    phase: NodePhase,
    result: Result<T, E>,
) -> Result<T, E>
where
    E: Error,
{
    if let Err(failure) = &result {
        let record = DiagnosticRecord::new(instance_id, phase, failure, OffsetDateTime::now_utc());
        if let Err(sink_error) = sink.persist(&record) {
            warn!(
                target: DIAGNOSTICS_TARGET,
                record = %record.name(),
                error = %sink_error,
                original = %failure,
                "failed to persist diagnostic record"
            );
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use rstest::rstest;
    use time::macros::datetime;

    use super::*;

    #[derive(Debug, Error)]
    #[error("outer failure")]
    struct Outer {
        #[source]
        source: io::Error,
    }

    fn outer() -> Outer {
        Outer {
            source: io::Error::other("disk full"),
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        records: RefCell<Vec<DiagnosticRecord>>,
    }

    impl DiagnosticSink for RecordingSink {
        fn persist(&self, record: &DiagnosticRecord) -> Result<(), DiagnosticSinkError> {
            self.records.borrow_mut().push(record.clone());
            Ok(())
        }
    }

    struct FailingSink;

    impl DiagnosticSink for FailingSink {
        fn persist(&self, record: &DiagnosticRecord) -> Result<(), DiagnosticSinkError> {
            Err(DiagnosticSinkError::Write {
                path: PathBuf::from(record.name()),
                source: Arc::new(io::Error::other("sink offline")),
            })
        }
    }

    #[test]
    fn error_chain_lists_every_cause() {
        assert_eq!(render_error_chain(&outer()), "outer failure\ncaused by: disk full");
    }

    #[rstest]
    #[case::plain("Zookeeper_IN_0", "exception-from-Zookeeper_IN_0-on-20260301T101502.250Z.txt")]
    #[case::unsafe_chars("role/in 1", "exception-from-role_in_1-on-20260301T101502.250Z.txt")]
    fn record_names_are_deterministic(#[case] instance: &str, #[case] expected: &str) {
        let record = DiagnosticRecord::new(
            instance,
            NodePhase::Start,
            &outer(),
            datetime!(2026-03-01 10:15:02.25 UTC),
        );
        assert_eq!(record.name(), expected);
    }

    #[test]
    fn directory_sink_writes_each_record_once() {
        let container = tempfile::tempdir().expect("tempdir");
        let sink = DirectorySink::new(container.path().join("logs"));
        let record = DiagnosticRecord::new(
            "node-0",
            NodePhase::Run,
            &outer(),
            datetime!(2026-03-01 10:15:02 UTC),
        );

        sink.persist(&record).expect("first write");
        let duplicate = sink.persist(&record);

        let written = fs::read_to_string(sink.container().join(record.name())).expect("read");
        assert!(written.contains("phase: run"));
        assert!(written.contains("caused by: disk full"));
        assert!(matches!(duplicate, Err(DiagnosticSinkError::Write { .. })));
    }

    #[test]
    fn capture_failure_records_errors_and_passes_them_through() {
        let sink = RecordingSink::default();
        let result: Result<(), Outer> =
            capture_failure(&sink, "node-0", NodePhase::Start, Err(outer()));

        assert_eq!(result.expect_err("error passes through").to_string(), "outer failure");
        let records = sink.records.borrow();
        assert_eq!(records.len(), 1);
        assert!(records.iter().all(|record| record.text().contains("disk full")));
    }

    #[test]
    fn capture_failure_ignores_success() {
        let sink = RecordingSink::default();
        let value = capture_failure::<_, Outer>(&sink, "node-0", NodePhase::Run, Ok(7));
        assert_eq!(value.expect("value"), 7);
        assert!(sink.records.borrow().is_empty());
    }

    #[test]
    fn sink_failure_never_masks_the_original_error() {
        let result: Result<(), Outer> =
            capture_failure(&FailingSink, "node-0", NodePhase::Start, Err(outer()));
        let failure = result.expect_err("original error");
        assert_eq!(failure.source.to_string(), "disk full");
    }
}
