//! Tracing setup for the role host.
//!
//! The subscriber is a registry stacked with an [`EnvFilter`] and one
//! formatting layer chosen by [`LogFormat`]. It is installed at most once
//! per process; every call still returns a fresh role span naming the
//! instance and service, so events emitted inside it carry both.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::Span;
use tracing_subscriber::fmt::{self, time::UtcTime};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, registry};

use role_config::{Config, LogFormat};

static SUBSCRIBER_INSTALLED: OnceCell<()> = OnceCell::new();

/// Role span returned once telemetry is ready.
#[derive(Debug, Clone)]
pub struct TelemetryHandle {
    role_span: Span,
}

impl TelemetryHandle {
    /// Span carrying `instance` and `service` fields for this role.
    #[must_use]
    pub const fn role_span(&self) -> &Span {
        &self.role_span
    }
}

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The configured filter expression does not parse.
    #[error("invalid log filter '{filter}': {message}")]
    Filter {
        /// Rejected expression.
        filter: String,
        /// Parser message.
        message: String,
    },
    /// Another global subscriber was installed first.
    #[error("failed to install telemetry subscriber: {source}")]
    Subscriber {
        /// Underlying installation error.
        #[source]
        source: TryInitError,
    },
}

/// Installs the global subscriber on first use and opens the role span.
///
/// The filter is validated on every call, even when a subscriber from an
/// earlier call is already in place.
///
/// # Errors
///
/// Returns [`TelemetryError`] when the filter is invalid or another
/// subscriber is already installed.
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    let filter =
        EnvFilter::try_new(config.log_filter()).map_err(|error| TelemetryError::Filter {
            filter: config.log_filter().to_owned(),
            message: error.to_string(),
        })?;
    SUBSCRIBER_INSTALLED.get_or_try_init(|| install(filter, config.log_format()))?;

    let role_span = tracing::info_span!(
        target: "role_host",
        "role",
        instance = config.instance_id(),
        service = %config.service(),
    );
    Ok(TelemetryHandle { role_span })
}

fn install(filter: EnvFilter, format: LogFormat) -> Result<(), TelemetryError> {
    // Role logs usually land in files; colour only for an attached terminal.
    let ansi = io::stderr().is_terminal();
    let json = matches!(format, LogFormat::Json).then(|| {
        fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_timer(UtcTime::rfc_3339())
            .with_writer(io::stderr)
    });
    let compact = matches!(format, LogFormat::Compact).then(|| {
        fmt::layer()
            .compact()
            .with_ansi(ansi)
            .with_timer(UtcTime::rfc_3339())
            .with_writer(io::stderr)
    });

    registry()
        .with(filter)
        .with(json)
        .with(compact)
        .try_init()
        .map_err(|source| TelemetryError::Subscriber { source })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::unknown_level("role_host=loud")]
    #[case::unknown_nested_level("info,java_platform=chatty")]
    fn invalid_filters_are_rejected(#[case] filter: &str) {
        let config = Config {
            log_filter: filter.to_owned(),
            ..Config::default()
        };

        let error = initialise(&config).expect_err("filter must be rejected");

        assert!(
            matches!(error, TelemetryError::Filter { filter: ref rejected, .. } if rejected == filter)
        );
    }
}
