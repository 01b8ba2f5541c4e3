//! Structured health reporting for node lifecycle events.

use std::sync::Arc;

use role_config::Config;

use crate::bootstrap::BootstrapError;
use crate::error::NodeError;
use crate::lifecycle::{NodePhase, NodeState};

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked whenever the node enters a new state.
    fn state_changed(&self, from: NodeState, to: NodeState);

    /// Invoked when a lifecycle phase fails.
    fn phase_failed(&self, phase: NodePhase, error: &NodeError);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn state_changed(&self, from: NodeState, to: NodeState) {
        (**self).state_changed(from, to);
    }

    fn phase_failed(&self, phase: NodePhase, error: &NodeError) {
        (**self).phase_failed(phase, error);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: "role_host::health",
            event = "bootstrap_starting",
            "starting role host bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: "role_host::health",
            event = "bootstrap_succeeded",
            service = %config.service(),
            instance = config.instance_id(),
            log_filter = config.log_filter(),
            log_format = ?config.log_format(),
            "role host bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: "role_host::health",
            event = "bootstrap_failed",
            error = %error,
            "role host bootstrap failed"
        );
    }

    fn state_changed(&self, from: NodeState, to: NodeState) {
        tracing::info!(
            target: "role_host::health",
            event = "state_changed",
            from = %from,
            to = %to,
            "node state changed"
        );
    }

    fn phase_failed(&self, phase: NodePhase, error: &NodeError) {
        tracing::error!(
            target: "role_host::health",
            event = "phase_failed",
            phase = %phase,
            error = %error,
            "node lifecycle phase failed"
        );
    }
}
