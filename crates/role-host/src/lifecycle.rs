//! Node lifecycle controller.
//!
//! The hosting runtime drives a node through two phases. `on_start` resolves
//! the node's directories, stages the bundled runtime and jars, and renders
//! the service configuration. `run` launches the service JVM and blocks for
//! as long as it runs.
//!
//! ```text
//! Uninitialized -> Discovering -> Staging -> Configuring -> Ready -> Running
//!        \______________\____________\___________\____________\-> Failed
//! ```
//!
//! A failure in either phase moves the node to `Failed`, is persisted to the
//! diagnostic sink and is then returned unchanged. Nothing is retried; the
//! hosting runtime decides whether to restart the role.
//!
//! Configuration is rendered once per start from the settings seen at that
//! moment. Settings that change while the node runs are not applied until
//! the role is restarted.

use std::path::PathBuf;
use std::sync::Arc;

use java_platform::staging::{extract_archive, install_runtime};
use java_platform::{JavaRunner, StagingError, classpath_for_jars_in_directories};
use role_config::Config;
use strum::Display;
use tracing::info;

use crate::diagnostics::{DiagnosticSink, capture_failure, sink_for};
use crate::environment::RoleEnvironment;
use crate::error::NodeError;
use crate::health::HealthReporter;
use crate::layout::NodeLayout;
use crate::services::ServicePlan;

const LIFECYCLE_TARGET: &str = "role_host::lifecycle";

/// Position of a node in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum NodeState {
    /// Nothing has happened yet.
    Uninitialized,
    /// Resolving local resources and creating node directories.
    Discovering,
    /// Unpacking the runtime and jars.
    Staging,
    /// Rendering configuration files.
    Configuring,
    /// Start completed; waiting for `run`.
    Ready,
    /// The service process has been launched.
    Running,
    /// A phase failed.
    Failed,
}

/// Lifecycle phase invoked by the hosting runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum NodePhase {
    /// One-time preparation.
    Start,
    /// Long-running service execution.
    Run,
}

/// Entry points the hosting runtime calls, once each and in order.
pub trait RoleEntryPoint {
    /// Prepares the node. Returns `true` when the node is ready to run.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError`] when any start stage fails.
    fn on_start(&mut self) -> Result<bool, NodeError>;

    /// Runs the service until it exits.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError`] when the node is not ready or the service fails.
    fn run(&mut self) -> Result<(), NodeError>;
}

/// Bundled artefacts unpacked while staging.
///
/// An artefact left unset is assumed to be installed already.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundledArtifacts {
    jars_archive: Option<PathBuf>,
    jdk_package: Option<PathBuf>,
}

impl BundledArtifacts {
    /// Names the jars archive and JDK package.
    #[must_use]
    pub const fn new(jars_archive: Option<PathBuf>, jdk_package: Option<PathBuf>) -> Self {
        Self {
            jars_archive,
            jdk_package,
        }
    }

    /// Reads artefact locations from the role configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.jars_archive().map(|path| path.as_std_path().to_path_buf()),
            config.jdk_package().map(|path| path.as_std_path().to_path_buf()),
        )
    }

    /// Extracts the jars into `Jars/` and the JDK into `Java/`.
    ///
    /// # Errors
    ///
    /// Returns the first [`StagingError`] encountered.
    pub fn stage(&self, layout: &NodeLayout) -> Result<(), StagingError> {
        match &self.jars_archive {
            Some(archive) => {
                extract_archive(archive, layout.jars_home())?;
            }
            None => info!(
                target: LIFECYCLE_TARGET,
                jars_home = %layout.jars_home().display(),
                "no jars archive configured; using installed jars"
            ),
        }
        match &self.jdk_package {
            Some(package) => install_runtime(package, layout.java_install_home())?,
            None => info!(
                target: LIFECYCLE_TARGET,
                java_home = %layout.java_home().display(),
                "no runtime package configured; using installed runtime"
            ),
        }
        Ok(())
    }
}

/// Drives one node through start and run.
pub struct NodeLifecycle<E> {
    environment: E,
    plan: Box<dyn ServicePlan>,
    artifacts: BundledArtifacts,
    sink: Box<dyn DiagnosticSink>,
    reporter: Arc<dyn HealthReporter>,
    state: NodeState,
    layout: Option<NodeLayout>,
}

impl<E> NodeLifecycle<E>
where
    E: RoleEnvironment,
{
    /// Builds a controller whose diagnostic sink is chosen from the
    /// environment's settings.
    #[must_use]
    pub fn new(
        environment: E,
        plan: Box<dyn ServicePlan>,
        artifacts: BundledArtifacts,
        reporter: Arc<dyn HealthReporter>,
    ) -> Self {
        let sink = sink_for(&environment);
        Self {
            environment,
            plan,
            artifacts,
            sink,
            reporter,
            state: NodeState::Uninitialized,
            layout: None,
        }
    }

    /// Replaces the diagnostic sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Box<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> NodeState {
        self.state
    }

    /// Directories resolved by the last successful start.
    #[must_use]
    pub const fn layout(&self) -> Option<&NodeLayout> {
        self.layout.as_ref()
    }

    fn transition(&mut self, to: NodeState) {
        let from = self.state;
        self.state = to;
        self.reporter.state_changed(from, to);
    }

    fn start(&mut self) -> Result<(), NodeError> {
        self.layout = None;
        self.transition(NodeState::Discovering);
        let layout = NodeLayout::discover(&self.environment)?;

        self.transition(NodeState::Staging);
        self.artifacts.stage(&layout)?;

        self.transition(NodeState::Configuring);
        self.plan.write_configuration(&layout)?;

        self.layout = Some(layout);
        self.transition(NodeState::Ready);
        Ok(())
    }

    fn run_service(&mut self) -> Result<(), NodeError> {
        let layout = match (&self.layout, self.state) {
            (Some(layout), NodeState::Ready) => layout.clone(),
            _ => return Err(NodeError::NotReady { state: self.state }),
        };
        self.transition(NodeState::Running);

        let classpath = classpath_for_jars_in_directories([layout.jars_home()])?;
        let invocation = self.plan.invocation(&layout, classpath);
        info!(
            target: LIFECYCLE_TARGET,
            service = self.plan.name(),
            main_class = invocation.main_class(),
            "launching service"
        );
        JavaRunner::new(layout.java_home()).run_class(&invocation)?;
        info!(
            target: LIFECYCLE_TARGET,
            service = self.plan.name(),
            "service exited"
        );
        Ok(())
    }

    fn settle<T>(
        &mut self,
        phase: NodePhase,
        outcome: Result<T, NodeError>,
    ) -> Result<T, NodeError> {
        if let Err(error) = &outcome {
            self.transition(NodeState::Failed);
            self.reporter.phase_failed(phase, error);
        }
        capture_failure(
            self.sink.as_ref(),
            &self.environment.instance_id(),
            phase,
            outcome,
        )
    }
}

impl<E> RoleEntryPoint for NodeLifecycle<E>
where
    E: RoleEnvironment,
{
    fn on_start(&mut self) -> Result<bool, NodeError> {
        let outcome = self.start();
        self.settle(NodePhase::Start, outcome).map(|()| true)
    }

    fn run(&mut self) -> Result<(), NodeError> {
        let outcome = self.run_service();
        self.settle(NodePhase::Run, outcome)
    }
}
