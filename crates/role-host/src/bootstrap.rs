//! Role host bootstrap orchestration.

use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use thiserror::Error;

use role_config::Config;

use crate::environment::ConfiguredEnvironment;
use crate::health::HealthReporter;
use crate::lifecycle::{BundledArtifacts, NodeLifecycle};
use crate::services::plan_for;
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the role configuration.
    ///
    /// # Errors
    ///
    /// Returns the loader error when configuration cannot be resolved.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
}

/// A configured node ready for the lifecycle entry points.
pub struct RoleHost {
    config: Config,
    node: NodeLifecycle<ConfiguredEnvironment>,
    telemetry: TelemetryHandle,
}

impl RoleHost {
    /// Accessor for the resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Telemetry handle holding the role span.
    #[must_use]
    pub const fn telemetry(&self) -> &TelemetryHandle {
        &self.telemetry
    }

    /// The lifecycle controller.
    pub const fn node(&mut self) -> &mut NodeLifecycle<ConfiguredEnvironment> {
        &mut self.node
    }

    /// Consumes the host, returning its lifecycle controller.
    #[must_use]
    pub fn into_node(self) -> NodeLifecycle<ConfiguredEnvironment> {
        self.node
    }
}

/// Loads configuration, installs telemetry and assembles the node.
///
/// # Errors
///
/// Returns [`BootstrapError`] when configuration or telemetry fails.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
) -> Result<RoleHost, BootstrapError> {
    reporter.bootstrap_starting();

    let config = match loader.load() {
        Ok(config) => config,
        Err(source) => {
            let error = BootstrapError::Configuration { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    let telemetry = match telemetry::initialise(&config) {
        Ok(handle) => handle,
        Err(source) => {
            let error = BootstrapError::Telemetry { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    let plan = plan_for(&config);
    let artifacts = BundledArtifacts::from_config(&config);
    let node = NodeLifecycle::new(
        ConfiguredEnvironment::new(config.clone()),
        plan,
        artifacts,
        Arc::clone(&reporter),
    );
    reporter.bootstrap_succeeded(&config);
    Ok(RoleHost {
        config,
        node,
        telemetry,
    })
}
