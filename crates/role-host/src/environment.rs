//! Seam between the lifecycle and the hosting runtime.
//!
//! The hosting runtime exposes named local-resource roots and string-keyed
//! configuration settings. [`RoleEnvironment`] captures exactly those
//! lookups so the lifecycle can run against the configured process
//! environment or against a test double.

use std::path::PathBuf;

use role_config::Config;
use thiserror::Error;

/// Local resource holding the runtime and jars.
pub const INSTALL_DIR_RESOURCE: &str = "InstallDir";
/// Local resource holding service data, configuration and logs.
pub const DATA_DIR_RESOURCE: &str = "DataDir";
/// Setting naming the diagnostics sink container.
pub const DIAGNOSTICS_SINK_SETTING: &str = "diagnostics_sink";

/// Lookups provided by the hosting runtime.
pub trait RoleEnvironment {
    /// Resolves the root path of a named local resource.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError`] when the resource is unknown or was not
    /// provisioned for this instance.
    fn local_resource(&self, name: &str) -> Result<PathBuf, DiscoveryError>;

    /// Looks up a configuration setting by key.
    fn setting(&self, key: &str) -> Option<String>;

    /// Identity of the running instance.
    fn instance_id(&self) -> String;
}

/// Errors raised while resolving or preparing local resources.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DiscoveryError {
    /// The resource name is not one the runtime provides.
    #[error("unknown local resource '{name}'")]
    UnknownResource {
        /// Requested resource name.
        name: String,
    },
    /// The resource exists by name but has no configured root.
    #[error("local resource '{name}' is not configured")]
    MissingResource {
        /// Requested resource name.
        name: String,
    },
    /// A node directory could not be created.
    #[error("failed to create directory '{path}': {message}")]
    CreateDirectory {
        /// Directory being created.
        path: PathBuf,
        /// Description of the I/O failure.
        message: String,
    },
}

/// [`RoleEnvironment`] backed by the layered role configuration.
#[derive(Debug, Clone)]
pub struct ConfiguredEnvironment {
    config: Config,
}

impl ConfiguredEnvironment {
    /// Wraps a resolved configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// The wrapped configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }
}

impl RoleEnvironment for ConfiguredEnvironment {
    fn local_resource(&self, name: &str) -> Result<PathBuf, DiscoveryError> {
        let root = match name {
            INSTALL_DIR_RESOURCE => self.config.install_dir(),
            DATA_DIR_RESOURCE => self.config.data_dir(),
            _ => {
                return Err(DiscoveryError::UnknownResource {
                    name: name.to_owned(),
                });
            }
        };
        root.map(|path| path.as_std_path().to_path_buf())
            .ok_or_else(|| DiscoveryError::MissingResource {
                name: name.to_owned(),
            })
    }

    fn setting(&self, key: &str) -> Option<String> {
        match key {
            DIAGNOSTICS_SINK_SETTING => self.config.diagnostics_sink().map(str::to_owned),
            "nimbus_host" => Some(self.config.nimbus_host().to_owned()),
            "zookeeper_servers" => Some(self.config.zookeeper_server_list().join(",")),
            "drpc_servers" => Some(self.config.drpc_server_list().join(",")),
            "zookeeper_port" => Some(self.config.zookeeper_port().to_string()),
            _ => None,
        }
    }

    fn instance_id(&self) -> String {
        self.config.instance_id().to_owned()
    }
}
