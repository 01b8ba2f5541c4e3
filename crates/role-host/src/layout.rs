//! Directory layout of a node, derived from its local resources.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::environment::{DATA_DIR_RESOURCE, DiscoveryError, INSTALL_DIR_RESOURCE, RoleEnvironment};

/// Paths a node works with. Resolved once per start and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeLayout {
    java_install_home: PathBuf,
    java_home: PathBuf,
    jars_home: PathBuf,
    data_dir: PathBuf,
    config_dir: PathBuf,
    logs_dir: PathBuf,
}

impl NodeLayout {
    /// Derives the layout from the install and data roots without touching
    /// the filesystem.
    #[must_use]
    pub fn from_roots(install_root: &Path, data_root: &Path) -> Self {
        let java_install_home = install_root.join("Java");
        Self {
            java_home: java_install_home.join("java"),
            java_install_home,
            jars_home: install_root.join("Jars"),
            data_dir: data_root.join("Data"),
            config_dir: data_root.join("Config"),
            logs_dir: data_root.join("Logs"),
        }
    }

    /// Resolves the local resources and creates the data, config and logs
    /// directories when missing.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError`] when a resource is unavailable or a
    /// directory cannot be created.
    pub fn discover(environment: &dyn RoleEnvironment) -> Result<Self, DiscoveryError> {
        let install_root = environment.local_resource(INSTALL_DIR_RESOURCE)?;
        let data_root = environment.local_resource(DATA_DIR_RESOURCE)?;
        let layout = Self::from_roots(&install_root, &data_root);
        for directory in [&layout.data_dir, &layout.config_dir, &layout.logs_dir] {
            fs::create_dir_all(directory).map_err(|error| DiscoveryError::CreateDirectory {
                path: directory.clone(),
                message: error.to_string(),
            })?;
        }
        debug!(
            target: "role_host::layout",
            install_root = %install_root.display(),
            data_root = %data_root.display(),
            "discovered node directories"
        );
        Ok(layout)
    }

    /// Directory the JDK package is unpacked into.
    #[must_use]
    pub fn java_install_home(&self) -> &Path {
        &self.java_install_home
    }

    /// Root of the unpacked runtime (`JAVA_HOME`).
    #[must_use]
    pub fn java_home(&self) -> &Path {
        &self.java_home
    }

    /// Directory holding the service jars.
    #[must_use]
    pub fn jars_home(&self) -> &Path {
        &self.jars_home
    }

    /// Service data directory.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Directory holding rendered configuration files.
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Service log directory.
    #[must_use]
    pub fn logs_dir(&self) -> &Path {
        &self.logs_dir
    }

    /// Path of a rendered configuration file.
    #[must_use]
    pub fn config_file(&self, name: &str) -> PathBuf {
        self.config_dir.join(name)
    }
}
