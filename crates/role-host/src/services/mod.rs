//! Per-service configuration and launch plans.
//!
//! A [`ServicePlan`] knows which files a service reads and how its JVM is
//! launched. The lifecycle asks the plan to write its files while
//! configuring and to describe the invocation when running.

mod storm;
mod zookeeper;

use std::path::{Path, PathBuf};

use java_platform::JavaInvocation;
use java_platform::log4j::Log4jConfig;
use java_platform::normalize_separators;
use role_config::{Config, ServiceKind};

use crate::error::NodeError;
use crate::layout::NodeLayout;

pub use storm::{STORM_CONFIG_FILE, StormPlan};
pub use zookeeper::{ZOOKEEPER_CONFIG_FILE, ZOOKEEPER_MAIN_CLASS, ZookeeperPlan};

/// Name of the rendered logging configuration.
pub const LOG4J_CONFIG_FILE: &str = "log4j.properties";

/// Files and launch parameters of one hosted service.
pub trait ServicePlan {
    /// Short service name for logs.
    fn name(&self) -> &'static str;

    /// Renders every configuration file the service reads into `layout`.
    ///
    /// Files are rewritten from scratch on every start.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError`] when settings are invalid or a file cannot be
    /// written.
    fn write_configuration(&self, layout: &NodeLayout) -> Result<(), NodeError>;

    /// Describes the JVM launch, given the discovered jar classpath.
    fn invocation(&self, layout: &NodeLayout, classpath: Vec<PathBuf>) -> JavaInvocation;
}

/// Builds the plan for the service selected in `config`.
#[must_use]
pub fn plan_for(config: &Config) -> Box<dyn ServicePlan> {
    match config.service() {
        ServiceKind::Zookeeper => Box::new(ZookeeperPlan::from_config(config)),
        ServiceKind::Storm => Box::new(StormPlan::from_config(config)),
    }
}

/// Writes `logging` as the node's `log4j.properties` and returns its path.
pub(crate) fn write_logging(
    layout: &NodeLayout,
    logging: &Log4jConfig,
) -> Result<PathBuf, NodeError> {
    let path = layout.config_file(LOG4J_CONFIG_FILE);
    logging.write_to_file(&path)?;
    Ok(path)
}

/// Value of the `log4j.configuration` define for a file on disk.
pub(crate) fn log4j_configuration(path: &Path) -> String {
    format!("file:{}", path_text(path))
}

pub(crate) fn path_text(path: &Path) -> String {
    normalize_separators(&path.to_string_lossy())
}
