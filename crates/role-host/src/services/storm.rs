//! Storm daemons.

use std::path::PathBuf;

use java_platform::log4j::service_log4j_config;
use java_platform::{JavaInvocation, StormConfig};
use role_config::{Config, StormRole};
use tracing::info;

use super::{LOG4J_CONFIG_FILE, ServicePlan, log4j_configuration, path_text, write_logging};
use crate::error::NodeError;
use crate::layout::NodeLayout;

/// Name of the rendered Storm configuration.
pub const STORM_CONFIG_FILE: &str = "storm.yaml";

/// Plan for one Storm daemon.
///
/// Storm looks `storm.yaml` up on the classpath, so the config directory is
/// placed ahead of the jars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StormPlan {
    role: StormRole,
    nimbus_host: String,
    zookeeper_servers: Vec<String>,
    zookeeper_port: u16,
    drpc_servers: Vec<String>,
}

impl StormPlan {
    /// Builds a plan from explicit settings.
    pub fn new(
        role: StormRole,
        nimbus_host: impl Into<String>,
        zookeeper_servers: Vec<String>,
        zookeeper_port: u16,
        drpc_servers: Vec<String>,
    ) -> Self {
        Self {
            role,
            nimbus_host: nimbus_host.into(),
            zookeeper_servers,
            zookeeper_port,
            drpc_servers,
        }
    }

    /// Builds a plan from the role configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.storm_role(),
            config.nimbus_host(),
            config.zookeeper_server_list(),
            config.zookeeper_port(),
            config.drpc_server_list(),
        )
    }

    /// Daemon flavour.
    #[must_use]
    pub const fn role(&self) -> StormRole {
        self.role
    }

    fn storm_config(&self, layout: &NodeLayout) -> Result<StormConfig, NodeError> {
        let local_dir = path_text(&layout.data_dir().join("storm-local"));
        let config = StormConfig::builder(self.nimbus_host.clone(), self.zookeeper_servers.clone())
            .zookeeper_port(self.zookeeper_port)
            .drpc_servers(self.drpc_servers.clone())
            .storm_local_dir(local_dir)
            .build()?;
        Ok(config)
    }
}

impl ServicePlan for StormPlan {
    fn name(&self) -> &'static str {
        "storm"
    }

    fn write_configuration(&self, layout: &NodeLayout) -> Result<(), NodeError> {
        let config = self.storm_config(layout)?;
        let path = layout.config_file(STORM_CONFIG_FILE);
        config.write_yaml_file(&path)?;
        let logging = write_logging(layout, &service_log4j_config(layout.logs_dir())?)?;
        info!(
            target: "role_host::services",
            service = self.name(),
            role = %self.role,
            config = %path.display(),
            logging = %logging.display(),
            "wrote service configuration"
        );
        Ok(())
    }

    fn invocation(&self, layout: &NodeLayout, classpath: Vec<PathBuf>) -> JavaInvocation {
        JavaInvocation::new(self.role.main_class())
            .classpath([layout.config_dir().to_path_buf()])
            .classpath(classpath)
            .define(
                "log4j.configuration",
                log4j_configuration(&layout.config_file(LOG4J_CONFIG_FILE)),
            )
            .define("storm.home", path_text(layout.jars_home()))
            .define("storm.log.dir", path_text(layout.logs_dir()))
            .define("storm.conf.file", STORM_CONFIG_FILE)
    }
}
