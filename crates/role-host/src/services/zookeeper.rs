//! Zookeeper quorum member.

use std::fs;
use std::path::PathBuf;

use java_platform::log4j::zookeeper_log4j_config;
use java_platform::{JavaInvocation, QuorumServer, ZookeeperConfig};
use role_config::Config;
use tracing::{info, warn};

use super::{LOG4J_CONFIG_FILE, ServicePlan, log4j_configuration, write_logging};
use crate::error::NodeError;
use crate::layout::NodeLayout;

/// Entry point of a Zookeeper server.
pub const ZOOKEEPER_MAIN_CLASS: &str = "org.apache.zookeeper.server.quorum.QuorumPeerMain";
/// Name of the rendered server configuration.
pub const ZOOKEEPER_CONFIG_FILE: &str = "zookeeper.properties";

/// Plan for a Zookeeper node.
///
/// With a single configured host the server runs standalone. With several,
/// each host becomes `server.<n>` (numbered from 1 in configured order) and
/// the instance whose id names one of them gets a matching `myid` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZookeeperPlan {
    instance_id: String,
    servers: Vec<String>,
    client_port: u16,
}

impl ZookeeperPlan {
    /// Builds a plan from explicit settings.
    pub fn new(instance_id: impl Into<String>, servers: Vec<String>, client_port: u16) -> Self {
        Self {
            instance_id: instance_id.into(),
            servers,
            client_port,
        }
    }

    /// Builds a plan from the role configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.instance_id(),
            config.zookeeper_server_list(),
            config.zookeeper_port(),
        )
    }

    fn quorum(&self) -> Result<Vec<QuorumServer>, NodeError> {
        if self.servers.len() < 2 {
            return Ok(Vec::new());
        }
        let mut quorum = Vec::with_capacity(self.servers.len());
        for (id, host) in (1_u32..).zip(&self.servers) {
            quorum.push(QuorumServer::new(id, host.as_str())?);
        }
        Ok(quorum)
    }

    fn write_myid(&self, layout: &NodeLayout, quorum: &[QuorumServer]) -> Result<(), NodeError> {
        if quorum.is_empty() {
            return Ok(());
        }
        let Some(own) = quorum.iter().find(|server| server.host() == self.instance_id) else {
            warn!(
                target: "role_host::services",
                instance = self.instance_id.as_str(),
                "instance is not listed among the quorum hosts; myid not written"
            );
            return Ok(());
        };
        let path = layout.data_dir().join("myid");
        fs::write(&path, format!("{}\n", own.id()))
            .map_err(|source| NodeError::write_file(path, source))
    }
}

impl ServicePlan for ZookeeperPlan {
    fn name(&self) -> &'static str {
        "zookeeper"
    }

    fn write_configuration(&self, layout: &NodeLayout) -> Result<(), NodeError> {
        let quorum = self.quorum()?;
        let config = ZookeeperConfig::new(layout.data_dir())?
            .with_client_port(self.client_port)
            .with_servers(quorum.clone())?;
        let path = layout.config_file(ZOOKEEPER_CONFIG_FILE);
        config.write_to_file(&path)?;
        self.write_myid(layout, &quorum)?;
        let logging = write_logging(layout, &zookeeper_log4j_config(layout.logs_dir())?)?;
        info!(
            target: "role_host::services",
            service = self.name(),
            config = %path.display(),
            logging = %logging.display(),
            quorum = quorum.len(),
            "wrote service configuration"
        );
        Ok(())
    }

    fn invocation(&self, layout: &NodeLayout, classpath: Vec<PathBuf>) -> JavaInvocation {
        JavaInvocation::new(ZOOKEEPER_MAIN_CLASS)
            .classpath(classpath)
            .define(
                "log4j.configuration",
                log4j_configuration(&layout.config_file(LOG4J_CONFIG_FILE)),
            )
            .argument(layout.config_file(ZOOKEEPER_CONFIG_FILE))
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;
    use std::path::Path;

    use rstest::rstest;

    use super::*;

    fn layout(root: &Path) -> NodeLayout {
        let layout = NodeLayout::from_roots(&root.join("install"), &root.join("data"));
        for directory in [layout.data_dir(), layout.config_dir(), layout.logs_dir()] {
            fs::create_dir_all(directory).expect("mkdir");
        }
        layout
    }

    #[test]
    fn standalone_node_writes_properties_and_logging() {
        let root = tempfile::tempdir().expect("tempdir");
        let layout = layout(root.path());
        let plan = ZookeeperPlan::new("zk-0", vec![String::from("zk-0")], 2181);

        plan.write_configuration(&layout).expect("configure");

        let properties =
            fs::read_to_string(layout.config_file(ZOOKEEPER_CONFIG_FILE)).expect("read");
        assert!(properties.contains("clientPort=2181\n"));
        assert!(!properties.contains("server."));
        let logging = fs::read_to_string(layout.config_file(LOG4J_CONFIG_FILE)).expect("read");
        assert!(
            logging.contains("log4j.logger.org.apache.zookeeper.server.NIOServerCnxn=WARN,file\n")
        );
        assert!(!layout.data_dir().join("myid").exists());
    }

    #[rstest]
    #[case::first("zk-a", Some("1\n"))]
    #[case::second("zk-b", Some("2\n"))]
    #[case::stranger("zk-z", None)]
    fn ensemble_member_writes_own_id(#[case] instance: &str, #[case] expected: Option<&str>) {
        let root = tempfile::tempdir().expect("tempdir");
        let layout = layout(root.path());
        let servers = vec![String::from("zk-a"), String::from("zk-b")];
        ZookeeperPlan::new(instance, servers, 2181)
            .write_configuration(&layout)
            .expect("configure");

        let properties =
            fs::read_to_string(layout.config_file(ZOOKEEPER_CONFIG_FILE)).expect("read");
        assert!(properties.ends_with("server.1=zk-a:2888:3888\nserver.2=zk-b:2888:3888\n"));
        let myid = fs::read_to_string(layout.data_dir().join("myid")).ok();
        assert_eq!(myid.as_deref(), expected);
    }

    #[test]
    fn invocation_points_at_rendered_files() {
        let layout = NodeLayout::from_roots(Path::new("/install"), Path::new("/data"));
        let plan = ZookeeperPlan::new("zk-0", Vec::new(), 2181);
        let arguments = plan
            .invocation(&layout, Vec::new())
            .arguments()
            .expect("arguments");
        assert_eq!(
            arguments,
            [
                OsString::from("-Dlog4j.configuration=file:/data/Config/log4j.properties"),
                OsString::from(ZOOKEEPER_MAIN_CLASS),
                OsString::from("/data/Config/zookeeper.properties"),
            ]
        );
    }
}
