//! Storm node configuration.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use serde_saphyr::FlowSeq;

use crate::error::{ConstructionError, FormatError};
use crate::paths::normalize_separators;

/// Default Zookeeper client port.
pub const DEFAULT_ZOOKEEPER_PORT: u16 = 2181;
/// Default memory ceiling for a Storm node, in megabytes.
pub const DEFAULT_MAX_NODE_MEMORY_MB: u32 = 2048;
/// Default `storm.local.dir`.
pub const DEFAULT_STORM_LOCAL_DIR: &str = "storm-local";

/// Configuration for a Storm node, rendered as `storm.yaml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StormConfig {
    nimbus_host: String,
    zookeeper_servers: Vec<String>,
    zookeeper_port: u16,
    drpc_servers: Vec<String>,
    max_node_memory_mb: u32,
    storm_local_dir: String,
}

impl StormConfig {
    /// Builds a configuration with defaults for every optional setting.
    ///
    /// # Errors
    ///
    /// See [`StormConfigBuilder::build`].
    pub fn new<I, S>(nimbus_host: impl Into<String>, zookeeper_servers: I) -> Result<Self, ConstructionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::builder(nimbus_host, zookeeper_servers).build()
    }

    /// Starts a builder from the two required settings.
    pub fn builder<I, S>(nimbus_host: impl Into<String>, zookeeper_servers: I) -> StormConfigBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StormConfigBuilder {
            nimbus_host: nimbus_host.into(),
            zookeeper_servers: zookeeper_servers.into_iter().map(Into::into).collect(),
            zookeeper_port: DEFAULT_ZOOKEEPER_PORT,
            drpc_servers: Vec::new(),
            max_node_memory_mb: DEFAULT_MAX_NODE_MEMORY_MB,
            storm_local_dir: DEFAULT_STORM_LOCAL_DIR.to_owned(),
        }
    }

    /// The host where Nimbus runs.
    #[must_use]
    pub fn nimbus_host(&self) -> &str {
        &self.nimbus_host
    }

    /// Zookeeper hosts, primary first.
    #[must_use]
    pub fn zookeeper_servers(&self) -> &[String] {
        &self.zookeeper_servers
    }

    /// The port Zookeeper nodes listen on.
    #[must_use]
    pub const fn zookeeper_port(&self) -> u16 {
        self.zookeeper_port
    }

    /// DRPC hosts; empty when none are available.
    #[must_use]
    pub fn drpc_servers(&self) -> &[String] {
        &self.drpc_servers
    }

    /// Memory ceiling for the node, in megabytes.
    #[must_use]
    pub const fn max_node_memory_mb(&self) -> u32 {
        self.max_node_memory_mb
    }

    /// `storm.local.dir`, where Storm keeps its state.
    #[must_use]
    pub fn storm_local_dir(&self) -> &str {
        &self.storm_local_dir
    }

    /// Renders the configuration as YAML text.
    ///
    /// Host lists are flow sequences, so an empty list stays an explicit
    /// `[]`.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::Yaml`] when serialization fails.
    pub fn to_yaml(&self) -> Result<String, FormatError> {
        let document = StormYaml {
            zookeeper_servers: FlowSeq(self.zookeeper_servers.as_slice()),
            nimbus_host: &self.nimbus_host,
            zookeeper_port: self.zookeeper_port,
            local_dir: normalize_separators(&self.storm_local_dir),
            drpc_servers: FlowSeq(self.drpc_servers.as_slice()),
        };
        serde_saphyr::to_string(&document).map_err(|error| FormatError::Yaml {
            message: error.to_string(),
        })
    }

    /// Writes the YAML rendering to `writer`.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] when rendering or the writer fails.
    pub fn write_yaml<W: Write>(&self, writer: &mut W) -> Result<(), FormatError> {
        let text = self.to_yaml()?;
        writer
            .write_all(text.as_bytes())
            .and_then(|()| writer.flush())
            .map_err(|source| FormatError::write(None, source))
    }

    /// Writes the YAML rendering to a UTF-8 file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] when rendering fails or the file cannot be
    /// written.
    pub fn write_yaml_file(&self, path: &Path) -> Result<(), FormatError> {
        fs::write(path, self.to_yaml()?)
            .map_err(|source| FormatError::write(Some(path.to_path_buf()), source))
    }
}

/// Serialized shape of `storm.yaml`, keys in the order Storm documents them.
#[derive(Serialize)]
struct StormYaml<'a> {
    #[serde(rename = "storm.zookeeper.servers")]
    zookeeper_servers: FlowSeq<&'a [String]>,
    #[serde(rename = "nimbus.host")]
    nimbus_host: &'a str,
    #[serde(rename = "storm.zookeeper.port")]
    zookeeper_port: u16,
    #[serde(rename = "storm.local.dir")]
    local_dir: String,
    #[serde(rename = "drpc.servers")]
    drpc_servers: FlowSeq<&'a [String]>,
}

/// Builder for [`StormConfig`] carrying the documented defaults.
#[derive(Debug, Clone)]
pub struct StormConfigBuilder {
    nimbus_host: String,
    zookeeper_servers: Vec<String>,
    zookeeper_port: u16,
    drpc_servers: Vec<String>,
    max_node_memory_mb: u32,
    storm_local_dir: String,
}

impl StormConfigBuilder {
    /// Overrides the Zookeeper client port.
    #[must_use]
    pub const fn zookeeper_port(mut self, port: u16) -> Self {
        self.zookeeper_port = port;
        self
    }

    /// Sets the DRPC hosts.
    #[must_use]
    pub fn drpc_servers<I, S>(mut self, servers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.drpc_servers = servers.into_iter().map(Into::into).collect();
        self
    }

    /// Overrides the memory ceiling.
    #[must_use]
    pub const fn max_node_memory_mb(mut self, megabytes: u32) -> Self {
        self.max_node_memory_mb = megabytes;
        self
    }

    /// Overrides `storm.local.dir`.
    #[must_use]
    pub fn storm_local_dir(mut self, directory: impl Into<String>) -> Self {
        self.storm_local_dir = directory.into();
        self
    }

    /// Validates the settings and freezes them.
    ///
    /// # Errors
    ///
    /// Rejects an empty Nimbus host, an empty Zookeeper list, empty host
    /// entries, a zero memory ceiling and an empty local directory.
    pub fn build(self) -> Result<StormConfig, ConstructionError> {
        if self.nimbus_host.is_empty() {
            return Err(ConstructionError::EmptyField {
                field: "nimbus host",
            });
        }
        if self.zookeeper_servers.is_empty() {
            return Err(ConstructionError::EmptyHostList {
                field: "zookeeper servers",
            });
        }
        if self
            .zookeeper_servers
            .iter()
            .chain(&self.drpc_servers)
            .any(String::is_empty)
        {
            return Err(ConstructionError::EmptyField { field: "host name" });
        }
        if self.max_node_memory_mb == 0 {
            return Err(ConstructionError::InvalidValue {
                field: "max node memory",
                message: String::from("must be a positive number of megabytes"),
            });
        }
        if self.storm_local_dir.is_empty() {
            return Err(ConstructionError::EmptyField {
                field: "storm local directory",
            });
        }
        Ok(StormConfig {
            nimbus_host: self.nimbus_host,
            zookeeper_servers: self.zookeeper_servers,
            zookeeper_port: self.zookeeper_port,
            drpc_servers: self.drpc_servers,
            max_node_memory_mb: self.max_node_memory_mb,
            storm_local_dir: self.storm_local_dir,
        })
    }
}
