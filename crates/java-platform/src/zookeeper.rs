//! Zookeeper server configuration rendered as `zookeeper.properties`.

use std::path::Path;

use crate::error::{ConstructionError, FormatError};
use crate::paths::normalize_separators;
use crate::properties::PropertiesFile;

/// Default client port.
pub const DEFAULT_CLIENT_PORT: u16 = 2181;
/// Default tick length in milliseconds.
pub const DEFAULT_TICK_TIME_MS: u32 = 2000;
/// Default ticks a follower may take to connect to the leader.
pub const DEFAULT_INIT_LIMIT: u32 = 10;
/// Default ticks a follower may lag behind the leader.
pub const DEFAULT_SYNC_LIMIT: u32 = 5;
/// Default quorum peer port.
pub const DEFAULT_PEER_PORT: u16 = 2888;
/// Default leader election port.
pub const DEFAULT_ELECTION_PORT: u16 = 3888;

/// One member of a Zookeeper ensemble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuorumServer {
    id: u32,
    host: String,
    peer_port: u16,
    election_port: u16,
}

impl QuorumServer {
    /// Builds an ensemble member on the default peer and election ports.
    ///
    /// # Errors
    ///
    /// Rejects an empty host name.
    pub fn new(id: u32, host: impl Into<String>) -> Result<Self, ConstructionError> {
        let host = host.into();
        if host.is_empty() {
            return Err(ConstructionError::EmptyField {
                field: "quorum host",
            });
        }
        Ok(Self {
            id,
            host,
            peer_port: DEFAULT_PEER_PORT,
            election_port: DEFAULT_ELECTION_PORT,
        })
    }

    /// Overrides the peer and election ports.
    #[must_use]
    pub const fn with_ports(mut self, peer_port: u16, election_port: u16) -> Self {
        self.peer_port = peer_port;
        self.election_port = election_port;
        self
    }

    /// Server id written to `myid`.
    #[must_use]
    pub const fn id(&self) -> u32 {
        self.id
    }

    /// Host name.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    fn address(&self) -> String {
        format!("{}:{}:{}", self.host, self.peer_port, self.election_port)
    }
}

/// Settings for one Zookeeper server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZookeeperConfig {
    data_dir: String,
    client_port: u16,
    tick_time_ms: u32,
    init_limit: u32,
    sync_limit: u32,
    servers: Vec<QuorumServer>,
}

impl ZookeeperConfig {
    /// Builds a standalone server configuration storing data in `data_dir`.
    ///
    /// # Errors
    ///
    /// Rejects an empty or non-UTF-8 data directory.
    pub fn new(data_dir: &Path) -> Result<Self, ConstructionError> {
        let text = data_dir.to_str().ok_or_else(|| ConstructionError::InvalidValue {
            field: "data directory",
            message: format!("'{}' is not valid UTF-8", data_dir.display()),
        })?;
        if text.is_empty() {
            return Err(ConstructionError::EmptyField {
                field: "data directory",
            });
        }
        Ok(Self {
            data_dir: normalize_separators(text),
            client_port: DEFAULT_CLIENT_PORT,
            tick_time_ms: DEFAULT_TICK_TIME_MS,
            init_limit: DEFAULT_INIT_LIMIT,
            sync_limit: DEFAULT_SYNC_LIMIT,
            servers: Vec::new(),
        })
    }

    /// Overrides the client port.
    #[must_use]
    pub const fn with_client_port(mut self, port: u16) -> Self {
        self.client_port = port;
        self
    }

    /// Overrides the tick length.
    #[must_use]
    pub const fn with_tick_time_ms(mut self, tick_time_ms: u32) -> Self {
        self.tick_time_ms = tick_time_ms;
        self
    }

    /// Lists the ensemble members, in the order they should be written.
    ///
    /// # Errors
    ///
    /// Rejects duplicate server ids.
    pub fn with_servers(
        mut self,
        servers: impl IntoIterator<Item = QuorumServer>,
    ) -> Result<Self, ConstructionError> {
        let servers: Vec<QuorumServer> = servers.into_iter().collect();
        for (index, server) in servers.iter().enumerate() {
            if servers
                .iter()
                .skip(index + 1)
                .any(|other| other.id == server.id)
            {
                return Err(ConstructionError::InvalidValue {
                    field: "quorum servers",
                    message: format!("server id {} appears more than once", server.id),
                });
            }
        }
        self.servers = servers;
        Ok(self)
    }

    /// Data directory with `/` separators.
    #[must_use]
    pub fn data_dir(&self) -> &str {
        &self.data_dir
    }

    /// Client port.
    #[must_use]
    pub const fn client_port(&self) -> u16 {
        self.client_port
    }

    /// Ensemble members; empty for a standalone server.
    #[must_use]
    pub fn servers(&self) -> &[QuorumServer] {
        &self.servers
    }

    /// Properties understood by `QuorumPeerMain`.
    #[must_use]
    pub fn to_properties(&self) -> PropertiesFile {
        let mut file = PropertiesFile::new()
            .with("tickTime", self.tick_time_ms.to_string())
            .with("dataDir", self.data_dir.clone())
            .with("clientPort", self.client_port.to_string())
            .with("initLimit", self.init_limit.to_string())
            .with("syncLimit", self.sync_limit.to_string());
        for server in &self.servers {
            file.push(format!("server.{}", server.id), server.address());
        }
        file
    }

    /// Renders the configuration to a properties file at `path`.
    ///
    /// # Errors
    ///
    /// Propagates rendering and write failures.
    pub fn write_to_file(&self, path: &Path) -> Result<(), FormatError> {
        self.to_properties().write_to_file(path)
    }
}
