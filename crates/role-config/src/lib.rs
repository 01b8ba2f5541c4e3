//! Layered configuration shared by the role host binaries.
//!
//! Settings stand in for the host runtime's configuration lookups: local
//! resource roots, bundled artefact locations, the diagnostics sink and the
//! handful of cluster addresses a service needs. Values merge from defaults,
//! an optional configuration file, `ROLE_*` environment variables and CLI
//! flags, in that order of precedence.

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

mod defaults;
mod service;

pub use defaults::{DEFAULT_HOST, DEFAULT_INSTANCE_ID, DEFAULT_LOG_FILTER, DEFAULT_ZOOKEEPER_PORT};
pub use service::{ServiceKind, ServiceParseError, StormRole};

/// Shape of the host's log lines on stderr.
///
/// Parses case-insensitively, so `--log-format JSON` is accepted.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One JSON object per event, with the role span's fields flattened in.
    #[default]
    Json,
    /// Single-line text for an operator reading a console.
    Compact,
}

/// Resolved configuration for one role instance.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, OrthoConfig)]
#[ortho_config(prefix = "ROLE")]
pub struct Config {
    /// Service hosted by this instance.
    #[serde(default)]
    pub service: ServiceKind,
    /// Storm daemon flavour when `service` is Storm.
    #[serde(default)]
    pub storm_role: StormRole,
    /// Root of the `InstallDir` local resource.
    #[serde(default)]
    pub install_dir: Option<Utf8PathBuf>,
    /// Root of the `DataDir` local resource.
    #[serde(default)]
    pub data_dir: Option<Utf8PathBuf>,
    /// Identity of this role instance.
    #[serde(default = "defaults::instance_id")]
    pub instance_id: String,
    /// Bundled zip archive holding the service jars.
    #[serde(default)]
    pub jars_archive: Option<Utf8PathBuf>,
    /// Bundled gzip-compressed tar package holding the JDK.
    #[serde(default)]
    pub jdk_package: Option<Utf8PathBuf>,
    /// Location of the diagnostics sink container.
    #[serde(default)]
    pub diagnostics_sink: Option<String>,
    /// Host running the Storm master.
    #[serde(default = "defaults::host")]
    pub nimbus_host: String,
    /// Comma-separated Zookeeper hosts, primary first.
    #[serde(default = "defaults::host")]
    pub zookeeper_servers: String,
    /// Port the Zookeeper ensemble listens on for clients.
    #[serde(default = "defaults::zookeeper_port")]
    pub zookeeper_port: u16,
    /// Comma-separated DRPC hosts.
    #[serde(default)]
    pub drpc_servers: String,
    /// Tracing filter expression.
    #[serde(default = "defaults::log_filter")]
    pub log_filter: String,
    /// Tracing output format.
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceKind::default(),
            storm_role: StormRole::default(),
            install_dir: None,
            data_dir: None,
            instance_id: defaults::instance_id(),
            jars_archive: None,
            jdk_package: None,
            diagnostics_sink: None,
            nimbus_host: defaults::host(),
            zookeeper_servers: defaults::host(),
            zookeeper_port: DEFAULT_ZOOKEEPER_PORT,
            drpc_servers: String::new(),
            log_filter: defaults::log_filter(),
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    /// Service hosted by this instance.
    #[must_use]
    pub const fn service(&self) -> ServiceKind {
        self.service
    }

    /// Storm daemon flavour.
    #[must_use]
    pub const fn storm_role(&self) -> StormRole {
        self.storm_role
    }

    /// Root of the `InstallDir` local resource, when configured.
    #[must_use]
    pub fn install_dir(&self) -> Option<&Utf8Path> {
        self.install_dir.as_deref()
    }

    /// Root of the `DataDir` local resource, when configured.
    #[must_use]
    pub fn data_dir(&self) -> Option<&Utf8Path> {
        self.data_dir.as_deref()
    }

    /// Identity of this role instance.
    #[must_use]
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Bundled jars archive, when configured.
    #[must_use]
    pub fn jars_archive(&self) -> Option<&Utf8Path> {
        self.jars_archive.as_deref()
    }

    /// Bundled JDK package, when configured.
    #[must_use]
    pub fn jdk_package(&self) -> Option<&Utf8Path> {
        self.jdk_package.as_deref()
    }

    /// Diagnostics sink location, when configured.
    #[must_use]
    pub fn diagnostics_sink(&self) -> Option<&str> {
        self.diagnostics_sink.as_deref()
    }

    /// Host running the Storm master.
    #[must_use]
    pub fn nimbus_host(&self) -> &str {
        &self.nimbus_host
    }

    /// Zookeeper hosts in configured order.
    #[must_use]
    pub fn zookeeper_server_list(&self) -> Vec<String> {
        split_hosts(&self.zookeeper_servers)
    }

    /// Zookeeper client port.
    #[must_use]
    pub const fn zookeeper_port(&self) -> u16 {
        self.zookeeper_port
    }

    /// DRPC hosts in configured order; empty when none are configured.
    #[must_use]
    pub fn drpc_server_list(&self) -> Vec<String> {
        split_hosts(&self.drpc_servers)
    }

    /// Tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Tracing output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}

fn split_hosts(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|host| !host.is_empty())
        .map(str::to_owned)
        .collect()
}
