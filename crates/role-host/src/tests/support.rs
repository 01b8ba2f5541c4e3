//! Test doubles for the lifecycle and bootstrap suites.

use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use ortho_config::{OrthoConfig, OrthoError};
use tempfile::TempDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use role_config::Config;

use crate::NodeError;
use crate::bootstrap::{BootstrapError, ConfigLoader};
use crate::diagnostics::{DiagnosticRecord, DiagnosticSink, DiagnosticSinkError};
use crate::environment::{
    DATA_DIR_RESOURCE, DIAGNOSTICS_SINK_SETTING, DiscoveryError, INSTALL_DIR_RESOURCE,
    RoleEnvironment,
};
use crate::health::HealthReporter;
use crate::lifecycle::{NodePhase, NodeState};

/// Install and data roots under one temporary directory.
pub struct NodeRoots {
    root: TempDir,
}

impl NodeRoots {
    pub fn new() -> Self {
        Self {
            root: tempfile::tempdir().expect("failed to create node root"),
        }
    }

    pub fn install(&self) -> PathBuf {
        self.root.path().join("install")
    }

    pub fn data(&self) -> PathBuf {
        self.root.path().join("data")
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Writes a jars archive holding `entries` and returns its path.
    pub fn jars_archive(&self, entries: &[&str]) -> PathBuf {
        let path = self.root.path().join("Jars.zip");
        let file = fs::File::create(&path).expect("failed to create jars archive");
        let mut writer = ZipWriter::new(file);
        for entry in entries {
            writer
                .start_file(*entry, SimpleFileOptions::default())
                .expect("failed to start archive entry");
            writer
                .write_all(b"jar")
                .expect("failed to write archive entry");
        }
        writer.finish().expect("failed to finish jars archive");
        path
    }

    pub fn environment(&self) -> StaticEnvironment {
        StaticEnvironment {
            install: Some(self.install()),
            data: Some(self.data()),
            sink: None,
            instance_id: String::from("Zookeeper_IN_0"),
        }
    }
}

/// Environment answering lookups from fixed values.
#[derive(Debug, Clone)]
pub struct StaticEnvironment {
    pub install: Option<PathBuf>,
    pub data: Option<PathBuf>,
    pub sink: Option<String>,
    pub instance_id: String,
}

impl RoleEnvironment for StaticEnvironment {
    fn local_resource(&self, name: &str) -> Result<PathBuf, DiscoveryError> {
        let root = match name {
            INSTALL_DIR_RESOURCE => self.install.clone(),
            DATA_DIR_RESOURCE => self.data.clone(),
            _ => None,
        };
        root.ok_or_else(|| DiscoveryError::MissingResource {
            name: name.to_owned(),
        })
    }

    fn setting(&self, key: &str) -> Option<String> {
        (key == DIAGNOSTICS_SINK_SETTING)
            .then(|| self.sink.clone())
            .flatten()
    }

    fn instance_id(&self) -> String {
        self.instance_id.clone()
    }
}

/// Sink that keeps every record in memory.
#[derive(Clone, Default)]
pub struct RecordingSink {
    records: Arc<Mutex<Vec<DiagnosticRecord>>>,
}

impl RecordingSink {
    pub fn records(&self) -> Vec<DiagnosticRecord> {
        self.records
            .lock()
            .expect("sink mutex poisoned")
            .clone()
    }
}

impl DiagnosticSink for RecordingSink {
    fn persist(&self, record: &DiagnosticRecord) -> Result<(), DiagnosticSinkError> {
        self.records
            .lock()
            .expect("sink mutex poisoned")
            .push(record.clone());
        Ok(())
    }
}

/// Sink that refuses every record.
#[derive(Clone, Default)]
pub struct FailingSink {
    attempts: Arc<Mutex<usize>>,
}

impl FailingSink {
    pub fn attempts(&self) -> usize {
        *self.attempts.lock().expect("sink mutex poisoned")
    }
}

impl DiagnosticSink for FailingSink {
    fn persist(&self, record: &DiagnosticRecord) -> Result<(), DiagnosticSinkError> {
        *self.attempts.lock().expect("sink mutex poisoned") += 1;
        Err(DiagnosticSinkError::Write {
            path: PathBuf::from(record.name()),
            source: Arc::new(io::Error::other("storage unavailable")),
        })
    }
}

/// Records health events for assertions.
#[derive(Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    /// States entered, in order.
    pub fn states(&self) -> Vec<NodeState> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                HealthEvent::StateChanged(state) => Some(state),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.record(HealthEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn state_changed(&self, _from: NodeState, to: NodeState) {
        self.record(HealthEvent::StateChanged(to));
    }

    fn phase_failed(&self, phase: NodePhase, _error: &NodeError) {
        self.record(HealthEvent::PhaseFailed(phase));
    }
}

/// Structured health events tracked during scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    BootstrapStarting,
    BootstrapSucceeded,
    BootstrapFailed(String),
    StateChanged(NodeState),
    PhaseFailed(NodePhase),
}

/// Loader returning a fixed configuration.
pub struct TestConfigLoader {
    pub config: Config,
}

impl ConfigLoader for TestConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Loader that fails by passing an unknown log format.
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("role-host"),
            OsString::from("--log-format"),
            OsString::from("yaml"),
        ];
        Config::load_from_iter(args)
    }
}

/// Installs a fake `java` launcher under `java_home` that records its
/// arguments to `args.txt` beside it and exits with `code`.
#[cfg(unix)]
pub fn install_fake_java(java_home: &Path, code: i32) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let bin = java_home.join("bin");
    fs::create_dir_all(&bin).expect("failed to create java bin directory");
    let record = java_home.join("args.txt");
    let script = format!(
        "#!/bin/sh\nprintf '%s\\n' \"$@\" > '{}'\nexit {code}\n",
        record.display()
    );
    let java = bin.join("java");
    fs::write(&java, script).expect("failed to write fake java");
    fs::set_permissions(&java, fs::Permissions::from_mode(0o755))
        .expect("failed to mark fake java executable");
    record
}
