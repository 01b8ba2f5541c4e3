//! Shark query service settings and its command-line driver.

use std::path::{Path, PathBuf};

use crate::error::{ConstructionError, ProcessFailure};
use crate::paths::normalize_separators;
use crate::runner::{JavaInvocation, JavaProcess, JavaRunner, classpath_for_jars_in_directories};

/// Entry point of the interactive Shark shell.
pub const SHARK_CLI_MAIN_CLASS: &str = "shark.SharkCliDriver";

/// Settings shared by every Shark JVM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharkConfig {
    server_port: u16,
    metastore_uris: String,
    spark_home: PathBuf,
    spark_master: String,
}

impl SharkConfig {
    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Rejects an empty metastore URI list, Spark home or Spark master.
    pub fn new(
        server_port: u16,
        metastore_uris: impl Into<String>,
        spark_home: impl Into<PathBuf>,
        spark_master: impl Into<String>,
    ) -> Result<Self, ConstructionError> {
        let metastore_uris = metastore_uris.into();
        let spark_home = spark_home.into();
        let spark_master = spark_master.into();
        if metastore_uris.is_empty() {
            return Err(ConstructionError::EmptyField {
                field: "metastore uris",
            });
        }
        if spark_home.as_os_str().is_empty() {
            return Err(ConstructionError::EmptyField {
                field: "spark home",
            });
        }
        if spark_master.is_empty() {
            return Err(ConstructionError::EmptyField {
                field: "spark master",
            });
        }
        Ok(Self {
            server_port,
            metastore_uris,
            spark_home,
            spark_master,
        })
    }

    /// Port the Shark server listens on.
    #[must_use]
    pub const fn server_port(&self) -> u16 {
        self.server_port
    }

    /// Hive metastore Thrift URIs.
    #[must_use]
    pub fn metastore_uris(&self) -> &str {
        &self.metastore_uris
    }

    /// Spark installation root.
    #[must_use]
    pub fn spark_home(&self) -> &Path {
        &self.spark_home
    }

    /// Spark master URL.
    #[must_use]
    pub fn spark_master(&self) -> &str {
        &self.spark_master
    }

    /// System properties passed to every Shark JVM.
    #[must_use]
    pub fn defines(&self) -> Vec<(String, String)> {
        vec![
            (
                String::from("hive.metastore.uris"),
                self.metastore_uris.clone(),
            ),
            (
                String::from("spark.home"),
                normalize_separators(&self.spark_home.to_string_lossy()),
            ),
            (String::from("spark.master"), self.spark_master.clone()),
            (
                String::from("shark.server.port"),
                self.server_port.to_string(),
            ),
        ]
    }
}

/// Starts Shark JVMs from a Shark installation.
#[derive(Debug, Clone)]
pub struct SharkRunner {
    shark_home: PathBuf,
    runner: JavaRunner,
    config: SharkConfig,
}

impl SharkRunner {
    /// Binds a Shark installation to a Java runtime and settings.
    pub fn new(
        shark_home: impl Into<PathBuf>,
        java_home: impl Into<PathBuf>,
        config: SharkConfig,
    ) -> Self {
        Self {
            shark_home: shark_home.into(),
            runner: JavaRunner::new(java_home),
            config,
        }
    }

    /// Shark installation root.
    #[must_use]
    pub fn shark_home(&self) -> &Path {
        &self.shark_home
    }

    /// Builds the shell invocation without starting it.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessFailure::Classpath`] when the Shark or Spark jar
    /// directories cannot be read.
    pub fn cli_invocation(&self) -> Result<JavaInvocation, ProcessFailure> {
        let classpath = classpath_for_jars_in_directories([
            self.shark_home.join("lib"),
            self.config.spark_home.join("jars"),
        ])?;
        Ok(JavaInvocation::new(SHARK_CLI_MAIN_CLASS)
            .classpath(classpath)
            .defines(self.config.defines())
            .env("SHARK_HOME", self.shark_home.as_os_str())
            .env("SPARK_HOME", self.config.spark_home.as_os_str()))
    }

    /// Starts the interactive Shark shell.
    ///
    /// # Errors
    ///
    /// See [`Self::cli_invocation`] and [`JavaRunner::start_class`].
    pub fn run_shark_cli(&self) -> Result<JavaProcess, ProcessFailure> {
        let invocation = self.cli_invocation()?;
        self.runner.start_class(&invocation)
    }
}
