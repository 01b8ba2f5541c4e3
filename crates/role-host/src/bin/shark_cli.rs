//! Starts an interactive Shark shell against local Shark, Spark and Java
//! installations and waits for it to exit.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use java_platform::JavaProcess;
use java_platform::shark::{SharkConfig, SharkRunner};
use role_config::{Config, LogFormat};
use role_host::telemetry;

/// Command-line arguments for `shark-cli`.
#[derive(Debug, Parser)]
#[command(name = "shark-cli", about = "Start the Shark command-line shell")]
struct Cli {
    /// Root of the Shark installation.
    shark_root: PathBuf,
    /// Root of the Spark installation.
    spark_root: PathBuf,
    /// Root of the Java runtime.
    java_home: PathBuf,
    /// Port the Shark server listens on.
    #[arg(long, default_value_t = 9444)]
    server_port: u16,
    /// Hive metastore Thrift URIs.
    #[arg(long, default_value = "thrift://localhost:9083")]
    metastore_uris: String,
    /// Spark master URL.
    #[arg(long, default_value = "spark://localhost:7234")]
    spark_master: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let logging = Config {
        log_format: LogFormat::Compact,
        ..Config::default()
    };
    if telemetry::initialise(&logging).is_err() {
        return ExitCode::FAILURE;
    }

    let config = match SharkConfig::new(
        cli.server_port,
        cli.metastore_uris,
        cli.spark_root,
        cli.spark_master,
    ) {
        Ok(config) => config,
        Err(error) => {
            tracing::error!(target: "shark_cli", error = %error, "invalid shark settings");
            return ExitCode::FAILURE;
        }
    };

    let runner = SharkRunner::new(cli.shark_root, cli.java_home, config);
    match runner.run_shark_cli().and_then(JavaProcess::wait) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(target: "shark_cli", error = %error, "shark shell failed");
            ExitCode::FAILURE
        }
    }
}
