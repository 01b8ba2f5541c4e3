//! Entry point for the `role-host` binary.
//!
//! Bootstraps the node from layered configuration, then runs the start and
//! run phases in order. Any failure ends the process with a failure code so
//! the hosting runtime can restart the role.

use std::process::ExitCode;
use std::sync::Arc;

use role_host::bootstrap::{SystemConfigLoader, bootstrap_with};
use role_host::health::StructuredHealthReporter;
use role_host::lifecycle::RoleEntryPoint;

fn main() -> ExitCode {
    let reporter = Arc::new(StructuredHealthReporter::new());
    let Ok(host) = bootstrap_with(&SystemConfigLoader, reporter) else {
        return ExitCode::FAILURE;
    };
    let role_span = host.telemetry().role_span().clone();
    let _entered = role_span.enter();
    let mut node = host.into_node();

    match node.on_start() {
        Ok(true) => {}
        Ok(false) => {
            tracing::warn!(target: "role_host::main", "start reported the node is not ready");
            return ExitCode::FAILURE;
        }
        Err(error) => {
            tracing::error!(target: "role_host::main", error = %error, "node start failed");
            return ExitCode::FAILURE;
        }
    }

    match node.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(target: "role_host::main", error = %error, "node run failed");
            ExitCode::FAILURE
        }
    }
}
