//! Role host for JVM services.
//!
//! The crate hosts a Zookeeper or Storm node inside a managed compute role.
//! [`bootstrap::bootstrap_with`] loads configuration and installs telemetry,
//! then hands back a [`lifecycle::NodeLifecycle`] whose
//! [`lifecycle::RoleEntryPoint`] methods the hosting runtime calls: once to
//! prepare the node and once to run the service for the node's lifetime.
//! Fatal failures are written to a [`diagnostics::DiagnosticSink`] before
//! they are returned.

pub mod bootstrap;
pub mod diagnostics;
pub mod environment;
mod error;
pub mod health;
pub mod layout;
pub mod lifecycle;
pub mod services;
pub mod telemetry;

pub use error::NodeError;

#[cfg(test)]
mod tests;
