//! Building blocks for hosting JVM services on a role instance.
//!
//! The crate covers the pieces a role host needs before and while a Java
//! service runs:
//!
//! - a typed definition model for log4j loggers and appenders, Zookeeper,
//!   Storm and Shark settings;
//! - renderers that turn those definitions into the exact text formats the
//!   services read (Java properties and flat YAML mappings);
//! - an artifact stager that unpacks bundled jars and the JDK;
//! - a process launcher that assembles classpaths and `-D` defines and
//!   starts the JVM.
//!
//! Definitions validate their inputs on construction and are read-only
//! afterwards. Renderers never pick a destination; callers hand them a writer
//! or a path.

mod error;
pub mod log4j;
mod paths;
pub mod properties;
pub mod runner;
pub mod shark;
pub mod staging;
pub mod storm;
pub mod zookeeper;

pub use error::{ConstructionError, FormatError, ProcessFailure, StagingError};
pub use paths::normalize_separators;
pub use properties::PropertiesFile;
pub use runner::{JavaInvocation, JavaProcess, JavaRunner, classpath_for_jars_in_directories};
pub use storm::StormConfig;
pub use zookeeper::{QuorumServer, ZookeeperConfig};

#[cfg(test)]
mod tests;
