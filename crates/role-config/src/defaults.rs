//! Fallback values applied when no layer sets a field.

/// Zookeeper client port used by a standalone ensemble.
pub const DEFAULT_ZOOKEEPER_PORT: u16 = 2181;

/// Tracing filter used when nothing narrower is configured.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Instance identity for a host run outside a managed role.
pub const DEFAULT_INSTANCE_ID: &str = "local-instance";

/// Coordination and master host for a single-machine cluster.
pub const DEFAULT_HOST: &str = "localhost";

pub(crate) fn instance_id() -> String {
    DEFAULT_INSTANCE_ID.to_owned()
}

pub(crate) fn host() -> String {
    DEFAULT_HOST.to_owned()
}

pub(crate) const fn zookeeper_port() -> u16 {
    DEFAULT_ZOOKEEPER_PORT
}

pub(crate) fn log_filter() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}
