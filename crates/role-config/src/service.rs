//! Selection of the JVM service hosted by a role instance.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// JVM service launched by the role host.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ServiceKind {
    /// A Zookeeper quorum member.
    #[default]
    Zookeeper,
    /// A Storm daemon; the daemon flavour comes from [`StormRole`].
    Storm,
}

/// Storm daemon flavour hosted by a Storm role instance.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum StormRole {
    /// The Nimbus master.
    Nimbus,
    /// A worker supervisor.
    #[default]
    Supervisor,
    /// The web UI.
    Ui,
    /// A DRPC server.
    Drpc,
}

impl StormRole {
    /// Fully-qualified entry-point class for the daemon.
    #[must_use]
    pub const fn main_class(self) -> &'static str {
        match self {
            Self::Nimbus => "backtype.storm.daemon.nimbus",
            Self::Supervisor => "backtype.storm.daemon.supervisor",
            Self::Ui => "backtype.storm.ui.core",
            Self::Drpc => "backtype.storm.daemon.drpc",
        }
    }
}

/// Errors encountered while parsing a [`ServiceKind`] or [`StormRole`].
pub type ServiceParseError = strum::ParseError;

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::lower("zookeeper", ServiceKind::Zookeeper)]
    #[case::mixed("Storm", ServiceKind::Storm)]
    fn parses_service_kind(#[case] text: &str, #[case] expected: ServiceKind) {
        assert_eq!(ServiceKind::from_str(text).expect("parse kind"), expected);
    }

    #[test]
    fn rejects_unknown_service() {
        assert!(ServiceKind::from_str("kafka").is_err());
    }

    #[rstest]
    #[case::nimbus(StormRole::Nimbus, "backtype.storm.daemon.nimbus")]
    #[case::supervisor(StormRole::Supervisor, "backtype.storm.daemon.supervisor")]
    #[case::ui(StormRole::Ui, "backtype.storm.ui.core")]
    fn storm_roles_map_to_daemon_classes(#[case] role: StormRole, #[case] class: &str) {
        assert_eq!(role.main_class(), class);
    }
}
