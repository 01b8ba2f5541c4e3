//! Cross-module tests: definitions rendered to disk and fed to the launcher.

use std::fs;
use std::path::Path;

use rstest::{fixture, rstest};
use tempfile::TempDir;

use crate::log4j::service_log4j_config;
use crate::{JavaInvocation, PropertiesFile, QuorumServer, StormConfig, ZookeeperConfig};

#[fixture]
fn node_root() -> TempDir {
    let root = tempfile::tempdir().expect("tempdir");
    for directory in ["Config", "Logs", "Data"] {
        fs::create_dir_all(root.path().join(directory)).expect("mkdir");
    }
    root
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).expect("read rendered file")
}

#[rstest]
fn zookeeper_node_files_render_to_disk(node_root: TempDir) {
    let config_dir = node_root.path().join("Config");
    let zookeeper = ZookeeperConfig::new(&node_root.path().join("Data"))
        .expect("zookeeper config")
        .with_servers([
            QuorumServer::new(1, "zk-0").expect("server"),
            QuorumServer::new(2, "zk-1").expect("server"),
        ])
        .expect("servers");
    let logging = service_log4j_config(&node_root.path().join("Logs")).expect("logging");

    zookeeper
        .write_to_file(&config_dir.join("zookeeper.properties"))
        .expect("write zookeeper config");
    logging
        .write_to_file(&config_dir.join("log4j.properties"))
        .expect("write log4j config");

    let zookeeper_text = read(&config_dir.join("zookeeper.properties"));
    assert!(zookeeper_text.starts_with("tickTime=2000\n"));
    assert!(zookeeper_text.ends_with("server.1=zk-0:2888:3888\nserver.2=zk-1:2888:3888\n"));
    assert!(!zookeeper_text.contains('\\'));

    let logging_text = read(&config_dir.join("log4j.properties"));
    assert!(logging_text.starts_with("log4j.rootLogger=INFO,stdout,file\n"));
}

#[rstest]
fn rewriting_files_replaces_previous_content(node_root: TempDir) {
    let path = node_root.path().join("Config").join("storm.yaml");
    fs::write(&path, "stale: true\nleftover: [x]\n").expect("seed stale file");

    let config = StormConfig::new("h1", ["z1", "z2"]).expect("storm config");
    config.write_yaml_file(&path).expect("write storm config");

    assert_eq!(read(&path), config.to_yaml().expect("render"));
}

#[test]
fn rendered_paths_feed_launcher_arguments() {
    let properties: PropertiesFile = [("clientPort", "2181")].into_iter().collect();
    assert_eq!(properties.render().expect("render"), "clientPort=2181\n");

    let arguments = JavaInvocation::new("org.apache.zookeeper.server.quorum.QuorumPeerMain")
        .define("log4j.configuration", "file:/node/Config/log4j.properties")
        .argument("/node/Config/zookeeper.properties")
        .arguments()
        .expect("arguments");
    let rendered: Vec<String> = arguments
        .iter()
        .map(|argument| argument.to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        rendered,
        [
            "-Dlog4j.configuration=file:/node/Config/log4j.properties",
            "org.apache.zookeeper.server.quorum.QuorumPeerMain",
            "/node/Config/zookeeper.properties",
        ]
    );
}
