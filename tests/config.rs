//! Configuration loading from file and environment

use cluster_peers::{Config, Error};
use std::io::Write;
use tempfile::NamedTempFile;

fn toml_file(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_from_file() {
    let file = toml_file(
        r#"
endpoint_name = "db-peers"
minimum_cluster_size = 5
ingress_address = "10.1.2.3"
log_level = "debug"
"#,
    );
    let config = Config::load_from(file.path(), "PEERS_TEST_FILE").unwrap();
    assert_eq!(config.endpoint_name, "db-peers");
    assert_eq!(config.minimum_cluster_size, 5);
    assert_eq!(config.ingress_address, Some("10.1.2.3".parse().unwrap()));
    assert_eq!(config.log_level, "debug");
}

#[test]
fn test_partial_file_keeps_defaults() {
    let file = toml_file("endpoint_name = \"peers\"\n");
    let config = Config::load_from(file.path(), "PEERS_TEST_PARTIAL").unwrap();
    assert_eq!(config.endpoint_name, "peers");
    assert_eq!(config.minimum_cluster_size, 3);
    assert!(config.ingress_address.is_none());
}

#[test]
fn test_environment_overrides_file() {
    let file = toml_file("minimum_cluster_size = 3\n");
    std::env::set_var("PEERS_TEST_ENV_MINIMUM_CLUSTER_SIZE", "7");
    let config = Config::load_from(file.path(), "PEERS_TEST_ENV").unwrap();
    std::env::remove_var("PEERS_TEST_ENV_MINIMUM_CLUSTER_SIZE");
    assert_eq!(config.minimum_cluster_size, 7);
}

#[test]
fn test_rejects_undersized_cluster() {
    let file = toml_file("minimum_cluster_size = 2\n");
    let err = Config::load_from(file.path(), "PEERS_TEST_UNDERSIZED").unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)));
}
