//! Engine Configuration Tests

use crate::common::*;
use strata_client::{EngineConfig, Error, FetchBucketProperties, Namespace, CONFIG_FILE_NAME};
use tempfile::TempDir;

#[test]
fn client_from_written_default_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    EngineConfig::write_default_if_missing(&path).unwrap();

    let config = EngineConfig::from_file(&path).unwrap();
    assert_eq!(config, EngineConfig::default());

    let (client, _) = create_client_with(&config);
    let fetch = FetchBucketProperties::builder()
        .with_namespace(Namespace::new("b"))
        .build()
        .unwrap();
    assert!(client.execute(&fetch).is_ok());
    client.shutdown();
}

#[test]
fn custom_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "worker_threads = 1\nmax_queue_depth = 8\n").unwrap();

    let config = EngineConfig::from_file(&path).unwrap();
    assert_eq!(config.worker_threads, 1);
    assert_eq!(config.max_queue_depth, 8);

    let (client, cluster) = create_client_with(&config);
    let update = strata_client::UpdateDatatype::builder()
        .with_location(
            strata_client::Location::new("c")
                .with_bucket_type("counters")
                .with_key("k"),
        )
        .with_mutation(strata_client::CounterMutation::new().increment(5))
        .build()
        .unwrap();
    client.execute(&update).unwrap();
    assert_eq!(
        cluster.counter(
            &strata_client::Location::new("c")
                .with_bucket_type("counters")
                .with_key("k")
        ),
        5
    );
    client.shutdown();
}

#[test]
fn invalid_config_is_rejected_at_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "worker_threads = 0\n").unwrap();
    assert!(matches!(
        EngineConfig::from_file(&path),
        Err(Error::InvalidInput { .. })
    ));
}
