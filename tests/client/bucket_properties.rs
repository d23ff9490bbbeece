//! Bucket Property Tests

use crate::common::*;
use strata_client::{FetchBucketProperties, Namespace, StoreBucketProperties};

fn fetch(namespace: Namespace) -> FetchBucketProperties {
    FetchBucketProperties::builder()
        .with_namespace(namespace)
        .build()
        .unwrap()
}

#[test]
fn fetch_unknown_bucket_returns_defaults() {
    let (client, _) = create_client();
    let props = client.execute(&fetch(Namespace::new("fresh"))).unwrap();
    assert_eq!(props.n_val, None);
    assert_eq!(props.allow_mult, None);
}

#[test]
fn store_then_fetch() {
    let (client, _) = create_client();
    let ns = Namespace::with_type("indexed", "users");

    let store = StoreBucketProperties::builder()
        .with_namespace(ns.clone())
        .with_n_val(3)
        .with_allow_mult(true)
        .build()
        .unwrap();
    client.execute(&store).unwrap();

    let props = client.execute(&fetch(ns.clone())).unwrap();
    assert_eq!(props.n_val, Some(3));
    assert_eq!(props.allow_mult, Some(true));

    // Unset properties are left alone by a later store
    let store = StoreBucketProperties::builder()
        .with_namespace(ns.clone())
        .with_search_index("users_idx")
        .build()
        .unwrap();
    client.execute(&store).unwrap();

    let props = client.execute(&fetch(ns)).unwrap();
    assert_eq!(props.n_val, Some(3));
    assert_eq!(props.search_index.as_deref(), Some("users_idx"));
}

#[test]
fn fetch_reports_namespace_as_query_info() {
    let (client, _) = create_client();
    let ns = Namespace::with_type("maps", "carts");
    let future = client.execute_async(&fetch(ns.clone()));
    future.wait();
    assert_eq!(future.query_info(), Some(ns));
}

#[test]
fn bucket_types_are_separate() {
    let (client, _) = create_client();
    let store = StoreBucketProperties::builder()
        .with_namespace(Namespace::with_type("a", "shared"))
        .with_n_val(5)
        .build()
        .unwrap();
    client.execute(&store).unwrap();

    let other = client
        .execute(&fetch(Namespace::with_type("b", "shared")))
        .unwrap();
    assert_eq!(other.n_val, None);
}
