//! Secondary-Index Map-Reduce Tests
//!
//! 200 objects are written with a `user_id_int` index, then selected by an
//! exact match or a range, in the default bucket type and in a custom one.

use crate::common::*;
use strata_client::{
    Function, IndexMapReduce, Location, StoreValue, StoredObject, StrataClient, DEFAULT_BUCKET_TYPE,
};

const BUCKET: &str = "mr_test";
const OBJECTS: i64 = 200;

fn mr_location(bucket_type: &str) -> Location {
    Location::new(BUCKET).with_bucket_type(bucket_type)
}

/// Object `i` gets index term `term(i)`.
fn init_values(client: &StrataClient, bucket_type: &str, term: impl Fn(i64) -> i64) {
    let futures: Vec<_> = (0..OBJECTS)
        .map(|i| {
            let object = StoredObject::new("text/plain", i.to_string()).with_index("user_id_int", term(i));
            let store = StoreValue::builder()
                .with_location(mr_location(bucket_type).with_key(format!("mr_test_{}", i)))
                .with_object(object)
                .build()
                .unwrap();
            client.execute_async(&store)
        })
        .collect();
    for future in futures {
        future.wait();
        assert!(future.is_success(), "store failed: {:?}", future.cause());
    }
}

fn value_map_phase() -> Function {
    Function::anonymous_js(
        "function(value, keydata, arg) {  var data = value.values[0].data;  return [data];}",
    )
}

fn match_query(bucket_type: &str) -> IndexMapReduce {
    IndexMapReduce::builder()
        .with_location(mr_location(bucket_type))
        .with_index("user_id_int")
        .with_match_value(1i64)
        .with_map_phase(value_map_phase(), true)
        .build()
        .unwrap()
}

fn range_query(bucket_type: &str) -> IndexMapReduce {
    IndexMapReduce::builder()
        .with_location(mr_location(bucket_type))
        .with_index("user_id_int")
        .with_range(0i64, 19i64)
        .with_map_phase(value_map_phase(), true)
        .build()
        .unwrap()
}

#[test]
fn match_index() {
    let (client, _) = create_client();
    init_values(&client, DEFAULT_BUCKET_TYPE, |_| 1);
    let response = client.execute(&match_query(DEFAULT_BUCKET_TYPE)).unwrap();
    assert_eq!(response.results_from_all_phases().len(), 200);
}

#[test]
fn match_index_diff_type() {
    let (client, _) = create_client();
    init_values(&client, "indexed", |_| 1);
    let response = client.execute(&match_query("indexed")).unwrap();
    assert_eq!(response.results_from_all_phases().len(), 200);
}

#[test]
fn range_index() {
    let (client, _) = create_client();
    init_values(&client, DEFAULT_BUCKET_TYPE, |i| i);
    let response = client.execute(&range_query(DEFAULT_BUCKET_TYPE)).unwrap();
    assert_eq!(response.results_from_all_phases().len(), 20);
}

#[test]
fn range_index_diff_type() {
    let (client, _) = create_client();
    init_values(&client, "indexed", |i| i);
    let response = client.execute(&range_query("indexed")).unwrap();
    assert_eq!(response.results_from_all_phases().len(), 20);
}

#[test]
fn other_bucket_types_are_not_matched() {
    let (client, _) = create_client();
    init_values(&client, "indexed", |_| 1);
    let response = client.execute(&match_query(DEFAULT_BUCKET_TYPE)).unwrap();
    assert!(response.results_from_all_phases().is_empty());
}

#[test]
fn wire_request_uses_bare_name_for_default_type() {
    let request = match_query(DEFAULT_BUCKET_TYPE).to_request();
    assert_eq!(
        serde_json::to_string(&request["inputs"]).unwrap(),
        r#"{"bucket":"mr_test","index":"user_id_int","key":1}"#
    );

    let request = range_query("indexed").to_request();
    assert_eq!(
        serde_json::to_string(&request["inputs"]).unwrap(),
        r#"{"bucket":["indexed","mr_test"],"index":"user_id_int","start":0,"end":19}"#
    );
}

#[test]
fn unkept_phases_are_not_returned() {
    let (client, _) = create_client();
    init_values(&client, DEFAULT_BUCKET_TYPE, |i| i);
    let query = IndexMapReduce::builder()
        .with_location(mr_location(DEFAULT_BUCKET_TYPE))
        .with_index("user_id_int")
        .with_range(0i64, 4i64)
        .with_map_phase(value_map_phase(), false)
        .with_reduce_phase(Function::named_js("Riak.reduceSort"), true)
        .build()
        .unwrap();
    let response = client.execute(&query).unwrap();
    assert_eq!(response.phases().collect::<Vec<_>>(), vec![1]);
    assert_eq!(response.results_for_phase(1).map(<[_]>::len), Some(5));
}
