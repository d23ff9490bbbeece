//! Datatype Update Tests

use crate::common::*;
use strata_client::{
    CounterMutation, CounterOp, CrdtOp, DatatypeMutation, FieldKind, FieldUpdate, Location,
    MapEntryOp, MapMutation, SetMutation, UpdateDatatype,
};

fn counter_location() -> Location {
    Location::new("page_views")
        .with_bucket_type("counters")
        .with_key("home")
}

#[test]
fn counter_updates_accumulate_on_cluster() {
    let (client, cluster) = create_client();
    for amount in [3, 4] {
        let update = UpdateDatatype::builder()
            .with_location(counter_location())
            .with_mutation(DatatypeMutation::for_counter().increment(amount))
            .build()
            .unwrap();
        client.execute(&update).unwrap();
    }
    assert_eq!(cluster.counter(&counter_location()), 7);
}

#[test]
fn map_update_folds_repeated_fields() {
    let (client, cluster) = create_client();
    let location = Location::new("profiles").with_bucket_type("maps").with_key("alice");
    let mutation = DatatypeMutation::for_map()
        .update_counter("logins", CounterMutation::new().increment(3))
        .update_set("tags", SetMutation::new().add("admin"))
        .update_counter("logins", CounterMutation::new().increment(4))
        .update_set("tags", SetMutation::new().add("ops").remove("admin"))
        .update_map("address", MapMutation::new().update_register("city", "Lisbon"))
        .update_flag("verified", true);

    let update = UpdateDatatype::builder()
        .with_location(location.clone())
        .with_mutation(mutation)
        .build()
        .unwrap();
    client.execute(&update).unwrap();

    let ops = cluster.datatype_ops();
    assert_eq!(ops.len(), 1);
    let (stored_at, CrdtOp::Map(map)) = &ops[0] else {
        panic!("expected a map op, got {:?}", ops[0].1);
    };
    assert_eq!(stored_at, &location);

    let names: Vec<_> = map.entries.iter().map(|e| e.field.to_string()).collect();
    assert_eq!(
        names,
        vec!["logins_counter", "tags_set", "address_map", "verified_flag"]
    );
    assert_eq!(
        map.get("logins", FieldKind::Counter),
        Some(&MapEntryOp::Update(FieldUpdate::Counter(CounterOp { increment: 7 })))
    );
    let Some(MapEntryOp::Update(FieldUpdate::Set(tags))) = map.get("tags", FieldKind::Set) else {
        panic!("expected set update");
    };
    assert_eq!(tags.adds, vec!["ops".into()]);
    assert_eq!(tags.removes, vec!["admin".into()]);
}

#[test]
fn keyless_update_gets_generated_key() {
    let (client, _) = create_client();
    let update = UpdateDatatype::builder()
        .with_location(Location::new("carts").with_bucket_type("sets"))
        .with_mutation(DatatypeMutation::for_set().add("apple"))
        .build()
        .unwrap();
    let response = client.execute(&update).unwrap();
    assert!(response.generated_key.is_some());
    assert!(response.context.is_none());
}

#[test]
fn return_body_yields_context() {
    let (client, _) = create_client();
    let update = UpdateDatatype::builder()
        .with_location(counter_location())
        .with_mutation(CounterMutation::new().increment(1))
        .with_return_body(true)
        .build()
        .unwrap();
    let response = client.execute(&update).unwrap();
    assert!(response.context.is_some());
}

#[test]
fn same_command_executes_independently() {
    let (client, cluster) = create_client();
    let update = UpdateDatatype::builder()
        .with_location(counter_location())
        .with_mutation(CounterMutation::new().increment(2))
        .build()
        .unwrap();
    client.execute(&update).unwrap();
    client.execute(&update).unwrap();
    assert_eq!(cluster.counter(&counter_location()), 4);
}
