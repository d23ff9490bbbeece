//! Common test utilities for client tests

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::Value as JsonValue;
use strata_client::{
    BucketProperties, CrdtOp, EngineConfig, Error, IndexCriteria, IndexInput, IndexValue,
    Location, Namespace, Operation, Response, Result, StoredObject, StrataClient,
};

/// Route `tracing` output to the test harness
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// In-memory stand-in for a cluster, answering operations the way the
/// server would for the subset the tests use.
#[derive(Default)]
pub struct MemoryCluster {
    buckets: Mutex<HashMap<Namespace, BucketProperties>>,
    objects: Mutex<HashMap<Location, StoredObject>>,
    counters: Mutex<HashMap<Location, i64>>,
    datatype_ops: Mutex<Vec<(Location, CrdtOp)>>,
    next_id: AtomicU64,
}

impl MemoryCluster {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn handle(&self, op: &Operation) -> Result<Response> {
        match op {
            Operation::FetchBucketProps { namespace } => Ok(Response::BucketProperties(
                self.buckets.lock().get(namespace).cloned().unwrap_or_default(),
            )),
            Operation::StoreBucketProps {
                namespace,
                properties,
            } => {
                let mut buckets = self.buckets.lock();
                let current = buckets.entry(namespace.clone()).or_default();
                merge_properties(current, properties);
                Ok(Response::Unit)
            }
            Operation::StoreValue {
                location,
                object,
                return_body,
            } => {
                let (location, generated_key) = self.assign_key(location);
                self.objects.lock().insert(location, object.clone());
                Ok(Response::Stored {
                    generated_key,
                    values: if *return_body {
                        vec![object.clone()]
                    } else {
                        vec![]
                    },
                })
            }
            Operation::UpdateDatatype {
                location,
                op,
                return_body,
                ..
            } => {
                let (location, generated_key) = self.assign_key(location);
                if let CrdtOp::Counter(counter) = op {
                    *self.counters.lock().entry(location.clone()).or_default() +=
                        counter.increment;
                }
                self.datatype_ops.lock().push((location, op.clone()));
                let context = return_body.then(|| {
                    format!("ctx-{}", self.next_id.fetch_add(1, Ordering::Relaxed)).into()
                });
                Ok(Response::DatatypeUpdated {
                    generated_key,
                    context,
                })
            }
            Operation::MapReduce { request } => self.map_reduce(request),
        }
    }

    pub fn counter(&self, location: &Location) -> i64 {
        self.counters.lock().get(location).copied().unwrap_or(0)
    }

    pub fn datatype_ops(&self) -> Vec<(Location, CrdtOp)> {
        self.datatype_ops.lock().clone()
    }

    fn assign_key(&self, location: &Location) -> (Location, Option<strata_client::BinaryValue>) {
        match location.key() {
            Some(_) => (location.clone(), None),
            None => {
                let key = format!("gen-{}", self.next_id.fetch_add(1, Ordering::Relaxed));
                (location.clone().with_key(key.as_str()), Some(key.into()))
            }
        }
    }

    /// Runs every map phase as "return the object's value". Results are
    /// returned for kept phases only.
    fn map_reduce(&self, request: &JsonValue) -> Result<Response> {
        let input = IndexInput::from_wire(&request["inputs"])?;
        let phases = request["query"]
            .as_array()
            .ok_or_else(|| Error::Remote {
                reason: "query must be an array".into(),
            })?;

        let objects = self.objects.lock();
        let mut matched: Vec<(&Location, &StoredObject)> = objects
            .iter()
            .filter(|(loc, obj)| {
                loc.namespace() == input.location().namespace()
                    && obj
                        .indexes
                        .get(input.index())
                        .is_some_and(|terms| terms.iter().any(|t| term_matches(t, input.criteria())))
            })
            .collect();
        matched.sort_by(|a, b| a.0.key().cmp(&b.0.key()));

        let values: Vec<JsonValue> = matched
            .iter()
            .map(|(_, obj)| JsonValue::String(obj.value.to_string_lossy()))
            .collect();

        let mut results = std::collections::BTreeMap::new();
        for (i, phase) in phases.iter().enumerate() {
            let body = phase.get("map").or_else(|| phase.get("reduce"));
            if body.and_then(|b| b["keep"].as_bool()).unwrap_or(false) {
                results.insert(i as u32, values.clone());
            }
        }
        Ok(Response::MapReduce(results))
    }
}

fn term_matches(term: &IndexValue, criteria: &IndexCriteria) -> bool {
    match criteria {
        IndexCriteria::Match(value) => term == value,
        IndexCriteria::Range { begin, end } => begin <= term && term <= end,
    }
}

fn merge_properties(current: &mut BucketProperties, update: &BucketProperties) {
    macro_rules! take {
        ($($field:ident),*) => {
            $(if update.$field.is_some() {
                current.$field = update.$field.clone();
            })*
        };
    }
    take!(n_val, allow_mult, last_write_wins, r, w, dw, search_index);
}

/// Client backed by a fresh [`MemoryCluster`]
pub fn create_client() -> (StrataClient, Arc<MemoryCluster>) {
    create_client_with(&EngineConfig::default())
}

/// Client with a specific engine configuration
pub fn create_client_with(config: &EngineConfig) -> (StrataClient, Arc<MemoryCluster>) {
    init_tracing();
    let cluster = MemoryCluster::new();
    let handler_cluster = Arc::clone(&cluster);
    let client = StrataClient::local(config, move |op: &Operation| handler_cluster.handle(op))
        .unwrap();
    (client, cluster)
}
