use std::collections::BTreeMap;

use serde_json::{Map, Value as JsonValue};
use strata_core::{Engine, Error, IndexValue, Location, Operation, Response, Result};

use super::index_input::{IndexCriteria, IndexInput};
use super::phase::{Function, MapReducePhase};
use crate::adapter::FutureAdapter;
use crate::command::{require, unexpected_response, validate_namespace, ClientFuture, Command};

/// Results of a map-reduce query, keyed by phase index.
///
/// Only phases with `keep` set appear.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapReduceResponse {
    phases: BTreeMap<u32, Vec<JsonValue>>,
}

impl MapReduceResponse {
    /// Wrap per-phase results
    pub fn new(phases: BTreeMap<u32, Vec<JsonValue>>) -> Self {
        Self { phases }
    }

    /// Indexes of the phases that returned results
    pub fn phases(&self) -> impl Iterator<Item = u32> + '_ {
        self.phases.keys().copied()
    }

    /// Results of one phase
    pub fn results_for_phase(&self, phase: u32) -> Option<&[JsonValue]> {
        self.phases.get(&phase).map(Vec::as_slice)
    }

    /// All results, in phase order
    pub fn results_from_all_phases(&self) -> Vec<JsonValue> {
        self.phases.values().flatten().cloned().collect()
    }
}

/// Map-reduce over the objects matched by a secondary index query.
///
/// ```ignore
/// let query = IndexMapReduce::builder()
///     .with_location(Location::new("users"))
///     .with_index("user_id_int")
///     .with_range(0, 19)
///     .with_map_phase(Function::anonymous_js("function(v) { return [v.values[0].data]; }"), true)
///     .build()?;
/// let results = client.execute(&query)?.results_from_all_phases();
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct IndexMapReduce {
    input: IndexInput,
    phases: Vec<MapReducePhase>,
    timeout_ms: Option<u64>,
}

impl IndexMapReduce {
    /// Start building a query
    pub fn builder() -> IndexMapReduceBuilder {
        IndexMapReduceBuilder::default()
    }

    /// The index input
    pub fn input(&self) -> &IndexInput {
        &self.input
    }

    /// The query phases
    pub fn phases(&self) -> &[MapReducePhase] {
        &self.phases
    }

    /// Full request JSON: `{"inputs", "query", "timeout"?}`
    pub fn to_request(&self) -> JsonValue {
        let mut request = Map::new();
        request.insert("inputs".to_string(), self.input.to_wire());
        request.insert(
            "query".to_string(),
            JsonValue::Array(self.phases.iter().map(MapReducePhase::to_wire).collect()),
        );
        if let Some(timeout) = self.timeout_ms {
            request.insert("timeout".to_string(), JsonValue::from(timeout));
        }
        JsonValue::Object(request)
    }
}

impl Command for IndexMapReduce {
    type Response = MapReduceResponse;
    type Info = ();

    fn execute_async(&self, engine: &dyn Engine) -> ClientFuture<MapReduceResponse, ()> {
        let core = engine.execute(Operation::MapReduce {
            request: self.to_request(),
        });
        FutureAdapter::attach(
            core,
            |response| match response {
                Response::MapReduce(phases) => Ok(MapReduceResponse::new(phases)),
                other => Err(unexpected_response("MapReduce", &other)),
            },
            |_| Ok(()),
        )
    }
}

/// Builder for [`IndexMapReduce`].
#[derive(Debug, Clone, Default)]
pub struct IndexMapReduceBuilder {
    location: Option<Location>,
    index: Option<String>,
    criteria: Option<IndexCriteria>,
    phases: Vec<MapReducePhase>,
    timeout_ms: Option<u64>,
}

impl IndexMapReduceBuilder {
    /// Bucket to query. Required.
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Index name, e.g. `user_id_int`. Required.
    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    /// Select objects whose term equals `value`
    pub fn with_match_value(mut self, value: impl Into<IndexValue>) -> Self {
        self.criteria = Some(IndexCriteria::Match(value.into()));
        self
    }

    /// Select objects whose term is in `begin..=end`
    pub fn with_range(mut self, begin: impl Into<IndexValue>, end: impl Into<IndexValue>) -> Self {
        self.criteria = Some(IndexCriteria::Range {
            begin: begin.into(),
            end: end.into(),
        });
        self
    }

    /// Append a map phase
    pub fn with_map_phase(mut self, function: Function, keep: bool) -> Self {
        self.phases.push(MapReducePhase::map(function, keep));
        self
    }

    /// Append a reduce phase
    pub fn with_reduce_phase(mut self, function: Function, keep: bool) -> Self {
        self.phases.push(MapReducePhase::reduce(function, keep));
        self
    }

    /// Append a prepared phase
    pub fn with_phase(mut self, phase: MapReducePhase) -> Self {
        self.phases.push(phase);
        self
    }

    /// Server-side timeout in milliseconds
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Validate and build.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the location, index or criteria is missing,
    /// no phase was added, or the criteria do not fit the index.
    pub fn build(self) -> Result<IndexMapReduce> {
        let location = require(self.location, "Location")?;
        validate_namespace(location.namespace())?;
        let index = require(self.index, "Index")?;
        if index.is_empty() {
            return Err(Error::invalid_input("index name cannot be empty"));
        }
        let criteria = require(self.criteria, "Index criteria")?;
        validate_criteria(&index, &criteria)?;
        if self.phases.is_empty() {
            return Err(Error::invalid_input(
                "map-reduce query needs at least one phase",
            ));
        }
        if self.phases.iter().any(|p| p.function.has_empty_field()) {
            return Err(Error::invalid_input(
                "map-reduce function names cannot be empty",
            ));
        }
        if self.timeout_ms == Some(0) {
            return Err(Error::invalid_input("map-reduce timeout must be positive"));
        }

        Ok(IndexMapReduce {
            input: IndexInput::new(location, index, criteria),
            phases: self.phases,
            timeout_ms: self.timeout_ms,
        })
    }
}

/// Terms must match the index suffix and a range must not be inverted.
fn validate_criteria(index: &str, criteria: &IndexCriteria) -> Result<()> {
    let terms: Vec<&IndexValue> = match criteria {
        IndexCriteria::Match(value) => vec![value],
        IndexCriteria::Range { begin, end } => vec![begin, end],
    };

    let expect_int = index.ends_with("_int");
    let expect_bin = index.ends_with("_bin") || index == "$key";
    for term in &terms {
        let is_int = matches!(term, IndexValue::Int(_));
        if (expect_int && !is_int) || (expect_bin && is_int) {
            return Err(Error::invalid_input(format!(
                "term {} does not fit index '{}'",
                term, index
            )));
        }
    }

    if let IndexCriteria::Range { begin, end } = criteria {
        let same_kind = matches!(
            (begin, end),
            (IndexValue::Int(_), IndexValue::Int(_)) | (IndexValue::Bin(_), IndexValue::Bin(_))
        );
        if !same_kind {
            return Err(Error::invalid_input(
                "range bounds must both be integers or both be strings",
            ));
        }
        if begin > end {
            return Err(Error::invalid_input(format!(
                "range start {} is after end {}",
                begin, end
            )));
        }
    }
    Ok(())
}
