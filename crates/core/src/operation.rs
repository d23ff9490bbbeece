//! Engine-level operation descriptors and responses.
//!
//! An [`Operation`] is everything an engine needs to perform one request
//! against the cluster. Commands build exactly one per submission; the engine
//! answers with a [`Response`] through a future whose context is a
//! [`QueryInfo`].
//!
//! Descriptors are:
//! - **Self-contained**: no references back into client state
//! - **Serializable**: can be handed to an out-of-process engine as JSON
//! - **Pure data**: no closures or executable code

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::crdt::CrdtOp;
use crate::types::{BinaryValue, IndexValue, Location, Namespace};

/// One request for the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Read a bucket's properties.
    /// Returns: `Response::BucketProperties`
    FetchBucketProps { namespace: Namespace },

    /// Overwrite the given bucket properties; unset ones are left alone.
    /// Returns: `Response::Unit`
    StoreBucketProps {
        namespace: Namespace,
        properties: BucketProperties,
    },

    /// Write an object. A keyless location lets the cluster pick the key.
    /// Returns: `Response::Stored`
    StoreValue {
        location: Location,
        object: StoredObject,
        return_body: bool,
    },

    /// Apply a CRDT op to the datatype at `location`.
    /// Returns: `Response::DatatypeUpdated`
    UpdateDatatype {
        location: Location,
        op: CrdtOp,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        context: Option<BinaryValue>,
        return_body: bool,
    },

    /// Run a map-reduce job described by a JSON request.
    /// Returns: `Response::MapReduce`
    MapReduce { request: serde_json::Value },
}

impl Operation {
    /// Short name, used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Operation::FetchBucketProps { .. } => "fetch_bucket_props",
            Operation::StoreBucketProps { .. } => "store_bucket_props",
            Operation::StoreValue { .. } => "store_value",
            Operation::UpdateDatatype { .. } => "update_datatype",
            Operation::MapReduce { .. } => "map_reduce",
        }
    }

    /// The context attached to this operation's future
    pub fn query_info(&self) -> QueryInfo {
        match self {
            Operation::FetchBucketProps { namespace }
            | Operation::StoreBucketProps { namespace, .. } => {
                QueryInfo::Namespace(namespace.clone())
            }
            Operation::StoreValue { location, .. } | Operation::UpdateDatatype { location, .. } => {
                QueryInfo::Location(location.clone())
            }
            Operation::MapReduce { .. } => QueryInfo::None,
        }
    }
}

/// Context of an engine future: what the operation was addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryInfo {
    /// A single object or datatype
    Location(Location),
    /// A bucket
    Namespace(Namespace),
    /// Not addressed to one place (map-reduce)
    None,
}

/// Engine answer to an [`Operation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Response {
    /// Success with no payload
    Unit,

    /// Bucket properties
    BucketProperties(BucketProperties),

    /// Object written
    Stored {
        /// Key chosen by the cluster when the location had none
        #[serde(default, skip_serializing_if = "Option::is_none")]
        generated_key: Option<BinaryValue>,
        /// Siblings after the write, when `return_body` was set
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        values: Vec<StoredObject>,
    },

    /// Datatype updated
    DatatypeUpdated {
        /// Key chosen by the cluster when the location had none
        #[serde(default, skip_serializing_if = "Option::is_none")]
        generated_key: Option<BinaryValue>,
        /// Opaque causal context, when `return_body` was set
        #[serde(default, skip_serializing_if = "Option::is_none")]
        context: Option<BinaryValue>,
    },

    /// Map-reduce results keyed by phase index
    MapReduce(BTreeMap<u32, Vec<serde_json::Value>>),
}

impl Response {
    /// Variant name, used in conversion errors
    pub fn variant_name(&self) -> &'static str {
        match self {
            Response::Unit => "Unit",
            Response::BucketProperties(_) => "BucketProperties",
            Response::Stored { .. } => "Stored",
            Response::DatatypeUpdated { .. } => "DatatypeUpdated",
            Response::MapReduce(_) => "MapReduce",
        }
    }
}

/// Bucket properties. `None` means "not set" (on fetch) or "leave as is"
/// (on store).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketProperties {
    /// Replica count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_val: Option<u32>,
    /// Keep concurrent writes as siblings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_mult: Option<bool>,
    /// Resolve conflicts by timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_write_wins: Option<bool>,
    /// Read quorum
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r: Option<u32>,
    /// Write quorum
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<u32>,
    /// Durable write quorum
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dw: Option<u32>,
    /// Search index attached to the bucket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_index: Option<String>,
    /// Datatype of the bucket type (read-only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
}

/// An object body with its content type and secondary-index entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    /// MIME type of `value`
    pub content_type: String,
    /// Object body
    pub value: BinaryValue,
    /// Index name -> terms
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub indexes: BTreeMap<String, BTreeSet<IndexValue>>,
}

impl StoredObject {
    /// An object with no index entries
    pub fn new(content_type: impl Into<String>, value: impl Into<BinaryValue>) -> Self {
        Self {
            content_type: content_type.into(),
            value: value.into(),
            indexes: BTreeMap::new(),
        }
    }

    /// Add one term to a secondary index
    pub fn with_index(mut self, index: impl Into<String>, term: impl Into<IndexValue>) -> Self {
        self.indexes
            .entry(index.into())
            .or_default()
            .insert(term.into());
        self
    }
}
