//! Secondary-index map-reduce input.
//!
//! Wire shape, fields in this order:
//!
//! | Field | Default bucket type | Other bucket types |
//! |-------|---------------------|--------------------|
//! | `bucket` | `"name"` | `["type", "name"]` |
//! | `index` | `"name_int"` | `"name_int"` |
//! | `key` (match) | term | term |
//! | `start`, `end` (range) | terms | terms |
//!
//! The cluster rejects an explicit `["default", name]` pair, so the default
//! type is always written as a bare bucket name.

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use strata_core::{Error, IndexValue, Location, Result};

/// Which index terms select the input objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexCriteria {
    /// Objects whose term equals the value
    Match(IndexValue),
    /// Objects whose term falls in `begin..=end`
    Range {
        /// Lower bound, inclusive
        begin: IndexValue,
        /// Upper bound, inclusive
        end: IndexValue,
    },
}

/// Map-reduce input drawn from a secondary index query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexInput {
    location: Location,
    index: String,
    criteria: IndexCriteria,
}

impl IndexInput {
    /// Bundle a bucket, index name and criteria
    pub fn new(location: Location, index: impl Into<String>, criteria: IndexCriteria) -> Self {
        Self {
            location,
            index: index.into(),
            criteria,
        }
    }

    /// The bucket queried. Any key on the location is ignored.
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Index name
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Term criteria
    pub fn criteria(&self) -> &IndexCriteria {
        &self.criteria
    }

    /// JSON form for the `inputs` field of a map-reduce request.
    pub fn to_wire(&self) -> JsonValue {
        serialize_index_input(&self.location, &self.index, &self.criteria)
    }

    /// Parse the JSON produced by [`to_wire`](Self::to_wire).
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if a field is missing or has the wrong shape.
    pub fn from_wire(json: &JsonValue) -> Result<Self> {
        let obj = json
            .as_object()
            .ok_or_else(|| Error::serialization("index input must be a JSON object"))?;

        let location = match obj.get("bucket") {
            Some(JsonValue::String(name)) => Location::new(name.as_str()),
            Some(JsonValue::Array(pair)) => match pair.as_slice() {
                [JsonValue::String(bucket_type), JsonValue::String(name)] => {
                    Location::new(name.as_str()).with_bucket_type(bucket_type.as_str())
                }
                _ => {
                    return Err(Error::serialization(
                        "index input bucket must be [type, name]",
                    ))
                }
            },
            Some(_) => {
                return Err(Error::serialization(
                    "index input bucket must be a string or [type, name]",
                ))
            }
            None => return Err(Error::serialization("index input missing 'bucket'")),
        };

        let index = obj
            .get("index")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| Error::serialization("index input missing string 'index'"))?;

        let criteria = match (obj.get("key"), obj.get("start"), obj.get("end")) {
            (Some(key), None, None) => IndexCriteria::Match(term_from_json(key)?),
            (None, Some(start), Some(end)) => IndexCriteria::Range {
                begin: term_from_json(start)?,
                end: term_from_json(end)?,
            },
            _ => {
                return Err(Error::serialization(
                    "index input needs either 'key' or both 'start' and 'end'",
                ))
            }
        };

        Ok(Self::new(location, index, criteria))
    }
}

/// Write the index input JSON for `location`, `index` and `criteria`.
///
/// Only the bucket type and name of `location` are used. Both are written
/// as JSON strings, so bytes that are not valid UTF-8 become U+FFFD and the
/// written name no longer round-trips to the original bytes.
pub fn serialize_index_input(
    location: &Location,
    index: &str,
    criteria: &IndexCriteria,
) -> JsonValue {
    let mut obj = Map::new();

    let bucket_name = location.bucket_name().to_string_lossy();
    let bucket = if location.has_default_type() {
        JsonValue::String(bucket_name)
    } else {
        JsonValue::Array(vec![
            JsonValue::String(location.bucket_type().to_string_lossy()),
            JsonValue::String(bucket_name),
        ])
    };
    obj.insert("bucket".to_string(), bucket);
    obj.insert("index".to_string(), JsonValue::String(index.to_string()));

    match criteria {
        IndexCriteria::Match(value) => {
            obj.insert("key".to_string(), term_to_json(value));
        }
        IndexCriteria::Range { begin, end } => {
            obj.insert("start".to_string(), term_to_json(begin));
            obj.insert("end".to_string(), term_to_json(end));
        }
    }

    JsonValue::Object(obj)
}

fn term_to_json(term: &IndexValue) -> JsonValue {
    match term {
        IndexValue::Int(n) => JsonValue::from(*n),
        IndexValue::Bin(s) => JsonValue::String(s.clone()),
    }
}

fn term_from_json(json: &JsonValue) -> Result<IndexValue> {
    match json {
        JsonValue::Number(n) => n
            .as_i64()
            .map(IndexValue::Int)
            .ok_or_else(|| Error::serialization(format!("index term {} is not an i64", n))),
        JsonValue::String(s) => Ok(IndexValue::Bin(s.clone())),
        other => Err(Error::serialization(format!(
            "index term must be a number or string, got {}",
            other
        ))),
    }
}

impl Serialize for IndexInput {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_wire().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for IndexInput {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let json = JsonValue::deserialize(deserializer)?;
        IndexInput::from_wire(&json).map_err(de::Error::custom)
    }
}
