//! Addressing types for the Strata client
//!
//! This module defines the foundational types:
//! - BinaryValue: immutable byte sequence for names, keys and CRDT elements
//! - Namespace: bucket type + bucket name
//! - Location: namespace + optional key
//! - IndexValue: a secondary-index term (integer or string)

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Bucket type used when none is given.
///
/// The cluster treats this type specially; see the index input serializer
/// for the one place where that leaks into the wire format.
pub const DEFAULT_BUCKET_TYPE: &str = "default";

/// Immutable byte sequence.
///
/// Bucket names, keys, set elements and register values are all arbitrary
/// bytes on the cluster. In JSON a `BinaryValue` is a base64 string.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BinaryValue(Vec<u8>);

impl BinaryValue {
    /// Wrap raw bytes
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Borrow the raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume into the raw bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Number of bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if there are no bytes
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decode as UTF-8, replacing invalid sequences
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }
}

impl From<&str> for BinaryValue {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl From<String> for BinaryValue {
    fn from(s: String) -> Self {
        Self(s.into_bytes())
    }
}

impl From<Vec<u8>> for BinaryValue {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for BinaryValue {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl fmt::Display for BinaryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

impl Serialize for BinaryValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for BinaryValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        BASE64
            .decode(encoded.as_bytes())
            .map(Self)
            .map_err(|e| de::Error::custom(format!("invalid base64: {}", e)))
    }
}

/// A bucket within a bucket type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Namespace {
    bucket_type: BinaryValue,
    bucket_name: BinaryValue,
}

impl Namespace {
    /// A bucket in the default bucket type
    pub fn new(bucket_name: impl Into<BinaryValue>) -> Self {
        Self {
            bucket_type: BinaryValue::from(DEFAULT_BUCKET_TYPE),
            bucket_name: bucket_name.into(),
        }
    }

    /// A bucket in an explicit bucket type
    pub fn with_type(bucket_type: impl Into<BinaryValue>, bucket_name: impl Into<BinaryValue>) -> Self {
        Self {
            bucket_type: bucket_type.into(),
            bucket_name: bucket_name.into(),
        }
    }

    /// The bucket type
    pub fn bucket_type(&self) -> &BinaryValue {
        &self.bucket_type
    }

    /// The bucket name
    pub fn bucket_name(&self) -> &BinaryValue {
        &self.bucket_name
    }

    /// True if the bucket type is [`DEFAULT_BUCKET_TYPE`]
    pub fn has_default_type(&self) -> bool {
        self.bucket_type.as_bytes() == DEFAULT_BUCKET_TYPE.as_bytes()
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket_type, self.bucket_name)
    }
}

/// A (bucket type, bucket, key) address.
///
/// The key is optional: bucket-scoped operations and writes that let the
/// cluster generate a key address a location without one.
///
/// ```
/// use strata_core::Location;
///
/// let loc = Location::new("users").with_bucket_type("maps").with_key("alice");
/// assert_eq!(loc.bucket_type().to_string(), "maps");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    namespace: Namespace,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    key: Option<BinaryValue>,
}

impl Location {
    /// A keyless location in the default bucket type
    pub fn new(bucket_name: impl Into<BinaryValue>) -> Self {
        Self {
            namespace: Namespace::new(bucket_name),
            key: None,
        }
    }

    /// A location inside an existing namespace
    pub fn in_namespace(namespace: Namespace) -> Self {
        Self {
            namespace,
            key: None,
        }
    }

    /// Replace the bucket type
    pub fn with_bucket_type(mut self, bucket_type: impl Into<BinaryValue>) -> Self {
        self.namespace.bucket_type = bucket_type.into();
        self
    }

    /// Set the key
    pub fn with_key(mut self, key: impl Into<BinaryValue>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// The namespace this location lives in
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// The bucket type
    pub fn bucket_type(&self) -> &BinaryValue {
        self.namespace.bucket_type()
    }

    /// The bucket name
    pub fn bucket_name(&self) -> &BinaryValue {
        self.namespace.bucket_name()
    }

    /// The key, if any
    pub fn key(&self) -> Option<&BinaryValue> {
        self.key.as_ref()
    }

    /// True if the bucket type is [`DEFAULT_BUCKET_TYPE`]
    pub fn has_default_type(&self) -> bool {
        self.namespace.has_default_type()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{}/{}", self.namespace, key),
            None => write!(f, "{}", self.namespace),
        }
    }
}

/// A secondary-index term.
///
/// `_int` indexes hold integers, `_bin` indexes hold strings. Serialized
/// untagged: a JSON number or a JSON string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexValue {
    /// Integer term
    Int(i64),
    /// String term
    Bin(String),
}

impl From<i64> for IndexValue {
    fn from(v: i64) -> Self {
        IndexValue::Int(v)
    }
}

impl From<i32> for IndexValue {
    fn from(v: i32) -> Self {
        IndexValue::Int(i64::from(v))
    }
}

impl From<&str> for IndexValue {
    fn from(v: &str) -> Self {
        IndexValue::Bin(v.to_string())
    }
}

impl From<String> for IndexValue {
    fn from(v: String) -> Self {
        IndexValue::Bin(v)
    }
}

impl fmt::Display for IndexValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexValue::Int(v) => write!(f, "{}", v),
            IndexValue::Bin(v) => write!(f, "{}", v),
        }
    }
}
