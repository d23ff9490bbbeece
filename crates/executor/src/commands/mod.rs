//! Concrete commands and their builders.

mod bucket_properties;
mod store_value;
mod update_datatype;

pub use bucket_properties::{
    FetchBucketProperties, FetchBucketPropertiesBuilder, StoreBucketProperties,
    StoreBucketPropertiesBuilder,
};
pub use store_value::{StoreValue, StoreValueBuilder, StoreValueResponse};
pub use update_datatype::{UpdateDatatype, UpdateDatatypeBuilder, UpdateDatatypeResponse};
