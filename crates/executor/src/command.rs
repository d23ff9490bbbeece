//! The command contract.
//!
//! A command is a validated, immutable request. Executing it submits exactly
//! one [`Operation`](strata_core::Operation) to an [`Engine`] and returns a
//! [`FutureAdapter`](crate::FutureAdapter) that converts the engine's
//! [`Response`] and [`QueryInfo`] into the command's own types.
//!
//! | Command | Response | Info |
//! |---------|----------|------|
//! | [`FetchBucketProperties`](crate::FetchBucketProperties) | [`BucketProperties`](strata_core::BucketProperties) | [`Namespace`] |
//! | [`StoreBucketProperties`](crate::StoreBucketProperties) | `()` | [`Namespace`] |
//! | [`StoreValue`](crate::StoreValue) | [`StoreValueResponse`](crate::StoreValueResponse) | [`Location`] |
//! | [`UpdateDatatype`](crate::UpdateDatatype) | [`UpdateDatatypeResponse`](crate::UpdateDatatypeResponse) | [`Location`] |
//! | [`IndexMapReduce`](crate::IndexMapReduce) | [`MapReduceResponse`](crate::MapReduceResponse) | `()` |

use std::sync::Arc;

use strata_core::{Engine, Error, Location, Namespace, QueryInfo, Response, Result, StrataFuture};

/// Future returned by [`Command::execute_async`].
pub type ClientFuture<V, I> = Arc<dyn StrataFuture<V, I>>;

/// A request that can be run against an [`Engine`].
///
/// Commands are built through their builders, which validate eagerly: a
/// command value that exists is a command the engine will accept.
pub trait Command {
    /// Client-facing response type
    type Response: Clone + Send + Sync + 'static;
    /// Client-facing context type
    type Info: Clone + Send + Sync + 'static;

    /// Submit to `engine` and return immediately.
    ///
    /// Exactly one operation is submitted per call.
    fn execute_async(&self, engine: &dyn Engine) -> ClientFuture<Self::Response, Self::Info>;

    /// Submit to `engine` and block for the converted response.
    ///
    /// # Errors
    ///
    /// Returns the engine's failure, a conversion failure, or `Cancelled`.
    fn execute(&self, engine: &dyn Engine) -> Result<Self::Response> {
        self.execute_async(engine).get()
    }
}

/// Error for an engine response of the wrong variant.
pub(crate) fn unexpected_response(expected: &str, actual: &Response) -> Error {
    Error::conversion(format!(
        "Unexpected output: expected {}, got {}",
        expected,
        actual.variant_name()
    ))
}

pub(crate) fn expect_namespace(info: QueryInfo) -> Result<Namespace> {
    match info {
        QueryInfo::Namespace(namespace) => Ok(namespace),
        other => Err(Error::conversion(format!(
            "Unexpected query info: expected namespace, got {:?}",
            other
        ))),
    }
}

pub(crate) fn expect_location(info: QueryInfo) -> Result<Location> {
    match info {
        QueryInfo::Location(location) => Ok(location),
        other => Err(Error::conversion(format!(
            "Unexpected query info: expected location, got {:?}",
            other
        ))),
    }
}

/// Unwrap a required builder field.
pub(crate) fn require<T>(field: Option<T>, what: &str) -> Result<T> {
    field.ok_or_else(|| Error::invalid_input(format!("{} cannot be null", what)))
}

pub(crate) fn validate_namespace(namespace: &Namespace) -> Result<()> {
    if namespace.bucket_type().is_empty() {
        return Err(Error::invalid_input("bucket type cannot be empty"));
    }
    if namespace.bucket_name().is_empty() {
        return Err(Error::invalid_input("bucket name cannot be empty"));
    }
    Ok(())
}
