use strata_core::{BinaryValue, Engine, Error, Location, Operation, Response, Result, StoredObject};

use crate::adapter::FutureAdapter;
use crate::command::{
    expect_location, require, unexpected_response, validate_namespace, ClientFuture, Command,
};

/// Result of a [`StoreValue`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreValueResponse {
    /// Key chosen by the cluster when the location had none
    pub generated_key: Option<BinaryValue>,
    /// Siblings after the write; empty unless `return_body` was set
    pub values: Vec<StoredObject>,
}

impl StoreValueResponse {
    /// The key the object ended up under: the generated one, or the
    /// one in `requested`.
    pub fn key<'a>(&'a self, requested: &'a Location) -> Option<&'a BinaryValue> {
        self.generated_key.as_ref().or_else(|| requested.key())
    }
}

/// Write an object.
///
/// ```ignore
/// let object = StoredObject::new("text/plain", "7").with_index("user_id_int", 7);
/// let store = StoreValue::builder()
///     .with_location(Location::new("users").with_key("u7"))
///     .with_object(object)
///     .build()?;
/// client.execute(&store)?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreValue {
    location: Location,
    object: StoredObject,
    return_body: bool,
}

impl StoreValue {
    /// Start building the command
    pub fn builder() -> StoreValueBuilder {
        StoreValueBuilder::default()
    }

    /// Where the object is written
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// The object written
    pub fn object(&self) -> &StoredObject {
        &self.object
    }
}

impl Command for StoreValue {
    type Response = StoreValueResponse;
    type Info = Location;

    fn execute_async(&self, engine: &dyn Engine) -> ClientFuture<StoreValueResponse, Location> {
        let core = engine.execute(Operation::StoreValue {
            location: self.location.clone(),
            object: self.object.clone(),
            return_body: self.return_body,
        });
        FutureAdapter::attach(
            core,
            |response| match response {
                Response::Stored {
                    generated_key,
                    values,
                } => Ok(StoreValueResponse {
                    generated_key,
                    values,
                }),
                other => Err(unexpected_response("Stored", &other)),
            },
            expect_location,
        )
    }
}

/// Builder for [`StoreValue`].
#[derive(Debug, Clone, Default)]
pub struct StoreValueBuilder {
    location: Option<Location>,
    object: Option<StoredObject>,
    return_body: bool,
}

impl StoreValueBuilder {
    /// Target location. Required; leave the key off to have one generated.
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Object to write. Required.
    pub fn with_object(mut self, object: StoredObject) -> Self {
        self.object = Some(object);
        self
    }

    /// Return the stored siblings in the response
    pub fn with_return_body(mut self, return_body: bool) -> Self {
        self.return_body = return_body;
        self
    }

    /// Validate and build.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the location or object is missing, the key
    /// is empty, or the content type is empty.
    pub fn build(self) -> Result<StoreValue> {
        let location = require(self.location, "Location")?;
        validate_namespace(location.namespace())?;
        if location.key().is_some_and(BinaryValue::is_empty) {
            return Err(Error::invalid_input("key cannot be empty"));
        }
        let object = require(self.object, "Object")?;
        if object.content_type.is_empty() {
            return Err(Error::invalid_input("content type cannot be empty"));
        }
        Ok(StoreValue {
            location,
            object,
            return_body: self.return_body,
        })
    }
}
