use strata_core::{BinaryValue, Engine, Error, Location, Operation, Response, Result};

use crate::adapter::FutureAdapter;
use crate::command::{
    expect_location, require, unexpected_response, validate_namespace, ClientFuture, Command,
};
use crate::crdt::DatatypeMutation;

/// Result of an [`UpdateDatatype`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateDatatypeResponse {
    /// Key chosen by the cluster when the location had none
    pub generated_key: Option<BinaryValue>,
    /// Causal context for the next update; only with `return_body`
    pub context: Option<BinaryValue>,
}

/// Apply a CRDT mutation to the datatype at a location.
///
/// The command owns its mutation and folds it into an op on each execution.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateDatatype {
    location: Location,
    mutation: DatatypeMutation,
    context: Option<BinaryValue>,
    return_body: bool,
}

impl UpdateDatatype {
    /// Start building the command
    pub fn builder() -> UpdateDatatypeBuilder {
        UpdateDatatypeBuilder::default()
    }

    /// The datatype addressed
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// The mutation applied
    pub fn mutation(&self) -> &DatatypeMutation {
        &self.mutation
    }
}

impl Command for UpdateDatatype {
    type Response = UpdateDatatypeResponse;
    type Info = Location;

    fn execute_async(
        &self,
        engine: &dyn Engine,
    ) -> ClientFuture<UpdateDatatypeResponse, Location> {
        let core = engine.execute(Operation::UpdateDatatype {
            location: self.location.clone(),
            op: self.mutation.get_op(),
            context: self.context.clone(),
            return_body: self.return_body,
        });
        FutureAdapter::attach(
            core,
            |response| match response {
                Response::DatatypeUpdated {
                    generated_key,
                    context,
                } => Ok(UpdateDatatypeResponse {
                    generated_key,
                    context,
                }),
                other => Err(unexpected_response("DatatypeUpdated", &other)),
            },
            expect_location,
        )
    }
}

/// Builder for [`UpdateDatatype`].
#[derive(Debug, Clone, Default)]
pub struct UpdateDatatypeBuilder {
    location: Option<Location>,
    mutation: Option<DatatypeMutation>,
    context: Option<BinaryValue>,
    return_body: bool,
}

impl UpdateDatatypeBuilder {
    /// Target location. Required.
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Mutation to apply. Required.
    pub fn with_mutation(mut self, mutation: impl Into<DatatypeMutation>) -> Self {
        self.mutation = Some(mutation.into());
        self
    }

    /// Causal context from a previous fetch or update
    pub fn with_context(mut self, context: BinaryValue) -> Self {
        self.context = Some(context);
        self
    }

    /// Return the new causal context in the response
    pub fn with_return_body(mut self, return_body: bool) -> Self {
        self.return_body = return_body;
        self
    }

    /// Validate and build.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the location or mutation is missing, or a
    /// context is given for a keyless location.
    pub fn build(self) -> Result<UpdateDatatype> {
        let location = require(self.location, "Location")?;
        validate_namespace(location.namespace())?;
        let mutation = require(self.mutation, "Mutation")?;
        if self.context.is_some() && location.key().is_none() {
            return Err(Error::invalid_input(
                "a context requires a location with a key",
            ));
        }
        Ok(UpdateDatatype {
            location,
            mutation,
            context: self.context,
            return_body: self.return_body,
        })
    }
}
