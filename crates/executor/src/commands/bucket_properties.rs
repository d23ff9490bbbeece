//! Bucket property commands.

use strata_core::{BucketProperties, Engine, Error, Namespace, Operation, Response, Result};

use crate::adapter::FutureAdapter;
use crate::command::{
    expect_namespace, require, unexpected_response, validate_namespace, ClientFuture, Command,
};

/// Read a bucket's properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchBucketProperties {
    namespace: Namespace,
}

impl FetchBucketProperties {
    /// Start building the command
    pub fn builder() -> FetchBucketPropertiesBuilder {
        FetchBucketPropertiesBuilder::default()
    }

    /// The bucket addressed
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }
}

impl Command for FetchBucketProperties {
    type Response = BucketProperties;
    type Info = Namespace;

    fn execute_async(&self, engine: &dyn Engine) -> ClientFuture<BucketProperties, Namespace> {
        let core = engine.execute(Operation::FetchBucketProps {
            namespace: self.namespace.clone(),
        });
        FutureAdapter::attach(
            core,
            |response| match response {
                Response::BucketProperties(properties) => Ok(properties),
                other => Err(unexpected_response("BucketProperties", &other)),
            },
            expect_namespace,
        )
    }
}

/// Builder for [`FetchBucketProperties`].
#[derive(Debug, Clone, Default)]
pub struct FetchBucketPropertiesBuilder {
    namespace: Option<Namespace>,
}

impl FetchBucketPropertiesBuilder {
    /// Bucket to read. Required.
    pub fn with_namespace(mut self, namespace: Namespace) -> Self {
        self.namespace = Some(namespace);
        self
    }

    /// Validate and build.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the namespace is missing or has an empty
    /// bucket type or name.
    pub fn build(self) -> Result<FetchBucketProperties> {
        let namespace = require(self.namespace, "Namespace")?;
        validate_namespace(&namespace)?;
        Ok(FetchBucketProperties { namespace })
    }
}

/// Change a bucket's properties. Properties left unset are not touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreBucketProperties {
    namespace: Namespace,
    properties: BucketProperties,
}

impl StoreBucketProperties {
    /// Start building the command
    pub fn builder() -> StoreBucketPropertiesBuilder {
        StoreBucketPropertiesBuilder::default()
    }

    /// The bucket addressed
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Properties to write
    pub fn properties(&self) -> &BucketProperties {
        &self.properties
    }
}

impl Command for StoreBucketProperties {
    type Response = ();
    type Info = Namespace;

    fn execute_async(&self, engine: &dyn Engine) -> ClientFuture<(), Namespace> {
        let core = engine.execute(Operation::StoreBucketProps {
            namespace: self.namespace.clone(),
            properties: self.properties.clone(),
        });
        FutureAdapter::attach(
            core,
            |response| match response {
                Response::Unit => Ok(()),
                other => Err(unexpected_response("Unit", &other)),
            },
            expect_namespace,
        )
    }
}

/// Builder for [`StoreBucketProperties`].
#[derive(Debug, Clone, Default)]
pub struct StoreBucketPropertiesBuilder {
    namespace: Option<Namespace>,
    properties: BucketProperties,
}

impl StoreBucketPropertiesBuilder {
    /// Bucket to change. Required.
    pub fn with_namespace(mut self, namespace: Namespace) -> Self {
        self.namespace = Some(namespace);
        self
    }

    /// Replica count
    pub fn with_n_val(mut self, n_val: u32) -> Self {
        self.properties.n_val = Some(n_val);
        self
    }

    /// Keep concurrent writes as siblings
    pub fn with_allow_mult(mut self, allow_mult: bool) -> Self {
        self.properties.allow_mult = Some(allow_mult);
        self
    }

    /// Resolve conflicts by timestamp
    pub fn with_last_write_wins(mut self, last_write_wins: bool) -> Self {
        self.properties.last_write_wins = Some(last_write_wins);
        self
    }

    /// Read quorum
    pub fn with_r(mut self, r: u32) -> Self {
        self.properties.r = Some(r);
        self
    }

    /// Write quorum
    pub fn with_w(mut self, w: u32) -> Self {
        self.properties.w = Some(w);
        self
    }

    /// Durable write quorum
    pub fn with_dw(mut self, dw: u32) -> Self {
        self.properties.dw = Some(dw);
        self
    }

    /// Attach a search index
    pub fn with_search_index(mut self, index: impl Into<String>) -> Self {
        self.properties.search_index = Some(index.into());
        self
    }

    /// Validate and build.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the namespace is missing, nothing is set,
    /// or a quorum exceeds `n_val`.
    pub fn build(self) -> Result<StoreBucketProperties> {
        let namespace = require(self.namespace, "Namespace")?;
        validate_namespace(&namespace)?;
        let properties = self.properties;

        if properties == BucketProperties::default() {
            return Err(Error::invalid_input("no bucket properties to store"));
        }
        if properties.n_val == Some(0) {
            return Err(Error::invalid_input("n_val must be at least 1"));
        }
        if let Some(n_val) = properties.n_val {
            for (name, quorum) in [("r", properties.r), ("w", properties.w), ("dw", properties.dw)] {
                if quorum.is_some_and(|q| q > n_val) {
                    return Err(Error::invalid_input(format!(
                        "{} cannot exceed n_val ({})",
                        name, n_val
                    )));
                }
            }
        }

        Ok(StoreBucketProperties {
            namespace,
            properties,
        })
    }
}
