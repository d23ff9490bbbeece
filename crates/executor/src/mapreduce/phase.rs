//! Map-reduce query phases.

use serde_json::{Map, Value as JsonValue};

/// Language tag for JavaScript functions
const JAVASCRIPT: &str = "javascript";
/// Language tag for Erlang functions
const ERLANG: &str = "erlang";

/// Code run by a phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Function {
    /// A built-in or preloaded JavaScript function, e.g. `Riak.mapValuesJson`
    NamedJs(String),
    /// JavaScript source sent with the request
    AnonymousJs(String),
    /// JavaScript source stored as an object in the cluster
    StoredJs {
        /// Bucket holding the source
        bucket: String,
        /// Key holding the source
        key: String,
    },
    /// An exported Erlang function
    Erlang {
        /// Module name
        module: String,
        /// Function name
        function: String,
    },
}

impl Function {
    /// A named JavaScript function
    pub fn named_js(name: impl Into<String>) -> Self {
        Function::NamedJs(name.into())
    }

    /// An anonymous JavaScript function
    pub fn anonymous_js(source: impl Into<String>) -> Self {
        Function::AnonymousJs(source.into())
    }

    /// A JavaScript function stored at `bucket`/`key`
    pub fn stored_js(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Function::StoredJs {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// An Erlang `module:function`
    pub fn erlang(module: impl Into<String>, function: impl Into<String>) -> Self {
        Function::Erlang {
            module: module.into(),
            function: function.into(),
        }
    }

    /// True if any name or source field is empty
    pub(crate) fn has_empty_field(&self) -> bool {
        match self {
            Function::NamedJs(s) | Function::AnonymousJs(s) => s.is_empty(),
            Function::StoredJs { bucket, key } => bucket.is_empty() || key.is_empty(),
            Function::Erlang { module, function } => module.is_empty() || function.is_empty(),
        }
    }

    fn write_fields(&self, obj: &mut Map<String, JsonValue>) {
        let mut put = |k: &str, v: &str| {
            obj.insert(k.to_string(), JsonValue::String(v.to_string()));
        };
        match self {
            Function::NamedJs(name) => {
                put("language", JAVASCRIPT);
                put("name", name);
            }
            Function::AnonymousJs(source) => {
                put("language", JAVASCRIPT);
                put("source", source);
            }
            Function::StoredJs { bucket, key } => {
                put("language", JAVASCRIPT);
                put("bucket", bucket);
                put("key", key);
            }
            Function::Erlang { module, function } => {
                put("language", ERLANG);
                put("module", module);
                put("function", function);
            }
        }
    }
}

/// Map or reduce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseKind {
    /// Runs per input object
    Map,
    /// Runs over the previous phase's output
    Reduce,
}

impl PhaseKind {
    fn as_str(self) -> &'static str {
        match self {
            PhaseKind::Map => "map",
            PhaseKind::Reduce => "reduce",
        }
    }
}

/// One phase of a map-reduce query.
#[derive(Debug, Clone, PartialEq)]
pub struct MapReducePhase {
    /// Map or reduce
    pub kind: PhaseKind,
    /// Code to run
    pub function: Function,
    /// Return this phase's output in the response
    pub keep: bool,
    /// Static argument passed to every invocation
    pub arg: Option<JsonValue>,
}

impl MapReducePhase {
    /// A map phase
    pub fn map(function: Function, keep: bool) -> Self {
        Self {
            kind: PhaseKind::Map,
            function,
            keep,
            arg: None,
        }
    }

    /// A reduce phase
    pub fn reduce(function: Function, keep: bool) -> Self {
        Self {
            kind: PhaseKind::Reduce,
            function,
            keep,
            arg: None,
        }
    }

    /// Attach a static argument
    pub fn with_arg(mut self, arg: JsonValue) -> Self {
        self.arg = Some(arg);
        self
    }

    /// `{"map": {<function>, "keep": bool, "arg"?: ..}}`
    pub fn to_wire(&self) -> JsonValue {
        let mut body = Map::new();
        self.function.write_fields(&mut body);
        body.insert("keep".to_string(), JsonValue::Bool(self.keep));
        if let Some(arg) = &self.arg {
            body.insert("arg".to_string(), arg.clone());
        }

        let mut phase = Map::new();
        phase.insert(self.kind.as_str().to_string(), JsonValue::Object(body));
        JsonValue::Object(phase)
    }
}
