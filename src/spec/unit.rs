//! Predictive unit: one node of a predictor's inference graph.
//!
//! JSON shape (one node, children nest recursively):
//! {
//!   "name": "classifier",
//!   "type": "MODEL",
//!   "endpoint": { "service_host": "localhost", "service_port": 9000, "type": "REST" },
//!   "parameters": [{ "name": "threshold", "value": "0.5", "type": "FLOAT" }],
//!   "children": []
//! }

use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitType {
    UnknownType,
    Router,
    Combiner,
    Model,
    Transformer,
    OutputTransformer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitImplementation {
    UnknownImplementation,
    SimpleModel,
    SimpleRouter,
    RandomAbtest,
    AverageCombiner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitMethod {
    TransformInput,
    TransformOutput,
    Route,
    Aggregate,
    SendFeedback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EndpointType {
    #[default]
    #[serde(rename = "REST")]
    Rest,
    #[serde(rename = "GRPC")]
    Grpc,
}

/// Where a unit's serving container listens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    #[serde(default)]
    pub service_host: String,

    #[serde(default)]
    pub service_port: i32,

    #[serde(default, rename = "type")]
    pub kind: EndpointType,

    #[serde(default, rename = "httpPort")]
    pub http_port: i32,

    #[serde(default, rename = "grpcPort")]
    pub grpc_port: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ParameterType {
    Int,
    Float,
    Double,
    String,
    Bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub value: String,
    #[serde(rename = "type")]
    pub kind: ParameterType,
}

/// A parameter value parsed according to its declared type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    String(String),
}

impl Parameter {
    pub fn typed_value(&self) -> anyhow::Result<ParameterValue> {
        let raw = self.value.trim();
        let value = match self.kind {
            ParameterType::Int => ParameterValue::Int(
                raw.parse()
                    .with_context(|| format!("parameter {} is not an INT: {:?}", self.name, raw))?,
            ),
            ParameterType::Float | ParameterType::Double => ParameterValue::Float(
                raw.parse()
                    .with_context(|| format!("parameter {} is not a number: {:?}", self.name, raw))?,
            ),
            ParameterType::Bool => ParameterValue::Bool(
                raw.to_ascii_lowercase()
                    .parse()
                    .with_context(|| format!("parameter {} is not a BOOL: {:?}", self.name, raw))?,
            ),
            ParameterType::String => ParameterValue::String(self.value.clone()),
        };
        Ok(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggerMode {
    #[default]
    All,
    Request,
    Response,
}

/// Request/response payload logging for a unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Logger {
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub mode: LoggerMode,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictiveUnit {
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<PredictiveUnit>,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<UnitType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implementation: Option<UnitImplementation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<UnitMethod>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<Endpoint>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub model_uri: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub service_account_name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub env_secret_ref_name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub storage_initializer_image: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logger: Option<Logger>,
}

impl PredictiveUnit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_children(mut self, children: Vec<PredictiveUnit>) -> Self {
        self.children = children;
        self
    }

    pub fn with_endpoint_host(mut self, host: impl Into<String>) -> Self {
        self.endpoint = Some(Endpoint {
            service_host: host.into(),
            ..Endpoint::default()
        });
        self
    }

    pub fn endpoint_host(&self) -> Option<&str> {
        self.endpoint.as_ref().map(|e| e.service_host.as_str())
    }
}
