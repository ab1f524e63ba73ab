//! Spec layer: the SeldonDeployment document as serde types.
//!
//! This module is intentionally separate from naming and graph traversal.
//! It owns:
//! - PredictiveUnit and its enums (one graph node)
//! - SeldonDeployment / PredictorSpec / SeldonPodSpec (the document)

pub mod deployment;
pub mod unit;

pub use deployment::{
    Container, Explainer, ObjectMeta, PodSpec, PredictorSpec, SeldonDeployment,
    SeldonDeploymentSpec, SeldonPodSpec,
};
pub use unit::{
    Endpoint, EndpointType, Logger, LoggerMode, Parameter, ParameterType, ParameterValue,
    PredictiveUnit, UnitImplementation, UnitMethod, UnitType,
};
