//! Naming and graph navigation for SeldonDeployment resources.
//!
//! - `naming`: deterministic, DNS-label-bounded names for the objects a
//!   deployment expands into
//! - `graph`: pre-order queries over a predictor's unit tree
//! - `spec`: the deployment document as serde types
//! - `report` / `render`: every name of a deployment, as JSON or text

pub mod config;
pub mod graph;
pub mod naming;
pub mod render;
pub mod report;
pub mod spec;

pub use config::NamingConfig;
pub use graph::{find_engine_unit, find_unit_by_name, flatten};
pub use naming::{NameDeriver, NameKind};

pub type Result<T> = anyhow::Result<T>;
