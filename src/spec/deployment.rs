//! SeldonDeployment document: metadata plus an ordered list of predictors.
//!
//! Only the fields the naming layer reads are typed. Pod internals beyond
//! container names, and the autoscaling specs, are carried as raw JSON.

use crate::spec::PredictiveUnit;
use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PodSpec {
    #[serde(default)]
    pub containers: Vec<Container>,
}

/// One pod template of a predictor (`componentSpecs[i]`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeldonPodSpec {
    #[serde(default)]
    pub metadata: ObjectMeta,

    #[serde(default)]
    pub spec: PodSpec,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hpa_spec: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keda_spec: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdb_spec: Option<serde_json::Value>,
}

impl SeldonPodSpec {
    pub fn with_containers<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            spec: PodSpec {
                containers: names
                    .into_iter()
                    .map(|name| Container {
                        name: name.into(),
                        image: None,
                    })
                    .collect(),
            },
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Explainer {
    #[serde(default, rename = "type", skip_serializing_if = "String::is_empty")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub model_uri: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<crate::spec::Endpoint>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub config: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ssl {
    #[serde(default)]
    pub cert_secret_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictorSpec {
    pub name: String,

    pub graph: PredictiveUnit,

    #[serde(default)]
    pub component_specs: Vec<SeldonPodSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    #[serde(default)]
    pub traffic: i32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explainer: Option<Explainer>,

    #[serde(default)]
    pub shadow: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl: Option<Ssl>,
}

impl PredictorSpec {
    pub fn new(name: impl Into<String>, graph: PredictiveUnit) -> Self {
        Self {
            name: name.into(),
            graph,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Seldon,
    Tensorflow,
    Kfserving,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Rest,
    Grpc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerType {
    Rpc,
    Kafka,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeldonDeploymentSpec {
    /// Deprecated; the object name in `metadata` is authoritative.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default)]
    pub predictors: Vec<PredictorSpec>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<Protocol>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<Transport>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_type: Option<ServerType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeldonDeployment {
    #[serde(default)]
    pub metadata: ObjectMeta,

    #[serde(default)]
    pub spec: SeldonDeploymentSpec,
}

impl SeldonDeployment {
    pub fn new(name: impl Into<String>, predictors: Vec<PredictorSpec>) -> Self {
        Self {
            metadata: ObjectMeta {
                name: name.into(),
                ..ObjectMeta::default()
            },
            spec: SeldonDeploymentSpec {
                predictors,
                ..SeldonDeploymentSpec::default()
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn predictor(&self, name: &str) -> Option<&PredictorSpec> {
        self.spec.predictors.iter().find(|p| p.name == name)
    }

    /// Read a deployment document from a JSON file and check its invariants.
    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read deployment file {}", path.display()))?;
        let sdep: SeldonDeployment = serde_json::from_str(&text)
            .with_context(|| format!("parse deployment file {}", path.display()))?;
        sdep.validate()
            .with_context(|| format!("invalid deployment in {}", path.display()))?;
        Ok(sdep)
    }

    /// Structural checks the naming layer relies on:
    /// - deployment has a name and at least 1 predictor
    /// - predictor names are unique
    /// - every unit has a name, unique among its siblings
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.metadata.name.is_empty() {
            bail!("deployment has no metadata.name");
        }
        if self.spec.predictors.is_empty() {
            bail!("deployment {} has no predictors", self.metadata.name);
        }

        let mut seen = BTreeSet::new();
        for p in &self.spec.predictors {
            if !seen.insert(p.name.as_str()) {
                bail!("duplicate predictor name in {}: {}", self.metadata.name, p.name);
            }
            check_unit(&p.graph)
                .with_context(|| format!("predictor {} has an invalid graph", p.name))?;
        }
        Ok(())
    }
}

fn check_unit(unit: &PredictiveUnit) -> anyhow::Result<()> {
    if unit.name.is_empty() {
        bail!("graph contains a unit with an empty name");
    }
    let mut siblings = BTreeSet::new();
    for child in &unit.children {
        if !siblings.insert(child.name.as_str()) {
            bail!("unit {} has duplicate child name: {}", unit.name, child.name);
        }
        check_unit(child)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DOC: &str = r#"{
        "apiVersion": "machinelearning.seldon.io/v1",
        "kind": "SeldonDeployment",
        "metadata": { "name": "iris", "namespace": "models" },
        "spec": {
            "protocol": "seldon",
            "predictors": [{
                "name": "default",
                "traffic": 100,
                "annotations": { "seldon.io/svc-name": "iris-public" },
                "componentSpecs": [{
                    "spec": { "containers": [{ "name": "classifier", "image": "iris:0.1" }] },
                    "hpaSpec": { "maxReplicas": 3 }
                }],
                "graph": { "name": "classifier", "type": "MODEL" },
                "explainer": { "type": "AnchorTabular", "modelUri": "gs://bucket/explainer" }
            }]
        }
    }"#;

    #[test]
    fn deserializes_full_document() {
        let sdep: SeldonDeployment = serde_json::from_str(DOC).unwrap();
        sdep.validate().unwrap();

        assert_eq!(sdep.name(), "iris");
        assert_eq!(sdep.metadata.namespace, "models");
        assert_eq!(sdep.spec.protocol, Some(Protocol::Seldon));

        let p = sdep.predictor("default").unwrap();
        assert_eq!(p.traffic, 100);
        assert_eq!(p.component_specs[0].spec.containers[0].name, "classifier");
        assert!(p.component_specs[0].hpa_spec.is_some());
        assert_eq!(p.explainer.as_ref().unwrap().kind, "AnchorTabular");
        assert!(sdep.predictor("canary").is_none());
    }

    #[test]
    fn rejects_duplicate_predictors() {
        let sdep = SeldonDeployment::new(
            "dup",
            vec![
                PredictorSpec::new("p", PredictiveUnit::new("m")),
                PredictorSpec::new("p", PredictiveUnit::new("m")),
            ],
        );
        let err = sdep.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate predictor name"));
    }

    #[test]
    fn rejects_duplicate_siblings_but_not_cousins() {
        let cousins = PredictiveUnit::new("root").with_children(vec![
            PredictiveUnit::new("a").with_children(vec![PredictiveUnit::new("x")]),
            PredictiveUnit::new("b").with_children(vec![PredictiveUnit::new("x")]),
        ]);
        SeldonDeployment::new("ok", vec![PredictorSpec::new("p", cousins)])
            .validate()
            .unwrap();

        let twins = PredictiveUnit::new("root")
            .with_children(vec![PredictiveUnit::new("x"), PredictiveUnit::new("x")]);
        let err = SeldonDeployment::new("bad", vec![PredictorSpec::new("p", twins)])
            .validate()
            .unwrap_err();
        assert!(format!("{:#}", err).contains("duplicate child name: x"));
    }

    #[test]
    fn rejects_missing_predictors() {
        let err = SeldonDeployment::new("empty", vec![]).validate().unwrap_err();
        assert!(err.to_string().contains("no predictors"));
    }
}
