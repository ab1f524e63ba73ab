//! Resource name derivation.
//!
//! Every name is built by joining identity components with `-`. Names longer
//! than the 63-character DNS-label ceiling are replaced by
//! `seldon-<md5 hex of the full candidate>`. The same inputs always give the
//! same name, so a controller can re-derive names on every pass and find the
//! objects it created earlier.

pub mod dns;

pub use dns::is_dns_label;

use crate::config::NamingConfig;
use crate::spec::{Container, PredictorSpec, SeldonDeployment, SeldonPodSpec};
use md5::{Digest, Md5};
use serde::Serialize;

pub const MAX_NAME_LEN: usize = 63;

/// Literal prefix put in front of hashed names.
pub const DEPLOYMENT_NAME_PREFIX: &str = "seldon";

/// Predictor annotation whose value replaces the generated service name.
pub const ANNOTATION_CUSTOM_SVC_NAME: &str = "seldon.io/svc-name";

pub const SVC_ORCH_SUFFIX: &str = "-svc-orch";
pub const EXPLAINER_NAME_SUFFIX: &str = "-explainer";

/// The kinds of object the controller names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NameKind {
    Deployment,
    PredictorKey,
    ServiceOrchestrator,
    Explainer,
    PodSpecDeployment,
    ContainerService,
}

/// Lowercase hex MD5 of `text` (32 chars). Used for spread, not secrecy.
pub fn hash(text: &str) -> String {
    hex::encode(Md5::digest(text.as_bytes()))
}

fn hashed(candidate: &str) -> String {
    format!("{}-{}", DEPLOYMENT_NAME_PREFIX, hash(candidate))
}

/// Return `candidate` if it fits, else its hashed form.
fn bounded(candidate: String) -> String {
    if candidate.len() > MAX_NAME_LEN {
        hashed(&candidate)
    } else {
        candidate
    }
}

/// Container names of a pod spec joined with `-`.
fn container_names(containers: &[Container]) -> String {
    containers
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join("-")
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NameDeriver {
    config: NamingConfig,
}

impl NameDeriver {
    pub fn new(config: NamingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> NamingConfig {
        self.config
    }

    /// Name of the deployment itself.
    pub fn seldon_deployment_name(&self, sdep: &SeldonDeployment) -> String {
        bounded(sdep.name().to_string())
    }

    /// `<sdep>-<predictor>-svc-orch`
    pub fn service_orchestrator_name(
        &self,
        sdep: &SeldonDeployment,
        predictor: &PredictorSpec,
    ) -> String {
        bounded(format!("{}-{}{}", sdep.name(), predictor.name, SVC_ORCH_SUFFIX))
    }

    /// Externally addressable service name of a predictor.
    ///
    /// A `seldon.io/svc-name` annotation on the predictor wins outright and is
    /// returned as written, without the length check.
    pub fn predictor_key(&self, sdep: &SeldonDeployment, predictor: &PredictorSpec) -> String {
        match predictor.annotations.get(ANNOTATION_CUSTOM_SVC_NAME) {
            Some(custom) => custom.clone(),
            None => self.generated_predictor_key(sdep, predictor),
        }
    }

    /// `<sdep>-<predictor>`, ignoring any annotation.
    pub fn generated_predictor_key(
        &self,
        sdep: &SeldonDeployment,
        predictor: &PredictorSpec,
    ) -> String {
        bounded(format!("{}-{}", sdep.name(), predictor.name))
    }

    /// `<sdep>-<predictor>-explainer`
    pub fn explainer_deployment_name(&self, sdep_name: &str, predictor: &PredictorSpec) -> String {
        bounded(format!(
            "{}-{}{}",
            sdep_name, predictor.name, EXPLAINER_NAME_SUFFIX
        ))
    }

    /// `<sdep>-<predictor>-<container>`
    pub fn container_service_name(
        &self,
        sdep_name: &str,
        predictor: &PredictorSpec,
        container: &Container,
    ) -> String {
        bounded(format!("{}-{}-{}", sdep_name, predictor.name, container.name))
    }

    /// Deployment for `componentSpecs[idx]` of a predictor.
    ///
    /// Candidate is `<sdep>-<predictor>-<idx>-` followed by the pod spec's
    /// metadata name, or its container names joined with `-` when it has none.
    /// With `deployment_name_as_prefix`, an overlong candidate becomes
    /// `<sdep>-<hash>` if that fits, else `seldon-<hash>`.
    pub fn deployment_name(
        &self,
        sdep: &SeldonDeployment,
        predictor: &PredictorSpec,
        pod_spec: &SeldonPodSpec,
        idx: usize,
    ) -> String {
        let suffix = if pod_spec.metadata.name.is_empty() {
            container_names(&pod_spec.spec.containers)
        } else {
            pod_spec.metadata.name.clone()
        };
        let name = format!("{}-{}-{}-{}", sdep.name(), predictor.name, idx, suffix);
        if name.len() <= MAX_NAME_LEN {
            return name;
        }

        let digest = hash(&name);
        if self.config.deployment_name_as_prefix {
            let prefixed = format!("{}-{}", sdep.name(), digest);
            if prefixed.len() <= MAX_NAME_LEN {
                return prefixed;
            }
        }
        format!("{}-{}", DEPLOYMENT_NAME_PREFIX, digest)
    }
}
