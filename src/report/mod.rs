//! Names report: every derived name and graph unit of a deployment.

use crate::graph::{self, ENGINE_HOST};
use crate::naming::{ANNOTATION_CUSTOM_SVC_NAME, NameDeriver, NameKind, is_dns_label};
use crate::spec::{ParameterValue, PredictiveUnit, PredictorSpec, SeldonDeployment, UnitType};

use log::{debug, warn};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
pub struct NameView {
    pub kind: NameKind,
    /// What was named, e.g. a container name or `componentSpecs[1]`.
    pub subject: String,
    pub name: String,
    /// False if the platform would reject the name (only possible for
    /// user-supplied overrides and components).
    pub dns_label: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnitView {
    pub name: String,
    pub depth: usize,
    pub parent: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<UnitType>,
    pub endpoint_host: Option<String>,
    pub engine: bool,
    /// Parameters that failed to parse keep their raw string value.
    pub parameters: BTreeMap<String, ParameterValue>,
    /// Names of parameters whose value does not match the declared type.
    pub invalid_parameters: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictorView {
    pub name: String,
    pub predictor_key: String,
    /// Service name came from the `seldon.io/svc-name` annotation.
    pub custom_service_name: bool,
    pub names: Vec<NameView>,
    /// Units in pre-order, root first.
    pub units: Vec<UnitView>,
    /// Unit the engine runs beside. Falls back to the root when no unit is
    /// marked with a localhost endpoint.
    pub engine_unit: String,
    pub engine_implicit: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TotalsView {
    pub predictors: usize,
    pub units: usize,
    pub names: usize,
    pub invalid_names: usize,
    pub invalid_parameters: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportData {
    pub deployment: String,
    pub namespace: String,
    pub deployment_name: String,
    pub deployment_name_as_prefix: bool,
    pub predictors: Vec<PredictorView>,
    pub totals: TotalsView,
}

/// Build the report. Never fails: bad input is flagged in the views and
/// logged, names are always derived.
pub fn build_report(sdep: &SeldonDeployment, deriver: &NameDeriver) -> ReportData {
    let predictors: Vec<PredictorView> = sdep
        .spec
        .predictors
        .iter()
        .map(|p| build_predictor(sdep, p, deriver))
        .collect();

    let deployment_name = deriver.seldon_deployment_name(sdep);
    let mut totals = TotalsView {
        predictors: predictors.len(),
        units: 0,
        names: 0,
        invalid_names: 0,
        invalid_parameters: 0,
    };
    for p in &predictors {
        totals.units += p.units.len();
        totals.names += p.names.len();
        totals.invalid_names += p.names.iter().filter(|n| !n.dns_label).count();
        totals.invalid_parameters += p
            .units
            .iter()
            .map(|u| u.invalid_parameters.len())
            .sum::<usize>();
    }

    ReportData {
        deployment: sdep.name().to_string(),
        namespace: sdep.metadata.namespace.clone(),
        deployment_name,
        deployment_name_as_prefix: deriver.config().deployment_name_as_prefix,
        predictors,
        totals,
    }
}

fn name_view(kind: NameKind, subject: impl Into<String>, name: String) -> NameView {
    let subject = subject.into();
    let dns_label = is_dns_label(&name);
    if dns_label {
        debug!("{:?} {} -> {}", kind, subject, name);
    } else {
        warn!("{:?} name for {} is not a valid DNS label: {:?}", kind, subject, name);
    }
    NameView {
        kind,
        subject,
        name,
        dns_label,
    }
}

/// Names and unit views of a single predictor.
pub fn build_predictor(
    sdep: &SeldonDeployment,
    p: &PredictorSpec,
    deriver: &NameDeriver,
) -> PredictorView {
    let sdep_name = sdep.name();
    let predictor_key = deriver.predictor_key(sdep, p);
    let custom_service_name = p.annotations.contains_key(ANNOTATION_CUSTOM_SVC_NAME);

    let mut names = vec![
        name_view(NameKind::PredictorKey, p.name.as_str(), predictor_key.clone()),
        name_view(
            NameKind::ServiceOrchestrator,
            p.name.as_str(),
            deriver.service_orchestrator_name(sdep, p),
        ),
    ];
    if p.explainer.is_some() {
        names.push(name_view(
            NameKind::Explainer,
            p.name.as_str(),
            deriver.explainer_deployment_name(sdep_name, p),
        ));
    }
    for (idx, pod) in p.component_specs.iter().enumerate() {
        names.push(name_view(
            NameKind::PodSpecDeployment,
            format!("componentSpecs[{}]", idx),
            deriver.deployment_name(sdep, p, pod, idx),
        ));
        for c in &pod.spec.containers {
            names.push(name_view(
                NameKind::ContainerService,
                c.name.as_str(),
                deriver.container_service_name(sdep_name, p, c),
            ));
        }
    }

    let engine = graph::find_engine_unit(&p.graph);
    if engine.is_none() {
        debug!(
            "predictor {} has no {} endpoint, engine defaults to root {}",
            p.name, ENGINE_HOST, p.graph.name
        );
    }
    let engine_implicit = engine.is_none();
    let engine = engine.unwrap_or(&p.graph);

    PredictorView {
        name: p.name.clone(),
        predictor_key,
        custom_service_name,
        names,
        units: unit_views(p, engine),
        engine_unit: engine.name.clone(),
        engine_implicit,
    }
}

/// Pre-order unit views. Only `engine` is flagged as the engine unit, even
/// when several units carry a localhost endpoint.
fn unit_views(p: &PredictorSpec, engine: &PredictiveUnit) -> Vec<UnitView> {
    // Parent of a unit at depth d is the last unit seen at depth d-1.
    let mut path: Vec<&str> = Vec::new();
    let mut units = Vec::new();
    for (depth, unit) in p.graph.iter().with_depth() {
        path.truncate(depth);
        let parent = path.last().map(|s| s.to_string());
        path.push(unit.name.as_str());

        let mut parameters = BTreeMap::new();
        let mut invalid_parameters = Vec::new();
        for param in &unit.parameters {
            let value = match param.typed_value() {
                Ok(value) => value,
                Err(err) => {
                    warn!("predictor {} unit {}: {:#}", p.name, unit.name, err);
                    invalid_parameters.push(param.name.clone());
                    ParameterValue::String(param.value.clone())
                }
            };
            parameters.insert(param.name.clone(), value);
        }

        units.push(UnitView {
            name: unit.name.clone(),
            depth,
            parent,
            kind: unit.kind,
            endpoint_host: unit.endpoint_host().map(str::to_string),
            engine: std::ptr::eq(unit, engine),
            parameters,
            invalid_parameters,
        });
    }
    units
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{Parameter, ParameterType, SeldonPodSpec};
    use pretty_assertions::assert_eq;

    fn fixture() -> SeldonDeployment {
        let graph = PredictiveUnit::new("router").with_children(vec![
            PredictiveUnit::new("a").with_endpoint_host("localhost"),
            PredictiveUnit::new("b"),
        ]);
        let mut p = PredictorSpec::new("main", graph);
        p.component_specs = vec![SeldonPodSpec::with_containers(["a", "b"])];
        SeldonDeployment::new("demo", vec![p])
    }

    #[test]
    fn lists_names_and_units() {
        let report = build_report(&fixture(), &NameDeriver::default());
        assert_eq!(report.deployment_name, "demo");

        let p = &report.predictors[0];
        let got: Vec<(NameKind, &str)> = p
            .names
            .iter()
            .map(|n| (n.kind, n.name.as_str()))
            .collect();
        assert_eq!(
            got,
            vec![
                (NameKind::PredictorKey, "demo-main"),
                (NameKind::ServiceOrchestrator, "demo-main-svc-orch"),
                (NameKind::PodSpecDeployment, "demo-main-0-a-b"),
                (NameKind::ContainerService, "demo-main-a"),
                (NameKind::ContainerService, "demo-main-b"),
            ]
        );

        let units: Vec<(&str, usize, Option<&str>, bool)> = p
            .units
            .iter()
            .map(|u| (u.name.as_str(), u.depth, u.parent.as_deref(), u.engine))
            .collect();
        assert_eq!(
            units,
            vec![
                ("router", 0, None, false),
                ("a", 1, Some("router"), true),
                ("b", 1, Some("router"), false),
            ]
        );
        assert_eq!(p.engine_unit, "a");
        assert!(!p.engine_implicit);
        assert_eq!(report.totals.units, 3);
        assert_eq!(report.totals.names, 5);
        assert_eq!(report.totals.invalid_names, 0);
    }

    #[test]
    fn engine_falls_back_to_root() {
        let sdep = SeldonDeployment::new(
            "demo",
            vec![PredictorSpec::new("main", PredictiveUnit::new("model"))],
        );
        let report = build_report(&sdep, &NameDeriver::default());
        assert_eq!(report.predictors[0].engine_unit, "model");
        assert!(report.predictors[0].engine_implicit);
    }

    #[test]
    fn flags_invalid_custom_service_name() {
        let mut sdep = fixture();
        sdep.spec.predictors[0].annotations.insert(
            ANNOTATION_CUSTOM_SVC_NAME.to_string(),
            "Not_A_Label".to_string(),
        );
        let report = build_report(&sdep, &NameDeriver::default());
        let p = &report.predictors[0];
        assert!(p.custom_service_name);
        assert_eq!(p.predictor_key, "Not_A_Label");
        assert!(!p.names[0].dns_label);
        assert_eq!(report.totals.invalid_names, 1);
    }

    #[test]
    fn only_first_localhost_unit_is_the_engine() {
        let graph = PredictiveUnit::new("r").with_children(vec![
            PredictiveUnit::new("b").with_endpoint_host("localhost"),
            PredictiveUnit::new("c").with_endpoint_host("localhost"),
        ]);
        let sdep = SeldonDeployment::new("demo", vec![PredictorSpec::new("p", graph)]);
        let report = build_report(&sdep, &NameDeriver::default());

        let p = &report.predictors[0];
        assert_eq!(p.engine_unit, "b");
        let flagged: Vec<&str> = p
            .units
            .iter()
            .filter(|u| u.engine)
            .map(|u| u.name.as_str())
            .collect();
        assert_eq!(flagged, vec!["b"]);
    }

    #[test]
    fn implicit_engine_flags_root() {
        let graph = PredictiveUnit::new("r").with_children(vec![PredictiveUnit::new("m")]);
        let sdep = SeldonDeployment::new("demo", vec![PredictorSpec::new("p", graph)]);
        let report = build_report(&sdep, &NameDeriver::default());

        let engines: Vec<(&str, bool)> = report.predictors[0]
            .units
            .iter()
            .map(|u| (u.name.as_str(), u.engine))
            .collect();
        assert_eq!(engines, vec![("r", true), ("m", false)]);
    }

    #[test]
    fn single_predictor_view_matches_report() {
        let sdep = fixture();
        let deriver = NameDeriver::default();
        let view = build_predictor(&sdep, &sdep.spec.predictors[0], &deriver);
        let report = build_report(&sdep, &deriver);

        let names = |units: &[UnitView]| -> Vec<String> {
            units.iter().map(|u| u.name.clone()).collect()
        };
        assert_eq!(names(&view.units), names(&report.predictors[0].units));
        assert_eq!(view.engine_unit, report.predictors[0].engine_unit);
    }

    #[test]
    fn mistyped_parameter_is_flagged_not_fatal() {
        let mut sdep = fixture();
        sdep.spec.predictors[0].graph.parameters = vec![
            Parameter {
                name: "w".to_string(),
                value: "1.5".to_string(),
                kind: ParameterType::Int,
            },
            Parameter {
                name: "n".to_string(),
                value: "3".to_string(),
                kind: ParameterType::Int,
            },
        ];
        let report = build_report(&sdep, &NameDeriver::default());

        let p = &report.predictors[0];
        assert_eq!(p.names.len(), 5);
        let root = &p.units[0];
        assert_eq!(root.invalid_parameters, vec!["w".to_string()]);
        assert_eq!(
            root.parameters.get("w"),
            Some(&ParameterValue::String("1.5".to_string()))
        );
        assert_eq!(root.parameters.get("n"), Some(&ParameterValue::Int(3)));
        assert_eq!(report.totals.invalid_parameters, 1);
    }
}
