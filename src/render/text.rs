use crate::report::{ReportData, UnitView};
use std::fmt::Write;

/// Plain-text listing: one block per predictor, names then the unit tree.
pub fn render_text_report(data: &ReportData) -> String {
    let mut out = String::new();

    let ns = if data.namespace.is_empty() {
        String::new()
    } else {
        format!(" (namespace {})", data.namespace)
    };
    let _ = writeln!(out, "deployment {}{} -> {}", data.deployment, ns, data.deployment_name);
    if data.deployment_name_as_prefix {
        let _ = writeln!(out, "  deployment name kept as prefix when hashing");
    }

    for p in &data.predictors {
        let _ = writeln!(out);
        let custom = if p.custom_service_name { " (custom)" } else { "" };
        let _ = writeln!(out, "predictor {}  service {}{}", p.name, p.predictor_key, custom);
        for n in &p.names {
            let flag = if n.dns_label { "" } else { "  !invalid" };
            let kind = serde_json::to_value(n.kind)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default();
            let _ = writeln!(out, "  {:<22} {:<24} {}{}", kind, n.subject, n.name, flag);
        }
        let _ = writeln!(out, "  graph:");
        out.push_str(&render_tree(&p.units, 2));
        let implicit = if p.engine_implicit { " (implicit root)" } else { "" };
        let _ = writeln!(out, "  engine beside: {}{}", p.engine_unit, implicit);
    }

    let t = &data.totals;
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{} predictors, {} units, {} names, {} invalid names, {} invalid params",
        t.predictors, t.units, t.names, t.invalid_names, t.invalid_parameters
    );
    out
}

/// Indented unit tree, two spaces per level on top of `indent`.
pub fn render_tree(units: &[UnitView], indent: usize) -> String {
    let mut out = String::new();
    for u in units {
        let pad = " ".repeat(indent + 2 * u.depth);
        let kind = u
            .kind
            .and_then(|k| serde_json::to_value(k).ok())
            .and_then(|v| v.as_str().map(str::to_string));
        let mut line = format!("{}- {}", pad, u.name);
        if let Some(kind) = kind {
            let _ = write!(line, " [{}]", kind);
        }
        if let Some(host) = &u.endpoint_host {
            let _ = write!(line, " @{}", host);
        }
        if u.engine {
            line.push_str(" *engine*");
        }
        if !u.invalid_parameters.is_empty() {
            let _ = write!(line, " !invalid params: {}", u.invalid_parameters.join(","));
        }
        out.push_str(&line);
        out.push('\n');
    }
    out
}
