//! Output rendering for resolution entries and instance reports.
//!
//! Supports `human` (default) and `json` outputs. Human output is printed
//! as each phase completes; the JSON form is a single document holding the
//! entries, installation state, reports and a summary.

use crate::check::{InstanceReport, Resolution, Summary};
use crate::models::{Entry, Issue, Severity};
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;

const SUMMARY_RULE: &str = "--------------------";
const INSTANCE_RULE: &str =
    "------------------------------------------------------------------------------";
const UNSUPPORTED_BANNER: &str = "Unsupported, non-production configuration. This may be due to use of tech preview/experimental feature, or unsupported configuration. See message for details.";

fn severity_label(sev: Severity, color: bool) -> String {
    if !color {
        return sev.to_string();
    }
    match sev {
        Severity::Fatal => sev.red().bold().to_string(),
        Severity::Error => sev.red().to_string(),
        Severity::Warn => sev.yellow().to_string(),
    }
}

/// One `[Severity] message` line per entry.
pub fn render_entries(entries: &[Entry], color: bool) -> String {
    entries
        .iter()
        .map(|e| format!("[{}] {}\n", severity_label(e.severity, color), e.message))
        .collect()
}

/// Installation summary block shown once resolution did not halt.
pub fn render_installation_summary(resolution: &Resolution) -> String {
    let state = &resolution.state;
    let version = state.operator_version.as_deref().unwrap_or("N/A");
    let install_ns = state.install_namespace.as_deref().unwrap_or("N/A");
    let mut out = String::new();
    out.push_str(SUMMARY_RULE);
    out.push('\n');
    out.push_str(&format!("Installed operator version is: '{}'\n", version));
    out.push_str("- Currently supported operator versions can be found at: https://access.redhat.com/support/policy/updates/openshift_operators\n\n");
    out.push_str(&format!("Operator installed in namespace: '{}'\n", install_ns));
    out.push_str(&format!(
        "Cluster-scoped Argo CD instance namespaces: [{}]\n",
        state.cluster_config_namespaces.join(" ")
    ));
    out.push_str(SUMMARY_RULE);
    out.push_str("\n\n");
    out
}

fn render_issue(issue: &Issue, color: bool) -> String {
    let field = if color {
        issue.field.bright_white().bold().to_string()
    } else {
        issue.field.clone()
    };
    let mut out = format!(
        "Severity: {}\nField: {}\n- {}\n",
        severity_label(issue.severity, color),
        field,
        issue.message
    );
    if issue.unsupported {
        let bang = if color {
            "!".black().on_red().to_string()
        } else {
            "!".to_string()
        };
        out.push_str(&format!("{} {}\n", bang, UNSUPPORTED_BANNER));
    }
    out
}

/// Header, managed namespaces and issues of one instance.
pub fn render_instance_report(report: &InstanceReport, color: bool) -> String {
    let (ns_label, argocd_label) = if color {
        (
            "Namespace".bright_cyan().to_string(),
            "ArgoCD".bright_cyan().to_string(),
        )
    } else {
        ("Namespace".to_string(), "ArgoCD".to_string())
    };
    let mut out = format!(
        "{}\n{} '{}' -> {} '{}':\n",
        INSTANCE_RULE, ns_label, report.namespace, argocd_label, report.name
    );
    for managed in &report.managed {
        out.push_str(&format!(
            "Namespaces with label '{}': {}\n",
            managed.label,
            managed.namespaces.join(", ")
        ));
    }
    if report.issues.is_empty() {
        out.push_str("No issues found.\n");
        return out;
    }
    out.push('\n');
    for issue in &report.issues {
        out.push_str(&render_issue(issue, color));
        out.push('\n');
    }
    out
}

pub fn print_entries(entries: &[Entry], color: bool) {
    print!("{}", render_entries(entries, color));
}

pub fn print_installation_summary(resolution: &Resolution) {
    print!("{}", render_installation_summary(resolution));
}

pub fn print_instance_report(report: &InstanceReport, color: bool) {
    print!("{}", render_instance_report(report, color));
}

/// Compose the JSON document for a finished (or halted) run.
pub fn compose_report_json(resolution: &Resolution, reports: &[InstanceReport]) -> JsonVal {
    json!({
        "entries": resolution.entries,
        "state": resolution.state,
        "halted": resolution.is_fatal(),
        "reports": reports,
        "summary": Summary::from_reports(reports),
    })
}

pub fn print_json(resolution: &Resolution, reports: &[InstanceReport]) {
    println!("{:#}", compose_report_json(resolution, reports));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Entry, InstallationState, ManagedNamespaces, MANAGED_BY_LABEL};

    fn report(issues: Vec<Issue>) -> InstanceReport {
        InstanceReport {
            namespace: "openshift-gitops".into(),
            name: "openshift-gitops".into(),
            issues,
            managed: vec![],
        }
    }

    #[test]
    fn entries_render_with_bracketed_severity() {
        let out = render_entries(
            &[
                Entry::new(Severity::Warn, "non-default namespace"),
                Entry::new(Severity::Fatal, "two subscriptions"),
            ],
            false,
        );
        assert_eq!(out, "[Warn] non-default namespace\n[Fatal] two subscriptions\n");
    }

    #[test]
    fn summary_uses_na_for_unknown_values() {
        let out = render_installation_summary(&Resolution::default());
        assert!(out.contains("Installed operator version is: 'N/A'"));
        assert!(out.contains("Operator installed in namespace: 'N/A'"));
        assert!(out.contains("Cluster-scoped Argo CD instance namespaces: []"));

        let resolution = Resolution {
            state: InstallationState {
                operator_version: Some("1.19.0".into()),
                install_namespace: Some("openshift-gitops-operator".into()),
                cluster_config_namespaces: vec!["openshift-gitops".into(), "team-a".into()],
                ..Default::default()
            },
            entries: vec![],
        };
        let out = render_installation_summary(&resolution);
        assert!(out.contains("'1.19.0'"));
        assert!(out.contains("[openshift-gitops team-a]"));
    }

    #[test]
    fn clean_instance_says_no_issues() {
        let mut r = report(vec![]);
        r.managed = vec![ManagedNamespaces {
            label: MANAGED_BY_LABEL.into(),
            namespaces: vec!["team-a".into(), "team-b".into()],
        }];
        let out = render_instance_report(&r, false);
        assert!(out.contains("Namespace 'openshift-gitops' -> ArgoCD 'openshift-gitops':"));
        assert!(out.contains("Namespaces with label 'argocd.argoproj.io/managed-by': team-a, team-b"));
        assert!(out.ends_with("No issues found.\n"));
    }

    #[test]
    fn issues_render_with_unsupported_banner() {
        let out = render_instance_report(
            &report(vec![
                Issue::error(".spec.image", "custom image").unsupported(),
                Issue::warn(".spec.server.insecure", "insecure"),
            ]),
            false,
        );
        assert!(out.contains("Severity: Error\nField: .spec.image\n- custom image\n! Unsupported"));
        assert!(out.contains("Severity: Warn\nField: .spec.server.insecure\n- insecure\n\n"));
        assert_eq!(out.matches("Unsupported, non-production").count(), 1);
    }

    #[test]
    fn json_document_shape() {
        let resolution = Resolution {
            state: InstallationState::default(),
            entries: vec![Entry::new(Severity::Warn, "w")],
        };
        let reports = vec![report(vec![Issue::error(".spec.image", "x").unsupported()])];
        let doc = compose_report_json(&resolution, &reports);
        assert_eq!(doc["halted"], json!(false));
        assert_eq!(doc["entries"][0]["severity"], json!("Warn"));
        assert_eq!(doc["reports"][0]["issues"][0]["field"], json!(".spec.image"));
        assert_eq!(doc["summary"]["errors"], json!(1));
        assert_eq!(doc["summary"]["unsupported"], json!(1));
        assert_eq!(doc["state"]["operator_version"], json!(null));
    }

    #[test]
    fn halted_run_has_no_reports() {
        let resolution = Resolution {
            state: InstallationState::default(),
            entries: vec![Entry::new(Severity::Fatal, "broken")],
        };
        let doc = compose_report_json(&resolution, &[]);
        assert_eq!(doc["halted"], json!(true));
        assert_eq!(doc["reports"], json!([]));
        assert_eq!(doc["summary"]["instances"], json!(0));
    }
}
