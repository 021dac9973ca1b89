//! Health reported by the operator in `.status`.

use crate::models::argocd::ArgoCD;
use crate::models::{InstallationState, Issue};

pub fn check(argocd: &ArgoCD, _state: &InstallationState) -> Vec<Issue> {
    let status = &argocd.status;
    let mut issues = Vec::new();

    if status.phase != "Available" {
        issues.push(Issue::error(
            ".status.phase",
            "The '.status.phase' field is not currently available. This implies that one or more Argo CD components are not currently running.",
        ));
    }

    for condition in &status.conditions {
        if condition.type_ == "Reconciled" && !condition.status.eq_ignore_ascii_case("true") {
            issues.push(Issue::error(
                ".status.conditions[Reconciled]",
                "The 'Reconciled' .status.conditions condition is currently not 'true'. This implies the ArgoCD CR has been reconciled by the operator, but not successfully. E.g. an error occurred during reconciliation.",
            ));
        }
    }

    issues
}
