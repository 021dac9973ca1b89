//! Fields the operator still parses but no longer acts on.

use crate::models::argocd::{is_set, ArgoCD};
use crate::models::{InstallationState, Issue};

pub fn check(argocd: &ArgoCD, _state: &InstallationState) -> Vec<Issue> {
    let spec = &argocd.spec;
    let mut issues = Vec::new();

    if is_set(spec.config_management_plugins.as_ref()) {
        issues.push(Issue::error(
            ".spec.configManagementPlugins",
            "ConfigManagementPlugins field is no longer supported. Argo CD now requires plugins to be defined as sidecar containers of repo server component. See '.spec.repo.sidecarContainers'. ConfigManagementPlugins was previously used to specify additional config management plugins.",
        ));
    }

    if spec.grafana.enabled {
        issues.push(Issue::error(
            ".spec.grafana",
            "grafana field is deprecated from ArgoCD CR: this field will be ignored by operator, and any remaining Grafana resources will be removed.",
        ));
    }

    if is_set(spec.initial_repositories.as_ref()) {
        issues.push(Issue::error(
            ".spec.initialRepositories",
            "initialRepositories field is deprecated from ArgoCD CR. The field will be ignored by operator.",
        ));
    }

    if is_set(spec.repository_credentials.as_ref()) {
        issues.push(Issue::error(
            ".spec.repositoryCredentials",
            "repositoryCredentials field is deprecated from ArgoCD CR. The field will be ignored by operator.",
        ));
    }

    if spec
        .sso
        .as_ref()
        .map(|sso| sso.keycloak.is_some())
        .unwrap_or(false)
    {
        issues.push(Issue::error(
            ".spec.sso.keycloak",
            "keycloak field is no longer supported. ArgoCD operator will no longer create and manage a keycloak instance on the users behalf. Users may instead manage their own keycloak instance (using e.g. keycloak operator) and configure Argo CD to use it.",
        ));
    }

    issues
}
