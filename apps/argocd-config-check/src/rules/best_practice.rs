use crate::models::argocd::ArgoCD;
use crate::models::{InstallationState, Issue};

pub fn check(argocd: &ArgoCD, _state: &InstallationState) -> Vec<Issue> {
    let spec = &argocd.spec;
    let mut issues = Vec::new();

    if spec.server.is_enabled() && spec.server.insecure {
        issues.push(Issue::warn(
            ".spec.server.insecure",
            "Argo CD server component is currently in an insecure state.",
        ));
    }

    if let Some(agent) = &spec.argocd_agent {
        let insecure_generate = agent
            .principal
            .as_ref()
            .and_then(|p| p.tls.as_ref())
            .and_then(|tls| tls.insecure_generate);
        if insecure_generate == Some(true) {
            issues.push(Issue::warn(
                ".spec.argoCDAgent.principal.tls.insecureGenerate",
                "Argo CD Agent principal is generating insecure TLS certificates.",
            ));
        }

        let insecure = agent
            .agent
            .as_ref()
            .and_then(|a| a.tls.as_ref())
            .and_then(|tls| tls.insecure);
        if insecure == Some(true) {
            issues.push(Issue::warn(
                ".spec.argoCDAgent.agent.tls.insecure",
                "Argo CD Agent agent is running in an insecure configuration.",
            ));
        }
    }

    issues
}
