//! Settings given through `extraConfig`, env vars or container arguments
//! that a first-class `ArgoCD` field already covers, or that the surface
//! they were written to ignores.

use super::matchers::{has_arg_key, has_env_key};
use super::Component;
use crate::models::argocd::ArgoCD;
use crate::models::{InstallationState, Issue, Severity};

/// `argocd-cm` keys with a dedicated CR field, as `(key, CR field)`.
const EXTRA_CONFIG_TRANSLATIONS: &[(&str, &str)] = &[
    ("admin.enabled", ".spec.disableAdmin"),
    ("application.instanceLabelKey", ".spec.applicationInstanceLabelKey"),
    ("application.resourceTrackingMethod", ".spec.resourceTrackingMethod"),
    ("dex.config", ".spec.sso.dex"),
    ("ga.anonymizeusers", ".spec.gaAnonymizeUsers"),
    ("ga.trackingid", ".spec.gaTrackingID"),
    ("help.chatText", ".spec.helpChatText"),
    ("help.chatUrl", ".spec.helpChatURL"),
    ("installationID", ".spec.installationID"),
    ("kustomize.buildOptions", ".spec.kustomizeBuildOptions"),
    ("oidc.config", ".spec.oidcConfig"),
    ("resource.respectRBAC", ".spec.controller.respectRBAC"),
    ("resource.exclusions", ".spec.resourceExclusions"),
    ("resource.inclusions", ".spec.resourceInclusions"),
    ("statusbadge.enabled", ".spec.statusBadgeEnabled"),
    ("timeout.reconciliation", ".spec.controller.appSync"),
    ("ui.bannercontent", ".spec.banner.content"),
    ("ui.bannerpermanent", ".spec.banner.permanent"),
    ("ui.bannerposition", ".spec.banner.position"),
    ("ui.bannerurl", ".spec.banner.url"),
    ("users.anonymous.enabled", ".spec.usersAnonymousEnabled"),
];

/// Key families in `extraConfig`, as `(prefix, CR field)`.
const EXTRA_CONFIG_FAMILIES: &[(&str, &str)] = &[
    ("resource.customizations.health.", ".spec.resourceHealthChecks"),
    ("resource.customizations.actions.", ".spec.resourceActions"),
    (
        "resource.customizations.ignoreDifferences.",
        ".spec.resourceIgnoreDifferences",
    ),
];

/// `argocd-cmd-params-cm` keys. They have no effect in `extraConfig`, which
/// only feeds `argocd-cm`.
const CMD_PARAMS_CM_KEYS: &[&str] = &[
    "controller.operation.processors",
    "controller.status.processors",
    "controller.log.format",
    "controller.log.level",
    "controller.sharding.algorithm",
    "controller.kubectl.parallelism.limit",
    "controller.diff.server.side",
    "server.insecure",
    "server.log.format",
    "server.log.level",
    "server.repo.server.timeout.seconds",
    "server.repo.server.strict.tls",
    "reposerver.log.format",
    "reposerver.log.level",
    "reposerver.parallelism.limit",
    "reposerver.disable.tls",
    "reposerver.repo.cache.expiration",
    "reposerver.default.cache.expiration",
    "reposerver.git.request.timeout",
    "dexserver.log.format",
    "dexserver.log.level",
    "dexserver.disable.tls",
    "applicationsetcontroller.log.format",
    "applicationsetcontroller.log.level",
    "applicationsetcontroller.dryrun",
    "applicationsetcontroller.namespaces",
    "applicationsetcontroller.allowed.scm.providers",
    "applicationsetcontroller.enable.scm.providers",
    "applicationsetcontroller.requeue.after",
    "applicationsetcontroller.status.max.resources.count",
    "notificationscontroller.log.level",
    "notificationscontroller.log.format",
];

#[derive(Debug, Clone, Copy)]
enum Surface {
    Env,
    Arg,
}

struct Override {
    component: Component,
    surface: Surface,
    key: &'static str,
    severity: Severity,
    message: &'static str,
}

const OVERRIDES: &[Override] = &[
    Override {
        component: Component::ApplicationSet,
        surface: Surface::Env,
        key: "ARGOCD_APPLICATIONSET_CONTROLLER_NAMESPACES",
        severity: Severity::Error,
        message: "The 'ARGOCD_APPLICATIONSET_CONTROLLER_NAMESPACES' environment variable should not be set directly. Use '.spec.applicationSet.sourceNamespaces' field instead to enable ApplicationSets in any namespace.",
    },
    Override {
        component: Component::ApplicationSet,
        surface: Surface::Arg,
        key: "applicationset-namespaces",
        severity: Severity::Error,
        message: "The '--applicationset-namespaces' argument should not be set directly. Use '.spec.applicationSet.sourceNamespaces' field instead to enable ApplicationSets in any namespace.",
    },
    Override {
        component: Component::Controller,
        surface: Surface::Arg,
        key: "status-processors",
        severity: Severity::Warn,
        message: "While specifying --status-processors via extraCommandArgs is supported, it is preferable to use '.spec.controller.processors.status' ArgoCD CR field for this.",
    },
    Override {
        component: Component::Controller,
        surface: Surface::Env,
        key: "ARGOCD_APPLICATION_CONTROLLER_STATUS_PROCESSORS",
        severity: Severity::Error,
        message: "Specifying ARGOCD_APPLICATION_CONTROLLER_STATUS_PROCESSORS is not guaranteed to be supported. Use '.spec.controller.processors.status' ArgoCD CR field for this.",
    },
    Override {
        component: Component::Controller,
        surface: Surface::Arg,
        key: "operation-processors",
        severity: Severity::Warn,
        message: "While specifying --operation-processors via extraCommandArgs is supported, it is preferable to use '.spec.controller.processors.operation' ArgoCD CR field for this.",
    },
    Override {
        component: Component::Controller,
        surface: Surface::Env,
        key: "ARGOCD_APPLICATION_CONTROLLER_OPERATION_PROCESSORS",
        severity: Severity::Error,
        message: "Specifying ARGOCD_APPLICATION_CONTROLLER_OPERATION_PROCESSORS is not guaranteed to be supported. Use '.spec.controller.processors.operation' ArgoCD CR field for this.",
    },
    Override {
        component: Component::Controller,
        surface: Surface::Env,
        key: "ARGOCD_CONTROLLER_REPLICAS",
        severity: Severity::Error,
        message: "Specifying ARGOCD_CONTROLLER_REPLICAS is not supported. Use '.spec.controller.sharding.replicas' ArgoCD CR field for this.",
    },
    Override {
        component: Component::Controller,
        surface: Surface::Arg,
        key: "app-resync",
        severity: Severity::Warn,
        message: "Specifying '--app-resync' param is supported, but it is preferable to use '.spec.controller.appSync' ArgoCD CR field for this.",
    },
    Override {
        component: Component::Controller,
        surface: Surface::Env,
        key: "ARGOCD_RECONCILIATION_TIMEOUT",
        severity: Severity::Error,
        message: "Specifying ARGOCD_RECONCILIATION_TIMEOUT is not supported. Use '.spec.controller.appSync' ArgoCD CR field for this.",
    },
    Override {
        component: Component::Repo,
        surface: Surface::Env,
        key: "ARGOCD_EXEC_TIMEOUT",
        severity: Severity::Warn,
        message: "Specifying ARGOCD_EXEC_TIMEOUT is supported, but it is preferable to use '.spec.repo.execTimeout' ArgoCD CR field for this.",
    },
    Override {
        component: Component::Server,
        surface: Surface::Env,
        key: "ARGOCD_API_SERVER_REPLICAS",
        severity: Severity::Error,
        message: "Specifying ARGOCD_API_SERVER_REPLICAS env is not supported. Instead use ArgoCD CR '.spec.server.replicas'.",
    },
];

pub fn check(argocd: &ArgoCD, _state: &InstallationState) -> Vec<Issue> {
    let mut issues = check_extra_config(argocd);
    issues.extend(check_overrides(argocd));
    issues
}

fn check_extra_config(argocd: &ArgoCD) -> Vec<Issue> {
    let extra = &argocd.spec.extra_config;
    let mut issues = Vec::new();

    for (key, cr_field) in EXTRA_CONFIG_TRANSLATIONS {
        if extra.get(*key).is_some_and(|v| !v.is_empty()) {
            issues.push(Issue::warn(
                format!(".spec.extraConfig[{}]", key),
                format!(
                    "The '{}' value in extraConfig is supported, but it is preferable to use '{}' ArgoCD CR field for this.",
                    key, cr_field
                ),
            ));
        }
    }

    for (prefix, cr_field) in EXTRA_CONFIG_FAMILIES {
        if extra.keys().any(|k| k.starts_with(prefix)) {
            issues.push(Issue::warn(
                format!(".spec.extraConfig[{}*]", prefix),
                format!(
                    "The '{}*' values in extraConfig are supported, but it is preferable to use '{}' ArgoCD CR field for this.",
                    prefix, cr_field
                ),
            ));
        }
    }

    for key in extra.keys().filter(|k| CMD_PARAMS_CM_KEYS.contains(&k.as_str())) {
        issues.push(Issue::error(
            format!(".spec.extraConfig[{}]", key),
            format!(
                "The '{}' key is not a valid extraConfig key. This key is from 'argocd-cmd-params-cm', but extraConfig only supports 'argocd-cm' keys. Remove this key from extraConfig, and use the corresponding ArgoCD CR field (or env var/param argument) instead.",
                key
            ),
        ));
    }

    issues
}

fn check_overrides(argocd: &ArgoCD) -> Vec<Issue> {
    OVERRIDES
        .iter()
        .filter_map(|o| {
            let settings = o.component.settings(&argocd.spec)?;
            let field = match o.surface {
                Surface::Env if has_env_key(settings.env, o.key) => o.component.env_field(o.key),
                Surface::Arg if has_arg_key(settings.args, o.key) => o.component.arg_field(o.key),
                _ => return None,
            };
            Some(Issue::new(o.severity, field, o.message))
        })
        .collect()
}
