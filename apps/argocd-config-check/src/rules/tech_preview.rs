//! Tech preview and upstream-experimental features. These are reported as
//! warnings, and always as unsupported.

use super::matchers::{has_arg_key, has_arg_kv, has_env_kv};
use super::Component;
use crate::models::argocd::ArgoCD;
use crate::models::{InstallationState, Issue};

const MESSAGE: &str = "This field is a tech preview feature in OpenShift GitOps, which has not been GA-ed as of this writing. Tech preview features are not intended for production usage. More information on Tech Preview scope of support: https://access.redhat.com/support/offerings/techpreview";

const PROGRESSIVE_SYNCS_ARG: &str = "enable-progressive-syncs";
const PROGRESSIVE_SYNCS_ENV: &str = "ARGOCD_APPLICATIONSET_CONTROLLER_ENABLE_PROGRESSIVE_SYNCS";
const SHARDING_ALGORITHM_ENV: &str = "ARGOCD_CONTROLLER_SHARDING_ALGORITHM";
const SHARDING_METHOD_ARG: &str = "sharding-method";

/// round-robin is tech preview; consistent-hashing is experimental upstream.
const PREVIEW_SHARDING_ALGORITHMS: [&str; 2] = ["round-robin", "consistent-hashing"];

fn preview(field: impl Into<String>) -> Issue {
    Issue::warn(field, MESSAGE).unsupported()
}

pub fn check(argocd: &ArgoCD, _state: &InstallationState) -> Vec<Issue> {
    let spec = &argocd.spec;
    let mut issues = Vec::new();

    let appset = Component::ApplicationSet;
    if let Some(settings) = appset.settings(spec) {
        let has_source_namespaces = spec
            .application_set
            .as_ref()
            .is_some_and(|a| !a.source_namespaces.is_empty());
        if has_source_namespaces {
            issues.push(preview(".spec.applicationSet.sourceNamespaces"));
        }
        if has_arg_key(settings.args, PROGRESSIVE_SYNCS_ARG) {
            issues.push(preview(appset.arg_field(PROGRESSIVE_SYNCS_ARG)));
        }
        if has_env_kv(settings.env, PROGRESSIVE_SYNCS_ENV, "true") {
            issues.push(preview(appset.env_kv_field(PROGRESSIVE_SYNCS_ENV, "true")));
        }
    }

    let controller = Component::Controller;
    if let Some(settings) = controller.settings(spec) {
        if spec.controller.sharding.dynamic_scaling_enabled == Some(true) {
            issues.push(preview(".spec.controller.sharding.dynamicScalingEnabled"));
        }

        for algorithm in PREVIEW_SHARDING_ALGORITHMS {
            if has_env_kv(settings.env, SHARDING_ALGORITHM_ENV, algorithm) {
                issues.push(preview(
                    controller.env_kv_field(SHARDING_ALGORITHM_ENV, algorithm),
                ));
            }
        }
        // Only one sharding method can be in effect on the command line.
        for algorithm in PREVIEW_SHARDING_ALGORITHMS {
            if has_arg_kv(settings.args, SHARDING_METHOD_ARG, algorithm) {
                issues.push(preview(controller.arg_kv_field(SHARDING_METHOD_ARG, algorithm)));
                break;
            }
        }
    }

    issues
}
