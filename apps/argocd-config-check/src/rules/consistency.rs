//! Settings that are individually valid but contradict each other, or that
//! the operator will silently ignore.

use crate::models::argocd::ArgoCD;
use crate::models::{InstallationState, Issue};
use crate::quantity::{bytes_to_mib, parse_memory_to_bytes};

/// Rough memory cost of one operation processor, in MiB.
const MIB_PER_OPERATION_PROCESSOR: i64 = 35;

/// The only keys `.spec.cmdParams` passes through.
const SUPPORTED_CMD_PARAMS: [&str; 3] = [
    "controller.resource.health.persist",
    "server.profile.enabled",
    "controller.profile.enabled",
];

pub fn check(argocd: &ArgoCD, _state: &InstallationState) -> Vec<Issue> {
    let mut issues = Vec::new();
    let controller = &argocd.spec.controller;

    if controller.is_enabled() {
        let sharding = &controller.sharding;
        if sharding.enabled
            && sharding.dynamic_scaling_enabled != Some(true)
            && sharding.clusters_per_shard != 0
        {
            issues.push(Issue::error(
                ".spec.controller.sharding.clustersPerShard",
                "'clusterPerShard' is specified, but this value is not used because dynamic scaling is disabled. The 'clusterPerShard' field is only used when dynamic scaling is ENABLED. Enable dynamic scaling, or remove the 'clustersPerShard' field.",
            ));
        }

        if let Some(issue) = check_operation_processor_memory(argocd) {
            issues.push(issue);
        }
    }

    for key in argocd.spec.cmd_params.keys() {
        if !SUPPORTED_CMD_PARAMS.contains(&key.as_str()) {
            issues.push(Issue::error(
                format!(".spec.cmdParams[{}]", key),
                format!(
                    "The cmdParams key '{}' is not a supported parameter of '.spec.cmdParams'. It will not affect Argo CD configuration. You likely instead want to either A) use the corresponding value in ArgoCD CR if it exists, or B) use environment variable/container argument to enable the configuration.",
                    key
                ),
            ));
        }
    }

    issues
}

fn check_operation_processor_memory(argocd: &ArgoCD) -> Option<Issue> {
    let controller = &argocd.spec.controller;
    let operation = controller.processors.operation;
    if operation <= 0 {
        return None;
    }
    let limit = controller.memory_limit()?;
    let limit_mib = match parse_memory_to_bytes(limit) {
        Ok(bytes) => bytes_to_mib(bytes),
        Err(err) => {
            tracing::debug!(argocd = argocd.name(), %err, "skipping memory heuristic");
            return None;
        }
    };

    let required_mib = operation.saturating_mul(MIB_PER_OPERATION_PROCESSOR);
    if u64::try_from(required_mib).map_or(false, |r| r > limit_mib) {
        Some(Issue::warn(
            ".spec.controller.processors.operation",
            format!(
                "The operation processors value of {} may require approximately {} MiB of memory (as a very rough heuristic) if fully utilized, but the memory limit is only {} MiB. Consider increasing the memory limit or reducing the number of operation processors. For comparison, the default value for this field is 10.",
                operation, required_mib, limit_mib
            ),
        ))
    } else {
        None
    }
}
