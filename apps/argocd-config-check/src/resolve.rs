//! Installation state resolution.
//!
//! Walks Subscription -> ClusterServiceVersion -> Namespaces to work out how
//! the GitOps operator is installed. Nothing here fails: problems become
//! `Entry` values, and fields that could not be derived stay unset.
//!
//! How loudly a missing object is reported depends on the source: a live
//! cluster missing the data is a real problem, while a must-gather that did
//! not export it is expected. See `severity_for`.

use crate::models::olm::{ClusterServiceVersion, Subscription};
use crate::models::{Entry, InstallationState, Severity};
use crate::source::{self, DataSource};
use k8s_openapi::api::core::v1::Namespace;
use tracing::debug;

/// Package name of the OpenShift GitOps operator Subscription.
pub const OPERATOR_PACKAGE: &str = "openshift-gitops-operator";
/// Namespace the operator is installed into by default.
pub const DEFAULT_INSTALL_NAMESPACE: &str = "openshift-gitops-operator";
/// Cluster-scoped instance namespace used when the Subscription has no config.
pub const DEFAULT_CLUSTER_CONFIG_NAMESPACE: &str = "openshift-gitops";
/// Subscription env entry listing namespaces with cluster-scoped instances.
pub const CLUSTER_CONFIG_NAMESPACES_ENV: &str = "ARGOCD_CLUSTER_CONFIG_NAMESPACES";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// How much a missing object matters.
pub enum Gap {
    /// The object may legitimately be absent from a partial snapshot.
    Expected,
    /// The object is referenced by data already found, so it must exist.
    Required,
}

/// Severity for a lookup failure, given whether the source is incomplete.
pub fn severity_for(gap: Gap, incomplete: bool) -> Severity {
    match (gap, incomplete) {
        (Gap::Expected, true) => Severity::Warn,
        (Gap::Expected, false) => Severity::Error,
        (Gap::Required, true) => Severity::Error,
        (Gap::Required, false) => Severity::Fatal,
    }
}

/// Resolve installation facts from `source`.
pub fn resolve(source: &dyn DataSource) -> (InstallationState, Vec<Entry>) {
    let mut state = InstallationState::default();
    let mut entries = Vec::new();
    resolve_into(source, &mut state, &mut entries);
    (state, entries)
}

/// Each early `return` ends resolution; whatever was recorded so far stays.
fn resolve_into(source: &dyn DataSource, state: &mut InstallationState, entries: &mut Vec<Entry>) {
    let incomplete = source.is_data_incomplete();

    // 1. Locate the operator Subscription
    let subscriptions: Vec<Subscription> = match source::list_all(source) {
        Ok(list) => list,
        Err(err) => {
            let message = if incomplete {
                format!("Unable to locate operator install Subscription. BUT, this may be expected because the cluster data is incomplete (for example, if using must-gather, the must-gather may not contain full cluster output of all relevant namespaces). Error: {}", err)
            } else {
                format!(
                    "Unable to locate operator install Subscription in any namespace. Error: {}",
                    err
                )
            };
            entries.push(Entry::new(severity_for(Gap::Expected, incomplete), message));
            return;
        }
    };
    debug!(count = subscriptions.len(), "listed subscriptions");

    // 2. Exactly one may match the package
    let mut matching = subscriptions
        .iter()
        .filter(|s| s.package() == Some(OPERATOR_PACKAGE));
    let subscription = match (matching.next(), matching.next()) {
        (None, _) => {
            let message = if incomplete {
                "Subscription could not be located, but this may be because cluster data is incomplete (for example, namespace was not included in what was exported to must-gather)"
            } else {
                "Subscription could not be located"
            };
            entries.push(Entry::new(severity_for(Gap::Expected, incomplete), message));
            return;
        }
        (Some(first), Some(second)) => {
            entries.push(Entry::new(
                Severity::Fatal,
                format!(
                    "unexpected number of gitops subscriptions found: one in '{}' and one in '{}'",
                    first.qualified_name(),
                    second.qualified_name()
                ),
            ));
            return;
        }
        (Some(only), None) => only,
    };

    // 3. Install namespace; a non-default one is worth a warning only
    let install_ns = subscription.namespace().to_string();
    debug!(namespace = %install_ns, "found operator subscription");
    if install_ns != DEFAULT_INSTALL_NAMESPACE {
        entries.push(Entry::new(
            Severity::Warn,
            format!(
                "operator was installed into an unexpected namespace '{}'. The default is '{}'",
                install_ns, DEFAULT_INSTALL_NAMESPACE
            ),
        ));
    }
    state.install_namespace = Some(install_ns.clone());

    // 4. Installation must have settled
    let current_csv = &subscription.status.current_csv;
    let installed_csv = &subscription.status.installed_csv;
    if installed_csv != current_csv {
        entries.push(Entry::new(
            Severity::Error,
            "the '.status.currentCSV' field of operator != '.status.installedCSV' of operator, indicating installation may be in progress or stalled.",
        ));
        return;
    }

    // 5. Namespaces hosting cluster-scoped instances
    match subscription.spec.as_ref().and_then(|s| s.config.as_ref()) {
        Some(config) => {
            let values: Vec<&str> = config
                .env
                .iter()
                .filter(|e| e.name == CLUSTER_CONFIG_NAMESPACES_ENV)
                .map(|e| e.value.as_deref().unwrap_or_default())
                .collect();
            if values.len() > 1 {
                entries.push(Entry::new(
                    Severity::Fatal,
                    format!("multiple {} env entries were found in Subscription's .spec.config.env, which is not valid", CLUSTER_CONFIG_NAMESPACES_ENV),
                ));
                return;
            }
            if let Some(value) = values.first() {
                state.cluster_config_namespaces = parse_namespace_list(value);
            }
        }
        None => {
            state.cluster_config_namespaces = vec![DEFAULT_CLUSTER_CONFIG_NAMESPACE.to_string()];
        }
    }

    // 6. The installed CSV lives next to the Subscription
    if installed_csv.is_empty() {
        entries.push(Entry::new(
            severity_for(Gap::Required, incomplete),
            "Subscription exists, but '.status.installedCSV' is empty, so ClusterServiceVersion could not be retrieved.",
        ));
        return;
    }
    let csv: ClusterServiceVersion = match source::get(source, &install_ns, installed_csv) {
        Ok(csv) => csv,
        Err(err) => {
            entries.push(Entry::new(
                severity_for(Gap::Required, incomplete),
                format!("Subscription exists, and points to ClusterServiceVersion, but ClusterServiceVersion could not be retrieved: {}", err),
            ));
            return;
        }
    };

    // 7. Install must have succeeded
    if csv.status.phase != "Succeeded" || csv.status.reason != "InstallSucceeded" {
        entries.push(Entry::new(
            Severity::Error,
            format!(
                "unexpected values found in ClusterServiceVersion: .status.phase: {}, .status.reason: {}",
                csv.status.phase, csv.status.reason
            ),
        ));
        return;
    }

    // 8.
    state.operator_version = Some(csv.spec.version.clone());
    debug!(version = %csv.spec.version, "resolved operator version");

    // 9. Namespace ownership labels. Namespaces always exist, so failing to
    //    list them means the data cannot be trusted.
    let namespaces: Vec<Namespace> = match source::list_all(source) {
        Ok(list) => list,
        Err(err) => {
            entries.push(Entry::new(
                Severity::Fatal,
                format!("unable to list Namespaces: {}", err),
            ));
            return;
        }
    };
    for ns in &namespaces {
        let (Some(name), Some(labels)) = (ns.metadata.name.as_deref(), ns.metadata.labels.as_ref())
        else {
            continue;
        };
        state.ownership.record(name, labels);
    }
}

/// Split a comma-separated namespace list, trimming and dropping empties.
pub fn parse_namespace_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MANAGED_BY_LABEL;
    use crate::source::fake::FakeSource;
    use crate::source::ResourceKind;
    use serde_json::{json, Value as Json};

    fn subscription(namespace: &str, name: &str) -> Json {
        json!({
            "apiVersion": "operators.coreos.com/v1alpha1",
            "kind": "Subscription",
            "metadata": {"name": name, "namespace": namespace},
            "spec": {"name": OPERATOR_PACKAGE, "channel": "latest"},
            "status": {
                "currentCSV": "openshift-gitops-operator.v1.19.0",
                "installedCSV": "openshift-gitops-operator.v1.19.0"
            }
        })
    }

    fn csv(namespace: &str, phase: &str, reason: &str) -> Json {
        json!({
            "metadata": {"name": "openshift-gitops-operator.v1.19.0", "namespace": namespace},
            "spec": {"version": "1.19.0"},
            "status": {"phase": phase, "reason": reason}
        })
    }

    fn namespace(name: &str, labels: Json) -> Json {
        json!({
            "apiVersion": "v1",
            "kind": "Namespace",
            "metadata": {"name": name, "labels": labels}
        })
    }

    fn healthy(incomplete: bool) -> FakeSource {
        FakeSource::new(incomplete)
            .with(
                ResourceKind::Subscription,
                subscription(DEFAULT_INSTALL_NAMESPACE, "openshift-gitops-operator"),
            )
            .with(
                ResourceKind::ClusterServiceVersion,
                csv(DEFAULT_INSTALL_NAMESPACE, "Succeeded", "InstallSucceeded"),
            )
            .with(ResourceKind::Namespace, namespace("openshift-gitops", json!({})))
    }

    fn severities(entries: &[Entry]) -> Vec<Severity> {
        entries.iter().map(|e| e.severity).collect()
    }

    #[test]
    fn severity_mapping_depends_on_completeness() {
        assert_eq!(severity_for(Gap::Expected, true), Severity::Warn);
        assert_eq!(severity_for(Gap::Expected, false), Severity::Error);
        assert_eq!(severity_for(Gap::Required, true), Severity::Error);
        assert_eq!(severity_for(Gap::Required, false), Severity::Fatal);
    }

    #[test]
    fn healthy_install_resolves_without_entries() {
        let (state, entries) = resolve(&healthy(false));
        assert!(entries.is_empty(), "{:?}", entries);
        assert_eq!(state.operator_version.as_deref(), Some("1.19.0"));
        assert_eq!(state.install_namespace.as_deref(), Some("openshift-gitops-operator"));
        assert_eq!(state.cluster_config_namespaces, vec!["openshift-gitops"]);
    }

    #[test]
    fn subscription_list_failure_is_warn_on_snapshot_and_error_on_live() {
        let snap = FakeSource::new(true).failing(ResourceKind::Subscription);
        let (state, entries) = resolve(&snap);
        assert_eq!(severities(&entries), vec![Severity::Warn]);
        assert_eq!(state, InstallationState::default());

        let live = FakeSource::new(false).failing(ResourceKind::Subscription);
        let (_, entries) = resolve(&live);
        assert_eq!(severities(&entries), vec![Severity::Error]);
    }

    #[test]
    fn missing_subscription_follows_source_completeness() {
        let other = json!({"metadata": {"name": "x", "namespace": "y"}, "spec": {"name": "other-operator"}});
        let (_, entries) = resolve(&FakeSource::new(true).with(ResourceKind::Subscription, other.clone()));
        assert_eq!(severities(&entries), vec![Severity::Warn]);
        let (_, entries) = resolve(&FakeSource::new(false).with(ResourceKind::Subscription, other));
        assert_eq!(severities(&entries), vec![Severity::Error]);
    }

    #[test]
    fn subscription_without_spec_is_skipped() {
        let bare = json!({"metadata": {"name": "x", "namespace": "y"}});
        let (_, entries) = resolve(&healthy(false).with(ResourceKind::Subscription, bare));
        assert!(entries.is_empty());
    }

    #[test]
    fn duplicate_subscriptions_are_fatal() {
        let src = healthy(false).with(ResourceKind::Subscription, subscription("other-ns", "dup"));
        let (state, entries) = resolve(&src);
        assert_eq!(severities(&entries), vec![Severity::Fatal]);
        assert!(entries[0].message.contains("other-ns/dup"));
        assert_eq!(state, InstallationState::default());
    }

    #[test]
    fn non_default_namespace_warns_and_continues() {
        let src = FakeSource::new(false)
            .with(ResourceKind::Subscription, subscription("gitops", "sub"))
            .with(ResourceKind::ClusterServiceVersion, csv("gitops", "Succeeded", "InstallSucceeded"));
        let (state, entries) = resolve(&src);
        assert_eq!(severities(&entries), vec![Severity::Warn]);
        assert_eq!(state.install_namespace.as_deref(), Some("gitops"));
        assert_eq!(state.operator_version.as_deref(), Some("1.19.0"));
    }

    #[test]
    fn csv_mismatch_stops_with_error() {
        let mut sub = subscription(DEFAULT_INSTALL_NAMESPACE, "s");
        sub["status"]["currentCSV"] = json!("openshift-gitops-operator.v1.20.0");
        let (state, entries) = resolve(&FakeSource::new(false).with(ResourceKind::Subscription, sub));
        assert_eq!(severities(&entries), vec![Severity::Error]);
        assert!(state.install_namespace.is_some());
        assert!(state.cluster_config_namespaces.is_empty());
        assert!(state.operator_version.is_none());
    }

    #[test]
    fn cluster_config_namespaces_are_parsed_from_env() {
        let mut sub = subscription(DEFAULT_INSTALL_NAMESPACE, "s");
        sub["spec"]["config"] = json!({"env": [
            {"name": "OTHER", "value": "x"},
            {"name": CLUSTER_CONFIG_NAMESPACES_ENV, "value": " openshift-gitops, argocd-prod ,,argocd-staging "}
        ]});
        let src = FakeSource::new(false)
            .with(ResourceKind::Subscription, sub)
            .with(ResourceKind::ClusterServiceVersion, csv(DEFAULT_INSTALL_NAMESPACE, "Succeeded", "InstallSucceeded"));
        let (state, entries) = resolve(&src);
        assert!(entries.is_empty());
        assert_eq!(
            state.cluster_config_namespaces,
            vec!["openshift-gitops", "argocd-prod", "argocd-staging"]
        );
    }

    #[test]
    fn config_without_env_entry_leaves_list_empty() {
        let mut sub = subscription(DEFAULT_INSTALL_NAMESPACE, "s");
        sub["spec"]["config"] = json!({"env": []});
        let src = FakeSource::new(false)
            .with(ResourceKind::Subscription, sub)
            .with(ResourceKind::ClusterServiceVersion, csv(DEFAULT_INSTALL_NAMESPACE, "Succeeded", "InstallSucceeded"));
        let (state, _) = resolve(&src);
        assert!(state.cluster_config_namespaces.is_empty());
    }

    #[test]
    fn duplicate_cluster_config_env_is_fatal() {
        let mut sub = subscription(DEFAULT_INSTALL_NAMESPACE, "s");
        sub["spec"]["config"] = json!({"env": [
            {"name": CLUSTER_CONFIG_NAMESPACES_ENV, "value": "a"},
            {"name": CLUSTER_CONFIG_NAMESPACES_ENV, "value": "b"}
        ]});
        let (_, entries) = resolve(&FakeSource::new(false).with(ResourceKind::Subscription, sub));
        assert_eq!(severities(&entries), vec![Severity::Fatal]);
    }

    #[test]
    fn missing_csv_is_error_on_snapshot_and_fatal_on_live() {
        let sub = subscription(DEFAULT_INSTALL_NAMESPACE, "s");
        let (state, entries) = resolve(&FakeSource::new(true).with(ResourceKind::Subscription, sub.clone()));
        assert_eq!(severities(&entries), vec![Severity::Error]);
        assert_eq!(state.cluster_config_namespaces, vec!["openshift-gitops"]);
        let (_, entries) = resolve(&FakeSource::new(false).with(ResourceKind::Subscription, sub));
        assert_eq!(severities(&entries), vec![Severity::Fatal]);
    }

    #[test]
    fn unpopulated_subscription_status_skips_csv_lookup() {
        let mut sub = subscription(DEFAULT_INSTALL_NAMESPACE, "s");
        sub["status"] = json!({});
        for (incomplete, severity) in [(true, Severity::Error), (false, Severity::Fatal)] {
            let src = FakeSource::new(incomplete)
                .with(ResourceKind::Subscription, sub.clone())
                .with(ResourceKind::ClusterServiceVersion, csv(DEFAULT_INSTALL_NAMESPACE, "Succeeded", "InstallSucceeded"));
            let (state, entries) = resolve(&src);
            assert_eq!(severities(&entries), vec![severity]);
            assert!(entries[0].message.contains(".status.installedCSV' is empty"));
            assert!(state.operator_version.is_none());
        }
    }

    #[test]
    fn failed_csv_phase_is_error() {
        let src = FakeSource::new(false)
            .with(ResourceKind::Subscription, subscription(DEFAULT_INSTALL_NAMESPACE, "s"))
            .with(ResourceKind::ClusterServiceVersion, csv(DEFAULT_INSTALL_NAMESPACE, "Failed", "InstallCheckFailed"));
        let (state, entries) = resolve(&src);
        assert_eq!(severities(&entries), vec![Severity::Error]);
        assert!(entries[0].message.contains("Failed"));
        assert!(entries[0].message.contains("InstallCheckFailed"));
        assert!(state.operator_version.is_none());
    }

    #[test]
    fn namespace_list_failure_is_fatal_even_on_snapshot() {
        let src = healthy(true).failing(ResourceKind::Namespace);
        let (state, entries) = resolve(&src);
        assert_eq!(severities(&entries), vec![Severity::Fatal]);
        assert_eq!(state.operator_version.as_deref(), Some("1.19.0"));
    }

    #[test]
    fn ownership_maps_are_built_from_labels() {
        let src = healthy(false).with(
            ResourceKind::Namespace,
            namespace("team-a", json!({MANAGED_BY_LABEL: "openshift-gitops"})),
        );
        let (state, entries) = resolve(&src);
        assert!(entries.is_empty());
        assert_eq!(
            state.ownership.managed_by.get("team-a").map(String::as_str),
            Some("openshift-gitops")
        );
        assert!(state.ownership.managed_by_cluster_argocd.is_empty());
    }

    #[test]
    fn parse_namespace_list_drops_empty_entries() {
        assert_eq!(parse_namespace_list(" a , ,b,"), vec!["a", "b"]);
        assert!(parse_namespace_list("").is_empty());
    }
}
