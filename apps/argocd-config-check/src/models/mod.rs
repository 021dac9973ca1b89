//! Shared data models for resolution entries, rule issues, and the
//! resources read from the cluster.

pub mod argocd;
pub mod olm;

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
/// Severity of an entry or issue. Ordered `Warn < Error < Fatal`.
pub enum Severity {
    /// Mild or moderate chance of misconfiguration, or a gap that is expected
    /// from the data source.
    Warn,
    /// High chance of misconfiguration; later logic is still trustworthy.
    Error,
    /// A system invariant is broken; nothing derived afterwards is reliable.
    Fatal,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warn => "Warn",
            Severity::Error => "Error",
            Severity::Fatal => "Fatal",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A problem hit while resolving installation state.
pub struct Entry {
    pub severity: Severity,
    pub message: String,
}

impl Entry {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Entry {
            severity,
            message: message.into(),
        }
    }
}

/// True when any entry in the log is Fatal.
pub fn contains_fatal(entries: &[Entry]) -> bool {
    entries.iter().any(|e| e.severity == Severity::Fatal)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A single configuration problem found in one `ArgoCD` object.
pub struct Issue {
    pub severity: Severity,
    /// Locator of the offending field, e.g. `.spec.repo.image`. Never empty.
    pub field: String,
    pub message: String,
    /// Set for configurations outside product support (custom images,
    /// tech preview features), independent of severity.
    pub unsupported: bool,
}

impl Issue {
    pub fn new(severity: Severity, field: impl Into<String>, message: impl Into<String>) -> Self {
        let field = field.into();
        debug_assert!(!field.is_empty(), "issue emitted without a field path");
        Issue {
            severity,
            field,
            message: message.into(),
            unsupported: false,
        }
    }

    pub fn warn(field: impl Into<String>, message: impl Into<String>) -> Self {
        Issue::new(Severity::Warn, field, message)
    }

    pub fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Issue::new(Severity::Error, field, message)
    }

    /// Mark the issue as an unsupported configuration.
    pub fn unsupported(mut self) -> Self {
        self.unsupported = true;
        self
    }
}

/// Stable sort by field path; equal paths keep rule-execution order.
pub fn sort_issues_by_field(issues: &mut [Issue]) {
    issues.sort_by(|a, b| a.field.cmp(&b.field));
}

/// Namespace label keys linking a managed namespace to an Argo CD instance.
pub const MANAGED_BY_LABEL: &str = "argocd.argoproj.io/managed-by";
pub const MANAGED_BY_CLUSTER_ARGOCD_LABEL: &str = "argocd.argoproj.io/managed-by-cluster-argocd";
pub const APPSET_MANAGED_BY_CLUSTER_ARGOCD_LABEL: &str =
    "argocd.argoproj.io/applicationset-managed-by-cluster-argocd";
pub const NOTIFICATIONS_MANAGED_BY_CLUSTER_ARGOCD_LABEL: &str =
    "argocd.argoproj.io/notifications-managed-by-cluster-argocd";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
/// Managed namespace -> namespace of the managing instance, one map per label.
pub struct NamespaceOwnership {
    pub managed_by: BTreeMap<String, String>,
    pub managed_by_cluster_argocd: BTreeMap<String, String>,
    pub applicationset_managed_by_cluster_argocd: BTreeMap<String, String>,
    pub notifications_managed_by_cluster_argocd: BTreeMap<String, String>,
}

impl NamespaceOwnership {
    /// Record every ownership label present on one namespace.
    pub fn record(&mut self, namespace: &str, labels: &BTreeMap<String, String>) {
        for (label, map) in self.maps_mut() {
            if let Some(owner) = labels.get(label) {
                map.insert(namespace.to_string(), owner.clone());
            }
        }
    }

    /// Label key paired with its map, in a fixed order.
    pub fn maps(&self) -> [(&'static str, &BTreeMap<String, String>); 4] {
        [
            (MANAGED_BY_LABEL, &self.managed_by),
            (MANAGED_BY_CLUSTER_ARGOCD_LABEL, &self.managed_by_cluster_argocd),
            (
                APPSET_MANAGED_BY_CLUSTER_ARGOCD_LABEL,
                &self.applicationset_managed_by_cluster_argocd,
            ),
            (
                NOTIFICATIONS_MANAGED_BY_CLUSTER_ARGOCD_LABEL,
                &self.notifications_managed_by_cluster_argocd,
            ),
        ]
    }

    fn maps_mut(&mut self) -> [(&'static str, &mut BTreeMap<String, String>); 4] {
        [
            (MANAGED_BY_LABEL, &mut self.managed_by),
            (
                MANAGED_BY_CLUSTER_ARGOCD_LABEL,
                &mut self.managed_by_cluster_argocd,
            ),
            (
                APPSET_MANAGED_BY_CLUSTER_ARGOCD_LABEL,
                &mut self.applicationset_managed_by_cluster_argocd,
            ),
            (
                NOTIFICATIONS_MANAGED_BY_CLUSTER_ARGOCD_LABEL,
                &mut self.notifications_managed_by_cluster_argocd,
            ),
        ]
    }

    /// Namespaces managed by the instance living in `owner_namespace`,
    /// grouped per label (labels with no match are omitted).
    pub fn managed_by(&self, owner_namespace: &str) -> Vec<ManagedNamespaces> {
        self.maps()
            .into_iter()
            .filter_map(|(label, map)| {
                let namespaces: Vec<String> = map
                    .iter()
                    .filter(|(_, owner)| owner.as_str() == owner_namespace)
                    .map(|(ns, _)| ns.clone())
                    .collect();
                if namespaces.is_empty() {
                    None
                } else {
                    Some(ManagedNamespaces {
                        label: label.to_string(),
                        namespaces,
                    })
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Namespaces carrying `label` that point at one instance.
pub struct ManagedNamespaces {
    pub label: String,
    pub namespaces: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
/// Facts about the operator installation, derived once per run.
pub struct InstallationState {
    pub operator_version: Option<String>,
    pub install_namespace: Option<String>,
    /// Namespaces whose Argo CD instances are cluster-scoped.
    pub cluster_config_namespaces: Vec<String>,
    pub ownership: NamespaceOwnership,
}
