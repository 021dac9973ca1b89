//! Check runner.
//!
//! Two phases: `resolve_phase` derives installation state once, and, unless
//! it ended in a Fatal entry, `inspect_instances` evaluates every `ArgoCD`
//! object against the rule engine. Output rendering lives in `output`.

use crate::error::RunError;
use crate::models::argocd::ArgoCD;
use crate::models::{contains_fatal, Entry, InstallationState, Issue, ManagedNamespaces, Severity};
use crate::resolve::resolve;
use crate::rules::evaluate;
use crate::source::{self, DataSource};
use serde::Serialize;
use tracing::debug;

const NOT_GITOPS_MUST_GATHER_HINT: &str = "Based on the error, the must-gather may not be a gitops must-gather (for example, it may instead be an openshift must-gather).";

#[derive(Debug, Clone, Default, Serialize)]
/// Outcome of the resolution phase.
pub struct Resolution {
    pub state: InstallationState,
    pub entries: Vec<Entry>,
}

impl Resolution {
    /// True when resolution hit a broken invariant and the run must stop.
    pub fn is_fatal(&self) -> bool {
        contains_fatal(&self.entries)
    }
}

pub fn resolve_phase(source: &dyn DataSource) -> Resolution {
    let (state, entries) = resolve(source);
    debug!(entries = entries.len(), "resolution finished");
    Resolution { state, entries }
}

#[derive(Debug, Clone, Serialize)]
/// Rule findings for one `ArgoCD` object.
pub struct InstanceReport {
    pub namespace: String,
    pub name: String,
    pub issues: Vec<Issue>,
    /// Namespaces whose ownership labels point at this instance's namespace.
    pub managed: Vec<ManagedNamespaces>,
}

impl InstanceReport {
    pub fn new(argocd: &ArgoCD, state: &InstallationState) -> Self {
        InstanceReport {
            namespace: argocd.namespace().to_string(),
            name: argocd.name().to_string(),
            issues: evaluate(argocd, state),
            managed: state.ownership.managed_by(argocd.namespace()),
        }
    }
}

/// List `ArgoCD` objects (all namespaces, or only `namespace`) and evaluate
/// each in listing order.
pub fn inspect_instances(
    source: &dyn DataSource,
    state: &InstallationState,
    namespace: Option<&str>,
) -> Result<Vec<InstanceReport>, RunError> {
    let listed = match namespace {
        Some(ns) => source::list_in::<ArgoCD>(source, ns),
        None => source::list_all::<ArgoCD>(source),
    };
    let instances = listed.map_err(|err| {
        let hint = (source.is_data_incomplete() && err.is_unknown_type())
            .then_some(NOT_GITOPS_MUST_GATHER_HINT);
        RunError::ListInstances { source: err, hint }
    })?;

    if instances.is_empty() {
        return Err(RunError::NoInstances {
            snapshot: source.is_data_incomplete(),
        });
    }

    Ok(instances
        .iter()
        .map(|argocd| {
            let report = InstanceReport::new(argocd, state);
            debug!(
                namespace = %report.namespace,
                name = %report.name,
                issues = report.issues.len(),
                "instance evaluated"
            );
            report
        })
        .collect())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub instances: usize,
    pub errors: usize,
    pub warnings: usize,
    pub unsupported: usize,
}

impl Summary {
    pub fn from_reports(reports: &[InstanceReport]) -> Self {
        let issues = || reports.iter().flat_map(|r| r.issues.iter());
        Summary {
            instances: reports.len(),
            errors: issues().filter(|i| i.severity >= Severity::Error).count(),
            warnings: issues().filter(|i| i.severity == Severity::Warn).count(),
            unsupported: issues().filter(|i| i.unsupported).count(),
        }
    }
}
