//! Error types for data sources and the check runner.

use thiserror::Error;

/// Errors raised by a data source while fetching cluster objects.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Output from OMC: {output}\n'{command}' exited with {status}")]
    Command {
        command: String,
        status: String,
        output: String,
    },

    #[error("Kubernetes API error: {0}")]
    Api(#[from] kube::Error),

    #[error("unable to start client runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("failed to parse YAML returned by '{command}': {source}")]
    Yaml {
        command: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to decode {kind}: {source}")]
    Decode {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl SourceError {
    /// The snapshot tool reports resource types it has no data for as
    /// "not known".
    pub fn is_unknown_type(&self) -> bool {
        self.to_string().contains("not known")
    }
}

/// Errors that stop the run after the resolution phase.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("unable to list ArgoCDs: {source}")]
    ListInstances {
        #[source]
        source: SourceError,
        hint: Option<&'static str>,
    },

    #[error("unable to locate any ArgoCD CRs{}", no_instances_hint(.snapshot))]
    NoInstances { snapshot: bool },
}

fn no_instances_hint(snapshot: &bool) -> &'static str {
    if *snapshot {
        ": the must-gather may not be a gitops must-gather (for example, it may instead be an openshift must-gather)"
    } else {
        ""
    }
}

impl RunError {
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            RunError::ListInstances { hint, .. } => *hint,
            RunError::NoInstances { .. } => None,
        }
    }
}
