//! CLI argument parsing via `clap`.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputMode::Human => "human",
            OutputMode::Json => "json",
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "argocd-config-check",
    version,
    about = "Check OpenShift GitOps Argo CD configuration for common problems",
    long_about = "Inspects the OpenShift GitOps operator installation and every ArgoCD CR, reporting deprecated, unsupported or inconsistent settings.\n\nWithout MUST_GATHER_PATH the current kubeconfig (or in-cluster config) is used. With it, a must-gather is read through the 'omc' tool.\n\nConfiguration precedence: CLI > environment > defaults.",
    after_help = "Examples:\n  argocd-config-check\n  argocd-config-check ./must-gather.local.123456 --output json\n  argocd-config-check --namespace openshift-gitops --check"
)]
/// Top-level CLI options.
pub struct Cli {
    /// Must-gather directory to read through omc (default: live cluster)
    #[arg(value_name = "MUST_GATHER_PATH")]
    pub must_gather: Option<PathBuf>,
    #[arg(long, value_enum, help = "Output mode: human|json (default: human)")]
    pub output: Option<OutputMode>,
    #[arg(long, help = "Only inspect ArgoCD CRs in this namespace")]
    pub namespace: Option<String>,
    #[arg(long, value_name = "PATH", help = "omc executable (default: omc on PATH)")]
    pub omc: Option<String>,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Exit non-zero if any Error or Fatal is reported")]
    pub check: bool,
    #[arg(short, long, action = clap::ArgAction::SetTrue, help = "Enable debug logging (RUST_LOG takes precedence)")]
    pub verbose: bool,
}
