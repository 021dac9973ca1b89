//! argocd-config-check core library.
//!
//! Inspects an OpenShift GitOps installation, either live or from a
//! must-gather, and reports configuration problems in its `ArgoCD` custom
//! resources.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Effective configuration from CLI flags and environment.
//! - `source`: Data sources (live cluster, must-gather via `omc`).
//! - `resolve`: Installation state resolution (Subscription, CSV, namespaces).
//! - `rules`: Rule engine over `ArgoCD` objects.
//! - `check`: Runner tying resolution and rules together.
//! - `models`: Severity, entries, issues, installation state and CR models.
//! - `output`: Human/JSON printers.
//! - `error`: Source and runner error types.
//! - `quantity`: Kubernetes memory quantity parsing.
//! - `utils`: Supporting helpers.
pub mod check;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod quantity;
pub mod resolve;
pub mod rules;
pub mod source;
pub mod utils;
