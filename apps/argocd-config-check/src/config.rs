//! Effective settings resolution.
//!
//! Merges CLI flags with environment variables to produce an `Effective`
//! config. There is no config file.
//! Defaults:
//! - `output`: `human`
//! - `omc`: `omc` (looked up on `PATH`)
//! - `colors`: on, unless `NO_COLOR` is set or output is `json`
//!
//! Overrides precedence: CLI > environment > defaults.

use std::path::PathBuf;

pub const OUTPUT_ENV: &str = "ARGOCD_CONFIG_CHECK_OUTPUT";
pub const OMC_ENV: &str = "ARGOCD_CONFIG_CHECK_OMC";
pub const NO_COLOR_ENV: &str = "NO_COLOR";

pub const DEFAULT_OUTPUT: &str = "human";
pub const DEFAULT_OMC: &str = "omc";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Fully-resolved configuration used by `main` after applying precedence.
pub struct Effective {
    /// Must-gather directory; `None` selects the live cluster.
    pub must_gather: Option<PathBuf>,
    pub output: String,
    pub namespace: Option<String>,
    pub omc: String,
    pub check: bool,
    pub colors: bool,
}

impl Effective {
    pub fn is_json(&self) -> bool {
        self.output == "json"
    }
}

/// Resolve `Effective` from CLI flags and `env`.
///
/// `env` is `std::env::var` in the binary and a map lookup in tests.
pub fn resolve_effective(
    cli_must_gather: Option<PathBuf>,
    cli_output: Option<&str>,
    cli_namespace: Option<&str>,
    cli_omc: Option<&str>,
    cli_check: bool,
    env: impl Fn(&str) -> Option<String>,
) -> Effective {
    let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());

    let output = cli_output
        .map(|s| s.to_string())
        .or_else(|| non_empty(OUTPUT_ENV))
        .unwrap_or_else(|| DEFAULT_OUTPUT.to_string());

    let omc = cli_omc
        .map(|s| s.to_string())
        .or_else(|| non_empty(OMC_ENV))
        .unwrap_or_else(|| DEFAULT_OMC.to_string());

    // NO_COLOR disables colors whenever present, even if empty.
    let colors = output != "json" && env(NO_COLOR_ENV).is_none();

    Effective {
        must_gather: cli_must_gather,
        output,
        namespace: cli_namespace.map(|s| s.to_string()),
        omc,
        check: cli_check,
        colors,
    }
}
