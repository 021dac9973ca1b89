//! Must-gather source backed by the `omc` CLI
//! (<https://github.com/gmeghnag/omc>).
//!
//! `omc use <dir>` selects the must-gather once; every lookup then shells out
//! to `omc get ... -o yaml` and parses the YAML it prints. A must-gather only
//! holds the namespaces that were exported, so this source reports its data
//! as incomplete.

use super::{list_items, DataSource, ResourceKind};
use crate::error::SourceError;
use serde_json::Value as Json;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

pub struct OmcSource {
    binary: String,
    must_gather: PathBuf,
}

struct CommandOutput {
    text: String,
    success: bool,
    status: String,
}

impl OmcSource {
    /// Point `omc` at the must-gather directory.
    pub fn open(binary: &str, must_gather: &Path) -> Result<Self, SourceError> {
        let src = OmcSource {
            binary: binary.to_string(),
            must_gather: must_gather.to_path_buf(),
        };
        let path = src.must_gather.to_string_lossy().to_string();
        let out = src.run(&["use", &path])?;
        if !out.success {
            return Err(src.command_error(&["use", &path], out));
        }
        Ok(src)
    }

    pub fn must_gather(&self) -> &Path {
        &self.must_gather
    }

    fn display(&self, args: &[&str]) -> String {
        format!("{} {}", self.binary, args.join(" "))
    }

    fn run(&self, args: &[&str]) -> Result<CommandOutput, SourceError> {
        debug!(command = %self.display(args), "running omc");
        let output = Command::new(&self.binary)
            .args(args)
            .output()
            .map_err(|source| SourceError::Spawn {
                command: self.display(args),
                source,
            })?;
        // stdout followed by stderr, like a combined stream
        let mut text = String::from_utf8_lossy(&output.stdout).to_string();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(CommandOutput {
            text,
            success: output.status.success(),
            status: output.status.to_string(),
        })
    }

    fn command_error(&self, args: &[&str], out: CommandOutput) -> SourceError {
        SourceError::Command {
            command: self.display(args),
            status: out.status,
            output: out.text,
        }
    }

    fn get_yaml(&self, args: &[&str]) -> Result<Json, SourceError> {
        let out = self.run(args)?;
        // omc exits 0 and prints plain text when nothing matches
        if is_no_resources(&out.text) {
            debug!(command = %self.display(args), "omc found no resources");
            return Ok(Json::Null);
        }
        if !out.success {
            return Err(self.command_error(args, out));
        }
        serde_yaml::from_str::<Json>(&out.text).map_err(|source| SourceError::Yaml {
            command: self.display(args),
            source,
        })
    }
}

fn is_no_resources(output: &str) -> bool {
    output.starts_with("No resources ") && output.trim_end().ends_with("found.")
}

impl DataSource for OmcSource {
    fn list_all(&self, kind: ResourceKind) -> Result<Vec<Json>, SourceError> {
        let doc = self.get_yaml(&["get", kind.plural(), "-A", "-o", "yaml"])?;
        Ok(list_items(doc))
    }

    fn list_in(&self, kind: ResourceKind, namespace: &str) -> Result<Vec<Json>, SourceError> {
        let doc = self.get_yaml(&["get", kind.plural(), "-n", namespace, "-o", "yaml"])?;
        Ok(list_items(doc))
    }

    fn get(&self, kind: ResourceKind, namespace: &str, name: &str) -> Result<Json, SourceError> {
        let args = ["get", kind.plural(), name, "-n", namespace, "-o", "yaml"];
        match self.get_yaml(&args)? {
            Json::Null => Err(SourceError::Command {
                command: self.display(&args),
                status: "exit status: 0".to_string(),
                output: format!("{} '{}' not found in namespace '{}'", kind, name, namespace),
            }),
            doc => Ok(doc),
        }
    }

    fn is_data_incomplete(&self) -> bool {
        true
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::tempdir;

    /// Write an executable stand-in for `omc` that answers by argument.
    fn fake_omc(dir: &Path, body: &str) -> String {
        let path = dir.join("omc");
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
        path.to_string_lossy().to_string()
    }

    const SCRIPT: &str = r#"
case "$1 $2" in
  "use "*) exit 0 ;;
  "get argocds")
    cat <<'EOF'
apiVersion: v1
kind: List
items:
- apiVersion: argoproj.io/v1beta1
  kind: ArgoCD
  metadata:
    name: openshift-gitops
    namespace: openshift-gitops
  spec:
    repo:
      image: quay.io/example/repo
EOF
    ;;
  "get subscriptions")
    echo "No resources found."
    ;;
  *)
    echo "error: resource type \"$2\" not known" >&2
    exit 1
    ;;
esac
"#;

    #[test]
    fn lists_and_decodes_yaml_items() {
        let dir = tempdir().unwrap();
        let bin = fake_omc(dir.path(), SCRIPT);
        let src = OmcSource::open(&bin, dir.path()).unwrap();
        assert!(src.is_data_incomplete());
        let items = src.list_all(ResourceKind::ArgoCD).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["spec"]["repo"]["image"], "quay.io/example/repo");
    }

    #[test]
    fn no_resources_output_is_an_empty_list() {
        let dir = tempdir().unwrap();
        let bin = fake_omc(dir.path(), SCRIPT);
        let src = OmcSource::open(&bin, dir.path()).unwrap();
        assert!(src.list_all(ResourceKind::Subscription).unwrap().is_empty());
    }

    #[test]
    fn failing_command_carries_tool_output() {
        let dir = tempdir().unwrap();
        let bin = fake_omc(dir.path(), SCRIPT);
        let src = OmcSource::open(&bin, dir.path()).unwrap();
        let err = src.list_all(ResourceKind::Namespace).unwrap_err();
        assert!(err.is_unknown_type());
        assert!(err.to_string().contains("get namespaces -A -o yaml"));
    }

    #[test]
    fn open_fails_when_use_fails() {
        let dir = tempdir().unwrap();
        let bin = fake_omc(dir.path(), "echo 'not a must-gather'; exit 3");
        let err = OmcSource::open(&bin, dir.path()).err().unwrap();
        assert!(err.to_string().contains("not a must-gather"));
    }

    #[test]
    fn missing_binary_is_a_spawn_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("no-such-omc");
        let err = OmcSource::open(&missing.to_string_lossy(), dir.path())
            .err()
            .unwrap();
        assert!(matches!(err, SourceError::Spawn { .. }));
    }

    #[test]
    fn detects_no_resources_banner() {
        assert!(is_no_resources("No resources found.\n"));
        assert!(!is_no_resources("apiVersion: v1\n"));
    }
}
