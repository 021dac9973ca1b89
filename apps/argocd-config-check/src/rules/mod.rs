//! Rule engine for `ArgoCD` custom resources.
//!
//! Every rule is a pure function of the resource and the resolved
//! installation state. `RULES` fixes the order they run in; all of them run,
//! and the combined output is stable-sorted by field path.

pub mod best_practice;
pub mod consistency;
pub mod deprecated;
pub mod images;
pub mod matchers;
pub mod shadowed;
pub mod status;
pub mod tech_preview;

use crate::models::argocd::{ArgoCD, ArgoCDSpec};
use crate::models::{sort_issues_by_field, InstallationState, Issue};
use k8s_openapi::api::core::v1::EnvVar;

pub type RuleFn = fn(&ArgoCD, &InstallationState) -> Vec<Issue>;

/// A named rule; the name only shows up in logs and tests.
pub struct Rule {
    pub name: &'static str,
    pub check: RuleFn,
}

/// Rules in execution order.
pub const RULES: &[Rule] = &[
    Rule {
        name: "deprecated-fields",
        check: deprecated::check,
    },
    Rule {
        name: "custom-images",
        check: images::check,
    },
    Rule {
        name: "tech-preview",
        check: tech_preview::check,
    },
    Rule {
        name: "shadowed-settings",
        check: shadowed::check,
    },
    Rule {
        name: "consistency",
        check: consistency::check,
    },
    Rule {
        name: "status",
        check: status::check,
    },
    Rule {
        name: "best-practices",
        check: best_practice::check,
    },
];

/// Run every rule against `argocd` and return the issues sorted by field.
pub fn evaluate(argocd: &ArgoCD, state: &InstallationState) -> Vec<Issue> {
    let mut issues: Vec<Issue> = RULES
        .iter()
        .flat_map(|rule| {
            let found = (rule.check)(argocd, state);
            tracing::trace!(rule = rule.name, count = found.len(), "rule evaluated");
            found
        })
        .collect();
    sort_issues_by_field(&mut issues);
    issues
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Argo CD workloads whose env vars and arguments the rules inspect.
pub enum Component {
    ApplicationSet,
    Controller,
    Repo,
    Server,
}

/// Env vars and extra arguments of an enabled component.
pub struct Settings<'a> {
    pub env: &'a [EnvVar],
    pub args: &'a [String],
}

impl Component {
    pub fn path(&self) -> &'static str {
        match self {
            Component::ApplicationSet => ".spec.applicationSet",
            Component::Controller => ".spec.controller",
            Component::Repo => ".spec.repo",
            Component::Server => ".spec.server",
        }
    }

    fn args_field(&self) -> &'static str {
        match self {
            Component::Repo => "extraRepoCommandArgs",
            _ => "extraCommandArgs",
        }
    }

    /// Settings of the component, or `None` when it is disabled.
    ///
    /// The ApplicationSet controller is opt-in; the others run unless
    /// explicitly disabled.
    pub fn settings<'a>(&self, spec: &'a ArgoCDSpec) -> Option<Settings<'a>> {
        match self {
            Component::ApplicationSet => {
                let appset = spec.application_set.as_ref()?;
                (appset.enabled == Some(true)).then_some(Settings {
                    env: &appset.env,
                    args: &appset.extra_command_args,
                })
            }
            Component::Controller => spec.controller.is_enabled().then_some(Settings {
                env: &spec.controller.env,
                args: &spec.controller.extra_command_args,
            }),
            Component::Repo => spec.repo.is_enabled().then_some(Settings {
                env: &spec.repo.env,
                args: &spec.repo.extra_repo_command_args,
            }),
            Component::Server => spec.server.is_enabled().then_some(Settings {
                env: &spec.server.env,
                args: &spec.server.extra_command_args,
            }),
        }
    }

    pub fn env_field(&self, key: &str) -> String {
        format!("{}.env[{}]", self.path(), key)
    }

    pub fn env_kv_field(&self, key: &str, value: &str) -> String {
        format!("{}.env[{}]={}", self.path(), key, value)
    }

    pub fn arg_field(&self, key: &str) -> String {
        format!("{}.{}[--{}]", self.path(), self.args_field(), key)
    }

    pub fn arg_kv_field(&self, key: &str, value: &str) -> String {
        format!("{}.{}[--{}={}]", self.path(), self.args_field(), key, value)
    }
}

#[cfg(test)]
pub(crate) fn argocd(doc: serde_json::Value) -> ArgoCD {
    serde_json::from_value(doc).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;
    use proptest::prelude::*;
    use serde_json::json;

    fn fields(issues: &[Issue]) -> Vec<&str> {
        issues.iter().map(|i| i.field.as_str()).collect()
    }

    fn clean() -> ArgoCD {
        argocd(json!({
            "metadata": {"name": "openshift-gitops", "namespace": "openshift-gitops"},
            "spec": {
                "applicationSet": {"enabled": true},
                "controller": {"processors": {"operation": 10}, "resources": {"limits": {"memory": "2Gi"}}},
                "server": {"route": {"enabled": true}}
            },
            "status": {
                "phase": "Available",
                "conditions": [{"type": "Reconciled", "status": "True"}]
            }
        }))
    }

    #[test]
    fn clean_instance_has_no_issues() {
        assert!(evaluate(&clean(), &InstallationState::default()).is_empty());
    }

    #[test]
    fn rules_run_in_documented_order() {
        let names: Vec<&str> = RULES.iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec![
                "deprecated-fields",
                "custom-images",
                "tech-preview",
                "shadowed-settings",
                "consistency",
                "status",
                "best-practices"
            ]
        );
    }

    #[test]
    fn clusters_per_shard_without_dynamic_scaling() {
        let cr = argocd(json!({
            "spec": {"controller": {"sharding": {
                "enabled": true, "dynamicScalingEnabled": false, "clustersPerShard": 5
            }}},
            "status": {"phase": "Available"}
        }));
        let issues = evaluate(&cr, &InstallationState::default());
        let hits: Vec<&Issue> = issues
            .iter()
            .filter(|i| i.field == ".spec.controller.sharding.clustersPerShard")
            .collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].severity, Severity::Error);
    }

    #[test]
    fn operation_processor_memory_heuristic() {
        let cr = argocd(json!({
            "spec": {"controller": {
                "processors": {"operation": 20},
                "resources": {"limits": {"memory": "512Mi"}}
            }},
            "status": {"phase": "Available"}
        }));
        let issues = evaluate(&cr, &InstallationState::default());
        let hits: Vec<&Issue> = issues
            .iter()
            .filter(|i| i.field == ".spec.controller.processors.operation")
            .collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].severity, Severity::Warn);
        assert!(hits[0].message.contains("700"));
        assert!(hits[0].message.contains("512"));
    }

    #[test]
    fn issues_from_many_rules_are_sorted_by_field() {
        let cr = argocd(json!({
            "spec": {
                "repo": {"image": "quay.io/me/repo"},
                "image": "quay.io/me/argocd",
                "grafana": {"enabled": true},
                "server": {"insecure": true},
                "cmdParams": {"bogus.key": "1"}
            },
            "status": {"phase": "Pending"}
        }));
        let issues = evaluate(&cr, &InstallationState::default());
        assert_eq!(
            fields(&issues),
            vec![
                ".spec.cmdParams[bogus.key]",
                ".spec.grafana",
                ".spec.image",
                ".spec.repo.image",
                ".spec.server.insecure",
                ".status.phase"
            ]
        );
    }

    #[test]
    fn component_settings_follow_enablement() {
        let cr = argocd(json!({"spec": {
            "applicationSet": {"env": [{"name": "A", "value": "1"}]},
            "controller": {"enabled": false}
        }}));
        assert!(Component::ApplicationSet.settings(&cr.spec).is_none());
        assert!(Component::Controller.settings(&cr.spec).is_none());
        assert!(Component::Server.settings(&cr.spec).is_some());
        assert_eq!(Component::Repo.arg_field("x"), ".spec.repo.extraRepoCommandArgs[--x]");
        assert_eq!(
            Component::Controller.env_kv_field("K", "v"),
            ".spec.controller.env[K]=v"
        );
    }

    fn arb_argocd() -> impl Strategy<Value = ArgoCD> {
        (
            prop::option::of("[a-z./:]{1,16}"),
            prop::option::of("[a-z./:]{1,16}"),
            any::<bool>(),
            any::<bool>(),
            0i64..40,
            prop::sample::select(vec!["128Mi", "512Mi", "1Gi"]),
            prop::sample::select(vec!["Available", "Pending", ""]),
            prop::collection::btree_map("[a-z.]{1,12}", "[a-z]{0,4}", 0..4),
        )
            .prop_map(|(image, repo_image, insecure, grafana, ops, mem, phase, extra)| {
                argocd(json!({
                    "spec": {
                        "image": image.unwrap_or_default(),
                        "repo": {"image": repo_image.unwrap_or_default()},
                        "server": {"insecure": insecure},
                        "grafana": {"enabled": grafana},
                        "controller": {
                            "processors": {"operation": ops},
                            "resources": {"limits": {"memory": mem}}
                        },
                        "extraConfig": extra,
                        "cmdParams": {"other.key": "x"}
                    },
                    "status": {"phase": phase}
                }))
            })
    }

    proptest! {
        #[test]
        fn evaluate_output_is_sorted_and_repeatable(cr in arb_argocd()) {
            let state = InstallationState::default();
            let first = evaluate(&cr, &state);
            let second = evaluate(&cr, &state);
            prop_assert_eq!(&first, &second);
            for pair in first.windows(2) {
                prop_assert!(pair[0].field <= pair[1].field);
            }
            prop_assert!(first.iter().all(|i| !i.field.is_empty()));
        }
    }
}
