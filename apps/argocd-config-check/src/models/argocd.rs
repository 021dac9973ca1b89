//! `ArgoCD` custom resource (argoproj.io/v1beta1), reduced to the fields the
//! rules read. Everything defaults so partial documents still decode.

use k8s_openapi::api::core::v1::{EnvVar, ResourceRequirements};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::Deserialize;
use serde_json::Value as Json;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ArgoCD {
    pub metadata: ObjectMeta,
    pub spec: ArgoCDSpec,
    pub status: ArgoCDStatus,
}

impl ArgoCD {
    pub fn name(&self) -> &str {
        self.metadata.name.as_deref().unwrap_or_default()
    }

    pub fn namespace(&self) -> &str {
        self.metadata.namespace.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArgoCDSpec {
    pub application_set: Option<ApplicationSetSpec>,
    #[serde(rename = "argoCDAgent")]
    pub argocd_agent: Option<AgentSpec>,
    pub cmd_params: BTreeMap<String, String>,
    pub config_management_plugins: Option<Json>,
    pub controller: ControllerSpec,
    pub extra_config: BTreeMap<String, String>,
    pub grafana: GrafanaSpec,
    pub ha: HaSpec,
    pub image: String,
    pub initial_repositories: Option<Json>,
    pub notifications: NotificationsSpec,
    pub redis: RedisSpec,
    pub repo: RepoSpec,
    pub repository_credentials: Option<Json>,
    pub server: ServerSpec,
    pub sso: Option<SsoSpec>,
}

/// True when a loosely-typed legacy field carries any value.
pub fn is_set(value: Option<&Json>) -> bool {
    match value {
        None | Some(Json::Null) | Some(Json::Bool(false)) => false,
        Some(Json::String(s)) => !s.trim().is_empty(),
        Some(Json::Array(a)) => !a.is_empty(),
        Some(Json::Object(o)) => !o.is_empty(),
        Some(Json::Number(_)) | Some(Json::Bool(true)) => true,
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApplicationSetSpec {
    pub enabled: Option<bool>,
    pub image: String,
    pub source_namespaces: Vec<String>,
    pub extra_command_args: Vec<String>,
    pub env: Vec<EnvVar>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AgentSpec {
    pub agent: Option<AgentComponentSpec>,
    pub principal: Option<PrincipalSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AgentComponentSpec {
    pub image: String,
    pub tls: Option<AgentTlsSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AgentTlsSpec {
    pub insecure: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PrincipalSpec {
    pub image: String,
    pub tls: Option<PrincipalTlsSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PrincipalTlsSpec {
    pub insecure_generate: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ControllerSpec {
    pub enabled: Option<bool>,
    pub env: Vec<EnvVar>,
    pub extra_command_args: Vec<String>,
    pub processors: ProcessorsSpec,
    pub resources: Option<ResourceRequirements>,
    pub sharding: ShardingSpec,
}

impl ControllerSpec {
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    /// Memory limit as written in `.resources.limits.memory`, if any.
    pub fn memory_limit(&self) -> Option<&str> {
        self.resources
            .as_ref()?
            .limits
            .as_ref()?
            .get("memory")
            .map(|q| q.0.as_str())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProcessorsSpec {
    pub operation: i64,
    pub status: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShardingSpec {
    pub enabled: bool,
    pub dynamic_scaling_enabled: Option<bool>,
    pub clusters_per_shard: i64,
    pub replicas: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GrafanaSpec {
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HaSpec {
    pub enabled: bool,
    pub redis_proxy_image: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NotificationsSpec {
    pub enabled: bool,
    pub image: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RedisSpec {
    pub image: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RepoSpec {
    pub enabled: Option<bool>,
    pub image: String,
    pub env: Vec<EnvVar>,
    pub extra_repo_command_args: Vec<String>,
}

impl RepoSpec {
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerSpec {
    pub enabled: Option<bool>,
    pub env: Vec<EnvVar>,
    pub extra_command_args: Vec<String>,
    pub insecure: bool,
}

impl ServerSpec {
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SsoSpec {
    pub dex: Option<DexSpec>,
    pub keycloak: Option<Json>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DexSpec {
    pub image: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ArgoCDStatus {
    pub phase: String,
    pub conditions: Vec<StatusCondition>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StatusCondition {
    #[serde(rename = "type")]
    pub type_: String,
    pub status: String,
    pub reason: String,
    pub message: String,
}
