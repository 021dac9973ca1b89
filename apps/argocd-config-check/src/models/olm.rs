//! OLM resources (operators.coreos.com/v1alpha1) used to locate the
//! operator installation.

use k8s_openapi::api::core::v1::EnvVar;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Subscription {
    pub metadata: ObjectMeta,
    /// Nullable in the OLM API.
    pub spec: Option<SubscriptionSpec>,
    pub status: SubscriptionStatus,
}

impl Subscription {
    pub fn namespace(&self) -> &str {
        self.metadata.namespace.as_deref().unwrap_or_default()
    }

    /// `namespace/name`, for messages.
    pub fn qualified_name(&self) -> String {
        format!(
            "{}/{}",
            self.namespace(),
            self.metadata.name.as_deref().unwrap_or_default()
        )
    }

    pub fn package(&self) -> Option<&str> {
        self.spec.as_ref().map(|s| s.package.as_str())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SubscriptionSpec {
    #[serde(rename = "name")]
    pub package: String,
    pub channel: String,
    pub config: Option<SubscriptionConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SubscriptionConfig {
    pub env: Vec<EnvVar>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SubscriptionStatus {
    #[serde(rename = "currentCSV")]
    pub current_csv: String,
    #[serde(rename = "installedCSV")]
    pub installed_csv: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClusterServiceVersion {
    pub metadata: ObjectMeta,
    pub spec: CsvSpec,
    pub status: CsvStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CsvSpec {
    pub version: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CsvStatus {
    pub phase: String,
    pub reason: String,
}
