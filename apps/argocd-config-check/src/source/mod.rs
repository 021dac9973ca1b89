//! Data sources: where cluster objects come from.
//!
//! A source returns raw JSON documents for a `ResourceKind`; the typed
//! helpers (`list_all`, `list_in`, `get`) decode them into the models so
//! both backends share one shape.
//!
//! - `live`: Kubernetes API via the system kubeconfig.
//! - `omc`: must-gather snapshot read through the `omc` tool.

pub mod live;
pub mod omc;

use crate::error::SourceError;
use crate::models::argocd::ArgoCD;
use crate::models::olm::{ClusterServiceVersion, Subscription};
use k8s_openapi::api::core::v1::Namespace;
use serde::de::DeserializeOwned;
use serde_json::Value as Json;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Resource types the checker reads.
pub enum ResourceKind {
    ArgoCD,
    Subscription,
    ClusterServiceVersion,
    Namespace,
}

impl ResourceKind {
    pub fn group(&self) -> &'static str {
        match self {
            ResourceKind::ArgoCD => "argoproj.io",
            ResourceKind::Subscription | ResourceKind::ClusterServiceVersion => {
                "operators.coreos.com"
            }
            ResourceKind::Namespace => "",
        }
    }

    pub fn version(&self) -> &'static str {
        match self {
            ResourceKind::ArgoCD => "v1beta1",
            ResourceKind::Subscription | ResourceKind::ClusterServiceVersion => "v1alpha1",
            ResourceKind::Namespace => "v1",
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ResourceKind::ArgoCD => "ArgoCD",
            ResourceKind::Subscription => "Subscription",
            ResourceKind::ClusterServiceVersion => "ClusterServiceVersion",
            ResourceKind::Namespace => "Namespace",
        }
    }

    /// Lower-case plural name, as used by the API and by `omc get`.
    pub fn plural(&self) -> &'static str {
        match self {
            ResourceKind::ArgoCD => "argocds",
            ResourceKind::Subscription => "subscriptions",
            ResourceKind::ClusterServiceVersion => "clusterserviceversions",
            ResourceKind::Namespace => "namespaces",
        }
    }

    pub fn is_namespaced(&self) -> bool {
        !matches!(self, ResourceKind::Namespace)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

/// Read access to cluster objects.
///
/// `is_data_incomplete` is fixed for the lifetime of a source: snapshot
/// sources only carry a subset of cluster state, so missing data there is
/// expected rather than alarming.
pub trait DataSource {
    /// List every object of `kind` across all namespaces.
    fn list_all(&self, kind: ResourceKind) -> Result<Vec<Json>, SourceError>;

    /// List objects of `kind` within one namespace.
    fn list_in(&self, kind: ResourceKind, namespace: &str) -> Result<Vec<Json>, SourceError>;

    /// Fetch one named object.
    fn get(&self, kind: ResourceKind, namespace: &str, name: &str) -> Result<Json, SourceError>;

    fn is_data_incomplete(&self) -> bool;
}

/// A typed model bound to the resource kind it is decoded from.
pub trait Resource: DeserializeOwned {
    const KIND: ResourceKind;
}

impl Resource for ArgoCD {
    const KIND: ResourceKind = ResourceKind::ArgoCD;
}

impl Resource for Subscription {
    const KIND: ResourceKind = ResourceKind::Subscription;
}

impl Resource for ClusterServiceVersion {
    const KIND: ResourceKind = ResourceKind::ClusterServiceVersion;
}

impl Resource for Namespace {
    const KIND: ResourceKind = ResourceKind::Namespace;
}

fn decode<T: Resource>(doc: Json) -> Result<T, SourceError> {
    serde_json::from_value(doc).map_err(|source| SourceError::Decode {
        kind: T::KIND.kind(),
        source,
    })
}

pub fn list_all<T: Resource>(source: &dyn DataSource) -> Result<Vec<T>, SourceError> {
    source
        .list_all(T::KIND)?
        .into_iter()
        .map(decode::<T>)
        .collect()
}

pub fn list_in<T: Resource>(source: &dyn DataSource, namespace: &str) -> Result<Vec<T>, SourceError> {
    source
        .list_in(T::KIND, namespace)?
        .into_iter()
        .map(decode::<T>)
        .collect()
}

pub fn get<T: Resource>(source: &dyn DataSource, namespace: &str, name: &str) -> Result<T, SourceError> {
    decode(source.get(T::KIND, namespace, name)?)
}

/// Split a decoded `List` document into its items; a single object is
/// returned as a one-element list.
pub(crate) fn list_items(doc: Json) -> Vec<Json> {
    match doc {
        Json::Null => Vec::new(),
        Json::Object(mut obj) => match obj.remove("items") {
            Some(Json::Array(items)) => items,
            Some(Json::Null) => Vec::new(),
            Some(other) => {
                obj.insert("items".to_string(), other);
                vec![Json::Object(obj)]
            }
            None => vec![Json::Object(obj)],
        },
        Json::Array(items) => items,
        other => vec![other],
    }
}
