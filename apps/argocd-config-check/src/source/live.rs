//! Live cluster source using the system Kubernetes configuration
//! (`~/.kube/config`, `KUBECONFIG`, or the in-cluster service account).
//!
//! `kube` is async; the source owns a current-thread Tokio runtime and
//! blocks on each call so the rest of the checker stays synchronous.

use super::{DataSource, ResourceKind};
use crate::error::SourceError;
use kube::api::{Api, ListParams};
use kube::core::{ApiResource, DynamicObject, GroupVersionKind};
use kube::Client;
use serde_json::Value as Json;
use tokio::runtime::Runtime;
use tracing::debug;

pub struct LiveSource {
    client: Client,
    runtime: Runtime,
}

impl LiveSource {
    /// Build a client from the default kubeconfig / in-cluster config.
    pub fn from_system_config() -> Result<Self, SourceError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(SourceError::Runtime)?;
        let client = runtime.block_on(Client::try_default())?;
        debug!(namespace = %client.default_namespace(), "connected to cluster");
        Ok(LiveSource { client, runtime })
    }

    fn api(&self, kind: ResourceKind, namespace: Option<&str>) -> Api<DynamicObject> {
        let gvk = GroupVersionKind::gvk(kind.group(), kind.version(), kind.kind());
        let resource = ApiResource::from_gvk_with_plural(&gvk, kind.plural());
        match namespace {
            Some(ns) if kind.is_namespaced() => {
                Api::namespaced_with(self.client.clone(), ns, &resource)
            }
            _ => Api::all_with(self.client.clone(), &resource),
        }
    }

    fn list(&self, kind: ResourceKind, namespace: Option<&str>) -> Result<Vec<Json>, SourceError> {
        debug!(%kind, namespace = namespace.unwrap_or("*"), "listing");
        let api = self.api(kind, namespace);
        let list = self.runtime.block_on(api.list(&ListParams::default()))?;
        list.items.iter().map(|obj| to_json(kind, obj)).collect()
    }
}

fn to_json(kind: ResourceKind, obj: &DynamicObject) -> Result<Json, SourceError> {
    serde_json::to_value(obj).map_err(|source| SourceError::Decode {
        kind: kind.kind(),
        source,
    })
}

impl DataSource for LiveSource {
    fn list_all(&self, kind: ResourceKind) -> Result<Vec<Json>, SourceError> {
        self.list(kind, None)
    }

    fn list_in(&self, kind: ResourceKind, namespace: &str) -> Result<Vec<Json>, SourceError> {
        self.list(kind, Some(namespace))
    }

    fn get(&self, kind: ResourceKind, namespace: &str, name: &str) -> Result<Json, SourceError> {
        debug!(%kind, namespace, name, "getting");
        let api = self.api(kind, Some(namespace));
        let obj = self.runtime.block_on(api.get(name))?;
        to_json(kind, &obj)
    }

    fn is_data_incomplete(&self) -> bool {
        false
    }
}
