//! Custom container images. Only images built and shipped with the product
//! are supported for Argo CD components.

use crate::models::argocd::{ArgoCD, ArgoCDSpec};
use crate::models::{InstallationState, Issue};

const MESSAGE: &str = "The image field is used to provide custom container images for Argo CD components. However, specifying custom images for essential Argo CD components is not supported.";

/// Every image override in the CR, paired with its field path.
fn image_fields(spec: &ArgoCDSpec) -> [(&'static str, Option<&str>); 9] {
    let agent = spec.argocd_agent.as_ref();
    [
        (
            ".spec.applicationSet.image",
            spec.application_set.as_ref().map(|a| a.image.as_str()),
        ),
        (
            ".spec.argoCDAgent.agent.image",
            agent.and_then(|a| a.agent.as_ref()).map(|a| a.image.as_str()),
        ),
        (
            ".spec.argoCDAgent.principal.image",
            agent.and_then(|a| a.principal.as_ref()).map(|p| p.image.as_str()),
        ),
        (".spec.ha.redisProxyImage", Some(spec.ha.redis_proxy_image.as_str())),
        (".spec.image", Some(spec.image.as_str())),
        (".spec.notifications.image", Some(spec.notifications.image.as_str())),
        (".spec.redis.image", Some(spec.redis.image.as_str())),
        (".spec.repo.image", Some(spec.repo.image.as_str())),
        (
            ".spec.sso.dex.image",
            spec.sso.as_ref().and_then(|s| s.dex.as_ref()).map(|d| d.image.as_str()),
        ),
    ]
}

pub fn check(argocd: &ArgoCD, _state: &InstallationState) -> Vec<Issue> {
    image_fields(&argocd.spec)
        .into_iter()
        .filter(|(_, image)| image.is_some_and(|v| !v.is_empty()))
        .map(|(field, _)| Issue::error(field, MESSAGE).unsupported())
        .collect()
}
