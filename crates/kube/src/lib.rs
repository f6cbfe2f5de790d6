//! Konf kube integration: point-in-time fetch of ConfigMaps and Secrets.
//!
//! Values are taken from the object's raw JSON `data` field, so Secret
//! entries stay base64 text here; decode policy lives in `konf-core`.

#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use kube::{
    api::Api,
    core::{ApiResource, DynamicObject},
    Client,
};
use metrics::counter;
use tracing::{debug, info};

use konf_core::{Error, RawResource, ResourceKind};

/// Build a client from the ambient environment (in-cluster config or the
/// current kubeconfig context).
pub async fn connect() -> Result<Client> {
    Client::try_default()
        .await
        .context("building kubernetes client")
}

/// The namespace the client environment is configured with.
pub fn default_namespace(client: &Client) -> String {
    client.default_namespace().to_string()
}

fn api_resource(kind: ResourceKind) -> ApiResource {
    match kind {
        ResourceKind::ConfigMap => {
            ApiResource::erase::<k8s_openapi::api::core::v1::ConfigMap>(&())
        }
        ResourceKind::Secret => ApiResource::erase::<k8s_openapi::api::core::v1::Secret>(&()),
    }
}

fn entries_from(obj: &DynamicObject) -> BTreeMap<String, String> {
    let mut entries = BTreeMap::new();
    if let Some(data) = obj.data.get("data").and_then(|v| v.as_object()) {
        for (key, value) in data {
            if let Some(s) = value.as_str() {
                entries.insert(key.clone(), s.to_string());
            }
        }
    }
    entries
}

/// Fetch one resource by kind/namespace/name. A missing object surfaces as
/// [`Error::NotFound`], any other client failure as [`Error::Access`] with
/// the kube error preserved as the cause. No retries.
pub async fn fetch(
    client: &Client,
    kind: ResourceKind,
    namespace: &str,
    name: &str,
) -> Result<RawResource, Error> {
    info!(kind = %kind, ns = %namespace, name = %name, "fetching resource");
    let api: Api<DynamicObject> =
        Api::namespaced_with(client.clone(), namespace, &api_resource(kind));

    match api.get(name).await {
        Ok(obj) => {
            let entries = entries_from(&obj);
            debug!(kind = %kind, name = %name, keys = entries.len(), "resource fetched");
            counter!("konf_fetch_total", 1, "kind" => kind.as_str(), "outcome" => "ok");
            Ok(RawResource {
                kind,
                namespace: namespace.to_string(),
                name: name.to_string(),
                entries,
            })
        }
        Err(kube::Error::Api(ae)) if ae.code == 404 => {
            counter!("konf_fetch_total", 1, "kind" => kind.as_str(), "outcome" => "not_found");
            Err(Error::NotFound {
                kind,
                namespace: namespace.to_string(),
                name: name.to_string(),
            })
        }
        Err(e) => {
            counter!("konf_fetch_total", 1, "kind" => kind.as_str(), "outcome" => "error");
            Err(Error::Access {
                kind,
                namespace: namespace.to_string(),
                name: name.to_string(),
                source: Box::new(e),
            })
        }
    }
}
