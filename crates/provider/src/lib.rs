//! Konf provider surface (in-process).
//!
//! This crate defines the stable traits and types a hosting configuration
//! loader depends on: the [`ResourceStore`] capability over the cluster, the
//! [`Resolver`] engine that turns a `[namespace/]name` path plus an optional
//! key-set into resolved values, and the [`ConfigProvider`] contract the host
//! invokes.

#![forbid(unsafe_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::info;

pub use konf_core::{
    decode_entries, select_keys, Error, RawResource, ResolvedConfig, ResourceKind, ResourceRef,
};

/// Read-only access to namespaced key/value resources. One fetch per call,
/// no caching; "does not exist" and "could not be read" are distinct
/// outcomes ([`Error::NotFound`] vs [`Error::Access`]).
#[async_trait::async_trait]
pub trait ResourceStore: Send + Sync {
    async fn fetch(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
    ) -> Result<RawResource, Error>;

    /// Ambient namespace used when a reference omits one.
    fn default_namespace(&self) -> String;
}

// ----------------- Kube-backed store -----------------

/// [`ResourceStore`] over a live cluster via `konf-kube`. The wrapped client
/// is cheap to clone and safe to share across concurrent resolutions.
pub struct KubeStore {
    client: kube::Client,
}

impl KubeStore {
    pub async fn connect() -> anyhow::Result<Self> {
        let client = konf_kube::connect().await?;
        Ok(Self { client })
    }

    pub fn new(client: kube::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl ResourceStore for KubeStore {
    async fn fetch(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
    ) -> Result<RawResource, Error> {
        konf_kube::fetch(&self.client, kind, namespace, name).await
    }

    fn default_namespace(&self) -> String {
        konf_kube::default_namespace(&self.client)
    }
}

// ----------------- In-memory store -----------------

/// Simple in-memory store for tests and demos.
#[derive(Default)]
pub struct MemStore {
    namespace: String,
    resources: BTreeMap<(ResourceKind, String, String), BTreeMap<String, String>>,
}

impl MemStore {
    pub fn new(default_namespace: &str) -> Self {
        Self {
            namespace: default_namespace.to_string(),
            resources: BTreeMap::new(),
        }
    }

    pub fn insert(
        &mut self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
        entries: &[(&str, &str)],
    ) {
        let map = entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.resources
            .insert((kind, namespace.to_string(), name.to_string()), map);
    }
}

#[async_trait::async_trait]
impl ResourceStore for MemStore {
    async fn fetch(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
    ) -> Result<RawResource, Error> {
        let key = (kind, namespace.to_string(), name.to_string());
        match self.resources.get(&key) {
            Some(entries) => Ok(RawResource {
                kind,
                namespace: namespace.to_string(),
                name: name.to_string(),
                entries: entries.clone(),
            }),
            None => Err(Error::NotFound {
                kind,
                namespace: namespace.to_string(),
                name: name.to_string(),
            }),
        }
    }

    fn default_namespace(&self) -> String {
        self.namespace.clone()
    }
}

// ----------------- Resolver engine -----------------

/// Per-instance options. `separator` joins the values of a multi-match glob
/// spec; the default is the platform line separator.
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    pub separator: String,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        let separator = if cfg!(windows) { "\r\n" } else { "\n" };
        Self {
            separator: separator.to_string(),
        }
    }
}

/// Resolves `[namespace/]name` references against one resource kind.
///
/// Holds only immutable state, so instances are independent: two resolvers
/// with different separators reading the same resource never interfere.
pub struct Resolver {
    store: Arc<dyn ResourceStore>,
    kind: ResourceKind,
    separator: String,
}

impl Resolver {
    pub fn new(store: Arc<dyn ResourceStore>, kind: ResourceKind, options: ResolverOptions) -> Self {
        Self {
            store,
            kind,
            separator: options.separator,
        }
    }

    /// Connect to the cluster and build a kube-backed resolver. Must succeed
    /// before any `get`; plays the role of the host's `configure` step.
    pub async fn configure(kind: ResourceKind, options: ResolverOptions) -> anyhow::Result<Self> {
        info!(kind = %kind, "configuring config provider");
        let store = KubeStore::connect().await?;
        Ok(Self::new(Arc::new(store), kind, options))
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Resolve a path to its key/value configuration, optionally restricted
    /// to a set of literal or glob key specs. Any failure aborts the whole
    /// call; a missing resource is an error, never an empty mapping.
    pub async fn resolve(
        &self,
        path: &str,
        requested: Option<&BTreeSet<String>>,
    ) -> Result<ResolvedConfig, Error> {
        let default_ns = self.store.default_namespace();
        let default_ns = (!default_ns.is_empty()).then_some(default_ns.as_str());
        let reference = ResourceRef::parse(path, default_ns)?;

        info!(
            kind = %self.kind,
            ns = %reference.namespace,
            name = %reference.name,
            "retrieving configuration"
        );
        let raw = self
            .store
            .fetch(self.kind, &reference.namespace, &reference.name)
            .await?;
        let decoded = decode_entries(&raw)?;
        Ok(select_keys(&decoded, requested, &self.separator))
    }
}

// ----------------- Host contract -----------------

/// The named contract a hosting configuration loader discovers and invokes.
/// Construction ([`Resolver::configure`]) precedes any `get`; `close` is
/// safe to call more than once.
#[async_trait::async_trait]
pub trait ConfigProvider: Send + Sync {
    /// All keys of the referenced resource, decoded and unmodified.
    async fn get(&self, path: &str) -> Result<ResolvedConfig, Error>;

    /// Only the requested keys; specs may be literals or glob patterns.
    async fn get_keys(
        &self,
        path: &str,
        keys: &BTreeSet<String>,
    ) -> Result<ResolvedConfig, Error>;

    async fn close(&self);
}

#[async_trait::async_trait]
impl ConfigProvider for Resolver {
    async fn get(&self, path: &str) -> Result<ResolvedConfig, Error> {
        self.resolve(path, None).await
    }

    async fn get_keys(
        &self,
        path: &str,
        keys: &BTreeSet<String>,
    ) -> Result<ResolvedConfig, Error> {
        self.resolve(path, Some(keys)).await
    }

    async fn close(&self) {
        // The store handle is dropped with the resolver; nothing to tear
        // down eagerly. Kept idempotent on purpose.
        info!(kind = %self.kind, "closing config provider");
    }
}
