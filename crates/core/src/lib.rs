//! Konf core types and errors

#![forbid(unsafe_code)]

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

mod decode;
mod reference;
mod select;

pub use decode::decode_entries;
pub use reference::ResourceRef;
pub use select::select_keys;

/// The two resource kinds the resolver knows how to read. They share the
/// (namespace, name) addressing scheme and differ only in value encoding.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceKind {
    ConfigMap,
    Secret,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::ConfigMap => "ConfigMap",
            ResourceKind::Secret => "Secret",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time snapshot of a fetched resource. `entries` holds the values
/// exactly as stored on the wire: plaintext for a ConfigMap, base64 text for
/// a Secret. Decoding happens later, in [`decode_entries`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawResource {
    pub kind: ResourceKind,
    pub namespace: String,
    pub name: String,
    pub entries: BTreeMap<String, String>,
}

/// Output of a resolution: requested key spec -> resolved value.
pub type ResolvedConfig = BTreeMap<String, String>;

/// Resolution errors. Every variant aborts the whole call; nothing here is
/// retried or downgraded to an empty result.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid resource path {path:?}: expected <namespace>/<name> (or <name> to use the default namespace)")]
    InvalidReference { path: String },

    #[error("{kind} {name} in namespace {namespace} not found")]
    NotFound {
        kind: ResourceKind,
        namespace: String,
        name: String,
    },

    #[error("failed to retrieve {kind} {name} from namespace {namespace}")]
    Access {
        kind: ResourceKind,
        namespace: String,
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("failed to decode value for key {key:?}")]
    Decode {
        key: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
