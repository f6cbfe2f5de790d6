//! Parsing of `[namespace/]name` resource paths.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::Error;

// Namespace and name are RFC1123-label-like: lowercase alphanumerics, '.'
// and '-'. The whole path is validated before any segment counting so that
// "NS/name" and "ns//name" fail the same way.
static PATH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new("^[a-z0-9.-]+(/[a-z0-9.-]+)?$").expect("static path regex"));

/// A parsed (namespace, name) pair addressing a cluster resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceRef {
    pub namespace: String,
    pub name: String,
}

impl ResourceRef {
    /// Parse a `namespace/name` path. A bare `name` resolves against
    /// `default_namespace` when one is supplied (lenient mode, matching the
    /// ambient-namespace fallback of the cluster client); without a default
    /// the single-segment form is rejected.
    pub fn parse(path: &str, default_namespace: Option<&str>) -> crate::Result<Self> {
        if !PATH_RE.is_match(path) {
            return Err(Error::InvalidReference {
                path: path.to_string(),
            });
        }

        let mut segments = path.split('/');
        let first = segments.next().unwrap_or_default();
        match (segments.next(), default_namespace) {
            (Some(name), _) => Ok(Self {
                namespace: first.to_string(),
                name: name.to_string(),
            }),
            (None, Some(default)) => Ok(Self {
                namespace: default.to_string(),
                name: first.to_string(),
            }),
            (None, None) => Err(Error::InvalidReference {
                path: path.to_string(),
            }),
        }
    }
}
