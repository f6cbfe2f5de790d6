//! Per-kind value decoding.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::{Error, RawResource, ResourceKind};

/// Turn stored values into usable plaintext. ConfigMap values pass through
/// unchanged; Secret values are standard (padded, non-URL-safe) base64 and
/// must decode to UTF-8 text. A single bad value fails the whole mapping.
pub fn decode_entries(raw: &RawResource) -> crate::Result<BTreeMap<String, String>> {
    match raw.kind {
        ResourceKind::ConfigMap => Ok(raw.entries.clone()),
        ResourceKind::Secret => {
            let mut out = BTreeMap::new();
            for (key, stored) in &raw.entries {
                let bytes = STANDARD.decode(stored).map_err(|e| Error::Decode {
                    key: key.clone(),
                    source: Box::new(e),
                })?;
                let text = String::from_utf8(bytes).map_err(|e| Error::Decode {
                    key: key.clone(),
                    source: Box::new(e),
                })?;
                out.insert(key.clone(), text);
            }
            Ok(out)
        }
    }
}
