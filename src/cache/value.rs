//! Cached Value Module
//!
//! Encoded payloads held by the shared store.

use std::collections::BTreeMap;
use std::sync::Arc;

// == Cached Value ==
/// An encoded producer result.
///
/// Values are cheap to clone: binary payloads sit behind `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedValue {
    /// Structured value (quotes, social copy)
    Json(serde_json::Value),
    /// A single encoded binary (a background image)
    Bytes(Arc<[u8]>),
    /// Named encoded parts (the files of a rendered artwork)
    Bundle(Arc<BTreeMap<String, Vec<u8>>>),
}

impl CachedValue {
    pub fn bytes(data: impl Into<Arc<[u8]>>) -> Self {
        Self::Bytes(data.into())
    }

    pub fn bundle(parts: BTreeMap<String, Vec<u8>>) -> Self {
        Self::Bundle(Arc::new(parts))
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Arc<[u8]>> {
        match self {
            Self::Bytes(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_bundle(&self) -> Option<&BTreeMap<String, Vec<u8>>> {
        match self {
            Self::Bundle(parts) => Some(parts),
            _ => None,
        }
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Json(_) => "json",
            Self::Bytes(_) => "bytes",
            Self::Bundle(_) => "bundle",
        }
    }

    /// Approximate payload size in bytes.
    pub fn size_bytes(&self) -> usize {
        match self {
            Self::Json(value) => value.to_string().len(),
            Self::Bytes(data) => data.len(),
            Self::Bundle(parts) => parts.iter().map(|(name, data)| name.len() + data.len()).sum(),
        }
    }
}
