//! Configuration fragments.
//!
//! A fragment is the contribution of one source: a raw key/value bag before
//! validation, and a typed, schema-checked bag after. Typed fragments are
//! sparse; a field the source never mentioned is simply absent, which is what
//! lets the aggregator tell "set to empty" apart from "not set".

use serde::Serialize;
use serde_json::Value;

use crate::schema;

mod merge;
mod normalize;
mod validate;

pub use merge::{merge, reduce};
pub use normalize::normalize_aliases;
pub use validate::{validate_mapping, validate_raw};

/// Unvalidated key/value bag, as parsed from a file or assembled from CLI
/// flags. Keys may still be aliases.
pub type RawFragment = serde_json::Map<String, Value>;

/// Schema-checked fragment. Every key is a canonical field name and every
/// value has passed type coercion.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TypedFragment {
    values: serde_json::Map<String, Value>,
}

impl TypedFragment {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fragment holding every schema default. Used as the bottom of the
    /// precedence chain and as the result of reducing zero fragments.
    pub fn defaults() -> Self {
        let mut out = Self::new();
        for desc in schema::descriptors() {
            if let Some(default) = &desc.default {
                out.values.insert(desc.name.to_owned(), default.clone());
            }
        }
        out
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Insert a canonical-name/coerced-value pair. Callers are expected to
    /// have run the value through [`schema::coerce`] first.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// The fragment as a plain JSON mapping, for serialization.
    pub fn as_map(&self) -> &serde_json::Map<String, Value> {
        &self.values
    }

    pub fn into_map(self) -> serde_json::Map<String, Value> {
        self.values
    }
}

impl FromIterator<(String, Value)> for TypedFragment {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_fragment_skips_absent_defaults() {
        let defaults = TypedFragment::defaults();
        assert_eq!(defaults.get("channels"), Some(&json!(["defaults"])));
        assert_eq!(defaults.get("always_yes"), Some(&json!(false)));
        // No schema default means no entry at all.
        assert!(!defaults.has("use_only_tar_bz2"));
        assert!(!defaults.has("client_ssl_cert"));
        assert!(!defaults.has("show_channel_urls"));
    }

    #[test]
    fn test_sparse_fragment() {
        let mut frag = TypedFragment::new();
        assert!(frag.is_empty());
        frag.insert("offline", json!(true));
        assert!(frag.has("offline"));
        assert!(!frag.has("channels"));
        assert_eq!(frag.len(), 1);
    }
}
