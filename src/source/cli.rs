//! Command-line configuration.

use serde_json::Value;

use crate::error::SourceError;
use crate::fragment::{self, RawFragment, TypedFragment};
use crate::source::ConfigSource;

/// Label used for command-line validation errors.
const CLI_SOURCE_LABEL: &str = "command line";

/// Holds the validated contribution of command-line flags.
///
/// The bag from the argument parser is normalized and validated once,
/// eagerly, so a bad flag value surfaces before any lookup happens.
#[derive(Debug, Clone, Default)]
pub struct CliSource {
    typed: TypedFragment,
}

impl CliSource {
    /// Validate a flat name/value bag assembled by the argument parser.
    pub fn from_bag(mut bag: RawFragment) -> Result<Self, SourceError> {
        fragment::normalize_aliases(&mut bag);
        let typed = fragment::validate_mapping(&bag, CLI_SOURCE_LABEL)?;
        Ok(Self { typed })
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

impl ConfigSource for CliSource {
    fn get(&self, name: &str) -> Option<Value> {
        self.typed.get(name).cloned()
    }

    fn has(&self, name: &str) -> bool {
        self.typed.has(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bag(pairs: &[(&str, Value)]) -> RawFragment {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    #[test]
    fn test_bag_is_normalized_and_validated() {
        let source = CliSource::from_bag(bag(&[
            ("channel", json!(["conda-forge"])),
            ("yes", json!(true)),
        ]))
        .unwrap();
        assert_eq!(source.get("channels"), Some(json!(["conda-forge"])));
        assert_eq!(source.get("always_yes"), Some(json!(true)));
        assert!(!source.has("quiet"));
    }

    #[test]
    fn test_bad_flag_value_fails_eagerly() {
        let err = CliSource::from_bag(bag(&[("channel_priority", json!("severe"))])).unwrap_err();
        assert_eq!(err.source(), "command line");
    }

    #[test]
    fn test_empty_source_defines_nothing() {
        let source = CliSource::empty();
        assert!(!source.has("channels"));
        assert_eq!(source.get("channels"), None);
    }
}
