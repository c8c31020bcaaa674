//! Alias rewriting.

use crate::fragment::RawFragment;
use crate::schema;

/// Rename every known alias key in `raw` to its canonical field name.
///
/// When both an alias and its canonical name are present, the alias value
/// replaces the canonical one; legacy spellings were written later and are
/// taken as the author's intent. Unknown keys are left untouched for the
/// validator to report. Idempotent.
pub fn normalize_aliases(raw: &mut RawFragment) {
    let aliased: Vec<String> = raw
        .keys()
        .filter(|k| schema::canonical_name(k).is_some())
        .cloned()
        .collect();
    for alias in aliased {
        if let Some(value) = raw.remove(&alias) {
            // canonical_name returned Some above
            if let Some(canonical) = schema::canonical_name(&alias) {
                raw.insert(canonical.to_owned(), value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(pairs: &[(&str, serde_json::Value)]) -> RawFragment {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    #[test]
    fn test_alias_renamed_to_canonical() {
        let mut bag = raw(&[("channel", json!(["conda-forge"])), ("yes", json!(true))]);
        normalize_aliases(&mut bag);
        assert_eq!(bag.get("channels"), Some(&json!(["conda-forge"])));
        assert_eq!(bag.get("always_yes"), Some(&json!(true)));
        assert!(!bag.contains_key("channel"));
        assert!(!bag.contains_key("yes"));
    }

    #[test]
    fn test_alias_wins_over_co_present_canonical() {
        let mut bag = raw(&[
            ("always_yes", json!(false)),
            ("yes", json!(true)),
        ]);
        normalize_aliases(&mut bag);
        assert_eq!(bag.get("always_yes"), Some(&json!(true)));
    }

    #[test]
    fn test_unknown_keys_untouched() {
        let mut bag = raw(&[("no_such_key", json!(1))]);
        normalize_aliases(&mut bag);
        assert_eq!(bag.get("no_such_key"), Some(&json!(1)));
    }

    #[test]
    fn test_idempotent() {
        let mut bag = raw(&[("verbose", json!(2)), ("channels", json!(["a"]))]);
        normalize_aliases(&mut bag);
        let once = bag.clone();
        normalize_aliases(&mut bag);
        assert_eq!(bag, once);
    }
}
