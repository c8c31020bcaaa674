//! Per-field fragment merging.

use serde_json::Value;

use crate::fragment::TypedFragment;
use crate::schema::{self, MergeStrategy};

/// Merge two typed fragments; `high` takes precedence over `low`.
///
/// Sequence fields concatenate with higher-precedence entries first and
/// duplicates dropped at first occurrence, so `[conda-forge]` merged over
/// `[defaults]` reads `[conda-forge, defaults]`. Mapping fields union
/// key-wise with `high` winning conflicts. Everything else is a plain
/// override.
pub fn merge(low: &TypedFragment, high: &TypedFragment) -> TypedFragment {
    let mut out = TypedFragment::new();

    for (name, low_value) in low.iter() {
        let strategy = schema::field(name).map_or(MergeStrategy::Override, |d| d.merge);
        let merged = match (strategy, high.get(name)) {
            (_, None) => low_value.clone(),
            (MergeStrategy::Override, Some(high_value)) => high_value.clone(),
            (MergeStrategy::Concat, Some(high_value)) => {
                concat_values(low_value, high_value)
            }
            (MergeStrategy::MapUnion, Some(high_value)) => {
                union_values(low_value, high_value)
            }
        };
        out.insert(name.clone(), merged);
    }

    for (name, high_value) in high.iter() {
        if !out.has(name) {
            out.insert(name.clone(), high_value.clone());
        }
    }

    out
}

/// Fold a precedence-ordered list of fragments (first = lowest) into one.
/// Zero fragments reduce to the all-defaults fragment.
pub fn reduce<'a>(fragments: impl IntoIterator<Item = &'a TypedFragment>) -> TypedFragment {
    let mut iter = fragments.into_iter();
    let Some(first) = iter.next() else {
        return TypedFragment::defaults();
    };
    iter.fold(first.clone(), |acc, next| merge(&acc, next))
}

fn concat_values(low: &Value, high: &Value) -> Value {
    let mut out: Vec<Value> = Vec::new();
    for item in as_items(high).iter().chain(as_items(low).iter()) {
        push_unique(&mut out, item);
    }
    Value::Array(out)
}

fn union_values(low: &Value, high: &Value) -> Value {
    let mut out = match low {
        Value::Object(map) => map.clone(),
        _ => serde_json::Map::new(),
    };
    if let Value::Object(map) = high {
        for (key, value) in map {
            out.insert(key.clone(), value.clone());
        }
    }
    Value::Object(out)
}

fn as_items(value: &Value) -> &[Value] {
    match value {
        Value::Array(items) => items,
        _ => std::slice::from_ref(value),
    }
}

fn push_unique(out: &mut Vec<Value>, item: &Value) {
    if !out.contains(item) {
        out.push(item.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn frag(pairs: &[(&str, Value)]) -> TypedFragment {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    #[test]
    fn test_override_high_wins() {
        let low = frag(&[("always_yes", json!(true)), ("quiet", json!(true))]);
        let high = frag(&[("always_yes", json!(false))]);
        let merged = merge(&low, &high);
        assert_eq!(merged.get("always_yes"), Some(&json!(false)));
        assert_eq!(merged.get("quiet"), Some(&json!(true)));
    }

    #[test]
    fn test_concat_high_first_dedup() {
        let low = frag(&[("channels", json!(["defaults", "bioconda"]))]);
        let high = frag(&[("channels", json!(["conda-forge", "bioconda"]))]);
        let merged = merge(&low, &high);
        assert_eq!(
            merged.get("channels"),
            Some(&json!(["conda-forge", "bioconda", "defaults"]))
        );
    }

    #[test]
    fn test_map_union_high_wins_conflicts() {
        let low = frag(&[("proxy_servers", json!({"http": "low", "ftp": "keep"}))]);
        let high = frag(&[("proxy_servers", json!({"http": "high"}))]);
        let merged = merge(&low, &high);
        assert_eq!(
            merged.get("proxy_servers"),
            Some(&json!({"http": "high", "ftp": "keep"}))
        );
    }

    #[test]
    fn test_keys_only_on_one_side_survive() {
        let low = frag(&[("offline", json!(true))]);
        let high = frag(&[("json", json!(true))]);
        let merged = merge(&low, &high);
        assert_eq!(merged.get("offline"), Some(&json!(true)));
        assert_eq!(merged.get("json"), Some(&json!(true)));
    }

    #[test]
    fn test_reduce_empty_is_defaults() {
        let merged = reduce([]);
        assert_eq!(merged.get("channel_priority"), Some(&json!("flexible")));
        assert_eq!(merged.get("always_yes"), Some(&json!(false)));
    }

    #[test]
    fn test_reduce_is_left_fold() {
        let a = frag(&[("channels", json!(["defaults"]))]);
        let b = frag(&[("channels", json!(["conda-forge"])), ("always_yes", json!(true))]);
        let c = frag(&[("always_yes", json!(false))]);
        let merged = reduce([&a, &b, &c]);
        assert_eq!(
            merged.get("channels"),
            Some(&json!(["conda-forge", "defaults"]))
        );
        assert_eq!(merged.get("always_yes"), Some(&json!(false)));
    }

    #[test]
    fn test_concat_associative() {
        let a = frag(&[("pinned_packages", json!(["x"]))]);
        let b = frag(&[("pinned_packages", json!(["y", "x"]))]);
        let c = frag(&[("pinned_packages", json!(["z"]))]);
        let left = merge(&merge(&a, &b), &c);
        let right = merge(&a, &merge(&b, &c));
        assert_eq!(left, right);
    }
}
