//! Parameter normalization applied before every generated API call.
//!
//! # Design
//! The Zabbix API distinguishes JSON arrays (bulk id operations such as
//! `host.delete`) from JSON objects (filters and criteria). Normalization
//! keeps that distinction: lists pass through untouched, objects are merged
//! over the client's default parameters, and bare scalars are wrapped in a
//! one-element list.

use serde_json::{Map, Value};

/// Normalize caller-supplied `params` into the array-or-object shape sent on
/// the wire.
///
/// Strings and numbers become `[x]`, null and booleans become `[]`. Arrays,
/// and objects whose keys are exactly `"0"`..`"n-1"` in order, are returned
/// as arrays without merging `defaults`. Any other object is merged over
/// `defaults` (one level deep) with the caller's keys winning.
pub fn normalize_params(params: Value, defaults: &Map<String, Value>) -> Value {
    match params {
        Value::Null | Value::Bool(_) => Value::Array(Vec::new()),
        scalar @ (Value::String(_) | Value::Number(_)) => Value::Array(vec![scalar]),
        Value::Array(items) => Value::Array(items),
        Value::Object(map) if is_pure_list(&map) => Value::Array(map.into_iter().map(|(_, v)| v).collect()),
        Value::Object(map) => {
            let mut merged = defaults.clone();
            for (k, v) in map {
                merged.insert(k, v);
            }
            Value::Object(merged)
        }
    }
}

/// True when the keys are the contiguous indices `0..len` in order.
fn is_pure_list(map: &Map<String, Value>) -> bool {
    map.keys()
        .enumerate()
        .all(|(i, k)| k.parse::<usize>().is_ok_and(|n| n == i && *k == n.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn defaults() -> Map<String, Value> {
        match json!({"output": "extend", "limit": 10}) {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn scalars_are_wrapped_without_defaults() {
        assert_eq!(normalize_params(json!("10084"), &defaults()), json!(["10084"]));
        assert_eq!(normalize_params(json!(42), &defaults()), json!([42]));
        assert_eq!(normalize_params(json!(1.5), &defaults()), json!([1.5]));
    }

    #[test]
    fn null_and_bool_become_empty_list() {
        assert_eq!(normalize_params(Value::Null, &defaults()), json!([]));
        assert_eq!(normalize_params(json!(true), &defaults()), json!([]));
        assert_eq!(normalize_params(json!(false), &defaults()), json!([]));
    }

    #[test]
    fn lists_pass_through_unchanged() {
        assert_eq!(normalize_params(json!([1, 2, 3]), &defaults()), json!([1, 2, 3]));
        assert_eq!(normalize_params(json!([]), &defaults()), json!([]));
    }

    #[test]
    fn empty_object_is_an_empty_list() {
        assert_eq!(normalize_params(json!({}), &defaults()), json!([]));
    }

    #[test]
    fn index_keyed_object_is_a_list() {
        let input = json!({"0": "10084", "1": "10085"});
        assert_eq!(normalize_params(input, &defaults()), json!(["10084", "10085"]));
    }

    #[test]
    fn sparse_or_padded_indices_are_associative() {
        let sparse = normalize_params(json!({"0": "a", "2": "b"}), &Map::new());
        assert_eq!(sparse, json!({"0": "a", "2": "b"}));

        let padded = normalize_params(json!({"00": "a"}), &Map::new());
        assert_eq!(padded, json!({"00": "a"}));
    }

    #[test]
    fn associative_input_is_merged_over_defaults() {
        let out = normalize_params(json!({"limit": 2, "hostids": ["10084"]}), &defaults());
        assert_eq!(out, json!({"output": "extend", "limit": 2, "hostids": ["10084"]}));
    }

    #[test]
    fn merge_is_shallow() {
        let mut base = Map::new();
        base.insert("filter".into(), json!({"status": 0, "host": "a"}));
        let out = normalize_params(json!({"filter": {"host": "b"}}), &base);
        assert_eq!(out, json!({"filter": {"host": "b"}}));
    }
}
