//! Property-based test generators using proptest.
//!
//! Provides strategies for generating collection names, keys and
//! documents the store accepts.

use proptest::prelude::*;
use serde_json::{Map, Number, Value};

/// Strategy for generating valid (single-level) collection names.
pub fn collection_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z][a-zA-Z0-9_]{0,31}").expect("Invalid regex")
}

/// Strategy for generating valid nested collection names like `a/b`.
pub fn nested_collection_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(collection_name_strategy(), 1..4).prop_map(|parts| parts.join("/"))
}

/// Strategy for generating valid record keys.
pub fn key_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9][a-zA-Z0-9_.-]{0,35}")
        .expect("Invalid regex")
        .prop_filter("Key must not be a relative path component", |s| {
            s != "." && s != ".."
        })
}

/// Strategy for generating keys the store must reject.
pub fn invalid_key_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just(".".to_string()),
        Just("..".to_string()),
        key_strategy().prop_map(|k| format!("{k}/{k}")),
        key_strategy().prop_map(|k| format!("/{k}")),
        key_strategy().prop_map(|k| format!("../{k}")),
    ]
}

/// Strategy for generating JSON documents.
///
/// Numbers are integers only, so documents compare equal after a round
/// trip through text.
pub fn json_value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| Value::Number(Number::from(n))),
        ".{0,24}".prop_map(Value::String),
    ];

    leaf.prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
            prop::collection::btree_map("[a-z_]{1,12}", inner, 0..8)
                .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

/// Strategy for generating JSON object documents (the usual record shape).
pub fn json_object_strategy() -> impl Strategy<Value = Value> {
    prop::collection::btree_map("[a-z_]{1,12}", json_value_strategy(), 0..8)
        .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<_, _>>()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::TestStore;
    use jsondb_core::ErrorKind;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn generated_records_round_trip(
            collection in nested_collection_strategy(),
            key in key_strategy(),
            doc in json_object_strategy(),
        ) {
            let store = TestStore::new();
            store.write(&collection, &key, &doc).unwrap();

            let back: Value = store.read_as(&collection, &key).unwrap();
            prop_assert_eq!(back, doc);
        }

        #[test]
        fn invalid_keys_are_rejected(key in invalid_key_strategy()) {
            let store = TestStore::new();
            let err = store.write("test", &key, &Value::Null).unwrap_err();
            prop_assert_eq!(err.kind(), ErrorKind::InvalidArgument);
            prop_assert!(!store.path().join("test").exists());
        }

        #[test]
        fn collection_names_are_valid(name in collection_name_strategy()) {
            prop_assert!(jsondb_core::path::validate_collection(&name).is_ok());
        }
    }
}
