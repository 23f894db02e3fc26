//! Property-based tests for tree construction, merging and framing.
//!
//! These tests use randomly generated inputs to catch edge cases the unit
//! tests might miss.
//!
//! Test coverage:
//! - Framed strings: decoding recovers what was encoded at every length form
//! - `deep_merge`: overlay leaves always win and merging is idempotent
//! - `ConfigNode`: materializing a tree built from a record gives the record
//! - Credentials: documents survive encryption with a generated key

use proptest::prelude::*;
use serde_json::{Map, Value};

use layered_config::credentials::{
    decode_framed_string, decrypt_document, encode_framed_string, encrypt_credentials,
    generate_key, Envelope,
};
use layered_config::{ConfigNode, RawRecord, deep_merge};

/// Keys carry a prefix no real environment variable uses, so overrides never
/// interfere with materialized values.
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,6}".prop_map(|s| format!("zzprop_{}", s))
}

fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9 _-]{0,16}".prop_map(Value::from),
    ]
}

/// Nested records up to three levels deep.
fn record_strategy() -> impl Strategy<Value = RawRecord> {
    let leaf = scalar_strategy();
    let value = leaf.prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map(key_strategy(), inner, 1..4)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    });
    prop::collection::btree_map(key_strategy(), value, 0..6)
        .prop_map(|map| map.into_iter().collect::<Map<String, Value>>())
}

/// Every (path, leaf) pair of a record; arrays count as leaves.
fn leaves(record: &RawRecord, prefix: &mut Vec<String>, out: &mut Vec<(Vec<String>, Value)>) {
    for (key, value) in record {
        prefix.push(key.clone());
        match value {
            Value::Object(nested) if !nested.is_empty() => leaves(nested, prefix, out),
            other => out.push((prefix.clone(), other.clone())),
        }
        prefix.pop();
    }
}

fn lookup<'a>(record: &'a RawRecord, path: &[String]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    rest.iter().try_fold(record.get(first)?, |value, segment| {
        value.as_object()?.get(segment)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Decoding an encoded framed string recovers the text exactly.
    ///
    /// Lengths up to 1024 exercise the inline, one-byte and two-byte length
    /// forms.
    #[test]
    fn test_framed_string_recovers_text(text in "\\PC{0,1024}") {
        let framed = encode_framed_string(&text).expect("text fits the length prefix");
        prop_assert_eq!(decode_framed_string(&framed).expect("decodes"), text);
    }

    /// Every leaf of the overlay is readable at its path after merging.
    #[test]
    fn test_deep_merge_overlay_leaves_win(base in record_strategy(), overlay in record_strategy()) {
        let mut merged = base.clone();
        deep_merge(&mut merged, overlay.clone());

        let mut overlay_leaves = Vec::new();
        leaves(&overlay, &mut Vec::new(), &mut overlay_leaves);
        for (path, value) in overlay_leaves {
            prop_assert_eq!(lookup(&merged, &path), Some(&value), "leaf at {:?}", path);
        }
    }

    /// Merging the same overlay twice changes nothing the second time.
    #[test]
    fn test_deep_merge_is_idempotent(base in record_strategy(), overlay in record_strategy()) {
        let mut once = base;
        deep_merge(&mut once, overlay.clone());
        let mut twice = once.clone();
        deep_merge(&mut twice, overlay);
        prop_assert_eq!(once, twice);
    }

    /// A tree built from a record materializes back to the same structure.
    #[test]
    fn test_tree_materializes_its_record(record in record_strategy()) {
        let node = ConfigNode::from_record(record.clone());
        prop_assert_eq!(node.to_value(), Value::Object(record));
    }

    /// Appending a record behaves like `deep_merge` on the raw records.
    #[test]
    fn test_append_matches_deep_merge(base in record_strategy(), overlay in record_strategy()) {
        let mut node = ConfigNode::from_record(base.clone());
        node.append(overlay.clone()).expect("unlocked node accepts appends");

        let mut merged = base;
        deep_merge(&mut merged, overlay);
        prop_assert_eq!(node.to_value(), Value::Object(merged));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Credentials documents survive encryption and decryption.
    #[test]
    fn test_credentials_document_survives_encryption(document in "[a-z_]{1,12}: [a-zA-Z0-9 ]{0,64}\n") {
        let key = generate_key();
        let text = encrypt_credentials(&document, &key).expect("encrypts");
        let envelope: Envelope = text.parse().expect("envelope parses");
        prop_assert_eq!(decrypt_document(&envelope, &key).expect("decrypts"), document);
    }
}
