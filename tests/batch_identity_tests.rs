//! Batch identity derivation properties.

use proptest::prelude::*;
use serde_json::Value;

use etl_core::batch::Batch;

#[test]
fn day_batch_identity() {
    let batch = Batch::new().with("day", "2015-03-31");
    assert_eq!(batch.id(), "20150331");
}

#[test]
fn identity_joins_values_in_key_order() {
    let batch = Batch::new()
        .with("year", 2015)
        .with("month", 3)
        .with("day", 31);
    // keys sort day < month < year
    assert_eq!(batch.id(), "31_3_2015");
}

#[test]
fn mixed_case_and_punctuation_are_normalized() {
    let batch = Batch::new()
        .with("region", "US-East_1")
        .with("source", "Orders.CSV");
    assert_eq!(batch.id(), "useast1_orderscsv");
}

fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9 _.-]{0,12}".prop_map(Value::from),
    ]
}

// btree_map gives unique keys, so reversing the entry list is a genuine
// permutation of the same batch content
fn arb_entries() -> impl Strategy<Value = Vec<(String, Value)>> {
    proptest::collection::btree_map("[a-z]{1,8}", arb_value(), 0..6)
        .prop_map(|m| m.into_iter().collect())
}

proptest! {
    /// Identity never depends on the order entries were inserted.
    #[test]
    fn identity_is_insertion_order_independent(entries in arb_entries()) {
        let forward: Batch = entries.iter().cloned().collect();
        let reversed: Batch = entries.iter().rev().cloned().collect();
        prop_assert_eq!(forward.id(), reversed.id());
    }

    /// The identity only ever contains `[a-z0-9_]`.
    #[test]
    fn identity_alphabet_is_restricted(entries in arb_entries()) {
        let batch: Batch = entries.into_iter().collect();
        prop_assert!(batch
            .id()
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
    }

    /// Serialization is canonical: equal content means equal encoding.
    #[test]
    fn serialized_form_is_order_independent(entries in arb_entries()) {
        let forward: Batch = entries.iter().cloned().collect();
        let reversed: Batch = entries.iter().rev().cloned().collect();
        prop_assert_eq!(forward.to_json().unwrap(), reversed.to_json().unwrap());
    }
}
