use proptest::prelude::*;
use serde_json::json;
use weightlog_core::canonical;

fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,15}"
}

proptest! {
    #[test]
    fn stable_hash_bytes_is_deterministic(payload in proptest::collection::vec(any::<u8>(), 0..256)) {
        let h1 = canonical::stable_hash_hex(&payload);
        let h2 = canonical::stable_hash_hex(&payload);
        prop_assert_eq!(h1, h2);
    }

    #[test]
    fn stable_json_bytes_ignore_object_key_order(a in key_strategy(), b in key_strategy(), av in any::<u32>(), bv in any::<u32>()) {
        prop_assume!(a != b);

        let left = json!({a.clone(): av, b.clone(): bv});
        let right = json!({b: bv, a: av});

        let left_bytes = canonical::stable_json_bytes(&left).expect("canonical left");
        let right_bytes = canonical::stable_json_bytes(&right).expect("canonical right");
        prop_assert_eq!(left_bytes, right_bytes);
    }
}

#[test]
fn nested_objects_are_normalized_too() {
    let left = json!({"outer": {"b": 1, "a": [{"y": 2, "x": 1}]}});
    let right = json!({"outer": {"a": [{"x": 1, "y": 2}], "b": 1}});
    assert_eq!(
        canonical::stable_json_hash_hex(&left).expect("hash left"),
        canonical::stable_json_hash_hex(&right).expect("hash right")
    );
}

#[test]
fn array_order_is_significant() {
    let left = json!([1, 2]);
    let right = json!([2, 1]);
    assert_ne!(
        canonical::stable_json_hash_hex(&left).expect("hash left"),
        canonical::stable_json_hash_hex(&right).expect("hash right")
    );
}
