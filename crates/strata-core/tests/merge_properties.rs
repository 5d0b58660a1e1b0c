//! Properties of the ordered merge fold

use proptest::prelude::*;
use serde_json::{Map, Value, json};
use strata_core::{ConflictKind, MergeConflict, merge_sources};

/// Few keys so sources overlap often
fn key() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["a", "b", "c"]).prop_map(String::from)
}

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        (0i64..3).prop_map(Value::from),
        prop::sample::select(vec![0.5f64, 2.5]).prop_map(Value::from),
        prop::sample::select(vec!["x", "y"]).prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        Just(Value::Null),
        Just(json!([1, 2])),
    ]
}

fn object(inner: impl Strategy<Value = Value>) -> impl Strategy<Value = Value> {
    prop::collection::btree_map(key(), inner, 0..3)
        .prop_map(|m| Value::Object(m.into_iter().collect::<Map<_, _>>()))
}

fn tree() -> impl Strategy<Value = Value> {
    object(leaf().prop_recursive(2, 12, 3, |inner| object(inner)))
}

fn shape(conflicts: &[MergeConflict]) -> Vec<(String, ConflictKind, Value, Value)> {
    conflicts
        .iter()
        .map(|c| (c.path.clone(), c.kind, c.value_a.clone(), c.value_b.clone()))
        .collect()
}

proptest! {
    #[test]
    fn fold_is_associative(a in tree(), b in tree(), c in tree()) {
        let all = merge_sources(&[("a", a.clone()), ("b", b.clone()), ("c", c.clone())], false).unwrap();
        let ab = merge_sources(&[("a", a), ("b", b)], false).unwrap();
        let ab_c = merge_sources(&[("ab", ab.merged.clone()), ("c", c)], false).unwrap();

        prop_assert_eq!(&all.merged, &ab_c.merged);

        let mut stepwise = shape(&ab.conflicts);
        stepwise.extend(shape(&ab_c.conflicts));
        prop_assert_eq!(shape(&all.conflicts), stepwise);
    }

    #[test]
    fn merging_a_tree_with_itself_only_overrides_arrays(a in tree()) {
        let result = merge_sources(&[("one", a.clone()), ("two", a.clone())], true).unwrap();
        let arrays: Vec<String> = strata_schema::flatten(&a)
            .into_iter()
            .filter(|(_, value)| value.is_array())
            .map(|(path, _)| path)
            .collect();
        prop_assert!(result.conflicts.iter().all(|c| c.kind == ConflictKind::Override));
        let mut overridden: Vec<String> = result.conflicts.iter().map(|c| c.path.clone()).collect();
        overridden.sort();
        prop_assert_eq!(result.merged, a);
        prop_assert_eq!(overridden, arrays);
    }

    #[test]
    fn later_source_wins_every_leaf(a in tree(), b in tree()) {
        let result = merge_sources(&[("a", a), ("b", b.clone())], false).unwrap();
        for (path, value) in strata_schema::flatten(&b) {
            let mut node = &result.merged;
            for segment in path.split('.') {
                node = &node[segment];
            }
            // Empty objects merge into existing objects rather than replacing them
            if value != json!({}) {
                prop_assert_eq!(node, &value);
            }
        }
    }

    #[test]
    fn strict_fails_exactly_when_types_mismatch(a in tree(), b in tree()) {
        let relaxed = merge_sources(&[("a", a.clone()), ("b", b.clone())], false).unwrap();
        let has_mismatch = relaxed.type_mismatches().next().is_some();
        let strict = merge_sources(&[("a", a), ("b", b)], true);
        prop_assert_eq!(strict.is_err(), has_mismatch);
    }
}

#[test]
fn number_then_string_records_type_mismatch() {
    let result = merge_sources(&[("a", json!({"x": 1})), ("b", json!({"x": "1"}))], false).unwrap();
    assert_eq!(result.merged, json!({"x": "1"}));
    assert_eq!(result.conflicts.len(), 1);
    assert_eq!(result.conflicts[0].kind, ConflictKind::TypeMismatch);
    assert_eq!(result.conflicts[0].path, "x");
}

#[test]
fn integer_then_float_is_an_override() {
    let result = merge_sources(&[("api", json!({"ratio": 5})), ("shared", json!({"ratio": 5.5}))], true)
        .unwrap();
    assert_eq!(result.conflicts.len(), 1);
    assert_eq!(result.conflicts[0].kind, ConflictKind::Override);
}
