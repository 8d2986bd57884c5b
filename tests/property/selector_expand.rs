use fieldchain::{FieldPath, FieldValue, Selector};
use proptest::prelude::*;
use serde_json::{Value, json};

/// Strategy for arbitrary JSON values nested up to `depth` levels.
fn arb_json(depth: u32) -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|i| json!(i)),
        "[a-z]{0,6}".prop_map(Value::String),
    ];

    leaf.prop_recursive(depth, 64, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
            prop::collection::vec(("[a-z][a-z0-9_]{0,5}", inner), 1..5).prop_map(|pairs| {
                Value::Object(pairs.into_iter().collect())
            }),
        ]
    })
}

/// Strategy for selectors built from keys, indices and wildcards.
fn arb_selector() -> impl Strategy<Value = String> {
    let segment = prop_oneof![
        "[a-z]{1,4}".prop_map(|k| format!(".{}", k)),
        (0..4usize).prop_map(|i| format!("[{}]", i)),
        Just("[*]".to_string()),
        Just(".*".to_string()),
    ];
    ("[a-z]{1,4}", prop::collection::vec(segment, 0..4))
        .prop_map(|(head, rest)| format!("{}{}", head, rest.concat()))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn generated_selectors_parse(selector in arb_selector()) {
        prop_assert!(Selector::parse(&selector).is_ok(), "{:?} failed to parse", selector);
    }

    #[test]
    fn empty_selector_returns_root(value in arb_json(3)) {
        let root = FieldValue::from(value);
        let matched = Selector::parse("").unwrap().expand(&root);
        prop_assert_eq!(matched.len(), 1);
        prop_assert!(matched[0].0.is_root());
        prop_assert_eq!(&matched[0].1, &root);
    }

    #[test]
    fn plain_selectors_yield_exactly_one_instance(
        value in arb_json(3),
        selector in arb_selector(),
    ) {
        let selector = Selector::parse(&selector).unwrap();
        prop_assume!(!selector.has_wildcard());
        let matched = selector.expand(&FieldValue::from(value));
        prop_assert_eq!(matched.len(), 1);
    }

    #[test]
    fn matched_values_live_at_their_paths(
        value in arb_json(3),
        selector in arb_selector(),
    ) {
        let root = FieldValue::from(value);
        for (path, matched) in Selector::parse(&selector).unwrap().expand(&root) {
            prop_assert_eq!(root.get_path(path.segments()), matched);
        }
    }

    #[test]
    fn canonical_paths_parse_back(
        value in arb_json(3),
        selector in arb_selector(),
    ) {
        let root = FieldValue::from(value);
        for (path, _) in Selector::parse(&selector).unwrap().expand(&root) {
            let reparsed = FieldPath::parse(&path.to_string());
            prop_assert_eq!(reparsed.as_ref(), Ok(&path));
        }
    }

    #[test]
    fn wildcard_on_array_returns_n_results(n in 0..8usize, elem in arb_json(1)) {
        let items: Vec<Value> = (0..n).map(|_| elem.clone()).collect();
        let root = FieldValue::from(json!({ "items": items }));
        let matched = Selector::parse("items[*]").unwrap().expand(&root);
        prop_assert_eq!(matched.len(), n);
    }

    #[test]
    fn set_then_get_round_trips(
        value in arb_json(2),
        key in "[a-z]{1,4}",
        leaf in "[a-z]{0,4}",
    ) {
        let mut root = FieldValue::from(json!({}));
        let path = FieldPath::parse(&format!("{}.inner", key)).unwrap();
        prop_assert!(root.set_path(path.segments(), FieldValue::from(value.clone())));
        prop_assert_eq!(root.get_path(path.segments()), FieldValue::from(value));

        let sibling = FieldPath::parse(&format!("{}.other", key)).unwrap();
        prop_assert!(root.set_path(sibling.segments(), FieldValue::from(leaf.as_str())));
        prop_assert_eq!(root.get_path(sibling.segments()), FieldValue::from(leaf.as_str()));
    }
}
