use fieldchain::{FieldValue, OptionalOptions, OptionalPolicy};
use proptest::prelude::*;

fn arb_scalar() -> impl Strategy<Value = FieldValue> {
    prop_oneof![
        Just(FieldValue::Undefined),
        Just(FieldValue::Null),
        Just(FieldValue::nan()),
        any::<bool>().prop_map(FieldValue::Bool),
        (-3i64..3).prop_map(FieldValue::from),
        "[a-z]{0,3}".prop_map(FieldValue::from),
        Just(FieldValue::Array(Vec::new())),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn disabled_policy_never_skips(value in arb_scalar()) {
        prop_assert!(!OptionalPolicy::disabled().is_absent(&value));
    }

    #[test]
    fn undefined_is_always_absent(nullable in any::<bool>(), check_falsy in any::<bool>()) {
        let policy = OptionalPolicy::from_options(OptionalOptions { nullable, check_falsy });
        prop_assert!(policy.is_absent(&FieldValue::Undefined));
    }

    #[test]
    fn check_falsy_matches_truthiness(value in arb_scalar(), nullable in any::<bool>()) {
        let policy = OptionalPolicy::from_options(OptionalOptions { nullable, check_falsy: true });
        prop_assert_eq!(policy.is_absent(&value), value.is_falsy());
    }

    #[test]
    fn policies_are_ordered_by_strictness(value in arb_scalar()) {
        let plain = OptionalPolicy::from_options(OptionalOptions::default());
        let nullable = OptionalPolicy::from_options(OptionalOptions { nullable: true, check_falsy: false });
        let falsy = OptionalPolicy::from_options(OptionalOptions { nullable: false, check_falsy: true });
        if plain.is_absent(&value) {
            prop_assert!(nullable.is_absent(&value));
        }
        if nullable.is_absent(&value) {
            prop_assert!(falsy.is_absent(&value));
        }
    }
}
