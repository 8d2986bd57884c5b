use fieldchain::{BailOptions, Location, Request, RequestState, body};
use proptest::prelude::*;
use serde_json::{Value, json};

fn run<F: std::future::Future>(future: F) -> F::Output {
    futures::executor::block_on(future)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    // Without bail every failing validator leaves exactly one record.
    #[test]
    fn each_failing_validator_records_once(failing in 0..6usize, passing in 0..6usize) {
        let mut builder = body("v");
        for _ in 0..failing {
            builder = builder.is_int();
        }
        for _ in 0..passing {
            builder = builder.not_empty();
        }
        let state = RequestState::new(Request::new().with(Location::Body, json!({ "v": "x" })));
        run(builder.build().unwrap().run(&state));
        prop_assert_eq!(state.errors().len(), failing);
    }

    // A bail after the first validator caps the records at one.
    #[test]
    fn bail_caps_records(tail in 0..6usize) {
        let mut builder = body("v").is_int().bail();
        for _ in 0..tail {
            builder = builder.is_int();
        }
        let state = RequestState::new(Request::new().with(Location::Body, json!({ "v": "x" })));
        run(builder.build().unwrap().run(&state));
        prop_assert_eq!(state.errors().len(), 1);
    }

    // Once a request-level bail fires no later chain records anything.
    #[test]
    fn request_bail_silences_later_chains(later in 1..5usize) {
        let state = RequestState::new(Request::new().with(Location::Body, json!({})));
        let first = body("a").exists().bail_with(BailOptions::request()).build().unwrap();
        run(first.run(&state));
        for i in 0..later {
            let chain = body(&format!("f{}", i)).exists().build().unwrap();
            prop_assert!(run(chain.run(&state)).skipped);
        }
        prop_assert_eq!(state.errors().len(), 1);
    }

    // Dry runs never change the request, whatever the sanitizers do.
    #[test]
    fn dry_run_never_writes(text in "[ a-zA-Z]{0,8}") {
        let original = json!({ "v": text });
        let state = RequestState::new(Request::new().with(Location::Body, original.clone()));
        let chain = body("v").trim().to_upper_case().to_array().build().unwrap();
        run(chain.run_with(&state, fieldchain::RunOptions { dry_run: true }));
        prop_assert_eq!(state.request().location(Location::Body).to_json(), original);
    }

    // Sanitizers write their final value back to the request.
    #[test]
    fn sanitized_value_is_written_back(text in "[ a-z]{0,8}") {
        let state = RequestState::new(Request::new().with(Location::Body, json!({ "v": text })));
        let chain = body("v").trim().build().unwrap();
        let result = run(chain.run(&state));
        let written: Value = state.request().location(Location::Body).to_json();
        prop_assert_eq!(&written["v"], &result.instances[0].value.to_json());
        prop_assert_eq!(written["v"].as_str(), Some(text.trim()));
    }

    // A sanitizer that leaves the value as it is never touches the request,
    // whether the field, its parent or the whole location is missing.
    #[test]
    fn unchanged_values_are_never_written(
        parent in prop_oneof![
            Just(None),
            Just(Some(json!("scalar"))),
            Just(Some(json!(7))),
            Just(Some(json!(null))),
            Just(Some(json!({ "other": true }))),
            Just(Some(json!({ "leaf": "kept" }))),
        ],
        with_location in any::<bool>(),
    ) {
        let mut request = Request::new();
        if with_location {
            let mut fields = serde_json::Map::new();
            if let Some(parent) = parent {
                fields.insert("p".to_string(), parent);
            }
            request = request.with(Location::Body, Value::Object(fields));
        }
        let before = request.to_json();
        let state = RequestState::new(request);

        let chain = body("p.leaf").trim().to_upper_case().to_lower_case().build().unwrap();
        run(chain.run(&state));

        prop_assert_eq!(state.request().to_json(), before);
    }
}
