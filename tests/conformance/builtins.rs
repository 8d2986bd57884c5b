use super::common::{apply_step, load_cases, value_matches};
use fieldchain::{Location, Request, RequestState, body};
use serde_json::{Map, Value};

#[derive(Debug, serde::Deserialize)]
struct StepCase {
    id: String,
    name: String,
    step: String,
    #[serde(default)]
    arg: Value,
    /// Omitted means the field is missing from the body.
    #[serde(default)]
    input: Option<Value>,
    #[serde(default)]
    null_input: bool,
    expected: StepExpected,
}

#[derive(Debug, serde::Deserialize)]
struct StepExpected {
    #[serde(default = "default_valid")]
    valid: bool,
    /// Value after the step; only checked when present.
    #[serde(default)]
    value: Option<Value>,
}

fn default_valid() -> bool {
    true
}

fn run_suite(file: &str) {
    let cases: Vec<StepCase> = load_cases(file);

    let mut passed = 0;
    let mut failed = 0;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();

    for case in &cases {
        let mut fields = Map::new();
        if case.null_input {
            fields.insert("v".to_string(), Value::Null);
        } else if let Some(input) = &case.input {
            fields.insert("v".to_string(), input.clone());
        }
        let state = RequestState::new(Request::new().with(Location::Body, Value::Object(fields)));
        let chain = apply_step(body("v"), &case.step, &case.arg).build().unwrap();

        let result = runtime.block_on(chain.run(&state));
        let value = &result.instances[0].value;

        let value_ok = case
            .expected
            .value
            .as_ref()
            .is_none_or(|expected| value_matches(value, expected));

        if result.is_valid() == case.expected.valid && value_ok {
            passed += 1;
        } else {
            eprintln!(
                "  FAIL [{}] {}: expected valid={} value={:?}, got valid={} value={:?}",
                case.id,
                case.name,
                case.expected.valid,
                case.expected.value,
                result.is_valid(),
                value
            );
            failed += 1;
        }
    }

    eprintln!(
        "\n{}: {} passed, {} failed out of {} total",
        file,
        passed,
        failed,
        cases.len()
    );
    assert_eq!(failed, 0, "{} {} cases failed", failed, file);
}

#[test]
fn validators_suite() {
    run_suite("validators.yaml");
}

#[test]
fn sanitizers_suite() {
    run_suite("sanitizers.yaml");
}
