use super::common::{load_cases, value_matches};
use fieldchain::{FieldValue, Selector};
use serde_json::Value;

// ─── expand ──────────────────────────────────────────────────────────────────

#[derive(Debug, serde::Deserialize)]
struct ExpandCase {
    id: String,
    name: String,
    selector: String,
    value: Value,
    expected: Vec<ExpandedInstance>,
}

#[derive(Debug, serde::Deserialize)]
struct ExpandedInstance {
    path: String,
    /// Omitted means the instance is undefined.
    #[serde(default)]
    value: Option<Value>,
}

fn instance_matches(actual: &(fieldchain::FieldPath, FieldValue), expected: &ExpandedInstance) -> bool {
    let (path, value) = actual;
    path.to_string() == expected.path
        && match &expected.value {
            Some(v) => value_matches(value, v),
            None => value.is_undefined(),
        }
}

#[test]
fn expand_suite() {
    let cases: Vec<ExpandCase> = load_cases("selectors.yaml");

    let mut passed = 0;
    let mut failed = 0;

    for case in &cases {
        let selector = match Selector::parse(&case.selector) {
            Ok(selector) => selector,
            Err(e) => {
                eprintln!("  FAIL [{}] {}: parse error {}", case.id, case.name, e);
                failed += 1;
                continue;
            }
        };
        let result = selector.expand(&FieldValue::from(case.value.clone()));

        let matches = result.len() == case.expected.len()
            && result
                .iter()
                .zip(&case.expected)
                .all(|(actual, expected)| instance_matches(actual, expected));

        if matches {
            passed += 1;
        } else {
            eprintln!(
                "  FAIL [{}] {}: expected {:?}, got {:?}",
                case.id, case.name, case.expected, result
            );
            failed += 1;
        }
    }

    eprintln!(
        "\nexpand: {} passed, {} failed out of {} total",
        passed,
        failed,
        cases.len()
    );
    assert_eq!(failed, 0, "{} expand tests failed", failed);
}

// ─── invalid selectors ───────────────────────────────────────────────────────

#[derive(Debug, serde::Deserialize)]
struct InvalidCase {
    id: String,
    selector: String,
    position: usize,
}

#[test]
fn invalid_selector_suite() {
    let cases: Vec<InvalidCase> = load_cases("invalid-selectors.yaml");

    let mut failed = 0;
    for case in &cases {
        match Selector::parse(&case.selector) {
            Err(e) if e.position == case.position => {}
            other => {
                eprintln!(
                    "  FAIL [{}] {:?}: expected error at {}, got {:?}",
                    case.id, case.selector, case.position, other
                );
                failed += 1;
            }
        }
    }
    assert_eq!(failed, 0, "{} invalid selector tests failed", failed);
}
