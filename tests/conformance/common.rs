use fieldchain::{ChainBuilder, ExistsMode, ExistsOptions, FieldValue};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::PathBuf;

pub fn fixtures_dir() -> PathBuf {
    std::env::var("FIELDCHAIN_FIXTURES_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures"))
}

pub fn load_cases<T: DeserializeOwned>(file: &str) -> Vec<T> {
    let path = fixtures_dir().join(file);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read {:?}: {}", path, e));
    serde_saphyr::from_str(&content).unwrap_or_else(|e| panic!("bad fixture {:?}: {}", path, e))
}

/// Compares a field value with its JSON expectation. `NaN` is spelled as the
/// string `"NaN"` in fixtures.
pub fn value_matches(actual: &FieldValue, expected: &Value) -> bool {
    match expected {
        Value::String(s) if s == "NaN" => actual.is_nan(),
        _ => actual.to_json() == *expected,
    }
}

fn strings(arg: &Value) -> Vec<String> {
    arg.as_array()
        .map(|items| {
            items
                .iter()
                .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

fn options<T: DeserializeOwned + Default>(arg: &Value) -> T {
    if arg.is_null() {
        T::default()
    } else {
        serde_json::from_value(arg.clone()).unwrap_or_else(|e| panic!("bad options {}: {}", arg, e))
    }
}

/// Appends the built-in step named `step` to `builder`.
pub fn apply_step(builder: ChainBuilder, step: &str, arg: &Value) -> ChainBuilder {
    let text = arg.as_str().unwrap_or_default();
    match step {
        "exists" => builder.exists(),
        "exists_null" => builder.exists_with(ExistsOptions {
            values: ExistsMode::Null,
        }),
        "exists_falsy" => builder.exists_with(ExistsOptions {
            values: ExistsMode::Falsy,
        }),
        "not_empty" => builder.not_empty(),
        "is_string" => builder.is_string(),
        "is_numeric" => builder.is_numeric(),
        "is_int" => builder.is_int(),
        "is_boolean" => builder.is_boolean(),
        "is_array" => builder.is_array(options(arg)),
        "is_object" => builder.is_object(options(arg)),
        "equals" => builder.equals(text),
        "is_in" => builder.is_in(strings(arg)),
        "contains" => builder.contains(text),
        "matches" => builder.matches(text),
        "is_length" => builder.is_length(options(arg)),
        "default_to" => builder.default_to(arg.clone()),
        "replace" => {
            let from = arg["from"].as_array().cloned().unwrap_or_default();
            builder.replace(from, arg["to"].clone())
        }
        "to_array" => builder.to_array(),
        "trim" => builder.trim(),
        "to_lower_case" => builder.to_lower_case(),
        "to_upper_case" => builder.to_upper_case(),
        "to_int" => builder.to_int(),
        "to_float" => builder.to_float(),
        "to_boolean" => builder.to_boolean(arg.as_bool().unwrap_or(false)),
        other => panic!("unknown step '{}'", other),
    }
}
