//! Built-in checks and transforms.
//!
//! These are plain functions over [`FieldValue`]; `ChainBuilder` wraps them
//! into steps. String-based checks see the value's string form and, for an
//! array, must pass for every item.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::enums::ExistsMode;
use crate::value::FieldValue;

// ─── Cached regexes ─────────────────────────────────────────────────────────

static NUMERIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?([0-9]*[.])?[0-9]+$").unwrap());

static INT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[+-]?[0-9]+$").unwrap());

static INT_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[+-]?[0-9]+").unwrap());

static FLOAT_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[+-]?([0-9]+\.?[0-9]*|\.[0-9]+)([eE][+-]?[0-9]+)?").unwrap());

// ─── Options ────────────────────────────────────────────────────────────────

/// Bounds for `is_array`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrayOptions {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

/// Options for `is_object`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectOptions {
    /// Only keyed maps pass. When false, arrays and null pass too.
    pub strict: bool,
}

impl Default for ObjectOptions {
    fn default() -> Self {
        ObjectOptions { strict: true }
    }
}

/// Options for `exists_with`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExistsOptions {
    pub values: ExistsMode,
}

/// Character-count bounds for `is_length`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LengthOptions {
    pub min: usize,
    pub max: Option<usize>,
}

// ─── Validators ─────────────────────────────────────────────────────────────

/// Applies a string test to the value, or to every item of an array.
/// An empty array is tested as `""`.
pub fn standard(value: &FieldValue, test: impl Fn(&str) -> bool) -> bool {
    match value {
        FieldValue::Array(items) if !items.is_empty() => {
            items.iter().all(|item| test(&item.to_display_string()))
        }
        FieldValue::Array(_) => test(""),
        other => test(&other.to_display_string()),
    }
}

pub fn exists(value: &FieldValue, options: &ExistsOptions) -> bool {
    match options.values {
        ExistsMode::Undefined => !value.is_undefined(),
        ExistsMode::Null => !value.is_undefined() && !value.is_null(),
        ExistsMode::Falsy => value.is_truthy(),
    }
}

pub fn not_empty(s: &str) -> bool {
    !s.is_empty()
}

pub fn is_numeric(s: &str) -> bool {
    NUMERIC_RE.is_match(s)
}

pub fn is_int(s: &str) -> bool {
    INT_RE.is_match(s)
}

pub fn is_boolean(value: &FieldValue) -> bool {
    match value {
        FieldValue::Bool(_) => true,
        other => matches!(
            other.to_display_string().as_str(),
            "true" | "false" | "0" | "1"
        ),
    }
}

pub fn is_array(value: &FieldValue, options: &ArrayOptions) -> bool {
    let Some(items) = value.as_array() else {
        return false;
    };
    options.min.is_none_or(|min| items.len() >= min)
        && options.max.is_none_or(|max| items.len() <= max)
}

pub fn is_object(value: &FieldValue, options: &ObjectOptions) -> bool {
    match value {
        FieldValue::Object(_) => true,
        FieldValue::Array(_) | FieldValue::Null => !options.strict,
        _ => false,
    }
}

pub fn is_in(s: &str, options: &[String]) -> bool {
    options.iter().any(|option| option == s)
}

pub fn is_length(s: &str, options: &LengthOptions) -> bool {
    let len = s.chars().count();
    len >= options.min && options.max.is_none_or(|max| len <= max)
}

// ─── Sanitizers ─────────────────────────────────────────────────────────────

/// Replaces undefined, null, `NaN` and `""` with `default`.
pub fn default_to(value: &FieldValue, default: &FieldValue) -> FieldValue {
    if value.is_empty_for_default() {
        default.clone()
    } else {
        value.clone()
    }
}

/// Replaces the value with `to` when it equals one of `from`.
pub fn replace(value: &FieldValue, from: &[FieldValue], to: &FieldValue) -> FieldValue {
    if from.contains(value) {
        to.clone()
    } else {
        value.clone()
    }
}

/// Undefined becomes `[]`, arrays stay as they are, anything else is wrapped.
pub fn to_array(value: &FieldValue) -> FieldValue {
    match value {
        FieldValue::Undefined => FieldValue::Array(Vec::new()),
        FieldValue::Array(_) => value.clone(),
        other => FieldValue::Array(vec![other.clone()]),
    }
}

/// Applies `f` to the value, or to every item of an array.
fn map_items(value: &FieldValue, f: impl Fn(&FieldValue) -> FieldValue) -> FieldValue {
    match value {
        FieldValue::Array(items) => FieldValue::Array(items.iter().map(f).collect()),
        other => f(other),
    }
}

/// Applies a string transform to string values; other values pass through.
fn map_strings(value: &FieldValue, f: impl Fn(&str) -> String) -> FieldValue {
    map_items(value, |item| match item {
        FieldValue::String(s) => FieldValue::String(f(s)),
        other => other.clone(),
    })
}

pub fn trim(value: &FieldValue) -> FieldValue {
    map_strings(value, |s| s.trim().to_string())
}

pub fn to_lower_case(value: &FieldValue) -> FieldValue {
    map_strings(value, str::to_lowercase)
}

pub fn to_upper_case(value: &FieldValue) -> FieldValue {
    map_strings(value, str::to_uppercase)
}

/// Parses the leading integer of the value's string form; `NaN` if none.
pub fn to_int(value: &FieldValue) -> FieldValue {
    map_items(value, |item| parse_prefix(&INT_PREFIX_RE, &item.to_display_string()))
}

/// Parses the leading decimal number of the value's string form; `NaN` if none.
pub fn to_float(value: &FieldValue) -> FieldValue {
    map_items(value, |item| parse_prefix(&FLOAT_PREFIX_RE, &item.to_display_string()))
}

fn parse_prefix(re: &Regex, s: &str) -> FieldValue {
    re.find(s)
        .and_then(|m| m.as_str().trim().parse::<f64>().ok())
        .map(FieldValue::Number)
        .unwrap_or_else(FieldValue::nan)
}

/// Loose mode: everything except `""`, `"0"` and `"false"` is true.
/// Strict mode: only `"1"` and `"true"` are true.
pub fn to_boolean(value: &FieldValue, strict: bool) -> FieldValue {
    map_items(value, |item| {
        let s = item.to_display_string();
        let b = if strict {
            s == "1" || s == "true"
        } else {
            !(s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false"))
        };
        FieldValue::Bool(b)
    })
}
