//! Dynamic field values.
//!
//! Request fields may be missing, null, scalars, sequences or keyed maps.
//! [`FieldValue`] keeps "missing" (`Undefined`) distinct from `Null` and lets
//! numbers carry NaN, which plain JSON cannot represent.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::selector::PathSegment;

/// Keyed map of field values, insertion ordered.
pub type FieldMap = IndexMap<String, FieldValue>;

/// A loosely-typed value read from (or written to) a request location.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum FieldValue {
    /// The field is not present at all.
    #[default]
    Undefined,
    Null,
    Bool(bool),
    /// Numbers are `f64`; `NaN` marks a failed numeric coercion.
    Number(f64),
    String(String),
    Array(Vec<FieldValue>),
    Object(FieldMap),
}

impl FieldValue {
    pub fn nan() -> Self {
        FieldValue::Number(f64::NAN)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, FieldValue::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn is_nan(&self) -> bool {
        matches!(self, FieldValue::Number(n) if n.is_nan())
    }

    pub fn is_string(&self) -> bool {
        matches!(self, FieldValue::String(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, FieldValue::Array(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, FieldValue::Object(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<FieldValue>> {
        match self {
            FieldValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&FieldMap> {
        match self {
            FieldValue::Object(map) => Some(map),
            _ => None,
        }
    }

    // ─── Truthiness table ───────────────────────────────────────────────────

    /// Falsy values: undefined, null, `false`, `0`, `NaN` and `""`.
    ///
    /// Empty arrays and empty objects are truthy.
    pub fn is_falsy(&self) -> bool {
        match self {
            FieldValue::Undefined | FieldValue::Null => true,
            FieldValue::Bool(b) => !b,
            FieldValue::Number(n) => *n == 0.0 || n.is_nan(),
            FieldValue::String(s) => s.is_empty(),
            FieldValue::Array(_) | FieldValue::Object(_) => false,
        }
    }

    pub fn is_truthy(&self) -> bool {
        !self.is_falsy()
    }

    /// Values replaced by a default: undefined, null, `NaN` and `""`.
    ///
    /// Unlike [`is_falsy`](Self::is_falsy), `false` and `0` are kept.
    pub fn is_empty_for_default(&self) -> bool {
        match self {
            FieldValue::Undefined | FieldValue::Null => true,
            FieldValue::Number(n) => n.is_nan(),
            FieldValue::String(s) => s.is_empty(),
            _ => false,
        }
    }

    // ─── String coercion ────────────────────────────────────────────────────

    /// String form used by string-based checks and sanitizers.
    ///
    /// Undefined and null become `""`, integral numbers drop their fraction,
    /// arrays and objects render as compact JSON.
    pub fn to_display_string(&self) -> String {
        match self {
            FieldValue::Undefined | FieldValue::Null => String::new(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Number(n) => format_number(*n),
            FieldValue::String(s) => s.clone(),
            FieldValue::Array(_) | FieldValue::Object(_) => {
                serde_json::to_string(&self.to_json()).unwrap_or_default()
            }
        }
    }

    // ─── Path access ────────────────────────────────────────────────────────

    /// Child value under an object key, or under an array index when the
    /// key is numeric. Anything else is `Undefined`.
    pub fn get_key(&self, key: &str) -> FieldValue {
        match self {
            FieldValue::Object(map) => map.get(key).cloned().unwrap_or_default(),
            FieldValue::Array(items) => key
                .parse::<usize>()
                .ok()
                .and_then(|i| items.get(i).cloned())
                .unwrap_or_default(),
            _ => FieldValue::Undefined,
        }
    }

    pub fn get_index(&self, index: usize) -> FieldValue {
        match self {
            FieldValue::Array(items) => items.get(index).cloned().unwrap_or_default(),
            FieldValue::Object(map) => map.get(&index.to_string()).cloned().unwrap_or_default(),
            _ => FieldValue::Undefined,
        }
    }

    /// Reads the value at a concrete path. The empty path is the value itself.
    pub fn get_path(&self, path: &[PathSegment]) -> FieldValue {
        let mut current = self.clone();
        for segment in path {
            current = match segment {
                PathSegment::Key(key) => current.get_key(key),
                PathSegment::Index(index) => current.get_index(*index),
            };
            if current.is_undefined() {
                break;
            }
        }
        current
    }

    /// Writes `value` at a concrete path and reports whether it was written.
    ///
    /// Missing objects and arrays along the path are created. Nothing is
    /// written through a scalar or null parent, nor more than one slot past
    /// the end of an array.
    pub fn set_path(&mut self, path: &[PathSegment], value: FieldValue) -> bool {
        let Some((head, rest)) = path.split_first() else {
            *self = value;
            return true;
        };

        if self.is_undefined() {
            let mut created = match head {
                PathSegment::Key(_) => FieldValue::Object(FieldMap::new()),
                PathSegment::Index(_) => FieldValue::Array(Vec::new()),
            };
            if !created.set_path(path, value) {
                return false;
            }
            *self = created;
            return true;
        }

        match (self, head) {
            (FieldValue::Object(map), PathSegment::Key(key)) => set_entry(map, key, rest, value),
            (FieldValue::Object(map), PathSegment::Index(index)) => {
                set_entry(map, &index.to_string(), rest, value)
            }
            (FieldValue::Array(items), PathSegment::Index(index)) => {
                set_array_slot(items, *index, rest, value)
            }
            (FieldValue::Array(items), PathSegment::Key(key)) => match key.parse::<usize>() {
                Ok(index) => set_array_slot(items, index, rest, value),
                Err(_) => false,
            },
            _ => false,
        }
    }

    // ─── JSON conversion ────────────────────────────────────────────────────

    /// Converts to JSON. Undefined object entries are dropped, undefined
    /// array items and non-finite numbers become `null`.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Undefined | FieldValue::Null => Value::Null,
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Number(n) => number_to_json(*n),
            FieldValue::String(s) => Value::String(s.clone()),
            FieldValue::Array(items) => Value::Array(items.iter().map(|v| v.to_json()).collect()),
            FieldValue::Object(map) => Value::Object(
                map.iter()
                    .filter(|(_, v)| !v.is_undefined())
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

fn set_entry(map: &mut FieldMap, key: &str, rest: &[PathSegment], value: FieldValue) -> bool {
    if let Some(child) = map.get_mut(key) {
        return child.set_path(rest, value);
    }
    let mut child = FieldValue::Undefined;
    if !child.set_path(rest, value) {
        return false;
    }
    map.insert(key.to_string(), child);
    true
}

fn set_array_slot(items: &mut Vec<FieldValue>, index: usize, rest: &[PathSegment], value: FieldValue) -> bool {
    if let Some(item) = items.get_mut(index) {
        return item.set_path(rest, value);
    }
    if index != items.len() {
        return false;
    }
    let mut item = FieldValue::Undefined;
    if !item.set_path(rest, value) {
        return false;
    }
    items.push(item);
    true
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{}Infinity", sign)
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

fn number_to_json(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        Value::Number((n as i64).into())
    } else {
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(b),
            Value::Number(n) => n.as_f64().map(FieldValue::Number).unwrap_or(FieldValue::Null),
            Value::String(s) => FieldValue::String(s),
            Value::Array(items) => FieldValue::Array(items.into_iter().map(FieldValue::from).collect()),
            Value::Object(map) => FieldValue::Object(
                map.into_iter()
                    .map(|(k, v)| (k, FieldValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&FieldValue> for Value {
    fn from(value: &FieldValue) -> Self {
        value.to_json()
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(value: Vec<T>) -> Self {
        FieldValue::Array(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(FieldValue::from)
    }
}
