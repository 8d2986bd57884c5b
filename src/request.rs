//! The multi-location request object and per-request execution state.

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::bail::BailFlag;
use crate::enums::Location;
use crate::error::{ErrorCollector, ParseError, ParseErrorKind, ValidationReport};
use crate::selector::FieldPath;
use crate::value::FieldValue;

// ─── Request ────────────────────────────────────────────────────────────────

/// A request split into named locations (`body`, `query`, ...).
///
/// Missing locations read as `Undefined`. Sanitizers write back into the
/// location they read from, creating it if needed, and never through a
/// scalar parent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Request {
    locations: IndexMap<Location, FieldValue>,
}

impl Request {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter for one location.
    pub fn with(mut self, location: Location, value: impl Into<FieldValue>) -> Self {
        self.locations.insert(location, value.into());
        self
    }

    pub fn location(&self, location: Location) -> &FieldValue {
        static UNDEFINED: FieldValue = FieldValue::Undefined;
        self.locations.get(&location).unwrap_or(&UNDEFINED)
    }

    pub fn set_location(&mut self, location: Location, value: FieldValue) {
        self.locations.insert(location, value);
    }

    /// Reads the value at `path` inside `location`.
    pub fn field(&self, location: Location, path: &FieldPath) -> FieldValue {
        self.location(location).get_path(path.segments())
    }

    /// Writes `value` at `path` inside `location` and reports whether it
    /// was written. See [`FieldValue::set_path`] for the paths that are
    /// refused; a refused write leaves the request untouched.
    pub fn set_field(&mut self, location: Location, path: &FieldPath, value: FieldValue) -> bool {
        if let Some(root) = self.locations.get_mut(&location) {
            return root.set_path(path.segments(), value);
        }
        let mut root = FieldValue::Undefined;
        if !root.set_path(path.segments(), value) {
            return false;
        }
        self.locations.insert(location, root);
        true
    }

    /// The whole request as JSON, one key per present location.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.locations
                .iter()
                .map(|(location, value)| (location.as_str().to_string(), value.to_json()))
                .collect(),
        )
    }
}

// ─── Parsing ────────────────────────────────────────────────────────────────

/// Parses a JSON document of the form `{ "body": ..., "query": ... }`.
///
/// Keys must be location names. Header names are lower-cased so selectors
/// can match them case-insensitively.
pub fn parse(input: &str) -> Result<Request, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError {
            kind: ParseErrorKind::Syntax,
            message: "empty input".to_string(),
            line: None,
            column: None,
        });
    }

    let value: Value = serde_json::from_str(input).map_err(|e| ParseError {
        kind: if e.is_data() {
            ParseErrorKind::TypeMismatch
        } else {
            ParseErrorKind::Syntax
        },
        message: e.to_string(),
        line: Some(e.line()),
        column: Some(e.column()),
    })?;

    from_json(value)
}

/// Builds a request from an already-decoded JSON value.
pub fn from_json(value: Value) -> Result<Request, ParseError> {
    let Value::Object(map) = value else {
        return Err(ParseError {
            kind: ParseErrorKind::TypeMismatch,
            message: "request root must be an object".to_string(),
            line: None,
            column: None,
        });
    };

    let mut request = Request::new();
    for (key, value) in map {
        let location = Location::from_name(&key).ok_or_else(|| ParseError {
            kind: ParseErrorKind::UnknownLocation,
            message: format!("unknown request location: {}", key),
            line: None,
            column: None,
        })?;
        let value = match (location, value) {
            (Location::Headers, Value::Object(headers)) => Value::Object(
                headers
                    .into_iter()
                    .map(|(name, v)| (name.to_ascii_lowercase(), v))
                    .collect(),
            ),
            (_, other) => other,
        };
        request.set_location(location, FieldValue::from(value));
    }

    Ok(request)
}

// ─── Request state ──────────────────────────────────────────────────────────

/// Everything shared by the chains run for one request: the request itself,
/// the failure collector and the request-level bail flag.
///
/// Create one per request, pass it by reference to every chain run, and
/// consume it with [`into_parts`](Self::into_parts) when done.
#[derive(Debug, Default)]
pub struct RequestState {
    request: RwLock<Request>,
    errors: ErrorCollector,
    bailed: BailFlag,
}

impl RequestState {
    pub fn new(request: Request) -> Self {
        RequestState {
            request: RwLock::new(request),
            errors: ErrorCollector::new(),
            bailed: BailFlag::default(),
        }
    }

    /// Snapshot of the request as it currently is.
    pub fn request(&self) -> Request {
        self.request.read().clone()
    }

    pub fn errors(&self) -> &ErrorCollector {
        &self.errors
    }

    /// Whether a request-level bail has fired.
    pub fn request_bailed(&self) -> bool {
        self.bailed.is_raised()
    }

    pub fn report(&self) -> ValidationReport {
        ValidationReport::from(self.errors.all())
    }

    pub fn into_parts(self) -> (Request, ValidationReport) {
        (
            self.request.into_inner(),
            ValidationReport::from(self.errors.into_records()),
        )
    }

    pub(crate) fn scope(&self, dry_run: bool) -> Scope<'_> {
        Scope {
            request: &self.request,
            errors: &self.errors,
            bail: &self.bailed,
            dry_run,
        }
    }
}

/// Borrowed view of request state handed to one chain run.
///
/// Nested condition chains get a scope that shares the request but has its
/// own collector and bail flag.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Scope<'a> {
    pub(crate) request: &'a RwLock<Request>,
    pub(crate) errors: &'a ErrorCollector,
    pub(crate) bail: &'a BailFlag,
    /// Sanitized values stay in the context and are not written back.
    pub(crate) dry_run: bool,
}

impl<'a> Scope<'a> {
    pub(crate) fn read(&self, location: Location, path: &FieldPath) -> FieldValue {
        self.request.read().field(location, path)
    }

    /// Writes a sanitized value back unless the request already holds it.
    pub(crate) fn write(&self, location: Location, path: &FieldPath, value: FieldValue) {
        if self.dry_run {
            return;
        }
        let mut request = self.request.write();
        if request.field(location, path) == value {
            return;
        }
        if !request.set_field(location, path, value) {
            tracing::debug!(
                location = location.as_str(),
                path = %path,
                "sanitized value has no place in the request; not written"
            );
        }
    }
}
