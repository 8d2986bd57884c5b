use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::enums::Location;
use crate::value::FieldValue;

// ─── Failure records ────────────────────────────────────────────────────────

/// One recorded validation failure.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub location: Location,
    /// Concrete field path, e.g. `items[0].id`.
    pub path: String,
    /// Field value at the moment the check failed.
    pub value: FieldValue,
    pub message: String,
}

impl fmt::Display for FailureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.location, self.path, self.message)
    }
}

/// Request-scoped, append-only collection of failure records.
///
/// Appends are serialized so concurrently running field instances never
/// lose or interleave records. Insertion order is preserved.
#[derive(Debug, Default)]
pub struct ErrorCollector {
    records: Mutex<Vec<FailureRecord>>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, record: FailureRecord) {
        self.records.lock().push(record);
    }

    /// Snapshot of every record, in insertion order.
    pub fn all(&self) -> Vec<FailureRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn into_records(self) -> Vec<FailureRecord> {
        self.records.into_inner()
    }
}

/// The failures gathered for one request, for the caller to present.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub errors: Vec<FailureRecord>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// First failure per `location` + path, in first-seen order.
    pub fn mapped(&self) -> IndexMap<(Location, String), &FailureRecord> {
        let mut map = IndexMap::new();
        for record in &self.errors {
            map.entry((record.location, record.path.clone()))
                .or_insert(record);
        }
        map
    }

    /// Every failure recorded for one field.
    pub fn for_field(&self, location: Location, path: &str) -> Vec<&FailureRecord> {
        self.errors
            .iter()
            .filter(|r| r.location == location && r.path == path)
            .collect()
    }
}

impl From<Vec<FailureRecord>> for ValidationReport {
    fn from(errors: Vec<FailureRecord>) -> Self {
        ValidationReport { errors }
    }
}

// ─── Step errors ────────────────────────────────────────────────────────────

/// Error returned by a custom validator, condition or sanitizer.
///
/// A validator returning `Err` fails; its message, when present, is used for
/// the failure record unless the chain binds an explicit message.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepError {
    pub message: Option<String>,
}

impl StepError {
    pub fn new(message: impl Into<String>) -> Self {
        StepError {
            message: Some(message.into()),
        }
    }

    /// An error without a message; the default message applies.
    pub fn bare() -> Self {
        StepError { message: None }
    }
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}", message),
            None => write!(f, "step failed"),
        }
    }
}

impl std::error::Error for StepError {}

impl From<String> for StepError {
    fn from(message: String) -> Self {
        StepError::new(message)
    }
}

impl From<&str> for StepError {
    fn from(message: &str) -> Self {
        StepError::new(message)
    }
}

// ─── Selector errors ────────────────────────────────────────────────────────

/// Produced when a field selector cannot be parsed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorError {
    pub selector: String,
    /// Character offset of the problem.
    pub position: usize,
    pub reason: String,
}

impl fmt::Display for SelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid selector '{}' at {}: {}",
            self.selector, self.position, self.reason
        )
    }
}

impl std::error::Error for SelectorError {}

// ─── Chain build errors ─────────────────────────────────────────────────────

/// Produced by `ChainBuilder::build` when a declaration is malformed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChainError {
    InvalidSelector(SelectorError),
    /// `with_message` at declared step `index` does not follow a validator.
    MisplacedMessage { index: usize },
    /// A `matches` pattern failed to compile.
    InvalidPattern { pattern: String, message: String },
    EmptyLocations,
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainError::InvalidSelector(e) => write!(f, "{}", e),
            ChainError::MisplacedMessage { index } => write!(
                f,
                "with_message at step {} must directly follow a validator",
                index
            ),
            ChainError::InvalidPattern { pattern, message } => {
                write!(f, "invalid pattern '{}': {}", pattern, message)
            }
            ChainError::EmptyLocations => write!(f, "a chain needs at least one location"),
        }
    }
}

impl std::error::Error for ChainError {}

impl From<SelectorError> for ChainError {
    fn from(e: SelectorError) -> Self {
        ChainError::InvalidSelector(e)
    }
}

// ─── Request parse errors ───────────────────────────────────────────────────

/// Error kind for request parse failures.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseErrorKind {
    Syntax,
    TypeMismatch,
    UnknownLocation,
}

/// Produced by `request::parse` when the input is not a request object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let (Some(line), Some(col)) = (self.line, self.column) {
            write!(f, "{}:{}: {}", line, col, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for ParseError {}
