//! Per field-instance execution state.

use crate::enums::Location;
use crate::request::Scope;
use crate::selector::{FieldPath, Selector};
use crate::value::FieldValue;

/// Location and path of a field instance, detached from the request.
///
/// Async custom steps receive this by value so their futures can be
/// `'static`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldMeta {
    pub location: Location,
    pub path: FieldPath,
}

/// The state of one chain running against one matched field instance.
///
/// Custom steps receive a shared reference to it.
#[derive(Debug)]
pub struct Context<'a> {
    value: FieldValue,
    original_value: FieldValue,
    location: Location,
    path: FieldPath,
    scope: Scope<'a>,
}

impl<'a> Context<'a> {
    pub(crate) fn new(location: Location, path: FieldPath, value: FieldValue, scope: Scope<'a>) -> Self {
        Context {
            original_value: value.clone(),
            value,
            location,
            path,
            scope,
        }
    }

    /// The current value, as left by the latest sanitizer.
    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    /// The value as matched, before any sanitizer ran.
    pub fn original_value(&self) -> &FieldValue {
        &self.original_value
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    pub fn meta(&self) -> FieldMeta {
        FieldMeta {
            location: self.location,
            path: self.path.clone(),
        }
    }

    /// Reads another field of the live request.
    ///
    /// `selector` is resolved like a chain selector; with wildcards the first
    /// match is returned. Unparseable selectors read as `Undefined`.
    pub fn read(&self, location: Location, selector: &str) -> FieldValue {
        let Ok(selector) = Selector::parse(selector) else {
            return FieldValue::Undefined;
        };
        let root = self.scope.read(location, &FieldPath::root());
        selector
            .expand(&root)
            .into_iter()
            .next()
            .map(|(_, value)| value)
            .unwrap_or_default()
    }

    /// Whether a request-level bail has fired in this context's scope.
    pub fn request_bailed(&self) -> bool {
        self.scope.bail.is_raised()
    }

    pub(crate) fn scope(&self) -> Scope<'a> {
        self.scope
    }

    /// Replaces the current value and writes it through to the request when
    /// the request holds something else.
    pub(crate) fn replace_value(&mut self, value: FieldValue) {
        self.scope.write(self.location, &self.path, value.clone());
        self.value = value;
    }
}
