//! The chain-wide optional policy.
//!
//! `optional` is not positional: wherever it is declared, it folds into one
//! policy checked once per field instance before any step runs.

use serde::{Deserialize, Serialize};

use crate::value::FieldValue;

/// Options for `optional_with`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionalOptions {
    /// Also treat `null` as absent.
    pub nullable: bool,
    /// Treat every falsy value as absent.
    pub check_falsy: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OptionalPolicy {
    pub enabled: bool,
    pub nullable: bool,
    pub check_falsy: bool,
}

impl OptionalPolicy {
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn from_options(options: OptionalOptions) -> Self {
        OptionalPolicy {
            enabled: true,
            nullable: options.nullable,
            check_falsy: options.check_falsy,
        }
    }

    /// Whether `value` counts as absent, in which case the chain is skipped
    /// for this field instance.
    pub fn is_absent(&self, value: &FieldValue) -> bool {
        if !self.enabled {
            return false;
        }
        if self.check_falsy {
            return value.is_falsy();
        }
        if self.nullable {
            return value.is_undefined() || value.is_null();
        }
        value.is_undefined()
    }
}
