//! Closed enumerations used throughout the chain model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which sub-object of the request a field is read from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    Body,
    Cookies,
    Headers,
    Params,
    Query,
}

impl Location {
    /// Every location, in the order `check()` visits them.
    pub const ALL: [Location; 5] = [
        Location::Body,
        Location::Cookies,
        Location::Headers,
        Location::Params,
        Location::Query,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Body => "body",
            Location::Cookies => "cookies",
            Location::Headers => "headers",
            Location::Params => "params",
            Location::Query => "query",
        }
    }

    pub fn from_name(name: &str) -> Option<Location> {
        Location::ALL.into_iter().find(|l| l.as_str() == name)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scope of a bail point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BailLevel {
    /// Stop the remaining steps of the current field instance.
    #[default]
    Chain,
    /// Additionally keep every chain not yet started from running.
    Request,
}

/// Which values `exists` rejects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExistsMode {
    #[default]
    Undefined,
    Null,
    Falsy,
}

/// Why a field instance's pipeline stopped before its last step.
///
/// None of these record a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The optional policy judged the value absent.
    OptionalSkip,
    /// A condition was false or errored.
    ConditionAbort,
    /// A chain-level bail point was reached after a failure.
    Bail,
    /// A request-level bail point was reached after a failure.
    RequestBail,
}
