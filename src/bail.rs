//! Bail points: chain-scope stops and the request-scope flag.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::enums::BailLevel;

/// Options for a `bail` step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BailOptions {
    pub level: BailLevel,
}

impl BailOptions {
    pub fn request() -> Self {
        BailOptions {
            level: BailLevel::Request,
        }
    }
}

/// Outcome of reaching a bail point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BailDecision {
    /// Stop the remaining steps of this field instance.
    pub stop: bool,
    /// Raise the request-level flag.
    pub raise_request: bool,
}

/// Decides what a bail point does given the instance's failure state.
pub fn decide(chain_failed: bool, options: &BailOptions) -> BailDecision {
    BailDecision {
        stop: chain_failed,
        raise_request: chain_failed && options.level == BailLevel::Request,
    }
}

/// The request-level bail flag. Once raised it stays raised.
#[derive(Debug, Default)]
pub struct BailFlag(AtomicBool);

impl BailFlag {
    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Applies a decision, raising the flag if asked to.
    pub(crate) fn apply(&self, decision: BailDecision) {
        if decision.raise_request {
            self.0.store(true, Ordering::Release);
        }
    }
}
