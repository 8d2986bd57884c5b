//! Runs a chain's steps against every field instance its selector matches.
//!
//! For each instance the executor:
//!
//! 1. skips the instance when the optional policy judges the value absent,
//! 2. walks the steps in order, awaiting each one before the next starts,
//! 3. records failures into the request's collector as they happen.
//!
//! A chain whose request has already bailed is not started at all.
//! Instances of a wildcard selector run concurrently; steps within one
//! instance never do. There is no timeout: a custom step that never resolves
//! holds up the whole request.

use futures::future::{FutureExt, join_all};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::bail;
use crate::chain::ValidationChain;
use crate::condition;
use crate::context::Context;
use crate::enums::{Location, StopReason};
use crate::error::FailureRecord;
use crate::request::{RequestState, Scope};
use crate::selector::FieldPath;
use crate::step::{DEFAULT_MESSAGE, Step, StepFuture, ValidatorStep};
use crate::value::FieldValue;

/// Options for a single chain run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunOptions {
    /// Keep sanitized values out of the request.
    pub dry_run: bool,
}

/// What happened to one matched field instance.
#[derive(Clone, Debug, PartialEq)]
pub struct InstanceReport {
    pub location: Location,
    pub path: FieldPath,
    /// Final value after every sanitizer that ran.
    pub value: FieldValue,
    /// Set when the pipeline stopped early.
    pub stop: Option<StopReason>,
}

/// Result of one chain run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChainResult {
    /// Failures this run appended, in order.
    pub errors: Vec<FailureRecord>,
    pub instances: Vec<InstanceReport>,
    /// The chain never started because the request had bailed.
    pub skipped: bool,
}

impl ChainResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

impl ValidationChain {
    /// Runs the chain against the request held by `state`.
    pub async fn run(&self, state: &RequestState) -> ChainResult {
        self.run_with(state, RunOptions::default()).await
    }

    pub async fn run_with(&self, state: &RequestState, options: RunOptions) -> ChainResult {
        execute(self, state.scope(options.dry_run)).await
    }
}

pub(crate) fn execute<'a>(chain: &'a ValidationChain, scope: Scope<'a>) -> StepFuture<'a, ChainResult> {
    async move {
        if scope.bail.is_raised() {
            debug!(selector = %chain.selector, "request bailed, chain not started");
            return ChainResult {
                skipped: true,
                ..ChainResult::default()
            };
        }

        let instances = select_instances(chain, &scope);
        trace!(
            selector = %chain.selector,
            instances = instances.len(),
            "running chain"
        );

        let outcomes = join_all(
            instances
                .into_iter()
                .map(|(location, path, value)| run_instance(chain, scope, location, path, value)),
        )
        .await;

        let mut result = ChainResult::default();
        for (report, errors) in outcomes {
            result.errors.extend(errors);
            result.instances.push(report);
        }
        result
    }
    .boxed()
}

/// Expands the selector in every chain location, in location order.
///
/// Across several locations, undefined instances are dropped when any
/// location holds the field; when none does, a single undefined instance
/// remains so required-field checks still fail once.
fn select_instances(
    chain: &ValidationChain,
    scope: &Scope<'_>,
) -> Vec<(Location, FieldPath, FieldValue)> {
    let request = scope.request.read();
    let mut instances: Vec<_> = chain
        .locations
        .iter()
        .flat_map(|&location| {
            chain
                .selector
                .expand(request.location(location))
                .into_iter()
                .map(move |(path, value)| (location, path, value))
        })
        .collect();

    if chain.locations.len() > 1 {
        if instances.iter().any(|(_, _, value)| !value.is_undefined()) {
            instances.retain(|(_, _, value)| !value.is_undefined());
        } else {
            instances.truncate(1);
        }
    }
    instances
}

async fn run_instance(
    chain: &ValidationChain,
    scope: Scope<'_>,
    location: Location,
    path: FieldPath,
    value: FieldValue,
) -> (InstanceReport, Vec<FailureRecord>) {
    let mut ctx = Context::new(location, path, value, scope);
    let mut errors = Vec::new();
    let stop = run_steps(chain, &mut ctx, &mut errors).await;
    let report = InstanceReport {
        location,
        path: ctx.path().clone(),
        value: ctx.value().clone(),
        stop,
    };
    (report, errors)
}

async fn run_steps(
    chain: &ValidationChain,
    ctx: &mut Context<'_>,
    errors: &mut Vec<FailureRecord>,
) -> Option<StopReason> {
    if chain.optional.is_absent(ctx.original_value()) {
        trace!(location = %ctx.location(), path = %ctx.path(), "optional field absent, skipping");
        return Some(StopReason::OptionalSkip);
    }

    let mut chain_failed = false;
    let mut pending_negate = false;

    for step in &chain.steps {
        match step {
            Step::Not => pending_negate = true,
            Step::Bail(options) => {
                let decision = bail::decide(chain_failed, options);
                if decision.stop {
                    ctx.scope().bail.apply(decision);
                    if decision.raise_request {
                        debug!(location = %ctx.location(), path = %ctx.path(), "request-level bail");
                        return Some(StopReason::RequestBail);
                    }
                    trace!(location = %ctx.location(), path = %ctx.path(), "bail");
                    return Some(StopReason::Bail);
                }
            }
            Step::Conditional(condition) => {
                pending_negate = false;
                if !condition::evaluate(condition, ctx).await {
                    trace!(location = %ctx.location(), path = %ctx.path(), "condition not met");
                    return Some(StopReason::ConditionAbort);
                }
            }
            Step::Validator(validator) => {
                let negate = std::mem::take(&mut pending_negate);
                if let Some(record) = run_validator(validator, negate, ctx).await {
                    chain_failed = true;
                    ctx.scope().errors.append(record.clone());
                    errors.push(record);
                }
            }
            Step::Sanitizer(sanitizer) => {
                pending_negate = false;
                let sanitized = sanitizer.sanitize.sanitize(ctx.value(), ctx).await;
                ctx.replace_value(sanitized);
            }
            // Folded away when the chain is built.
            Step::Optional(_) | Step::Message(_) => {}
        }
    }

    None
}

/// Runs one validator, returning a failure record if it failed.
async fn run_validator(
    validator: &ValidatorStep,
    negate: bool,
    ctx: &Context<'_>,
) -> Option<FailureRecord> {
    let (passed, error_message) = match validator.check.check(ctx.value(), ctx).await {
        Ok(passed) => (passed, None),
        Err(e) => (false, e.message),
    };

    if passed != negate {
        return None;
    }

    let message = validator
        .message
        .clone()
        .or(error_message)
        .unwrap_or_else(|| DEFAULT_MESSAGE.to_string());

    debug!(
        location = %ctx.location(),
        path = %ctx.path(),
        validator = %validator.name,
        negated = negate,
        %message,
        "validation failed"
    );

    Some(FailureRecord {
        location: ctx.location(),
        path: ctx.path().to_string(),
        value: ctx.value().clone(),
        message,
    })
}
