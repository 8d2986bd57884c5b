//! Conditions guarding the rest of a pipeline.

use futures::future::FutureExt;
use std::fmt;
use std::sync::Arc;

use crate::bail::BailFlag;
use crate::chain::ValidationChain;
use crate::context::Context;
use crate::error::ErrorCollector;
use crate::executor;
use crate::request::Scope;
use crate::step::{Check, StepFuture};

/// The predicate of a `when` step.
#[derive(Clone)]
pub enum Condition {
    /// A predicate function; `Ok(true)` continues.
    Check(Arc<dyn Check>),
    /// Another chain; continues when it records no failures.
    Chain(Box<ValidationChain>),
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Check(_) => f.write_str("Condition::Check"),
            Condition::Chain(chain) => f.debug_tuple("Condition::Chain").field(chain).finish(),
        }
    }
}

/// Evaluates a condition for the context's current value.
///
/// A predicate error counts as false. A nested chain runs against the same
/// request as a dry run, with a scratch collector and its own bail flag, so
/// neither its failures nor a request-level bail inside it reach the outer
/// request.
pub(crate) fn evaluate<'a>(condition: &'a Condition, ctx: &'a Context<'_>) -> StepFuture<'a, bool> {
    match condition {
        Condition::Check(check) => async move {
            check.check(ctx.value(), ctx).await.unwrap_or(false)
        }
        .boxed(),
        Condition::Chain(chain) => {
            let outer = ctx.scope();
            async move {
                let scratch = ErrorCollector::new();
                let bail = BailFlag::default();
                let scope = Scope {
                    request: outer.request,
                    errors: &scratch,
                    bail: &bail,
                    dry_run: true,
                };
                executor::execute(chain, scope).await;
                scratch.is_empty()
            }
            .boxed()
        }
    }
}
