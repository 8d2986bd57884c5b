//! Pipeline steps and the interface every opaque step function implements.
//!
//! Validators, sanitizers and condition predicates all return a boxed future.
//! Synchronous closures are wrapped in an already-ready future, so the
//! executor has a single await path for both.

use futures::future::{self, BoxFuture, FutureExt};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::bail::BailOptions;
use crate::condition::Condition;
use crate::context::{Context, FieldMeta};
use crate::error::StepError;
use crate::optional::OptionalOptions;
use crate::value::FieldValue;

/// Message used for failures without a bound message or error message.
pub const DEFAULT_MESSAGE: &str = "Invalid value";

pub type StepFuture<'a, T> = BoxFuture<'a, T>;

/// `Ok(true)` passes, `Ok(false)` and `Err(_)` fail.
pub type CheckResult = Result<bool, StepError>;

// ─── Step function interfaces ───────────────────────────────────────────────

/// A validator or condition predicate.
pub trait Check: Send + Sync {
    fn check<'a>(&'a self, value: &'a FieldValue, ctx: &'a Context<'_>)
    -> StepFuture<'a, CheckResult>;
}

/// A sanitizer. Sanitizers never fail.
pub trait Sanitize: Send + Sync {
    fn sanitize<'a>(&'a self, value: &'a FieldValue, ctx: &'a Context<'_>)
    -> StepFuture<'a, FieldValue>;
}

/// Adapts a synchronous closure into a [`Check`].
pub struct FnCheck<F>(pub F);

impl<F> Check for FnCheck<F>
where
    F: Fn(&FieldValue, &Context<'_>) -> CheckResult + Send + Sync,
{
    fn check<'a>(
        &'a self,
        value: &'a FieldValue,
        ctx: &'a Context<'_>,
    ) -> StepFuture<'a, CheckResult> {
        future::ready((self.0)(value, ctx)).boxed()
    }
}

/// Adapts an async closure into a [`Check`]. The closure receives owned
/// copies of the value and field metadata.
pub struct AsyncFnCheck<F>(pub F);

impl<F, Fut> Check for AsyncFnCheck<F>
where
    F: Fn(FieldValue, FieldMeta) -> Fut + Send + Sync,
    Fut: Future<Output = CheckResult> + Send + 'static,
{
    fn check<'a>(
        &'a self,
        value: &'a FieldValue,
        ctx: &'a Context<'_>,
    ) -> StepFuture<'a, CheckResult> {
        (self.0)(value.clone(), ctx.meta()).boxed()
    }
}

/// Adapts a synchronous closure into a [`Sanitize`].
pub struct FnSanitize<F>(pub F);

impl<F> Sanitize for FnSanitize<F>
where
    F: Fn(&FieldValue, &Context<'_>) -> FieldValue + Send + Sync,
{
    fn sanitize<'a>(
        &'a self,
        value: &'a FieldValue,
        ctx: &'a Context<'_>,
    ) -> StepFuture<'a, FieldValue> {
        future::ready((self.0)(value, ctx)).boxed()
    }
}

/// Adapts an async closure into a [`Sanitize`].
pub struct AsyncFnSanitize<F>(pub F);

impl<F, Fut> Sanitize for AsyncFnSanitize<F>
where
    F: Fn(FieldValue, FieldMeta) -> Fut + Send + Sync,
    Fut: Future<Output = FieldValue> + Send + 'static,
{
    fn sanitize<'a>(
        &'a self,
        value: &'a FieldValue,
        ctx: &'a Context<'_>,
    ) -> StepFuture<'a, FieldValue> {
        (self.0)(value.clone(), ctx.meta()).boxed()
    }
}

// ─── Steps ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidatorKind {
    /// A built-in check.
    Standard,
    /// A caller-supplied check.
    Custom,
}

#[derive(Clone)]
pub struct ValidatorStep {
    pub(crate) name: String,
    pub(crate) kind: ValidatorKind,
    pub(crate) check: Arc<dyn Check>,
    /// Bound by `with_message`.
    pub(crate) message: Option<String>,
}

impl ValidatorStep {
    pub fn new(name: impl Into<String>, kind: ValidatorKind, check: Arc<dyn Check>) -> Self {
        ValidatorStep {
            name: name.into(),
            kind,
            check,
            message: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ValidatorKind {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl fmt::Debug for ValidatorStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorStep")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("message", &self.message)
            .finish()
    }
}

#[derive(Clone)]
pub struct SanitizerStep {
    pub(crate) name: String,
    pub(crate) sanitize: Arc<dyn Sanitize>,
}

impl SanitizerStep {
    pub fn new(name: impl Into<String>, sanitize: Arc<dyn Sanitize>) -> Self {
        SanitizerStep {
            name: name.into(),
            sanitize,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for SanitizerStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SanitizerStep")
            .field("name", &self.name)
            .finish()
    }
}

/// One declared pipeline element.
///
/// `Optional` and `Message` only appear in declarations; building a chain
/// folds them into the chain policy and the preceding validator.
#[derive(Clone, Debug)]
pub enum Step {
    Validator(ValidatorStep),
    Sanitizer(SanitizerStep),
    Conditional(Condition),
    Bail(BailOptions),
    /// Negates the next non-modifier step.
    Not,
    Optional(OptionalOptions),
    Message(String),
}
