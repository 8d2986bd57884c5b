//! Chain declaration.
//!
//! A chain is declared through a fluent [`ChainBuilder`], one call per step,
//! and finished with [`ChainBuilder::build`]:
//!
//! ```rust
//! use fieldchain::{body, BailOptions};
//!
//! let chain = body("email")
//!     .optional()
//!     .trim()
//!     .not_empty()
//!     .with_message("email is required")
//!     .bail_with(BailOptions::request())
//!     .matches(r"^[^@\s]+@[^@\s]+$")
//!     .build()
//!     .expect("valid chain");
//! assert!(chain.optional_policy().enabled);
//! ```

use regex::Regex;
use std::future::Future;
use std::sync::Arc;

use crate::bail::BailOptions;
use crate::builtin::{self, ArrayOptions, ExistsOptions, LengthOptions, ObjectOptions};
use crate::condition::Condition;
use crate::context::{Context, FieldMeta};
use crate::enums::Location;
use crate::error::ChainError;
use crate::optional::{OptionalOptions, OptionalPolicy};
use crate::selector::Selector;
use crate::step::{
    AsyncFnCheck, AsyncFnSanitize, Check, CheckResult, FnCheck, FnSanitize, Sanitize,
    SanitizerStep, Step, ValidatorKind, ValidatorStep,
};
use crate::value::FieldValue;

// ─── Entry points ───────────────────────────────────────────────────────────

pub fn body(selector: &str) -> ChainBuilder {
    ChainBuilder::new(&[Location::Body], selector)
}

pub fn query(selector: &str) -> ChainBuilder {
    ChainBuilder::new(&[Location::Query], selector)
}

pub fn param(selector: &str) -> ChainBuilder {
    ChainBuilder::new(&[Location::Params], selector)
}

pub fn cookie(selector: &str) -> ChainBuilder {
    ChainBuilder::new(&[Location::Cookies], selector)
}

/// Header names are matched lower-cased.
pub fn header(selector: &str) -> ChainBuilder {
    ChainBuilder::new(&[Location::Headers], &selector.to_ascii_lowercase())
}

/// Selects the field in every location.
pub fn check(selector: &str) -> ChainBuilder {
    ChainBuilder::new(&Location::ALL, selector)
}

// ─── Builder ────────────────────────────────────────────────────────────────

/// Fluent declaration of a chain. Every step method consumes and returns the
/// builder.
#[derive(Clone, Debug)]
#[must_use = "builder methods must be chained or built"]
pub struct ChainBuilder {
    locations: Vec<Location>,
    selector: String,
    steps: Vec<Step>,
    /// Errors found while declaring, reported by `build`.
    deferred: Vec<ChainError>,
}

impl ChainBuilder {
    pub fn new(locations: &[Location], selector: &str) -> Self {
        ChainBuilder {
            locations: locations.to_vec(),
            selector: selector.to_string(),
            steps: Vec::new(),
            deferred: Vec::new(),
        }
    }

    /// Declared steps, including modifiers, in order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    fn push(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Appends any validator.
    pub fn validator(self, name: &str, kind: ValidatorKind, check: impl Check + 'static) -> Self {
        self.push(Step::Validator(ValidatorStep::new(name, kind, Arc::new(check))))
    }

    /// Appends any sanitizer.
    pub fn sanitizer(self, name: &str, sanitize: impl Sanitize + 'static) -> Self {
        self.push(Step::Sanitizer(SanitizerStep::new(name, Arc::new(sanitize))))
    }

    fn standard(self, name: &str, test: impl Fn(&FieldValue) -> bool + Send + Sync + 'static) -> Self {
        self.validator(
            name,
            ValidatorKind::Standard,
            FnCheck(move |value: &FieldValue, _: &Context<'_>| Ok(test(value))),
        )
    }

    fn transform(
        self,
        name: &str,
        f: impl Fn(&FieldValue) -> FieldValue + Send + Sync + 'static,
    ) -> Self {
        self.sanitizer(
            name,
            FnSanitize(move |value: &FieldValue, _: &Context<'_>| f(value)),
        )
    }

    // ─── Validators ─────────────────────────────────────────────────────────

    pub fn exists(self) -> Self {
        self.exists_with(ExistsOptions::default())
    }

    pub fn exists_with(self, options: ExistsOptions) -> Self {
        self.standard("exists", move |v| builtin::exists(v, &options))
    }

    pub fn not_empty(self) -> Self {
        self.standard("not_empty", |v| builtin::standard(v, builtin::not_empty))
    }

    pub fn is_string(self) -> Self {
        self.standard("is_string", FieldValue::is_string)
    }

    pub fn is_numeric(self) -> Self {
        self.standard("is_numeric", |v| builtin::standard(v, builtin::is_numeric))
    }

    pub fn is_int(self) -> Self {
        self.standard("is_int", |v| builtin::standard(v, builtin::is_int))
    }

    pub fn is_boolean(self) -> Self {
        self.standard("is_boolean", builtin::is_boolean)
    }

    pub fn is_array(self, options: ArrayOptions) -> Self {
        self.standard("is_array", move |v| builtin::is_array(v, &options))
    }

    pub fn is_object(self, options: ObjectOptions) -> Self {
        self.standard("is_object", move |v| builtin::is_object(v, &options))
    }

    pub fn equals(self, comparison: impl Into<String>) -> Self {
        let comparison = comparison.into();
        self.standard("equals", move |v| builtin::standard(v, |s| s == comparison))
    }

    pub fn is_in<I, S>(self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let options: Vec<String> = options.into_iter().map(Into::into).collect();
        self.standard("is_in", move |v| builtin::standard(v, |s| builtin::is_in(s, &options)))
    }

    pub fn contains(self, seed: impl Into<String>) -> Self {
        let seed = seed.into();
        self.standard("contains", move |v| builtin::standard(v, |s| s.contains(seed.as_str())))
    }

    /// Tests the string form against a regular expression. An invalid
    /// pattern makes `build` fail.
    pub fn matches(mut self, pattern: &str) -> Self {
        match Regex::new(pattern) {
            Ok(re) => self.standard("matches", move |v| builtin::standard(v, |s| re.is_match(s))),
            Err(e) => {
                self.deferred.push(ChainError::InvalidPattern {
                    pattern: pattern.to_string(),
                    message: e.to_string(),
                });
                self
            }
        }
    }

    pub fn is_length(self, options: LengthOptions) -> Self {
        self.standard("is_length", move |v| {
            builtin::standard(v, |s| builtin::is_length(s, &options))
        })
    }

    /// Appends a synchronous custom validator.
    pub fn custom<F>(self, f: F) -> Self
    where
        F: Fn(&FieldValue, &Context<'_>) -> CheckResult + Send + Sync + 'static,
    {
        self.validator("custom", ValidatorKind::Custom, FnCheck(f))
    }

    /// Appends an asynchronous custom validator.
    pub fn custom_async<F, Fut>(self, f: F) -> Self
    where
        F: Fn(FieldValue, FieldMeta) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CheckResult> + Send + 'static,
    {
        self.validator("custom", ValidatorKind::Custom, AsyncFnCheck(f))
    }

    // ─── Sanitizers ─────────────────────────────────────────────────────────

    /// Replaces undefined, null, `NaN` and `""` with `default`.
    pub fn default_to(self, default: impl Into<FieldValue>) -> Self {
        let default = default.into();
        self.transform("default", move |v| builtin::default_to(v, &default))
    }

    pub fn replace<I, T>(self, from: I, to: impl Into<FieldValue>) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<FieldValue>,
    {
        let from: Vec<FieldValue> = from.into_iter().map(Into::into).collect();
        let to = to.into();
        self.transform("replace", move |v| builtin::replace(v, &from, &to))
    }

    pub fn to_array(self) -> Self {
        self.transform("to_array", builtin::to_array)
    }

    pub fn trim(self) -> Self {
        self.transform("trim", builtin::trim)
    }

    pub fn to_lower_case(self) -> Self {
        self.transform("to_lower_case", builtin::to_lower_case)
    }

    pub fn to_upper_case(self) -> Self {
        self.transform("to_upper_case", builtin::to_upper_case)
    }

    pub fn to_int(self) -> Self {
        self.transform("to_int", builtin::to_int)
    }

    pub fn to_float(self) -> Self {
        self.transform("to_float", builtin::to_float)
    }

    pub fn to_boolean(self, strict: bool) -> Self {
        self.transform("to_boolean", move |v| builtin::to_boolean(v, strict))
    }

    pub fn custom_sanitizer<F>(self, f: F) -> Self
    where
        F: Fn(&FieldValue, &Context<'_>) -> FieldValue + Send + Sync + 'static,
    {
        self.sanitizer("custom_sanitizer", FnSanitize(f))
    }

    pub fn custom_sanitizer_async<F, Fut>(self, f: F) -> Self
    where
        F: Fn(FieldValue, FieldMeta) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = FieldValue> + Send + 'static,
    {
        self.sanitizer("custom_sanitizer", AsyncFnSanitize(f))
    }

    // ─── Modifiers ──────────────────────────────────────────────────────────

    /// Negates the next step's outcome if it is a validator.
    pub fn not(self) -> Self {
        self.push(Step::Not)
    }

    /// Stops this field instance if any earlier validator failed.
    pub fn bail(self) -> Self {
        self.bail_with(BailOptions::default())
    }

    pub fn bail_with(self, options: BailOptions) -> Self {
        self.push(Step::Bail(options))
    }

    /// Skips the whole chain when the value is undefined.
    pub fn optional(self) -> Self {
        self.optional_with(OptionalOptions::default())
    }

    pub fn optional_with(self, options: OptionalOptions) -> Self {
        self.push(Step::Optional(options))
    }

    /// Overrides the failure message of the validator declared just before.
    pub fn with_message(self, message: impl Into<String>) -> Self {
        self.push(Step::Message(message.into()))
    }

    /// Continues only while `predicate` returns `Ok(true)`.
    pub fn when<F>(self, predicate: F) -> Self
    where
        F: Fn(&FieldValue, &Context<'_>) -> CheckResult + Send + Sync + 'static,
    {
        self.push(Step::Conditional(Condition::Check(Arc::new(FnCheck(predicate)))))
    }

    pub fn when_async<F, Fut>(self, predicate: F) -> Self
    where
        F: Fn(FieldValue, FieldMeta) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CheckResult> + Send + 'static,
    {
        self.push(Step::Conditional(Condition::Check(Arc::new(AsyncFnCheck(
            predicate,
        )))))
    }

    /// Continues only if `chain`, run against the same request, records no
    /// failures.
    pub fn when_valid(self, chain: ValidationChain) -> Self {
        self.push(Step::Conditional(Condition::Chain(Box::new(chain))))
    }

    // ─── Build ──────────────────────────────────────────────────────────────

    /// Validates the declaration and folds the non-positional modifiers.
    ///
    /// All `optional` calls collapse into one chain policy; the last one
    /// wins. Each `with_message` binds to the validator directly before it.
    pub fn build(self) -> Result<ValidationChain, ChainError> {
        if let Some(e) = self.deferred.into_iter().next() {
            return Err(e);
        }
        if self.locations.is_empty() {
            return Err(ChainError::EmptyLocations);
        }
        let selector = Selector::parse(&self.selector)?;

        let mut optional = OptionalPolicy::disabled();
        let mut steps: Vec<Step> = Vec::with_capacity(self.steps.len());

        // Whether the step declared just before is a validator.
        let mut after_validator = false;

        for (index, step) in self.steps.into_iter().enumerate() {
            let is_validator = matches!(step, Step::Validator(_));
            match step {
                Step::Optional(options) => optional = OptionalPolicy::from_options(options),
                Step::Message(message) => match steps.last_mut() {
                    Some(Step::Validator(validator)) if after_validator => {
                        validator.message = Some(message)
                    }
                    _ => return Err(ChainError::MisplacedMessage { index }),
                },
                other => steps.push(other),
            }
            after_validator = is_validator;
        }

        Ok(ValidationChain {
            locations: self.locations,
            selector,
            steps,
            optional,
        })
    }
}

// ─── Built chain ────────────────────────────────────────────────────────────

/// A built chain, ready to run against any number of requests.
#[derive(Clone, Debug)]
pub struct ValidationChain {
    pub(crate) locations: Vec<Location>,
    pub(crate) selector: Selector,
    pub(crate) steps: Vec<Step>,
    pub(crate) optional: OptionalPolicy,
}

impl ValidationChain {
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Runtime steps, with `optional` and `with_message` folded away.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn optional_policy(&self) -> OptionalPolicy {
        self.optional
    }
}
