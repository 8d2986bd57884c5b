//! Ordered validation and sanitization chains for fields of a request.
//!
//! A request is split into locations (`body`, `cookies`, `headers`,
//! `params`, `query`). A chain selects fields in one or more locations and
//! runs an ordered pipeline of steps against each match:
//!
//! ```text
//! body("items[*].qty") → ChainBuilder → build() → ValidationChain
//!                                                  → run(&RequestState) → ChainResult
//! ```
//!
//! Validators record failures without stopping the pipeline. Sanitizers
//! replace the value and write it back into the request. Modifiers (`not`,
//! `optional`, `with_message`, `bail`) and conditions (`when`,
//! `when_valid`) shape how the other steps run.
//!
//! # Quick Start
//!
//! ```rust
//! use fieldchain::{body, query, Location, Request};
//! use serde_json::json;
//!
//! let chains = vec![
//!     body("name").trim().not_empty().with_message("name is required").build().unwrap(),
//!     query("page").optional().is_int().to_int().build().unwrap(),
//! ];
//!
//! let request = Request::new()
//!     .with(Location::Body, json!({ "name": "  Ada  " }))
//!     .with(Location::Query, json!({ "page": "2" }));
//!
//! let validated = futures::executor::block_on(fieldchain::validate(request, &chains));
//! assert!(validated.report.is_valid());
//! assert_eq!(
//!     validated.request.to_json(),
//!     json!({ "body": { "name": "Ada" }, "query": { "page": 2 } })
//! );
//! ```

pub mod bail;
pub mod builtin;
pub mod chain;
pub mod condition;
pub mod context;
pub mod enums;
pub mod error;
pub mod executor;
pub mod optional;
pub mod request;
pub mod selector;
pub mod step;
pub mod value;

pub use bail::BailOptions;
pub use builtin::{ArrayOptions, ExistsOptions, LengthOptions, ObjectOptions};
pub use chain::{ChainBuilder, ValidationChain, body, check, cookie, header, param, query};
pub use context::{Context, FieldMeta};
pub use enums::*;
pub use error::*;
pub use executor::{ChainResult, InstanceReport, RunOptions};
pub use optional::{OptionalOptions, OptionalPolicy};
pub use request::{Request, RequestState};
pub use selector::{FieldPath, Selector};
pub use step::{CheckResult, DEFAULT_MESSAGE};
pub use value::{FieldMap, FieldValue};

/// Result of the [`validate`] convenience entry point.
#[derive(Clone, Debug, PartialEq)]
pub struct Validated {
    /// The request with every sanitized value written back.
    pub request: Request,
    pub report: ValidationReport,
}

/// Runs `chains` one after another against `request`.
///
/// Later chains see values sanitized by earlier ones. Once a request-level
/// bail fires the remaining chains are skipped.
pub async fn validate(request: Request, chains: &[ValidationChain]) -> Validated {
    let state = RequestState::new(request);
    for chain in chains {
        chain.run(&state).await;
    }
    let (request, report) = state.into_parts();
    Validated { request, report }
}
