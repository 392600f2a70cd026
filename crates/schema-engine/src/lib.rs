//! A JSON Schema compiler and evaluator.
//!
//! The crate is split in two halves that communicate through a single intermediate
//! representation ([`ir::Template`]):
//!
//! - a **compiler** that frames a schema document (via [`schema_frame::FrameIndexer`]), walks
//!   it keyword by keyword, and lowers it to a Template;
//! - an **evaluator** ([`evaluator`]) that interprets a Template against a JSON instance,
//!   knowing nothing about JSON Schema keywords, only about the step vocabulary in [`ir`].
//!
//! # Compiling and validating
//!
//! ```
//! # async fn run() -> Result<(), schema_engine::Error> {
//! use schema_engine::{CompilationOptions, Validator};
//! use serde_json::json;
//!
//! let schema = json!({"type": "string", "minLength": 3});
//! let validator = Validator::compile(schema, &CompilationOptions::new()).await?;
//!
//! assert!(validator.is_valid(&json!("hello")));
//! assert!(!validator.is_valid(&json!("hi")));
//! # Ok(())
//! # }
//! ```
//!
//! # Collecting diagnostics
//!
//! [`Validator::evaluate`] drives the evaluator directly, invoking a callback once per step so
//! a caller can build a structured error report (or, in [`Mode::Exhaustive`], every failing
//! one) instead of a single boolean:
//!
//! ```
//! # async fn run() -> Result<(), schema_engine::Error> {
//! use schema_engine::{CompilationOptions, EvaluationOptions, Mode, NeverCancelled, Validator};
//! use serde_json::json;
//!
//! let schema = json!({"type": "string", "minLength": 3});
//! let validator = Validator::compile(schema, &CompilationOptions::new()).await?;
//!
//! let mut failures = Vec::new();
//! let options = EvaluationOptions::new().mode(Mode::Exhaustive);
//! validator.evaluate(&json!("hi"), &options, &NeverCancelled, &mut |result, step, _, location, _, _| {
//!     if !result {
//!         failures.push((location.to_string(), schema_engine::describe_step(step)));
//!     }
//! })?;
//! assert!(!failures.is_empty());
//! # Ok(())
//! # }
//! ```
//!
//! # External references
//!
//! Schemas that `$ref` another document resolve through a [`schema_frame::SchemaResolver`]:
//!
//! ```
//! # async fn run() -> Result<(), schema_engine::Error> {
//! use ahash::AHashMap;
//! use schema_engine::{CompilationOptions, Validator};
//! use schema_frame::MapResolver;
//! use serde_json::json;
//!
//! let mut documents = AHashMap::default();
//! documents.insert(
//!     "https://example.com/person.json".to_string(),
//!     json!({"type": "object", "required": ["name"]}),
//! );
//! let resolver = MapResolver::new(documents);
//!
//! let schema = json!({"$ref": "https://example.com/person.json"});
//! let validator = Validator::compile_with_resolver(schema, &resolver, &CompilationOptions::new()).await?;
//!
//! assert!(validator.is_valid(&json!({"name": "Alice"})));
//! assert!(!validator.is_valid(&json!({})));
//! # Ok(())
//! # }
//! ```
mod compiler;
mod equal;
mod formats;
mod keywords;
mod unique;

pub mod diagnostics;
pub mod error;
pub mod evaluator;
pub mod ir;
pub mod options;
pub mod primitive_type;

pub use compiler::CompiledSchema;
pub use diagnostics::{describe_step, keyword_rank, Diagnostic, KEYWORD_RANK};
pub use error::{Error, Result};
pub use evaluator::{CancellationToken, DiagnosticCallback, NeverCancelled};
pub use ir::{CompiledRegex, DescendInto, Step, StepKind, StepLocation, StringFormat, Target, Template};
pub use options::{CompilationOptions, EvaluationOptions, Mode};
pub use primitive_type::PrimitiveType;

use schema_frame::{DefaultWalker, FrameIndexer, MapResolver, SchemaResolver};
use serde_json::Value;

/// A compiled schema, ready to validate instances against.
///
/// Compilation resolves every external `$ref`, unrolls recursive references, and lowers every
/// recognized keyword to a [`Template`]; evaluating a [`Validator`] never performs I/O.
#[derive(Debug, Clone)]
pub struct Validator {
    compiled: CompiledSchema,
}

impl Validator {
    /// Compile `schema`, resolving any external references through `resolver`.
    ///
    /// # Errors
    ///
    /// See [`Error`]: malformed schemas, unresolvable dialects, unresolvable references, and
    /// invariant violations in the compiler all surface here.
    pub async fn compile_with_resolver(
        schema: Value,
        resolver: &dyn SchemaResolver,
        options: &CompilationOptions,
    ) -> Result<Self> {
        let indexer = FrameIndexer::new(resolver, options.default_dialect);
        let frame = indexer.index(schema, None).await?;
        let compiled = compiler::compile(&frame, &DefaultWalker, options)?;
        Ok(Self { compiled })
    }

    /// Compile `schema`, rejecting any `$ref` that points outside the document itself.
    ///
    /// # Errors
    ///
    /// As [`Validator::compile_with_resolver`]; additionally fails if `schema` references an
    /// external document, since the no-op resolver never resolves one.
    pub async fn compile(schema: Value, options: &CompilationOptions) -> Result<Self> {
        Self::compile_with_resolver(schema, &MapResolver::default(), options).await
    }

    /// Evaluate `instance` in [`Mode::Fast`] and return only the boolean verdict, discarding
    /// every diagnostic. The cheapest way to ask "is this instance valid".
    ///
    /// # Panics
    ///
    /// Panics if evaluation is cancelled or exceeds the recursion limit, which cannot happen
    /// with [`NeverCancelled`] and the default recursion limit respectively.
    #[must_use]
    pub fn is_valid(&self, instance: &Value) -> bool {
        let options = EvaluationOptions::new();
        self.evaluate(instance, &options, &NeverCancelled, &mut |_, _, _, _, _, _| {})
            .expect("Fast mode with NeverCancelled and the default recursion limit never errors")
    }

    /// Evaluate `instance` against this schema, invoking `callback` once per step.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RecursionLimitExceeded`] or [`Error::Cancelled`]; see [`evaluator`].
    pub fn evaluate(
        &self,
        instance: &Value,
        options: &EvaluationOptions,
        cancellation: &dyn CancellationToken,
        callback: &mut DiagnosticCallback<'_>,
    ) -> Result<bool> {
        evaluator::evaluate(self.compiled.template(), instance, options, cancellation, callback)
    }

    /// The compiled program, for introspection.
    #[must_use]
    pub fn template(&self) -> &Template {
        self.compiled.template()
    }

    /// Keywords this validator's schema used that no configured walker recognized. Never
    /// affects the verdict (§4.G); exposed for diagnostics.
    #[must_use]
    pub fn unmatched_keywords(&self) -> &[String] {
        self.compiled.unmatched_keywords()
    }
}

/// Compile `schema` and report whether `instance` validates against it in one call, using the
/// default dialect (Draft 2020-12) when `schema` declares none and no resolver for external
/// references. A convenience wrapper, not a substitute for [`Validator`] when validating more
/// than one instance against the same schema.
///
/// # Errors
///
/// See [`Validator::compile`].
pub async fn is_valid(schema: Value, instance: &Value) -> Result<bool> {
    let validator = Validator::compile(schema, &CompilationOptions::new()).await?;
    Ok(validator.is_valid(instance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn compile(schema: Value) -> Validator {
        Validator::compile(schema, &CompilationOptions::new())
            .await
            .expect("schema should compile")
    }

    #[tokio::test]
    async fn validates_a_simple_string_schema() {
        let validator = compile(json!({"type": "string", "minLength": 3})).await;
        assert!(validator.is_valid(&json!("hello")));
        assert!(!validator.is_valid(&json!("hi")));
        assert!(!validator.is_valid(&json!(5)));
    }

    #[tokio::test]
    async fn unknown_keywords_are_recorded_but_do_not_affect_the_verdict() {
        let validator = compile(json!({"type": "string", "x-vendor-extension": 42})).await;
        assert!(validator.is_valid(&json!("ok")));
        assert_eq!(validator.unmatched_keywords(), &["x-vendor-extension".to_string()]);
    }

    #[tokio::test]
    async fn exhaustive_mode_collects_every_failing_step() {
        let validator = compile(json!({"type": "string", "minLength": 10, "pattern": "^z"})).await;
        let mut failures = Vec::new();
        let options = EvaluationOptions::new().mode(Mode::Exhaustive);
        validator
            .evaluate(&json!("abc"), &options, &NeverCancelled, &mut |result, step, _, _, _, _| {
                if !result {
                    failures.push(describe_step(step));
                }
            })
            .unwrap();
        assert_eq!(failures.len(), 2);
    }

    #[tokio::test]
    async fn external_references_resolve_through_a_map_resolver() {
        let mut documents = ahash::AHashMap::default();
        documents.insert(
            "https://example.com/person.json".to_string(),
            json!({"type": "object", "required": ["name"]}),
        );
        let resolver = MapResolver::new(documents);
        let schema = json!({"$ref": "https://example.com/person.json"});
        let validator = Validator::compile_with_resolver(schema, &resolver, &CompilationOptions::new())
            .await
            .unwrap();
        assert!(validator.is_valid(&json!({"name": "Alice"})));
        assert!(!validator.is_valid(&json!({})));
    }

    #[tokio::test]
    async fn recursive_schemas_unroll_through_a_control_label() {
        let schema = json!({
            "type": "object",
            "properties": {
                "children": {"type": "array", "items": {"$ref": "#"}}
            }
        });
        let validator = compile(schema).await;
        assert!(validator.is_valid(&json!({"children": [{"children": []}, {"children": [{"children": []}]}]})));
        assert!(!validator.is_valid(&json!({"children": [{"children": "nope"}]})));
    }
}
