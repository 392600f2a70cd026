//! The compiler (§4.G): walks a framed schema keyword-by-keyword and emits a [`Template`].
use std::cell::RefCell;

use ahash::AHashSet;
use schema_frame::{Classification, Dialect, Frame, Pointer, SchemaWalker};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::ir::{Step, StepKind, StepLocation, Target, Template};
use crate::keywords;
use crate::options::CompilationOptions;
use crate::primitive_type::PrimitiveType;

/// Shared, read-mostly state threaded through one top-level [`compile`] call. Interior
/// mutability is confined to `labels` (which `$ref` destinations have already been unrolled)
/// and `unmatched` (keywords no walker recognized, kept for diagnostics).
pub(crate) struct CompileCtx<'a> {
    pub frame: &'a Frame,
    pub walker: &'a dyn SchemaWalker,
    pub options: &'a CompilationOptions,
    pub labels: RefCell<AHashSet<u64>>,
    pub unmatched: RefCell<Vec<String>>,
}

/// The result of compiling a schema: the program the evaluator runs, plus bookkeeping kept
/// for diagnostics.
#[derive(Debug, Clone)]
pub struct CompiledSchema {
    pub(crate) template: Template,
    pub(crate) unmatched_keywords: Vec<String>,
}

impl CompiledSchema {
    /// The compiled program.
    #[must_use]
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Keywords encountered during compilation that no configured [`SchemaWalker`] recognized.
    /// Recorded for diagnostics; they never affect the verdict (§4.G).
    #[must_use]
    pub fn unmatched_keywords(&self) -> &[String] {
        &self.unmatched_keywords
    }
}

/// Compile the root schema indexed in `frame` into a [`CompiledSchema`].
///
/// # Errors
///
/// Returns [`Error::Compile`] for structural problems (a boolean-or-object violation, an
/// unresolvable label), [`Error::InvalidMultipleOf`] for a non-positive `multipleOf`, and
/// [`Error::InvalidPattern`] for a pattern that does not parse as a regular expression.
pub fn compile(frame: &Frame, walker: &dyn SchemaWalker, options: &CompilationOptions) -> Result<CompiledSchema> {
    let _span = tracing::debug_span!("compile", uri = %frame.root_uri()).entered();
    let ctx = CompileCtx {
        frame,
        walker,
        options,
        labels: RefCell::new(AHashSet::default()),
        unmatched: RefCell::new(Vec::new()),
    };
    let root_entry = frame.root_entry();
    let document = frame
        .document(&root_entry.document_uri)
        .ok_or_else(|| Error::compile(Pointer::root(), "root document not resident"))?;
    let root_value = root_entry
        .pointer
        .resolve(&document)
        .ok_or_else(|| Error::compile(Pointer::root(), "root pointer does not resolve"))?;
    let template = compile_value(&ctx, root_value, root_entry.pointer.clone(), root_entry.dialect)?;
    Ok(CompiledSchema {
        template,
        unmatched_keywords: ctx.unmatched.into_inner(),
    })
}

/// Compile one schema value (boolean or object) at `schema_pointer`. The sole recursive entry
/// point every keyword handler calls back into for nested subschemas.
pub(crate) fn compile_value(
    ctx: &CompileCtx,
    value: &Value,
    schema_pointer: Pointer,
    dialect: Dialect,
) -> Result<Template> {
    match value {
        Value::Bool(true) => Ok(Vec::new()),
        Value::Bool(false) => Ok(vec![Step::leaf(
            StepKind::Never,
            Target::Instance,
            None,
            StepLocation::new(schema_pointer, "<boolean>"),
        )]),
        Value::Object(node) => compile_object(ctx, node, schema_pointer, dialect),
        _ => Err(Error::compile(schema_pointer, "a schema must be a boolean or an object")),
    }
}

fn compile_object(
    ctx: &CompileCtx,
    node: &serde_json::Map<String, Value>,
    schema_pointer: Pointer,
    dialect: Dialect,
) -> Result<Template> {
    let mut steps = Vec::new();

    // `$ref`/`$dynamicRef`/`$recursiveRef` are resolved against the frame's pre-computed
    // reference list rather than through the generic keyword dispatch below, since their
    // children come from a different schema location entirely.
    for (keyword, _dynamic) in dialect.reference_keywords() {
        if node.contains_key(*keyword) {
            steps.extend(keywords::ref_::compile(ctx, &schema_pointer, keyword)?);
        }
    }
    let ref_present = dialect
        .reference_keywords()
        .iter()
        .any(|(keyword, _)| node.contains_key(*keyword));
    let pre_2019_09 = matches!(dialect, Dialect::Draft4 | Dialect::Draft6 | Dialect::Draft7);
    if ref_present && pre_2019_09 {
        // Draft 4-7: `$ref` overrides every sibling keyword.
        return Ok(steps);
    }

    for (keyword, value) in node {
        if dialect.reference_keywords().iter().any(|(k, _)| k == keyword) {
            continue;
        }
        let keyword_pointer = schema_pointer.with_key(keyword.clone());
        match ctx.walker.classify(dialect, keyword) {
            Classification::Assertion | Classification::ApplicatorWithSubschemas => {
                steps.extend(keywords::dispatch(
                    ctx,
                    keyword,
                    node,
                    value,
                    &schema_pointer,
                    &keyword_pointer,
                    dialect,
                )?);
            }
            Classification::Annotation => {
                if keyword == "format" {
                    steps.extend(keywords::format::compile(value, &keyword_pointer));
                } else {
                    steps.push(Step::leaf(
                        StepKind::AnnotationPublic(value.clone()),
                        Target::Instance,
                        None,
                        StepLocation::new(keyword_pointer, keyword.clone()),
                    ));
                }
            }
            Classification::Unknown => {
                ctx.unmatched.borrow_mut().push(keyword.clone());
            }
        }
    }
    Ok(steps)
}

/// Build a one-step condition Template asserting the instance is one of `types`, gating an
/// assertion keyword the way `maximum`/`minLength`/`properties`/etc. gate themselves on the
/// instance's type (§4.G).
pub(crate) fn type_condition(pointer: &Pointer, keyword: &str, types: &[PrimitiveType]) -> Template {
    let location = StepLocation::new(pointer.clone(), keyword);
    let kind = match types {
        [single] => StepKind::TypeStrict(*single),
        many => StepKind::TypeStrictAny(many.to_vec()),
    };
    vec![Step::leaf(kind, Target::Instance, None, location)]
}
