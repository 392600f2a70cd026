//! The intermediate representation the compiler emits and the evaluator interprets (§3, §4.F).
//!
//! A [`Template`] is a sequence of [`Step`]s; a step may gate its execution on a nested
//! `condition` Template and may recurse into a nested `children` Template. The evaluator
//! knows nothing about JSON Schema keywords, only about the step kinds enumerated here.
use std::fmt;
use std::sync::Arc;

use schema_frame::Pointer;
use serde_json::Value;

use crate::primitive_type::PrimitiveType;

/// A compiled program: an ordered sequence of steps, conjoined by the implicit "all must
/// hold" semantics of the schema object they were compiled from.
pub type Template = Vec<Step>;

/// What a step (or its condition) reads from when it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// The value at the evaluator's current instance location.
    Instance,
    /// The object key or array index token that led to the current instance location.
    InstanceBasename,
    /// The container (object or array) holding the current instance location.
    InstanceParent,
    /// The annotation bag recorded by a schema-sibling keyword (`properties`,
    /// `patternProperties`) at the current instance location. Which sibling is meant is not
    /// encoded in the target itself but in the owning step's
    /// [`StepLocation::schema_pointer`][crate::ir::StepLocation], which
    /// [`StepKind::InternalNoAnnotation`] points at the sibling keyword rather than at itself.
    ParentAdjacentAnnotations,
}

/// The operation a [`Step`] performs. Families mirror §3: assertions, logical combinators,
/// loops, annotations, control flow, and internal bookkeeping steps.
#[derive(Debug, Clone, PartialEq)]
pub enum StepKind {
    // --- Assertions ---
    /// The instance is exactly the given primitive type.
    TypeStrict(PrimitiveType),
    /// The instance is one of the given primitive types.
    TypeStrictAny(Vec<PrimitiveType>),
    /// The instance is structurally equal to the given value.
    Equal(Value),
    /// The instance is structurally equal to one of the given values.
    EqualsAny(Vec<Value>),
    /// The instance (an object) defines the given key.
    Defines(String),
    /// The instance (an object) defines every given key.
    DefinesAll(Vec<String>),
    /// The instance (a number) is strictly less than the given bound.
    Less(f64),
    /// The instance (a number) is less than or equal to the given bound.
    LessEqual(f64),
    /// The instance (a number) is strictly greater than the given bound.
    Greater(f64),
    /// The instance (a number) is greater than or equal to the given bound.
    GreaterEqual(f64),
    /// The instance (a number) is evenly divisible by the given value.
    Divisible(f64),
    /// The instance's size (codepoint length, item count, property count) is less than the bound.
    SizeLess(u64),
    /// The instance's size is greater than the bound.
    SizeGreater(u64),
    /// The instance (an array) has no duplicate elements.
    Unique,
    /// The instance (a string) matches the given ECMAScript-flavored regex.
    Regex(CompiledRegex),
    /// The instance (a string) conforms to the given well-known string format.
    StringFormat(StringFormat),
    /// Never holds. Compiled from the `false` boolean schema.
    Never,

    // --- Logical combinators ---
    /// All children must hold.
    And,
    /// At least one child must hold.
    Or,
    /// Exactly one child must hold.
    Xor,
    /// The single child must NOT hold.
    Not,

    // --- Loops ---
    /// Iterate array items starting at the given index; `children` runs per item.
    LoopItems(usize),
    /// Iterate object properties in insertion order; `children` runs per property.
    LoopProperties,
    /// Iterate array items, counting how many satisfy `children`; holds iff the count falls
    /// within `[min, max]` (`max: None` meaning unbounded). Backs `contains`/`minContains`/
    /// `maxContains`, which need "N items match" rather than "every item matches".
    Contains {
        /// Minimum number of matching items required (default `1`).
        min: u64,
        /// Maximum number of matching items allowed, if any.
        max: Option<u64>,
    },

    // --- Annotations ---
    /// Attach a value at the current evaluation path, visible to callers.
    AnnotationPublic(Value),
    /// Attach a value at the current evaluation path, visible only to sibling steps via
    /// [`StepKind::InternalNoAnnotation`].
    AnnotationPrivate(Value),

    // --- Control flow ---
    /// Mark a jump destination for recursive `$ref`s; `children` is the body, run once here
    /// and re-entered by every matching [`StepKind::ControlJump`].
    ControlLabel(u64),
    /// Re-enter the body registered by the matching [`StepKind::ControlLabel`].
    ControlJump(u64),

    // --- Internal ---
    /// Pure grouping: run `children` if `condition` holds. Used to scope annotations emitted
    /// by a subschema branch to that branch alone.
    InternalContainer,
    /// True iff the named sibling annotation was NOT recorded for the current target.
    InternalNoAnnotation,
    /// Specialized `DefinesAll` used by `dependencies` schema-array entries.
    InternalDefinesAll(Vec<String>),
    /// Descend into the object property named by `value` before running `children`, then
    /// restore the previous instance location. Used by `properties` and schema-valued
    /// `dependencies` entries, which apply a subschema to one specific property rather than
    /// looping over all of them.
    Descend(DescendInto),
}

/// Where [`StepKind::Descend`] moves the instance location to.
#[derive(Debug, Clone, PartialEq)]
pub enum DescendInto {
    /// `instance[key]`.
    Property(String),
    /// `instance[index]`.
    Item(usize),
    /// The current basename itself, reinterpreted as a string instance (used by
    /// `propertyNames`).
    BasenameAsInstance,
}

/// A compiled regex together with the ECMAScript source it was translated from, so
/// diagnostics can show the schema author's original pattern.
#[derive(Clone)]
pub struct CompiledRegex {
    /// The original, untranslated pattern as written in the schema.
    pub source: String,
    /// The compiled Rust-flavored regex.
    pub regex: Arc<fancy_regex::Regex>,
}

impl fmt::Debug for CompiledRegex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledRegex").field("source", &self.source).finish()
    }
}

impl PartialEq for CompiledRegex {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// A string format this engine asserts directly, per the Non-goals (only `uri` and `ipv4`;
/// everything else stays an annotation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFormat {
    /// RFC 3986 URI.
    Uri,
    /// Dotted-quad IPv4 address.
    Ipv4,
}

/// Diagnostic metadata a step carries regardless of its kind: where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepLocation {
    /// The pointer, within the compiled schema, of the keyword that produced this step.
    pub schema_pointer: Pointer,
    /// The keyword name, e.g. `"maxLength"`.
    pub keyword: String,
}

impl StepLocation {
    /// Build a location from a pointer and a keyword name.
    #[must_use]
    pub fn new(schema_pointer: Pointer, keyword: impl Into<String>) -> Self {
        Self {
            schema_pointer,
            keyword: keyword.into(),
        }
    }
}

/// One instruction in the compiled program.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// What this step does.
    pub kind: StepKind,
    /// What this step (and its condition) reads from.
    pub target: Target,
    /// A nested Template that must hold for this step to run at all. `None` means
    /// unconditional.
    pub condition: Option<Template>,
    /// A nested Template this step recurses into (logical combinators, loops, control flow,
    /// `Descend`). `None` for leaf assertions and annotations.
    pub children: Option<Template>,
    /// Where this step came from, for diagnostics.
    pub location: StepLocation,
}

impl Step {
    /// Build a leaf step (no children) at `target`, gated by `condition`.
    #[must_use]
    pub fn leaf(
        kind: StepKind,
        target: Target,
        condition: Option<Template>,
        location: StepLocation,
    ) -> Self {
        Self {
            kind,
            target,
            condition,
            children: None,
            location,
        }
    }

    /// Build a step that recurses into `children`, gated by `condition`.
    #[must_use]
    pub fn with_children(
        kind: StepKind,
        target: Target,
        condition: Option<Template>,
        children: Template,
        location: StepLocation,
    ) -> Self {
        Self {
            kind,
            target,
            condition,
            children: Some(children),
            location,
        }
    }
}
