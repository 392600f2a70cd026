//! The [`SchemaWalker`] contract: classifies a `(dialect, keyword)` pair and enumerates the
//! subschema locations it applies to, so the compiler never has to special-case dialects.
use crate::{Dialect, PathChunk};

/// What role a keyword plays under a given dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// The keyword's value contains one or more subschemas to recurse into.
    ApplicatorWithSubschemas,
    /// The keyword asserts something about the instance directly, with no subschemas.
    Assertion,
    /// The keyword attaches metadata without affecting the verdict.
    Annotation,
    /// Not recognized under this dialect; produces no steps.
    Unknown,
}

/// Classifies keywords and enumerates subschema locations, purely as a function of dialect.
/// Implementations are expected to be table-driven; see [`DefaultWalker`].
pub trait SchemaWalker: Send + Sync {
    /// Classify `keyword` under `dialect`.
    fn classify(&self, dialect: Dialect, keyword: &str) -> Classification;

    /// Enumerate the subschema locations `keyword`'s value contains, as pointer-segment
    /// chains relative to the schema object, together with the subschema itself.
    ///
    /// Only meaningful when `classify` returns [`Classification::ApplicatorWithSubschemas`];
    /// other classifications return an empty vector.
    fn subschemas<'a>(
        &self,
        dialect: Dialect,
        keyword: &str,
        value: &'a serde_json::Value,
    ) -> Vec<(Vec<PathChunk>, &'a serde_json::Value)>;
}

const ASSERTION_KEYWORDS: &[&str] = &[
    "type",
    "required",
    "enum",
    "const",
    "multipleOf",
    "maximum",
    "exclusiveMaximum",
    "minimum",
    "exclusiveMinimum",
    "maxLength",
    "minLength",
    "pattern",
    "maxItems",
    "minItems",
    "uniqueItems",
    "maxProperties",
    "minProperties",
    "minContains",
    "maxContains",
];

const APPLICATOR_KEYWORDS: &[&str] = &[
    "properties",
    "patternProperties",
    "additionalProperties",
    "propertyNames",
    "items",
    "additionalItems",
    "prefixItems",
    "contains",
    "allOf",
    "anyOf",
    "oneOf",
    "not",
    "if",
    "then",
    "else",
    "dependencies",
    "dependentSchemas",
    "dependentRequired",
    "$ref",
    "$dynamicRef",
    "$recursiveRef",
];

const ANNOTATION_KEYWORDS: &[&str] = &[
    "title",
    "description",
    "default",
    "examples",
    "deprecated",
    "readOnly",
    "writeOnly",
    "format",
    "$comment",
    "definitions",
    "$defs",
];

/// The table-driven walker shipped with this crate, covering Draft 4 through 2020-12.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultWalker;

impl SchemaWalker for DefaultWalker {
    fn classify(&self, dialect: Dialect, keyword: &str) -> Classification {
        // `id`/`$id`/`$anchor`/`$schema` are handled by the frame indexer directly, never by
        // a compiler keyword handler; they classify as annotations here only so the
        // compiler's `unmatched_keywords` bookkeeping does not flag them as unrecognized.
        match keyword {
            "id" if dialect == Dialect::Draft4 => return Classification::Annotation,
            "$id" | "$schema" | "$anchor" | "$dynamicAnchor" | "$recursiveAnchor" => {
                return Classification::Annotation
            }
            _ => {}
        }
        if ASSERTION_KEYWORDS.contains(&keyword) {
            Classification::Assertion
        } else if APPLICATOR_KEYWORDS.contains(&keyword) {
            if keyword == "dependentSchemas" && dialect == Dialect::Draft4 {
                return Classification::Unknown;
            }
            if matches!(keyword, "$recursiveRef") && dialect != Dialect::Draft201909 {
                return Classification::Unknown;
            }
            if matches!(keyword, "$dynamicRef") && dialect != Dialect::Draft202012 {
                return Classification::Unknown;
            }
            Classification::ApplicatorWithSubschemas
        } else if ANNOTATION_KEYWORDS.contains(&keyword) {
            Classification::Annotation
        } else {
            Classification::Unknown
        }
    }

    fn subschemas<'a>(
        &self,
        dialect: Dialect,
        keyword: &str,
        value: &'a serde_json::Value,
    ) -> Vec<(Vec<PathChunk>, &'a serde_json::Value)> {
        if self.classify(dialect, keyword) != Classification::ApplicatorWithSubschemas {
            return Vec::new();
        }
        // Reuse the dialect's general subresource enumeration and filter to this keyword so
        // callers that only care about one applicator at a time (the common case in the
        // compiler) don't have to re-derive the per-keyword shape themselves.
        dialect
            .subresources_of(&serde_json::json!({ keyword: value }))
            .into_iter()
            .filter(|(path, _)| matches!(path.first(), Some(PathChunk::Key(k)) if k == keyword))
            .map(|(mut path, v)| {
                path.remove(0);
                (path, v)
            })
            .collect()
    }
}
