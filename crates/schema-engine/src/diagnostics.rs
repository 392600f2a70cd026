//! Human-readable step descriptions and the diagnostic callback contract (§6, §9).
use schema_frame::Pointer;
use serde_json::Value;

use crate::ir::{Step, StepKind};

/// One evaluator step's outcome, handed to the diagnostic callback after the step runs.
#[derive(Debug, Clone)]
pub struct Diagnostic<'a> {
    /// Whether the step's assertion held (irrelevant for non-assertion step kinds, which are
    /// reported as `true`).
    pub result: bool,
    /// The schema-side path of the step that produced this diagnostic.
    pub evaluate_path: &'a Pointer,
    /// The instance-side location the step evaluated against.
    pub instance_location: &'a Pointer,
    /// The instance value at `instance_location`.
    pub value: &'a Value,
    /// A human-readable rendering of what the step checked.
    pub description: String,
}

/// Describe a step the way a validation error message would, without access to the instance
/// value that failed (see [`Diagnostic::description`] for the value-aware counterpart).
#[must_use]
pub fn describe_step(step: &Step) -> String {
    match &step.kind {
        StepKind::TypeStrict(t) => format!("is of type {t}"),
        StepKind::TypeStrictAny(ts) => {
            let names: Vec<_> = ts.iter().map(ToString::to_string).collect();
            format!("is of type {}", names.join(" or "))
        }
        StepKind::Equal(v) => format!("is equal to {v}"),
        StepKind::EqualsAny(vs) => format!("is one of {} values", vs.len()),
        StepKind::Defines(key) => format!("defines {key:?}"),
        StepKind::DefinesAll(keys) => format!("defines all of {keys:?}"),
        StepKind::Less(n) => format!("is less than {n}"),
        StepKind::LessEqual(n) => format!("is less than or equal to {n}"),
        StepKind::Greater(n) => format!("is greater than {n}"),
        StepKind::GreaterEqual(n) => format!("is greater than or equal to {n}"),
        StepKind::Divisible(n) => format!("is a multiple of {n}"),
        StepKind::SizeLess(n) => format!("has size less than {n}"),
        StepKind::SizeGreater(n) => format!("has size greater than {n}"),
        StepKind::Unique => "has no duplicate items".to_string(),
        StepKind::Regex(re) => format!("matches pattern {:?}", re.source),
        StepKind::StringFormat(f) => format!("conforms to format {f:?}"),
        StepKind::Never => "is never valid".to_string(),
        StepKind::And => "all of its children hold".to_string(),
        StepKind::Or => "at least one child holds".to_string(),
        StepKind::Xor => "exactly one child holds".to_string(),
        StepKind::Not => "its child does not hold".to_string(),
        StepKind::LoopItems(start) => format!("every item from index {start} satisfies its children"),
        StepKind::LoopProperties => "every property satisfies its children".to_string(),
        StepKind::Contains { min, max } => match max {
            Some(max) => format!("between {min} and {max} items satisfy its children"),
            None => format!("at least {min} items satisfy its children"),
        },
        StepKind::AnnotationPublic(v) => format!("annotates {v}"),
        StepKind::AnnotationPrivate(v) => format!("privately annotates {v}"),
        StepKind::ControlLabel(id) => format!("enters labeled body {id}"),
        StepKind::ControlJump(id) => format!("jumps to labeled body {id}"),
        StepKind::InternalContainer => "groups its children".to_string(),
        StepKind::InternalNoAnnotation => "observes no adjacent annotation".to_string(),
        StepKind::InternalDefinesAll(keys) => format!("defines all of {keys:?}"),
        StepKind::Descend(_) => "descends into a nested location".to_string(),
    }
}

/// The canonical keyword order used to sort sibling diagnostics deterministically (§9).
/// Keywords not present fall back to lexicographic order, placed after every ranked keyword.
pub const KEYWORD_RANK: &[&str] = &[
    "$ref",
    "$dynamicRef",
    "$recursiveRef",
    "type",
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
    "format",
    "items",
    "additionalItems",
    "prefixItems",
    "maxItems",
    "minItems",
    "uniqueItems",
    "contains",
    "minContains",
    "maxContains",
    "maxProperties",
    "minProperties",
    "required",
    "properties",
    "patternProperties",
    "additionalProperties",
    "propertyNames",
    "dependencies",
    "dependentRequired",
    "dependentSchemas",
    "if",
    "then",
    "else",
    "allOf",
    "anyOf",
    "oneOf",
    "not",
];

/// Rank a keyword for deterministic diagnostic ordering: known keywords sort by their
/// position in [`KEYWORD_RANK`], unknown ones sort after all known keywords, lexicographically.
#[must_use]
pub fn keyword_rank(keyword: &str) -> (usize, &str) {
    match KEYWORD_RANK.iter().position(|k| *k == keyword) {
        Some(index) => (index, keyword),
        None => (KEYWORD_RANK.len(), keyword),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranked_keywords_sort_before_unranked() {
        let mut keywords = vec!["zzz-custom", "type", "enum"];
        keywords.sort_by_key(|k| keyword_rank(k));
        assert_eq!(keywords, vec!["type", "enum", "zzz-custom"]);
    }
}
