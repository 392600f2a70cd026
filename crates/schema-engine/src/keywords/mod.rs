//! Keyword handlers (§4.G). Each module compiles one keyword (or a small family of related
//! keywords) into zero or more [`crate::ir::Step`]s.
use schema_frame::{Dialect, Pointer};
use serde_json::Value;

use crate::compiler::CompileCtx;
use crate::error::Result;
use crate::ir::Template;

pub(crate) mod combinators;
pub(crate) mod dependencies;
pub(crate) mod enum_;
pub(crate) mod format;
pub(crate) mod items;
pub(crate) mod numeric;
pub(crate) mod properties;
pub(crate) mod ref_;
pub(crate) mod required;
pub(crate) mod size;
pub(crate) mod type_;

/// Dispatch one assertion-or-applicator keyword to its handler. `node` is the enclosing
/// schema object (siblings are sometimes needed, e.g. `exclusiveMaximum` alongside `maximum`);
/// `schema_pointer` is the object's own pointer, `keyword_pointer` is `schema_pointer` with
/// `keyword` appended.
#[allow(clippy::too_many_arguments)]
pub(crate) fn dispatch(
    ctx: &CompileCtx,
    keyword: &str,
    node: &serde_json::Map<String, Value>,
    value: &Value,
    schema_pointer: &Pointer,
    keyword_pointer: &Pointer,
    dialect: Dialect,
) -> Result<Template> {
    match keyword {
        "type" => type_::compile(value, keyword_pointer, ctx.options),
        "enum" => enum_::compile_enum(value, keyword_pointer),
        "const" => enum_::compile_const(value, keyword_pointer),
        "required" => required::compile(value, keyword_pointer),
        "properties" => properties::compile_properties(ctx, node, value, schema_pointer, dialect),
        "patternProperties" => {
            properties::compile_pattern_properties(ctx, value, schema_pointer, dialect)
        }
        "additionalProperties" => {
            properties::compile_additional_properties(ctx, node, value, schema_pointer, dialect)
        }
        "propertyNames" => properties::compile_property_names(ctx, value, schema_pointer, dialect),
        "items" => items::compile_items(ctx, node, value, schema_pointer, dialect),
        "additionalItems" => items::compile_additional_items(ctx, node, value, schema_pointer, dialect),
        "prefixItems" => items::compile_prefix_items(ctx, value, schema_pointer, dialect),
        "contains" => items::compile_contains(ctx, node, value, schema_pointer, dialect),
        "allOf" => combinators::compile_all_of(ctx, value, schema_pointer, dialect),
        "anyOf" => combinators::compile_any_of(ctx, value, schema_pointer, dialect),
        "oneOf" => combinators::compile_one_of(ctx, value, schema_pointer, dialect),
        "not" => combinators::compile_not(ctx, value, schema_pointer, dialect),
        "if" => combinators::compile_if(ctx, node, schema_pointer, dialect),
        "then" | "else" => Ok(Vec::new()), // consumed by `if`'s handler
        "dependencies" => dependencies::compile_dependencies(ctx, value, schema_pointer, dialect),
        "dependentRequired" => dependencies::compile_dependent_required(value, keyword_pointer),
        "dependentSchemas" => {
            dependencies::compile_dependent_schemas(ctx, value, schema_pointer, dialect)
        }
        "uniqueItems" => size::compile_unique_items(value, keyword_pointer),
        "pattern" => size::compile_pattern(value, keyword_pointer),
        "minLength" => size::compile_min_length(value, keyword_pointer),
        "maxLength" => size::compile_max_length(value, keyword_pointer),
        "minItems" => size::compile_min_items(value, keyword_pointer),
        "maxItems" => size::compile_max_items(value, keyword_pointer),
        "minProperties" => size::compile_min_properties(value, keyword_pointer),
        "maxProperties" => size::compile_max_properties(value, keyword_pointer),
        "minContains" | "maxContains" => Ok(Vec::new()), // consumed by `contains`'s handler
        "maximum" => numeric::compile_maximum(node, keyword_pointer, dialect),
        "minimum" => numeric::compile_minimum(node, keyword_pointer, dialect),
        "exclusiveMaximum" => numeric::compile_exclusive_maximum(value, keyword_pointer, dialect),
        "exclusiveMinimum" => numeric::compile_exclusive_minimum(value, keyword_pointer, dialect),
        "multipleOf" => numeric::compile_multiple_of(value, keyword_pointer),
        _ => Ok(Vec::new()),
    }
}
